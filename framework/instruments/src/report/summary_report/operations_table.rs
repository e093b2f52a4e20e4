use tabled::Tabled;

#[derive(Tabled)]
pub struct OperationRow {
    pub operation: String,
    pub attempted: usize,
    pub skipped: usize,
    pub successes: usize,
    #[tabled(display = "rate")]
    pub success_rate: Option<f64>,
    #[tabled(display = "float2")]
    pub avg_time_ms: f64,
    #[tabled(display = "float2")]
    pub min_time_ms: f64,
    #[tabled(display = "float2")]
    pub max_time_ms: f64,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

pub(crate) fn rate(rate: &Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate),
        None => "n/a".to_string(),
    }
}
