/// Recommended error type for scenario `main` functions and any shared code written around the
/// runner. Compatible with everything the runner returns, so `?` can be used throughout.
pub type LoadgenResult<T> = anyhow::Result<T>;
