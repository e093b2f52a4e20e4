use serde::{Deserialize, Serialize};

/// A fabricated identity used to give each scenario distinct request payloads.
///
/// The email and payment token are fake but shaped like real PII so that any masking applied by
/// the system under test has something to work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticUser {
    index: usize,
    id: String,
    email: String,
    payment_token: String,
}

impl SyntheticUser {
    pub fn from_index(index: usize) -> Self {
        let id = format!("user{index}");
        Self {
            index,
            email: format!("{id}@example.com"),
            payment_token: format!("4111-1111-1111-111{}", index % 10),
            id,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn payment_token(&self) -> &str {
        &self.payment_token
    }
}

/// Generate `count` users, numbered from zero.
pub fn generate_users(count: usize) -> Vec<SyntheticUser> {
    (0..count).map(SyntheticUser::from_index).collect()
}
