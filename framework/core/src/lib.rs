mod bail;
mod operation;
mod user;

pub mod prelude {
    pub use crate::bail::ScenarioBailError;
    pub use crate::operation::{Operation, UnknownOperationError};
    pub use crate::user::{generate_users, SyntheticUser};
}
