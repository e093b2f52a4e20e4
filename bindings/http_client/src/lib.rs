mod error;
mod transport;

pub mod prelude {
    pub use crate::error::handle_request_err;
    pub use crate::transport::ReqwestTransport;
}
