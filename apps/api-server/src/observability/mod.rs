//! Request correlation for logs and responses.

mod request_id;

pub use request_id::{RequestId, RequestIdMiddleware};
