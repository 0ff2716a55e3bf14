pub mod admin_guard;
pub mod request_id;

pub use admin_guard::AdminGuard;
pub use request_id::{RequestId, RequestIdMiddleware};
