pub mod auth;
pub mod error_handler;
pub mod request_id;

pub use auth::RequireRole;
pub use error_handler::{error_response, ErrorHandler};
pub use request_id::RequestId;
