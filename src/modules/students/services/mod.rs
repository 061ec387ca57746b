pub mod statement_service;

pub use statement_service::{StatementService, StudentStatement};
