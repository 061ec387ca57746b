pub mod filters;
pub mod models;
pub mod repositories;

pub use filters::LedgerFilter;
pub use repositories::{LedgerReader, MySqlLedgerRepository};
