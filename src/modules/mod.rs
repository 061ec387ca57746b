pub mod auth;
pub mod export;
pub mod ledger;
pub mod reports;
pub mod students;
