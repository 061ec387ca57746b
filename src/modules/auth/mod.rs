pub mod controllers;
pub mod models;
pub mod password;
pub mod repositories;

pub use models::{CurrentUser, Role, User};
