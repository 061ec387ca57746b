pub mod user;

pub use user::{CurrentUser, Role, User, SESSION_USER_KEY};
