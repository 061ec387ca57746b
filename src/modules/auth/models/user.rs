use actix_session::SessionExt;
use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::future::{ready, Ready};

use crate::core::AppError;

/// Session key the authenticated identity is stored under
pub const SESSION_USER_KEY: &str = "user";

/// Portal roles. Reports are admin-only; statements are owner-or-admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR(20)", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Student => write!(f, "student"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Portal account row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string; never serialized out
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Present for student accounts, links the login to ledger rows
    pub student_id: Option<String>,
}

/// Authenticated identity carried through the request, established by the
/// session guard and read by handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: String,
    pub role: Role,
    pub student_id: Option<String>,
}

impl CurrentUser {
    /// True when this identity may read the given student's data
    pub fn can_view_student(&self, student_id: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Student => self.student_id.as_deref() == Some(student_id),
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // The role guard inserts the identity for guarded scopes; fall back
        // to the session for routes outside any guard (e.g. /auth/me).
        if let Some(user) = req.extensions().get::<CurrentUser>().cloned() {
            return ready(Ok(user));
        }
        let user = req
            .get_session()
            .get::<CurrentUser>(SESSION_USER_KEY)
            .ok()
            .flatten();
        ready(user.ok_or_else(|| AppError::unauthorized("No active session")))
    }
}
