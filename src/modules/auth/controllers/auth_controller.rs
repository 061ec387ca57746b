use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::auth::models::{CurrentUser, SESSION_USER_KEY};
use crate::modules::auth::password::verify_password;
use crate::modules::auth::repositories::UserRepository;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
///
/// Verifies credentials and establishes the session the role guard reads.
pub async fn login(
    pool: web::Data<MySqlPool>,
    session: Session,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let users = UserRepository::new(pool.get_ref().clone());

    let user = users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let identity = CurrentUser {
        user_id: user.id.clone(),
        role: user.role,
        student_id: user.student_id.clone(),
    };
    session
        .insert(SESSION_USER_KEY, &identity)
        .map_err(|e| AppError::internal(format!("Failed to establish session: {}", e)))?;

    info!(user_id = %user.id, role = %user.role, "Login successful");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user_id": identity.user_id,
        "role": identity.role,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// GET /auth/me
pub async fn me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(user)
}

/// Configure routes for the auth module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me)),
    );
}
