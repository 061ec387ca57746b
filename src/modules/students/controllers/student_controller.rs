use actix_web::{web, HttpResponse};

use crate::core::{AppError, Result};
use crate::middleware::RequireRole;
use crate::modules::auth::models::CurrentUser;
use crate::modules::students::services::StatementService;

/// GET /students/{id}/statement
///
/// Students may only read their own statement; admins any.
pub async fn get_statement(
    service: web::Data<StatementService>,
    path: web::Path<String>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let student_id = path.into_inner();

    if !user.can_view_student(&student_id) {
        return Err(AppError::forbidden(
            "Students may only view their own statement",
        ));
    }

    let as_of = chrono::Utc::now().date_naive();
    let statement = service.student_statement(&student_id, as_of).await?;

    Ok(HttpResponse::Ok().json(statement))
}

/// Configure routes for the students module; any authenticated user may
/// enter the scope, ownership is checked per request
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .wrap(RequireRole::authenticated())
            .route("/{id}/statement", web::get().to(get_statement)),
    );
}
