use actix_session::SessionExt;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::core::AppError;
use crate::modules::auth::models::{CurrentUser, Role, SESSION_USER_KEY};

/// Session-based authorization guard.
///
/// Every report page of the legacy portal repeated its own logged-in/role
/// check; here a single guard wraps each protected scope instead. The guard
/// reads the session, optionally enforces a role, and inserts the
/// `CurrentUser` identity into request extensions for handlers.
pub struct RequireRole {
    required: Option<Role>,
}

impl RequireRole {
    /// Any authenticated user
    pub fn authenticated() -> Self {
        Self { required: None }
    }

    /// Admins only
    pub fn admin() -> Self {
        Self {
            required: Some(Role::Admin),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required: Option<Role>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let required = self.required;

        Box::pin(async move {
            let user = req
                .get_session()
                .get::<CurrentUser>(SESSION_USER_KEY)
                .map_err(|e| {
                    Error::from(AppError::internal(format!("Session read failed: {}", e)))
                })?
                .ok_or_else(|| Error::from(AppError::unauthorized("Login required")))?;

            if let Some(required) = required {
                if user.role != required {
                    return Err(Error::from(AppError::forbidden(format!(
                        "{} role required",
                        required
                    ))));
                }
            }

            // Identity for handlers and extractors downstream
            req.extensions_mut().insert(user);

            svc.call(req).await
        })
    }
}
