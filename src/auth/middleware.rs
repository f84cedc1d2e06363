//! The auth gate. Every request entering the guarded scope lands here and
//! leaves either authenticated (a [`CurrentUser`] in its extensions) or
//! rejected with 401.
//!
//! Per-request decision procedure, mirroring the token lifecycle:
//! 1. Neither auth cookie present: reject.
//! 2. Access cookie verifies and the user row exists: authenticated.
//! 3. Access cookie absent/expired/invalid but the refresh cookie verifies
//!    and the user exists: mint a new access token, attach it as a
//!    `Set-Cookie` on the response, authenticated. The refresh token itself
//!    is not rotated here.
//! 4. Refresh cookie missing/expired/invalid in case 3: reject; the client
//!    has to log in again.
//!
//! The success path of case 3 is side-effecting: the response both answers
//! the original request and replaces the client's access cookie.

use std::rc::Rc;

use actix_web::{
    cookie::Cookie,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::cookies::token_cookie;
use crate::auth::extractors::CurrentUser;
use crate::auth::token::{generate_token, verify_token, TokenKind};
use crate::error::AppError;
use crate::models::Role;

/// Endpoints reachable without credentials.
const PUBLIC_PATHS: [&str; 2] = ["/api/v1/user/register", "/api/v1/user/login"];

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc so the boxed future can hold the service across await points
    // (the gate does database lookups before forwarding the request).
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if PUBLIC_PATHS.contains(&req.path()) {
                return service.call(req).await;
            }

            let access = req.cookie(TokenKind::Access.cookie_name());
            let refresh = req.cookie(TokenKind::Refresh.cookie_name());

            if access.is_none() && refresh.is_none() {
                return Err(
                    AppError::Unauthorized("Session invalid. Please log in again.".into()).into(),
                );
            }

            // Set when the access token had to be re-minted from the
            // refresh token; attached to the response below.
            let mut minted: Option<Cookie<'static>> = None;

            let claims = match access
                .as_ref()
                .map(|c| verify_token(TokenKind::Access, c.value()))
            {
                Some(Ok(claims)) => claims,
                // Absent, expired or invalid access token: fall back to
                // the refresh token.
                Some(Err(_)) | None => {
                    let refresh = refresh.ok_or_else(|| {
                        AppError::Unauthorized("Session expired. Please log in again.".into())
                    })?;
                    let claims =
                        verify_token(TokenKind::Refresh, refresh.value()).map_err(|_| {
                            AppError::Unauthorized(
                                "Refresh token expired. Please log in again.".into(),
                            )
                        })?;
                    let token = generate_token(TokenKind::Access, claims.sub)?;
                    minted = Some(token_cookie(TokenKind::Access, token));
                    claims
                }
            };

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError(
                        "Database pool not configured".into(),
                    ))
                })?;

            // A token that outlives its user must not authenticate anyone.
            let row = sqlx::query_as::<_, (i32, String, Role)>(
                "SELECT id, email, role FROM users WHERE id = $1",
            )
            .bind(claims.sub)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(AppError::from)?;

            let (id, email, role) = row.ok_or_else(|| {
                AppError::Unauthorized("Unauthorized access: user is not authenticated".into())
            })?;

            req.extensions_mut().insert(CurrentUser { id, email, role });

            let mut res = service.call(req).await?;
            if let Some(cookie) = minted {
                attach_if_absent(&mut res, cookie);
            }
            Ok(res)
        })
    }
}

/// Attaches the re-minted access cookie unless the handler already set a
/// cookie of the same name. Logout reached via the refresh path sets a
/// removal `accessToken` cookie; appending a fresh one after it would make
/// the browser keep the new token and undo the logout.
fn attach_if_absent<B>(res: &mut ServiceResponse<B>, cookie: Cookie<'static>) {
    let already_set = res
        .response()
        .cookies()
        .any(|existing| existing.name() == cookie.name());
    if already_set {
        return;
    }
    if let Err(e) = res.response_mut().add_cookie(&cookie) {
        log::error!("Failed to attach refreshed access cookie: {}", e);
    }
}
