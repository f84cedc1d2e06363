use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::Role;

/// The authenticated identity for the current request.
///
/// `AuthMiddleware` verifies the cookies, loads the user row and stores
/// this value in request extensions; handlers receive it as an ordinary
/// extractor parameter instead of digging through the request themselves.
///
/// On a route that somehow bypassed the middleware the extractor fails
/// with 401 rather than panicking.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "Identity not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(CurrentUser {
            id: 123,
            email: "x@y.com".to_string(),
            role: Role::User,
        });

        let mut payload = Payload::None;
        let extracted = CurrentUser::from_request(&req, &mut payload).await;
        let user = extracted.unwrap();
        assert_eq!(user.id, 123);
        assert_eq!(user.email, "x@y.com");
        assert!(!user.is_admin());
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // Nothing inserted into extensions.

        let mut payload = Payload::None;
        let result = CurrentUser::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let err = result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
