pub mod cookies;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Role;

// Re-export the pieces handlers and the server wiring use directly.
pub use cookies::{removal_cookie, token_cookie};
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, issue_tokens, verify_token, Claims, TokenKind, TokenPair};

/// Payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Payload for a registration request. Identity is email-only; there is no
/// separate username.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Body of a successful login: the caller's identity plus the access token.
/// The tokens also travel as cookies; the body copy exists for clients that
/// prefer an Authorization header.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub token: String,
}
