use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Lifetime of an access token. Kept short: the auth middleware re-mints
/// one transparently from the refresh token when it expires.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Lifetime of a refresh token; past this the client must log in again.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The two token classes. Each is signed with its own secret so that a
/// leaked access secret cannot forge refresh tokens and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const fn secret_env(self) -> &'static str {
        match self {
            TokenKind::Access => "JWT_ACCESS_SECRET_KEY",
            TokenKind::Refresh => "JWT_REFRESH_SECRET_KEY",
        }
    }

    pub const fn ttl_secs(self) -> i64 {
        match self {
            TokenKind::Access => ACCESS_TOKEN_TTL_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_TTL_SECS,
        }
    }

    fn secret(self) -> Result<String, AppError> {
        std::env::var(self.secret_env()).map_err(|_| {
            AppError::InternalServerError(format!("{} not set", self.secret_env()))
        })
    }
}

/// Claims encoded within both token classes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Generates a token of the given kind for a user, signed with the kind's
/// secret and expiring after the kind's TTL.
pub fn generate_token(kind: TokenKind, user_id: i32) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(kind.ttl_secs()))
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        exp: expiration,
    };

    let secret = kind.secret()?;
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a token against the given kind's secret and decodes its claims.
///
/// A token of the other kind fails here with an invalid-signature error, as
/// does anything expired or malformed; all of those surface as 401.
pub fn verify_token(kind: TokenKind, token: &str) -> Result<Claims, AppError> {
    let secret = kind.secret()?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// A freshly minted access/refresh pair.
#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Mints both tokens for a user and persists the refresh token on the user
/// row, replacing whatever was stored before. Called at login.
pub async fn issue_tokens(pool: &PgPool, user_id: i32) -> Result<TokenPair, AppError> {
    let access = generate_token(TokenKind::Access, user_id)?;
    let refresh = generate_token(TokenKind::Refresh, user_id)?;

    sqlx::query("UPDATE users SET refresh_token = $1, updated_at = NOW() WHERE id = $2")
        .bind(&refresh)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(TokenPair { access, refresh })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref JWT_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    }

    // Helper to run test logic with both secrets temporarily set. The lock
    // serializes env mutation across tests in this module.
    fn run_with_temp_secrets<F>(access: &str, refresh: &str, test_logic: F)
    where
        F: FnOnce(),
    {
        let _guard = JWT_ENV_LOCK.lock().unwrap();

        let saved: Vec<(_, _)> = [TokenKind::Access, TokenKind::Refresh]
            .iter()
            .map(|k| (k.secret_env(), std::env::var(k.secret_env()).ok()))
            .collect();
        std::env::set_var(TokenKind::Access.secret_env(), access);
        std::env::set_var(TokenKind::Refresh.secret_env(), refresh);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(test_logic));

        for (name, original) in saved {
            match original {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }

        if let Err(panic_payload) = result {
            std::panic::resume_unwind(panic_payload);
        }
    }

    #[test]
    fn test_round_trip_per_kind() {
        run_with_temp_secrets("access_secret_a", "refresh_secret_a", || {
            for kind in [TokenKind::Access, TokenKind::Refresh] {
                let token = generate_token(kind, 42).unwrap();
                let claims = verify_token(kind, &token).unwrap();
                assert_eq!(claims.sub, 42);
            }
        });
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        run_with_temp_secrets("access_secret_b", "refresh_secret_b", || {
            let refresh = generate_token(TokenKind::Refresh, 1).unwrap();
            match verify_token(TokenKind::Access, &refresh) {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(msg.contains("Invalid token"), "unexpected message: {}", msg)
                }
                other => panic!("refresh token verified as access token: {:?}", other),
            }

            let access = generate_token(TokenKind::Access, 1).unwrap();
            assert!(verify_token(TokenKind::Refresh, &access).is_err());
        });
    }

    #[test]
    fn test_expired_token_is_rejected() {
        run_with_temp_secrets("access_secret_c", "refresh_secret_c", || {
            let expiration = chrono::Utc::now()
                .checked_sub_signed(chrono::Duration::hours(2))
                .expect("valid timestamp")
                .timestamp() as usize;
            let claims = Claims {
                sub: 2,
                exp: expiration,
            };
            let expired = encode(
                &Header::default(),
                &claims,
                &EncodingKey::from_secret("access_secret_c".as_bytes()),
            )
            .unwrap();

            match verify_token(TokenKind::Access, &expired) {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(msg.contains("ExpiredSignature"), "got: {}", msg)
                }
                other => panic!("expired token accepted: {:?}", other),
            }
        });
    }

    #[test]
    fn test_missing_secret_is_internal_error() {
        let _guard = JWT_ENV_LOCK.lock().unwrap();
        let saved = std::env::var(TokenKind::Access.secret_env()).ok();
        std::env::remove_var(TokenKind::Access.secret_env());

        let result = generate_token(TokenKind::Access, 1);
        assert!(matches!(result, Err(AppError::InternalServerError(_))));

        if let Some(value) = saved {
            std::env::set_var(TokenKind::Access.secret_env(), value);
        }
    }
}
