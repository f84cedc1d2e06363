//! Builders for the two auth cookies. Both are http-only, secure and
//! `SameSite=None` so the browser sends them on cross-site API calls; the
//! max-age always matches the token's own TTL.

use actix_web::cookie::{time::Duration, Cookie, SameSite};

use super::token::TokenKind;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

impl TokenKind {
    pub const fn cookie_name(self) -> &'static str {
        match self {
            TokenKind::Access => ACCESS_COOKIE,
            TokenKind::Refresh => REFRESH_COOKIE,
        }
    }
}

/// Wraps a freshly minted token of the given kind in its cookie.
pub fn token_cookie(kind: TokenKind, token: String) -> Cookie<'static> {
    Cookie::build(kind.cookie_name(), token)
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(Duration::seconds(kind.ttl_secs()))
        .finish()
}

/// An expired twin of the auth cookie, used at logout to make the browser
/// drop it. Attributes must match the original cookie or browsers keep it.
pub fn removal_cookie(kind: TokenKind) -> Cookie<'static> {
    let mut cookie = Cookie::build(kind.cookie_name(), "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cookie_attributes() {
        let cookie = token_cookie(TokenKind::Access, "abc".to_string());
        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(
            cookie.max_age(),
            Some(Duration::seconds(TokenKind::Access.ttl_secs()))
        );
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_refresh_cookie_outlives_access_cookie() {
        let access = token_cookie(TokenKind::Access, "a".to_string());
        let refresh = token_cookie(TokenKind::Refresh, "r".to_string());
        assert_eq!(refresh.name(), "refreshToken");
        assert!(refresh.max_age() > access.max_age());
    }

    #[test]
    fn test_removal_cookie_is_expired() {
        let cookie = removal_cookie(TokenKind::Refresh);
        assert_eq!(cookie.name(), "refreshToken");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
