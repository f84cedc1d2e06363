use crate::{
    auth::{
        hash_password, issue_tokens, removal_cookie, token_cookie, verify_password, CurrentUser,
        LoginRequest, LoginResponse, RegisterRequest, TokenKind,
    },
    error::AppError,
    models::{User, UserProfile},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// A duplicate email surfaces as 409 whether caught by the pre-check or
/// by the unique index under a concurrent register.
fn conflict_on_duplicate_email(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict("User already exists".into())
        }
        other => other.into(),
    }
}

/// Register a new user.
///
/// Emails are stored lowercase and must be unique; a duplicate registers
/// as 409. Registration does not log the user in.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let email = register_data.email.trim().to_lowercase();

    let existing = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&**pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let password_hash = hash_password(&register_data.password)?;

    let profile = sqlx::query_as::<_, UserProfile>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2)
         RETURNING id, email, role, created_at",
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await
    .map_err(conflict_on_duplicate_email)?;

    Ok(HttpResponse::Created().json(profile))
}

/// Log a user in.
///
/// On success both auth cookies are set and the access token is repeated
/// in the body. The freshly minted refresh token replaces the one stored
/// on the user row.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let email = login_data.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role, refresh_token, created_at, updated_at
         FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) => user,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let tokens = issue_tokens(pool.get_ref(), user.id).await?;
    let body = LoginResponse {
        id: user.id,
        email: user.email,
        role: user.role,
        token: tokens.access.clone(),
    };

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(TokenKind::Access, tokens.access))
        .cookie(token_cookie(TokenKind::Refresh, tokens.refresh))
        .json(body))
}

/// Log the caller out: forget the stored refresh token and expire both
/// cookies client-side.
#[post("/logout")]
pub async fn logout(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(TokenKind::Access))
        .cookie(removal_cookie(TokenKind::Refresh))
        .json(json!({ "message": "User logged out successfully" })))
}

/// Every registered user's profile, visible to any authenticated caller.
#[get("/get-all-users")]
pub async fn get_all_users(
    pool: web::Data<PgPool>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let users = sqlx::query_as::<_, UserProfile>(
        "SELECT id, email, role, created_at FROM users ORDER BY id ASC",
    )
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// The caller's own profile.
#[get("/get-user")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "SELECT id, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(user.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email)]
    pub email: Option<String>,
}

/// Update the caller's details (currently only the email).
#[put("/update-user")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    update: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let email = match &update.email {
        Some(email) => email.trim().to_lowercase(),
        None => return Err(AppError::BadRequest("No valid fields provided for update".into())),
    };

    let profile = sqlx::query_as::<_, UserProfile>(
        "UPDATE users SET email = $1, updated_at = NOW() WHERE id = $2
         RETURNING id, email, role, created_at",
    )
    .bind(&email)
    .bind(user.id)
    .fetch_one(&**pool)
    .await
    .map_err(conflict_on_duplicate_email)?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Hard-delete a user account. Only the account owner or an admin may do
/// this, and never while the user still owns incomplete work: tasks not
/// `done` or projects not `completed` block the deletion.
#[delete("/delete-user/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    target_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let target_id = target_id.into_inner();
    if target_id != user.id && !user.is_admin() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let exists = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE id = $1")
        .bind(target_id)
        .fetch_optional(&**pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    let incomplete_task = sqlx::query_as::<_, (i32,)>(
        "SELECT 1 FROM tasks
         WHERE user_id = $1 AND is_deleted = FALSE AND status <> 'done' LIMIT 1",
    )
    .bind(target_id)
    .fetch_optional(&**pool)
    .await?;
    if incomplete_task.is_some() {
        return Err(AppError::BadRequest(
            "User has tasks that are not marked as 'done'".into(),
        ));
    }

    let active_project = sqlx::query_as::<_, (i32,)>(
        "SELECT 1 FROM projects
         WHERE user_id = $1 AND is_deleted = FALSE AND status <> 'completed' LIMIT 1",
    )
    .bind(target_id)
    .fetch_optional(&**pool)
    .await?;
    if active_project.is_some() {
        return Err(AppError::BadRequest(
            "User has projects that are not marked as 'completed'".into(),
        ));
    }

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(target_id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    // A unique-index violation as the driver would report it, without
    // needing a live database to provoke one.
    #[derive(Debug)]
    struct DuplicateKey;

    impl std::fmt::Display for DuplicateKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for DuplicateKey {}

    impl sqlx::error::DatabaseError for DuplicateKey {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn test_concurrent_duplicate_register_maps_to_conflict() {
        let error = sqlx::Error::Database(Box::new(DuplicateKey));
        match conflict_on_duplicate_email(error) {
            AppError::Conflict(msg) => assert_eq!(msg, "User already exists"),
            other => panic!("expected Conflict, got: {:?}", other),
        }
    }

    #[test]
    fn test_other_database_errors_stay_internal() {
        let error = conflict_on_duplicate_email(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_user_update_requires_email() {
        let update = UserUpdate { email: None };
        assert!(update.email.is_none());

        let update: UserUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.email.is_none());

        let update: UserUpdate =
            serde_json::from_str(r#"{"email": "new@example.com"}"#).unwrap();
        assert_eq!(update.email.as_deref(), Some("new@example.com"));
    }
}
