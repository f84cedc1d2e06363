use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{
        trash::merge_by_created_at, Project, ProjectInput, ProjectStatus, ProjectUpdate,
        TaggedItem, Task,
    },
    pagination::{Page, PageQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const PROJECT_COLUMNS: &str =
    "id, title, description, status, user_id, is_deleted, deleted_at, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, description, status, due_date, project_id, user_id, \
     is_deleted, deleted_at, created_at, updated_at";

/// Escapes LIKE wildcards in user input and wraps it for a substring match.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Create a new project owned by the caller. Starts `active` and outside
/// the trash.
#[post("/create-project")]
pub async fn create_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    project_data: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    project_data.validate()?;
    let project = Project::new(project_data.into_inner(), user.id);

    let sql = format!(
        "INSERT INTO projects (id, title, description, status, user_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {PROJECT_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Project>(&sql)
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.status)
        .bind(project.user_id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List the caller's projects, optionally filtered by status, newest
/// first, paginated. Soft-deleted projects never show up here.
#[get("/get-user-project")]
pub async fn get_user_projects(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    query: web::Query<ProjectListQuery>,
) -> Result<impl Responder, AppError> {
    let paging = PageQuery {
        page: query.page,
        limit: query.limit,
    };

    let (total, projects) = if let Some(status) = query.status {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects
             WHERE user_id = $1 AND is_deleted = FALSE AND status = $2",
        )
        .bind(user.id)
        .bind(status)
        .fetch_one(&**pool)
        .await?;

        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE user_id = $1 AND is_deleted = FALSE AND status = $2
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(user.id)
            .bind(status)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(&**pool)
            .await?;
        (total, projects)
    } else {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM projects WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(user.id)
        .fetch_one(&**pool)
        .await?;

        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE user_id = $1 AND is_deleted = FALSE
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(user.id)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(&**pool)
            .await?;
        (total, projects)
    };

    Ok(HttpResponse::Ok().json(Page::new(projects, &paging, total)))
}

/// Update a project the caller owns. Absent fields keep their value; an
/// entirely empty update is rejected.
#[put("/update-project/{id}")]
pub async fn update_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    project_id: web::Path<Uuid>,
    update: web::Json<ProjectUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    if update.is_empty() {
        return Err(AppError::BadRequest(
            "No valid fields provided for update".into(),
        ));
    }

    let sql = format!(
        "UPDATE projects
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             status = COALESCE($3, status),
             updated_at = NOW()
         WHERE id = $4 AND user_id = $5 AND is_deleted = FALSE
         RETURNING {PROJECT_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Project>(&sql)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.status)
        .bind(project_id.into_inner())
        .bind(user.id)
        .fetch_optional(&**pool)
        .await?;

    match updated {
        Some(project) => Ok(HttpResponse::Ok().json(project)),
        None => Err(AppError::NotFound("Project not found or unauthorized".into())),
    }
}

/// Hard-delete a project the caller owns, whether trashed or not. Its
/// tasks go with it through the foreign-key cascade.
#[delete("/delete-project/{projectId}")]
pub async fn delete_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
        .bind(project_id.into_inner())
        .bind(user.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Project not found or unauthorized".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Project deleted successfully" })))
}

/// Move a project to the trash. It disappears from listings and search
/// until recovered; its tasks are not touched.
#[delete("/soft-delete-project/{id}")]
pub async fn soft_delete_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    project_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query(
        "UPDATE projects SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE",
    )
    .bind(project_id.into_inner())
    .bind(user.id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Project not found or unauthorized".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Project moved to trash" })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

/// Case-insensitive substring search over the caller's live projects and
/// tasks, matched against title and description. Results are tagged by
/// kind and sorted by creation time ascending.
#[get("/search")]
pub async fn search_task_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, AppError> {
    let keyword = query.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::BadRequest("keyword is required".into()));
    }
    let pattern = like_pattern(keyword);

    let sql = format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         WHERE user_id = $1 AND is_deleted = FALSE
           AND (title ILIKE $2 OR description ILIKE $2)
         ORDER BY created_at ASC"
    );
    let projects = sqlx::query_as::<_, Project>(&sql)
        .bind(user.id)
        .bind(&pattern)
        .fetch_all(&**pool)
        .await?;

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE user_id = $1 AND is_deleted = FALSE
           AND (title ILIKE $2 OR description ILIKE $2)
         ORDER BY created_at ASC"
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(user.id)
        .bind(&pattern)
        .fetch_all(&**pool)
        .await?;

    let merged = merge_by_created_at(
        projects.into_iter().map(TaggedItem::from).collect(),
        tasks.into_iter().map(TaggedItem::from).collect(),
    );

    Ok(HttpResponse::Ok().json(merged))
}

/// The caller's trash: every soft-deleted project and task they own,
/// tagged by kind, sorted by creation time ascending.
#[get("/trash-delete-task-project")]
pub async fn get_trash(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         WHERE user_id = $1 AND is_deleted = TRUE
         ORDER BY created_at ASC"
    );
    let projects = sqlx::query_as::<_, Project>(&sql)
        .bind(user.id)
        .fetch_all(&**pool)
        .await?;

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE user_id = $1 AND is_deleted = TRUE
         ORDER BY created_at ASC"
    );
    let tasks = sqlx::query_as::<_, Task>(&sql)
        .bind(user.id)
        .fetch_all(&**pool)
        .await?;

    let merged = merge_by_created_at(
        projects.into_iter().map(TaggedItem::from).collect(),
        tasks.into_iter().map(TaggedItem::from).collect(),
    );

    Ok(HttpResponse::Ok().json(merged))
}

/// Pull an item of either kind back out of the trash. The flag and the
/// deletion timestamp are cleared together, so the recovered item is
/// indistinguishable from one never deleted.
#[post("/recover-task-or-project/{id}")]
pub async fn recover_task_or_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    item_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let item_id = item_id.into_inner();

    let recovered_project = sqlx::query(
        "UPDATE projects SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
         WHERE id = $1 AND user_id = $2 AND is_deleted = TRUE",
    )
    .bind(item_id)
    .bind(user.id)
    .execute(&**pool)
    .await?;

    if recovered_project.rows_affected() > 0 {
        return Ok(HttpResponse::Ok().json(json!({ "message": "Project recovered from trash" })));
    }

    let recovered_task = sqlx::query(
        "UPDATE tasks SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW()
         WHERE id = $1 AND user_id = $2 AND is_deleted = TRUE",
    )
    .bind(item_id)
    .bind(user.id)
    .execute(&**pool)
    .await?;

    if recovered_task.rows_affected() > 0 {
        return Ok(HttpResponse::Ok().json(json!({ "message": "Task recovered from trash" })));
    }

    Err(AppError::NotFound("Item not found or unauthorized".into()))
}

/// Physically remove a trashed item of either kind, without waiting for
/// the retention window.
#[delete("/permanently-delete-task-or-project/{id}")]
pub async fn permanently_delete_task_or_project(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    item_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let item_id = item_id.into_inner();

    let deleted_project =
        sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2 AND is_deleted = TRUE")
            .bind(item_id)
            .bind(user.id)
            .execute(&**pool)
            .await?;

    if deleted_project.rows_affected() > 0 {
        return Ok(HttpResponse::Ok().json(json!({ "message": "Project permanently deleted" })));
    }

    let deleted_task =
        sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2 AND is_deleted = TRUE")
            .bind(item_id)
            .bind(user.id)
            .execute(&**pool)
            .await?;

    if deleted_task.rows_affected() > 0 {
        return Ok(HttpResponse::Ok().json(json!({ "message": "Task permanently deleted" })));
    }

    Err(AppError::NotFound("Item not found or unauthorized".into()))
}
