use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{Task, TaskInput, TaskStatus, TaskUpdate},
    pagination::{Page, PageQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, status, due_date, project_id, user_id, \
     is_deleted, deleted_at, created_at, updated_at";

/// Confirms the project exists, is owned by the caller and is not in the
/// trash. Anything else is a uniform 404.
async fn assert_project_owned(
    pool: &PgPool,
    project_id: Uuid,
    user_id: i32,
) -> Result<(), AppError> {
    let owned = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM projects WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match owned {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("Project not found or unauthorized".into())),
    }
}

/// Create a task under one of the caller's projects. Starts as `todo` and
/// outside the trash.
#[post("/create-task/{projectId}")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    project_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let project_id = project_id.into_inner();
    assert_project_owned(pool.get_ref(), project_id, user.id).await?;

    let task = Task::new(task_data.into_inner(), project_id, user.id);

    let sql = format!(
        "INSERT INTO tasks (id, title, description, status, due_date, project_id, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {TASK_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Task>(&sql)
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.project_id)
        .bind(task.user_id)
        .fetch_one(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(created))
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// List the caller's tasks across all projects, optionally filtered by
/// status, most urgent due date first, paginated.
#[get("/get-all-task")]
pub async fn get_all_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    query: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let paging = PageQuery {
        page: query.page,
        limit: query.limit,
    };

    let (total, tasks) = if let Some(status) = query.status {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks
             WHERE user_id = $1 AND is_deleted = FALSE AND status = $2",
        )
        .bind(user.id)
        .bind(status)
        .fetch_one(&**pool)
        .await?;

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = $1 AND is_deleted = FALSE AND status = $2
             ORDER BY due_date ASC LIMIT $3 OFFSET $4"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user.id)
            .bind(status)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(&**pool)
            .await?;
        (total, tasks)
    } else {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND is_deleted = FALSE",
        )
        .bind(user.id)
        .fetch_one(&**pool)
        .await?;

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = $1 AND is_deleted = FALSE
             ORDER BY due_date ASC LIMIT $2 OFFSET $3"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user.id)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(&**pool)
            .await?;
        (total, tasks)
    };

    Ok(HttpResponse::Ok().json(Page::new(tasks, &paging, total)))
}

/// List the tasks of one of the caller's projects, newest first,
/// paginated. 404 when the project is missing, trashed or someone else's.
#[get("/project/{projectId}/tasks")]
pub async fn get_project_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    project_id: web::Path<Uuid>,
    query: web::Query<TaskListQuery>,
) -> Result<impl Responder, AppError> {
    let project_id = project_id.into_inner();
    assert_project_owned(pool.get_ref(), project_id, user.id).await?;

    let paging = PageQuery {
        page: query.page,
        limit: query.limit,
    };

    let (total, tasks) = if let Some(status) = query.status {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks
             WHERE project_id = $1 AND user_id = $2 AND is_deleted = FALSE AND status = $3",
        )
        .bind(project_id)
        .bind(user.id)
        .bind(status)
        .fetch_one(&**pool)
        .await?;

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE project_id = $1 AND user_id = $2 AND is_deleted = FALSE AND status = $3
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .bind(user.id)
            .bind(status)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(&**pool)
            .await?;
        (total, tasks)
    } else {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks
             WHERE project_id = $1 AND user_id = $2 AND is_deleted = FALSE",
        )
        .bind(project_id)
        .bind(user.id)
        .fetch_one(&**pool)
        .await?;

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE project_id = $1 AND user_id = $2 AND is_deleted = FALSE
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(project_id)
            .bind(user.id)
            .bind(paging.limit())
            .bind(paging.offset())
            .fetch_all(&**pool)
            .await?;
        (total, tasks)
    };

    Ok(HttpResponse::Ok().json(Page::new(tasks, &paging, total)))
}

/// Update a task the caller owns. Absent fields keep their value; an
/// entirely empty update is rejected.
#[put("/update-task/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    update: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    if update.is_empty() {
        return Err(AppError::BadRequest(
            "No valid fields provided for update".into(),
        ));
    }

    let sql = format!(
        "UPDATE tasks
         SET title = COALESCE($1, title),
             description = COALESCE($2, description),
             status = COALESCE($3, status),
             due_date = COALESCE($4, due_date),
             updated_at = NOW()
         WHERE id = $5 AND user_id = $6 AND is_deleted = FALSE
         RETURNING {TASK_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Task>(&sql)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.status)
        .bind(update.due_date)
        .bind(task_id.into_inner())
        .bind(user.id)
        .fetch_optional(&**pool)
        .await?;

    match updated {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found or unauthorized".into())),
    }
}

/// Move a task to the trash. Recoverable until the sweep's retention
/// window runs out.
#[delete("/soft-delete-task/{id}")]
pub async fn soft_delete_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query(
        "UPDATE tasks SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE",
    )
    .bind(task_id.into_inner())
    .bind(user.id)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found or unauthorized".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task moved to trash" })))
}

/// Hard-delete a task immediately, skipping the trash entirely.
#[delete("/delete-task/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id.into_inner())
        .bind(user.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found or unauthorized".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
