pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Mounts all resource routes. Intended to be configured on an `/api/v1`
/// scope wrapped in `AuthMiddleware`; the middleware itself exempts the
/// register and login endpoints.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::get_all_users)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .service(
        web::scope("/project")
            .service(projects::create_project)
            .service(projects::get_user_projects)
            .service(projects::update_project)
            .service(projects::delete_project)
            .service(projects::soft_delete_project)
            .service(projects::search_task_project)
            .service(projects::get_trash)
            .service(projects::recover_task_or_project)
            .service(projects::permanently_delete_task_or_project),
    )
    .service(
        web::scope("/task")
            .service(tasks::create_task)
            .service(tasks::get_all_tasks)
            .service(tasks::get_project_tasks)
            .service(tasks::update_task)
            .service(tasks::soft_delete_task)
            .service(tasks::delete_task),
    );
}
