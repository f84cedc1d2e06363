use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskbin::auth::AuthMiddleware;
use taskbin::config::Config;
use taskbin::routes;
use taskbin::sweep;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // One sweeper for the whole process, regardless of how many HTTP
    // workers actix starts.
    tokio::spawn(sweep::run(
        pool.clone(),
        config.sweep_interval,
        config.trash_retention,
    ));

    let cors_origin = config.cors_origin.clone();
    log::info!(
        "Starting taskbin server at http://{}:{}",
        config.server_host,
        config.server_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(
                Cors::default()
                    .allowed_origin(&cors_origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind(config.server_addr())?
    .run()
    .await
}
