use actix_web::{middleware::Logger, web, App, HttpServer};
use utoipa::OpenApi;

use messages_service::openapi::{openapi_json, ApiDoc};
use messages_service::{config::Config, db, error::AppError, handlers, logging, migrations, security::jwt};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let cfg = Config::from_env()?;

    let db = db::create_pool(&cfg.database_url, cfg.database_max_connections)
        .await
        .map_err(|e| AppError::Config(format!("db: {e}")))?;

    // Treat migration failures as fatal; the schema must be in sync.
    if cfg.run_migrations {
        migrations::run_all(&db)
            .await
            .map_err(|e| AppError::Config(format!("database migrations failed: {e}")))?;
    }

    jwt::initialize_keys(&cfg.jwt_secret)?;

    let bind_addr = format!("{}:{}", cfg.host, cfg.port);
    tracing::info!(%bind_addr, "starting messages-service");

    let db_data = web::Data::new(db);
    HttpServer::new(move || {
        let openapi_doc = ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(web::Data::new(openapi_doc))
            .wrap(Logger::default())
            .route("/health", web::get().to(handlers::health::health_check))
            .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
            .configure(handlers::messages::configure_routes)
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::Internal(format!("bind {bind_addr}: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::Internal(format!("server: {e}")))
}
