use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eduledger::config::Config;
use eduledger::middleware::{ErrorHandler, RequestId};
use eduledger::modules::ledger::MySqlLedgerRepository;
use eduledger::modules::reports::ReportService;
use eduledger::modules::students::StatementService;
use eduledger::modules::{auth, reports, students};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eduledger=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting EduLedger tuition reporting service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // The ledger repository is the single I/O boundary; both services share it
    let ledger = Arc::new(MySqlLedgerRepository::new(db_pool.clone()));
    let report_service = web::Data::new(ReportService::new(ledger.clone()));
    let statement_service = web::Data::new(StatementService::new(ledger));

    let session_key = Key::derive_from(config.security.session_secret.as_bytes());

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(report_service.clone())
            .app_data(statement_service.clone())
            .wrap(ErrorHandler)
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name("eduledger_session".to_string())
                    .build(),
            )
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(auth::controllers::configure)
            .configure(reports::controllers::configure)
            .configure(students::controllers::configure)
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "eduledger"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "EduLedger Tuition Reporting",
        "version": "0.1.0",
        "status": "running"
    }))
}
