//! AIOps Test Hub - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, middleware::NormalizePath, web};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use aiops_testhub_lib::api;
use aiops_testhub_lib::auth::TokenService;
use aiops_testhub_lib::config::Config;
use aiops_testhub_lib::db::DbPool;
use aiops_testhub_lib::middleware::RequestLogger;
use aiops_testhub_lib::services::ConnectionProber;

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    // Simple check - just verify we can load config
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, AIOPS_DATABASE_URL and AIOPS_SECRET_KEY must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  AIOps Test Hub");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for AIOPS_DATABASE_URL and AIOPS_SECRET_KEY");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("{}", e);
        std::process::exit(1);
    }

    let prober = match ConnectionProber::new(Duration::from_secs(config.probe_timeout_secs)) {
        Ok(prober) => prober,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Prepare shared state
    let bind_address = config.bind_address();
    let tokens = web::Data::new(TokenService::new(&config.auth));
    let pool = web::Data::new(pool);
    let prober = web::Data::new(prober);
    let cors_origins = config.cors_origins.clone();
    let is_development = config.is_development();
    let config = web::Data::new(config);

    if cors_origins.is_empty() {
        info!("CORS: same-origin only");
    } else {
        info!("CORS: allowing {:?}", cors_origins);
    }

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            // Add request logging middleware
            .wrap(RequestLogger)
            // Accept `/test-runs/` as well as `/test-runs`
            .wrap(NormalizePath::trim())
            // Add shared state
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(prober.clone())
            .app_data(config.clone())
            .configure(api::configure_routes)
    });

    // Set worker count
    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
