//! API endpoint modules.

pub mod auth;
pub mod health;
pub mod openapi;
pub mod settings;
pub mod test_cases;
pub mod test_runs;
pub mod test_suites;

use actix_web::web;

use crate::error::{form_error_handler, json_error_handler, path_error_handler, query_error_handler};

pub use auth::configure_routes as configure_auth_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use settings::configure_routes as configure_settings_routes;
pub use test_cases::configure_routes as configure_test_case_routes;
pub use test_runs::configure_routes as configure_test_run_routes;
pub use test_suites::configure_routes as configure_test_suite_routes;

/// Register every route plus extractor configs that answer bad input with `{"detail": ...}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .configure(configure_health_routes)
        .configure(configure_auth_routes)
        .configure(configure_settings_routes)
        .configure(configure_test_suite_routes)
        .configure(configure_test_case_routes)
        .configure(configure_test_run_routes)
        .service(openapi::openapi_json);
}
