//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AIOps Test Hub",
        version = "0.1.0",
        description = "Manage test suites and cases, trigger test runs against an AIOps target, and track their results"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::login,
        api::auth::logout_redirect,
        api::auth::logout,
        api::auth::issue_token,
        api::auth::get_current_user,
        api::auth::register,
        api::auth::list_users,
        api::auth::delete_user,
        // Settings endpoints
        api::settings::get_settings,
        api::settings::save_settings,
        api::settings::test_connection,
        // Test suite endpoints
        api::test_suites::list_suites,
        api::test_suites::get_suite,
        api::test_suites::get_suite_case_ids,
        api::test_suites::create_suite,
        api::test_suites::update_suite,
        // Test case endpoints
        api::test_cases::list_cases,
        api::test_cases::get_case,
        api::test_cases::create_case,
        api::test_cases::update_case,
        api::test_cases::delete_case,
        // Test run endpoints
        api::test_runs::list_runs,
        api::test_runs::create_run,
        api::test_runs::create_suite_run,
        api::test_runs::get_run,
        api::test_runs::delete_run,
        api::test_runs::list_results,
        api::test_runs::record_result,
        api::test_runs::cancel_run,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Auth
            models::LoginForm,
            models::TokenResponse,
            models::UserResponse,
            models::UserListItem,
            models::RegisterRequest,
            models::RegisterResponse,
            // Settings
            models::SettingsResponse,
            models::SettingsUpdate,
            models::ConnectionTestRequest,
            models::ConnectionTestResponse,
            // Suites and cases
            models::TestSuiteResponse,
            models::CreateTestSuiteRequest,
            models::UpdateTestSuiteRequest,
            models::TestCaseResponse,
            models::CreateTestCaseRequest,
            models::UpdateTestCaseRequest,
            // Runs
            models::RunStatus,
            models::ResultStatus,
            models::TestRunResponse,
            models::TestResultResponse,
            models::CreateTestRunRequest,
            models::SuiteRunRequest,
            models::RecordResultRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Login, tokens and user management"),
        (name = "Settings", description = "Target system configuration"),
        (name = "Test Suites", description = "Groups of test cases"),
        (name = "Test Cases", description = "Individual tests"),
        (name = "Test Runs", description = "Executions and per-case results")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the generated OpenAPI document.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
