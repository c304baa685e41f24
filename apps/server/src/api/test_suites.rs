//! Test suite API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::RequireAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::entity::test_suite;
use crate::models::{CreateTestSuiteRequest, TestSuiteResponse, UpdateTestSuiteRequest};

async fn with_count(pool: &DbPool, suite: test_suite::Model) -> AppResult<TestSuiteResponse> {
    let count = pool.count_cases_in_suite(suite.id).await?;
    Ok(TestSuiteResponse::from_model(suite, count))
}

/// List all suites ordered by name, each with its case count.
#[utoipa::path(
    get,
    path = "/test-suites",
    tag = "Test Suites",
    responses(
        (status = 200, description = "All suites", body = Vec<TestSuiteResponse>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_suites(_auth: RequireAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let suites = pool.list_suites().await?;

    let mut response = Vec::with_capacity(suites.len());
    for suite in suites {
        response.push(with_count(&pool, suite).await?);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Get a suite by ID.
#[utoipa::path(
    get,
    path = "/test-suites/{suite_id}",
    tag = "Test Suites",
    params(("suite_id" = i32, Path, description = "Suite ID")),
    responses(
        (status = 200, description = "Suite", body = TestSuiteResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_suite(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let suite = pool
        .get_suite(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test suite".to_string()))?;

    Ok(HttpResponse::Ok().json(with_count(&pool, suite).await?))
}

/// IDs of the cases in a suite.
#[utoipa::path(
    get,
    path = "/test-suites/{suite_id}/tests",
    tag = "Test Suites",
    params(("suite_id" = i32, Path, description = "Suite ID")),
    responses(
        (status = 200, description = "Case IDs", body = Vec<i32>),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_suite_case_ids(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    if pool.get_suite(suite_id).await?.is_none() {
        return Err(AppError::NotFound("Test suite".to_string()));
    }

    let ids = pool.case_ids_in_suite(suite_id).await?;
    Ok(HttpResponse::Ok().json(ids))
}

/// Create a suite.
#[utoipa::path(
    post,
    path = "/test-suites",
    tag = "Test Suites",
    request_body = CreateTestSuiteRequest,
    responses(
        (status = 200, description = "Suite created", body = TestSuiteResponse),
        (status = 400, description = "Name already exists", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_suite(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestSuiteRequest>,
) -> AppResult<HttpResponse> {
    let suite = pool.insert_suite(body.into_inner()).await?;
    info!(
        "Test suite '{}' (id={}) created by '{}'",
        suite.name, suite.id, auth.user.username
    );

    Ok(HttpResponse::Ok().json(TestSuiteResponse::from_model(suite, 0)))
}

/// Partially update a suite.
#[utoipa::path(
    put,
    path = "/test-suites/{suite_id}",
    tag = "Test Suites",
    params(("suite_id" = i32, Path, description = "Suite ID")),
    request_body = UpdateTestSuiteRequest,
    responses(
        (status = 200, description = "Suite updated", body = TestSuiteResponse),
        (status = 400, description = "Name already exists", body = crate::error::ErrorResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_suite(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateTestSuiteRequest>,
) -> AppResult<HttpResponse> {
    let suite = pool
        .update_suite(path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(with_count(&pool, suite).await?))
}

/// Configure test suite routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // `/list` must be registered before `/{suite_id}`.
    cfg.service(web::resource("/test-suites/list").route(web::get().to(list_suites)))
        .service(
            web::resource("/test-suites")
                .route(web::get().to(list_suites))
                .route(web::post().to(create_suite)),
        )
        .service(
            web::resource("/test-suites/{suite_id}")
                .route(web::get().to(get_suite))
                .route(web::put().to(update_suite)),
        )
        .service(
            web::resource("/test-suites/{suite_id}/tests").route(web::get().to(get_suite_case_ids)),
        );
}
