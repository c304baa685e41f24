//! Test run API handlers.

use std::collections::BTreeSet;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::info;

use crate::auth::RequireAuth;
use crate::db::DbPool;
use crate::db::test_runs::NewTestRun;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateTestRunRequest, MessageResponse, QueryRunsParams, RecordResultRequest,
    SuiteRunRequest, TestResultResponse, TestRunResponse,
};

const DEFAULT_TRIGGER: &str = "manual";

fn default_run_name(prefix: &str) -> String {
    format!("{} - {}", prefix, Utc::now().format("%Y-%m-%d %H:%M:%S"))
}

/// List runs, newest first.
#[utoipa::path(
    get,
    path = "/test-runs",
    tag = "Test Runs",
    params(
        ("status" = Option<String>, Query, description = "Exact run status"),
        ("trigger" = Option<String>, Query, description = "Exact trigger"),
        ("limit" = Option<u64>, Query, description = "Maximum rows (default 100, max 500)"),
    ),
    responses(
        (status = 200, description = "Runs", body = Vec<TestRunResponse>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_runs(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    query: web::Query<QueryRunsParams>,
) -> AppResult<HttpResponse> {
    let runs: Vec<TestRunResponse> = pool
        .list_runs(&query)
        .await?
        .into_iter()
        .map(TestRunResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(runs))
}

/// Start a run over explicit case IDs.
#[utoipa::path(
    post,
    path = "/test-runs",
    tag = "Test Runs",
    request_body = CreateTestRunRequest,
    responses(
        (status = 200, description = "Run created", body = TestRunResponse),
        (status = 400, description = "No test cases given", body = crate::error::ErrorResponse),
        (status = 404, description = "A test case does not exist", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_run(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestRunRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let case_ids: Vec<i32> = req
        .test_case_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if case_ids.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one test case is required".to_string(),
        ));
    }

    let found: BTreeSet<i32> = pool
        .get_cases_by_ids(&case_ids)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if let Some(missing) = case_ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::NotFound(format!("Test case {}", missing)));
    }

    let run = pool
        .insert_run(NewTestRun {
            name: req.name.unwrap_or_else(|| default_run_name("Test run")),
            trigger: req.trigger,
            suite_id: None,
            triggered_by: Some(auth.user.username.as_str()),
            case_ids: &case_ids,
        })
        .await?;

    info!(
        "Test run {} created by '{}' with {} case(s)",
        run.id, auth.user.username, run.total_tests
    );

    Ok(HttpResponse::Ok().json(TestRunResponse::from(run)))
}

/// Start a run over every case of a suite.
#[utoipa::path(
    post,
    path = "/test-runs/suite/{suite_id}",
    tag = "Test Runs",
    params(("suite_id" = i32, Path, description = "Suite ID")),
    request_body(content = SuiteRunRequest, description = "Optional trigger and name"),
    responses(
        (status = 200, description = "Run created", body = TestRunResponse),
        (status = 400, description = "Suite has no test cases", body = crate::error::ErrorResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_suite_run(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: Option<web::Json<SuiteRunRequest>>,
) -> AppResult<HttpResponse> {
    let suite_id = path.into_inner();
    let req = body.map(|b| b.into_inner()).unwrap_or_default();

    let suite = pool
        .get_suite(suite_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test suite".to_string()))?;

    let case_ids = pool.case_ids_in_suite(suite_id).await?;
    if case_ids.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Test suite '{}' has no test cases",
            suite.name
        )));
    }

    let run = pool
        .insert_run(NewTestRun {
            name: req.name.unwrap_or_else(|| default_run_name(&suite.name)),
            trigger: req.trigger.unwrap_or_else(|| DEFAULT_TRIGGER.to_string()),
            suite_id: Some(suite_id),
            triggered_by: Some(auth.user.username.as_str()),
            case_ids: &case_ids,
        })
        .await?;

    info!(
        "Test run {} created for suite '{}' by '{}'",
        run.id, suite.name, auth.user.username
    );

    Ok(HttpResponse::Ok().json(TestRunResponse::from(run)))
}

/// Get a run by ID.
#[utoipa::path(
    get,
    path = "/test-runs/{run_id}",
    tag = "Test Runs",
    params(("run_id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run", body = TestRunResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_run(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let run = pool
        .get_run(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test run".to_string()))?;

    Ok(HttpResponse::Ok().json(TestRunResponse::from(run)))
}

/// Delete a run and its results.
#[utoipa::path(
    delete,
    path = "/test-runs/{run_id}",
    tag = "Test Runs",
    params(("run_id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run deleted", body = MessageResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_run(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    if !pool.delete_run(run_id).await? {
        return Err(AppError::NotFound("Test run".to_string()));
    }
    info!("Test run {} deleted by '{}'", run_id, auth.user.username);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Test run deleted successfully")))
}

/// Per-case results of a run.
#[utoipa::path(
    get,
    path = "/test-runs/{run_id}/results",
    tag = "Test Runs",
    params(("run_id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Results", body = Vec<TestResultResponse>),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_results(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let run_id = path.into_inner();
    if pool.get_run(run_id).await?.is_none() {
        return Err(AppError::NotFound("Test run".to_string()));
    }

    let results: Vec<TestResultResponse> = pool
        .list_results(run_id)
        .await?
        .into_iter()
        .map(TestResultResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(results))
}

/// Record the outcome of one result; the run's counters and status follow.
#[utoipa::path(
    put,
    path = "/test-runs/{run_id}/results/{result_id}",
    tag = "Test Runs",
    params(
        ("run_id" = i32, Path, description = "Run ID"),
        ("result_id" = i32, Path, description = "Result ID"),
    ),
    request_body = RecordResultRequest,
    responses(
        (status = 200, description = "Updated result", body = TestResultResponse),
        (status = 400, description = "Run already finished", body = crate::error::ErrorResponse),
        (status = 404, description = "Run or result not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn record_result(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<(i32, i32)>,
    body: web::Json<RecordResultRequest>,
) -> AppResult<HttpResponse> {
    let (run_id, result_id) = path.into_inner();
    let (run, result) = pool
        .record_result(run_id, result_id, body.into_inner())
        .await?;

    info!(
        "Test run {} result {} recorded as {}; run is {}",
        run.id, result.id, result.status, run.status
    );

    Ok(HttpResponse::Ok().json(TestResultResponse::from(result)))
}

/// Cancel a pending or running run.
#[utoipa::path(
    post,
    path = "/test-runs/{run_id}/cancel",
    tag = "Test Runs",
    params(("run_id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run cancelled", body = TestRunResponse),
        (status = 400, description = "Run already finished", body = crate::error::ErrorResponse),
        (status = 404, description = "Run not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn cancel_run(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let run = pool.cancel_run(path.into_inner()).await?;
    info!("Test run {} cancelled by '{}'", run.id, auth.user.username);

    Ok(HttpResponse::Ok().json(TestRunResponse::from(run)))
}

/// Configure test run routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-runs")
            .route(web::get().to(list_runs))
            .route(web::post().to(create_run)),
    )
    .service(web::resource("/test-runs/suite/{suite_id}").route(web::post().to(create_suite_run)))
    .service(
        web::resource("/test-runs/{run_id}")
            .route(web::get().to(get_run))
            .route(web::delete().to(delete_run)),
    )
    .service(web::resource("/test-runs/{run_id}/results").route(web::get().to(list_results)))
    .service(
        web::resource("/test-runs/{run_id}/results/{result_id}")
            .route(web::put().to(record_result)),
    )
    .service(web::resource("/test-runs/{run_id}/cancel").route(web::post().to(cancel_run)));
}
