//! Test case API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::RequireAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateTestCaseRequest, MessageResponse, TestCaseFilter, TestCaseResponse,
    UpdateTestCaseRequest,
};

/// List cases, optionally filtered by suite, status and priority.
#[utoipa::path(
    get,
    path = "/test-cases",
    tag = "Test Cases",
    params(
        ("suite_id" = Option<i32>, Query, description = "Only cases in this suite"),
        ("status" = Option<String>, Query, description = "Exact status"),
        ("priority" = Option<String>, Query, description = "Exact priority"),
    ),
    responses(
        (status = 200, description = "Matching cases ordered by test_id", body = Vec<TestCaseResponse>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_cases(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    query: web::Query<TestCaseFilter>,
) -> AppResult<HttpResponse> {
    let cases: Vec<TestCaseResponse> = pool
        .list_cases(&query)
        .await?
        .into_iter()
        .map(TestCaseResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(cases))
}

/// Get a case by ID.
#[utoipa::path(
    get,
    path = "/test-cases/{case_id}",
    tag = "Test Cases",
    params(("case_id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case", body = TestCaseResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_case(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let case = pool
        .get_case(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Test case".to_string()))?;

    Ok(HttpResponse::Ok().json(TestCaseResponse::from(case)))
}

/// Create a case.
#[utoipa::path(
    post,
    path = "/test-cases",
    tag = "Test Cases",
    request_body = CreateTestCaseRequest,
    responses(
        (status = 200, description = "Case created", body = TestCaseResponse),
        (status = 400, description = "test_id already exists", body = crate::error::ErrorResponse),
        (status = 404, description = "Suite not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn create_case(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let case = pool.insert_case(body.into_inner()).await?;
    info!(
        "Test case '{}' (id={}) created by '{}'",
        case.test_id, case.id, auth.user.username
    );

    Ok(HttpResponse::Ok().json(TestCaseResponse::from(case)))
}

/// Partially update a case.
#[utoipa::path(
    put,
    path = "/test-cases/{case_id}",
    tag = "Test Cases",
    params(("case_id" = i32, Path, description = "Case ID")),
    request_body = UpdateTestCaseRequest,
    responses(
        (status = 200, description = "Case updated", body = TestCaseResponse),
        (status = 400, description = "test_id already exists", body = crate::error::ErrorResponse),
        (status = 404, description = "Case or suite not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn update_case(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateTestCaseRequest>,
) -> AppResult<HttpResponse> {
    let case = pool
        .update_case(path.into_inner(), body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(TestCaseResponse::from(case)))
}

/// Delete a case and its results.
#[utoipa::path(
    delete,
    path = "/test-cases/{case_id}",
    tag = "Test Cases",
    params(("case_id" = i32, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case deleted", body = MessageResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn delete_case(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let case_id = path.into_inner();
    if !pool.delete_case(case_id).await? {
        return Err(AppError::NotFound("Test case".to_string()));
    }
    info!("Test case {} deleted by '{}'", case_id, auth.user.username);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Test case deleted successfully")))
}

/// Configure test case routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/test-cases")
            .route(web::get().to(list_cases))
            .route(web::post().to(create_case)),
    )
    .service(
        web::resource("/test-cases/{case_id}")
            .route(web::get().to(get_case))
            .route(web::put().to(update_case))
            .route(web::delete().to(delete_case)),
    );
}
