//! E2E tests: liveness, readiness and the OpenAPI document.

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_and_ready() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app, "/ready", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "connected");
}

#[actix_rt::test]
async fn test_openapi_document_lists_routes() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api-docs/openapi.json", None).await;
    assert_eq!(status, 200);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/test-runs"));
    assert!(paths.contains_key("/test-runs/{run_id}/results/{result_id}"));
    assert!(paths.contains_key("/settings/test-connection"));
    assert!(body["components"]["securitySchemes"]["bearer"].is_object());
}
