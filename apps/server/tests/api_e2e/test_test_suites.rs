//! E2E tests: test suite CRUD.

use super::test_helpers::*;

#[actix_rt::test]
async fn test_create_and_list_suites() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;

    let (status, body) = post_json(
        &app,
        "/test-suites",
        Some(&token),
        serde_json::json!({"name": "smoke", "description": "Fast checks"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "smoke");
    assert_eq!(body["category"], "general");
    assert_eq!(body["enabled"], true);
    assert_eq!(body["test_count"], 0);

    let smoke_id = body["id"].as_i64().unwrap() as i32;
    seed_suite(&pool, "alerts").await;
    seed_case(&pool, smoke_id, "SMK-001").await;
    seed_case(&pool, smoke_id, "SMK-002").await;

    let (status, body) = get_json(&app, "/test-suites", Some(&token)).await;
    assert_eq!(status, 200);
    let suites = body.as_array().unwrap();
    assert_eq!(suites.len(), 2);
    assert_eq!(suites[0]["name"], "alerts", "ordered by name");
    assert_eq!(suites[0]["test_count"], 0);
    assert_eq!(suites[1]["name"], "smoke");
    assert_eq!(suites[1]["test_count"], 2);

    // The alias answers the same listing
    let (status, alias) = get_json(&app, "/test-suites/list", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(alias, body);
}

#[actix_rt::test]
async fn test_duplicate_suite_name_rejected() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    seed_suite(&pool, "smoke").await;

    let (status, body) = post_json(
        &app,
        "/test-suites",
        Some(&token),
        serde_json::json!({"name": "smoke"}),
    )
    .await;
    assert_eq!(status, 400);
    assert!(detail(&body).contains("already exists"));
}

#[actix_rt::test]
async fn test_get_suite_and_case_ids() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let suite_id = seed_suite(&pool, "regression").await;
    let first = seed_case(&pool, suite_id, "REG-001").await;
    let second = seed_case(&pool, suite_id, "REG-002").await;

    let (status, body) = get_json(&app, &format!("/test-suites/{}", suite_id), Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "regression");
    assert_eq!(body["test_count"], 2);

    let (status, body) = get_json(
        &app,
        &format!("/test-suites/{}/tests", suite_id),
        Some(&token),
    )
    .await;
    assert_eq!(status, 200);
    let mut ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![first as i64, second as i64]);

    let (status, body) = get_json(&app, "/test-suites/999", Some(&token)).await;
    assert_eq!(status, 404);
    assert_eq!(detail(&body), "Test suite not found");

    let (status, _) = get_json(&app, "/test-suites/999/tests", Some(&token)).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_update_suite_partially() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let suite_id = seed_suite(&pool, "nightly").await;
    seed_suite(&pool, "weekly").await;

    let (status, body) = put_json(
        &app,
        &format!("/test-suites/{}", suite_id),
        Some(&token),
        serde_json::json!({"enabled": false, "category": "scheduled"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "nightly");
    assert_eq!(body["enabled"], false);
    assert_eq!(body["category"], "scheduled");

    // Renaming onto an existing name conflicts
    let (status, body) = put_json(
        &app,
        &format!("/test-suites/{}", suite_id),
        Some(&token),
        serde_json::json!({"name": "weekly"}),
    )
    .await;
    assert_eq!(status, 400);
    assert!(detail(&body).contains("already exists"));

    // Keeping the current name is not a conflict
    let (status, _) = put_json(
        &app,
        &format!("/test-suites/{}", suite_id),
        Some(&token),
        serde_json::json!({"name": "nightly"}),
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = put_json(
        &app,
        "/test-suites/999",
        Some(&token),
        serde_json::json!({"enabled": true}),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_suites_require_auth() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/test-suites", None).await;
    assert_eq!(status, 401);
    assert_eq!(detail(&body), "Not authenticated");

    let (status, _) = post_json(&app, "/test-suites", None, serde_json::json!({"name": "x"})).await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_update_suite_clears_description() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let suite_id = seed_suite(&pool, "nightly").await;
    let uri = format!("/test-suites/{}", suite_id);

    let (_, body) =
        put_json(&app, &uri, Some(&token), serde_json::json!({"description": "full sweep"})).await;
    assert_eq!(body["description"], "full sweep");

    let (_, body) = put_json(&app, &uri, Some(&token), serde_json::json!({"enabled": false})).await;
    assert_eq!(body["description"], "full sweep");

    let (status, body) =
        put_json(&app, &uri, Some(&token), serde_json::json!({"description": null})).await;
    assert_eq!(status, 200);
    assert!(body["description"].is_null());
    assert_eq!(body["enabled"], false);
}
