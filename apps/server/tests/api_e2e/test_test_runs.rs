//! E2E tests: run creation, result recording, cancellation and listing.

use serde_json::Value;

use super::test_helpers::*;

/// Suite with `n` cases; returns (suite_id, case_ids).
async fn seed_suite_with_cases(
    pool: &aiops_testhub_lib::db::DbPool,
    name: &str,
    n: usize,
) -> (i32, Vec<i32>) {
    let suite_id = seed_suite(pool, name).await;
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        ids.push(seed_case(pool, suite_id, &format!("{}-{:03}", name, i + 1)).await);
    }
    (suite_id, ids)
}

fn run_id(run: &Value) -> i64 {
    run["id"].as_i64().unwrap()
}

#[actix_rt::test]
async fn test_create_run_collapses_duplicates() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 2).await;

    let (status, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": [cases[0], cases[1], cases[0]]}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(run["total_tests"], 2);
    assert_eq!(run["passed_tests"], 0);
    assert_eq!(run["status"], "pending");
    assert_eq!(run["trigger"], "manual");
    assert_eq!(run["triggered_by"], "qa");
    assert!(run["suite_id"].is_null());
    assert!(run["name"].as_str().unwrap().starts_with("Test run - "));
    assert!(run["started_at"].is_null());

    let (status, results) = get_json(
        &app,
        &format!("/test-runs/{}/results", run_id(&run)),
        Some(&token),
    )
    .await;
    assert_eq!(status, 200);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r["status"] == "pending"));
}

#[actix_rt::test]
async fn test_create_run_validates_case_ids() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 1).await;

    let (status, body) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": []}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(detail(&body), "At least one test case is required");

    let (status, body) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": [cases[0], 999]}),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(detail(&body), "Test case 999 not found");

    // Nothing was created by the failed attempts
    let (_, runs) = get_json(&app, "/test-runs", Some(&token)).await;
    assert!(runs.as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_create_run_with_name_and_trigger() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 1).await;

    let (status, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": cases, "name": "Release 4.2", "trigger": "ci"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(run["name"], "Release 4.2");
    assert_eq!(run["trigger"], "ci");
}

#[actix_rt::test]
async fn test_suite_run() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (suite_id, _) = seed_suite_with_cases(&pool, "nightly", 3).await;
    let empty_suite = seed_suite(&pool, "empty").await;

    // No body at all
    let (status, run) = post_empty(
        &app,
        &format!("/test-runs/suite/{}", suite_id),
        Some(&token),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(run["total_tests"], 3);
    assert_eq!(run["suite_id"], suite_id);
    assert_eq!(run["trigger"], "manual");
    assert!(run["name"].as_str().unwrap().starts_with("nightly - "));

    let (status, run) = post_json(
        &app,
        &format!("/test-runs/suite/{}", suite_id),
        Some(&token),
        serde_json::json!({"trigger": "scheduled", "name": "Nightly 2026-10-19"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(run["trigger"], "scheduled");
    assert_eq!(run["name"], "Nightly 2026-10-19");

    let (status, body) = post_empty(
        &app,
        &format!("/test-runs/suite/{}", empty_suite),
        Some(&token),
    )
    .await;
    assert_eq!(status, 400);
    assert!(detail(&body).contains("has no test cases"));

    let (status, _) = post_empty(&app, "/test-runs/suite/999", Some(&token)).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_recording_results_drives_run_status() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 2).await;

    let (_, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": cases}),
    )
    .await;
    let id = run_id(&run);
    let (_, results) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;
    let first = results[0]["id"].as_i64().unwrap();
    let second = results[1]["id"].as_i64().unwrap();

    // Marking a case running starts the run
    let (status, result) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", id, first),
        Some(&token),
        serde_json::json!({"status": "running"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(result["status"], "running");
    assert!(result["started_at"].is_string());
    assert!(result["completed_at"].is_null());

    let (_, run) = get_json(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(run["status"], "running");
    assert!(run["started_at"].is_string());

    let (status, result) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", id, first),
        Some(&token),
        serde_json::json!({"status": "passed", "duration_ms": 1250, "output": "ok"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(result["duration_ms"], 1250);
    assert!(result["completed_at"].is_string());

    let (_, run) = get_json(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(run["status"], "running");
    assert_eq!(run["passed_tests"], 1);

    let (status, _) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", id, second),
        Some(&token),
        serde_json::json!({"status": "failed", "error_message": "assertion failed"}),
    )
    .await;
    assert_eq!(status, 200);

    let (_, run) = get_json(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(run["status"], "failed");
    assert_eq!(run["passed_tests"], 1);
    assert_eq!(run["failed_tests"], 1);
    assert!(run["completed_at"].is_string());

    // Finished runs no longer accept results
    let (status, body) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", id, second),
        Some(&token),
        serde_json::json!({"status": "passed"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(detail(&body), "Test run is already failed");
}

#[actix_rt::test]
async fn test_all_passed_or_skipped_completes_run() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 2).await;

    let (_, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": cases}),
    )
    .await;
    let id = run_id(&run);
    let (_, results) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;

    for (result, outcome) in results.as_array().unwrap().iter().zip(["passed", "skipped"]) {
        let (status, _) = put_json(
            &app,
            &format!("/test-runs/{}/results/{}", id, result["id"]),
            Some(&token),
            serde_json::json!({"status": outcome}),
        )
        .await;
        assert_eq!(status, 200);
    }

    let (_, run) = get_json(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(run["status"], "completed");
    assert_eq!(run["passed_tests"], 1);
    assert_eq!(run["skipped_tests"], 1);
}

#[actix_rt::test]
async fn test_record_result_rejects_foreign_result_and_bad_status() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 1).await;

    let body = serde_json::json!({"test_case_ids": cases});
    let (_, run_a) = post_json(&app, "/test-runs", Some(&token), body.clone()).await;
    let (_, run_b) = post_json(&app, "/test-runs", Some(&token), body).await;
    let (_, results_b) = get_json(
        &app,
        &format!("/test-runs/{}/results", run_id(&run_b)),
        Some(&token),
    )
    .await;
    let result_b = results_b[0]["id"].as_i64().unwrap();

    let (status, body) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", run_id(&run_a), result_b),
        Some(&token),
        serde_json::json!({"status": "passed"}),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(detail(&body), "Test result not found");

    let (status, _) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", run_id(&run_b), result_b),
        Some(&token),
        serde_json::json!({"status": "exploded"}),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = put_json(
        &app,
        &format!("/test-runs/999/results/{}", result_b),
        Some(&token),
        serde_json::json!({"status": "passed"}),
    )
    .await;
    assert_eq!(status, 404);
}

/// `pending` and `cancelled` cannot be reported; the run stays untouched.
#[actix_rt::test]
async fn test_record_result_rejects_pending_and_cancelled() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 2).await;

    let (_, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": cases}),
    )
    .await;
    let id = run_id(&run);
    let (_, results) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;

    for result in results.as_array().unwrap() {
        for outcome in ["cancelled", "pending"] {
            let (status, body) = put_json(
                &app,
                &format!("/test-runs/{}/results/{}", id, result["id"]),
                Some(&token),
                serde_json::json!({"status": outcome}),
            )
            .await;
            assert_eq!(status, 400);
            assert!(detail(&body).contains("cannot be recorded"));
        }
    }

    let (_, run) = get_json(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(run["status"], "pending");
    assert_eq!(run["passed_tests"], 0);
    assert!(run["started_at"].is_null());
    assert!(run["completed_at"].is_null());

    let (_, results) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;
    assert!(results.as_array().unwrap().iter().all(|r| r["status"] == "pending"));
}

#[actix_rt::test]
async fn test_cancel_run() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 2).await;

    let (_, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": cases}),
    )
    .await;
    let id = run_id(&run);
    let (_, results) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;
    let first = results[0]["id"].as_i64().unwrap();

    let (status, _) = put_json(
        &app,
        &format!("/test-runs/{}/results/{}", id, first),
        Some(&token),
        serde_json::json!({"status": "passed"}),
    )
    .await;
    assert_eq!(status, 200);

    let (status, run) = post_empty(&app, &format!("/test-runs/{}/cancel", id), Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(run["status"], "cancelled");
    assert!(run["completed_at"].is_string());

    // Finished results keep their outcome; unfinished ones are cancelled
    let (_, results) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;
    let statuses: Vec<&str> = results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["passed", "cancelled"]);

    let (status, body) = post_empty(&app, &format!("/test-runs/{}/cancel", id), Some(&token)).await;
    assert_eq!(status, 400);
    assert_eq!(detail(&body), "Cannot cancel a test run that is cancelled");

    let (status, _) = post_empty(&app, "/test-runs/999/cancel", Some(&token)).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_list_runs_filters_and_limit() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 1).await;

    let mut ids = Vec::new();
    for trigger in ["manual", "ci", "ci"] {
        let (_, run) = post_json(
            &app,
            "/test-runs",
            Some(&token),
            serde_json::json!({"test_case_ids": cases, "trigger": trigger}),
        )
        .await;
        ids.push(run_id(&run));
    }
    let (status, _) = post_empty(&app, &format!("/test-runs/{}/cancel", ids[0]), Some(&token)).await;
    assert_eq!(status, 200);

    let (status, body) = get_json(&app, "/test-runs", Some(&token)).await;
    assert_eq!(status, 200);
    let listed: Vec<i64> = body.as_array().unwrap().iter().map(run_id).collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]], "newest first");

    let (_, body) = get_json(&app, "/test-runs?trigger=ci", Some(&token)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get_json(&app, "/test-runs?status=cancelled", Some(&token)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(run_id(&body[0]), ids[0]);

    let (_, body) = get_json(&app, "/test-runs?limit=1", Some(&token)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(run_id(&body[0]), ids[2]);

    let (status, _) = get_json(&app, "/test-runs?limit=abc", Some(&token)).await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_delete_run() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let token = seed_user_with_token(&pool, "qa", false).await;
    let (_, cases) = seed_suite_with_cases(&pool, "smoke", 1).await;

    let (_, run) = post_json(
        &app,
        "/test-runs",
        Some(&token),
        serde_json::json!({"test_case_ids": cases}),
    )
    .await;
    let id = run_id(&run);

    let (status, body) = delete(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Test run deleted successfully");

    let (status, body) = get_json(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(status, 404);
    assert_eq!(detail(&body), "Test run not found");

    let (status, _) = get_json(&app, &format!("/test-runs/{}/results", id), Some(&token)).await;
    assert_eq!(status, 404);

    let (status, _) = delete(&app, &format!("/test-runs/{}", id), Some(&token)).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_runs_require_auth() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, _) = get_json(&app, "/test-runs", None).await;
    assert_eq!(status, 401);

    let (status, _) = post_json(
        &app,
        "/test-runs",
        None,
        serde_json::json!({"test_case_ids": [1]}),
    )
    .await;
    assert_eq!(status, 401);
}
