//! E2E tests: login, tokens and user management.

use actix_web::cookie::Cookie;
use actix_web::test;
use aiops_testhub_lib::auth::ACCESS_TOKEN_COOKIE;
use aiops_testhub_lib::entity::user;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::test_helpers::*;

/// Browser login sets an HttpOnly cookie and redirects to the dashboard.
#[actix_rt::test]
async fn test_login_sets_cookie_and_redirects() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_user(&pool, "alice", false).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", "alice"), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/dashboard")
    );

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .expect("login should set the session cookie");
    assert!(cookie.http_only().unwrap_or(false));
    assert!(!cookie.value().is_empty());

    // The cookie alone authenticates follow-up requests
    let token = cookie.value().to_string();
    let req = test::TestRequest::get()
        .uri("/auth/me")
        .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let me: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(me["username"], "alice");
    assert!(me["last_login"].is_string(), "login should stamp last_login");
}

/// Wrong password on the browser flow → 401 with the browser wording.
#[actix_rt::test]
async fn test_login_bad_password_rejected() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_user(&pool, "alice", false).await;

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", "alice"), ("password", "wrong")]);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(detail(&body), "Invalid username or password");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", "nobody"), ("password", TEST_PASSWORD)]);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 401);
}

/// Inactive accounts cannot log in on either flow.
#[actix_rt::test]
async fn test_inactive_user_cannot_log_in() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_user(&pool, "dormant", false).await;

    user::Entity::update_many()
        .col_expr(user::Column::IsActive, Expr::value(false))
        .filter(user::Column::Username.eq("dormant"))
        .exec(pool.connection())
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_form([("username", "dormant"), ("password", TEST_PASSWORD)]);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(detail(&body), "Account is inactive");

    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_form([("username", "dormant"), ("password", TEST_PASSWORD)]);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(detail(&body), "Inactive account");
}

/// The token endpoint returns a bearer token usable on protected routes.
#[actix_rt::test]
async fn test_token_endpoint_issues_bearer_token() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_user(&pool, "api-client", false).await;

    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_form([("username", "api-client"), ("password", TEST_PASSWORD)]);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, me) = get_json(&app, "/auth/me", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(me["username"], "api-client");
    assert_eq!(me["is_admin"], false);
    assert!(me.get("hashed_password").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/token")
        .set_form([("username", "api-client"), ("password", "nope")]);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(detail(&body), "Invalid credentials");
}

/// Missing, garbage, foreign-secret and orphaned tokens all read as unauthenticated.
#[actix_rt::test]
async fn test_me_requires_valid_token() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/auth/me", None).await;
    assert_eq!(status, 401);
    assert_eq!(detail(&body), "Not authenticated");

    let (status, _) = get_json(&app, "/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, 401);

    // Valid signature but the user does not exist
    let (status, _) = get_json(&app, "/auth/me", Some(&token_for("ghost"))).await;
    assert_eq!(status, 401);
}

/// Anyone may register a regular user; duplicates are refused.
#[actix_rt::test]
async fn test_register_and_duplicates() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = post_json(
        &app,
        "/auth/register",
        None,
        serde_json::json!({"username": "bob", "email": "bob@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["username"], "bob");
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["message"], "User created successfully");

    let (status, body) = post_json(
        &app,
        "/auth/register",
        None,
        serde_json::json!({"username": "bob", "email": "other@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(detail(&body), "Username already registered");

    let (status, body) = post_json(
        &app,
        "/auth/register",
        None,
        serde_json::json!({"username": "bobby", "email": "bob@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(detail(&body), "Email already registered");

    let (status, _) = post_json(
        &app,
        "/auth/register",
        None,
        serde_json::json!({"username": "", "email": "e@example.com", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 400);
}

/// Creating an admin needs an admin caller.
#[actix_rt::test]
async fn test_register_admin_requires_admin() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let user_token = seed_user_with_token(&pool, "plain", false).await;
    let admin_token = seed_user_with_token(&pool, "root", true).await;

    let payload = serde_json::json!({
        "username": "second-admin",
        "email": "second@example.com",
        "password": "pw",
        "is_admin": true,
    });

    let (status, _) = post_json(&app, "/auth/register", None, payload.clone()).await;
    assert_eq!(status, 403);

    let (status, _) = post_json(&app, "/auth/register", Some(&user_token), payload.clone()).await;
    assert_eq!(status, 403);

    let (status, body) = post_json(&app, "/auth/register", Some(&admin_token), payload).await;
    assert_eq!(status, 200);
    assert_eq!(body["is_admin"], true);
}

/// User listing and deletion are admin-only; admins cannot delete themselves.
#[actix_rt::test]
async fn test_user_admin_endpoints() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let admin = seed_user(&pool, "root", true).await;
    let admin_token = token_for("root");
    let victim = seed_user(&pool, "victim", false).await;
    let user_token = token_for("victim");

    let (status, _) = get_json(&app, "/auth/users", None).await;
    assert_eq!(status, 401);

    let (status, body) = get_json(&app, "/auth/users", Some(&user_token)).await;
    assert_eq!(status, 403);
    assert_eq!(detail(&body), "Admin access required");

    let (status, body) = get_json(&app, "/auth/users", Some(&admin_token)).await;
    assert_eq!(status, 200);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["victim", "root"], "newest first");

    let (status, _) = delete(
        &app,
        &format!("/auth/users/{}", admin.id),
        Some(&user_token),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = delete(
        &app,
        &format!("/auth/users/{}", admin.id),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(detail(&body), "Cannot delete yourself");

    let (status, body) = delete(&app, "/auth/users/9999", Some(&admin_token)).await;
    assert_eq!(status, 404);
    assert_eq!(detail(&body), "User not found");

    let (status, body) = delete(
        &app,
        &format!("/auth/users/{}", victim.id),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "User victim deleted successfully");

    // The deleted user's token no longer resolves
    let (status, _) = get_json(&app, "/auth/me", Some(&user_token)).await;
    assert_eq!(status, 401);
}

/// Both logout flavours clear the cookie.
#[actix_rt::test]
async fn test_logout_clears_cookie() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/auth/logout").to_request()).await;
    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/auth/login")
    );
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
        .expect("logout should send a removal cookie");
    assert_eq!(cookie.value(), "");

    let (status, body) = post_empty(&app, "/auth/logout", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Logged out successfully");
}
