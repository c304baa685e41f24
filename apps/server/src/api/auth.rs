//! Username/password authentication routes.
//!
//! Browser clients use `POST /auth/login`, which sets the `access_token`
//! HttpOnly cookie and redirects to the dashboard. API clients use
//! `POST /auth/token` and send the token as `Authorization: Bearer`.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, delete, get, post, web};
use tracing::{info, warn};

use crate::auth::{
    ACCESS_TOKEN_COOKIE, CurrentUser, RequireAuth, TokenService, hash_password, verify_password,
};
use crate::config::Config;
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    LoginForm, MessageResponse, RegisterRequest, RegisterResponse, TokenResponse, User,
    UserListItem, UserResponse,
};

/// Where a successful browser login lands.
const DASHBOARD_PATH: &str = "/dashboard";
/// Where a browser logout lands.
const LOGIN_PATH: &str = "/auth/login";

/// Configure auth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout_redirect)
        .service(logout)
        .service(issue_token)
        .service(get_current_user)
        .service(register)
        .service(list_users)
        .service(delete_user);
}

/// Which wording a credential failure uses.
enum LoginFlow {
    Browser,
    Api,
}

/// Check credentials, stamp `last_login`, and return the refreshed user.
async fn authenticate(pool: &DbPool, form: &LoginForm, flow: LoginFlow) -> AppResult<User> {
    let (bad_credentials, inactive) = match flow {
        LoginFlow::Browser => ("Invalid username or password", "Account is inactive"),
        LoginFlow::Api => ("Invalid credentials", "Inactive account"),
    };

    let user = db::users::find_by_username(pool.connection(), &form.username).await?;
    let user = match user {
        Some(u) if verify_password(&form.password, &u.hashed_password) => u,
        _ => {
            warn!("Failed login for username '{}'", form.username);
            return Err(AppError::Unauthorized(bad_credentials.to_string()));
        }
    };

    if !user.is_active {
        warn!("Login refused for inactive user '{}'", user.username);
        return Err(AppError::Unauthorized(inactive.to_string()));
    }

    let user = db::users::touch_last_login(pool.connection(), user.id).await?;
    info!("User '{}' logged in", user.username);
    Ok(user)
}

fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.environment.is_production());
    cookie.set_max_age(actix_web::cookie::time::Duration::seconds(
        config.session_max_age_secs(),
    ));
    cookie
}

fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.environment.is_production());
    cookie.make_removal();
    cookie
}

/// Browser login: set the session cookie and redirect to the dashboard.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Logged in, redirecting to /dashboard"),
        (status = 401, description = "Bad credentials or inactive account", body = crate::error::ErrorResponse),
    )
)]
#[post("/auth/login")]
pub async fn login(
    form: web::Form<LoginForm>,
    pool: web::Data<DbPool>,
    tokens: web::Data<TokenService>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let user = authenticate(&pool, &form, LoginFlow::Browser).await?;
    let token = tokens.create(&user.username, None)?;

    Ok(HttpResponse::Found()
        .cookie(session_cookie(token, &config))
        .append_header((LOCATION, DASHBOARD_PATH))
        .finish())
}

/// Browser logout: clear the cookie and redirect to the login page.
#[utoipa::path(
    get,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 302, description = "Cookie cleared, redirecting to /auth/login"))
)]
#[get("/auth/logout")]
pub async fn logout_redirect(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Found()
        .cookie(removal_cookie(&config))
        .append_header((LOCATION, LOGIN_PATH))
        .finish()
}

/// API logout: clear the cookie.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Cookie cleared", body = MessageResponse))
)]
#[post("/auth/logout")]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie(&config))
        .json(MessageResponse::new("Logged out successfully"))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/token",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Bad credentials or inactive account", body = crate::error::ErrorResponse),
    )
)]
#[post("/auth/token")]
pub async fn issue_token(
    form: web::Form<LoginForm>,
    pool: web::Data<DbPool>,
    tokens: web::Data<TokenService>,
) -> AppResult<HttpResponse> {
    let user = authenticate(&pool, &form, LoginFlow::Api).await?;
    let token = tokens.create(&user.username, None)?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}

/// Current user.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/auth/me")]
pub async fn get_current_user(auth: RequireAuth) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(auth.user))
}

/// Register a user. Creating an admin requires an admin caller.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = RegisterResponse),
        (status = 400, description = "Duplicate username or email", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin required to create an admin", body = crate::error::ErrorResponse),
    )
)]
#[post("/auth/register")]
pub async fn register(
    caller: CurrentUser,
    body: web::Json<RegisterRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username, email and password are required".to_string(),
        ));
    }

    if req.is_admin && !caller.0.as_ref().is_some_and(|u| u.is_admin) {
        warn!("Refused admin registration for '{}'", req.username);
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    if db::users::find_by_username(pool.connection(), &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidInput(
            "Username already registered".to_string(),
        ));
    }
    if db::users::find_by_email(pool.connection(), &req.email)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidInput("Email already registered".to_string()));
    }

    let hashed = hash_password(&req.password)?;
    let user = db::users::insert(
        pool.connection(),
        db::users::NewUser {
            username: &req.username,
            email: &req.email,
            hashed_password: &hashed,
            is_admin: req.is_admin,
        },
    )
    .await?;

    info!(
        "Registered user '{}' (id={}, admin={})",
        user.username, user.id, user.is_admin
    );

    Ok(HttpResponse::Ok().json(RegisterResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        is_admin: user.is_admin,
        message: "User created successfully".to_string(),
    }))
}

/// List users, newest first (admin only).
#[utoipa::path(
    get,
    path = "/auth/users",
    tag = "Auth",
    responses(
        (status = 200, description = "All users", body = Vec<UserListItem>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/auth/users")]
pub async fn list_users(auth: RequireAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let users: Vec<UserListItem> = db::users::list_all(pool.connection())
        .await?
        .into_iter()
        .map(UserListItem::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// Delete a user (admin only). Admins cannot delete themselves.
#[utoipa::path(
    delete,
    path = "/auth/users/{user_id}",
    tag = "Auth",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete yourself", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[delete("/auth/users/{user_id}")]
pub async fn delete_user(
    auth: RequireAuth,
    path: web::Path<i32>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let admin = auth.require_admin()?;
    let user_id = path.into_inner();

    let target = db::users::find_by_id(pool.connection(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if target.id == admin.id {
        return Err(AppError::InvalidInput("Cannot delete yourself".to_string()));
    }

    db::users::delete(pool.connection(), target.id).await?;
    info!(
        "User '{}' deleted by admin '{}'",
        target.username, admin.username
    );

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "User {} deleted successfully",
        target.username
    ))))
}
