//! Settings API handlers: the target system configuration and its connection test.

use actix_web::{HttpResponse, web};
use secrecy::SecretString;
use tracing::info;

use crate::auth::RequireAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    ConnectionTestRequest, ConnectionTestResponse, MessageResponse, SettingsResponse,
    SettingsUpdate,
};
use crate::services::ConnectionProber;

/// Current settings, with defaults for anything never saved.
#[utoipa::path(
    get,
    path = "/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn get_settings(
    _auth: RequireAuth,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let settings = pool
        .get_settings()
        .await?
        .map(SettingsResponse::from)
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(settings))
}

/// Overwrite the settings row.
#[utoipa::path(
    post,
    path = "/settings",
    tag = "Settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings saved", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn save_settings(
    auth: RequireAuth,
    pool: web::Data<DbPool>,
    body: web::Json<SettingsUpdate>,
) -> AppResult<HttpResponse> {
    pool.save_settings(body.into_inner(), &auth.user.username)
        .await?;
    info!("Settings saved by '{}'", auth.user.username);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Settings saved successfully")))
}

/// Probe `{url}/health` on the target system.
#[utoipa::path(
    post,
    path = "/settings/test-connection",
    tag = "Settings",
    request_body = ConnectionTestRequest,
    responses(
        (status = 200, description = "Target answered", body = ConnectionTestResponse),
        (status = 400, description = "URL is required", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 500, description = "Connection test failed", body = crate::error::ErrorResponse),
        (status = 503, description = "Cannot connect", body = crate::error::ErrorResponse),
        (status = 504, description = "Connection timeout", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn test_connection(
    _auth: RequireAuth,
    prober: web::Data<ConnectionProber>,
    body: web::Json<ConnectionTestRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let token = req.token.map(SecretString::from);
    let result = prober.probe(&req.url, token).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Configure settings routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/settings")
            .route(web::get().to(get_settings))
            .route(web::post().to(save_settings)),
    )
    .service(web::resource("/settings/test-connection").route(web::post().to(test_connection)));
}
