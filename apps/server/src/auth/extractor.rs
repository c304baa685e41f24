//! Actix-web extractors resolving the calling user from an access token.
//!
//! The token is read from the `access_token` cookie first, then from an
//! `Authorization: Bearer` header. Token values are never logged.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};

use super::TokenService;
use crate::db::{self, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Cookie carrying the browser session token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Pull the raw token from cookie or bearer header, wrapped in SecretString.
fn extract_token(req: &HttpRequest) -> Option<SecretString> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(SecretString::from(cookie.value().to_string()));
        }
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.to_string()))
}

/// Resolve the caller. Absent, invalid, or expired tokens and unknown users yield `None`.
async fn resolve_user(
    token: Option<SecretString>,
    tokens: Option<web::Data<TokenService>>,
    pool: Option<web::Data<DbPool>>,
) -> AppResult<Option<User>> {
    let (tokens, pool) = match (tokens, pool) {
        (Some(t), Some(p)) => (t, p),
        _ => {
            return Err(AppError::Internal(
                "Authentication is not configured".to_string(),
            ));
        }
    };

    let token = match token {
        Some(t) => t,
        None => return Ok(None),
    };

    let claims = match tokens.verify(token.expose_secret()) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("Rejected access token: {}", e);
            return Ok(None);
        }
    };

    db::users::find_by_username(pool.connection(), &claims.sub).await
}

/// Optional caller: `None` when the request is anonymous.
///
/// ```ignore
/// async fn handler(caller: CurrentUser) -> impl Responder {
///     if let Some(user) = caller.0 { /* ... */ }
/// }
/// ```
pub struct CurrentUser(pub Option<User>);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_token(req);
        let tokens = req.app_data::<web::Data<TokenService>>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move { resolve_user(token, tokens, pool).await.map(CurrentUser) })
    }
}

/// Extractor that requires an authenticated caller.
///
/// Rejects with 401 `{"detail": "Not authenticated"}`.
pub struct RequireAuth {
    pub user: User,
}

impl RequireAuth {
    /// Fail with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> AppResult<&User> {
        if self.user.is_admin {
            Ok(&self.user)
        } else {
            tracing::warn!(
                "Admin access denied for user '{}'",
                self.user.username
            );
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }
}

impl FromRequest for RequireAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_token(req);
        let tokens = req.app_data::<web::Data<TokenService>>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            match resolve_user(token, tokens, pool).await? {
                Some(user) => Ok(RequireAuth { user }),
                None => Err(AppError::Unauthorized("Not authenticated".to_string())),
            }
        })
    }
}
