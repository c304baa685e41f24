//! Request logging middleware.
//!
//! Every request is logged once on arrival and once on completion, tagged with
//! the API area it belongs to. Credentials (the `Authorization` header and the
//! session cookie) are never logged, only whether one was presented.

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::auth::ACCESS_TOKEN_COOKIE;

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// API area a path belongs to, used to group log lines.
fn area(path: &str) -> &'static str {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
    match first {
        "auth" => "auth",
        "settings" => "settings",
        "test-suites" => "suites",
        "test-cases" => "cases",
        "test-runs" => "runs",
        "health" | "ready" => "probe",
        "api-docs" => "docs",
        _ => "other",
    }
}

/// Which kind of credential the request carries.
fn credential_kind(req: &ServiceRequest) -> &'static str {
    if req
        .cookie(ACCESS_TOKEN_COOKIE)
        .is_some_and(|c| !c.value().is_empty())
    {
        "cookie"
    } else if req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("bearer "))
    {
        "bearer"
    } else {
        "none"
    }
}

struct RequestSummary {
    method: String,
    path: String,
    area: &'static str,
}

impl RequestSummary {
    fn finished(&self, status: StatusCode, elapsed: Duration) {
        let status_code = status.as_u16();
        let duration_ms = elapsed.as_millis();

        if status.is_server_error() {
            warn!(
                target: "api",
                area = self.area,
                method = %self.method,
                path = %self.path,
                status = status_code,
                duration_ms = %duration_ms,
                "← Server error"
            );
        } else if status.is_client_error() {
            warn!(
                target: "api",
                area = self.area,
                method = %self.method,
                path = %self.path,
                status = status_code,
                duration_ms = %duration_ms,
                "← Client error"
            );
        } else if self.area == "probe" {
            // Health probes arrive every few seconds
            debug!(
                target: "api",
                path = %self.path,
                status = status_code,
                "← Probe answered"
            );
        } else {
            info!(
                target: "api",
                area = self.area,
                method = %self.method,
                path = %self.path,
                status = status_code,
                duration_ms = %duration_ms,
                "← Request completed"
            );
        }
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let summary = RequestSummary {
            method: req.method().to_string(),
            path: req.path().to_string(),
            area: area(req.path()),
        };
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        if summary.area == "probe" {
            debug!(target: "api", path = %summary.path, "→ Probe received");
        } else {
            info!(
                target: "api",
                area = summary.area,
                method = %summary.method,
                path = %summary.path,
                remote_addr = %remote_addr,
                credentials = credential_kind(&req),
                "→ Request started"
            );
        }

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            summary.finished(res.status(), start.elapsed());
            Ok(res)
        })
    }
}
