//! Mock AIOps target for connection tests.
//!
//! Starts an in-process HTTP server whose `/health` answers according to the
//! chosen behaviour, and records the `Authorization` header it last saw.

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, web};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock `/health` endpoint answers.
#[derive(Clone, Copy, Debug)]
pub enum HealthBehaviour {
    /// 200 with a JSON body.
    Json,
    /// 200 with a long plain-text body.
    Text,
    /// 500 with a JSON body.
    ServerError,
    /// Sleeps well past the client timeout before answering.
    Slow,
}

/// Length of the plain-text body served by `HealthBehaviour::Text`.
pub const TEXT_BODY_LEN: usize = 500;

struct MockState {
    behaviour: HealthBehaviour,
    last_authorization: Mutex<Option<String>>,
}

#[get("/health")]
async fn health(req: HttpRequest, state: web::Data<Arc<MockState>>) -> HttpResponse {
    let auth = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    *state.last_authorization.lock().unwrap() = auth;

    match state.behaviour {
        HealthBehaviour::Json => {
            HttpResponse::Ok().json(serde_json::json!({"status": "ok", "version": "2.3.1"}))
        }
        HealthBehaviour::Text => HttpResponse::Ok()
            .content_type("text/plain")
            .body("x".repeat(TEXT_BODY_LEN)),
        HealthBehaviour::ServerError => HttpResponse::InternalServerError()
            .json(serde_json::json!({"status": "degraded"})),
        HealthBehaviour::Slow => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            HttpResponse::Ok().json(serde_json::json!({"status": "late"}))
        }
    }
}

/// Mock target server.
pub struct MockAiopsTarget {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockAiopsTarget {
    /// Start the mock target on an ephemeral port.
    pub async fn start(behaviour: HealthBehaviour) -> Self {
        let state = Arc::new(MockState {
            behaviour,
            last_authorization: Mutex::new(None),
        });

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(health)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Lives until the test's runtime shuts down
        tokio::spawn(server);

        MockAiopsTarget { base_url, state }
    }

    /// `Authorization` header of the most recent `/health` request.
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }
}

/// A local URL that refuses connections.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
