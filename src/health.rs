//! Liveness HTTP surface for external process supervision.
//!
//! Exposes `GET /health` (JSON) and a small human status page on `/`.
//! This runs beside the dispatcher and is not part of the moderation
//! contract.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::State;
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use tracing::{error, info};

/// Shared flag flipped on once the dispatcher is about to run.
#[derive(Clone, Default)]
pub struct BotStatus {
    running: Arc<AtomicBool>,
}

impl BotStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Spawn the health server on the given port.
pub fn spawn(port: u16, status: BotStatus) {
    let app = Router::new()
        .route("/", get(status_page))
        .route("/health", get(health))
        .with_state(status);

    let address = SocketAddr::from(([0, 0, 0, 0], port));

    tokio::spawn(async move {
        info!("Health server listening on {}", address);
        match tokio::net::TcpListener::bind(address).await {
            Ok(listener) => {
                if let Err(e) = axum::serve(listener, app).await {
                    error!("Health server error: {}", e);
                }
            }
            Err(e) => error!("Failed to bind health server on {}: {}", address, e),
        }
    });
}

async fn health(State(status): State<BotStatus>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "bot_running": status.is_running(),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

async fn status_page(State(status): State<BotStatus>) -> Html<String> {
    let light = if status.is_running() { "🟢" } else { "🔴" };
    Html(format!(
        "<html>\
         <head><title>Warden Bot</title></head>\
         <body>\
         <h1>🤖 Warden Moderation Bot</h1>\
         <p>Status: {} {}</p>\
         <p><a href=\"/health\">Health Check</a></p>\
         </body>\
         </html>",
        light,
        if status.is_running() { "Running" } else { "Stopped" }
    ))
}
