//! Keep-alive HTTP listener.
//!
//! Free hosting platforms idle out processes that expose no HTTP surface, so
//! the bot answers liveness probes on a side port. This touches no bot state;
//! a bind failure degrades to a warning and the bot keeps serving.

use axum::{routing::get, Router};
use tracing::{info, warn};

pub fn spawn(port: u16) {
    tokio::spawn(async move {
        let app = Router::new()
            .route("/", get(|| async { "gtb is alive" }))
            .route("/healthz", get(|| async { "ok" }));

        let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => listener,
            Err(e) => {
                warn!("keep-alive listener bind failed on port {port}: {e}");
                return;
            }
        };

        info!("keep-alive listener on port {port}");
        if let Err(e) = axum::serve(listener, app).await {
            warn!("keep-alive listener stopped: {e}");
        }
    });
}
