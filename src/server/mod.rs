//! Development server: serves the public directory and the view counter

use anyhow::Result;
use axum::{
    extract::{Path as UrlPath, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::build;
use crate::views::{display_count, MemoryViewCounter, ViewCounter};
use crate::Site;

/// Server state
struct ServerState {
    counter: Arc<dyn ViewCounter>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ViewCountResponse {
    key: String,
    /// `None` when the counter failed; the page shows no count
    count: Option<u64>,
}

fn router(site: &Site, counter: Arc<dyn ViewCounter>) -> Router {
    let state = Arc::new(ServerState { counter });
    Router::new()
        .route("/api/views/*key", post(count_view))
        .with_state(state)
        .fallback_service(ServeDir::new(&site.public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
}

/// Start the development server. With `watch`, content changes trigger a
/// rebuild in the background.
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool) -> Result<()> {
    let counter: Arc<dyn ViewCounter> = Arc::new(MemoryViewCounter::new());
    let app = router(site, counter);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Rebuilding on changes.");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let site = site.clone();
        tokio::task::spawn_blocking(move || {
            let result = build::watch(&site, |summary| {
                println!("Rebuilt {} pages", summary.pages);
            });
            if let Err(e) = result {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `POST /api/views/*key` counts one view of the page at `/<key>`
async fn count_view(
    State(state): State<Arc<ServerState>>,
    UrlPath(key): UrlPath<String>,
) -> Json<ViewCountResponse> {
    let key = format!("/{}", key.trim_start_matches('/'));
    let count = display_count(state.counter.as_ref(), &key);
    Json(ViewCountResponse { key, count })
}
