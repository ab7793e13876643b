// HTTP request handlers
use crate::application::monitor_service::MonitorStats;
use crate::application::router::RouterSnapshot;
use crate::domain::notice::Notice;
use crate::presentation::app_state::AppState;
use axum::{
    Json, Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::Stream;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/series", get(series_snapshot))
        .route("/stats", get(monitor_stats))
        .route("/notices", get(stream_notices))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current contents of every series window
pub async fn series_snapshot(State(state): State<Arc<AppState>>) -> Json<RouterSnapshot> {
    Json(state.monitor_service.snapshot())
}

pub async fn monitor_stats(State(state): State<Arc<AppState>>) -> Json<MonitorStats> {
    Json(state.monitor_service.stats())
}

/// Live notices as server-sent events
pub async fn stream_notices(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    Sse::new(notice_events(state.notices.subscribe())).keep_alive(KeepAlive::default())
}

fn notice_events(
    mut rx: broadcast::Receiver<Notice>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(notice) => {
                    yield Event::default().event(notice.event_name()).json_data(&notice);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notice subscriber lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
