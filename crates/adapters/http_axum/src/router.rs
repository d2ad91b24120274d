//! Axum router assembly.

use std::path::PathBuf;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use porchlight_app::ports::{DeviceRegistry, DeviceTransport, ScheduleRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the API routes, plus the dashboard assets from `static_dir` for
/// every other path when one is given. Includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level.
pub fn build<G, T, R>(state: AppState<G, T, R>, static_dir: Option<PathBuf>) -> Router
where
    G: DeviceRegistry + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let router = Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes());

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
