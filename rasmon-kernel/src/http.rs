/**
 * API REST RASMON - Serveur HTTP du kernel
 *
 * RÔLE :
 * Expose le snapshot du cluster 1C et la configuration effective au dashboard.
 *
 * FONCTIONNEMENT :
 * - Serveur Axum, état partagé `AppState<C>` générique sur le client rac
 * - Routes : /health, /api/snapshot, /api/settings
 * - Chaque GET /api/snapshot déclenche un cycle de polling complet (aucun cache)
 * - Erreurs sérialisées en `{"detail": "..."}` avec 404 / 500 / 502
 */

use crate::client::RacClient;
use crate::config::Settings;
use crate::models::Snapshot;
use crate::snapshot::{FailureClass, SnapshotError};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use tracing::error;

pub fn build_router<C: RacClient + 'static>(app_state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/snapshot", get(get_snapshot::<C>))
        .route("/api/settings", get(get_settings::<C>))
        .with_state(app_state)
}

/// Résolution -> 404, validation -> 500, acquisition -> 502.
pub fn status_for(class: FailureClass) -> StatusCode {
    match class {
        FailureClass::NotFound => StatusCode::NOT_FOUND,
        FailureClass::Validation => StatusCode::INTERNAL_SERVER_ERROR,
        FailureClass::Upstream => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for SnapshotError {
    fn into_response(self) -> Response {
        let status = status_for(self.class());
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "snapshot request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

// GET /api/snapshot
async fn get_snapshot<C: RacClient + 'static>(
    State(app): State<AppState<C>>,
) -> Result<Json<Snapshot>, SnapshotError> {
    app.collector.collect().await.map(Json)
}

// GET /api/settings
async fn get_settings<C: RacClient + 'static>(State(app): State<AppState<C>>) -> Json<Settings> {
    Json(app.settings.as_ref().clone())
}
