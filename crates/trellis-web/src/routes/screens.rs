//! `GET /screens/{screenId}`

use crate::composer::ComposeError;
use crate::state::AppState;
use crate::WebError;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, warn};
use trellis_core::{Screen, ScreenRequest};

pub fn screen_routes() -> Router<AppState> {
    Router::new()
        .route("/screens", get(missing_screen_id))
        .route("/screens/", get(missing_screen_id))
        .route("/screens/{screen_id}", get(get_screen))
}

async fn missing_screen_id() -> WebError {
    WebError::BadRequest("screenId is required".into())
}

async fn get_screen(
    State(state): State<AppState>,
    Path(screen_id): Path<String>,
    query: Result<Query<ScreenRequest>, QueryRejection>,
) -> Result<Json<Screen>, WebError> {
    let Query(mut request) = query.map_err(|rejection| {
        warn!(%rejection, "Rejected screen query");
        WebError::BadRequest(rejection.body_text())
    })?;
    request.screen_id = screen_id;

    let screen = tokio::time::timeout(state.compose_timeout, state.composers.compose(&request))
        .await
        .map_err(|_| ComposeError::TimedOut(state.compose_timeout))??;

    info!(
        screen_id = %request.screen_id,
        version = screen.version,
        nodes = screen.component.node_count(),
        "Composed screen"
    );
    Ok(Json(screen))
}
