//! Administrator dashboard endpoint.

use api_types::stats::Dashboard;
use axum::{Extension, Json, extract::State};
use engine::Session;

use crate::{ServerError, server::ServerState};

pub async fn dashboard(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Dashboard>, ServerError> {
    let stats = state.engine.dashboard(&session).await?;

    Ok(Json(Dashboard {
        total_users: stats.total_users,
        total_stores: stats.total_stores,
        total_ratings: stats.total_ratings,
        normal_users: stats.normal_users,
        store_owners: stats.store_owners,
        administrators: stats.administrators,
    }))
}
