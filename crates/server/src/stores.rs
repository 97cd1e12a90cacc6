//! Store listing, feedback and administration endpoints.

use api_types::{
    MessageResponse,
    store::{OwnerDashboard, StoreFeedback, StoreNew, StoreQuery, StoreView, StoresResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{RatingSummary, Session, StoreDraft, StoreFilter};

use crate::{
    ServerError,
    convert::{feedback_view, store_view},
    server::ServerState,
};

fn draft(payload: StoreNew) -> StoreDraft {
    StoreDraft {
        name: payload.name,
        address: payload.address,
        owner_id: payload.owner_id,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<StoreQuery>, ServerError>,
) -> Result<Json<StoresResponse>, ServerError> {
    let stores = state
        .engine
        .stores(&StoreFilter {
            search: query.search,
        })
        .await?;

    Ok(Json(StoresResponse {
        stores: stores
            .into_iter()
            .map(|listing| store_view(listing.store, &listing.summary))
            .collect(),
    }))
}

pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<StoreNew>, ServerError>,
) -> Result<(StatusCode, Json<StoreView>), ServerError> {
    let store = state.engine.add_store(&session, draft(payload)).await?;
    let summary = RatingSummary::empty(store.id);

    Ok((StatusCode::CREATED, Json(store_view(store, &summary))))
}

pub async fn edit(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(store_id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<StoreNew>, ServerError>,
) -> Result<Json<StoreView>, ServerError> {
    let store = state
        .engine
        .edit_store(&session, store_id, draft(payload))
        .await?;
    let summary = state.engine.store_summary(store.id).await?;

    Ok(Json(store_view(store, &summary)))
}

pub async fn remove(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(store_id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_store(&session, store_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Store deleted successfully".to_string(),
    }))
}

/// Ratings of one store, for its owner or an administrator.
pub async fn feedback(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(store_id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<StoreFeedback>, ServerError> {
    let feedback = state.engine.store_feedback(&session, store_id).await?;
    Ok(Json(feedback_view(feedback)))
}

pub async fn owner_dashboard(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<OwnerDashboard>, ServerError> {
    let stores = state.engine.owner_dashboard(&session).await?;
    Ok(Json(OwnerDashboard {
        stores: stores.into_iter().map(feedback_view).collect(),
    }))
}
