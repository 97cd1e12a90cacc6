//! Rating endpoints.

use api_types::rating::{
    RatingNew, RatingSaved, RatingSummary, RatingsResponse, UserRatingView, UserRatingsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::Session;

use crate::{
    ServerError,
    convert::{rating_view, summary_view},
    server::ServerState,
};

/// Create or replace the caller's rating of a store.
pub async fn upsert(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(store_id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<RatingNew>, ServerError>,
) -> Result<Json<RatingSaved>, ServerError> {
    let rating = state
        .engine
        .upsert_rating(&session, store_id, payload.rating)
        .await?;

    Ok(Json(RatingSaved {
        success: true,
        message: "Rating saved successfully".to_string(),
        rating: rating_view(rating),
    }))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<RatingsResponse>, ServerError> {
    let ratings = state.engine.ratings().await?;
    Ok(Json(RatingsResponse {
        ratings: ratings.into_iter().map(rating_view).collect(),
    }))
}

pub async fn mine(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<UserRatingsResponse>, ServerError> {
    let ratings = state.engine.user_ratings(&session).await?;
    Ok(Json(UserRatingsResponse {
        ratings: ratings
            .into_iter()
            .map(|entry| UserRatingView {
                rating: rating_view(entry.rating),
                store_name: entry.store_name,
                store_address: entry.store_address,
            })
            .collect(),
    }))
}

pub async fn summary(
    State(state): State<ServerState>,
    WithRejection(Path(store_id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<RatingSummary>, ServerError> {
    let summary = state.engine.store_summary(store_id).await?;
    Ok(Json(summary_view(&summary)))
}
