//! Mapping between engine values and their wire representation.

use api_types::{
    rating::{FeedbackEntry, RatingSummary, RatingView},
    store::{StoreFeedback, StoreView},
    user::UserView,
};

pub fn role_to_api(role: engine::Role) -> api_types::Role {
    match role {
        engine::Role::NormalUser => api_types::Role::NormalUser,
        engine::Role::StoreOwner => api_types::Role::StoreOwner,
        engine::Role::Administrator => api_types::Role::Administrator,
    }
}

pub fn role_from_api(role: api_types::Role) -> engine::Role {
    match role {
        api_types::Role::NormalUser => engine::Role::NormalUser,
        api_types::Role::StoreOwner => engine::Role::StoreOwner,
        api_types::Role::Administrator => engine::Role::Administrator,
    }
}

pub fn user_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        address: user.address,
        role: role_to_api(user.role),
        created_at: user.created_at,
    }
}

pub fn store_view(store: engine::Store, summary: &engine::RatingSummary) -> StoreView {
    StoreView {
        id: store.id,
        name: store.name,
        address: store.address,
        owner_id: store.owner_id,
        created_at: store.created_at,
        average_rating: summary.average_display(),
        rating_count: summary.count,
    }
}

pub fn rating_view(rating: engine::Rating) -> RatingView {
    RatingView {
        id: rating.id,
        store_id: rating.store_id,
        user_id: rating.user_id,
        rating: rating.rating,
        created_at: rating.created_at,
        updated_at: rating.updated_at,
    }
}

pub fn summary_view(summary: &engine::RatingSummary) -> RatingSummary {
    RatingSummary {
        store_id: summary.store_id,
        average: summary.average(),
        average_display: summary.average_display(),
        count: summary.count,
        distribution: summary.distribution,
    }
}

pub fn feedback_view(feedback: engine::StoreFeedback) -> StoreFeedback {
    StoreFeedback {
        summary: summary_view(&feedback.summary),
        store: store_view(feedback.store, &feedback.summary),
        ratings: feedback
            .ratings
            .into_iter()
            .map(|entry| FeedbackEntry {
                rating: rating_view(entry.rating),
                user_name: entry.user_name,
                user_email: entry.user_email,
            })
            .collect(),
    }
}
