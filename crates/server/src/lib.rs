use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use auth::{AuthConfig, Claims, TokenError, TokenService};
pub use server::{ServerState, app, run_with_listener};

mod account;
mod auth;
mod convert;
mod ratings;
mod server;
mod stats;
mod stores;
mod users;

pub mod types {
    pub use api_types::{MessageResponse, Role};

    pub mod user {
        pub use api_types::user::{
            Login, LoginResponse, PasswordChange, SessionResponse, SignUp, SignUpResponse,
            UserEdit, UserQuery, UserView, UsersResponse,
        };
    }

    pub mod store {
        pub use api_types::store::{
            OwnerDashboard, StoreFeedback, StoreNew, StoreQuery, StoreView, StoresResponse,
        };
    }

    pub mod rating {
        pub use api_types::rating::{
            FeedbackEntry, RatingNew, RatingSaved, RatingSummary, RatingView, RatingsResponse,
            UserRatingView, UserRatingsResponse,
        };
    }

    pub mod stats {
        pub use api_types::stats::Dashboard;
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Token(TokenError),
    /// Missing bearer token, or one whose user no longer exists.
    Unauthenticated,
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput(_)
        | EngineError::InvalidRating(_)
        | EngineError::InvalidRole(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::PasswordHash(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(hash_err) => {
            tracing::error!("password hashing failed: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Token(TokenError::Generation(err)) => {
                tracing::error!("token generation failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Token(err) => {
                tracing::debug!("token rejected: {err}");
                (StatusCode::UNAUTHORIZED, "access denied".to_string())
            }
            ServerError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "access denied".to_string())
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<TokenError> for ServerError {
    fn from(value: TokenError) -> Self {
        Self::Token(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}
