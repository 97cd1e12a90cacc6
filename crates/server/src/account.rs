//! Registration, login and session endpoints.

use api_types::user::{Login, LoginResponse, SessionResponse, SignUp, SignUpResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::WithRejection;
use engine::{NewUser, Session};

use crate::{
    ServerError,
    convert::{role_from_api, user_view},
    server::ServerState,
};

pub async fn sign_up(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<SignUp>, ServerError>,
) -> Result<(StatusCode, Json<SignUpResponse>), ServerError> {
    let user = state
        .engine
        .sign_up(NewUser {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            password: payload.password,
            role: role_from_api(payload.role),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: "User registered successfully".to_string(),
            user: user_view(user),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<Login>, ServerError>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .engine
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state.tokens.issue(user.id, &user.email)?;
    tracing::info!(user_id = user.id, "login");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: user_view(user),
    }))
}

/// Echo the user behind the presented token.
pub async fn is_login(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<SessionResponse>, ServerError> {
    let user = state.engine.user(session.user_id).await?;
    Ok(Json(SessionResponse {
        success: true,
        user: user_view(user),
    }))
}
