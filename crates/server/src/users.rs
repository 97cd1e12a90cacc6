//! User management endpoints.

use api_types::{
    MessageResponse,
    user::{PasswordChange, SignUp, UserEdit, UserQuery, UserView, UsersResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{NewUser, Session, UserFilter};

use crate::{
    ServerError,
    convert::{role_from_api, user_view},
    server::ServerState,
};

pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, ServerError>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .users(&UserFilter {
            search: query.search,
            role: query.role.map(role_from_api),
        })
        .await?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(user_view).collect(),
    }))
}

/// Administrator creation of an account of any role.
pub async fn create(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<SignUp>, ServerError>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .create_user(
            &session,
            NewUser {
                name: payload.name,
                email: payload.email,
                address: payload.address,
                password: payload.password,
                role: role_from_api(payload.role),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user_view(user))))
}

pub async fn edit(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<UserEdit>, ServerError>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .edit_user(
            &session,
            user_id,
            engine::UserEdit {
                name: payload.name,
                email: payload.email,
                address: payload.address,
                role: payload.role.map(role_from_api),
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(user_view(user)))
}

pub async fn change_password(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PasswordChange>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .change_password(
            &session,
            user_id,
            &payload.old_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated successfully".to_string(),
    }))
}

pub async fn remove(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_user(&session, user_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "User deleted successfully".to_string(),
    }))
}
