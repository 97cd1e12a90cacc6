use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use std::sync::Arc;

use crate::{
    ServerError, account,
    auth::{AuthConfig, TokenService},
    ratings, stats, stores, users,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenService>,
}

/// Resolve the bearer token into an `engine::Session` request extension.
async fn auth(
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    // Missing, non-bearer and unparsable headers are all unauthenticated.
    let bearer = match auth_header {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(rejection) => {
            tracing::debug!("authorization header rejected: {rejection}");
            return Err(ServerError::Unauthenticated);
        }
    };

    let claims = state.tokens.verify(bearer.token())?;
    let session = match state.engine.session(claims.user_id()?).await {
        Ok(session) => session,
        Err(EngineError::KeyNotFound(_)) => {
            tracing::warn!(sub = %claims.sub, "token for a deleted user");
            return Err(ServerError::Unauthenticated);
        }
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/sign-up", post(account::sign_up))
        .route("/login", post(account::login))
        .route("/get-users", get(users::list))
        .route("/get-stores", get(stores::list))
        .route("/get-ratings", get(ratings::list))
        .route("/stores/{store_id}/summary", get(ratings::summary));

    let protected = Router::new()
        .route("/is-login", get(account::is_login))
        .route("/add-rating/{store_id}", post(ratings::upsert))
        .route("/user-ratings", get(ratings::mine))
        .route("/stores/{store_id}/ratings", get(stores::feedback))
        .route("/owner/dashboard", get(stores::owner_dashboard))
        .route("/change-password/{user_id}", put(users::change_password))
        .route("/edit-user/{user_id}", put(users::edit))
        .route("/add-user", post(users::create))
        .route("/delete-user/{user_id}", delete(users::remove))
        .route("/add-store", post(stores::create))
        .route("/edit-store/{store_id}", put(stores::edit))
        .route("/delete-store/{store_id}", delete(stores::remove))
        .route("/admin/dashboard", get(stats::dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(protected).with_state(state)
}

/// Build the application router with every route under `base_path`.
pub fn app(engine: Engine, auth: AuthConfig, base_path: &str) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
        tokens: Arc::new(TokenService::new(auth)),
    };

    let routes = router(state);
    let base_path = base_path.trim_end_matches('/');
    if base_path.is_empty() {
        routes
    } else if base_path.starts_with('/') {
        Router::new().nest(base_path, routes)
    } else {
        Router::new().nest(&format!("/{base_path}"), routes)
    }
}

pub async fn run_with_listener(
    engine: Engine,
    auth: AuthConfig,
    base_path: &str,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}{}", addr, base_path);

    axum::serve(listener, app(engine, auth, base_path)).await
}
