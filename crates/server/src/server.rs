use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{expenses, exports, statistics, user};
use engine::{Engine, UserId};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Account resolved from the request's Basic credentials.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser(pub UserId);

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user_id = match state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
    {
        Ok(Some(user_id)) => user_id,
        Ok(None) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("authentication failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let protected = Router::new()
        .route("/me", get(user::me))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::get).delete(expenses::delete),
        )
        .route("/stats", get(statistics::dashboard))
        .route("/stats/categories", get(statistics::categories))
        .route("/stats/monthly", get(statistics::monthly))
        .route("/stats/daily", get(statistics::daily))
        .route("/reports/{year}/{month}", get(statistics::monthly_report))
        .route("/export", get(exports::export))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/signup", post(user::signup))
        .merge(protected)
        .with_state(state)
}

/// Binds `addr` (e.g. `127.0.0.1:3000`) and serves until the listener fails.
pub async fn run(engine: Engine, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
