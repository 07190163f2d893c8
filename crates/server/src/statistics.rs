//! Statistics API endpoints

use api_types::stats::DailyQuery;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use engine::{CategoryTotal, DailyTotal, Dashboard, MonthlyReport, MonthlyTotal};

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

const DEFAULT_DAILY_WINDOW: usize = 30;

/// Handle requests for the caller's overview
pub async fn dashboard(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Dashboard>, ServerError> {
    let dashboard = state
        .engine
        .dashboard(user_id, Utc::now().naive_utc())
        .await?;
    Ok(Json(dashboard))
}

pub async fn categories(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryTotal>>, ServerError> {
    Ok(Json(state.engine.category_summary(user_id).await?))
}

pub async fn monthly(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MonthlyTotal>>, ServerError> {
    Ok(Json(state.engine.monthly_series(user_id).await?))
}

pub async fn daily(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<DailyTotal>>, ServerError> {
    let window = query.window.unwrap_or(DEFAULT_DAILY_WINDOW);
    Ok(Json(state.engine.daily_series(user_id, window).await?))
}

pub async fn monthly_report(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthlyReport>, ServerError> {
    Ok(Json(state.engine.monthly_report(user_id, month, year).await?))
}
