//! Expenses API endpoints

use api_types::expense::{
    ExpenseCreated, ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    Category, CategoryFilter, Deletion, Expense, ExpenseFilter, ExpenseId, MoneyCents, NewExpense,
    SortOrder,
};

use crate::{
    ServerError,
    server::{AuthUser, ServerState},
};

fn view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id.0,
        date: expense.date,
        category: expense.category.to_string(),
        amount_minor: expense.amount.cents(),
        description: expense.description,
        created_at: expense.created_at,
    }
}

/// Lists the caller's expenses, optionally filtered by category and recency.
pub async fn list(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseList>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let category = match query.category.as_deref() {
        Some(category) => category.parse::<CategoryFilter>()?,
        None => CategoryFilter::All,
    };
    let order = match query.sort.as_deref() {
        Some(sort) => sort.parse::<SortOrder>()?,
        None => SortOrder::default(),
    };
    let filter = ExpenseFilter {
        category,
        since_days: query.days,
    };

    let expenses = state
        .engine
        .filtered_expenses(user_id, &filter, order, Utc::now().naive_utc())
        .await?;
    let total: MoneyCents = expenses.iter().map(|e| e.amount).sum();

    Ok(Json(ExpenseListResponse {
        expenses: expenses.into_iter().map(view).collect(),
        total_minor: total.cents(),
    }))
}

pub async fn create(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let category = Category::try_from(payload.category.as_str())?;
    let expense = NewExpense::new(
        payload.date,
        category,
        MoneyCents::new(payload.amount_minor),
        payload.description.as_deref(),
    );

    let id = state.engine.add_expense(user_id, expense).await?;
    Ok((StatusCode::CREATED, Json(ExpenseCreated { id: id.0 })))
}

pub async fn get(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseView>, ServerError> {
    state
        .engine
        .expense(user_id, ExpenseId(id))
        .await?
        .map(|expense| Json(view(expense)))
        .ok_or_else(|| ServerError::NotFound("expense not found".to_string()))
}

/// Deletes one of the caller's expenses.
///
/// A missing id and an id owned by somebody else get the same 404.
pub async fn delete(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    match state.engine.delete_expense(user_id, ExpenseId(id)).await? {
        Deletion::Removed => Ok(StatusCode::NO_CONTENT),
        Deletion::NotFoundOrUnauthorized => Err(ServerError::NotFound(
            "invalid id or permission denied".to_string(),
        )),
    }
}
