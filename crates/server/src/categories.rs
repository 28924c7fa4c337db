//! Income sources and expense categories API endpoints.

use api_types::{
    Created,
    expense::{ExpenseCategoryNew, ExpenseCategoryView},
    income::{IncomeSourceNew, IncomeSourceView},
    page::{PageQuery, PageView},
    transaction::ExpenseTransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::ExpenseTransactionFilter;
use uuid::Uuid;

use crate::{
    ServerError, map_page, parse_optional_money,
    server::{Caller, ServerState},
    transactions::map_expense,
};

pub(crate) fn map_income_source(source: engine::IncomeSource) -> IncomeSourceView {
    IncomeSourceView {
        id: source.id,
        description: source.description,
    }
}

pub(crate) fn map_expense_category(category: engine::ExpenseCategory) -> ExpenseCategoryView {
    ExpenseCategoryView {
        id: category.id,
        description: category.description,
        monthly_limit: category.monthly_limit.map(|m| m.to_string()),
    }
}

pub async fn list_incomes(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<IncomeSourceView>>, ServerError> {
    let page = state
        .engine
        .list_income_sources(&caller.username, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_income_source)))
}

pub async fn create_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeSourceNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .create_income_source(&caller.username, &payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncomeSourceView>, ServerError> {
    let source = state.engine.income_source(id, &caller.username).await?;
    Ok(Json(map_income_source(source)))
}

pub async fn update_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IncomeSourceNew>,
) -> Result<Json<IncomeSourceView>, ServerError> {
    let source = state
        .engine
        .rename_income_source(id, &caller.username, &payload.description)
        .await?;
    Ok(Json(map_income_source(source)))
}

pub async fn delete_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_income_source(id, &caller.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_expenses(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<ExpenseCategoryView>>, ServerError> {
    let page = state
        .engine
        .list_expense_categories(&caller.username, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_expense_category)))
}

pub async fn create_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCategoryNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let limit = parse_optional_money(payload.monthly_limit.as_deref())?;
    let id = state
        .engine
        .create_expense_category(&caller.username, &payload.description, limit)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseCategoryView>, ServerError> {
    let category = state.engine.expense_category(id, &caller.username).await?;
    Ok(Json(map_expense_category(category)))
}

pub async fn update_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseCategoryNew>,
) -> Result<Json<ExpenseCategoryView>, ServerError> {
    let limit = parse_optional_money(payload.monthly_limit.as_deref())?;
    let category = state
        .engine
        .update_expense_category(id, &caller.username, &payload.description, limit)
        .await?;
    Ok(Json(map_expense_category(category)))
}

pub async fn delete_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense_category(id, &caller.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Expense transactions booked on the category.
pub async fn expense_transactions(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<ExpenseTransactionView>>, ServerError> {
    let filter = ExpenseTransactionFilter {
        asset_id: None,
        expense_category_id: Some(id),
    };
    let page = state
        .engine
        .list_expense_transactions(&caller.username, filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_expense)))
}
