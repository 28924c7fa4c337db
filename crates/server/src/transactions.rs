//! Transactions API endpoints

use api_types::{
    Created,
    page::PageView,
    transaction::{
        ExpenseTransactionDetail, ExpenseTransactionNew, ExpenseTransactionQuery,
        ExpenseTransactionView, IncomeTransactionDetail, IncomeTransactionNew,
        IncomeTransactionQuery, IncomeTransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{ExpenseTransactionFilter, IncomeTransactionFilter, NewTransaction, TransactionKind};
use uuid::Uuid;

use crate::{
    ServerError,
    assets::map_asset,
    categories::{map_expense_category, map_income_source},
    map_page, parse_money,
    server::{Caller, ServerState},
};

pub(crate) fn map_income(tx: engine::IncomeTransaction) -> IncomeTransactionView {
    IncomeTransactionView {
        id: tx.id,
        asset_id: tx.asset_id,
        income_source_id: tx.income_source_id,
        amount: tx.amount.to_string(),
        created_at: tx.created_at,
    }
}

pub(crate) fn map_expense(tx: engine::ExpenseTransaction) -> ExpenseTransactionView {
    ExpenseTransactionView {
        id: tx.id,
        asset_id: tx.asset_id,
        expense_category_id: tx.expense_category_id,
        amount: tx.amount.to_string(),
        tags: tx.tags,
        created_at: tx.created_at,
    }
}

pub async fn list_incomes(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Query(query): Query<IncomeTransactionQuery>,
) -> Result<Json<PageView<IncomeTransactionView>>, ServerError> {
    let filter = IncomeTransactionFilter {
        asset_id: query.asset_id,
        income_source_id: query.income_source_id,
    };
    let page = state
        .engine
        .list_income_transactions(&caller.username, filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_income)))
}

pub async fn create_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeTransactionNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let amount = parse_money(&payload.amount)?;
    let mut cmd = NewTransaction::income(payload.asset_id, payload.income_source_id, amount);
    if let Some(created_at) = payload.created_at {
        cmd = cmd.created_at(created_at.with_timezone(&Utc));
    }

    let id = state
        .engine
        .create_transaction(&caller.username, cmd)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncomeTransactionDetail>, ServerError> {
    let detail = state
        .engine
        .income_transaction(id, &caller.username)
        .await?;
    Ok(Json(IncomeTransactionDetail {
        transaction: map_income(detail.transaction),
        asset: map_asset(detail.asset),
        income_source: map_income_source(detail.income_source),
    }))
}

pub async fn delete_income(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(TransactionKind::Income, id, &caller.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_expenses(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseTransactionQuery>,
) -> Result<Json<PageView<ExpenseTransactionView>>, ServerError> {
    let filter = ExpenseTransactionFilter {
        asset_id: query.asset_id,
        expense_category_id: query.expense_category_id,
    };
    let page = state
        .engine
        .list_expense_transactions(&caller.username, filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_expense)))
}

pub async fn create_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseTransactionNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let amount = parse_money(&payload.amount)?;
    let mut cmd = NewTransaction::expense(payload.asset_id, payload.expense_category_id, amount)
        .tags(payload.tags);
    if let Some(created_at) = payload.created_at {
        cmd = cmd.created_at(created_at.with_timezone(&Utc));
    }

    let id = state
        .engine
        .create_transaction(&caller.username, cmd)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseTransactionDetail>, ServerError> {
    let detail = state
        .engine
        .expense_transaction(id, &caller.username)
        .await?;
    Ok(Json(ExpenseTransactionDetail {
        transaction: map_expense(detail.transaction),
        asset: map_asset(detail.asset),
        expense_category: map_expense_category(detail.expense_category),
    }))
}

pub async fn delete_expense(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(TransactionKind::Expense, id, &caller.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
