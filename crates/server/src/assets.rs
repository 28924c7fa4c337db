//! Assets API endpoints

use api_types::{
    Created,
    asset::{AssetKind as ApiKind, AssetNew, AssetUpdate, AssetView, AuditView},
    page::{PageQuery, PageView},
    transaction::{ExpenseTransactionView, IncomeTransactionView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{AssetKind, ExpenseTransactionFilter, IncomeTransactionFilter, LedgerAudit, NewAsset};
use uuid::Uuid;

use crate::{
    ServerError, map_page, parse_optional_money,
    server::{Caller, ServerState},
    transactions::{map_expense, map_income},
};

pub(crate) fn map_kind(kind: AssetKind) -> ApiKind {
    match kind {
        AssetKind::Cash => ApiKind::Cash,
        AssetKind::BankCard => ApiKind::BankCard,
        AssetKind::CreditCard => ApiKind::CreditCard,
    }
}

fn engine_kind(kind: ApiKind) -> AssetKind {
    match kind {
        ApiKind::Cash => AssetKind::Cash,
        ApiKind::BankCard => AssetKind::BankCard,
        ApiKind::CreditCard => AssetKind::CreditCard,
    }
}

pub(crate) fn map_asset(asset: engine::Asset) -> AssetView {
    AssetView {
        id: asset.id,
        description: asset.description,
        kind: asset.kind.map(map_kind),
        balance: asset.balance.to_string(),
        opening_balance: asset.opening_balance.to_string(),
    }
}

fn map_audit(audit: LedgerAudit) -> AuditView {
    AuditView {
        consistent: audit.is_consistent(),
        recorded: audit.recorded.to_string(),
        opening: audit.opening.to_string(),
        income_total: audit.income_total.to_string(),
        expense_total: audit.expense_total.to_string(),
        expected: audit.expected.to_string(),
    }
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<AssetView>>, ServerError> {
    let page = state
        .engine
        .list_assets(&caller.username, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_asset)))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = NewAsset::new(payload.description);
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(engine_kind(kind));
    }
    if let Some(balance) = parse_optional_money(payload.start_balance.as_deref())? {
        cmd = cmd.opening_balance(balance);
    }

    let id = state.engine.create_asset(&caller.username, cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn get(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetView>, ServerError> {
    let asset = state.engine.asset(id, &caller.username).await?;
    Ok(Json(map_asset(asset)))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssetUpdate>,
) -> Result<Json<AssetView>, ServerError> {
    let asset = state
        .engine
        .update_asset(
            id,
            &caller.username,
            engine::AssetUpdate {
                description: payload.description,
                kind: payload.kind.map(engine_kind),
            },
        )
        .await?;
    Ok(Json(map_asset(asset)))
}

pub async fn delete(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_asset(id, &caller.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Income transactions paid into the asset.
pub async fn incoming(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<IncomeTransactionView>>, ServerError> {
    let filter = IncomeTransactionFilter {
        asset_id: Some(id),
        income_source_id: None,
    };
    let page = state
        .engine
        .list_income_transactions(&caller.username, filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_income)))
}

/// Expense transactions paid from the asset.
pub async fn outgoing(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<ExpenseTransactionView>>, ServerError> {
    let filter = ExpenseTransactionFilter {
        asset_id: Some(id),
        expense_category_id: None,
    };
    let page = state
        .engine
        .list_expense_transactions(&caller.username, filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(map_page(page, map_expense)))
}

pub async fn audit(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuditView>, ServerError> {
    let audit = state.engine.asset_audit(id, &caller.username).await?;
    Ok(Json(map_audit(audit)))
}

/// Rewrites the stored balance; the body is the audit taken before the fix.
pub async fn recompute(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AuditView>, ServerError> {
    let audit = state
        .engine
        .recompute_asset_balance(id, &caller.username)
        .await?;
    Ok(Json(map_audit(audit)))
}
