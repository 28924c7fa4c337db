use api_types::summary::{CommonInfo, ExpenseSummaryView, IncomeSummaryView};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{
    ServerError,
    assets::map_asset,
    server::{Caller, ServerState},
};

/// Balances plus the running month's totals.
pub async fn common_info(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<CommonInfo>, ServerError> {
    let summary = state.engine.summary(&caller.username, Utc::now()).await?;

    let expenses = summary
        .expenses
        .into_iter()
        .map(|row| ExpenseSummaryView {
            over_limit: row.over_limit(),
            id: row.expense_category.id,
            description: row.expense_category.description,
            monthly_limit: row.expense_category.monthly_limit.map(|m| m.to_string()),
            month_total: row.month_total.to_string(),
        })
        .collect();

    Ok(Json(CommonInfo {
        assets: summary.assets.into_iter().map(map_asset).collect(),
        incomes: summary
            .incomes
            .into_iter()
            .map(|row| IncomeSummaryView {
                id: row.income_source.id,
                description: row.income_source.description,
                month_total: row.month_total.to_string(),
            })
            .collect(),
        expenses,
    }))
}
