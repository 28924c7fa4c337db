use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Asset, EngineError, ExpenseCategory, ExpenseTransaction, ExpenseTransactionDetail,
    IncomeSource, IncomeTransaction, IncomeTransactionDetail, Page, ResultEngine, assets,
    expense_categories, expense_transactions, income_sources, income_transactions,
};

use super::{Engine, fetch_page, with_tx};

/// Narrows an income transaction listing. Empty filter lists everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct IncomeTransactionFilter {
    pub asset_id: Option<Uuid>,
    pub income_source_id: Option<Uuid>,
}

/// Narrows an expense transaction listing. Empty filter lists everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpenseTransactionFilter {
    pub asset_id: Option<Uuid>,
    pub expense_category_id: Option<Uuid>,
}

impl Engine {
    pub async fn income_transaction(
        &self,
        id: Uuid,
        owner: &str,
    ) -> ResultEngine<IncomeTransactionDetail> {
        with_tx!(self, |db_tx| {
            let (model, asset) = self.require_income_transaction(&db_tx, owner, id).await?;
            let source = income_sources::Entity::find_by_id(model.income_source_id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("income source not exists".to_string()))?;
            Ok(IncomeTransactionDetail {
                transaction: IncomeTransaction::try_from(model)?,
                asset: Asset::try_from(asset)?,
                income_source: IncomeSource::try_from(source)?,
            })
        })
    }

    pub async fn expense_transaction(
        &self,
        id: Uuid,
        owner: &str,
    ) -> ResultEngine<ExpenseTransactionDetail> {
        with_tx!(self, |db_tx| {
            let (model, asset) = self.require_expense_transaction(&db_tx, owner, id).await?;
            let category = expense_categories::Entity::find_by_id(model.expense_category_id.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("expense category not exists".to_string())
                })?;
            Ok(ExpenseTransactionDetail {
                transaction: ExpenseTransaction::try_from(model)?,
                asset: Asset::try_from(asset)?,
                expense_category: ExpenseCategory::try_from(category)?,
            })
        })
    }

    /// Lists income transactions, newest first.
    ///
    /// Filtering on an asset or source that `owner` does not have yields
    /// `KeyNotFound`, not an empty page.
    pub async fn list_income_transactions(
        &self,
        owner: &str,
        filter: IncomeTransactionFilter,
        page: u64,
    ) -> ResultEngine<Page<IncomeTransaction>> {
        with_tx!(self, |db_tx| {
            let mut select = income_transactions::Entity::find()
                .join(JoinType::InnerJoin, income_transactions::Relation::Asset.def())
                .filter(assets::Column::UserId.eq(owner.to_string()));

            if let Some(asset_id) = filter.asset_id {
                self.require_asset(&db_tx, owner, asset_id).await?;
                select = select.filter(income_transactions::Column::AssetId.eq(asset_id.to_string()));
            }
            if let Some(source_id) = filter.income_source_id {
                self.require_income_source(&db_tx, owner, source_id).await?;
                select = select
                    .filter(income_transactions::Column::IncomeSourceId.eq(source_id.to_string()));
            }

            let select = select
                .order_by_desc(income_transactions::Column::CreatedAt)
                .order_by_desc(income_transactions::Column::Id);
            fetch_page(&db_tx, select, page)
                .await?
                .try_map(IncomeTransaction::try_from)
        })
    }

    /// Lists expense transactions, newest first.
    pub async fn list_expense_transactions(
        &self,
        owner: &str,
        filter: ExpenseTransactionFilter,
        page: u64,
    ) -> ResultEngine<Page<ExpenseTransaction>> {
        with_tx!(self, |db_tx| {
            let mut select = expense_transactions::Entity::find()
                .join(JoinType::InnerJoin, expense_transactions::Relation::Asset.def())
                .filter(assets::Column::UserId.eq(owner.to_string()));

            if let Some(asset_id) = filter.asset_id {
                self.require_asset(&db_tx, owner, asset_id).await?;
                select =
                    select.filter(expense_transactions::Column::AssetId.eq(asset_id.to_string()));
            }
            if let Some(category_id) = filter.expense_category_id {
                self.require_expense_category(&db_tx, owner, category_id)
                    .await?;
                select = select.filter(
                    expense_transactions::Column::ExpenseCategoryId.eq(category_id.to_string()),
                );
            }

            let select = select
                .order_by_desc(expense_transactions::Column::CreatedAt)
                .order_by_desc(expense_transactions::Column::Id);
            fetch_page(&db_tx, select, page)
                .await?
                .try_map(ExpenseTransaction::try_from)
        })
    }
}
