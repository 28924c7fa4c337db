use std::collections::BTreeMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseCategory, IncomeSource, Money, Page, ResultEngine, expense_categories,
    expense_transactions, income_sources, income_transactions,
};

use super::{Engine, fetch_page, normalize_description, with_tx};

fn validate_monthly_limit(limit: Option<Money>) -> ResultEngine<Option<Money>> {
    if limit.is_some_and(Money::is_negative) {
        return Err(EngineError::InvalidAmount(
            "monthly limit must be >= 0".to_string(),
        ));
    }
    Ok(limit)
}

impl Engine {
    pub async fn create_income_source(
        &self,
        owner: &str,
        description: &str,
    ) -> ResultEngine<Uuid> {
        let description = normalize_description(description, "income source")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, owner).await?;
            let source = IncomeSource::new(owner.to_string(), description);
            income_sources::ActiveModel::from(&source)
                .insert(&db_tx)
                .await?;
            Ok(source.id)
        })
    }

    pub async fn income_source(&self, id: Uuid, owner: &str) -> ResultEngine<IncomeSource> {
        with_tx!(self, |db_tx| {
            let model = self.require_income_source(&db_tx, owner, id).await?;
            IncomeSource::try_from(model)
        })
    }

    pub async fn list_income_sources(
        &self,
        owner: &str,
        page: u64,
    ) -> ResultEngine<Page<IncomeSource>> {
        with_tx!(self, |db_tx| {
            let select = income_sources::Entity::find()
                .filter(income_sources::Column::UserId.eq(owner.to_string()))
                .order_by_asc(income_sources::Column::Description)
                .order_by_asc(income_sources::Column::Id);
            fetch_page(&db_tx, select, page)
                .await?
                .try_map(IncomeSource::try_from)
        })
    }

    pub async fn rename_income_source(
        &self,
        id: Uuid,
        owner: &str,
        description: &str,
    ) -> ResultEngine<IncomeSource> {
        let description = normalize_description(description, "income source")?;
        with_tx!(self, |db_tx| {
            let model = self.require_income_source(&db_tx, owner, id).await?;
            let active = income_sources::ActiveModel {
                id: ActiveValue::Set(model.id),
                description: ActiveValue::Set(description),
                ..Default::default()
            };
            IncomeSource::try_from(active.update(&db_tx).await?)
        })
    }

    /// Delete an income source and its transactions, taking their amounts
    /// back out of the assets they were paid into.
    pub async fn delete_income_source(&self, id: Uuid, owner: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_income_source(&db_tx, owner, id).await?;
            let rows = income_transactions::Entity::find()
                .filter(income_transactions::Column::IncomeSourceId.eq(model.id.clone()))
                .all(&db_tx)
                .await?;
            let deltas = sum_by_asset(
                rows.iter()
                    .map(|r| (r.asset_id.as_str(), -Money::new(r.amount_minor))),
            )?;
            self.apply_balance_deltas(&db_tx, owner, deltas).await?;

            income_transactions::Entity::delete_many()
                .filter(income_transactions::Column::IncomeSourceId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            income_sources::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            tracing::info!(income_source_id = %id, reversed = rows.len(), "income source deleted");
            Ok(())
        })
    }

    pub async fn create_expense_category(
        &self,
        owner: &str,
        description: &str,
        monthly_limit: Option<Money>,
    ) -> ResultEngine<Uuid> {
        let description = normalize_description(description, "expense category")?;
        let monthly_limit = validate_monthly_limit(monthly_limit)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, owner).await?;
            let category = ExpenseCategory::new(owner.to_string(), description, monthly_limit);
            expense_categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category.id)
        })
    }

    pub async fn expense_category(&self, id: Uuid, owner: &str) -> ResultEngine<ExpenseCategory> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense_category(&db_tx, owner, id).await?;
            ExpenseCategory::try_from(model)
        })
    }

    pub async fn list_expense_categories(
        &self,
        owner: &str,
        page: u64,
    ) -> ResultEngine<Page<ExpenseCategory>> {
        with_tx!(self, |db_tx| {
            let select = expense_categories::Entity::find()
                .filter(expense_categories::Column::UserId.eq(owner.to_string()))
                .order_by_asc(expense_categories::Column::Description)
                .order_by_asc(expense_categories::Column::Id);
            fetch_page(&db_tx, select, page)
                .await?
                .try_map(ExpenseCategory::try_from)
        })
    }

    /// Replace description and monthly limit (`None` removes the limit).
    pub async fn update_expense_category(
        &self,
        id: Uuid,
        owner: &str,
        description: &str,
        monthly_limit: Option<Money>,
    ) -> ResultEngine<ExpenseCategory> {
        let description = normalize_description(description, "expense category")?;
        let monthly_limit = validate_monthly_limit(monthly_limit)?;
        with_tx!(self, |db_tx| {
            let model = self.require_expense_category(&db_tx, owner, id).await?;
            let active = expense_categories::ActiveModel {
                id: ActiveValue::Set(model.id),
                description: ActiveValue::Set(description),
                monthly_limit_minor: ActiveValue::Set(monthly_limit.map(Money::minor)),
                ..Default::default()
            };
            ExpenseCategory::try_from(active.update(&db_tx).await?)
        })
    }

    /// Delete an expense category and its transactions, giving their amounts
    /// back to the assets they were paid from.
    pub async fn delete_expense_category(&self, id: Uuid, owner: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense_category(&db_tx, owner, id).await?;
            self.reverse_expenses_of(&db_tx, owner, &model.id).await?;
            expense_categories::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            tracing::info!(expense_category_id = %id, "expense category deleted");
            Ok(())
        })
    }

    async fn reverse_expenses_of(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        category_id: &str,
    ) -> ResultEngine<()> {
        let rows = expense_transactions::Entity::find()
            .filter(expense_transactions::Column::ExpenseCategoryId.eq(category_id.to_string()))
            .all(db_tx)
            .await?;
        let deltas = sum_by_asset(
            rows.iter()
                .map(|r| (r.asset_id.as_str(), Money::new(r.amount_minor))),
        )?;
        self.apply_balance_deltas(db_tx, owner, deltas).await?;
        expense_transactions::Entity::delete_many()
            .filter(expense_transactions::Column::ExpenseCategoryId.eq(category_id.to_string()))
            .exec(db_tx)
            .await?;
        Ok(())
    }
}

/// Group signed amounts per asset id.
fn sum_by_asset<'a, I>(rows: I) -> ResultEngine<BTreeMap<String, Money>>
where
    I: IntoIterator<Item = (&'a str, Money)>,
{
    let mut out: BTreeMap<String, Money> = BTreeMap::new();
    for (asset_id, delta) in rows {
        let entry = out.entry(asset_id.to_string()).or_default();
        *entry = entry
            .checked_add(delta)
            .ok_or_else(|| EngineError::InvalidAmount("asset balance overflow".to_string()))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_grouped_per_asset() {
        let deltas = sum_by_asset([
            ("a", Money::new(-10)),
            ("b", Money::new(5)),
            ("a", Money::new(-15)),
        ])
        .unwrap();
        assert_eq!(deltas["a"], Money::new(-25));
        assert_eq!(deltas["b"], Money::new(5));
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(validate_monthly_limit(Some(Money::new(-1))).is_err());
        assert_eq!(validate_monthly_limit(None).unwrap(), None);
    }
}
