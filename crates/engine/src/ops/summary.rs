use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    Asset, ExpenseCategory, ExpenseSummary, IncomeSource, IncomeSummary, Money, ResultEngine,
    Summary, assets, expense_categories, expense_transactions, income_sources,
    income_transactions, util::month_bounds,
};

use super::{Engine, with_tx};

impl Engine {
    /// Overview of every asset plus this month's totals per income source and
    /// expense category. "This month" is the UTC calendar month of `now`.
    pub async fn summary(&self, owner: &str, now: DateTime<Utc>) -> ResultEngine<Summary> {
        let (start, end) = month_bounds(now)?;
        with_tx!(self, |db_tx| {
            let assets = assets::Entity::find()
                .filter(assets::Column::UserId.eq(owner.to_string()))
                .order_by_asc(assets::Column::Description)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Asset::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let income_totals: HashMap<String, i64> = income_transactions::Entity::find()
                .select_only()
                .column(income_transactions::Column::IncomeSourceId)
                .column_as(income_transactions::Column::AmountMinor.sum(), "total")
                .join(
                    JoinType::InnerJoin,
                    income_transactions::Relation::IncomeSource.def(),
                )
                .filter(income_sources::Column::UserId.eq(owner.to_string()))
                .filter(income_transactions::Column::CreatedAt.gte(start))
                .filter(income_transactions::Column::CreatedAt.lt(end))
                .group_by(income_transactions::Column::IncomeSourceId)
                .into_tuple::<(String, i64)>()
                .all(&db_tx)
                .await?
                .into_iter()
                .collect();

            let expense_totals: HashMap<String, i64> = expense_transactions::Entity::find()
                .select_only()
                .column(expense_transactions::Column::ExpenseCategoryId)
                .column_as(expense_transactions::Column::AmountMinor.sum(), "total")
                .join(
                    JoinType::InnerJoin,
                    expense_transactions::Relation::ExpenseCategory.def(),
                )
                .filter(expense_categories::Column::UserId.eq(owner.to_string()))
                .filter(expense_transactions::Column::CreatedAt.gte(start))
                .filter(expense_transactions::Column::CreatedAt.lt(end))
                .group_by(expense_transactions::Column::ExpenseCategoryId)
                .into_tuple::<(String, i64)>()
                .all(&db_tx)
                .await?
                .into_iter()
                .collect();

            let mut incomes = Vec::new();
            for model in income_sources::Entity::find()
                .filter(income_sources::Column::UserId.eq(owner.to_string()))
                .order_by_asc(income_sources::Column::Description)
                .all(&db_tx)
                .await?
            {
                let month_total = Money::new(income_totals.get(&model.id).copied().unwrap_or(0));
                incomes.push(IncomeSummary {
                    income_source: IncomeSource::try_from(model)?,
                    month_total,
                });
            }

            let mut expenses = Vec::new();
            for model in expense_categories::Entity::find()
                .filter(expense_categories::Column::UserId.eq(owner.to_string()))
                .order_by_asc(expense_categories::Column::Description)
                .all(&db_tx)
                .await?
            {
                let month_total = Money::new(expense_totals.get(&model.id).copied().unwrap_or(0));
                expenses.push(ExpenseSummary {
                    expense_category: ExpenseCategory::try_from(model)?,
                    month_total,
                });
            }

            Ok(Summary {
                assets,
                incomes,
                expenses,
            })
        })
    }
}
