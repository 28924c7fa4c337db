//! Balance bookkeeping.
//!
//! Every function that creates or removes a transaction row runs, inside the
//! same DB transaction, an `UPDATE assets SET balance_minor = balance_minor +
//! delta` guarded by the affected row count. The delta is computed by the
//! database against the current row, so two writers on the same asset cannot
//! overwrite each other's adjustment.

use std::collections::BTreeMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseTransaction, IncomeTransaction, LedgerAudit, Money, NewTransaction,
    ResultEngine, TransactionKind, assets, expense_transactions, income_transactions,
    util::normalize_tags,
};

use super::{Engine, with_tx};

impl Engine {
    /// Move the stored balance of `asset` by `delta`.
    ///
    /// Fails with `Conflict` when the asset row vanished in the meantime and
    /// with `InvalidAmount` when the new balance would not fit.
    pub(super) async fn apply_balance_delta(
        &self,
        db_tx: &DatabaseTransaction,
        asset: &assets::Model,
        delta: Money,
    ) -> ResultEngine<()> {
        Money::new(asset.balance_minor)
            .checked_add(delta)
            .ok_or_else(|| EngineError::InvalidAmount("asset balance overflow".to_string()))?;

        let result = assets::Entity::update_many()
            .col_expr(
                assets::Column::BalanceMinor,
                Expr::col(assets::Column::BalanceMinor).add(delta.minor()),
            )
            .filter(assets::Column::Id.eq(asset.id.clone()))
            .filter(assets::Column::UserId.eq(asset.user_id.clone()))
            .exec(db_tx)
            .await?;
        if result.rows_affected != 1 {
            return Err(EngineError::Conflict(format!(
                "asset {} changed while updating its balance",
                asset.id
            )));
        }

        tracing::info!(asset_id = %asset.id, delta = %delta, "asset balance adjusted");
        Ok(())
    }

    /// Apply several deltas, one update per asset.
    pub(super) async fn apply_balance_deltas(
        &self,
        db_tx: &DatabaseTransaction,
        owner: &str,
        deltas: BTreeMap<String, Money>,
    ) -> ResultEngine<()> {
        for (asset_id, delta) in deltas {
            if delta.is_zero() {
                continue;
            }
            let asset = assets::Entity::find_by_id(asset_id.clone())
                .filter(assets::Column::UserId.eq(owner.to_string()))
                .one(db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::Conflict(format!("asset {asset_id} disappeared"))
                })?;
            self.apply_balance_delta(db_tx, &asset, delta).await?;
        }
        Ok(())
    }

    /// Record an income or an expense and move the asset balance.
    ///
    /// The asset and the category must both belong to `owner`; otherwise the
    /// call fails with `KeyNotFound` and nothing is written. Tags are trimmed;
    /// a tag holding a comma or a list over 4096 characters is rejected with
    /// `InvalidField`. Balance update and row insert commit together or not at
    /// all.
    pub async fn create_transaction(
        &self,
        owner: &str,
        mut cmd: NewTransaction,
    ) -> ResultEngine<Uuid> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        cmd.tags = normalize_tags(std::mem::take(&mut cmd.tags))?;

        with_tx!(self, |db_tx| {
            let asset = self.require_asset(&db_tx, owner, cmd.asset_id).await?;
            match cmd.kind {
                TransactionKind::Income => {
                    self.require_income_source(&db_tx, owner, cmd.category_id)
                        .await?;
                }
                TransactionKind::Expense => {
                    self.require_expense_category(&db_tx, owner, cmd.category_id)
                        .await?;
                }
            }

            self.apply_balance_delta(&db_tx, &asset, cmd.kind.balance_delta(cmd.amount))
                .await?;

            let id = Uuid::new_v4();
            match cmd.kind {
                TransactionKind::Income => {
                    let tx = IncomeTransaction {
                        id,
                        asset_id: cmd.asset_id,
                        income_source_id: cmd.category_id,
                        amount: cmd.amount,
                        created_at: cmd.created_at,
                    };
                    income_transactions::ActiveModel::from(&tx)
                        .insert(&db_tx)
                        .await?;
                }
                TransactionKind::Expense => {
                    let tx = ExpenseTransaction {
                        id,
                        asset_id: cmd.asset_id,
                        expense_category_id: cmd.category_id,
                        amount: cmd.amount,
                        tags: cmd.tags,
                        created_at: cmd.created_at,
                    };
                    expense_transactions::ActiveModel::from(&tx)
                        .insert(&db_tx)
                        .await?;
                }
            }

            tracing::info!(
                transaction_id = %id,
                kind = cmd.kind.as_str(),
                asset_id = %cmd.asset_id,
                amount = %cmd.amount,
                "transaction recorded"
            );
            Ok(id)
        })
    }

    pub async fn create_income_transaction(
        &self,
        owner: &str,
        asset_id: Uuid,
        income_source_id: Uuid,
        amount: Money,
    ) -> ResultEngine<Uuid> {
        self.create_transaction(
            owner,
            NewTransaction::income(asset_id, income_source_id, amount),
        )
        .await
    }

    pub async fn create_expense_transaction(
        &self,
        owner: &str,
        asset_id: Uuid,
        expense_category_id: Uuid,
        amount: Money,
        tags: &[String],
    ) -> ResultEngine<Uuid> {
        self.create_transaction(
            owner,
            NewTransaction::expense(asset_id, expense_category_id, amount).tags(tags.to_vec()),
        )
        .await
    }

    /// Remove a transaction and undo its effect on the asset balance.
    pub async fn delete_transaction(
        &self,
        kind: TransactionKind,
        id: Uuid,
        owner: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let rows_affected = match kind {
                TransactionKind::Income => {
                    let (model, asset) =
                        self.require_income_transaction(&db_tx, owner, id).await?;
                    self.apply_balance_delta(&db_tx, &asset, -Money::new(model.amount_minor))
                        .await?;
                    income_transactions::Entity::delete_by_id(model.id)
                        .exec(&db_tx)
                        .await?
                        .rows_affected
                }
                TransactionKind::Expense => {
                    let (model, asset) =
                        self.require_expense_transaction(&db_tx, owner, id).await?;
                    self.apply_balance_delta(&db_tx, &asset, Money::new(model.amount_minor))
                        .await?;
                    expense_transactions::Entity::delete_by_id(model.id)
                        .exec(&db_tx)
                        .await?
                        .rows_affected
                }
            };
            if rows_affected != 1 {
                return Err(EngineError::Conflict(format!(
                    "transaction {id} changed while deleting it"
                )));
            }

            tracing::info!(transaction_id = %id, kind = kind.as_str(), "transaction deleted");
            Ok(())
        })
    }

    /// Compare the stored balance of an asset with its transactions.
    pub async fn asset_audit(&self, asset_id: Uuid, owner: &str) -> ResultEngine<LedgerAudit> {
        with_tx!(self, |db_tx| {
            let asset = self.require_asset(&db_tx, owner, asset_id).await?;
            self.audit_model(&db_tx, &asset).await
        })
    }

    /// Rewrite the stored balance from the transactions and return the audit
    /// taken before the rewrite.
    pub async fn recompute_asset_balance(
        &self,
        asset_id: Uuid,
        owner: &str,
    ) -> ResultEngine<LedgerAudit> {
        with_tx!(self, |db_tx| {
            let asset = self.require_asset(&db_tx, owner, asset_id).await?;
            let audit = self.audit_model(&db_tx, &asset).await?;
            if !audit.is_consistent() {
                tracing::warn!(
                    asset_id = %asset_id,
                    recorded = %audit.recorded,
                    expected = %audit.expected,
                    "asset balance drifted, rewriting"
                );
                let active = assets::ActiveModel {
                    id: ActiveValue::Set(asset.id.clone()),
                    balance_minor: ActiveValue::Set(audit.expected.minor()),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }
            Ok(audit)
        })
    }

    async fn audit_model(
        &self,
        db_tx: &DatabaseTransaction,
        asset: &assets::Model,
    ) -> ResultEngine<LedgerAudit> {
        let income_total: Option<i64> = income_transactions::Entity::find()
            .select_only()
            .column_as(income_transactions::Column::AmountMinor.sum(), "total")
            .filter(income_transactions::Column::AssetId.eq(asset.id.clone()))
            .into_tuple::<Option<i64>>()
            .one(db_tx)
            .await?
            .flatten();
        let expense_total: Option<i64> = expense_transactions::Entity::find()
            .select_only()
            .column_as(expense_transactions::Column::AmountMinor.sum(), "total")
            .filter(expense_transactions::Column::AssetId.eq(asset.id.clone()))
            .into_tuple::<Option<i64>>()
            .one(db_tx)
            .await?
            .flatten();

        let opening = Money::new(asset.opening_balance_minor);
        let income_total = Money::new(income_total.unwrap_or_default());
        let expense_total = Money::new(expense_total.unwrap_or_default());
        let expected = opening
            .checked_add(income_total)
            .and_then(|v| v.checked_sub(expense_total))
            .ok_or_else(|| EngineError::InvalidAmount("asset balance overflow".to_string()))?;

        Ok(LedgerAudit {
            recorded: Money::new(asset.balance_minor),
            opening,
            income_total,
            expense_total,
            expected,
        })
    }
}
