use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, assets, expense_categories, expense_transactions, income_sources,
    income_transactions, users,
};

use super::Engine;

/// Generates a `require_*` lookup returning the row only when `owner` owns it.
///
/// Rows of other users are reported exactly like missing rows.
macro_rules! impl_owned_lookup {
    ($require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            owner: &str,
            id: Uuid,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id.to_string())
                .filter($module::Column::UserId.eq(owner.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(require_asset, assets, "asset not exists");

    impl_owned_lookup!(
        require_income_source,
        income_sources,
        "income source not exists"
    );

    impl_owned_lookup!(
        require_expense_category,
        expense_categories,
        "expense category not exists"
    );

    /// Income transaction together with its asset, scoped to `owner`.
    pub(super) async fn require_income_transaction(
        &self,
        db: &DatabaseTransaction,
        owner: &str,
        id: Uuid,
    ) -> ResultEngine<(income_transactions::Model, assets::Model)> {
        let row = income_transactions::Entity::find_by_id(id.to_string())
            .find_also_related(assets::Entity)
            .filter(assets::Column::UserId.eq(owner.to_string()))
            .one(db)
            .await?;
        match row {
            Some((model, Some(asset))) => Ok((model, asset)),
            _ => Err(EngineError::KeyNotFound("transaction not exists".to_string())),
        }
    }

    /// Expense transaction together with its asset, scoped to `owner`.
    pub(super) async fn require_expense_transaction(
        &self,
        db: &DatabaseTransaction,
        owner: &str,
        id: Uuid,
    ) -> ResultEngine<(expense_transactions::Model, assets::Model)> {
        let row = expense_transactions::Entity::find_by_id(id.to_string())
            .find_also_related(assets::Entity)
            .filter(assets::Column::UserId.eq(owner.to_string()))
            .one(db)
            .await?;
        match row {
            Some((model, Some(asset))) => Ok((model, asset)),
            _ => Err(EngineError::KeyNotFound("transaction not exists".to_string())),
        }
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }
}
