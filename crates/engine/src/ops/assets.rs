use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Asset, AssetUpdate, NewAsset, Page, ResultEngine, assets, expense_transactions,
    income_transactions,
};

use super::{Engine, fetch_page, normalize_description, with_tx};

impl Engine {
    /// Add a new asset whose balance starts at `opening_balance`.
    pub async fn create_asset(&self, owner: &str, cmd: NewAsset) -> ResultEngine<Uuid> {
        let description = normalize_description(&cmd.description, "asset")?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, owner).await?;
            let asset = Asset::new(
                owner.to_string(),
                description,
                cmd.kind,
                cmd.opening_balance,
            );
            assets::ActiveModel::from(&asset).insert(&db_tx).await?;
            tracing::debug!(asset_id = %asset.id, owner, "asset created");
            Ok(asset.id)
        })
    }

    /// Return an asset snapshot from DB.
    pub async fn asset(&self, asset_id: Uuid, owner: &str) -> ResultEngine<Asset> {
        with_tx!(self, |db_tx| {
            let model = self.require_asset(&db_tx, owner, asset_id).await?;
            Asset::try_from(model)
        })
    }

    pub async fn list_assets(&self, owner: &str, page: u64) -> ResultEngine<Page<Asset>> {
        with_tx!(self, |db_tx| {
            let select = assets::Entity::find()
                .filter(assets::Column::UserId.eq(owner.to_string()))
                .order_by_asc(assets::Column::Description)
                .order_by_asc(assets::Column::Id);
            fetch_page(&db_tx, select, page).await?.try_map(Asset::try_from)
        })
    }

    /// Replace the description and kind of an asset. The balance is untouched.
    pub async fn update_asset(
        &self,
        asset_id: Uuid,
        owner: &str,
        update: AssetUpdate,
    ) -> ResultEngine<Asset> {
        let description = normalize_description(&update.description, "asset")?;
        with_tx!(self, |db_tx| {
            let model = self.require_asset(&db_tx, owner, asset_id).await?;
            let active = assets::ActiveModel {
                id: ActiveValue::Set(model.id),
                description: ActiveValue::Set(description),
                kind: ActiveValue::Set(update.kind.map(|k| k.code().to_string())),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Asset::try_from(updated)
        })
    }

    /// Delete an asset together with every transaction recorded on it.
    pub async fn delete_asset(&self, asset_id: Uuid, owner: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_asset(&db_tx, owner, asset_id).await?;
            let incomes = income_transactions::Entity::delete_many()
                .filter(income_transactions::Column::AssetId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            let expenses = expense_transactions::Entity::delete_many()
                .filter(expense_transactions::Column::AssetId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            assets::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            tracing::info!(
                asset_id = %asset_id,
                removed_transactions = incomes + expenses,
                "asset deleted"
            );
            Ok(())
        })
    }
}
