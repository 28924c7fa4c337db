//! Money recorded as coming into an asset from an income source.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeTransaction {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub income_source_id: Uuid,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "income_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub asset_id: String,
    pub income_source_id: String,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Asset,
    #[sea_orm(
        belongs_to = "super::income_sources::Entity",
        from = "Column::IncomeSourceId",
        to = "super::income_sources::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    IncomeSource,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::income_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomeSource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&IncomeTransaction> for ActiveModel {
    fn from(value: &IncomeTransaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            asset_id: ActiveValue::Set(value.asset_id.to_string()),
            income_source_id: ActiveValue::Set(value.income_source_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for IncomeTransaction {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&value.id, "transaction")?,
            asset_id: parse_uuid(&value.asset_id, "asset")?,
            income_source_id: parse_uuid(&value.income_source_id, "income source")?,
            amount: Money::new(value.amount_minor),
            created_at: value.created_at,
        })
    }
}
