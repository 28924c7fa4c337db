//! Money recorded as leaving an asset under an expense category.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine,
    util::{join_tags, parse_uuid, split_tags},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseTransaction {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub expense_category_id: Uuid,
    pub amount: Money,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub asset_id: String,
    pub expense_category_id: String,
    pub amount_minor: i64,
    /// Comma separated.
    pub tags: String,
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
        belongs_to = "super::expense_categories::Entity",
        from = "Column::ExpenseCategoryId",
        to = "super::expense_categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ExpenseCategory,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::expense_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseTransaction> for ActiveModel {
    fn from(value: &ExpenseTransaction) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            asset_id: ActiveValue::Set(value.asset_id.to_string()),
            expense_category_id: ActiveValue::Set(value.expense_category_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount.minor()),
            tags: ActiveValue::Set(join_tags(&value.tags)),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for ExpenseTransaction {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&value.id, "transaction")?,
            asset_id: parse_uuid(&value.asset_id, "asset")?,
            expense_category_id: parse_uuid(&value.expense_category_id, "expense category")?,
            amount: Money::new(value.amount_minor),
            tags: split_tags(&value.tags),
            created_at: value.created_at,
        })
    }
}
