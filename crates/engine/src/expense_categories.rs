//! Expense categories, optionally capped by a monthly limit.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub owner: String,
    pub description: String,
    /// Soft cap on monthly spending, reported by the summary.
    pub monthly_limit: Option<Money>,
}

impl ExpenseCategory {
    pub fn new(owner: String, description: String, monthly_limit: Option<Money>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            description,
            monthly_limit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub monthly_limit_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::expense_transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::expense_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseCategory> for ActiveModel {
    fn from(value: &ExpenseCategory) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.owner.clone()),
            description: ActiveValue::Set(value.description.clone()),
            monthly_limit_minor: ActiveValue::Set(value.monthly_limit.map(Money::minor)),
        }
    }
}

impl TryFrom<Model> for ExpenseCategory {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&value.id, "expense category")?,
            owner: value.user_id,
            description: value.description,
            monthly_limit: value.monthly_limit_minor.map(Money::new),
        })
    }
}
