//! The module contains `Asset` and its table.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

/// Where the money of an asset physically lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    #[serde(rename = "CA")]
    Cash,
    #[serde(rename = "BC")]
    BankCard,
    #[serde(rename = "CC")]
    CreditCard,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [Self::Cash, Self::BankCard, Self::CreditCard];

    /// Two letter code stored in the database.
    pub fn code(self) -> &'static str {
        match self {
            Self::Cash => "CA",
            Self::BankCard => "BC",
            Self::CreditCard => "CC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::BankCard => "Bank card",
            Self::CreditCard => "Credit card",
        }
    }
}

impl TryFrom<&str> for AssetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CA" => Ok(Self::Cash),
            "BC" => Ok(Self::BankCard),
            "CC" => Ok(Self::CreditCard),
            other => Err(EngineError::InvalidField(format!(
                "invalid asset kind: {other}"
            ))),
        }
    }
}

/// A holding of money with a running balance.
///
/// `balance` is never written directly: it starts at `opening_balance` and
/// moves only when income or expense transactions are created or deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub id: Uuid,
    pub owner: String,
    pub description: String,
    pub kind: Option<AssetKind>,
    pub balance: Money,
    pub opening_balance: Money,
}

impl Asset {
    pub fn new(
        owner: String,
        description: String,
        kind: Option<AssetKind>,
        opening_balance: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            description,
            kind,
            balance: opening_balance,
            opening_balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub kind: Option<String>,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
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
    #[sea_orm(has_many = "super::income_transactions::Entity")]
    IncomeTransactions,
    #[sea_orm(has_many = "super::expense_transactions::Entity")]
    ExpenseTransactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::income_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IncomeTransactions.def()
    }
}

impl Related<super::expense_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Asset> for ActiveModel {
    fn from(value: &Asset) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.owner.clone()),
            description: ActiveValue::Set(value.description.clone()),
            kind: ActiveValue::Set(value.kind.map(|k| k.code().to_string())),
            balance_minor: ActiveValue::Set(value.balance.minor()),
            opening_balance_minor: ActiveValue::Set(value.opening_balance.minor()),
        }
    }
}

impl TryFrom<Model> for Asset {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&value.id, "asset")?,
            owner: value.user_id,
            description: value.description,
            kind: value.kind.as_deref().map(AssetKind::try_from).transpose()?,
            balance: Money::new(value.balance_minor),
            opening_balance: Money::new(value.opening_balance_minor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_stable() {
        for kind in AssetKind::ALL {
            assert_eq!(AssetKind::try_from(kind.code()).unwrap(), kind);
        }
        assert_eq!(AssetKind::try_from(" cc ").unwrap(), AssetKind::CreditCard);
        assert!(AssetKind::try_from("XX").is_err());
    }

    #[test]
    fn new_asset_starts_at_opening_balance() {
        let asset = Asset::new(
            "alice".to_string(),
            "Wallet".to_string(),
            Some(AssetKind::Cash),
            Money::new(1_000_000),
        );
        assert_eq!(asset.balance, asset.opening_balance);
    }

    #[test]
    fn model_round_trip_keeps_kind() {
        let asset = Asset::new(
            "alice".to_string(),
            "Card".to_string(),
            Some(AssetKind::BankCard),
            Money::ZERO,
        );
        let model = Model {
            id: asset.id.to_string(),
            user_id: asset.owner.clone(),
            description: asset.description.clone(),
            kind: Some("BC".to_string()),
            balance_minor: 0,
            opening_balance_minor: 0,
        };
        assert_eq!(Asset::try_from(model).unwrap(), asset);
    }
}
