//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AssetKind, Money, TransactionKind};

/// Create an asset.
#[derive(Clone, Debug)]
pub struct NewAsset {
    pub description: String,
    pub kind: Option<AssetKind>,
    pub opening_balance: Money,
}

impl NewAsset {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: None,
            opening_balance: Money::ZERO,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: AssetKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn opening_balance(mut self, balance: Money) -> Self {
        self.opening_balance = balance;
        self
    }
}

/// Replace the editable fields of an asset.
///
/// The balance is deliberately absent: it only moves through transactions.
#[derive(Clone, Debug)]
pub struct AssetUpdate {
    pub description: String,
    pub kind: Option<AssetKind>,
}

/// Record an income or an expense.
///
/// `category_id` is the income source for incomes and the expense category
/// for expenses. `tags` are ignored for incomes.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub asset_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    #[must_use]
    pub fn income(asset_id: Uuid, income_source_id: Uuid, amount: Money) -> Self {
        Self::new(TransactionKind::Income, asset_id, income_source_id, amount)
    }

    #[must_use]
    pub fn expense(asset_id: Uuid, expense_category_id: Uuid, amount: Money) -> Self {
        Self::new(TransactionKind::Expense, asset_id, expense_category_id, amount)
    }

    #[must_use]
    pub fn new(kind: TransactionKind, asset_id: Uuid, category_id: Uuid, amount: Money) -> Self {
        Self {
            kind,
            asset_id,
            category_id,
            amount,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
