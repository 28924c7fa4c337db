//! Request and response bodies of the HTTP API.
//!
//! Money travels as decimal strings (`"19.9999"`) and is parsed by the
//! server, so the bot never has to deal with floating point.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body returned by every create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

pub mod page {
    use super::*;

    /// `?page=` query parameter. Pages start at 1.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub page: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PageView<T> {
        pub items: Vec<T>,
        pub page: u64,
        pub total_items: u64,
        pub total_pages: u64,
    }

    impl<T> PageView<T> {
        pub fn has_next(&self) -> bool {
            self.page < self.total_pages
        }
    }
}

pub mod asset {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum AssetKind {
        #[serde(rename = "CA")]
        Cash,
        #[serde(rename = "BC")]
        BankCard,
        #[serde(rename = "CC")]
        CreditCard,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetNew {
        pub description: String,
        pub kind: Option<AssetKind>,
        /// Opening balance, defaults to zero.
        pub start_balance: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AssetUpdate {
        pub description: String,
        pub kind: Option<AssetKind>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AssetView {
        pub id: Uuid,
        pub description: String,
        pub kind: Option<AssetKind>,
        pub balance: String,
        pub opening_balance: String,
    }

    /// Stored balance compared with the one rebuilt from the transactions.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditView {
        pub recorded: String,
        pub opening: String,
        pub income_total: String,
        pub expense_total: String,
        pub expected: String,
        pub consistent: bool,
    }
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeSourceNew {
        pub description: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct IncomeSourceView {
        pub id: Uuid,
        pub description: String,
    }
}

pub mod expense {
    use super::*;

    /// Create and update body. A missing `monthly_limit` means no limit.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCategoryNew {
        pub description: String,
        pub monthly_limit: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseCategoryView {
        pub id: Uuid,
        pub description: String,
        pub monthly_limit: Option<String>,
    }
}

pub mod transaction {
    use chrono::{DateTime, FixedOffset, Utc};

    use super::{asset::AssetView, expense::ExpenseCategoryView, income::IncomeSourceView, *};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeTransactionNew {
        pub asset_id: Uuid,
        pub income_source_id: Uuid,
        pub amount: String,
        /// RFC3339 timestamp; the server uses now() when absent.
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTransactionNew {
        pub asset_id: Uuid,
        pub expense_category_id: Uuid,
        pub amount: String,
        #[serde(default)]
        pub tags: Vec<String>,
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeTransactionQuery {
        pub page: Option<u64>,
        pub asset_id: Option<Uuid>,
        pub income_source_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseTransactionQuery {
        pub page: Option<u64>,
        pub asset_id: Option<Uuid>,
        pub expense_category_id: Option<Uuid>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct IncomeTransactionView {
        pub id: Uuid,
        pub asset_id: Uuid,
        pub income_source_id: Uuid,
        pub amount: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseTransactionView {
        pub id: Uuid,
        pub asset_id: Uuid,
        pub expense_category_id: Uuid,
        pub amount: String,
        pub tags: Vec<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeTransactionDetail {
        pub transaction: IncomeTransactionView,
        pub asset: AssetView,
        pub income_source: IncomeSourceView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTransactionDetail {
        pub transaction: ExpenseTransactionView,
        pub asset: AssetView,
        pub expense_category: ExpenseCategoryView,
    }
}

pub mod summary {
    use super::{asset::AssetView, *};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeSummaryView {
        pub id: Uuid,
        pub description: String,
        pub month_total: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseSummaryView {
        pub id: Uuid,
        pub description: String,
        pub monthly_limit: Option<String>,
        pub month_total: String,
        pub over_limit: bool,
    }

    /// `GET /common-info`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommonInfo {
        pub assets: Vec<AssetView>,
        pub incomes: Vec<IncomeSummaryView>,
        pub expenses: Vec<ExpenseSummaryView>,
    }
}

pub mod telegram {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TelegramUser {
        pub tg_username: String,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "status", rename_all = "snake_case")]
    pub enum TelegramStartResponse {
        Linked { username: String },
        NeedsLink { token: String },
    }

    /// Result of stop/unlink: `false` when there was nothing to change.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TelegramChanged {
        pub changed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TelegramLinked {
        pub tg_username: String,
        pub username: String,
    }
}

#[cfg(test)]
mod tests {
    use super::{asset::AssetKind, telegram::TelegramStartResponse};

    #[test]
    fn asset_kind_uses_short_codes() {
        let json = serde_json::to_string(&AssetKind::BankCard).unwrap();
        assert_eq!(json, "\"BC\"");
        let kind: AssetKind = serde_json::from_str("\"CC\"").unwrap();
        assert_eq!(kind, AssetKind::CreditCard);
    }

    #[test]
    fn start_response_is_tagged() {
        let json = serde_json::to_value(TelegramStartResponse::NeedsLink {
            token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "needs_link");
        assert_eq!(json["token"], "abc");
    }
}
