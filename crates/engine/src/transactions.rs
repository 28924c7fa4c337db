//! Shared vocabulary for the two transaction tables.

use serde::{Deserialize, Serialize};

use crate::{
    Asset, EngineError, ExpenseCategory, ExpenseTransaction, IncomeSource, IncomeTransaction,
    Money,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Effect of creating a transaction of this kind on its asset balance.
    pub fn balance_delta(self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidField(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// An income transaction with the rows it points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomeTransactionDetail {
    pub transaction: IncomeTransaction,
    pub asset: Asset,
    pub income_source: IncomeSource,
}

/// An expense transaction with the rows it points to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseTransactionDetail {
    pub transaction: ExpenseTransaction,
    pub asset: Asset,
    pub expense_category: ExpenseCategory,
}
