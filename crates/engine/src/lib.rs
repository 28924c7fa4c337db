//! Personal finance engine.
//!
//! Users keep [`Asset`]s, label money with [`IncomeSource`]s and
//! [`ExpenseCategory`]s, and record [`IncomeTransaction`]s and
//! [`ExpenseTransaction`]s. Every write that creates or deletes a transaction
//! also moves the asset balance inside the same database transaction, so an
//! asset balance always equals its opening balance plus the signed sum of its
//! transactions.

pub use assets::{Asset, AssetKind};
pub use commands::{AssetUpdate, NewAsset, NewTransaction};
pub use error::EngineError;
pub use expense_categories::ExpenseCategory;
pub use expense_transactions::ExpenseTransaction;
pub use income_sources::IncomeSource;
pub use income_transactions::IncomeTransaction;
pub use money::{MONEY_SCALE, Money};
pub use ops::{
    Engine, EngineBuilder, ExpenseTransactionFilter, IncomeTransactionFilter, TelegramStart,
};
pub use page::{PAGE_SIZE, Page};
pub use summary::{ExpenseSummary, IncomeSummary, LedgerAudit, Summary};
pub use transactions::{ExpenseTransactionDetail, IncomeTransactionDetail, TransactionKind};
pub use users::User;

pub mod assets;
mod commands;
mod error;
pub mod expense_categories;
pub mod expense_transactions;
pub mod income_sources;
pub mod income_transactions;
mod money;
mod ops;
mod page;
mod summary;
pub mod telegram_users;
mod transactions;
pub mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
