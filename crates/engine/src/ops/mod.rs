use sea_orm::{
    DatabaseConnection, DatabaseTransaction, EntityTrait, FromQueryResult, PaginatorTrait, Select,
};

use crate::{
    EngineError, ResultEngine,
    page::{PAGE_SIZE, Page, validate_page},
    util::MAX_DESCRIPTION_LEN,
};

mod access;
mod assets;
mod categories;
mod ledger;
mod summary;
mod telegram;
mod transactions;
mod users;

pub use telegram::TelegramStart;
pub use transactions::{ExpenseTransactionFilter, IncomeTransactionFilter};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Trim a description and enforce the shared length rules.
fn normalize_description(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidField(format!(
            "{label} description must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::InvalidField(format!(
            "{label} description is longer than {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Load one page of `select`, pages are 1-based.
async fn fetch_page<E>(
    db: &DatabaseTransaction,
    select: Select<E>,
    page: u64,
) -> ResultEngine<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let page = validate_page(page)?;
    let paginator = select.paginate(db, PAGE_SIZE);
    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(page - 1).await?;
    Ok(Page {
        items,
        page,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_trimmed() {
        assert_eq!(normalize_description("  Cash ", "asset").unwrap(), "Cash");
    }

    #[test]
    fn blank_or_huge_description_is_rejected() {
        assert!(matches!(
            normalize_description("   ", "asset"),
            Err(EngineError::InvalidField(_))
        ));
        let huge = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(normalize_description(&huge, "asset").is_err());
    }
}
