//! Initial schema.
//!
//! - `users`: authentication
//! - `assets`: money holdings with their running balance
//! - `income_sources` / `expense_categories`: per-user labels
//! - `income_transactions` / `expense_transactions`: ledger rows
//!
//! Money columns hold integer ten-thousandths (4 decimal places).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Assets {
    Table,
    Id,
    UserId,
    Description,
    Kind,
    BalanceMinor,
    OpeningBalanceMinor,
}

#[derive(Iden)]
enum IncomeSources {
    Table,
    Id,
    UserId,
    Description,
}

#[derive(Iden)]
enum ExpenseCategories {
    Table,
    Id,
    UserId,
    Description,
    MonthlyLimitMinor,
}

#[derive(Iden)]
enum IncomeTransactions {
    Table,
    Id,
    AssetId,
    IncomeSourceId,
    AmountMinor,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseTransactions {
    Table,
    Id,
    AssetId,
    ExpenseCategoryId,
    AmountMinor,
    Tags,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Assets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Assets::UserId).string().not_null())
                    .col(ColumnDef::new(Assets::Description).string().not_null())
                    .col(ColumnDef::new(Assets::Kind).string())
                    .col(
                        ColumnDef::new(Assets::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Assets::OpeningBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-user_id")
                            .from(Assets::Table, Assets::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-assets-user_id")
                    .table(Assets::Table)
                    .col(Assets::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Income sources
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(IncomeSources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncomeSources::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IncomeSources::UserId).string().not_null())
                    .col(ColumnDef::new(IncomeSources::Description).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_sources-user_id")
                            .from(IncomeSources::Table, IncomeSources::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expense categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseCategories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseCategories::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseCategories::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseCategories::MonthlyLimitMinor).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_categories-user_id")
                            .from(ExpenseCategories::Table, ExpenseCategories::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Income transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(IncomeTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncomeTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IncomeTransactions::AssetId).string().not_null())
                    .col(
                        ColumnDef::new(IncomeTransactions::IncomeSourceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IncomeTransactions::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(IncomeTransactions::AmountMinor).gt(0)),
                    )
                    .col(
                        ColumnDef::new(IncomeTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_transactions-asset_id")
                            .from(IncomeTransactions::Table, IncomeTransactions::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_transactions-income_source_id")
                            .from(IncomeTransactions::Table, IncomeTransactions::IncomeSourceId)
                            .to(IncomeSources::Table, IncomeSources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-income_transactions-asset_id-created_at")
                    .table(IncomeTransactions::Table)
                    .col(IncomeTransactions::AssetId)
                    .col(IncomeTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-income_transactions-created_at")
                    .table(IncomeTransactions::Table)
                    .col(IncomeTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Expense transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseTransactions::AssetId).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseTransactions::ExpenseCategoryId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseTransactions::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(ExpenseTransactions::AmountMinor).gt(0)),
                    )
                    .col(
                        ColumnDef::new(ExpenseTransactions::Tags)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ExpenseTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_transactions-asset_id")
                            .from(ExpenseTransactions::Table, ExpenseTransactions::AssetId)
                            .to(Assets::Table, Assets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_transactions-expense_category_id")
                            .from(
                                ExpenseTransactions::Table,
                                ExpenseTransactions::ExpenseCategoryId,
                            )
                            .to(ExpenseCategories::Table, ExpenseCategories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_transactions-asset_id-created_at")
                    .table(ExpenseTransactions::Table)
                    .col(ExpenseTransactions::AssetId)
                    .col(ExpenseTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_transactions-created_at")
                    .table(ExpenseTransactions::Table)
                    .col(ExpenseTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpenseTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncomeTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncomeSources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
