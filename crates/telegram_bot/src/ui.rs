use std::collections::HashMap;

use api_types::{
    asset::{AssetKind, AssetView},
    expense::ExpenseCategoryView,
    income::IncomeSourceView,
    summary::CommonInfo,
    transaction::{ExpenseTransactionView, IncomeTransactionView},
};
use chrono_tz::Tz;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use uuid::Uuid;

use crate::parsing::{Callback, Section};

fn button(text: impl Into<String>, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, callback.encode())
}

fn sections_menu(title: &str, sections: &[Section]) -> (String, InlineKeyboardMarkup) {
    let row = sections
        .iter()
        .map(|s| button(s.label(), Callback::Open(*s)))
        .collect::<Vec<_>>();
    (title.to_string(), InlineKeyboardMarkup::new(vec![row]))
}

pub(crate) fn render_categories_menu() -> (String, InlineKeyboardMarkup) {
    sections_menu("Categories", &Section::CATEGORIES)
}

pub(crate) fn render_transactions_menu() -> (String, InlineKeyboardMarkup) {
    sections_menu("Transactions", &Section::TRANSACTIONS)
}

pub(crate) fn render_section_menu(section: Section) -> (String, InlineKeyboardMarkup) {
    let kb = InlineKeyboardMarkup::new(vec![vec![
        button("show", Callback::Show { section, page: 1 }),
        button("create", Callback::Create(section)),
        button("delete", Callback::DeleteMenu { section, page: 1 }),
    ]]);
    (section.title().to_string(), kb)
}

pub(crate) fn help_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new("/categories"),
            KeyboardButton::new("/transactions"),
        ],
        vec![KeyboardButton::new("/start"), KeyboardButton::new("/stop")],
        vec![KeyboardButton::new("/unlink"), KeyboardButton::new("/help")],
    ])
}

/// Descriptions by id, used to show transactions by name.
#[derive(Debug, Default)]
pub(crate) struct Names {
    assets: HashMap<Uuid, String>,
    incomes: HashMap<Uuid, String>,
    expenses: HashMap<Uuid, String>,
}

impl From<&CommonInfo> for Names {
    fn from(info: &CommonInfo) -> Self {
        Self {
            assets: info
                .assets
                .iter()
                .map(|a| (a.id, a.description.clone()))
                .collect(),
            incomes: info
                .incomes
                .iter()
                .map(|i| (i.id, i.description.clone()))
                .collect(),
            expenses: info
                .expenses
                .iter()
                .map(|e| (e.id, e.description.clone()))
                .collect(),
        }
    }
}

fn lookup<'a>(names: &'a HashMap<Uuid, String>, id: &Uuid) -> &'a str {
    names.get(id).map(String::as_str).unwrap_or("?")
}

fn kind_label(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Cash => "cash",
        AssetKind::BankCard => "bank card",
        AssetKind::CreditCard => "credit card",
    }
}

pub(crate) fn format_asset(asset: &AssetView) -> String {
    match asset.kind {
        Some(kind) => format!(
            "{} ({}): {}",
            asset.description,
            kind_label(kind),
            asset.balance
        ),
        None => format!("{}: {}", asset.description, asset.balance),
    }
}

pub(crate) fn format_income_source(source: &IncomeSourceView) -> String {
    source.description.clone()
}

pub(crate) fn format_expense_category(category: &ExpenseCategoryView) -> String {
    match &category.monthly_limit {
        Some(limit) => format!("{}, monthly limit {limit}", category.description),
        None => category.description.clone(),
    }
}

pub(crate) fn format_income_transaction(
    tx: &IncomeTransactionView,
    names: &Names,
    tz: Tz,
) -> String {
    format!(
        "{} • +{} • {} ← {}",
        tx.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
        tx.amount,
        lookup(&names.assets, &tx.asset_id),
        lookup(&names.incomes, &tx.income_source_id),
    )
}

pub(crate) fn format_expense_transaction(
    tx: &ExpenseTransactionView,
    names: &Names,
    tz: Tz,
) -> String {
    let mut line = format!(
        "{} • -{} • {} → {}",
        tx.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
        tx.amount,
        lookup(&names.assets, &tx.asset_id),
        lookup(&names.expenses, &tx.expense_category_id),
    );
    for tag in &tx.tags {
        line.push_str(&format!(" #{tag}"));
    }
    line
}

pub(crate) fn render_list(
    section: Section,
    page: u64,
    has_next: bool,
    lines: &[String],
) -> (String, InlineKeyboardMarkup) {
    let mut text = section.title().to_string();
    if lines.is_empty() {
        text.push_str("\n\nNothing here yet.");
    }
    for line in lines {
        text.push_str("\n\n");
        text.push_str(line);
    }

    let mut row = Vec::new();
    if has_next {
        row.push(button(
            "More ➡️",
            Callback::Show {
                section,
                page: page + 1,
            },
        ));
    }
    row.push(button("⬅️ Back", Callback::Open(section)));
    (text, InlineKeyboardMarkup::new(vec![row]))
}

pub(crate) fn render_delete_list(
    section: Section,
    page: u64,
    has_next: bool,
    items: &[(Uuid, String)],
) -> (String, InlineKeyboardMarkup) {
    let text = if items.is_empty() {
        format!("{}\n\nNothing to delete.", section.title())
    } else {
        format!("{}\n\nChoose the item to delete:", section.title())
    };

    let mut rows: Vec<Vec<InlineKeyboardButton>> = items
        .iter()
        .map(|(id, label)| vec![button(label.clone(), Callback::Delete { section, id: *id })])
        .collect();
    let mut nav = Vec::new();
    if has_next {
        nav.push(button(
            "More ➡️",
            Callback::DeleteMenu {
                section,
                page: page + 1,
            },
        ));
    }
    nav.push(button("⬅️ Back", Callback::Open(section)));
    rows.push(nav);

    (text, InlineKeyboardMarkup::new(rows))
}

pub(crate) fn render_pick(
    prompt: &str,
    page: u64,
    has_next: bool,
    items: &[(Uuid, String)],
) -> (String, InlineKeyboardMarkup) {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = items
        .iter()
        .map(|(id, label)| vec![button(label.clone(), Callback::Pick(*id))])
        .collect();
    if has_next {
        rows.push(vec![button("More ➡️", Callback::PickPage(page + 1))]);
    }
    (prompt.to_string(), InlineKeyboardMarkup::new(rows))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn expense_line_uses_names_timezone_and_tags() {
        let asset = Uuid::new_v4();
        let category = Uuid::new_v4();
        let names = Names {
            assets: HashMap::from([(asset, "Wallet".to_string())]),
            expenses: HashMap::from([(category, "Food".to_string())]),
            ..Default::default()
        };
        let tx = ExpenseTransactionView {
            id: Uuid::new_v4(),
            asset_id: asset,
            expense_category_id: category,
            amount: "30.0000".to_string(),
            tags: vec!["lunch".to_string()],
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 23, 30, 0).unwrap(),
        };

        let line = format_expense_transaction(&tx, &names, chrono_tz::Europe::Rome);
        assert_eq!(line, "2026-01-11 00:30 • -30.0000 • Wallet → Food #lunch");
    }

    #[test]
    fn empty_list_says_so_and_offers_back() {
        let (text, kb) = render_list(Section::Assets, 1, false, &[]);
        assert!(text.ends_with("Nothing here yet."));
        assert_eq!(kb.inline_keyboard.len(), 1);
        assert_eq!(kb.inline_keyboard[0].len(), 1);
    }

    #[test]
    fn asset_line_shows_kind() {
        let asset = AssetView {
            id: Uuid::new_v4(),
            description: "Card".to_string(),
            kind: Some(AssetKind::BankCard),
            balance: "10.0000".to_string(),
            opening_balance: "0.0000".to_string(),
        };
        assert_eq!(format_asset(&asset), "Card (bank card): 10.0000");
    }
}
