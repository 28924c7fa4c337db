//! Step-by-step create dialogs.
//!
//! A [`Dialog`] asks one question per step and keeps the answers until the
//! last one, then yields the request body to send to the server. It does no
//! I/O so the whole flow is testable without Telegram.

use api_types::{
    asset::{AssetKind, AssetNew},
    expense::ExpenseCategoryNew,
    income::IncomeSourceNew,
    transaction::{ExpenseTransactionNew, IncomeTransactionNew},
};
use engine::Money;
use uuid::Uuid;

use crate::parsing::Section;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Description,
    StartBalance,
    Kind,
    MonthlyLimit,
    Asset,
    IncomeSource,
    ExpenseCategory,
    Amount,
    Tags,
}

impl Step {
    /// Steps answered with a button instead of text.
    pub(crate) fn is_pick(self) -> bool {
        matches!(self, Self::Asset | Self::IncomeSource | Self::ExpenseCategory)
    }

    pub(crate) fn prompt(self, section: Section) -> &'static str {
        match (self, section) {
            (Self::Description, Section::Assets) => "Input asset name",
            (Self::Description, Section::Expenses) => "Input expense name",
            (Self::Description, _) => "Input category name",
            (Self::StartBalance, _) => "Input start balance",
            (Self::Kind, _) => {
                "Input asset type (CA = cash, BC = bank card, CC = credit card, - to skip)"
            }
            (Self::MonthlyLimit, _) => "Input monthly limit (- for no limit)",
            (Self::Asset, _) => "Choose the asset",
            (Self::IncomeSource, _) => "Choose the income source",
            (Self::ExpenseCategory, _) => "Choose the expense category",
            (Self::Amount, _) => "Input amount",
            (Self::Tags, _) => "Input tags separated by commas (- for none)",
        }
    }
}

fn steps(section: Section) -> &'static [Step] {
    match section {
        Section::Assets => &[Step::Description, Step::StartBalance, Step::Kind],
        Section::Incomes => &[Step::Description],
        Section::Expenses => &[Step::Description, Step::MonthlyLimit],
        Section::Incoming => &[Step::Asset, Step::IncomeSource, Step::Amount],
        Section::Outgoing => &[Step::Asset, Step::ExpenseCategory, Step::Amount, Step::Tags],
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum DialogError {
    #[error("The value must not be empty, try again.")]
    Empty,
    #[error("Invalid amount, use a number like 12.50 (max 4 decimals).")]
    InvalidAmount,
    #[error("The amount must be greater than zero.")]
    NotPositive,
    #[error("The monthly limit must not be negative.")]
    NegativeLimit,
    #[error("Unknown asset type, use CA, BC or CC.")]
    InvalidKind,
    #[error("Choose one of the buttons above.")]
    ExpectedButton,
    #[error("Type the answer as a message.")]
    ExpectedText,
}

/// Body ready to be posted once every step is answered.
#[derive(Debug)]
pub(crate) enum Submission {
    Asset(AssetNew),
    Income(IncomeSourceNew),
    Expense(ExpenseCategoryNew),
    Incoming(IncomeTransactionNew),
    Outgoing(ExpenseTransactionNew),
}

#[derive(Debug)]
pub(crate) enum Progress {
    Next(Step),
    Done(Submission),
}

#[derive(Clone, Debug, Default)]
struct Answers {
    description: Option<String>,
    start_balance: Option<Money>,
    kind: Option<AssetKind>,
    monthly_limit: Option<Money>,
    asset_id: Option<Uuid>,
    category_id: Option<Uuid>,
    amount: Option<Money>,
    tags: Vec<String>,
}

#[derive(Clone, Debug)]
pub(crate) struct Dialog {
    section: Section,
    index: usize,
    answers: Answers,
}

impl Dialog {
    pub(crate) fn new(section: Section) -> Self {
        Self {
            section,
            index: 0,
            answers: Answers::default(),
        }
    }

    pub(crate) fn section(&self) -> Section {
        self.section
    }

    /// Step waiting for an answer.
    pub(crate) fn step(&self) -> Step {
        let steps = steps(self.section);
        steps[self.index.min(steps.len() - 1)]
    }

    pub(crate) fn answer_text(&mut self, text: &str) -> Result<Progress, DialogError> {
        let step = self.step();
        if step.is_pick() {
            return Err(DialogError::ExpectedButton);
        }
        let text = text.trim();

        match step {
            Step::Description => {
                if text.is_empty() {
                    return Err(DialogError::Empty);
                }
                self.answers.description = Some(text.to_string());
            }
            Step::StartBalance => {
                self.answers.start_balance = Some(parse_amount(text)?);
            }
            Step::Kind => {
                self.answers.kind = parse_kind(text)?;
            }
            Step::MonthlyLimit => {
                self.answers.monthly_limit = if is_skip(text) {
                    None
                } else {
                    let limit = parse_amount(text)?;
                    if limit.is_negative() {
                        return Err(DialogError::NegativeLimit);
                    }
                    Some(limit)
                };
            }
            Step::Amount => {
                let amount = parse_amount(text)?;
                if !amount.is_positive() {
                    return Err(DialogError::NotPositive);
                }
                self.answers.amount = Some(amount);
            }
            Step::Tags => {
                self.answers.tags = if is_skip(text) {
                    Vec::new()
                } else {
                    text.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(ToString::to_string)
                        .collect()
                };
            }
            Step::Asset | Step::IncomeSource | Step::ExpenseCategory => {
                return Err(DialogError::ExpectedButton);
            }
        }
        Ok(self.advance())
    }

    pub(crate) fn answer_pick(&mut self, id: Uuid) -> Result<Progress, DialogError> {
        match self.step() {
            Step::Asset => self.answers.asset_id = Some(id),
            Step::IncomeSource | Step::ExpenseCategory => self.answers.category_id = Some(id),
            _ => return Err(DialogError::ExpectedText),
        }
        Ok(self.advance())
    }

    fn advance(&mut self) -> Progress {
        self.index += 1;
        match steps(self.section).get(self.index) {
            Some(step) => Progress::Next(*step),
            None => Progress::Done(self.submission()),
        }
    }

    fn submission(&self) -> Submission {
        let a = &self.answers;
        let description = a.description.clone().unwrap_or_default();
        match self.section {
            Section::Assets => Submission::Asset(AssetNew {
                description,
                kind: a.kind,
                start_balance: a.start_balance.map(|m| m.to_string()),
            }),
            Section::Incomes => Submission::Income(IncomeSourceNew { description }),
            Section::Expenses => Submission::Expense(ExpenseCategoryNew {
                description,
                monthly_limit: a.monthly_limit.map(|m| m.to_string()),
            }),
            Section::Incoming => Submission::Incoming(IncomeTransactionNew {
                asset_id: a.asset_id.unwrap_or_default(),
                income_source_id: a.category_id.unwrap_or_default(),
                amount: a.amount.unwrap_or_default().to_string(),
                created_at: None,
            }),
            Section::Outgoing => Submission::Outgoing(ExpenseTransactionNew {
                asset_id: a.asset_id.unwrap_or_default(),
                expense_category_id: a.category_id.unwrap_or_default(),
                amount: a.amount.unwrap_or_default().to_string(),
                tags: a.tags.clone(),
                created_at: None,
            }),
        }
    }
}

fn is_skip(text: &str) -> bool {
    text.is_empty() || text == "-"
}

fn parse_amount(text: &str) -> Result<Money, DialogError> {
    if text.is_empty() {
        return Err(DialogError::Empty);
    }
    text.parse::<Money>().map_err(|_| DialogError::InvalidAmount)
}

fn parse_kind(text: &str) -> Result<Option<AssetKind>, DialogError> {
    if is_skip(text) {
        return Ok(None);
    }
    let kind = match text.to_ascii_lowercase().as_str() {
        "ca" | "cash" => AssetKind::Cash,
        "bc" | "bank card" => AssetKind::BankCard,
        "cc" | "credit card" => AssetKind::CreditCard,
        _ => return Err(DialogError::InvalidKind),
    };
    Ok(Some(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish(dialog: &mut Dialog, answers: &[&str]) -> Submission {
        let mut last = None;
        for answer in answers {
            last = Some(dialog.answer_text(answer).unwrap());
        }
        match last {
            Some(Progress::Done(submission)) => submission,
            other => panic!("dialog not finished: {other:?}"),
        }
    }

    #[test]
    fn asset_dialog_collects_name_balance_and_kind() {
        let mut dialog = Dialog::new(Section::Assets);
        assert_eq!(dialog.step(), Step::Description);

        let Submission::Asset(body) = finish(&mut dialog, &["Wallet", "100,5", "cc"]) else {
            panic!("wrong submission");
        };
        assert_eq!(body.description, "Wallet");
        assert_eq!(body.start_balance.as_deref(), Some("100.5000"));
        assert_eq!(body.kind, Some(AssetKind::CreditCard));
    }

    #[test]
    fn bad_answer_keeps_the_step() {
        let mut dialog = Dialog::new(Section::Expenses);
        dialog.answer_text("Food").unwrap();

        assert_eq!(dialog.answer_text("lots").unwrap_err(), DialogError::InvalidAmount);
        assert_eq!(dialog.answer_text("-5").unwrap_err(), DialogError::NegativeLimit);
        assert_eq!(dialog.step(), Step::MonthlyLimit);

        let Submission::Expense(body) = finish(&mut dialog, &["-"]) else {
            panic!("wrong submission");
        };
        assert_eq!(body.monthly_limit, None);
    }

    #[test]
    fn outgoing_dialog_mixes_buttons_and_text() {
        let asset = Uuid::new_v4();
        let category = Uuid::new_v4();
        let mut dialog = Dialog::new(Section::Outgoing);

        assert_eq!(dialog.answer_text("x").unwrap_err(), DialogError::ExpectedButton);
        assert!(matches!(
            dialog.answer_pick(asset),
            Ok(Progress::Next(Step::ExpenseCategory))
        ));
        assert!(matches!(
            dialog.answer_pick(category),
            Ok(Progress::Next(Step::Amount))
        ));
        assert_eq!(dialog.answer_pick(asset).unwrap_err(), DialogError::ExpectedText);
        assert_eq!(dialog.answer_text("0").unwrap_err(), DialogError::NotPositive);

        let Submission::Outgoing(body) = finish(&mut dialog, &["19.9999", " lunch, ,work "]) else {
            panic!("wrong submission");
        };
        assert_eq!(body.asset_id, asset);
        assert_eq!(body.expense_category_id, category);
        assert_eq!(body.amount, "19.9999");
        assert_eq!(body.tags, vec!["lunch", "work"]);
    }
}
