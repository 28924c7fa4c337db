use reqwest::StatusCode;
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InlineKeyboardMarkup, User},
    utils::command::BotCommands,
};
use uuid::Uuid;

use api_types::telegram::TelegramStartResponse;

use crate::{
    ConfigParameters,
    api::{ApiClient, ApiError},
    commands::Command,
    dialog::{Dialog, DialogError, Progress, Step, Submission},
    parsing::{Callback, Section},
    ui,
};

const UNLINKED_TEXT: &str = "You don't link telegram user with site user. Try /start command.";
const NO_USERNAME_TEXT: &str = "Set a Telegram username in your profile to use this bot.";

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let Some(tg) = msg.from.as_ref().and_then(|from| from.username.clone()) else {
        bot.send_message(chat_id, NO_USERNAME_TEXT).await?;
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Ok(cmd) = Command::parse(text, &cfg.bot_username) {
        cfg.sessions.update(chat_id, |s| s.dialog = None).await;
        return handle_command(&bot, chat_id, &tg, &cfg, cmd).await;
    }

    let session = cfg.sessions.get(chat_id).await;
    let Some(mut dialog) = session.dialog else {
        bot.send_message(chat_id, "Unknown message, try /help.")
            .await?;
        return Ok(());
    };

    let progress = dialog.answer_text(text);
    advance_dialog(&bot, chat_id, &tg, &cfg, dialog, progress).await
}

async fn handle_command(
    bot: &Bot,
    chat_id: ChatId,
    tg: &str,
    cfg: &ConfigParameters,
    cmd: Command,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            let text = match cfg.api.telegram_start(tg).await {
                Ok(TelegramStartResponse::Linked { username }) => {
                    format!("Welcome back, @{tg}. You already linked as {username}.")
                }
                Ok(TelegramStartResponse::NeedsLink { token }) => format!(
                    "Hello, @{tg}. You need to link your telegram account and site account: \
                     sign in on the site and follow the link {}",
                    link_url(&cfg.link_base, tg, &token)
                ),
                Err(err) => user_message_for_api_error(err),
            };
            bot.send_message(chat_id, text).await?;
        }
        Command::Stop => {
            let text = match cfg.api.telegram_stop(tg).await {
                Ok(_) => format!("See you, @{tg}."),
                Err(err) => user_message_for_api_error(err),
            };
            cfg.sessions.clear(chat_id).await;
            bot.send_message(chat_id, text).await?;
        }
        Command::Unlink => {
            let text = match cfg.api.telegram_unlink(tg).await {
                Ok(true) => format!("Account @{tg} unlinked."),
                Ok(false) => UNLINKED_TEXT.to_string(),
                Err(err) => user_message_for_api_error(err),
            };
            cfg.sessions.clear(chat_id).await;
            bot.send_message(chat_id, text).await?;
        }
        Command::Categories => {
            let (text, kb) = ui::render_categories_menu();
            send_hub(bot, chat_id, cfg, text, kb).await?;
        }
        Command::Transactions => {
            let (text, kb) = ui::render_transactions_menu();
            send_hub(bot, chat_id, cfg, text, kb).await?;
        }
        Command::Help => {
            bot.send_message(chat_id, "Choose your next keyboard action")
                .reply_markup(ui::help_keyboard())
                .await?;
        }
    }
    Ok(())
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(tg) = q.from.username.clone() else {
        bot.send_message(chat_id, NO_USERNAME_TEXT).await?;
        return Ok(());
    };
    let Some(callback) = q.data.as_deref().and_then(Callback::parse) else {
        tracing::debug!(data = ?q.data, "ignoring unknown callback data");
        return Ok(());
    };

    match callback {
        Callback::Open(section) => {
            cfg.sessions.update(chat_id, |s| s.dialog = None).await;
            let (text, kb) = ui::render_section_menu(section);
            edit_or_send(&bot, chat_id, &cfg, text, kb).await?;
        }
        Callback::Show { section, page } => {
            show_list(&bot, chat_id, &tg, &cfg, section, page).await?;
        }
        Callback::Create(section) => {
            let dialog = Dialog::new(section);
            let step = dialog.step();
            cfg.sessions.update(chat_id, |s| s.dialog = Some(dialog)).await;
            prompt_step(&bot, chat_id, &tg, &cfg, section, step, 1).await?;
        }
        Callback::DeleteMenu { section, page } => {
            show_delete_menu(&bot, chat_id, &tg, &cfg, section, page).await?;
        }
        Callback::Delete { section, id } => {
            match delete_item(&cfg.api, &tg, section, id).await {
                Ok(()) => {
                    bot.send_message(chat_id, "Deleted.").await?;
                }
                Err(err) => {
                    bot.send_message(chat_id, user_message_for_api_error(err))
                        .await?;
                }
            }
            show_delete_menu(&bot, chat_id, &tg, &cfg, section, 1).await?;
        }
        Callback::Pick(id) => {
            let Some(mut dialog) = cfg.sessions.get(chat_id).await.dialog else {
                bot.send_message(chat_id, "This choice has expired.")
                    .await?;
                return Ok(());
            };
            let progress = dialog.answer_pick(id);
            advance_dialog(&bot, chat_id, &tg, &cfg, dialog, progress).await?;
        }
        Callback::PickPage(page) => {
            let Some(dialog) = cfg.sessions.get(chat_id).await.dialog else {
                return Ok(());
            };
            if dialog.step().is_pick() {
                prompt_step(&bot, chat_id, &tg, &cfg, dialog.section(), dialog.step(), page)
                    .await?;
            }
        }
    }

    Ok(())
}

/// Store the answered dialog and ask the next question, or post the result.
async fn advance_dialog(
    bot: &Bot,
    chat_id: ChatId,
    tg: &str,
    cfg: &ConfigParameters,
    dialog: Dialog,
    progress: Result<Progress, DialogError>,
) -> ResponseResult<()> {
    let section = dialog.section();
    match progress {
        Err(err) => {
            bot.send_message(chat_id, err.to_string()).await?;
        }
        Ok(Progress::Next(step)) => {
            cfg.sessions.update(chat_id, |s| s.dialog = Some(dialog)).await;
            prompt_step(bot, chat_id, tg, cfg, section, step, 1).await?;
        }
        Ok(Progress::Done(submission)) => {
            cfg.sessions.update(chat_id, |s| s.dialog = None).await;
            let text = match submit(&cfg.api, tg, &submission).await {
                Ok(()) if section_is_transaction(section) => "Transaction has created".to_string(),
                Ok(()) => "Category has created".to_string(),
                Err(err) => user_message_for_api_error(err),
            };
            bot.send_message(chat_id, text).await?;
        }
    }
    Ok(())
}

async fn prompt_step(
    bot: &Bot,
    chat_id: ChatId,
    tg: &str,
    cfg: &ConfigParameters,
    section: Section,
    step: Step,
    page: u64,
) -> ResponseResult<()> {
    let Some(source) = pick_source(step) else {
        bot.send_message(chat_id, step.prompt(section)).await?;
        return Ok(());
    };

    let (items, has_next) = match fetch_page(cfg, tg, source, page).await {
        Ok(found) => found,
        Err(err) => {
            cfg.sessions.update(chat_id, |s| s.dialog = None).await;
            bot.send_message(chat_id, user_message_for_api_error(err))
                .await?;
            return Ok(());
        }
    };

    if items.is_empty() && page == 1 {
        cfg.sessions.update(chat_id, |s| s.dialog = None).await;
        bot.send_message(
            chat_id,
            format!(
                "Nothing to choose from, create some {} first.",
                source.label().to_lowercase()
            ),
        )
        .await?;
        return Ok(());
    }

    let (text, kb) = ui::render_pick(step.prompt(section), page, has_next, &items);
    bot.send_message(chat_id, text).reply_markup(kb).await?;
    Ok(())
}

async fn show_list(
    bot: &Bot,
    chat_id: ChatId,
    tg: &str,
    cfg: &ConfigParameters,
    section: Section,
    page: u64,
) -> ResponseResult<()> {
    match fetch_page(cfg, tg, section, page).await {
        Ok((items, has_next)) => {
            let lines = items.into_iter().map(|(_, line)| line).collect::<Vec<_>>();
            let (text, kb) = ui::render_list(section, page, has_next, &lines);
            edit_or_send(bot, chat_id, cfg, text, kb).await
        }
        Err(err) => {
            bot.send_message(chat_id, user_message_for_api_error(err))
                .await?;
            Ok(())
        }
    }
}

async fn show_delete_menu(
    bot: &Bot,
    chat_id: ChatId,
    tg: &str,
    cfg: &ConfigParameters,
    section: Section,
    page: u64,
) -> ResponseResult<()> {
    match fetch_page(cfg, tg, section, page).await {
        Ok((items, has_next)) => {
            let (text, kb) = ui::render_delete_list(section, page, has_next, &items);
            edit_or_send(bot, chat_id, cfg, text, kb).await
        }
        Err(err) => {
            bot.send_message(chat_id, user_message_for_api_error(err))
                .await?;
            Ok(())
        }
    }
}

/// One page of a section as `(id, line)` pairs plus whether more pages follow.
async fn fetch_page(
    cfg: &ConfigParameters,
    tg: &str,
    section: Section,
    page: u64,
) -> Result<(Vec<(Uuid, String)>, bool), ApiError> {
    let api = &cfg.api;
    let found = match section {
        Section::Assets => {
            let page = api.assets(tg, page).await?;
            let has_next = page.has_next();
            let items = page.items.iter().map(|a| (a.id, ui::format_asset(a)));
            (items.collect(), has_next)
        }
        Section::Incomes => {
            let page = api.income_sources(tg, page).await?;
            let has_next = page.has_next();
            let items = page
                .items
                .iter()
                .map(|i| (i.id, ui::format_income_source(i)));
            (items.collect(), has_next)
        }
        Section::Expenses => {
            let page = api.expense_categories(tg, page).await?;
            let has_next = page.has_next();
            let items = page
                .items
                .iter()
                .map(|e| (e.id, ui::format_expense_category(e)));
            (items.collect(), has_next)
        }
        Section::Incoming => {
            let names = ui::Names::from(&api.common_info(tg).await?);
            let page = api.income_transactions(tg, page).await?;
            let has_next = page.has_next();
            let items = page
                .items
                .iter()
                .map(|t| (t.id, ui::format_income_transaction(t, &names, cfg.timezone)));
            (items.collect(), has_next)
        }
        Section::Outgoing => {
            let names = ui::Names::from(&api.common_info(tg).await?);
            let page = api.expense_transactions(tg, page).await?;
            let has_next = page.has_next();
            let items = page
                .items
                .iter()
                .map(|t| (t.id, ui::format_expense_transaction(t, &names, cfg.timezone)));
            (items.collect(), has_next)
        }
    };
    Ok(found)
}

async fn delete_item(
    api: &ApiClient,
    tg: &str,
    section: Section,
    id: Uuid,
) -> Result<(), ApiError> {
    match section {
        Section::Assets => api.delete_asset(tg, id).await,
        Section::Incomes => api.delete_income_source(tg, id).await,
        Section::Expenses => api.delete_expense_category(tg, id).await,
        Section::Incoming => api.delete_income_transaction(tg, id).await,
        Section::Outgoing => api.delete_expense_transaction(tg, id).await,
    }
}

async fn submit(api: &ApiClient, tg: &str, submission: &Submission) -> Result<(), ApiError> {
    let created = match submission {
        Submission::Asset(body) => api.create_asset(tg, body).await?,
        Submission::Income(body) => api.create_income_source(tg, body).await?,
        Submission::Expense(body) => api.create_expense_category(tg, body).await?,
        Submission::Incoming(body) => api.create_income_transaction(tg, body).await?,
        Submission::Outgoing(body) => api.create_expense_transaction(tg, body).await?,
    };
    tracing::debug!(id = %created.id, "created from chat");
    Ok(())
}

/// List a pick step chooses from.
fn pick_source(step: Step) -> Option<Section> {
    match step {
        Step::Asset => Some(Section::Assets),
        Step::IncomeSource => Some(Section::Incomes),
        Step::ExpenseCategory => Some(Section::Expenses),
        _ => None,
    }
}

fn section_is_transaction(section: Section) -> bool {
    Section::TRANSACTIONS.contains(&section)
}

/// Send a fresh menu message that later callbacks will edit.
async fn send_hub(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: String,
    kb: InlineKeyboardMarkup,
) -> ResponseResult<()> {
    let sent = bot.send_message(chat_id, text).reply_markup(kb).await?;
    cfg.sessions
        .update(chat_id, |s| s.hub_message_id = Some(sent.id))
        .await;
    Ok(())
}

async fn edit_or_send(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: String,
    kb: InlineKeyboardMarkup,
) -> ResponseResult<()> {
    let session = cfg.sessions.get(chat_id).await;
    if let Some(message_id) = session.hub_message_id
        && bot
            .edit_message_text(chat_id, message_id, text.clone())
            .reply_markup(kb.clone())
            .await
            .is_ok()
    {
        return Ok(());
    }

    send_hub(bot, chat_id, cfg, text, kb).await
}

fn link_url(base: &str, tg: &str, token: &str) -> String {
    format!("{}/telegram/link/{tg}/{token}", base.trim_end_matches('/'))
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}

fn user_message_for_api_error(err: ApiError) -> String {
    if err.is_unlinked() {
        return UNLINKED_TEXT.to_string();
    }
    match err {
        ApiError::Network(_) => "Cannot reach the server, try again later.".to_string(),
        ApiError::Server { status, message } => match status {
            StatusCode::FORBIDDEN => "Operation not allowed.".to_string(),
            StatusCode::NOT_FOUND => "Not found, it may have been deleted already.".to_string(),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => message,
            _ => "Server error.".to_string(),
        },
    }
}
