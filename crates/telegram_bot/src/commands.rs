//! Command structs

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub(crate) enum Command {
    #[command(description = "link this chat with your site account.")]
    Start,
    #[command(description = "pause the bot for this chat.")]
    Stop,
    #[command(description = "remove the link with your site account.")]
    Unlink,
    #[command(description = "browse assets, incomes and expenses.")]
    Categories,
    #[command(description = "browse incoming and outgoing transactions.")]
    Transactions,
    #[command(description = "show the command keyboard.")]
    Help,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_addressed_commands() {
        assert_eq!(
            Command::parse("/categories", "moneybook_bot").ok(),
            Some(Command::Categories)
        );
        assert_eq!(
            Command::parse("/unlink@moneybook_bot", "moneybook_bot").ok(),
            Some(Command::Unlink)
        );
        assert!(Command::parse("/unlink@other_bot", "moneybook_bot").is_err());
        assert!(Command::parse("Wallet", "moneybook_bot").is_err());
    }
}
