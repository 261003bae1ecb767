use rust_i18n::t;
use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::types::Message;
use crate::domain::LanguageCode;
use crate::handlers::{HandlerResult, reply_html};
use crate::metrics;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum HelpCommands {
    #[command(description = "help")]
    Help,
}

pub async fn help_cmd_handler(bot: Bot, msg: Message) -> HandlerResult {
    metrics::CMD_HELP_COUNTER.inc();
    let lang_code = LanguageCode::from_maybe_user(msg.from.as_ref()).locale();
    reply_html(bot, &msg, t!("commands.help.text", locale = &lang_code)).await?;
    Ok(())
}
