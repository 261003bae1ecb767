use rust_i18n::t;
use teloxide::Bot;
use teloxide::macros::BotCommands;
use teloxide::types::Message;
use crate::domain::{LanguageCode, Username};
use crate::handlers::{HandlerResult, register_user, reply_html};
use crate::{metrics, repo};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum StartCommands {
    #[command(description = "start")]
    Start(String),
}

pub async fn start_cmd_handler(bot: Bot, msg: Message, cmd: StartCommands, repos: repo::Repositories) -> HandlerResult {
    metrics::CMD_START_COUNTER.inc();
    let StartCommands::Start(payload) = cmd;
    if !payload.is_empty() {
        log::debug!("/start was invoked with a deep link payload: {payload}");
    }
    let lang_code = LanguageCode::from_maybe_user(msg.from.as_ref()).locale();
    let help = t!("commands.help.text", locale = &lang_code);
    let answer = match msg.from.as_ref() {
        Some(user) => {
            register_user(&repos.users, user).await;
            let name = Username::from_user(user);
            t!("commands.start.greeting", locale = &lang_code,
                name = name.escaped(), help = help)
        }
        None => {
            log::warn!("The /start command was invoked without a FROM field for message: {:?}", msg);
            help
        }
    };
    reply_html(bot, &msg, answer).await?;
    Ok(())
}
