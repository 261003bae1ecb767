use futures::future::join_all;
use rust_i18n::t;
use teloxide::{Bot, RequestError};
use teloxide::requests::Requester;
use teloxide::types::{BotCommand, BotCommandScope, ChatId, Recipient};
use teloxide::utils::command::BotCommands;
use crate::config::AdminIds;
use crate::handlers::{AdminCommands, HelpCommands, StartCommands};

pub async fn set_my_commands(bot: &Bot, lang_code: &str, admins: &AdminIds) -> Result<(), RequestError> {
    let personal_commands = || vec![
        StartCommands::bot_commands(),
        HelpCommands::bot_commands(),
    ];
    set_commands(bot, personal_commands(), BotCommandScope::AllPrivateChats, lang_code).await?;

    // an admin who has never started the bot doesn't have a chat yet, so these failures are not fatal
    let admin_requests = admins.iter()
        .map(|uid| {
            let mut commands = personal_commands();
            commands.push(AdminCommands::bot_commands());
            let scope = BotCommandScope::Chat { chat_id: Recipient::Id(ChatId::from(uid)) };
            async move {
                set_commands(bot, commands, scope, lang_code).await
                    .inspect_err(|e| log::warn!("couldn't set the admin commands for {uid}: {e}"))
            }
        });
    join_all(admin_requests).await;
    Ok(())
}

async fn set_commands(bot: &Bot, commands: Vec<Vec<BotCommand>>, scope: BotCommandScope, lang_code: &str) -> Result<(), RequestError> {
    let commands: Vec<BotCommand> = commands
        .concat()
        .into_iter()
        .filter(|cmd| !cmd.description.is_empty())
        .map(|mut cmd| {
            cmd.description = t!(&format!("commands.{}.description", cmd.description), locale = lang_code);
            cmd
        })
        .collect();
    let mut request = bot.set_my_commands(commands);
    request.language_code.replace(lang_code.to_owned());
    request.scope.replace(scope);
    request.await?;
    Ok(())
}
