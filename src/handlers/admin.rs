use std::sync::Arc;
use async_trait::async_trait;
use derive_more::Display;
use rust_i18n::t;
use teloxide::{ApiError, Bot, RequestError};
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::macros::BotCommands;
use teloxide::prelude::{CallbackQuery, ChatId, Dialogue, Message, Requester, UserId};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Me, MessageId, ReplyMarkup};
use crate::config::AppConfig;
use crate::domain::LanguageCode;
use crate::handlers::{checks, HandlerResult, reply_html};
use crate::handlers::utils::broadcaster::{Broadcaster, Delivery, DeliveryStatus};
use crate::handlers::utils::callbacks::{CallbackDataWithPrefix, InvalidCallbackData, InvalidCallbackDataBuilder};
use crate::{metrics, repo};

const CANCEL_TOKEN: &str = "/cancel";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum AdminCommands {
    #[command(description = "admin")]
    Admin,
    #[command(description = "cancel")]
    Cancel,
}

/// Per-admin conversation state; the dialogue key is the admin's private chat id, equal to their user id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BroadcastState {
    #[default]
    Idle,
    AwaitingContent,
}

pub type BroadcastDialogue = Dialogue<BroadcastState, InMemStorage<BroadcastState>>;

/// What a message means to a session which is waiting for broadcast content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intercepted {
    Cancel,
    Content,
}

impl BroadcastState {
    /// Claims every message while awaiting content, so no other handler may consume it.
    /// `bot_name` is the bot's own username, the only one accepted in `/cancel@<bot_name>`.
    pub fn intercept(&self, msg_text: Option<&str>, bot_name: &str) -> Option<Intercepted> {
        match self {
            BroadcastState::Idle => None,
            BroadcastState::AwaitingContent if is_cancel_token(msg_text, bot_name) => Some(Intercepted::Cancel),
            BroadcastState::AwaitingContent => Some(Intercepted::Content),
        }
    }
}

fn is_cancel_token(msg_text: Option<&str>, bot_name: &str) -> bool {
    msg_text
        .map(str::trim)
        .and_then(|text| text.strip_prefix(CANCEL_TOKEN))
        .map(|rest| match rest.strip_prefix('@') {
            Some(addressee) => addressee.eq_ignore_ascii_case(bot_name),
            None => rest.is_empty(),
        })
        .unwrap_or(false)
}

pub fn intercept(state: BroadcastState, msg: Message, me: Me) -> Option<Intercepted> {
    state.intercept(msg.text(), me.username())
}

pub async fn cmd_handler(bot: Bot, msg: Message, cmd: AdminCommands, repos: repo::Repositories) -> HandlerResult {
    match cmd {
        AdminCommands::Admin => {
            metrics::CMD_ADMIN_COUNTER.inc();
            let lang_code = LanguageCode::from_maybe_user(msg.from.as_ref()).locale();
            let count = repos.users.count().await?;
            let text = t!("commands.admin.panel", locale = &lang_code, count = count);

            let mut request = reply_html(bot, &msg, text);
            request.reply_markup = Some(ReplyMarkup::InlineKeyboard(panel_keyboard(&lang_code)));
            request.await?;
        }
        AdminCommands::Cancel => log::debug!("nothing to cancel for {}", msg.chat.id),
    }
    Ok(())
}

fn panel_keyboard(lang_code: &str) -> InlineKeyboardMarkup {
    let button = |title_key: &str, data: AdminCallbackData| InlineKeyboardButton::callback(
        t!(title_key, locale = lang_code), data.to_data_string());
    InlineKeyboardMarkup::new([
        [button("commands.admin.buttons.broadcast", AdminCallbackData::Broadcast)],
        [button("commands.admin.buttons.close", AdminCallbackData::Close)],
    ])
}

#[inline]
pub fn callback_filter(query: CallbackQuery) -> bool {
    AdminCallbackData::check_prefix(query)
}

pub async fn callback_handler(bot: Bot, query: CallbackQuery, config: AppConfig,
                              storage: Arc<InMemStorage<BroadcastState>>) -> HandlerResult {
    if !checks::is_admin_user(&config.admins, Some(&query.from)) {
        bot.answer_callback_query(query.id).await?;
        return Ok(())
    }

    let data = AdminCallbackData::parse(&query)?;
    let admin_chat_id = ChatId::from(query.from.id);
    let dialogue = BroadcastDialogue::new(storage, admin_chat_id);
    let lang_code = LanguageCode::from_user(&query.from).locale();

    match data {
        AdminCallbackData::Broadcast => {
            // the admin must see the prompt before their next message turns into a broadcast
            bot.send_message(admin_chat_id, t!("commands.admin.broadcast.prompt", locale = &lang_code)).await?;
            dialogue.update(BroadcastState::AwaitingContent).await?;
        }
        AdminCallbackData::Close => {
            dialogue.exit().await?;
            if let Some(message) = query.message.as_ref() {
                let (chat_id, message_id) = (message.chat().id, message.id());
                let unable_to_delete_message = bot.delete_message(chat_id, message_id).await
                    .inspect_err(|e| log::error!("Unable to delete the admin panel: {e}"))
                    .is_err();
                if unable_to_delete_message {
                    bot.edit_message_text(chat_id, message_id, t!("commands.admin.closed", locale = &lang_code)).await?;
                }
            }
        }
    }

    bot.answer_callback_query(query.id).await?;
    Ok(())
}

pub async fn intercepted_handler(bot: Bot, msg: Message, intercepted: Intercepted, dialogue: BroadcastDialogue,
                                 broadcaster: Broadcaster<repo::Users>) -> HandlerResult {
    let lang_code = LanguageCode::from_maybe_user(msg.from.as_ref()).locale();
    match intercepted {
        Intercepted::Cancel => {
            dialogue.exit().await?;
            metrics::BROADCAST_COUNTER.cancelled.inc();
            reply_html(bot, &msg, t!("commands.admin.broadcast.cancelled", locale = &lang_code)).await?;
        }
        Intercepted::Content => {
            let result = broadcast_impl(&bot, &msg, &broadcaster, &lang_code).await;
            dialogue.exit().await?;
            result?;
        }
    }
    Ok(())
}

async fn broadcast_impl(bot: &Bot, msg: &Message, broadcaster: &Broadcaster<repo::Users>, lang_code: &str) -> HandlerResult {
    let recipients = match broadcaster.snapshot().await {
        Ok(recipients) => recipients,
        Err(e) => {
            reply_html(bot.clone(), msg, t!("commands.admin.broadcast.failed", locale = lang_code)).await?;
            return Err(e.into())
        }
    };
    reply_html(bot.clone(), msg, t!("commands.admin.broadcast.started", locale = lang_code,
        count = recipients.len())).await?;

    let delivery = CopyMessageDelivery {
        bot: bot.clone(),
        from_chat_id: msg.chat.id,
        message_id: msg.id,
    };
    metrics::BROADCAST_COUNTER.started.inc();
    let outcome = broadcaster.broadcast(&recipients, &delivery).await;
    metrics::BROADCAST_COUNTER.finished.inc();

    reply_html(bot.clone(), msg, t!("commands.admin.broadcast.finished", locale = lang_code,
        delivered = outcome.delivered, undeliverable = outcome.undeliverable)).await?;
    Ok(())
}

/// Copies the admin's message (text or media with caption) without the "forwarded from" header.
struct CopyMessageDelivery {
    bot: Bot,
    from_chat_id: ChatId,
    message_id: MessageId,
}

#[async_trait]
impl Delivery for CopyMessageDelivery {
    async fn deliver(&self, recipient: UserId) -> DeliveryStatus {
        match self.bot.copy_message(ChatId::from(recipient), self.from_chat_id, self.message_id).await {
            Ok(_) => DeliveryStatus::Delivered,
            Err(RequestError::Api(ApiError::BotBlocked)) => {
                log::debug!("{recipient} has blocked the bot");
                DeliveryStatus::Undeliverable
            }
            Err(e) => {
                log::debug!("couldn't deliver the broadcast to {recipient}: {e}");
                DeliveryStatus::Undeliverable
            }
        }
    }
}

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AdminCallbackData {
    #[display("broadcast")]
    Broadcast,
    #[display("close")]
    Close,
}

impl CallbackDataWithPrefix for AdminCallbackData {
    fn prefix() -> &'static str {
        "admin"
    }
}

impl TryFrom<String> for AdminCallbackData {
    type Error = InvalidCallbackData;

    fn try_from(data: String) -> Result<Self, Self::Error> {
        match data.as_str() {
            "broadcast" => Ok(Self::Broadcast),
            "close" => Ok(Self::Close),
            _ => Err(InvalidCallbackDataBuilder(&data).split_err())
        }
    }
}
