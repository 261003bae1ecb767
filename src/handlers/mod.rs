mod help;
mod start;
pub mod utils;
pub mod admin;
pub mod search;

#[cfg(test)]
mod test;

use teloxide::Bot;
use teloxide::payloads::SendMessage;
use teloxide::requests::{JsonRequest, Requester};
use teloxide::types::{Message, ReplyParameters, User};
use teloxide::types::ParseMode::Html;

pub use help::*;
pub use start::*;
pub use admin::{AdminCommands, BroadcastState};
use crate::repo;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

pub fn reply_html<T: Into<String>>(bot: Bot, msg: &Message, answer: T) -> JsonRequest<SendMessage> {
    let mut answer = bot.send_message(msg.chat.id, answer);
    answer.parse_mode = Some(Html);
    if msg.chat.is_group() || msg.chat.is_supergroup() {
        answer.reply_parameters.replace(ReplyParameters::new(msg.id));
    }
    answer
}

/// Makes the user a recipient of future broadcasts. Failures are only logged.
pub(crate) async fn register_user(users: &repo::Users, user: &User) {
    if let Err(e) = users.record(user.id).await {
        log::error!("couldn't register the user {}: {e}", user.id);
    }
}

pub mod checks {
    use teloxide::types::{Message, User};
    use crate::config::{AdminIds, AppConfig};

    pub fn is_private_chat(msg: Message) -> bool {
        msg.chat.is_private()
    }

    pub fn is_admin(msg: Message, config: AppConfig) -> bool {
        is_admin_user(&config.admins, msg.from.as_ref())
    }

    pub(crate) fn is_admin_user(admins: &AdminIds, maybe_user: Option<&User>) -> bool {
        match maybe_user {
            Some(user) if admins.contains(user.id) => true,
            Some(user) => {
                log::debug!("{} is not an admin, ignoring", user.id);
                false
            }
            None => false
        }
    }

    #[cfg(test)]
    mod test {
        use teloxide::types::{User, UserId};
        use crate::config::AdminIds;
        use super::is_admin_user;

        fn user(id: u64) -> User {
            User {
                id: UserId(id),
                is_bot: false,
                first_name: "Test".to_owned(),
                last_name: None,
                username: None,
                language_code: None,
                is_premium: false,
                added_to_attachment_menu: false,
            }
        }

        #[test]
        fn authorization_gate() {
            let admins: AdminIds = [UserId(1), UserId(2)].into_iter().collect();
            assert!(is_admin_user(&admins, Some(&user(1))));
            assert!(is_admin_user(&admins, Some(&user(2))));
            assert!(!is_admin_user(&admins, Some(&user(3))));
            assert!(!is_admin_user(&admins, None));
            assert!(!is_admin_user(&AdminIds::default(), Some(&user(1))));
        }
    }
}
