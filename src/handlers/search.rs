use reqwest::Url;
use rust_i18n::t;
use teloxide::Bot;
use teloxide::requests::Requester;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, WebAppInfo};
use teloxide::types::ParseMode::Html;
use teloxide::utils::html;
use crate::config::AppConfig;
use crate::domain::{FilmMatch, LanguageCode};
use crate::handlers::{HandlerResult, register_user, reply_html};
use crate::resolver::ContentResolver;
use crate::{metrics, repo};

/// Any non-empty text which is not a command is a title to search for.
pub fn is_search_query(msg: Message) -> bool {
    msg.text()
        .map(is_search_text)
        .unwrap_or(false)
}

fn is_search_text(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && !text.starts_with('/')
}

pub async fn search_handler(bot: Bot, msg: Message, repos: repo::Repositories,
                            resolver: ContentResolver, config: AppConfig) -> HandlerResult {
    metrics::SEARCH_COUNTER.invoked();

    let query = msg.text().ok_or("no text in the search query")?.trim();
    if let Some(user) = msg.from.as_ref() {
        register_user(&repos.users, user).await;
    }
    let lang_code = LanguageCode::from_maybe_user(msg.from.as_ref()).locale();

    let placeholder = reply_html(bot.clone(), &msg, t!("commands.search.in_progress", locale = &lang_code)).await?;

    let maybe_film = resolver.resolve(query).await;
    if maybe_film.is_some() {
        metrics::SEARCH_COUNTER.finished();
    }
    let (text, keyboard) = render_search_result(maybe_film.as_ref(), &config.web_app_url, &lang_code);

    let mut edit_req = bot.edit_message_text(placeholder.chat.id, placeholder.id, text);
    edit_req.parse_mode.replace(Html);
    edit_req.reply_markup = keyboard;
    edit_req.await?;
    Ok(())
}

fn render_search_result(maybe_film: Option<&FilmMatch>, web_app_url: &Url, lang_code: &str) -> (String, Option<InlineKeyboardMarkup>) {
    match maybe_film {
        Some(film) => {
            let text = t!("commands.search.found", locale = lang_code,
                title = html::escape(&film.title), year = html::escape(&film.year));
            let button = InlineKeyboardButton::web_app(
                t!("commands.search.button", locale = lang_code),
                WebAppInfo { url: film.play_url(web_app_url) });
            (text, Some(InlineKeyboardMarkup::new([[button]])))
        }
        None => (t!("commands.search.not_found", locale = lang_code), None)
    }
}
