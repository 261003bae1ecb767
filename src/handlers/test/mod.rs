
use std::sync::{Arc, Mutex};
use axum::extract::State;
use axum::http::Uri;
use axum::Json;
use reqwest::Url;
use serde_json::{json, Value};
use teloxide::Bot;
use teloxide::types::{CallbackQuery, Me, Update, UserId};
use crate::config::AppConfig;

pub const ADMIN_ID: u64 = 100;
pub const USER_ID: u64 = 200;
pub const BOT_NAME: &str = "film_finder_bot";
pub const SEARCH_METHOD: &str = "search-by-keyword";
const BOT_ID: u64 = 999;
const TOKEN: &str = "1:test";

/// A local HTTP server which plays both the Bot API and the film search API and remembers every called method.
#[derive(Clone, Default)]
pub struct FakeApi {
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    pub async fn start() -> (Self, Url) {
        let api = Self::default();
        let app = axum::Router::new()
            .fallback(answer)
            .with_state(api.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await
            .expect("couldn't bind the fake API server");
        let addr = listener.local_addr()
            .expect("the fake API server has no local address");
        tokio::spawn(async move { axum::serve(listener, app).await });
        let url = Url::parse(&format!("http://{addr}/"))
            .expect("invalid URL of the fake API server");
        (api, url)
    }

    /// Method names in lowercase, in the order of calls.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter()
            .filter(|m| m.as_str() == method)
            .count()
    }
}

async fn answer(State(api): State<FakeApi>, uri: Uri) -> Json<Value> {
    let method = uri.path()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    api.calls.lock().unwrap().push(method.clone());
    Json(match method.as_str() {
        SEARCH_METHOD => json!({"keyword": "", "pagesCount": 0, "films": []}),
        "copymessage" => json!({"ok": true, "result": {"message_id": 1000}}),
        "answercallbackquery" | "deletemessage" => json!({"ok": true, "result": true}),
        _ => json!({"ok": true, "result": message_json(ADMIN_ID, bot_user_json(), "ok")}),
    })
}

pub fn bot(api_url: Url) -> Bot {
    Bot::new(TOKEN).set_api_url(api_url)
}

pub fn app_config() -> AppConfig {
    AppConfig {
        admins: [UserId(ADMIN_ID)].into_iter().collect(),
        web_app_url: Url::parse("https://player.example.org/").unwrap(),
    }
}

pub fn me() -> Me {
    let mut me = bot_user_json();
    let fields = me.as_object_mut().unwrap();
    for flag in ["can_join_groups", "can_read_all_group_messages", "supports_inline_queries",
                 "can_connect_to_business", "has_main_web_app"] {
        fields.insert(flag.to_owned(), Value::Bool(false));
    }
    serde_json::from_value(me).expect("invalid Me")
}

/// A text message sent by the user to the bot in their private chat.
pub fn private_text_update(uid: u64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": message_json(uid, user_json(uid), text),
    })).expect("invalid message update")
}

pub fn callback_query(uid: u64, data: &str) -> CallbackQuery {
    serde_json::from_value(json!({
        "id": "4382bfdwdsb323b2d9",
        "from": user_json(uid),
        "chat_instance": "-1234567890",
        "data": data,
    })).expect("invalid callback query")
}

fn user_json(uid: u64) -> Value {
    json!({
        "id": uid,
        "is_bot": false,
        "first_name": "Test",
        "language_code": "en",
    })
}

fn bot_user_json() -> Value {
    json!({
        "id": BOT_ID,
        "is_bot": true,
        "first_name": "Film Finder",
        "username": BOT_NAME,
    })
}

fn message_json(chat_id: u64, from: Value, text: &str) -> Value {
    json!({
        "message_id": 10,
        "date": 1700000000,
        "chat": {
            "id": chat_id,
            "type": "private",
            "first_name": "Test",
        },
        "from": from,
        "text": text,
    })
}
