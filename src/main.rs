mod domain;
mod handlers;
mod repo;
mod metrics;
mod config;
mod commands;
mod resolver;

use std::env::VarError;
use std::net::SocketAddr;
use futures::future::join_all;
use reqwest::Url;
use rust_i18n::i18n;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::dptree::deps;
use teloxide::update_listeners::webhooks::{axum_to_router, Options};
use teloxide::update_listeners::UpdateListener;
use crate::handlers::{admin, checks, search, AdminCommands, BroadcastState, HandlerError, HelpCommands, StartCommands};
use crate::handlers::utils::broadcaster::Broadcaster;

const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";

i18n!(fallback = "en");    // load localizations with default parameters

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv()?;

    pretty_env_logger::init();

    let app_config = config::AppConfig::from_env()?;
    let database_config = config::DatabaseConfig::from_env()?;
    let resolver_config = config::ResolverConfig::from_env()?;
    let db_conn = repo::establish_database_connection(&database_config).await?;

    let bot = Bot::from_env();
    bot.delete_webhook().await?;

    let set_my_commands_requests = _rust_i18n_available_locales()
        .into_iter()
        .map(|locale| commands::set_my_commands(&bot, locale, &app_config.admins));
    let set_my_commands_failed = join_all(set_my_commands_requests)
        .await
        .into_iter()
        .any(|res| res.is_err());
    if set_my_commands_failed {
        Err("couldn't set the bot's commands")?
    }

    let repos = repo::Repositories::new(&db_conn);
    let resolver = resolver::ContentResolver::new(resolver_config)?;
    let broadcaster = Broadcaster::new(repos.users.clone());

    let webhook_url: Option<Url> = match std::env::var(ENV_WEBHOOK_URL) {
        Ok(env_url) if !env_url.is_empty() => Some(env_url.parse()?),
        Ok(env_url) if env_url.is_empty() => None,
        Err(VarError::NotPresent) => None,
        _ => Err("invalid webhook URL!")?
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let metrics_router = metrics::init();

    let ignore_unknown_updates = |_| Box::pin(async {});
    let deps = deps![
        repos,
        app_config,
        resolver,
        broadcaster,
        InMemStorage::<BroadcastState>::new()
    ];

    match webhook_url {
        Some(url) => {
            log::info!("Setting a webhook: {url}");

            let (mut listener, stop_flag, bot_router) = axum_to_router(bot.clone(), Options::new(addr, url)).await?;
            let stop_token = listener.stop_token();

            let error_handler = LoggingErrorHandler::with_custom_text("An error from the update listener");
            let mut dispatcher = Dispatcher::builder(bot, schema())
                .default_handler(ignore_unknown_updates)
                .dependencies(deps)
                .build();
            let bot_fut = dispatcher.dispatch_with_listener(listener, error_handler);

            let srv = tokio::spawn(async move {
                let tcp_listener = tokio::net::TcpListener::bind(addr)
                    .await
                    .inspect_err(|_| stop_token.stop())?;
                let app = axum::Router::new()
                    .merge(metrics_router)
                    .merge(bot_router);
                axum::serve(tcp_listener, app)
                    .with_graceful_shutdown(stop_flag)
                    .await
            });

            let (res, _) = futures::join!(srv, bot_fut);
            res
        }
        None => {
            log::info!("The polling dispatcher is activating...");

            let bot_fut = tokio::spawn(async move {
                Dispatcher::builder(bot, schema())
                    .default_handler(ignore_unknown_updates)
                    .dependencies(deps)
                    .enable_ctrlc_handler()
                    .build()
                    .dispatch()
                    .await
            });

            let srv = tokio::spawn(async move {
                let tcp_listener = tokio::net::TcpListener::bind(addr).await?;
                axum::serve(tcp_listener, metrics_router)
                    .with_graceful_shutdown(async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            log::error!("failed to install CTRL+C signal handler: {e}");
                        }
                        log::info!("Shutdown of the metrics server")
                    })
                    .await
            });

            let (res, _) = futures::join!(srv, bot_fut);
            res
        }
    }?.map_err(Into::into)
}

fn schema() -> UpdateHandler<HandlerError> {
    // The interception branch goes first: while a broadcast is awaited, it consumes every message of the admin.
    dptree::entry()
        .branch(Update::filter_message().filter(checks::is_private_chat).enter_dialogue::<Message, InMemStorage<BroadcastState>, BroadcastState>()
            .branch(dptree::filter_map(admin::intercept).endpoint(admin::intercepted_handler))
            .branch(dptree::entry().filter_command::<StartCommands>().endpoint(handlers::start_cmd_handler))
            .branch(dptree::entry().filter_command::<HelpCommands>().endpoint(handlers::help_cmd_handler))
            .branch(dptree::entry().filter_command::<AdminCommands>().filter(checks::is_admin).endpoint(admin::cmd_handler))
            .branch(dptree::filter(search::is_search_query).endpoint(search::search_handler)))
        .branch(Update::filter_callback_query().filter(admin::callback_filter).endpoint(admin::callback_handler))
}
