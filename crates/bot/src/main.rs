//! Lunchroom bot - conversational lunch ordering over Telegram.
//!
//! # Architecture
//!
//! - Long-polling loop against the Telegram Bot API
//! - Per-chat session state machine driving registration and ordering
//! - JSON identity/address stores and a CSV order ledger, each serialized
//!   behind a single writer lock
//! - CSV menu feed re-fetched fresh on every read

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lunchroom_bot::config::BotConfig;
use lunchroom_bot::flow;
use lunchroom_bot::menu::CsvFeed;
use lunchroom_bot::state::AppState;
use lunchroom_bot::telegram::TelegramClient;

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = BotConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lunchroom_bot=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let telegram = Arc::new(TelegramClient::new(
        config.bot_token.clone(),
        config.poll_timeout_secs,
    ));
    let menu = Arc::new(CsvFeed::new(config.menu_feed_url.clone()));

    let state = AppState::new(config, telegram.clone(), menu);

    tracing::info!("lunchroom bot polling for updates");

    tokio::select! {
        () = run_polling(&state, &telegram) => {},
        () = shutdown_signal() => {},
    }
}

/// Drive the long-polling loop until the process is asked to stop.
///
/// Updates are handled strictly in order: one inbound event is fully
/// processed (including its outbound replies) before the next is
/// dispatched.
async fn run_polling(state: &AppState, telegram: &TelegramClient) {
    let mut offset = 0i64;
    loop {
        match telegram.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(query) = &update.callback_query {
                        // Stop the client-side spinner; the real reply follows.
                        if let Err(err) = telegram.answer_callback_query(&query.id).await {
                            tracing::warn!(error = %err, "failed to answer callback query");
                        }
                    }
                    flow::handle_update(state, update).await;
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "getUpdates failed, backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping");
}
