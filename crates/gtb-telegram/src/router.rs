use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::info;

use gtb_core::{chat::ChatService, config::Config, ports::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub chat: Arc<ChatService>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>, chat: Arc<ChatService>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!("gtb started: @{}", me.username());
    }
    info!("serving {} authorized user(s)", cfg.authorized_user_ids.len());

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let state = Arc::new(AppState {
        cfg,
        chat,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
