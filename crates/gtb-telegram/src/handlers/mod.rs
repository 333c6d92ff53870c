//! Telegram update handlers.
//!
//! Each handler is a thin adapter: it extracts sender + text from the update
//! and relays into the `gtb-core` chat service, which owns the authorization
//! gate and the history flow. Silent outcomes (denied / ignored) send
//! nothing.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;
mod text;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    // Only text updates are handled; photos, voice etc. are dropped.
    let Some(body) = msg.text() else {
        return Ok(());
    };

    if body.starts_with('/') {
        return commands::handle_command(msg, state).await;
    }

    text::handle_text(msg, state).await
}
