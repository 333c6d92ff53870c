use std::sync::Arc;

use teloxide::prelude::*;

use gtb_core::{
    chat::Outcome,
    domain::{ChatId, UserId},
};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    match state
        .chat
        .relay(chat_id, user_id, text, state.messenger.as_ref())
        .await
    {
        Outcome::Reply(reply) => {
            let _ = state.messenger.send_text(chat_id, &reply).await;
        }
        Outcome::Denied | Outcome::Ignored => {}
    }

    Ok(())
}
