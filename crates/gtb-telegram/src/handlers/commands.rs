use std::sync::Arc;

use teloxide::prelude::*;

use gtb_core::{
    chat::{Outcome, RESET_COMMAND},
    domain::{ChatId, UserId},
};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);
    let (cmd, _arg) = parse_command(text);

    match cmd.as_str() {
        "start" => {
            if let Outcome::Reply(html) = state.chat.greet(user_id, &user.first_name).await {
                let _ = state.messenger.send_html(chat_id, &html).await;
            }
        }

        RESET_COMMAND => {
            let username = user.username.as_deref();
            if let Outcome::Reply(reply) = state.chat.reset(user_id, username).await {
                let _ = state.messenger.send_text(chat_id, &reply).await;
            }
        }

        // Only the two commands above are registered; everything else falls
        // through to silence, matching the free-text handler's command filter.
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_command() {
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
    }

    #[test]
    fn strips_botname_suffix() {
        let (cmd, arg) = parse_command("/yenisohbet@gtb_bot");
        assert_eq!(cmd, "yenisohbet");
        assert_eq!(arg, "");
    }

    #[test]
    fn lowercases_and_keeps_args() {
        let (cmd, arg) = parse_command("/Start  hello there");
        assert_eq!(cmd, "start");
        assert_eq!(arg, "hello there");
    }
}
