use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    config::Config,
    domain::{ChatId, UserId},
    formatting::escape_html,
    history::ConversationStore,
    ports::{ChatAction, ChatModel, MessagingPort},
    security::is_authorized,
};

/// Reset command name, without the leading slash.
pub const RESET_COMMAND: &str = "yenisohbet";

const RESET_DONE_TEXT: &str =
    "Anlaşıldı. Önceki sohbetimizi unuttum. Yeni bir başlangıç yapabiliriz.";
const RESET_NOTHING_TEXT: &str = "Zaten aramızda kayıtlı bir sohbet geçmişi bulunmuyor.";

/// Fixed user-facing apology. Internal failure detail goes to the log only.
pub const RELAY_FAILED_TEXT: &str = "Üzgünüm, bir sorunla karşılaştım. Lütfen daha sonra \
     tekrar deneyin veya sorun devam ederse /yenisohbet komutu ile hafızayı temizleyin.";

/// Outcome of a handled update.
///
/// `Denied` and `Ignored` must stay silent: unauthorized probers get no
/// feedback at all (deliberate — the bot does not reveal its presence), and
/// empty messages are dropped without a remote call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Denied,
    Ignored,
    Reply(String),
}

/// Application service for the three entry points: greet, reset, free-text
/// relay. The authorization gate is the explicit first statement of each.
pub struct ChatService {
    cfg: Arc<Config>,
    store: ConversationStore,
    model: Arc<dyn ChatModel>,
}

impl ChatService {
    pub fn new(cfg: Arc<Config>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            cfg,
            store: ConversationStore::new(),
            model,
        }
    }

    fn gate(&self, user: UserId) -> bool {
        if is_authorized(Some(user), &self.cfg.authorized_user_ids) {
            return true;
        }
        warn!("unauthorized access attempt: user id {}", user.0);
        false
    }

    /// `/start`: welcome reply naming the sender. No state mutation.
    pub async fn greet(&self, user: UserId, first_name: &str) -> Outcome {
        if !self.gate(user) {
            return Outcome::Denied;
        }

        Outcome::Reply(format!(
            "Merhaba {}!\n\nBen Gemini tarafından desteklenen bir yapay zeka asistanıyım. \
             Benimle sohbet etmeye başlayabilirsin.\n\n\
             Geçmiş sohbetimizi unutmamı istersen <b>/{RESET_COMMAND}</b> komutunu kullanabilirsin.",
            escape_html(first_name)
        ))
    }

    /// `/yenisohbet`: drop the stored history, if any. Idempotent.
    pub async fn reset(&self, user: UserId, username: Option<&str>) -> Outcome {
        if !self.gate(user) {
            return Outcome::Denied;
        }

        if self.store.clear(user).await {
            info!(
                "user {} ({}) reset their conversation history",
                user.0,
                username.unwrap_or("unknown")
            );
            Outcome::Reply(RESET_DONE_TEXT.to_string())
        } else {
            Outcome::Reply(RESET_NOTHING_TEXT.to_string())
        }
    }

    /// Free text: forward history + message to the model and store the
    /// updated sequence it returns. On failure the stored history is left
    /// exactly as it was and the sender gets the fixed apology.
    pub async fn relay(
        &self,
        chat_id: ChatId,
        user: UserId,
        text: &str,
        messenger: &dyn MessagingPort,
    ) -> Outcome {
        if !self.gate(user) {
            return Outcome::Denied;
        }
        if text.trim().is_empty() {
            return Outcome::Ignored;
        }

        // Best-effort typing indicator while the remote call is in flight.
        if let Err(e) = messenger.send_chat_action(chat_id, ChatAction::Typing).await {
            warn!("typing indicator failed for chat {}: {e}", chat_id.0);
        }

        let history = self.store.snapshot(user).await;
        match self.model.send_message(&history, text).await {
            Ok(exchange) => {
                self.store.replace(user, exchange.history).await;
                Outcome::Reply(exchange.reply)
            }
            Err(e) => {
                error!("model call failed for user {}: {e}", user.0);
                Outcome::Reply(RELAY_FAILED_TEXT.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{MessageId, MessageRef, Turn},
        ports::{ChatExchange, MessagingCapabilities},
        Error, Result,
    };

    struct MockModel {
        calls: AtomicUsize,
        fail: bool,
        reply: String,
    }

    impl MockModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
                reply: reply.to_string(),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
                reply: String::new(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for MockModel {
        async fn send_message(&self, history: &[Turn], text: &str) -> Result<ChatExchange> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::External("remote model unavailable".to_string()));
            }
            let mut updated = history.to_vec();
            updated.push(Turn::user(text));
            updated.push(Turn::model(&self.reply));
            Ok(ChatExchange {
                reply: self.reply.clone(),
                history: updated,
            })
        }
    }

    struct FakeMessenger {
        typing_actions: AtomicUsize,
    }

    impl FakeMessenger {
        fn new() -> Self {
            Self {
                typing_actions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_html: true,
                supports_chat_actions: true,
                max_message_len: 4096,
            }
        }

        async fn send_text(&self, chat_id: ChatId, _text: &str) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn send_html(&self, chat_id: ChatId, _html: &str) -> Result<MessageRef> {
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(1),
            })
        }

        async fn send_chat_action(&self, _chat_id: ChatId, _action: ChatAction) -> Result<()> {
            self.typing_actions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_config(allowed: Vec<i64>) -> Arc<Config> {
        Arc::new(Config {
            telegram_token: "test-token".to_string(),
            gemini_api_key: "test-key".to_string(),
            authorized_user_ids: allowed,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_timeout: Duration::from_secs(5),
            keep_alive_port: 0,
        })
    }

    const CHAT: ChatId = ChatId(111);
    const AUTHORIZED: UserId = UserId(111);
    const STRANGER: UserId = UserId(999);

    #[tokio::test]
    async fn unauthorized_sender_is_silently_denied_everywhere() {
        let model = MockModel::replying("hi");
        let svc = ChatService::new(test_config(vec![111]), model.clone());
        let messenger = FakeMessenger::new();

        assert_eq!(svc.greet(STRANGER, "Mallory").await, Outcome::Denied);
        assert_eq!(svc.reset(STRANGER, None).await, Outcome::Denied);
        assert_eq!(
            svc.relay(ChatId(999), STRANGER, "hello", &messenger).await,
            Outcome::Denied
        );

        assert_eq!(model.calls(), 0);
        assert_eq!(messenger.typing_actions.load(Ordering::SeqCst), 0);
        assert!(!svc.store.has_history(STRANGER).await);
    }

    #[tokio::test]
    async fn empty_text_is_ignored_without_model_call() {
        let model = MockModel::replying("hi");
        let svc = ChatService::new(test_config(vec![111]), model.clone());
        let messenger = FakeMessenger::new();

        assert_eq!(
            svc.relay(CHAT, AUTHORIZED, "", &messenger).await,
            Outcome::Ignored
        );
        assert_eq!(
            svc.relay(CHAT, AUTHORIZED, "  \n ", &messenger).await,
            Outcome::Ignored
        );

        assert_eq!(model.calls(), 0);
        assert_eq!(messenger.typing_actions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_relay_stores_the_returned_two_turn_history() {
        let model = MockModel::replying("hi");
        let svc = ChatService::new(test_config(vec![111]), model.clone());
        let messenger = FakeMessenger::new();

        let outcome = svc.relay(CHAT, AUTHORIZED, "hello", &messenger).await;
        assert_eq!(outcome, Outcome::Reply("hi".to_string()));

        assert_eq!(
            svc.store.snapshot(AUTHORIZED).await,
            vec![Turn::user("hello"), Turn::model("hi")]
        );
        assert_eq!(model.calls(), 1);
        assert_eq!(messenger.typing_actions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn relay_extends_existing_history() {
        let model = MockModel::replying("again");
        let svc = ChatService::new(test_config(vec![111]), model.clone());
        let messenger = FakeMessenger::new();

        svc.relay(CHAT, AUTHORIZED, "first", &messenger).await;
        svc.relay(CHAT, AUTHORIZED, "second", &messenger).await;

        let stored = svc.store.snapshot(AUTHORIZED).await;
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[2], Turn::user("second"));
    }

    #[tokio::test]
    async fn failed_relay_leaves_history_untouched_and_apologizes() {
        let svc = ChatService::new(test_config(vec![111]), MockModel::failing());
        let messenger = FakeMessenger::new();

        let before = vec![Turn::user("hello"), Turn::model("hi")];
        svc.store.replace(AUTHORIZED, before.clone()).await;

        let outcome = svc.relay(CHAT, AUTHORIZED, "are you there?", &messenger).await;
        assert_eq!(outcome, Outcome::Reply(RELAY_FAILED_TEXT.to_string()));
        assert_eq!(svc.store.snapshot(AUTHORIZED).await, before);
    }

    #[tokio::test]
    async fn failed_first_relay_creates_no_history() {
        let svc = ChatService::new(test_config(vec![111]), MockModel::failing());
        let messenger = FakeMessenger::new();

        svc.relay(CHAT, AUTHORIZED, "hello", &messenger).await;
        assert!(!svc.store.has_history(AUTHORIZED).await);
    }

    #[tokio::test]
    async fn reset_is_idempotent_after_first_clear() {
        let model = MockModel::replying("hi");
        let svc = ChatService::new(test_config(vec![111]), model);
        let messenger = FakeMessenger::new();

        svc.relay(CHAT, AUTHORIZED, "hello", &messenger).await;
        assert!(svc.store.has_history(AUTHORIZED).await);

        assert_eq!(
            svc.reset(AUTHORIZED, Some("alice")).await,
            Outcome::Reply(RESET_DONE_TEXT.to_string())
        );
        assert_eq!(
            svc.reset(AUTHORIZED, Some("alice")).await,
            Outcome::Reply(RESET_NOTHING_TEXT.to_string())
        );
        assert!(!svc.store.has_history(AUTHORIZED).await);
    }

    #[tokio::test]
    async fn reset_without_history_reports_nothing_and_creates_no_entry() {
        let svc = ChatService::new(test_config(vec![111]), MockModel::replying("hi"));

        assert_eq!(
            svc.reset(AUTHORIZED, None).await,
            Outcome::Reply(RESET_NOTHING_TEXT.to_string())
        );
        assert!(!svc.store.has_history(AUTHORIZED).await);
    }

    #[tokio::test]
    async fn greet_names_sender_and_mentions_reset_command() {
        let svc = ChatService::new(test_config(vec![111]), MockModel::replying("hi"));

        let Outcome::Reply(html) = svc.greet(AUTHORIZED, "Ayşe").await else {
            panic!("expected a reply");
        };
        assert!(html.contains("Merhaba Ayşe!"));
        assert!(html.contains("/yenisohbet"));
    }

    #[tokio::test]
    async fn greet_escapes_html_in_names() {
        let svc = ChatService::new(test_config(vec![111]), MockModel::replying("hi"));

        let Outcome::Reply(html) = svc.greet(AUTHORIZED, "<Ayşe>").await else {
            panic!("expected a reply");
        };
        assert!(html.contains("Merhaba &lt;Ayşe&gt;!"));
    }
}
