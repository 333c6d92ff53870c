use std::sync::Arc;

use tracing::error;

use gtb_core::{chat::ChatService, config::Config};
use gtb_gemini::GeminiClient;

mod keep_alive;

#[tokio::main]
async fn main() -> Result<(), gtb_core::Error> {
    gtb_core::logging::init("gtb")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("configuration error: {e}");
            return Err(e);
        }
    };

    let model = match GeminiClient::new(
        cfg.gemini_api_key.clone(),
        cfg.gemini_model.clone(),
        cfg.gemini_timeout,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("gemini client setup failed: {e}");
            return Err(e);
        }
    };

    let chat = Arc::new(ChatService::new(cfg.clone(), model));

    // Hosting-platform liveness probe; independent of bot logic.
    keep_alive::spawn(cfg.keep_alive_port);

    gtb_telegram::router::run_polling(cfg, chat)
        .await
        .map_err(|e| gtb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
