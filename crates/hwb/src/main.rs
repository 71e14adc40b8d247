use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use hwb_core::{config::Config, poller::Poller};
use hwb_practicum::PracticumClient;
use hwb_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> Result<(), hwb_core::Error> {
    hwb_core::logging::init("hwb");

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(err) => {
            tracing::error!("startup aborted: {err}");
            std::process::exit(1);
        }
    };

    let api = Arc::new(PracticumClient::new(
        cfg.practicum_token.clone(),
        cfg.request_timeout,
    )?);
    let messenger = Arc::new(TelegramMessenger::from_token(&cfg.telegram_token));

    // Changes from before the process started are not interesting.
    let started_at = chrono::Utc::now().timestamp();
    let poller = Poller::new(cfg, api, messenger, started_at);

    // The token is never cancelled; the loop runs until the process is killed.
    poller.run(CancellationToken::new()).await;

    Ok(())
}
