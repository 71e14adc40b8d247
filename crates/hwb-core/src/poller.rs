//! The poll loop: fetch, validate, extract, compare, notify, sleep.
//!
//! One task, strictly sequential cycles. Every failure inside a cycle is
//! converted into a report here; nothing escapes to terminate the loop.

use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    domain::ChatId,
    parse::{describe_homework, validate_response},
    ports::{HomeworkApi, MessagingPort},
    Result,
};

/// Mutable loop state.
///
/// Committed only at the end of a cycle that produced a new notification;
/// failed cycles leave it untouched. `last_timestamp` never moves backwards.
#[derive(Clone, Debug)]
pub struct PollState {
    pub last_timestamp: i64,
    pub last_message: Option<String>,
}

/// Outcome of one cycle, before the unconditional sleep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cycle {
    StatusChanged,
    NoNews,
}

pub struct Poller {
    cfg: Arc<Config>,
    api: Arc<dyn HomeworkApi>,
    messenger: Arc<dyn MessagingPort>,
    state: PollState,
}

impl Poller {
    pub fn new(
        cfg: Arc<Config>,
        api: Arc<dyn HomeworkApi>,
        messenger: Arc<dyn MessagingPort>,
        start_timestamp: i64,
    ) -> Self {
        Self {
            cfg,
            api,
            messenger,
            state: PollState {
                last_timestamp: start_timestamp,
                last_message: None,
            },
        }
    }

    /// Run cycles until the token is cancelled.
    ///
    /// The binary passes a token it never cancels; the loop has no exit of
    /// its own. The sleep runs after every cycle regardless of outcome.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            self.run_cycle().await;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.cfg.poll_period) => {}
            }
        }
    }

    /// One full poll-validate-extract-notify pass.
    pub async fn run_cycle(&mut self) {
        match self.check_once().await {
            Ok(Cycle::StatusChanged) => {}
            Ok(Cycle::NoNews) => tracing::info!("no new homework statuses"),
            Err(err) => {
                // Consecutive identical failures are reported every cycle on
                // purpose; only status notifications are deduplicated.
                let report = format!("Сбой в работе программы: {err}");
                tracing::error!("{report}");
                self.notify_best_effort(&report).await;
            }
        }
    }

    async fn check_once(&mut self) -> Result<Cycle> {
        let payload = self
            .api
            .homework_statuses(self.state.last_timestamp)
            .await?;
        let page = validate_response(&payload)?;

        // Only the first record is considered per cycle.
        let Some(first) = page.homeworks.first() else {
            return Ok(Cycle::NoNews);
        };
        let message = describe_homework(first)?;

        if self.state.last_message.as_deref() == Some(message.as_str()) {
            return Ok(Cycle::NoNews);
        }

        self.notify_best_effort(&message).await;
        self.state.last_message = Some(message);
        // The watermark only advances; a stale current_date never rewinds it.
        self.state.last_timestamp = self.state.last_timestamp.max(page.current_date);
        Ok(Cycle::StatusChanged)
    }

    /// Delivery loss is accepted: log the failure and move on.
    async fn notify_best_effort(&self, text: &str) {
        if let Err(err) = self.messenger.send_text(self.chat_id(), text).await {
            tracing::error!("failed to send telegram message: {err}");
        }
    }

    fn chat_id(&self) -> ChatId {
        self.cfg.telegram_chat_id
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{
        collections::VecDeque,
        sync::Mutex,
        time::Duration,
    };

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::Error;

    struct ScriptedApi {
        responses: Mutex<VecDeque<Result<Value>>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl HomeworkApi for ScriptedApi {
        async fn homework_statuses(&self, _from_date: i64) -> Result<Value> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingMessenger {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingPort for RecordingMessenger {
        async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(Error::Notify("telegram is down".to_string()));
            }
            Ok(())
        }
    }

    fn test_config() -> Arc<Config> {
        Arc::new(Config {
            practicum_token: "practicum-token".to_string(),
            telegram_token: "telegram-token".to_string(),
            telegram_chat_id: ChatId(42),
            poll_period: Duration::from_secs(600),
            request_timeout: Duration::from_secs(30),
        })
    }

    fn reviewing_page() -> Value {
        json!({
            "homeworks": [{ "homework_name": "hw1", "status": "reviewing" }],
            "current_date": 1000,
        })
    }

    const REVIEWING_MESSAGE: &str =
        "Изменился статус проверки работы \"hw1\". Работа взята на проверку ревьюером.";

    #[tokio::test]
    async fn first_status_change_sends_one_notification_and_commits_state() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(reviewing_page())]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 0);

        poller.run_cycle().await;

        assert_eq!(messenger.sent(), vec![REVIEWING_MESSAGE.to_string()]);
        assert_eq!(poller.state().last_message.as_deref(), Some(REVIEWING_MESSAGE));
        assert_eq!(poller.state().last_timestamp, 1000);
    }

    #[tokio::test]
    async fn replaying_the_same_response_sends_nothing() {
        let api = Arc::new(ScriptedApi::new(vec![
            Ok(reviewing_page()),
            Ok(reviewing_page()),
        ]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 0);

        poller.run_cycle().await;
        poller.run_cycle().await;

        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(poller.state().last_timestamp, 1000);
    }

    #[tokio::test]
    async fn empty_homework_list_is_quiet_and_keeps_state() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(
            json!({ "homeworks": [], "current_date": 1000 }),
        )]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 7);

        poller.run_cycle().await;

        assert!(messenger.sent().is_empty());
        assert_eq!(poller.state().last_timestamp, 7);
        assert!(poller.state().last_message.is_none());
    }

    #[tokio::test]
    async fn api_failure_is_reported_and_state_is_unchanged() {
        let api = Arc::new(ScriptedApi::new(vec![Err(Error::Api(
            "connection refused".to_string(),
        ))]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 7);

        poller.run_cycle().await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Сбой в работе программы:"));
        assert!(sent[0].contains("connection refused"));
        assert_eq!(poller.state().last_timestamp, 7);
        assert!(poller.state().last_message.is_none());
    }

    #[tokio::test]
    async fn unknown_status_is_reported_and_state_is_unchanged() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(json!({
            "homeworks": [{ "homework_name": "hw1", "status": "bogus" }],
            "current_date": 1000,
        }))]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 7);

        poller.run_cycle().await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("unknown homework status: bogus"));
        assert_eq!(poller.state().last_timestamp, 7);
    }

    #[tokio::test]
    async fn malformed_response_is_reported_not_fatal() {
        let api = Arc::new(ScriptedApi::new(vec![
            Ok(json!({ "current_date": 1000 })),
            Ok(reviewing_page()),
        ]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 0);

        poller.run_cycle().await;
        poller.run_cycle().await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("missing field: homeworks"));
        assert_eq!(sent[1], REVIEWING_MESSAGE);
    }

    #[tokio::test]
    async fn identical_failures_are_reported_every_cycle() {
        let api = Arc::new(ScriptedApi::new(vec![
            Err(Error::Api("boom".to_string())),
            Err(Error::Api("boom".to_string())),
        ]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 0);

        poller.run_cycle().await;
        poller.run_cycle().await;

        assert_eq!(messenger.sent().len(), 2);
    }

    #[tokio::test]
    async fn send_failure_is_swallowed_and_state_still_commits() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(reviewing_page())]));
        let messenger = Arc::new(RecordingMessenger::failing());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 0);

        poller.run_cycle().await;

        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(poller.state().last_message.as_deref(), Some(REVIEWING_MESSAGE));
        assert_eq!(poller.state().last_timestamp, 1000);
    }

    #[tokio::test]
    async fn timestamp_never_rewinds() {
        let api = Arc::new(ScriptedApi::new(vec![Ok(reviewing_page())]));
        let messenger = Arc::new(RecordingMessenger::default());
        let mut poller = Poller::new(test_config(), api, messenger.clone(), 5000);

        poller.run_cycle().await;

        // current_date 1000 is older than the watermark; the message still goes out.
        assert_eq!(messenger.sent().len(), 1);
        assert_eq!(poller.state().last_timestamp, 5000);
    }
}
