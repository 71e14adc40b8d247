use async_trait::async_trait;
use serde_json::Value;

use crate::{domain::ChatId, Result};

/// Port for the homework status API.
///
/// The adapter performs the timestamped request and decodes the body, but
/// returns it unvalidated; shape checking belongs to `parse::validate_response`.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    async fn homework_statuses(&self, from_date: i64) -> Result<Value>;
}

/// Cross-messenger port.
///
/// Telegram is the only implementation today; the shape is kept minimal so
/// other channels can fit behind the same interface.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
