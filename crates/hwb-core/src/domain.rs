use serde::Deserialize;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// One tracked submission as reported by the status API.
///
/// Both fields stay optional so the extractor can report exactly which
/// required key is absent instead of serde rejecting the whole record.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Homework {
    pub homework_name: Option<String>,
    pub status: Option<String>,
}

/// A validated poll payload.
#[derive(Clone, Debug)]
pub struct StatusPage {
    pub homeworks: Vec<Homework>,
    pub current_date: i64,
}
