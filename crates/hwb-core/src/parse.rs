//! Shape checking and message extraction for the status API payload.
//!
//! The API adapter returns the decoded body untouched; everything about the
//! documented response shape is enforced here so HTTP-level and payload-level
//! failures share one recovery policy in the poll loop.

use serde_json::Value;

use crate::{
    domain::{Homework, StatusPage},
    verdicts::verdict_for,
    Error, Result,
};

/// Check a decoded payload against the documented response shape.
///
/// Key-presence checks run before type checks so a payload that is wrong in
/// several ways is always reported the same way.
pub fn validate_response(payload: &Value) -> Result<StatusPage> {
    let object = payload
        .as_object()
        .ok_or_else(|| Error::MalformedResponse("top-level value is not an object".to_string()))?;

    let homeworks = object
        .get("homeworks")
        .ok_or(Error::MissingField("homeworks"))?;
    let current_date = object
        .get("current_date")
        .ok_or(Error::MissingField("current_date"))?;

    let homeworks = homeworks
        .as_array()
        .ok_or_else(|| Error::MalformedResponse("homeworks is not an array".to_string()))?;
    let current_date = current_date
        .as_i64()
        .ok_or_else(|| Error::MalformedResponse("current_date is not an integer".to_string()))?;

    let homeworks = homeworks
        .iter()
        .map(|record| {
            serde_json::from_value::<Homework>(record.clone()).map_err(|e| {
                Error::MalformedResponse(format!("homework record has unexpected shape: {e}"))
            })
        })
        .collect::<Result<Vec<Homework>>>()?;

    Ok(StatusPage {
        homeworks,
        current_date,
    })
}

/// Turn one homework record into the notification line.
///
/// The template is a fixed contract with two interpolation points; keep the
/// wording and punctuation intact.
pub fn describe_homework(homework: &Homework) -> Result<String> {
    let status = homework
        .status
        .as_deref()
        .ok_or(Error::MissingField("status"))?;
    let name = homework
        .homework_name
        .as_deref()
        .ok_or(Error::MissingField("homework_name"))?;
    let verdict = verdict_for(status).ok_or_else(|| Error::UnknownStatus(status.to_string()))?;

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {verdict}"
    ))
}
