//! Status API adapter (reqwest).
//!
//! This crate implements the `hwb-core` HomeworkApi port over the Practicum
//! homework status HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use hwb_core::{ports::HomeworkApi, Error, Result};

/// The one endpoint this service talks to.
pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/HOMEWORK_VERDICTS/";

pub struct PracticumClient {
    http: reqwest::Client,
    token: String,
}

impl PracticumClient {
    pub fn new(token: String, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Api(format!("failed to build http client: {e}")))?;
        Ok(Self { http, token })
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token)
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    /// One GET to the status endpoint.
    ///
    /// Transport failures and non-200 answers both come back as `Error::Api`
    /// so the poll loop applies a single retry policy regardless of where the
    /// request died.
    async fn homework_statuses(&self, from_date: i64) -> Result<Value> {
        let response = self
            .http
            .get(ENDPOINT)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| Error::Api(format!("request to status endpoint failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Api(format!("status endpoint answered {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::MalformedResponse(format!("response body is not valid json: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_header_uses_the_oauth_scheme() {
        let client = PracticumClient::new("secret".to_string(), Duration::from_secs(1)).unwrap();
        assert_eq!(client.auth_header(), "OAuth secret");
    }
}
