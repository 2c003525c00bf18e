//! Intervals.icu target client: per-date wellness upsert.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};

use crate::config::AuthMode;
use crate::{SyncError, body_snippet};

#[derive(Clone, Debug)]
pub struct IntervalsClient {
    base_url: String,
    athlete_id: String,
    api_token: SecretString,
    wellness_path: String,
    auth_mode: AuthMode,
    client: reqwest::Client,
}

impl IntervalsClient {
    pub fn new(
        base_url: &str,
        athlete_id: impl Into<String>,
        api_token: SecretString,
        wellness_path: impl Into<String>,
        auth_mode: AuthMode,
    ) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            athlete_id: athlete_id.into(),
            api_token,
            wellness_path: wellness_path.into(),
            auth_mode,
            client,
        }
    }

    /// Substitute `{athlete_id}` and `{date}` into the configured path
    /// template.
    fn wellness_url(&self, date: &str) -> String {
        let mut path = self
            .wellness_path
            .replace("{athlete_id}", &self.athlete_id)
            .replace("{date}", date);
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        format!("{}{}", self.base_url, path)
    }

    /// Idempotent full-replace upsert of the wellness record for `date`.
    /// Non-2xx carries the response status and body; an empty success body
    /// maps to `{"status": "ok"}`.
    pub async fn publish_wellness(
        &self,
        payload: &Map<String, Value>,
        date: &str,
    ) -> Result<Value, SyncError> {
        let url = self.wellness_url(date);
        let request = self.client.put(&url).json(payload);
        let request = match self.auth_mode {
            AuthMode::Basic => request.basic_auth("API_KEY", Some(self.api_token.expose_secret())),
            AuthMode::Bearer => request.bearer_auth(self.api_token.expose_secret()),
        };
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::TargetApi {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }
        let body = resp.text().await?;
        if body.is_empty() {
            return Ok(json!({"status": "ok"}));
        }
        Ok(serde_json::from_str(&body)?)
    }
}
