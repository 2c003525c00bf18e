//! Fitbit Web API client: OAuth refresh-token exchange plus the per-date
//! metric fetches.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::{SyncError, body_snippet};

pub const FITBIT_API_BASE: &str = "https://api.fitbit.com";

/// Result of a refresh-token exchange. Fitbit may rotate the refresh token;
/// callers are expected to persist the rotated value.
#[derive(Clone, Debug)]
pub struct RefreshedToken {
    pub access_token: SecretString,
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FitbitClient {
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    user_id: String,
    client: reqwest::Client,
}

impl FitbitClient {
    /// `base_url` is injectable for tests; production callers pass
    /// [`FITBIT_API_BASE`]. `user_id` of `-` means the authenticated user.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
        user_id: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret,
            refresh_token,
            user_id: user_id.into(),
            client,
        }
    }

    /// Exchange the long-lived refresh token for a short-lived access token.
    /// Non-2xx or a response without `access_token` is fatal.
    pub async fn refresh_access_token(&self) -> Result<RefreshedToken, SyncError> {
        let url = format!("{}/oauth2/token", self.base_url);
        let form = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", self.refresh_token.expose_secret()),
        ];
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::TokenRefresh(format!(
                "status {}: {}",
                status.as_u16(),
                body_snippet(&body)
            )));
        }

        #[derive(Deserialize)]
        struct TokenPayload {
            access_token: Option<String>,
            refresh_token: Option<String>,
        }

        let payload: TokenPayload = resp.json().await?;
        let access_token = payload
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::TokenRefresh("response missing access_token".into()))?;
        Ok(RefreshedToken {
            access_token: SecretString::new(access_token.into()),
            refresh_token: payload.refresh_token,
        })
    }

    /// GET a metric endpoint where non-2xx is a hard failure.
    async fn fetch(&self, access_token: &SecretString, path: String) -> Result<Value, SyncError> {
        let resp = self.get_request(access_token, &path).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::VendorApi {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }
        Ok(resp.json().await?)
    }

    /// GET an optional metric endpoint: 403/404 means the metric is not
    /// available for this user/date and yields `None` rather than an error.
    async fn fetch_optional(
        &self,
        access_token: &SecretString,
        path: String,
    ) -> Result<Option<Value>, SyncError> {
        let resp = self.get_request(access_token, &path).send().await?;
        let status = resp.status();
        if matches!(status.as_u16(), 403 | 404) {
            tracing::debug!(%path, status = status.as_u16(), "metric not available");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::VendorApi {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }
        Ok(Some(resp.json().await?))
    }

    fn get_request(&self, access_token: &SecretString, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.get(url).bearer_auth(access_token.expose_secret())
    }

    pub async fn get_daily_summary(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Value, SyncError> {
        self.fetch(
            access_token,
            format!("/1/user/{}/activities/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_sleep(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Value, SyncError> {
        self.fetch(
            access_token,
            format!("/1.2/user/{}/sleep/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_heart(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Value, SyncError> {
        self.fetch(
            access_token,
            format!("/1/user/{}/activities/heart/date/{date}/1d.json", self.user_id),
        )
        .await
    }

    pub async fn get_weight(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Option<Value>, SyncError> {
        self.fetch_optional(
            access_token,
            format!("/1/user/{}/body/log/weight/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_sleep_score(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Option<Value>, SyncError> {
        self.fetch_optional(
            access_token,
            format!("/1.2/user/{}/sleep/score/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_spo2(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Option<Value>, SyncError> {
        self.fetch_optional(
            access_token,
            format!("/1/user/{}/spo2/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_hrv(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Option<Value>, SyncError> {
        self.fetch_optional(
            access_token,
            format!("/1/user/{}/hrv/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_readiness(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Option<Value>, SyncError> {
        self.fetch_optional(
            access_token,
            format!("/1/user/{}/readiness/date/{date}.json", self.user_id),
        )
        .await
    }

    pub async fn get_respiration(
        &self,
        access_token: &SecretString,
        date: &str,
    ) -> Result<Option<Value>, SyncError> {
        self.fetch_optional(
            access_token,
            format!("/1/user/{}/br/date/{date}.json", self.user_id),
        )
        .await
    }
}
