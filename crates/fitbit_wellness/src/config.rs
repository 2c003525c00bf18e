use secrecy::SecretString;

use crate::SyncError;
use crate::remap::FieldMap;

/// How the Intervals.icu API token is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// Basic auth with the fixed `API_KEY` username (the Intervals default).
    Basic,
    /// `Authorization: Bearer <token>` header.
    Bearer,
}

impl AuthMode {
    fn parse(raw: &str) -> Result<Self, SyncError> {
        match raw.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "bearer" => Ok(Self::Bearer),
            other => Err(SyncError::Config(format!(
                "INTERVALS_AUTH_MODE must be \"basic\" or \"bearer\", got {other:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub fitbit_client_id: String,
    pub fitbit_client_secret: SecretString,
    pub fitbit_refresh_token: SecretString,
    pub fitbit_user_id: String,
    pub intervals_api_base: String,
    pub intervals_api_token: SecretString,
    pub intervals_athlete_id: String,
    pub intervals_wellness_path: String,
    pub intervals_auth_mode: AuthMode,
    pub field_map: FieldMap,
}

impl Config {
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never have to mutate the process environment.
    /// Empty values count as missing.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, SyncError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut required = |key: &str| {
            get(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SyncError::Config(format!("{key} missing")))
        };

        let fitbit_client_id = required("FITBIT_CLIENT_ID")?;
        let fitbit_client_secret = SecretString::new(required("FITBIT_CLIENT_SECRET")?.into());
        let fitbit_refresh_token = SecretString::new(required("FITBIT_REFRESH_TOKEN")?.into());
        let intervals_api_token = SecretString::new(required("INTERVALS_API_TOKEN")?.into());
        let intervals_athlete_id = required("INTERVALS_ATHLETE_ID")?;

        let fitbit_user_id = get("FITBIT_USER_ID").unwrap_or_else(|| "-".into());
        let intervals_api_base =
            get("INTERVALS_API_BASE").unwrap_or_else(|| "https://intervals.icu".into());
        let intervals_wellness_path = get("INTERVALS_WELLNESS_PATH")
            .unwrap_or_else(|| "/api/v1/athlete/{athlete_id}/wellness/{date}".into());
        let intervals_auth_mode = match get("INTERVALS_AUTH_MODE") {
            Some(raw) => AuthMode::parse(&raw)?,
            None => AuthMode::Basic,
        };
        let field_map = match get("INTERVALS_FIELD_MAP_JSON") {
            Some(raw) if !raw.trim().is_empty() => FieldMap::from_json(raw.trim())?,
            _ => FieldMap::default(),
        };

        Ok(Self {
            fitbit_client_id,
            fitbit_client_secret,
            fitbit_refresh_token,
            fitbit_user_id,
            intervals_api_base,
            intervals_api_token,
            intervals_athlete_id,
            intervals_wellness_path,
            intervals_auth_mode,
            field_map,
        })
    }
}
