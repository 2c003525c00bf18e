//! Orchestrates one publish run: refresh the Fitbit credential, fan out the
//! per-date fetches, normalize and remap, then upsert to Intervals.icu.

use fitbit_wellness::fitbit::FITBIT_API_BASE;
use fitbit_wellness::{
    Config, CredentialStore, DailyRecord, FitbitClient, IntervalsClient, SyncError, build_payload,
    extract,
};
use secrecy::ExposeSecret;
use serde_json::{Value, json};

/// Publish one day of wellness data. Returns the Intervals.icu upsert
/// response.
pub async fn publish_daily(
    config: &Config,
    store: &dyn CredentialStore,
    date: &str,
) -> Result<Value, SyncError> {
    publish_daily_at(config, store, FITBIT_API_BASE, date).await
}

/// Same as [`publish_daily`] with an injectable Fitbit base URL, for tests
/// against a local mock server.
pub async fn publish_daily_at(
    config: &Config,
    store: &dyn CredentialStore,
    fitbit_base: &str,
    date: &str,
) -> Result<Value, SyncError> {
    let fitbit = FitbitClient::new(
        fitbit_base,
        config.fitbit_client_id.clone(),
        config.fitbit_client_secret.clone(),
        config.fitbit_refresh_token.clone(),
        config.fitbit_user_id.clone(),
    );

    let refreshed = fitbit.refresh_access_token().await?;
    if let Some(rotated) = refreshed.refresh_token.as_deref() {
        if rotated != config.fitbit_refresh_token.expose_secret() {
            store.write_rotated_token(rotated)?;
            tracing::info!("persisted rotated fitbit refresh token");
        }
    }
    let token = &refreshed.access_token;

    // The nine fetches are independent; fan out and fail fast on the first
    // hard error. Optional metrics resolve to None on 403/404.
    let (summary, sleep, heart, weight, sleep_score, spo2, hrv, readiness, respiration) = tokio::try_join!(
        fitbit.get_daily_summary(token, date),
        fitbit.get_sleep(token, date),
        fitbit.get_heart(token, date),
        fitbit.get_weight(token, date),
        fitbit.get_sleep_score(token, date),
        fitbit.get_spo2(token, date),
        fitbit.get_hrv(token, date),
        fitbit.get_readiness(token, date),
        fitbit.get_respiration(token, date),
    )?;

    tracing::debug!(payload = %summary, "fitbit daily summary");
    tracing::debug!(payload = %sleep, "fitbit sleep");
    tracing::debug!(payload = %heart, "fitbit heart");
    tracing::debug!(payload = ?weight, "fitbit weight");
    tracing::debug!(payload = ?sleep_score, "fitbit sleep score");
    tracing::debug!(payload = ?spo2, "fitbit spo2");
    tracing::debug!(payload = ?hrv, "fitbit hrv");
    tracing::debug!(payload = ?readiness, "fitbit readiness");
    tracing::debug!(payload = ?respiration, "fitbit respiration");

    let record = DailyRecord {
        date: date.to_string(),
        summary: summary.get("summary").cloned().unwrap_or_else(|| json!({})),
        rhr: extract::resting_hr(Some(&heart)),
        weight: extract::weight(weight.as_ref()),
        sleep_score: extract::sleep_score(sleep_score.as_ref()),
        avg_sleeping_hr: extract::avg_sleeping_hr(Some(&sleep)),
        spo2: extract::spo2(spo2.as_ref()),
        hrv_rmssd: extract::hrv_rmssd(hrv.as_ref()),
        readiness: extract::readiness(readiness.as_ref()),
        respiration: extract::respiration(respiration.as_ref()),
        sleep,
    };

    let payload = build_payload(&config.field_map, &record);
    tracing::info!(%date, fields = payload.len(), "publishing wellness payload");

    let intervals = IntervalsClient::new(
        &config.intervals_api_base,
        config.intervals_athlete_id.clone(),
        config.intervals_api_token.clone(),
        config.intervals_wellness_path.clone(),
        config.intervals_auth_mode,
    );
    intervals.publish_wellness(&payload, date).await
}

/// Current local date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    chrono::Local::now().date_naive().to_string()
}
