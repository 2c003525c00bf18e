use fitbit_wellness::{AuthMode, Config, EnvFileStore, FieldMap, SyncError};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUMMARY_PATH: &str = "/1/user/-/activities/date/2024-05-01.json";
const SLEEP_PATH: &str = "/1.2/user/-/sleep/date/2024-05-01.json";
const HEART_PATH: &str = "/1/user/-/activities/heart/date/2024-05-01/1d.json";
const WEIGHT_PATH: &str = "/1/user/-/body/log/weight/date/2024-05-01.json";

const OPTIONAL_PATHS: [&str; 6] = [
    WEIGHT_PATH,
    "/1.2/user/-/sleep/score/date/2024-05-01.json",
    "/1/user/-/spo2/date/2024-05-01.json",
    "/1/user/-/hrv/date/2024-05-01.json",
    "/1/user/-/readiness/date/2024-05-01.json",
    "/1/user/-/br/date/2024-05-01.json",
];

fn config(intervals_base: &str) -> Config {
    Config {
        fitbit_client_id: "cid".into(),
        fitbit_client_secret: SecretString::new("sekrit".into()),
        fitbit_refresh_token: SecretString::new("refresh-1".into()),
        fitbit_user_id: "-".into(),
        intervals_api_base: intervals_base.to_string(),
        intervals_api_token: SecretString::new("tok".into()),
        intervals_athlete_id: "i42".into(),
        intervals_wellness_path: "/api/v1/athlete/{athlete_id}/wellness/{date}".into(),
        intervals_auth_mode: AuthMode::Basic,
        field_map: FieldMap::default(),
    }
}

/// Missing-file store: rotation writes become no-ops.
fn noop_store(dir: &tempfile::TempDir) -> EnvFileStore {
    EnvFileStore::new(dir.path().join(".env"))
}

async fn mount_get(server: &MockServer, p: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_token(server: &MockServer, refresh_token: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "acc-1",
            "refresh_token": refresh_token,
        })))
        .mount(server)
        .await;
}

async fn mount_sleep_and_heart(server: &MockServer) {
    mount_get(
        server,
        SLEEP_PATH,
        ResponseTemplate::new(200).set_body_json(json!({
            "summary": {"totalMinutesAsleep": 420},
            "sleep": [{"averageHeartRate": 58}],
        })),
    )
    .await;
    mount_get(
        server,
        HEART_PATH,
        ResponseTemplate::new(200).set_body_json(json!({"activities-heart": []})),
    )
    .await;
}

/// 404 every optional metric endpoint not listed in `except`.
async fn mount_optionals_absent(server: &MockServer, except: &[&str]) {
    for optional in OPTIONAL_PATHS {
        if !except.contains(&optional) {
            mount_get(server, optional, ResponseTemplate::new(404)).await;
        }
    }
}

fn summary_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "summary": {"steps": 8000, "caloriesOut": 2200},
    }))
}

#[tokio::test]
async fn publishes_only_present_fields_for_partial_day() {
    let fitbit = MockServer::start().await;
    let intervals = MockServer::start().await;
    mount_token(&fitbit, "refresh-1").await;
    mount_get(&fitbit, SUMMARY_PATH, summary_ok()).await;
    mount_sleep_and_heart(&fitbit).await;
    mount_optionals_absent(&fitbit, &[]).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/athlete/i42/wellness/2024-05-01"))
        .and(body_json(json!({
            "steps": 8000,
            "kcalConsumed": 2200,
            "sleepSecs": 25200,
            "avgSleepingHR": 58.0,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "2024-05-01"})))
        .expect(1)
        .mount(&intervals)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let response = wellness_publish::publish_daily_at(
        &config(&intervals.uri()),
        &noop_store(&dir),
        &fitbit.uri(),
        "2024-05-01",
    )
    .await
    .expect("publish");
    assert_eq!(response, json!({"id": "2024-05-01"}));
}

#[tokio::test]
async fn hard_summary_failure_aborts_before_upsert() {
    let fitbit = MockServer::start().await;
    let intervals = MockServer::start().await;
    mount_token(&fitbit, "refresh-1").await;
    mount_get(
        &fitbit,
        SUMMARY_PATH,
        ResponseTemplate::new(500).set_body_string("boom"),
    )
    .await;
    mount_sleep_and_heart(&fitbit).await;
    mount_optionals_absent(&fitbit, &[]).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&intervals)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let err = wellness_publish::publish_daily_at(
        &config(&intervals.uri()),
        &noop_store(&dir),
        &fitbit.uri(),
        "2024-05-01",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SyncError::VendorApi { .. }), "got {err:?}");
    assert!(intervals.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rotated_refresh_token_is_persisted() {
    let fitbit = MockServer::start().await;
    let intervals = MockServer::start().await;
    mount_token(&fitbit, "refresh-2").await;
    mount_get(&fitbit, SUMMARY_PATH, summary_ok()).await;
    mount_sleep_and_heart(&fitbit).await;
    mount_optionals_absent(&fitbit, &[]).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&intervals)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let env_path = dir.path().join(".env");
    std::fs::write(&env_path, "FITBIT_REFRESH_TOKEN=refresh-1\nOTHER=x\n").expect("seed env");

    wellness_publish::publish_daily_at(
        &config(&intervals.uri()),
        &EnvFileStore::new(&env_path),
        &fitbit.uri(),
        "2024-05-01",
    )
    .await
    .expect("publish");

    let contents = std::fs::read_to_string(&env_path).expect("read env");
    assert_eq!(contents, "FITBIT_REFRESH_TOKEN=refresh-2\nOTHER=x\n");
}

#[tokio::test]
async fn unrotated_refresh_token_leaves_store_untouched() {
    let fitbit = MockServer::start().await;
    let intervals = MockServer::start().await;
    mount_token(&fitbit, "refresh-1").await;
    mount_get(&fitbit, SUMMARY_PATH, summary_ok()).await;
    mount_sleep_and_heart(&fitbit).await;
    mount_optionals_absent(&fitbit, &[]).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&intervals)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let env_path = dir.path().join(".env");
    let seeded = "FITBIT_REFRESH_TOKEN=refresh-1\n";
    std::fs::write(&env_path, seeded).expect("seed env");

    wellness_publish::publish_daily_at(
        &config(&intervals.uri()),
        &EnvFileStore::new(&env_path),
        &fitbit.uri(),
        "2024-05-01",
    )
    .await
    .expect("publish");

    let contents = std::fs::read_to_string(&env_path).expect("read env");
    assert_eq!(contents, seeded);
}

#[tokio::test]
async fn present_optional_metrics_flow_into_payload() {
    let fitbit = MockServer::start().await;
    let intervals = MockServer::start().await;
    mount_token(&fitbit, "refresh-1").await;
    mount_get(&fitbit, SUMMARY_PATH, summary_ok()).await;
    mount_sleep_and_heart(&fitbit).await;
    mount_optionals_absent(&fitbit, &[WEIGHT_PATH]).await;
    mount_get(
        &fitbit,
        WEIGHT_PATH,
        ResponseTemplate::new(200).set_body_json(json!({
            "weight": [{"weight": 70.5}, {"weight": 71.2}],
        })),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/athlete/i42/wellness/2024-05-01"))
        .and(body_json(json!({
            "steps": 8000,
            "kcalConsumed": 2200,
            "sleepSecs": 25200,
            "avgSleepingHR": 58.0,
            "weight": 71.2,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&intervals)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    wellness_publish::publish_daily_at(
        &config(&intervals.uri()),
        &noop_store(&dir),
        &fitbit.uri(),
        "2024-05-01",
    )
    .await
    .expect("publish");
}
