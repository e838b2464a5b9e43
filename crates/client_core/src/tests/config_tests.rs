use super::*;

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static CONFIG_DIR_SEQ: AtomicU64 = AtomicU64::new(0);

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let seq = CONFIG_DIR_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = env::temp_dir().join(format!("image_request_config_test_{suffix}_{seq}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("client.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn missing_config() -> PathBuf {
    env::temp_dir().join("image_request_config_test_absent/client.toml")
}

#[test]
fn endpoint_is_required() {
    assert_eq!(
        load_settings_from(&missing_config(), env_from(&[])),
        Err(ConfigError::MissingEndpoint)
    );
    assert_eq!(
        load_settings_from(&missing_config(), env_from(&[("IMAGE_API_URL", "  ")])),
        Err(ConfigError::MissingEndpoint)
    );
}

#[test]
fn reads_endpoint_from_environment() {
    let settings = load_settings_from(
        &missing_config(),
        env_from(&[("IMAGE_API_URL", "https://api.example.com/process")]),
    )
    .expect("settings");

    assert_eq!(settings.endpoint.as_str(), "https://api.example.com/process");
    assert_eq!(settings.request_timeout, Some(DEFAULT_REQUEST_TIMEOUT));
}

#[test]
fn app_prefixed_variable_wins_over_plain_one() {
    let settings = load_settings_from(
        &missing_config(),
        env_from(&[
            ("IMAGE_API_URL", "https://plain.example.com/"),
            ("APP__ENDPOINT", "https://app.example.com/"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.endpoint.host_str(), Some("app.example.com"));
}

#[test]
fn environment_overrides_config_file() {
    let path = temp_config(
        "endpoint = \"http://file.example.com/jobs\"\nrequest_timeout_secs = 15\n",
    );

    let from_file = load_settings_from(&path, env_from(&[])).expect("settings");
    assert_eq!(from_file.endpoint.as_str(), "http://file.example.com/jobs");
    assert_eq!(from_file.request_timeout, Some(Duration::from_secs(15)));

    let overridden = load_settings_from(
        &path,
        env_from(&[
            ("APP__ENDPOINT", "http://env.example.com/jobs"),
            ("APP__REQUEST_TIMEOUT_SECS", "0"),
        ]),
    )
    .expect("settings");
    assert_eq!(overridden.endpoint.as_str(), "http://env.example.com/jobs");
    assert_eq!(overridden.request_timeout, None);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_config_file_is_ignored() {
    let path = temp_config("endpoint = [not valid toml");
    let settings = load_settings_from(
        &path,
        env_from(&[("IMAGE_API_URL", "http://127.0.0.1:9000/")]),
    )
    .expect("settings");
    assert_eq!(settings.endpoint.port(), Some(9000));

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn rejects_non_http_endpoints() {
    let err = ClientSettings::new("ftp://example.com/upload").expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));

    let err = ClientSettings::new("not a url").expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
}

#[test]
fn rejects_unparseable_timeout() {
    assert_eq!(
        load_settings_from(
            &missing_config(),
            env_from(&[
                ("IMAGE_API_URL", "http://localhost/"),
                ("APP__REQUEST_TIMEOUT_SECS", "soon"),
            ]),
        ),
        Err(ConfigError::InvalidTimeout("soon".into()))
    );
}
