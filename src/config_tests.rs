use super::*;
use std::collections::HashMap;
use std::io::Write;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let config = ClientConfig::default();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.api.connect_timeout(), Duration::from_secs(60));
    assert!(!config.generation.include_system_preamble);
    assert_eq!(config.generation.echo_mode(), EchoMode::Off);
    assert!(config.generation.emit_interval().is_zero());
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_full_file() {
    let source = r#"
        [api]
        base_url = "http://localhost:9000/v1"
        title = "Test"
        connect_timeout_secs = 5

        [generation]
        include_system_preamble = true
        echo_suppression = true
        emit_interval_ms = 20

        [sampling]
        model_id = "anthropic/claude-2.1"
        temperature = 0.2

        [logging]
        level = "debug"
        format = "json"
    "#;
    let config = ClientConfig::from_toml_str(source).unwrap();

    assert_eq!(config.api.base_url, "http://localhost:9000/v1");
    assert_eq!(config.api.title, "Test");
    assert_eq!(config.api.referer, DEFAULT_REFERER);
    assert_eq!(config.generation.echo_mode(), EchoMode::SuppressPrompt);
    assert_eq!(config.generation.emit_interval(), Duration::from_millis(20));
    assert!(config.generation.build_options().include_system_preamble);
    assert_eq!(config.sampling.model(), Some("anthropic/claude-2.1"));
    assert_eq!(config.sampling.max_tokens, 500);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_error_is_reported() {
    let err = ClientConfig::from_toml_str("[api\nbase_url = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sampling]\nmodel_id = \"mistral/mistral-large-latest\"").unwrap();

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.sampling.model(), Some("mistral/mistral-large-latest"));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ClientConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_env_overrides() {
    let mut config = ClientConfig::default();
    config.apply_overrides_from(lookup(&[
        (ENV_BASE_URL, "http://127.0.0.1:1234/v1"),
        (ENV_API_KEY, "sk-env"),
        (ENV_MODEL, "openai/gpt-4"),
        (ENV_LOG_LEVEL, "debug"),
        (ENV_LOG_FORMAT, "json"),
    ]));

    assert_eq!(config.api.base_url, "http://127.0.0.1:1234/v1");
    assert_eq!(config.api.api_key.as_deref(), Some("sk-env"));
    assert_eq!(config.sampling.model(), Some("openai/gpt-4"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_empty_env_values_are_ignored() {
    let mut config = ClientConfig::default();
    config.apply_overrides_from(lookup(&[(ENV_MODEL, ""), (ENV_LOG_FORMAT, "yaml")]));
    assert_eq!(config.sampling.model(), None);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_rendered_toml_omits_api_key() {
    let mut config = ClientConfig::default();
    config.api.api_key = Some("sk-secret".into());
    let rendered = config.to_toml_string().unwrap();
    assert!(!rendered.contains("sk-secret"));
    assert!(rendered.contains("base_url"));
}

#[test]
fn test_debug_output_redacts_api_key() {
    let mut config = ClientConfig::default();
    config.api.api_key = Some("sk-or-secret-value".into());
    let fingerprint = ApiKey::new("sk-or-secret-value").unwrap().fingerprint();

    let printed = format!("{:?}", config);

    assert!(!printed.contains("sk-or-secret-value"));
    assert!(printed.contains(&fingerprint));
    assert!(printed.contains("base_url"));
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = ClientConfig::default();
    config.api.base_url = "ftp://example.com".into();
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.api.channel_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.generation.include_system_preamble = true;
    config.generation.system_preamble = " ".into();
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.sampling.top_p = 2.0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
