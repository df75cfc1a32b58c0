use casewise_core::config::{
    LLMConfig, DEFAULT_CASES_PATH, DEFAULT_DEEPSEEK_MODEL, DEFAULT_LLM_PROVIDER,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL, DEFAULT_OVERALL_MAX_TOKENS, DEFAULT_SERVER_PORT,
};
use casewise_core::Config;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.content.cases_path, DEFAULT_CASES_PATH);
    assert_eq!(config.llm.provider, DEFAULT_LLM_PROVIDER);
    assert_eq!(config.report.overall_max_tokens, DEFAULT_OVERALL_MAX_TOKENS);
    assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
    assert!(config.graph.uri.is_none());
    assert!(!config.graph.is_configured());
}

#[test]
fn test_config_to_toml() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("[content]"));
    assert!(toml_str.contains("[graph]"));
    assert!(toml_str.contains("[llm]"));
    assert!(toml_str.contains("[report]"));
    assert!(toml_str.contains("[server]"));
}

#[test]
fn test_secrets_are_not_serialized() {
    let mut config = Config::default();
    config.graph.password = Some("hunter2".to_string());
    config.llm.api_key = Some("sk-secret".to_string());

    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(!toml_str.contains("hunter2"));
    assert!(!toml_str.contains("sk-secret"));
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[content]
cases_path = "content/cases.json"

[graph]
uri = "bolt://graph.internal:7687"
username = "reader"

[llm]
provider = "ollama"
model = "llama3"

[report]
output_dir = "out"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.content.cases_path, "content/cases.json");
    assert_eq!(config.graph.uri.as_deref(), Some("bolt://graph.internal:7687"));
    assert_eq!(config.graph.username, "reader");
    assert_eq!(config.llm.provider, "ollama");
    assert_eq!(config.llm.model, Some("llama3".to_string()));
    assert_eq!(config.report.output_dir, "out");
    assert_eq!(config.report.overall_max_tokens, DEFAULT_OVERALL_MAX_TOKENS);
}

#[test]
fn test_from_file_rejects_bad_temperature() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[llm]\ntemperature = 5.0").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_rejects_malformed_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[llm\nprovider = ").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_model_or_default() {
    let mut config = LLMConfig::default();
    assert_eq!(config.model_or_default(), DEFAULT_DEEPSEEK_MODEL);

    config.provider = "ollama".to_string();
    assert_eq!(config.model_or_default(), DEFAULT_OLLAMA_MODEL);

    config.provider = "openai".to_string();
    assert_eq!(config.model_or_default(), DEFAULT_OPENAI_MODEL);

    config.model = Some("custom-model".to_string());
    assert_eq!(config.model_or_default(), "custom-model");
}

#[test]
fn test_rendered_config_round_trips() {
    let text = Config::default().render();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.content.cases_path, DEFAULT_CASES_PATH);
    assert_eq!(parsed.llm.provider, DEFAULT_LLM_PROVIDER);
}
