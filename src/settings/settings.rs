use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub client: Client,
    pub api: Api,
    pub session: Session,
    #[serde(default)]
    pub mock: Mock,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Client {
    pub backend: String, // "api" or "mock"
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub storage: String, // "file" or "memory"
    #[serde(default = "default_session_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Mock {
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default = "default_signing_key")]
    pub signing_key: String,
}

impl Default for Mock {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            signing_key: default_signing_key(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_session_path() -> String {
    ".connectly/session.json".to_string()
}

fn default_signing_key() -> String {
    "connectly-mock-signing-key".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Loads the settings file, then applies `CONNECTLY__SECTION__KEY`
/// environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("CONNECTLY").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.toml");
        std::fs::write(
            &path,
            r#"
[client]
backend = "mock"

[api]
base_url = "http://localhost:8000/api/"

[session]
storage = "memory"

[log]
filter = "debug"
"#,
        )
        .unwrap();

        let settings = parse_settings(path.to_str()).unwrap();
        assert_eq!(settings.client.backend, "mock");
        assert_eq!(settings.api.timeout_secs, 15);
        assert_eq!(settings.session.path, ".connectly/session.json");
        assert_eq!(settings.mock.latency_ms, 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("does/not/exist.toml")).is_err());
    }
}
