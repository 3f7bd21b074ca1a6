use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "SMARTSESSION_BASE_URL";

/// Client configuration. `baseUrl` is the only recognized key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: ClientConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(Self::new(config.base_url))
    }

    /// Defaults, then the optional file, then the environment, then an explicit override.
    pub fn resolve(path: Option<&Path>, base_url_override: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(value) = std::env::var(BASE_URL_ENV) {
            if !value.trim().is_empty() {
                config = Self::new(value);
            }
        }

        if let Some(value) = base_url_override {
            config = Self::new(value);
        }

        Ok(config)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// WebSocket-style URL for the mock transport, derived from the HTTP base.
    pub fn socket_url(&self, path: &str) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes_and_builds_endpoints() {
        let config = ClientConfig::new("http://10.0.0.5:8000//");
        assert_eq!(config.base_url, "http://10.0.0.5:8000");
        assert_eq!(
            config.endpoint("/teacher/sessions"),
            "http://10.0.0.5:8000/teacher/sessions"
        );
        assert_eq!(config.socket_url("ws/student"), "ws://10.0.0.5:8000/ws/student");
    }

    #[test]
    fn reads_camel_case_file_and_prefers_override() {
        let path = std::env::temp_dir().join(format!("smartsession-config-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, r#"{ "baseUrl": "http://classroom.local:9000/" }"#).unwrap();

        let from_file = ClientConfig::from_file(&path).unwrap();
        assert_eq!(from_file.base_url, "http://classroom.local:9000");

        let overridden = ClientConfig::resolve(Some(&path), Some("http://127.0.0.1:1")).unwrap();
        assert_eq!(overridden.base_url, "http://127.0.0.1:1");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("smartsession-config-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "not json").unwrap();

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        fs::remove_file(&path).unwrap();
    }
}
