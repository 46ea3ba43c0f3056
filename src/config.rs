use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub chat: ChatConfig,
    pub message: MessageConfig,
    pub server: ServerConfig,
    pub ping: PingConfig,
}

/// Where the review column lives on the project-tracking service.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub organization: String,
    pub project: String,
    pub column: String,
    /// Page size requested on every list call.
    pub per_page: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".into(),
            organization: "GoogleContainerTools".into(),
            project: "Container Tools Team In Progress".into(),
            column: "Waiting Code Review".into(),
            per_page: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub api_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "https://chat.googleapis.com".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MessageConfig {
    pub reference_url: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            reference_url: "https://github.com/orgs/GoogleContainerTools/projects/1".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PingConfig {
    pub endpoint: String,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://us-central1-priya-wadhwa.cloudfunctions.net/Chatbot".into(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".review-relay")
        .join("config.toml")
}

/// Load the config at `path`, or the default location when `None`.
/// A missing file is not an error: every field has a default.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("nope.toml").as_path())).unwrap();
        assert_eq!(config.github.column, "Waiting Code Review");
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.chat.api_url, "https://chat.googleapis.com");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[github]\norganization = \"priya-test\"\nproject = \"Project\"\n\n[server]\nlisten = \"127.0.0.1:9000\""
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.github.organization, "priya-test");
        assert_eq!(config.github.project, "Project");
        assert_eq!(config.github.column, "Waiting Code Review");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.server.listen, "127.0.0.1:9000");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[github\norganization = ").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
