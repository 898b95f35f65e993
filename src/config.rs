use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Longest goal horizon a remediation draft may use.
pub const MAX_GOAL_HORIZON_DAYS: i64 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub remediation: RemediationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub permissive_cors: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    #[serde(default = "default_recent_records")]
    pub recent_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationConfig {
    #[serde(default = "default_goal_horizon_days")]
    pub goal_horizon_days: i64,
    #[serde(default = "default_activities_per_area")]
    pub activities_per_area: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/teacher-tools/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        parsed
            .validate()
            .with_context(|| format!("invalid config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        let days = self.remediation.goal_horizon_days;
        if !(1..=MAX_GOAL_HORIZON_DAYS).contains(&days) {
            bail!(
                "remediation.goal_horizon_days must be between 1 and {MAX_GOAL_HORIZON_DAYS}, got {days}"
            );
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[server]
host = "127.0.0.1"
port = 3001
permissive_cors = true

[storage]
# "sqlite" or "memory"
backend = "sqlite"
db_path = "~/.local/share/teacher-tools/teacher-tools.db"

[behavior]
recent_records = 5

[remediation]
goal_horizon_days = 30
activities_per_area = 3
"#;
        template.to_string()
    }
}

impl StorageConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            permissive_cors: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            db_path: default_db_path(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            recent_records: default_recent_records(),
        }
    }
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            goal_horizon_days: default_goal_horizon_days(),
            activities_per_area: default_activities_per_area(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_db_path() -> String {
    "~/.local/share/teacher-tools/teacher-tools.db".to_string()
}

fn default_recent_records() -> usize {
    5
}

fn default_goal_horizon_days() -> i64 {
    30
}

fn default_activities_per_area() -> usize {
    3
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigOverrides, StorageBackend, MAX_GOAL_HORIZON_DAYS};

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config =
            toml::from_str(&Config::default_template()).expect("template must parse");
        let defaults = Config::default();
        assert_eq!(parsed.server.port, defaults.server.port);
        assert_eq!(parsed.storage.backend, StorageBackend::Sqlite);
        assert_eq!(parsed.storage.db_path, defaults.storage.db_path);
        assert_eq!(parsed.behavior.recent_records, 5);
        assert_eq!(parsed.remediation.goal_horizon_days, 30);
        assert_eq!(parsed.remediation.activities_per_area, 3);
    }

    #[test]
    fn partial_file_keeps_field_defaults() {
        let parsed: Config = toml::from_str(
            r#"
[storage]
backend = "memory"

[server]
port = 8080
"#,
        )
        .expect("partial config must parse");
        assert_eq!(parsed.storage.backend, StorageBackend::Memory);
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert!(parsed.server.permissive_cors);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn written_template_round_trips_through_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/config.toml");
        Config::write_template(&path).expect("write template");
        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn goal_horizon_must_be_positive_and_bounded() {
        assert!(Config::default().validate().is_ok());
        let dir = tempfile::tempdir().expect("tempdir");
        for days in ["0", "-5", "100000000"] {
            let path = dir.path().join(format!("horizon{days}.toml"));
            std::fs::write(&path, format!("[remediation]\ngoal_horizon_days = {days}\n"))
                .expect("write config");
            let err = Config::load(Some(&path)).expect_err("out of range horizon");
            assert!(format!("{err:#}").contains("goal_horizon_days"));
        }
        let path = dir.path().join("max.toml");
        std::fs::write(&path, format!("[remediation]\ngoal_horizon_days = {MAX_GOAL_HORIZON_DAYS}\n"))
            .expect("write config");
        assert!(Config::load(Some(&path)).is_ok());
    }

    #[test]
    fn overrides_replace_host_and_port() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
        });
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn tilde_paths_expand_under_home() {
        let config = Config::default();
        let resolved = config.storage.resolved_db_path();
        assert!(resolved.ends_with(".local/share/teacher-tools/teacher-tools.db"));
        assert_eq!(
            super::expand_tilde("/var/lib/tools.db"),
            std::path::PathBuf::from("/var/lib/tools.db")
        );
    }
}
