//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use backfill_core::HttpConfig;
use backfill_engine::EnrichOptions;
use backfill_providers::ProvidersConfig;

/// Global configuration for backfill
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpSection,
    pub providers: ProvidersSection,
    pub enrich: EnrichSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_attempts: u32,
    /// Linear backoff step; attempt n waits n × this
    pub base_delay_ms: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            user_agent: None,
            timeout_secs: http.timeout.as_secs(),
            connect_timeout_secs: http.connect_timeout.as_secs(),
            max_attempts: http.max_attempts,
            base_delay_ms: http.base_delay.as_millis() as u64,
        }
    }
}

impl HttpSection {
    pub fn client_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            base_delay: Duration::from_millis(self.base_delay_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts.max(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    pub wikipedia_api: String,
    pub wikipedia_langs: Vec<String>,
    pub wikidata_sparql: String,
    pub sparql_timeout_secs: u64,
    pub label_languages: String,
    pub clearbit_suggest: String,
    pub opencorporates_search: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub opencorporates_token: Option<String>,
    pub request_pause_ms: u64,
}

impl Default for ProvidersSection {
    fn default() -> Self {
        let providers = ProvidersConfig::default();
        Self {
            wikipedia_api: providers.wikipedia_api,
            wikipedia_langs: providers.wikipedia_langs,
            wikidata_sparql: providers.wikidata_sparql,
            sparql_timeout_secs: providers.sparql_timeout.as_secs(),
            label_languages: providers.label_languages,
            clearbit_suggest: providers.clearbit_suggest,
            opencorporates_search: providers.opencorporates_search,
            opencorporates_token: std::env::var("OPENCORPORATES_API_TOKEN").ok(),
            request_pause_ms: providers.request_pause.as_millis() as u64,
        }
    }
}

impl ProvidersSection {
    pub fn providers_config(&self) -> ProvidersConfig {
        ProvidersConfig {
            wikipedia_api: self.wikipedia_api.clone(),
            wikipedia_langs: self.wikipedia_langs.clone(),
            wikidata_sparql: self.wikidata_sparql.clone(),
            sparql_timeout: Duration::from_secs(self.sparql_timeout_secs),
            label_languages: self.label_languages.clone(),
            clearbit_suggest: self.clearbit_suggest.clone(),
            opencorporates_search: self.opencorporates_search.clone(),
            opencorporates_token: self.opencorporates_token.clone(),
            request_pause: Duration::from_millis(self.request_pause_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichSection {
    pub name_field: String,
    pub delay_ms: u64,
    /// 0 disables periodic checkpoints
    pub checkpoint_every: usize,
    pub checkpoint_path: PathBuf,
    pub only_missing: bool,
}

impl Default for EnrichSection {
    fn default() -> Self {
        let options = EnrichOptions::default();
        Self {
            name_field: options.name_field,
            delay_ms: options.delay.as_millis() as u64,
            checkpoint_every: options.checkpoint_every.unwrap_or(0),
            checkpoint_path: options.checkpoint_path,
            only_missing: options.only_missing,
        }
    }
}

impl EnrichSection {
    pub fn options(&self) -> EnrichOptions {
        EnrichOptions {
            name_field: self.name_field.clone(),
            delay: Duration::from_millis(self.delay_ms),
            checkpoint_every: Some(self.checkpoint_every).filter(|&n| n > 0),
            checkpoint_path: self.checkpoint_path.clone(),
            only_missing: self.only_missing,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./backfill.toml (current directory)
    /// 2. ~/.config/backfill/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("backfill.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "backfill") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply command-line flags; a timeout flag covers SPARQL queries too
    pub fn with_overrides(mut self, max_attempts: Option<u32>, timeout_secs: Option<u64>) -> Self {
        if let Some(n) = max_attempts {
            self.http.max_attempts = n;
        }
        if let Some(secs) = timeout_secs {
            self.http.timeout_secs = secs;
            self.providers.sparql_timeout_secs = secs;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let config = Config::default();
        let http = config.http.client_config();
        assert_eq!(http.max_attempts, 3);
        assert_eq!(http.timeout, Duration::from_secs(20));
        assert_eq!(http.base_delay, Duration::from_millis(1200));

        let options = config.enrich.options();
        assert_eq!(options.name_field, "advertiser_name");
        assert_eq!(options.checkpoint_every, Some(100));
        assert!(options.only_missing);
        let providers = config.providers.providers_config();
        assert_eq!(providers.request_pause, Duration::from_millis(200));
        assert_eq!(providers.sparql_timeout, Duration::from_secs(25));
    }

    #[test]
    fn timeout_flag_covers_sparql() {
        let config = Config::default().with_overrides(Some(5), Some(90));
        assert_eq!(config.http.client_config().max_attempts, 5);
        assert_eq!(config.http.client_config().timeout, Duration::from_secs(90));
        assert_eq!(
            config.providers.providers_config().sparql_timeout,
            Duration::from_secs(90)
        );

        let untouched = Config::default().with_overrides(None, None);
        assert_eq!(untouched.providers.sparql_timeout_secs, 25);
        assert_eq!(untouched.http.timeout_secs, 20);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("BACKFILL_TEST_TOKEN", "secret");
        assert_eq!(expand_env_var("${BACKFILL_TEST_TOKEN}"), Some("secret".to_string()));
        std::env::remove_var("BACKFILL_TEST_TOKEN");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[http]
max_attempts = 5
base_delay_ms = 500

[providers]
wikipedia_langs = ["fr", "de"]
opencorporates_token = "abc"
sparql_timeout_secs = 60

[enrich]
name_field = "company"
checkpoint_every = 0
only_missing = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.client_config().max_attempts, 5);
        assert_eq!(
            config.http.client_config().base_delay,
            Duration::from_millis(500)
        );
        let providers = config.providers.providers_config();
        assert_eq!(providers.wikipedia_langs, ["fr", "de"]);
        assert_eq!(providers.opencorporates_token.as_deref(), Some("abc"));
        assert_eq!(providers.sparql_timeout, Duration::from_secs(60));
        let options = config.enrich.options();
        assert_eq!(options.name_field, "company");
        assert_eq!(options.checkpoint_every, None);
        assert!(!options.only_missing);
        // Untouched keys keep their defaults
        assert_eq!(options.delay, Duration::from_millis(200));
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backfill.toml");
        std::fs::write(&path, "[http\nmax_attempts = ").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
