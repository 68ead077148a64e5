// src/config/site.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "MEETINGS_CONFIG_PATH";
pub const ENV_FEED_URL: &str = "TSML_FEED_URL";
pub const ENV_PROXY_URL: &str = "TSML_PROXY_URL";
pub const ENV_OUTPUT_DIR: &str = "MEETINGS_OUTPUT_DIR";
pub const ENV_DATA_DIR: &str = "MEETINGS_DATA_DIR";

pub const DEFAULT_FEED_URL: &str = "https://www.seattleaa.org/wp-content/tsml-cache-cbdb25180b.json";
pub const DEFAULT_PROXY_URL: &str = "https://cors-proxy-xi-ten.vercel.app/api/proxy";

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_proxy_url() -> Option<String> {
    Some(DEFAULT_PROXY_URL.to_string())
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_base_url() -> String {
    "https://noprofits.org/php_meetings/".to_string()
}
fn default_site_title() -> String {
    "AA Meetings Directory".to_string()
}
fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    /// CORS proxy taking the feed as `?url=`; empty disables it.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Public URL the output directory is served from (sitemap, robots).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_site_title")]
    pub site_title: String,
    /// IANA zone that decides what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Treat search-data and sitemap failures as fatal too.
    #[serde(default)]
    pub strict: bool,
    /// Write a Prometheus text snapshot of the build counters to the data dir.
    #[serde(default)]
    pub metrics_snapshot: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            proxy_url: default_proxy_url(),
            timeout_secs: default_timeout_secs(),
            output_dir: default_output_dir(),
            data_dir: default_data_dir(),
            base_url: default_base_url(),
            site_title: default_site_title(),
            timezone: default_timezone(),
            strict: false,
            metrics_snapshot: false,
        }
    }
}

impl SiteConfig {
    /// Load from an explicit path. TOML or JSON, chosen by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading site config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing site config {}", path.display()))?;
        Ok(cfg.normalized())
    }

    /// Load using env var + fallbacks:
    /// 1) $MEETINGS_CONFIG_PATH
    /// 2) config/meetings.toml
    /// 3) config/meetings.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/meetings.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/meetings.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Apply `TSML_*` / `MEETINGS_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with an explicit lookup.
    pub fn with_overrides(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = get(ENV_FEED_URL).filter(|v| !v.trim().is_empty()) {
            self.feed_url = v.trim().to_string();
        }
        if let Some(v) = get(ENV_PROXY_URL) {
            self.proxy_url = Some(v);
        }
        if let Some(v) = get(ENV_OUTPUT_DIR).filter(|v| !v.trim().is_empty()) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(v);
        }
        self.normalized()
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("unknown timezone {:?}: {e}", self.timezone))
    }

    /// Current time in the configured zone; its date is the default window start.
    pub fn now(&self) -> Result<DateTime<Tz>> {
        Ok(Utc::now().with_timezone(&self.tz()?))
    }

    fn normalized(mut self) -> Self {
        self.proxy_url = self
            .proxy_url
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        self
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<SiteConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => toml::from_str(s)
            .map_err(anyhow::Error::from)
            .or_else(|_| serde_json::from_str(s).map_err(anyhow::Error::from))
            .map_err(|_| anyhow!("unsupported site config format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config(
            r#"
site_title = "Eastside Meetings"
proxy_url = ""
base_url = "https://example.org/m"
"#,
            "toml",
        )
        .unwrap()
        .normalized();
        assert_eq!(cfg.site_title, "Eastside Meetings");
        assert_eq!(cfg.proxy_url, None);
        assert_eq!(cfg.base_url, "https://example.org/m/");
        assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn json_is_accepted_without_extension_hint() {
        let cfg = parse_config(r#"{"strict": true, "timeout_secs": 5}"#, "").unwrap();
        assert!(cfg.strict);
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn overrides_replace_values() {
        let env: HashMap<&str, &str> = [
            (ENV_FEED_URL, "https://feed.test/x.json"),
            (ENV_PROXY_URL, ""),
            (ENV_OUTPUT_DIR, "public"),
        ]
        .into_iter()
        .collect();
        let cfg = SiteConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.feed_url, "https://feed.test/x.json");
        assert_eq!(cfg.proxy_url, None);
        assert_eq!(cfg.output_dir, PathBuf::from("public"));
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn bad_timezone_is_an_error() {
        let cfg = SiteConfig {
            timezone: "Mars/Olympus".into(),
            ..Default::default()
        };
        assert!(cfg.tz().is_err());
        assert!(cfg.now().is_err());
        assert!(SiteConfig::default().tz().is_ok());
    }

    #[test]
    fn now_is_in_the_configured_zone() {
        let cfg = SiteConfig {
            timezone: "America/New_York".into(),
            ..Default::default()
        };
        let now = cfg.now().unwrap();
        assert_eq!(now.timezone(), chrono_tz::America::New_York);
        let utc_gap = (now.naive_utc() - Utc::now().naive_utc()).num_seconds().abs();
        assert!(utc_gap < 60);
    }
}
