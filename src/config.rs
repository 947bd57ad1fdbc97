//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::reviews::policy::ErrorPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// HTTP method used to request listing pages
    #[serde(default)]
    pub method: RequestMethod,

    /// Accept-Language header value
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Query parameter carrying the page number on pages after the first
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Hard cap on the number of pages fetched per run
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// CSV export file, if any
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Directory holding the sentiment images
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Continue-or-abort decisions on errors
    #[serde(default)]
    pub policy: ErrorPolicy,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1500
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_page_param() -> String {
    "pageNumber".to_string()
}

fn default_max_pages() -> u32 {
    100
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            method: RequestMethod::default(),
            accept_language: default_accept_language(),
            page_param: default_page_param(),
            max_pages: default_max_pages(),
            format: OutputFormat::Table,
            output: None,
            image_dir: default_image_dir(),
            policy: ErrorPolicy::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("amz-reviews").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("AMZ_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("AMZ_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(max_pages) = std::env::var("AMZ_MAX_PAGES") {
            if let Ok(n) = max_pages.parse() {
                self.max_pages = n;
            }
        }

        if let Ok(param) = std::env::var("AMZ_PAGE_PARAM") {
            if !param.trim().is_empty() {
                self.page_param = param.trim().to_string();
            }
        }

        self
    }
}

/// HTTP method for listing page requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    Get,
    #[default]
    Post,
}

impl std::str::FromStr for RequestMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(RequestMethod::Get),
            "post" => Ok(RequestMethod::Post),
            _ => Err(format!("Unknown method: {}. Use: get, post", s)),
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestMethod::Get => write!(f, "GET"),
            RequestMethod::Post => write!(f, "POST"),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::policy::{ExtractionAction, FetchAction};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.proxy.is_none());
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 1500);
        assert_eq!(config.method, RequestMethod::Post);
        assert_eq!(config.accept_language, "en-US,en;q=0.9");
        assert_eq!(config.page_param, "pageNumber");
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.output.is_none());
        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert_eq!(config.policy, ErrorPolicy::best_effort());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<RequestMethod>().unwrap(), RequestMethod::Get);
        assert_eq!("POST".parse::<RequestMethod>().unwrap(), RequestMethod::Post);

        let err = "put".parse::<RequestMethod>().unwrap_err();
        assert!(err.contains("get, post"));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(RequestMethod::Get.to_string(), "GET");
        assert_eq!(RequestMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, markdown, csv"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            delay_ms = 3000
            max_pages = 5
            method = "get"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.delay_ms, 3000);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.method, RequestMethod::Get);
        assert_eq!(config.page_param, "pageNumber");
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            proxy = "socks5://localhost:1080"
            delay_ms = 5000
            delay_jitter_ms = 2000
            method = "post"
            accept_language = "en-GB,en;q=0.9"
            page_param = "page"
            max_pages = 20
            format = "csv"
            output = "reviews.csv"
            image_dir = "assets"

            [policy]
            on_fetch_error = "abort"
            on_extraction_error = "skip"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
        assert_eq!(config.delay_ms, 5000);
        assert_eq!(config.delay_jitter_ms, 2000);
        assert_eq!(config.method, RequestMethod::Post);
        assert_eq!(config.accept_language, "en-GB,en;q=0.9");
        assert_eq!(config.page_param, "page");
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.output, Some(PathBuf::from("reviews.csv")));
        assert_eq!(config.image_dir, PathBuf::from("assets"));
        assert_eq!(config.policy.on_fetch_error, FetchAction::Abort);
        assert_eq!(config.policy.on_extraction_error, ExtractionAction::Skip);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            page_param = "pg"
            delay_ms = 4000
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.page_param, "pg");
        assert_eq!(config.delay_ms, 4000);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_pages = 7").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_pages, 7);
    }

    #[test]
    fn test_config_with_env() {
        // Save original env vars
        let orig_proxy = std::env::var("AMZ_PROXY").ok();
        let orig_delay = std::env::var("AMZ_DELAY").ok();
        let orig_pages = std::env::var("AMZ_MAX_PAGES").ok();
        let orig_param = std::env::var("AMZ_PAGE_PARAM").ok();

        // Set test env vars
        std::env::set_var("AMZ_PROXY", "http://proxy:8080");
        std::env::set_var("AMZ_DELAY", "5000");
        std::env::set_var("AMZ_MAX_PAGES", "not_a_number");
        std::env::set_var("AMZ_PAGE_PARAM", " page ");

        let config = Config::new().with_env();
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        assert_eq!(config.delay_ms, 5000);
        // Invalid values are ignored
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.page_param, "page");

        // Restore original env vars
        for (key, value) in [
            ("AMZ_PROXY", orig_proxy),
            ("AMZ_DELAY", orig_delay),
            ("AMZ_MAX_PAGES", orig_pages),
            ("AMZ_PAGE_PARAM", orig_param),
        ] {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            proxy: Some("socks5://localhost:1080".to_string()),
            max_pages: 3,
            format: OutputFormat::Json,
            output: Some(PathBuf::from("out.csv")),
            policy: ErrorPolicy::strict(),
            ..Config::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.proxy, config.proxy);
        assert_eq!(parsed.max_pages, config.max_pages);
        assert_eq!(parsed.format, config.format);
        assert_eq!(parsed.output, config.output);
        assert_eq!(parsed.policy, config.policy);
    }
}
