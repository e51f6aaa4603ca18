//! Configuration file management for wayfarer.
//!
//! Provides a TOML-based config file at `~/.config/wayfarer/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use wayfarer_core::config::GeneratorConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// `[generator]`: every key is optional; absent keys fall through to the
/// default.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeneratorSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_origins: Option<Vec<String>>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the wayfarer config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/wayfarer` or `~/.config/wayfarer`,
/// never the platform-specific `dirs::config_dir()`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("wayfarer");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("wayfarer")
}

/// Return the path to the wayfarer config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub const DEFAULT_BIND: &str = "0.0.0.0";
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:9000", "http://127.0.0.1:9000"];
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub api_key: Option<&'a str>,
    pub bind: Option<&'a str>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct WayfarerConfig {
    pub generator: GeneratorConfig,
    pub server: ServerConfig,
}

impl WayfarerConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `--api-key` > `OPENAI_API_KEY` > `generator.api_key` > error
    /// - Base URL: `WAYFARER_BASE_URL` > `generator.base_url` > OpenAI
    /// - Model: `WAYFARER_MODEL` > `generator.model` > `gpt-4`
    /// - Temperature: `TEMPERATURE` > `generator.temperature` > 0.7
    /// - Max tokens: `MAX_TOKENS` > `generator.max_tokens` > 2000
    /// - Timeout: `WAYFARER_TIMEOUT_SECS` > `generator.timeout_secs` > 60
    /// - Bind/port: flags > `server.bind`/`server.port` > `0.0.0.0:8000`
    pub fn resolve(cli: &CliOverrides<'_>) -> Result<Self> {
        let file = load_config().unwrap_or_default();
        Self::resolve_with(cli, file)
    }

    fn resolve_with(cli: &CliOverrides<'_>, file: ConfigFile) -> Result<Self> {
        let ConfigFile { generator: g, server: s } = file;

        let api_key = cli
            .api_key
            .map(str::to_string)
            .or_else(|| env_string("OPENAI_API_KEY"))
            .or(g.api_key);
        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => bail!(
                "OpenAI API key not found; set OPENAI_API_KEY or run `wayfarer init --api-key <KEY>` to create a config file"
            ),
        };

        let defaults = GeneratorConfig::new(api_key);
        let temperature = env_parse::<f32>("TEMPERATURE")?
            .or(g.temperature)
            .unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            bail!("temperature must be between 0.0 and 2.0, got {temperature}");
        }

        let generator = GeneratorConfig {
            base_url: env_string("WAYFARER_BASE_URL")
                .or(g.base_url)
                .unwrap_or(defaults.base_url),
            model: env_string("WAYFARER_MODEL")
                .or(g.model)
                .unwrap_or(defaults.model),
            temperature,
            max_tokens: env_parse::<u32>("MAX_TOKENS")?
                .or(g.max_tokens)
                .unwrap_or(defaults.max_tokens),
            timeout: env_parse::<u64>("WAYFARER_TIMEOUT_SECS")?
                .or(g.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            api_key: defaults.api_key,
        };

        let server = ServerConfig {
            bind: cli
                .bind
                .map(str::to_string)
                .or(s.bind)
                .unwrap_or_else(|| ServerConfig::DEFAULT_BIND.to_string()),
            port: cli.port.or(s.port).unwrap_or(ServerConfig::DEFAULT_PORT),
            cors_origins: s.cors_origins.unwrap_or_else(|| {
                ServerConfig::DEFAULT_CORS_ORIGINS
                    .iter()
                    .map(|o| o.to_string())
                    .collect()
            }),
        };

        Ok(Self { generator, server })
    }
}

/// Non-empty value of an environment variable.
fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{name} env var is not valid: {e}")),
        None => Ok(None),
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
