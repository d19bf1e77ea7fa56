//! Server configuration loading from file and environment variables.

use nbfc_agent::{AgentConfig, OpenAiConfig};
use nbfc_db::{postgres_url, DbRuntimeSettings};
use nbfc_voice::SpeechConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level configuration shared by the server and the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat-completions provider.
    #[serde(default)]
    pub llm: OpenAiConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    /// ElevenLabs speech settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection settings.
///
/// When `url` is set it wins; otherwise a PostgreSQL URL is assembled from
/// the individual fields.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default = "default_db_password")]
    pub password: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Where voice audio is archived.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_audio_dir")]
    pub dir: String,

    /// Clip served by `POST /voice/test`, relative to `dir`.
    #[serde(default = "default_test_file")]
    pub test_file: String,

    /// Clip used by the CLI voice demo, relative to `dir`.
    #[serde(default = "default_demo_file")]
    pub demo_file: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "nbfc_agent=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_db_user() -> String {
    "postgres".to_string()
}

/// Contains `@`, so it must be percent-encoded in the connection URL.
fn default_db_password() -> String {
    "@POSTGRES_9".to_string()
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "nbfc_db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_acquire_timeout_secs() -> u64 {
    DbRuntimeSettings::default().acquire_timeout_secs
}

fn default_audio_dir() -> String {
    "audio".to_string()
}

fn default_test_file() -> String {
    "ai/ai_1763399836.mp3".to_string()
}

fn default_demo_file() -> String {
    "demo.mp3".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: default_db_user(),
            password: default_db_password(),
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("pool_max_size", &self.pool_max_size)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection URL, with credentials percent-encoded.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => postgres_url(&self.user, &self.password, &self.host, self.port, &self.name),
        }
    }

    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
            acquire_timeout_secs: self.acquire_timeout_secs,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            dir: default_audio_dir(),
            test_file: default_test_file(),
            demo_file: default_demo_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides from the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if a numeric environment override does not parse.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Same as [`load_config`], reading overrides through `env`.
///
/// | Variable | Field |
/// |---|---|
/// | `HOST`, `PORT` | `server.host`, `server.port` |
/// | `DATABASE_URL` | `database.url` |
/// | `DB_USER`, `DB_PASS`, `DB_HOST`, `DB_PORT`, `DB_NAME` | `database.*` |
/// | `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL` | `llm.*` |
/// | `ELEVENLABS_API_KEY`, `ELEVENLABS_BASE_URL` | `speech.api_key`, `speech.base_url` |
/// | `ELEVENLABS_STT_MODEL`, `ELEVENLABS_TTS_MODEL`, `ELEVENLABS_VOICE_ID` | `speech.*` |
/// | `NBFC_AUDIO_DIR` | `audio.dir` |
/// | `NBFC_LOG_LEVEL`, `NBFC_LOG_JSON` | `logging.level`, `logging.json` |
pub fn load_config_with<F>(path: Option<&str>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(host) = var("HOST") {
        config.server.host = parse_env("HOST", host)?;
    }
    if let Some(port) = var("PORT") {
        config.server.port = parse_env("PORT", port)?;
    }

    if let Some(url) = var("DATABASE_URL") {
        config.database.url = Some(url);
    }
    if let Some(user) = var("DB_USER") {
        config.database.user = user;
    }
    if let Some(password) = env("DB_PASS") {
        config.database.password = password;
    }
    if let Some(host) = var("DB_HOST") {
        config.database.host = host;
    }
    if let Some(port) = var("DB_PORT") {
        config.database.port = parse_env("DB_PORT", port)?;
    }
    if let Some(name) = var("DB_NAME") {
        config.database.name = name;
    }

    if let Some(key) = var("OPENAI_API_KEY") {
        config.llm.api_key = key;
    }
    if let Some(url) = var("OPENAI_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = var("OPENAI_MODEL") {
        config.llm.model = model;
    }

    if let Some(key) = var("ELEVENLABS_API_KEY") {
        config.speech.api_key = key;
    }
    if let Some(url) = var("ELEVENLABS_BASE_URL") {
        config.speech.base_url = url;
    }
    if let Some(model) = var("ELEVENLABS_STT_MODEL") {
        config.speech.stt_model = model;
    }
    if let Some(model) = var("ELEVENLABS_TTS_MODEL") {
        config.speech.tts_model = model;
    }
    if let Some(voice) = var("ELEVENLABS_VOICE_ID") {
        config.speech.voice_id = voice;
    }

    if let Some(dir) = var("NBFC_AUDIO_DIR") {
        config.audio.dir = dir;
    }
    if let Some(level) = var("NBFC_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("NBFC_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}
