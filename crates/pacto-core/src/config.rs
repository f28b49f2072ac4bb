use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PactoError;

/// Top-level Pacto configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pacto: PactoConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// General agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PactoConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PactoConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Goal store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Oracle (Gemini) config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// API key. Empty = fall back to the GEMINI_API_KEY env var.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_model")]
    pub model: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_oracle_model(),
        }
    }
}

impl OracleConfig {
    /// API key from config, falling back to the environment.
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("GEMINI_API_KEY").unwrap_or_default()
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelConfig {
    pub twilio: Option<TwilioConfig>,
}

/// Twilio WhatsApp gateway config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwilioConfig {
    /// Account SID. Empty = fall back to TWILIO_ACCOUNT_SID.
    #[serde(default)]
    pub account_sid: String,
    /// Auth token. Empty = fall back to TWILIO_AUTH_TOKEN.
    #[serde(default)]
    pub auth_token: String,
    /// Sender number (sandbox or official), e.g. `+14155238886`.
    #[serde(default)]
    pub from_number: String,
}

impl TwilioConfig {
    pub fn resolved_account_sid(&self) -> String {
        if !self.account_sid.is_empty() {
            return self.account_sid.clone();
        }
        std::env::var("TWILIO_ACCOUNT_SID").unwrap_or_default()
    }

    pub fn resolved_auth_token(&self) -> String {
        if !self.auth_token.is_empty() {
            return self.auth_token.clone();
        }
        std::env::var("TWILIO_AUTH_TOKEN").unwrap_or_default()
    }
}

/// Webhook server config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Scheduler configuration — the daily check-in broadcast and the
/// monthly report. Times are wall-clock in a fixed UTC offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Fixed zone offset in hours (default -3, America/Sao_Paulo).
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    #[serde(default = "default_daily_hour")]
    pub daily_hour: u32,
    #[serde(default)]
    pub daily_minute: u32,
    #[serde(default = "default_monthly_hour")]
    pub monthly_hour: u32,
    #[serde(default)]
    pub monthly_minute: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval(),
            utc_offset_hours: default_utc_offset(),
            daily_hour: default_daily_hour(),
            daily_minute: 0,
            monthly_hour: default_monthly_hour(),
            monthly_minute: 0,
        }
    }
}

fn default_name() -> String {
    "pacto".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_path() -> String {
    "~/.pacto/data/pacto.db".to_string()
}

fn default_oracle_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    30
}

fn default_utc_offset() -> i32 {
    -3
}

fn default_daily_hour() -> u32 {
    20
}

fn default_monthly_hour() -> u32 {
    21
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, PactoError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| PactoError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| PactoError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.pacto.name, "pacto");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.scheduler.enabled);
        assert_eq!(cfg.scheduler.utc_offset_hours, -3);
        assert_eq!(cfg.scheduler.daily_hour, 20);
        assert_eq!(cfg.scheduler.daily_minute, 0);
        assert!(cfg.channel.twilio.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            [pacto]
            name = "pacto-dev"

            [scheduler]
            daily_hour = 21
            daily_minute = 30

            [channel.twilio]
            account_sid = "AC123"
            from_number = "+14155238886"
        "#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.pacto.name, "pacto-dev");
        assert_eq!(cfg.pacto.log_level, "info");
        assert_eq!(cfg.scheduler.daily_hour, 21);
        assert_eq!(cfg.scheduler.daily_minute, 30);
        // Untouched sections keep defaults.
        assert_eq!(cfg.scheduler.monthly_hour, 21);
        let twilio = cfg.channel.twilio.unwrap();
        assert_eq!(twilio.account_sid, "AC123");
        assert_eq!(twilio.from_number, "+14155238886");
    }

    #[test]
    fn test_shellexpand_no_tilde() {
        assert_eq!(shellexpand("/tmp/x.db"), "/tmp/x.db");
    }
}
