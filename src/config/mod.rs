//! # SignBot Configuration System
//!
//! Typed configuration for every collaborator the bot drives. Values are
//! layered by [`ConfigManager`]: built-in defaults, then
//! `config/signbot.yaml`, then `config/signbot.<env>.yaml`, then
//! `SIGNBOT__*` environment variables.
//!
//! ## Configuration Structure:
//!
//! ```yaml
//! maxycon:
//!   url: "https://sistema.maxycon.com"
//!   pending_status: "Pendente Assinatura"
//!
//! retry:
//!   max_attempts: 3
//!   initial_delay_seconds: 1
//!   max_delay_seconds: 60
//!
//! schedule:
//!   daily_times: ["09:00", "15:00"]
//! ```
//!
//! ## Usage:
//!
//! ```rust,no_run
//! use signbot::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let retry = &manager.config().retry;
//! assert!(retry.max_attempts >= 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for `maxycon.lookback_days`
pub const MAX_LOOKBACK_DAYS: i64 = 366;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring signbot.yaml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Source contract-management portal
    pub maxycon: MaxyconConfig,

    /// Digital-signature portal
    pub sign: SignConfig,

    /// Outbound mail relay
    pub smtp: SmtpConfig,

    /// Inbox polled for signed contracts
    pub imap: ImapConfig,

    /// Chat channel for summaries and alerts
    pub whatsapp: WhatsAppConfig,

    /// WebDriver endpoint shared by the browser-driven clients
    pub webdriver: WebDriverConfig,

    /// Local document layout
    pub storage: StorageConfig,

    /// Backoff for the retried network flows
    pub retry: RetryConfig,

    /// Daily run times
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaxyconConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub pending_status: String,
    pub finalized_status: String,
    pub lookback_days: i64,
    pub download_dir: PathBuf,
}

impl Default for MaxyconConfig {
    fn default() -> Self {
        Self {
            url: "https://sistema.maxycon.com".to_string(),
            user: String::new(),
            password: String::new(),
            pending_status: "Pendente Assinatura".to_string(),
            finalized_status: "Finalizado".to_string(),
            lookback_days: 1,
            download_dir: PathBuf::from("downloads"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub default_signer: String,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            url: "https://sistema.sign.com".to_string(),
            user: String::new(),
            password: String::new(),
            default_signer: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    /// Registration team that reviews newly attached contracts
    pub registration_recipient: String,
    pub report_recipients: Vec<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: String::new(),
            registration_recipient: "cadastro@empresa.com".to_string(),
            report_recipients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub folder: String,
    pub subject_pattern: String,
}

impl Default for ImapConfig {
    fn default() -> Self {
        Self {
            host: "imap.gmail.com".to_string(),
            port: 993,
            user: String::new(),
            password: String::new(),
            folder: "INBOX".to_string(),
            subject_pattern: "contrato assinado".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub url: String,
    pub group: String,
    /// Chrome profile holding the linked WhatsApp Web session
    pub profile_dir: PathBuf,
    pub login_timeout_seconds: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            url: "https://web.whatsapp.com".to_string(),
            group: String::new(),
            profile_dir: PathBuf::from("profiles/whatsapp"),
            login_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebDriverConfig {
    pub server_url: String,
    pub headless: bool,
    pub element_timeout_seconds: u64,
    pub download_wait_seconds: u64,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9515".to_string(),
            headless: true,
            element_timeout_seconds: 10,
            download_wait_seconds: 5,
        }
    }
}

impl WebDriverConfig {
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_seconds)
    }

    pub fn download_wait(&self) -> Duration {
        Duration::from_secs(self.download_wait_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub new_contracts_dir: PathBuf,
    pub finalized_contracts_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            new_contracts_dir: PathBuf::from("contratos/novos"),
            finalized_contracts_dir: PathBuf::from("contratos/finalizados"),
            reports_dir: PathBuf::from("relatorios"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

/// Backoff and retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_seconds: u64,
    pub max_delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_seconds: 1,
            max_delay_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local wall-clock times, `HH:MM`
    pub daily_times: Vec<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_times: vec!["09:00".to_string(), "15:00".to_string()],
        }
    }
}

impl ScheduleConfig {
    pub fn parsed_times(&self) -> ConfigResult<Vec<NaiveTime>> {
        self.daily_times
            .iter()
            .map(|raw| {
                NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| {
                    ConfigurationError::invalid_value("schedule.daily_times", raw, e.to_string())
                })
            })
            .collect()
    }
}

impl BotConfig {
    /// Validate the merged configuration before any collaborator is built
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.max_attempts",
                "0",
                "at least one attempt is required",
            ));
        }
        if self.retry.initial_delay_seconds > self.retry.max_delay_seconds {
            return Err(ConfigurationError::invalid_value(
                "retry.initial_delay_seconds",
                self.retry.initial_delay_seconds.to_string(),
                format!(
                    "must not exceed retry.max_delay_seconds ({})",
                    self.retry.max_delay_seconds
                ),
            ));
        }

        if self.schedule.daily_times.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "daily_times",
                "schedule",
            ));
        }
        self.schedule.parsed_times()?;

        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.maxycon.lookback_days) {
            return Err(ConfigurationError::invalid_value(
                "maxycon.lookback_days",
                self.maxycon.lookback_days.to_string(),
                format!("must be between 0 and {MAX_LOOKBACK_DAYS}"),
            ));
        }

        for (field, value) in [
            ("maxycon.url", &self.maxycon.url),
            ("sign.url", &self.sign.url),
            ("smtp.host", &self.smtp.host),
            ("imap.host", &self.imap.host),
            ("webdriver.server_url", &self.webdriver.server_url),
        ] {
            if value.trim().is_empty() {
                let (section, name) = field.split_once('.').unwrap_or(("root", field));
                return Err(ConfigurationError::missing_required_field(name, section));
            }
        }

        for (field, value) in [
            ("maxycon.user", &self.maxycon.user),
            ("maxycon.password", &self.maxycon.password),
            ("sign.user", &self.sign.user),
            ("sign.password", &self.sign.password),
            ("smtp.user", &self.smtp.user),
            ("smtp.password", &self.smtp.password),
            ("imap.user", &self.imap.user),
            ("imap.password", &self.imap.password),
        ] {
            if value.is_empty() {
                let (section, name) = field.split_once('.').unwrap_or(("root", field));
                return Err(ConfigurationError::missing_required_field(
                    name,
                    format!("{section} credentials"),
                ));
            }
        }

        if self.sign.default_signer.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field("default_signer", "sign"));
        }
        if self.whatsapp.group.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field("group", "whatsapp"));
        }

        Ok(())
    }
}
