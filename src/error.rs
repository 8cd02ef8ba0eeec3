use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignBotError {
    #[error("Session error ({system}): {message}")]
    Session { system: String, message: String },
    #[error("Portal error ({system}): {message}")]
    Portal { system: String, message: String },
    #[error("Mailbox error: {0}")]
    Mailbox(String),
    #[error("Notification error ({channel}): {message}")]
    Notification { channel: String, message: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Browser automation error: {0}")]
    Browser(String),
    #[error("Document unavailable for contract {contract}: {reason}")]
    DocumentUnavailable { contract: String, reason: String },
    #[error("Contract {contract} rejected by signature portal: {reason}")]
    ContractRejected { contract: String, reason: String },
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SignBotError {
    pub fn session(system: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            system: system.into(),
            message: message.into(),
        }
    }

    pub fn portal(system: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Portal {
            system: system.into(),
            message: message.into(),
        }
    }

    pub fn notification(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notification {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SignBotError {
    fn from(error: serde_json::Error) -> Self {
        SignBotError::Serialization(format!("JSON serialization error: {error}"))
    }
}

impl From<csv::Error> for SignBotError {
    fn from(error: csv::Error) -> Self {
        SignBotError::Serialization(format!("CSV serialization error: {error}"))
    }
}

impl From<thirtyfour::error::WebDriverError> for SignBotError {
    fn from(error: thirtyfour::error::WebDriverError) -> Self {
        SignBotError::Browser(error.to_string())
    }
}

impl From<imap::Error> for SignBotError {
    fn from(error: imap::Error) -> Self {
        SignBotError::Mailbox(error.to_string())
    }
}

impl From<mailparse::MailParseError> for SignBotError {
    fn from(error: mailparse::MailParseError) -> Self {
        SignBotError::Mailbox(format!("MIME parse error: {error}"))
    }
}

impl From<lettre::transport::smtp::Error> for SignBotError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        SignBotError::notification("email", error.to_string())
    }
}

impl From<lettre::error::Error> for SignBotError {
    fn from(error: lettre::error::Error) -> Self {
        SignBotError::notification("email", format!("message build error: {error}"))
    }
}

impl From<lettre::address::AddressError> for SignBotError {
    fn from(error: lettre::address::AddressError) -> Self {
        SignBotError::notification("email", format!("invalid address: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, SignBotError>;
