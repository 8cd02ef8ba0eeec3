#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SignBot
//!
//! Contract signature workflow automation.
//!
//! ## Overview
//!
//! Each run pulls contracts awaiting signature from the Maxycon portal,
//! stores them locally and attaches them in the Sign portal. It then
//! collects signed copies from an IMAP inbox and writes their status back
//! to Maxycon. Stakeholders are notified by email and WhatsApp, and a
//! report of the run is persisted and emailed.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Run state machine, retries and failure containment
//! - [`resilience`] - Deterministic exponential backoff
//! - [`client`] - Collaborator traits and their WebDriver/SMTP implementations
//! - [`mailbox`] - IMAP reader for signed-contract attachments
//! - [`storage`] - Local document and report storage
//! - [`scheduler`] - Fixed daily run times
//! - [`config`] - Layered YAML/environment configuration
//! - [`logging`] - Console plus rolling JSON file logging
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use signbot::config::ConfigManager;
//! use signbot::orchestration::ContractBot;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let bot = ContractBot::from_config(manager.config());
//!
//! let outcome = bot.run().await;
//! println!("completed: {}", outcome.is_completed());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod models;
pub mod orchestration;
pub mod resilience;
pub mod scheduler;
pub mod storage;

pub use config::{BotConfig, ConfigManager, ConfigurationError};
pub use error::{Result, SignBotError};
pub use models::{FinalizedContract, NewContract, ReconciliationStatus, RunReport};
pub use orchestration::{BotClients, ContractBot, RunOutcome, RunPhase};
pub use resilience::RetryPolicy;
pub use scheduler::DailySchedule;
pub use storage::{DocumentStore, LocalStorage};
