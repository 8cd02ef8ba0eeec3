//! # Orchestration
//!
//! Sequences the external systems through one run of the signature
//! workflow and decides which failures are contained and which abort the
//! run. See [`ContractBot`] for the phase sequence.

pub mod clients;
pub mod contract_bot;
pub mod types;

pub use clients::BotClients;
pub use contract_bot::{ContractBot, RunSettings};
pub use types::{RunOutcome, RunPhase, RunState};
