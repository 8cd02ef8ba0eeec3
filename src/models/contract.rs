//! # Contract Models
//!
//! The two shapes a contract takes during a run: a pending contract listed
//! by the source portal, and a signed copy received through the mailbox.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Contract awaiting signature, as listed by the source portal.
///
/// Read-only to the orchestrator; it is only copied into the processed
/// collection once the signature portal confirms the attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContract {
    /// Portal-assigned identifier used for downloads
    pub id: String,
    /// Human-readable contract number
    pub number: String,
    pub client: String,
    /// Entry date exactly as the portal displays it
    pub entry_date: String,
    pub status: String,
}

impl fmt::Display for NewContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number, self.client)
    }
}

/// Whether a received signed copy was written back to the source portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Received locally, write-back not attempted yet
    Pending,
    /// Status updated and signed copy uploaded
    Confirmed,
    /// Received locally but the write-back failed
    Failed { reason: String },
}

impl ReconciliationStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Signed contract extracted from a mailbox attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedContract {
    pub file_name: String,
    pub path: PathBuf,
    pub received_at: DateTime<Local>,
    pub reconciliation: ReconciliationStatus,
}

impl FinalizedContract {
    pub fn received(file_name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            file_name: file_name.into(),
            path,
            received_at: Local::now(),
            reconciliation: ReconciliationStatus::Pending,
        }
    }
}
