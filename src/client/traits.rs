//! # Collaborator Traits
//!
//! The contracts the orchestrator relies on. Each external system sits
//! behind one of these traits; the orchestrator never sees selectors,
//! sockets or sessions.
//!
//! Hard failures (session lost, element missing, network down) surface as
//! `Err`. Recoverable absence is an explicit [`Outcome::Unavailable`] or an
//! empty list, never an error.

use crate::error::Result;
use crate::models::{FinalizedContract, NewContract, RunReport};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};

/// Result of an operation that can legitimately come back empty-handed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Unavailable(String),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Convert absence into an error built from the reason
    pub fn or_else_err<E>(self, err: impl FnOnce(String) -> E) -> std::result::Result<T, E> {
        match self {
            Self::Done(value) => Ok(value),
            Self::Unavailable(reason) => Err(err(reason)),
        }
    }
}

/// Inclusive range of entry dates used to list pending contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// `lookback_days` before `today` through `today`. Saturates at the
    /// earliest representable date.
    pub fn ending_on(today: NaiveDate, lookback_days: i64) -> Self {
        let lookback = Days::new(lookback_days.max(0).unsigned_abs());
        Self {
            from: today.checked_sub_days(lookback).unwrap_or(NaiveDate::MIN),
            to: today,
        }
    }
}

/// Source contract-management portal (Maxycon)
#[async_trait]
pub trait SourcePortal: Send + Sync {
    async fn authenticate(&self) -> Result<()>;

    /// Contracts in `status` entered within `window`; empty when none match
    async fn list_pending(&self, window: DateWindow, status: &str) -> Result<Vec<NewContract>>;

    /// Download the contract document, returning where it landed
    async fn download(&self, contract_id: &str) -> Result<Outcome<PathBuf>>;

    async fn update_status(&self, file_name: &str, status: &str) -> Result<()>;

    async fn upload_signed(&self, path: &Path, file_name: &str) -> Result<()>;

    /// Release the session; failures are reported but never fatal
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Digital-signature portal (Sign)
#[async_trait]
pub trait SignaturePortal: Send + Sync {
    async fn authenticate(&self) -> Result<()>;

    /// Attach a document with the contract metadata and the default signer
    async fn attach(
        &self,
        document: &Path,
        contract: &NewContract,
        default_signer: &str,
    ) -> Result<Outcome<()>>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Inbox polled for signed-contract attachments
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Open and authenticate the mailbox connection
    async fn connect(&self) -> Result<()>;

    /// Extract PDF attachments from unread matching messages and mark them read
    async fn fetch_signed_contracts(&self) -> Result<Vec<FinalizedContract>>;

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

/// Outbound email channel
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    async fn authenticate(&self) -> Result<()>;

    async fn send_new_contracts(&self, contracts: &[NewContract]) -> Result<()>;

    async fn send_report(&self, report: &RunReport) -> Result<()>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Messaging channel for the daily summary and error alerts
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn authenticate(&self) -> Result<()>;

    async fn send_daily_summary(&self, contracts: &[NewContract]) -> Result<()>;

    async fn send_error_alert(&self, message: &str) -> Result<()>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ending_on() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let window = DateWindow::ending_on(today, 1);
        assert_eq!(window.from, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(window.to, today);

        let same_day = DateWindow::ending_on(today, -3);
        assert_eq!(same_day.from, today);
    }

    #[test]
    fn test_window_saturates_on_huge_lookback() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let window = DateWindow::ending_on(today, 200_000_000);
        assert_eq!(window.from, NaiveDate::MIN);
        assert_eq!(window.to, today);

        let window = DateWindow::ending_on(today, i64::MAX);
        assert!(window.from <= window.to);
    }

    #[test]
    fn test_outcome_conversion() {
        let done: Outcome<u8> = Outcome::Done(1);
        assert!(done.is_done());
        assert_eq!(done.or_else_err(|r| r), Ok(1));

        let missing: Outcome<u8> = Outcome::Unavailable("not found".to_string());
        assert_eq!(missing.or_else_err(|r| format!("missing: {r}")), Err("missing: not found".to_string()));
    }
}
