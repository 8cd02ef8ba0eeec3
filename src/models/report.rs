//! # Run Result Report
//!
//! Immutable summary of one run, persisted locally and emailed.

use super::contract::{FinalizedContract, NewContract};
use crate::constants::REPORT_DATE_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run day, `dd/mm/YYYY`
    pub date: String,
    pub new_contracts: Vec<NewContract>,
    pub finalized_contracts: Vec<FinalizedContract>,
    pub total_new: usize,
    pub total_finalized: usize,
}

impl RunReport {
    pub fn build(
        date: NaiveDate,
        new_contracts: &[NewContract],
        finalized_contracts: &[FinalizedContract],
    ) -> Self {
        Self {
            date: date.format(REPORT_DATE_FORMAT).to_string(),
            new_contracts: new_contracts.to_vec(),
            finalized_contracts: finalized_contracts.to_vec(),
            total_new: new_contracts.len(),
            total_finalized: finalized_contracts.len(),
        }
    }

    /// Finalized contracts whose write-back to the source portal succeeded
    pub fn confirmed_count(&self) -> usize {
        self.finalized_contracts
            .iter()
            .filter(|c| c.reconciliation.is_confirmed())
            .count()
    }
}
