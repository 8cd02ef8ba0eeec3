//! # Run Types
//!
//! State carried through a single run and the outcome handed back to the
//! caller.

use crate::models::{FinalizedContract, NewContract, RunReport};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Init,
    Fetch,
    ProcessNew,
    ProcessFinalized,
    Notify,
    Report,
    Terminal,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetch => "fetch",
            Self::ProcessNew => "process_new",
            Self::ProcessFinalized => "process_finalized",
            Self::Notify => "notify",
            Self::Report => "report",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one run. Built empty for every run and dropped after it.
#[derive(Debug, Clone)]
pub struct RunState {
    phase: RunPhase,
    /// Day the run started, used for the listing window and the report
    pub date: NaiveDate,
    pub started_at: DateTime<Local>,
    /// New contracts the signature portal accepted
    pub processed: Vec<NewContract>,
    /// Signed copies received this run, with their write-back status
    pub finalized: Vec<FinalizedContract>,
}

impl RunState {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            phase: RunPhase::Init,
            date: started_at.date_naive(),
            started_at,
            processed: Vec::new(),
            finalized: Vec::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn enter(&mut self, phase: RunPhase) {
        info!(from = %self.phase, to = %phase, "Run phase transition");
        self.phase = phase;
    }
}

/// How a run ended. Runs never return errors to their caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunReport),
    Aborted { phase: RunPhase, error: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Aborted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_starts_empty_in_init() {
        let state = RunState::new(Local::now());
        assert_eq!(state.phase(), RunPhase::Init);
        assert!(state.processed.is_empty());
        assert!(state.finalized.is_empty());
        assert_eq!(state.date, state.started_at.date_naive());
    }

    #[test]
    fn test_phase_transitions_are_tracked() {
        let mut state = RunState::new(Local::now());
        state.enter(RunPhase::Fetch);
        state.enter(RunPhase::ProcessNew);
        assert_eq!(state.phase(), RunPhase::ProcessNew);
        assert_eq!(state.phase().to_string(), "process_new");
    }

    #[test]
    fn test_outcome_accessors() {
        let aborted = RunOutcome::Aborted {
            phase: RunPhase::Fetch,
            error: "timeout".to_string(),
        };
        assert!(!aborted.is_completed());
        assert!(aborted.report().is_none());

        let report = RunReport::build(Local::now().date_naive(), &[], &[]);
        let completed = RunOutcome::Completed(report.clone());
        assert_eq!(completed.report(), Some(&report));
    }
}
