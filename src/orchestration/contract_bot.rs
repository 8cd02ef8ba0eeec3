//! # Contract Bot
//!
//! One pass of the signature workflow:
//!
//! ```text
//! Init -> Fetch -> ProcessNew -> ProcessFinalized -> Notify -> Report -> Terminal
//! ```
//!
//! ## Failure containment
//!
//! - A new contract that still fails after its retries is dropped from the
//!   run; the loop moves on to the next one.
//! - A signed copy whose write-back fails stays in the finalized list with
//!   `ReconciliationStatus::Failed`.
//! - Each notification channel fails on its own, without affecting the
//!   other channel or the report.
//! - Session establishment, listing, mailbox access, report persistence and
//!   report email abort the run. The abort is logged once and a single
//!   best-effort chat alert carries the error text.

use super::clients::BotClients;
use super::types::{RunOutcome, RunPhase, RunState};
use crate::client::DateWindow;
use crate::config::BotConfig;
use crate::constants::{operations, systems};
use crate::error::{Result, SignBotError};
use crate::logging::{log_channel_operation, log_contract_operation, log_error};
use crate::models::{FinalizedContract, NewContract, ReconciliationStatus, RunReport};
use crate::resilience::RetryPolicy;
use chrono::Local;
use tracing::{debug, info, warn};

/// Run parameters taken from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Status filter used when listing new contracts
    pub pending_status: String,
    /// Status written back once a signed copy is received
    pub finalized_status: String,
    pub lookback_days: i64,
    pub default_signer: String,
}

impl From<&BotConfig> for RunSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            pending_status: config.maxycon.pending_status.clone(),
            finalized_status: config.maxycon.finalized_status.clone(),
            lookback_days: config.maxycon.lookback_days,
            default_signer: config.sign.default_signer.clone(),
        }
    }
}

pub struct ContractBot {
    clients: BotClients,
    retry: RetryPolicy,
    settings: RunSettings,
}

impl ContractBot {
    pub fn new(clients: BotClients, retry: RetryPolicy, settings: RunSettings) -> Self {
        Self {
            clients,
            retry,
            settings,
        }
    }

    /// Production bot with freshly built clients
    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(
            BotClients::from_config(config),
            RetryPolicy::from(&config.retry),
            RunSettings::from(config),
        )
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Execute one run. Never returns an error: aborts are reported in the
    /// outcome after the alert has been attempted.
    pub async fn run(&self) -> RunOutcome {
        let mut state = RunState::new(Local::now());
        info!(date = %state.date, "Starting contract processing run");

        let outcome = match self.execute(&mut state).await {
            Ok(report) => {
                state.enter(RunPhase::Terminal);
                info!(
                    total_new = report.total_new,
                    total_finalized = report.total_finalized,
                    confirmed = report.confirmed_count(),
                    "Run finished successfully"
                );
                RunOutcome::Completed(report)
            }
            Err(error) => {
                let phase = state.phase();
                let message = format!("Erro no processamento: {error}");
                log_error("orchestrator", phase.as_str(), &message, None);
                self.send_alert(&message).await;
                RunOutcome::Aborted {
                    phase,
                    error: error.to_string(),
                }
            }
        };

        self.close_clients().await;
        outcome
    }

    async fn execute(&self, state: &mut RunState) -> Result<RunReport> {
        self.initialize().await?;

        state.enter(RunPhase::Fetch);
        let window = DateWindow::ending_on(state.date, self.settings.lookback_days);
        let candidates = self
            .clients
            .source
            .list_pending(window, &self.settings.pending_status)
            .await?;
        info!(count = candidates.len(), from = %window.from, to = %window.to, "Candidate contracts listed");

        state.enter(RunPhase::ProcessNew);
        for contract in &candidates {
            let attempt = self
                .retry
                .execute(operations::PROCESS_NEW_CONTRACT, || {
                    self.process_new_contract(contract)
                })
                .await;
            match attempt {
                Ok(()) => {
                    log_contract_operation(
                        operations::PROCESS_NEW_CONTRACT,
                        &contract.number,
                        "processed",
                        None,
                    );
                    state.processed.push(contract.clone());
                }
                Err(e) => log_error(
                    systems::MAXYCON,
                    operations::PROCESS_NEW_CONTRACT,
                    &e.to_string(),
                    Some(&format!("contract {contract} dropped from this run")),
                ),
            }
        }

        state.enter(RunPhase::ProcessFinalized);
        state.finalized = self
            .retry
            .execute(operations::PROCESS_FINALIZED_CONTRACTS, || {
                self.process_finalized_contracts()
            })
            .await?;

        state.enter(RunPhase::Notify);
        if state.processed.is_empty() {
            debug!("No new contracts processed, notifications skipped");
        } else {
            self.notify(&state.processed).await;
        }

        state.enter(RunPhase::Report);
        let report = RunReport::build(state.date, &state.processed, &state.finalized);
        let path = self.clients.storage.write_report(&report).await?;
        log_channel_operation(
            systems::STORAGE,
            operations::PERSIST_REPORT,
            "written",
            path.to_str(),
        );
        self.clients.email.send_report(&report).await?;
        log_channel_operation(systems::SMTP, operations::EMAIL_REPORT, "sent", None);

        Ok(report)
    }

    async fn initialize(&self) -> Result<()> {
        self.clients.storage.ensure_layout().await?;
        self.clients.source.authenticate().await?;
        self.clients.signature.authenticate().await?;
        self.clients.email.authenticate().await?;
        self.clients.chat.authenticate().await?;
        info!("All sessions established");
        Ok(())
    }

    /// Download, store and attach one contract
    async fn process_new_contract(&self, contract: &NewContract) -> Result<()> {
        let downloaded = self
            .clients
            .source
            .download(&contract.id)
            .await?
            .or_else_err(|reason| SignBotError::DocumentUnavailable {
                contract: contract.number.clone(),
                reason,
            })?;

        let stored = self
            .clients
            .storage
            .save_new_contract(&downloaded, &contract.number)
            .await?;

        self.clients
            .signature
            .attach(&stored, contract, &self.settings.default_signer)
            .await?
            .or_else_err(|reason| SignBotError::ContractRejected {
                contract: contract.number.clone(),
                reason,
            })
    }

    /// One attempt over the mailbox. Items are only kept if the whole attempt succeeds.
    async fn process_finalized_contracts(&self) -> Result<Vec<FinalizedContract>> {
        self.clients.mailbox.connect().await?;
        let received = self.clients.mailbox.fetch_signed_contracts().await?;

        let mut finalized = Vec::with_capacity(received.len());
        for mut item in received {
            item.reconciliation = match self.reconcile(&item).await {
                Ok(()) => {
                    log_contract_operation(
                        operations::RECONCILE_FINALIZED_CONTRACT,
                        &item.file_name,
                        "confirmed",
                        None,
                    );
                    ReconciliationStatus::Confirmed
                }
                Err(e) => {
                    log_error(
                        systems::MAXYCON,
                        operations::RECONCILE_FINALIZED_CONTRACT,
                        &e.to_string(),
                        Some(&item.file_name),
                    );
                    ReconciliationStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            finalized.push(item);
        }
        Ok(finalized)
    }

    async fn reconcile(&self, item: &FinalizedContract) -> Result<()> {
        self.clients
            .source
            .update_status(&item.file_name, &self.settings.finalized_status)
            .await?;
        self.clients
            .source
            .upload_signed(&item.path, &item.file_name)
            .await
    }

    async fn notify(&self, processed: &[NewContract]) {
        match self.clients.email.send_new_contracts(processed).await {
            Ok(()) => log_channel_operation(
                systems::SMTP,
                operations::NOTIFY_NEW_CONTRACTS,
                "sent",
                None,
            ),
            Err(e) => log_error(
                systems::SMTP,
                operations::NOTIFY_NEW_CONTRACTS,
                &e.to_string(),
                None,
            ),
        }

        match self.clients.chat.send_daily_summary(processed).await {
            Ok(()) => {
                log_channel_operation(systems::WHATSAPP, operations::DAILY_SUMMARY, "sent", None)
            }
            Err(e) => log_error(
                systems::WHATSAPP,
                operations::DAILY_SUMMARY,
                &e.to_string(),
                None,
            ),
        }
    }

    async fn send_alert(&self, message: &str) {
        if let Err(e) = self.clients.chat.send_error_alert(message).await {
            log_error(
                systems::WHATSAPP,
                operations::ERROR_ALERT,
                &e.to_string(),
                Some("alert not delivered"),
            );
        }
    }

    async fn close_clients(&self) {
        let results = [
            (systems::MAXYCON, self.clients.source.close().await),
            (systems::SIGN, self.clients.signature.close().await),
            (systems::MAILBOX, self.clients.mailbox.disconnect().await),
            (systems::SMTP, self.clients.email.close().await),
            (systems::WHATSAPP, self.clients.chat.close().await),
        ];
        for (system, result) in results {
            if let Err(e) = result {
                warn!(system = %system, error = %e, "Failed to close session");
            }
        }
    }
}
