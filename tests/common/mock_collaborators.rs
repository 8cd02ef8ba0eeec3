//! Recording fakes for every collaborator the bot drives.
//!
//! Each mock is cheap to clone; clones share their recorded calls so a test
//! can keep one handle while the bot owns another.

use async_trait::async_trait;
use signbot::client::{
    ChatNotifier, DateWindow, EmailNotifier, Mailbox, Outcome, SignaturePortal, SourcePortal,
};
use signbot::config::StorageConfig;
use signbot::constants::systems;
use signbot::models::{FinalizedContract, NewContract, RunReport};
use signbot::orchestration::{BotClients, ContractBot, RunSettings};
use signbot::resilience::RetryPolicy;
use signbot::storage::{DocumentStore, LocalStorage};
use signbot::{Result, SignBotError};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

pub fn contract(id: &str, number: &str) -> NewContract {
    NewContract {
        id: id.to_string(),
        number: number.to_string(),
        client: format!("Cliente {number}"),
        entry_date: "19/10/2026".to_string(),
        status: "Pendente Assinatura".to_string(),
    }
}

#[derive(Clone, Default)]
pub struct MockSourcePortal {
    pub pending: Vec<NewContract>,
    pub listing_error: Option<String>,
    pub failing_downloads: HashSet<String>,
    pub fail_status_update: bool,
    pub download_dir: PathBuf,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<AtomicU32>,
}

impl MockSourcePortal {
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl SourcePortal for MockSourcePortal {
    async fn authenticate(&self) -> Result<()> {
        self.calls.lock().await.push("authenticate".to_string());
        Ok(())
    }

    async fn list_pending(&self, _window: DateWindow, status: &str) -> Result<Vec<NewContract>> {
        self.calls.lock().await.push(format!("list_pending:{status}"));
        match &self.listing_error {
            Some(message) => Err(SignBotError::portal(systems::MAXYCON, message.clone())),
            None => Ok(self.pending.clone()),
        }
    }

    async fn download(&self, contract_id: &str) -> Result<Outcome<PathBuf>> {
        self.calls.lock().await.push(format!("download:{contract_id}"));
        if self.failing_downloads.contains(contract_id) {
            return Err(SignBotError::portal(systems::MAXYCON, "download timed out"));
        }
        let path = self.download_dir.join(format!("contrato_{contract_id}.pdf"));
        std::fs::write(&path, b"%PDF-1.4")?;
        Ok(Outcome::Done(path))
    }

    async fn update_status(&self, file_name: &str, status: &str) -> Result<()> {
        self.calls
            .lock()
            .await
            .push(format!("update_status:{file_name}:{status}"));
        if self.fail_status_update {
            return Err(SignBotError::portal(systems::MAXYCON, "status field not found"));
        }
        Ok(())
    }

    async fn upload_signed(&self, _path: &Path, file_name: &str) -> Result<()> {
        self.calls.lock().await.push(format!("upload_signed:{file_name}"));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttachMode {
    #[default]
    Accept,
    /// Portal answers but refuses the document
    Reject,
    /// Session-level failure
    Fail,
}

#[derive(Clone, Default)]
pub struct MockSignaturePortal {
    pub mode: AttachMode,
    pub fail_authenticate: bool,
    pub attached: Arc<Mutex<Vec<(PathBuf, String, String)>>>,
    pub attempts: Arc<AtomicU32>,
    pub closes: Arc<AtomicU32>,
}

#[async_trait]
impl SignaturePortal for MockSignaturePortal {
    async fn authenticate(&self) -> Result<()> {
        if self.fail_authenticate {
            return Err(SignBotError::session(systems::SIGN, "login page did not load"));
        }
        Ok(())
    }

    async fn attach(
        &self,
        document: &Path,
        contract: &NewContract,
        default_signer: &str,
    ) -> Result<Outcome<()>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            AttachMode::Accept => {
                self.attached.lock().await.push((
                    document.to_path_buf(),
                    contract.number.clone(),
                    default_signer.to_string(),
                ));
                Ok(Outcome::Done(()))
            }
            AttachMode::Reject => Ok(Outcome::Unavailable("arquivo inválido".to_string())),
            AttachMode::Fail => Err(SignBotError::portal(systems::SIGN, "upload button missing")),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockMailbox {
    pub signed: Vec<FinalizedContract>,
    /// Connection attempts that fail before the first success
    pub connect_failures: u32,
    pub connects: Arc<AtomicU32>,
    pub disconnects: Arc<AtomicU32>,
}

#[async_trait]
impl Mailbox for MockMailbox {
    async fn connect(&self) -> Result<()> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst);
        if attempt < self.connect_failures {
            return Err(SignBotError::session(systems::MAILBOX, "connection refused"));
        }
        Ok(())
    }

    async fn fetch_signed_contracts(&self) -> Result<Vec<FinalizedContract>> {
        Ok(self.signed.clone())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockEmailNotifier {
    pub fail_new_contracts: bool,
    pub fail_report: bool,
    pub new_contract_batches: Arc<Mutex<Vec<Vec<NewContract>>>>,
    pub reports: Arc<Mutex<Vec<RunReport>>>,
    pub report_attempts: Arc<AtomicU32>,
    pub closes: Arc<AtomicU32>,
}

#[async_trait]
impl EmailNotifier for MockEmailNotifier {
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }

    async fn send_new_contracts(&self, contracts: &[NewContract]) -> Result<()> {
        self.new_contract_batches.lock().await.push(contracts.to_vec());
        if self.fail_new_contracts {
            return Err(SignBotError::notification(systems::SMTP, "relay rejected message"));
        }
        Ok(())
    }

    async fn send_report(&self, report: &RunReport) -> Result<()> {
        self.report_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_report {
            return Err(SignBotError::notification(systems::SMTP, "relay unreachable"));
        }
        self.reports.lock().await.push(report.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockChatNotifier {
    pub fail_summary: bool,
    pub fail_alert: bool,
    pub summaries: Arc<Mutex<Vec<Vec<NewContract>>>>,
    pub alerts: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<AtomicU32>,
}

#[async_trait]
impl ChatNotifier for MockChatNotifier {
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }

    async fn send_daily_summary(&self, contracts: &[NewContract]) -> Result<()> {
        self.summaries.lock().await.push(contracts.to_vec());
        if self.fail_summary {
            return Err(SignBotError::notification(systems::WHATSAPP, "group not found"));
        }
        Ok(())
    }

    async fn send_error_alert(&self, message: &str) -> Result<()> {
        self.alerts.lock().await.push(message.to_string());
        if self.fail_alert {
            return Err(SignBotError::notification(systems::WHATSAPP, "session expired"));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Local storage whose report writes always fail
pub struct ReadOnlyReports(pub LocalStorage);

#[async_trait]
impl DocumentStore for ReadOnlyReports {
    async fn ensure_layout(&self) -> Result<()> {
        self.0.ensure_layout().await
    }

    async fn save_new_contract(&self, source: &Path, contract_number: &str) -> Result<PathBuf> {
        self.0.save_new_contract(source, contract_number).await
    }

    async fn save_signed_attachment(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        self.0.save_signed_attachment(file_name, contents).await
    }

    async fn write_report(&self, _report: &RunReport) -> Result<PathBuf> {
        Err(SignBotError::Storage("reports directory is read-only".to_string()))
    }

    async fn list_new_contracts(&self) -> Result<Vec<String>> {
        self.0.list_new_contracts().await
    }

    async fn list_finalized_contracts(&self) -> Result<Vec<String>> {
        self.0.list_finalized_contracts().await
    }
}

/// A complete set of fakes over a temporary storage root
pub struct Harness {
    pub root: TempDir,
    pub source: MockSourcePortal,
    pub signature: MockSignaturePortal,
    pub mailbox: MockMailbox,
    pub email: MockEmailNotifier,
    pub chat: MockChatNotifier,
    pub fail_report_write: bool,
}

impl Harness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("temp dir");
        let download_dir = root.path().join("downloads");
        std::fs::create_dir_all(&download_dir).expect("download dir");

        Self {
            source: MockSourcePortal {
                download_dir,
                ..MockSourcePortal::default()
            },
            signature: MockSignaturePortal::default(),
            mailbox: MockMailbox::default(),
            email: MockEmailNotifier::default(),
            chat: MockChatNotifier::default(),
            fail_report_write: false,
            root,
        }
    }

    pub fn storage_config(&self) -> StorageConfig {
        let root = self.root.path();
        StorageConfig {
            new_contracts_dir: root.join("contratos/novos"),
            finalized_contracts_dir: root.join("contratos/finalizados"),
            reports_dir: root.join("relatorios"),
            logs_dir: root.join("logs"),
        }
    }

    pub fn settings() -> RunSettings {
        RunSettings {
            pending_status: "Pendente Assinatura".to_string(),
            finalized_status: "Finalizado".to_string(),
            lookback_days: 1,
            default_signer: "Diretoria Jurídica".to_string(),
        }
    }

    /// Received signed copy, written under the finalized directory
    pub fn signed_copy(&self, file_name: &str) -> FinalizedContract {
        let dir = self.storage_config().finalized_contracts_dir;
        std::fs::create_dir_all(&dir).expect("finalized dir");
        let path = dir.join(file_name);
        std::fs::write(&path, b"%PDF-1.4 assinado").expect("signed copy");
        FinalizedContract::received(file_name, path)
    }

    pub fn bot(&self) -> ContractBot {
        let local = LocalStorage::new(self.storage_config());
        let storage: Arc<dyn DocumentStore> = if self.fail_report_write {
            Arc::new(ReadOnlyReports(local))
        } else {
            Arc::new(local)
        };

        let clients = BotClients {
            source: Box::new(self.source.clone()),
            signature: Box::new(self.signature.clone()),
            mailbox: Box::new(self.mailbox.clone()),
            email: Box::new(self.email.clone()),
            chat: Box::new(self.chat.clone()),
            storage,
        };
        ContractBot::new(clients, RetryPolicy::default(), Self::settings())
    }

    pub fn report_files(&self) -> Vec<PathBuf> {
        let dir = self.storage_config().reports_dir;
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        files
    }
}
