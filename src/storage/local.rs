use super::DocumentStore;
use crate::config::StorageConfig;
use crate::constants::{FILE_TIMESTAMP_FORMAT, PDF_EXTENSION};
use crate::error::{Result, SignBotError};
use crate::models::RunReport;
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Filesystem-backed [`DocumentStore`]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    config: StorageConfig,
}

impl LocalStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn layout(&self) -> [&Path; 4] {
        [
            &self.config.new_contracts_dir,
            &self.config.finalized_contracts_dir,
            &self.config.reports_dir,
            &self.config.logs_dir,
        ]
    }

    async fn list_pdfs(dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !fs::try_exists(dir).await? {
            return Ok(names);
        }
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(PDF_EXTENSION));
            if is_pdf {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Keep a file-name fragment free of path separators and control characters
fn sanitize_fragment(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Final path component of an attachment name, or `None` if nothing usable remains
fn attachment_file_name(raw: &str) -> Option<String> {
    let normalized = raw.replace('\\', "/");
    let last = normalized.rsplit('/').next().unwrap_or_default();
    let cleaned = sanitize_fragment(last);
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        None
    } else {
        Some(cleaned)
    }
}

#[async_trait]
impl DocumentStore for LocalStorage {
    async fn ensure_layout(&self) -> Result<()> {
        for dir in self.layout() {
            fs::create_dir_all(dir).await.map_err(|e| {
                SignBotError::Storage(format!("cannot create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }

    async fn save_new_contract(&self, source: &Path, contract_number: &str) -> Result<PathBuf> {
        let file_name = format!(
            "contrato_{}_{}.{PDF_EXTENSION}",
            sanitize_fragment(contract_number),
            Local::now().format(FILE_TIMESTAMP_FORMAT)
        );
        let destination = self.config.new_contracts_dir.join(file_name);

        fs::create_dir_all(&self.config.new_contracts_dir).await?;
        fs::copy(source, &destination).await.map_err(|e| {
            error!(contract = %contract_number, error = %e, "Failed to save contract");
            SignBotError::Storage(format!(
                "copy {} -> {}: {e}",
                source.display(),
                destination.display()
            ))
        })?;

        info!(contract = %contract_number, path = %destination.display(), "Contract saved");
        Ok(destination)
    }

    async fn save_signed_attachment(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
        let name = attachment_file_name(file_name).ok_or_else(|| {
            SignBotError::Storage(format!("unusable attachment name '{file_name}'"))
        })?;
        let destination = self.config.finalized_contracts_dir.join(name);

        fs::create_dir_all(&self.config.finalized_contracts_dir).await?;
        fs::write(&destination, contents).await?;

        info!(path = %destination.display(), bytes = contents.len(), "Signed contract stored");
        Ok(destination)
    }

    async fn write_report(&self, report: &RunReport) -> Result<PathBuf> {
        let stamp = Local::now().format(FILE_TIMESTAMP_FORMAT).to_string();
        let json_path = self.config.reports_dir.join(format!("relatorio_{stamp}.json"));

        fs::create_dir_all(&self.config.reports_dir).await?;
        let body = serde_json::to_vec_pretty(report)?;
        fs::write(&json_path, body).await?;

        if !report.new_contracts.is_empty() {
            let csv_path = self
                .config
                .reports_dir
                .join(format!("relatorio_{stamp}_novos.csv"));
            let mut writer = csv::Writer::from_writer(Vec::new());
            for contract in &report.new_contracts {
                writer.serialize(contract)?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| SignBotError::Serialization(format!("CSV flush error: {e}")))?;
            fs::write(&csv_path, bytes).await?;
        }

        info!(path = %json_path.display(), total_new = report.total_new, total_finalized = report.total_finalized, "Report persisted");
        Ok(json_path)
    }

    async fn list_new_contracts(&self) -> Result<Vec<String>> {
        Self::list_pdfs(&self.config.new_contracts_dir).await
    }

    async fn list_finalized_contracts(&self) -> Result<Vec<String>> {
        Self::list_pdfs(&self.config.finalized_contracts_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinalizedContract, NewContract};
    use chrono::NaiveDate;

    fn storage_in(root: &Path) -> LocalStorage {
        LocalStorage::new(StorageConfig {
            new_contracts_dir: root.join("contratos/novos"),
            finalized_contracts_dir: root.join("contratos/finalizados"),
            reports_dir: root.join("relatorios"),
            logs_dir: root.join("logs"),
        })
    }

    fn contract(number: &str) -> NewContract {
        NewContract {
            id: "7".to_string(),
            number: number.to_string(),
            client: "Cliente A".to_string(),
            entry_date: "18/10/2026".to_string(),
            status: "Pendente Assinatura".to_string(),
        }
    }

    #[test]
    fn test_attachment_name_strips_directories() {
        assert_eq!(attachment_file_name("../../etc/passwd.pdf").as_deref(), Some("passwd.pdf"));
        assert_eq!(attachment_file_name("C:\\temp\\assinado.pdf").as_deref(), Some("assinado.pdf"));
        assert_eq!(attachment_file_name(".."), None);
        assert_eq!(attachment_file_name("   "), None);
    }

    #[tokio::test]
    async fn test_ensure_layout_creates_directories() {
        let root = tempfile::tempdir().unwrap();
        let storage = storage_in(root.path());
        storage.ensure_layout().await.unwrap();
        for dir in storage.layout() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
    }

    #[tokio::test]
    async fn test_save_new_contract_copies_with_timestamped_name() {
        let root = tempfile::tempdir().unwrap();
        let storage = storage_in(root.path());
        let download = root.path().join("contrato_7.pdf");
        std::fs::write(&download, b"%PDF-1.7").unwrap();

        let saved = storage.save_new_contract(&download, "2026/0042").await.unwrap();

        let name = saved.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("contrato_2026-0042_"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.7");
        assert!(download.exists());
        assert_eq!(storage.list_new_contracts().await.unwrap(), vec![name.to_string()]);
    }

    #[tokio::test]
    async fn test_save_new_contract_missing_source_is_storage_error() {
        let root = tempfile::tempdir().unwrap();
        let storage = storage_in(root.path());
        let err = storage
            .save_new_contract(&root.path().join("missing.pdf"), "1")
            .await
            .unwrap_err();
        assert!(matches!(err, SignBotError::Storage(_)));
    }

    #[tokio::test]
    async fn test_write_report_json_and_csv() {
        let root = tempfile::tempdir().unwrap();
        let storage = storage_in(root.path());
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let finalized = FinalizedContract::received("b.pdf", root.path().join("b.pdf"));
        let report = RunReport::build(date, &[contract("123")], &[finalized]);

        let path = storage.write_report(&report).await.unwrap();

        let persisted: RunReport =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(persisted, report);

        let csv_path = path.with_file_name(format!(
            "{}_novos.csv",
            path.file_stem().unwrap().to_str().unwrap()
        ));
        let csv = std::fs::read_to_string(csv_path).unwrap();
        assert!(csv.starts_with("id,number,client,entry_date,status"));
        assert!(csv.contains("7,123,Cliente A,18/10/2026,Pendente Assinatura"));
    }

    #[tokio::test]
    async fn test_listing_ignores_non_pdf_and_missing_dirs() {
        let root = tempfile::tempdir().unwrap();
        let storage = storage_in(root.path());
        assert!(storage.list_finalized_contracts().await.unwrap().is_empty());

        storage.save_signed_attachment("b.PDF", b"x").await.unwrap();
        storage.save_signed_attachment("a.pdf", b"x").await.unwrap();
        storage.save_signed_attachment("notes.txt", b"x").await.unwrap();

        assert_eq!(
            storage.list_finalized_contracts().await.unwrap(),
            vec!["a.pdf".to_string(), "b.PDF".to_string()]
        );
    }
}
