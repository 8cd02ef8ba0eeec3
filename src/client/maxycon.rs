//! Source portal client driven through the Maxycon web UI.

use super::browser::{wait_for_file, BrowserProfile, BrowserSession};
use super::traits::{DateWindow, Outcome, SourcePortal};
use crate::config::{MaxyconConfig, WebDriverConfig};
use crate::constants::{systems, REPORT_DATE_FORMAT};
use crate::error::{Result, SignBotError};
use crate::models::NewContract;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thirtyfour::By;
use tracing::{info, warn};

mod selectors {
    pub const LOGIN_USER: &str = "usuario";
    pub const LOGIN_PASSWORD: &str = "senha";
    pub const LOGIN_BUTTON: &str = "btn-login";
    pub const FILTER_FROM: &str = "data_inicio";
    pub const FILTER_TO: &str = "data_fim";
    pub const FILTER_STATUS: &str = "status_contrato";
    pub const SEARCH_BUTTON: &str = "buscar-contratos";
    pub const RESULTS_TABLE: &str = "tabela-contratos";
    pub const DOWNLOAD_BUTTON: &str = "download-pdf";
    pub const FINALIZE_SEARCH: &str = "busca-arquivo";
    pub const FINALIZE_SEARCH_BUTTON: &str = "btn-buscar-arquivo";
    pub const FINALIZE_STATUS: &str = "novo_status";
    pub const FINALIZE_SAVE: &str = "salvar-status";
    pub const SIGNED_UPLOAD_INPUT: &str = "upload-assinado";
    pub const SIGNED_UPLOAD_CONFIRM: &str = "confirmar-upload";
}

/// Columns of the contracts table, in page order
const CONTRACT_COLUMNS: usize = 5;

pub struct MaxyconClient {
    config: MaxyconConfig,
    download_wait: Duration,
    browser: BrowserSession,
}

impl MaxyconClient {
    pub fn new(config: MaxyconConfig, webdriver: WebDriverConfig) -> Self {
        let download_wait = webdriver.download_wait();
        let profile = BrowserProfile {
            download_dir: Some(config.download_dir.clone()),
            user_data_dir: None,
        };
        Self {
            browser: BrowserSession::new(systems::MAXYCON, webdriver, profile),
            download_wait,
            config,
        }
    }

    fn page(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    fn expected_download(&self, contract_id: &str) -> PathBuf {
        self.config
            .download_dir
            .join(format!("contrato_{contract_id}.pdf"))
    }

    /// Open the finalization page and locate the contract by its file name
    async fn open_finalization(&self, file_name: &str) -> Result<()> {
        self.browser.open(&self.page("contratos/finalizacao")).await?;
        self.browser
            .wait_for(By::Id(selectors::FINALIZE_SEARCH))
            .await?;
        self.browser.fill(selectors::FINALIZE_SEARCH, file_name).await?;
        self.browser.click(selectors::FINALIZE_SEARCH_BUTTON).await
    }
}

/// Map one table row onto a contract; short rows are rejected
pub(crate) fn contract_from_row(cells: &[String]) -> Option<NewContract> {
    if cells.len() < CONTRACT_COLUMNS {
        return None;
    }
    Some(NewContract {
        id: cells[0].clone(),
        number: cells[1].clone(),
        client: cells[2].clone(),
        entry_date: cells[3].clone(),
        status: cells[4].clone(),
    })
}

#[async_trait]
impl SourcePortal for MaxyconClient {
    async fn authenticate(&self) -> Result<()> {
        self.browser.start().await?;
        self.browser.open(&self.config.url).await?;
        self.browser
            .wait_for(By::Id(selectors::LOGIN_USER))
            .await
            .map_err(|e| SignBotError::session(systems::MAXYCON, format!("login page: {e}")))?;
        self.browser
            .fill(selectors::LOGIN_USER, &self.config.user)
            .await?;
        self.browser
            .fill(selectors::LOGIN_PASSWORD, &self.config.password)
            .await?;
        self.browser.click(selectors::LOGIN_BUTTON).await?;

        info!("Maxycon login completed");
        Ok(())
    }

    async fn list_pending(&self, window: DateWindow, status: &str) -> Result<Vec<NewContract>> {
        self.browser.open(&self.page("contratos")).await?;

        let from = window.from.format(REPORT_DATE_FORMAT).to_string();
        let to = window.to.format(REPORT_DATE_FORMAT).to_string();
        self.browser.fill(selectors::FILTER_FROM, &from).await?;
        self.browser.fill(selectors::FILTER_TO, &to).await?;
        self.browser
            .select_option(selectors::FILTER_STATUS, status)
            .await?;
        self.browser.click(selectors::SEARCH_BUTTON).await?;

        let rows = self.browser.table_rows(selectors::RESULTS_TABLE).await?;
        let mut contracts = Vec::with_capacity(rows.len());
        for cells in rows {
            match contract_from_row(&cells) {
                Some(contract) => contracts.push(contract),
                None => warn!(cells = ?cells, "Skipping malformed contract row"),
            }
        }

        info!(count = contracts.len(), from = %from, to = %to, status = %status, "Pending contracts listed");
        Ok(contracts)
    }

    async fn download(&self, contract_id: &str) -> Result<Outcome<PathBuf>> {
        let target = self.expected_download(contract_id);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            tokio::fs::remove_file(&target).await?;
        }

        self.browser
            .open(&self.page(&format!("contratos/{contract_id}")))
            .await?;
        self.browser
            .wait_for(By::Id(selectors::DOWNLOAD_BUTTON))
            .await?
            .click()
            .await?;

        if wait_for_file(&target, self.download_wait).await {
            info!(contract_id = %contract_id, path = %target.display(), "Contract downloaded");
            Ok(Outcome::Done(target))
        } else {
            Ok(Outcome::Unavailable(format!(
                "no PDF at {} after {}s",
                target.display(),
                self.download_wait.as_secs()
            )))
        }
    }

    async fn update_status(&self, file_name: &str, status: &str) -> Result<()> {
        self.open_finalization(file_name).await?;
        self.browser
            .select_option(selectors::FINALIZE_STATUS, status)
            .await?;
        self.browser.click(selectors::FINALIZE_SAVE).await?;

        info!(file_name = %file_name, status = %status, "Contract status updated");
        Ok(())
    }

    async fn upload_signed(&self, path: &Path, file_name: &str) -> Result<()> {
        self.open_finalization(file_name).await?;
        self.browser
            .attach_file(selectors::SIGNED_UPLOAD_INPUT, path)
            .await?;
        self.browser.click(selectors::SIGNED_UPLOAD_CONFIRM).await?;

        info!(file_name = %file_name, "Signed contract uploaded");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.browser.quit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_contract_from_row() {
        let row = cells(&["42", "2026-0042", "Cliente A", "18/10/2026", "Pendente Assinatura"]);
        let contract = contract_from_row(&row).unwrap();
        assert_eq!(contract.id, "42");
        assert_eq!(contract.number, "2026-0042");
        assert_eq!(contract.client, "Cliente A");
        assert_eq!(contract.entry_date, "18/10/2026");
    }

    #[test]
    fn test_short_row_is_rejected() {
        assert!(contract_from_row(&cells(&["42", "2026-0042"])).is_none());
    }

    #[test]
    fn test_download_target_and_pages() {
        let config = MaxyconConfig {
            url: "https://sistema.maxycon.com/".to_string(),
            download_dir: PathBuf::from("downloads"),
            ..MaxyconConfig::default()
        };
        let client = MaxyconClient::new(config, WebDriverConfig::default());
        assert_eq!(
            client.expected_download("77"),
            PathBuf::from("downloads/contrato_77.pdf")
        );
        assert_eq!(client.page("contratos"), "https://sistema.maxycon.com/contratos");
    }
}
