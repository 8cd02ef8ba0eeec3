//! Signature portal client driven through the Sign web UI.

use super::browser::{BrowserProfile, BrowserSession};
use super::traits::{Outcome, SignaturePortal};
use crate::config::{SignConfig, WebDriverConfig};
use crate::constants::systems;
use crate::error::{Result, SignBotError};
use crate::models::NewContract;
use async_trait::async_trait;
use std::path::Path;
use thirtyfour::By;
use tracing::{info, warn};

mod selectors {
    pub const LOGIN_USER: &str = "login";
    pub const LOGIN_PASSWORD: &str = "password";
    pub const LOGIN_BUTTON: &str = "btn-login";
    pub const UPLOAD_INPUT: &str = "upload-file";
    pub const CLIENT_NAME: &str = "nome_cliente";
    pub const CONTRACT_NUMBER: &str = "numero_contrato";
    pub const START_DATE: &str = "data_inicio";
    pub const SIGNER: &str = "signatario";
    pub const CONFIRM_UPLOAD: &str = "confirmar-upload";
    pub const UPLOAD_ERROR: &str = "erro-upload";
}

pub struct SignClient {
    config: SignConfig,
    browser: BrowserSession,
}

impl SignClient {
    pub fn new(config: SignConfig, webdriver: WebDriverConfig) -> Self {
        Self {
            browser: BrowserSession::new(systems::SIGN, webdriver, BrowserProfile::default()),
            config,
        }
    }

    fn page(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    async fn fill_contract_fields(&self, contract: &NewContract) -> Result<()> {
        for (field, value) in contract_fields(contract) {
            self.browser.fill(field, value).await?;
        }
        Ok(())
    }
}

/// Form fields filled for every attached contract
fn contract_fields(contract: &NewContract) -> [(&'static str, &str); 3] {
    [
        (selectors::CLIENT_NAME, contract.client.as_str()),
        (selectors::CONTRACT_NUMBER, contract.number.as_str()),
        (selectors::START_DATE, contract.entry_date.as_str()),
    ]
}

#[async_trait]
impl SignaturePortal for SignClient {
    async fn authenticate(&self) -> Result<()> {
        self.browser.start().await?;
        self.browser.open(&self.config.url).await?;
        self.browser
            .wait_for(By::Id(selectors::LOGIN_USER))
            .await
            .map_err(|e| SignBotError::session(systems::SIGN, format!("login page: {e}")))?;
        self.browser
            .fill(selectors::LOGIN_USER, &self.config.user)
            .await?;
        self.browser
            .fill(selectors::LOGIN_PASSWORD, &self.config.password)
            .await?;
        self.browser.click(selectors::LOGIN_BUTTON).await?;

        info!("Sign login completed");
        Ok(())
    }

    async fn attach(
        &self,
        document: &Path,
        contract: &NewContract,
        default_signer: &str,
    ) -> Result<Outcome<()>> {
        self.browser.open(&self.page("novo-documento")).await?;
        self.browser
            .attach_file(selectors::UPLOAD_INPUT, document)
            .await?;
        self.fill_contract_fields(contract).await?;
        self.browser
            .select_option(selectors::SIGNER, default_signer)
            .await?;
        self.browser.click(selectors::CONFIRM_UPLOAD).await?;

        // The portal reports validation problems inline instead of failing the request
        if let Ok(banner) = self.browser.find(By::Id(selectors::UPLOAD_ERROR)).await {
            let reason = banner.text().await.unwrap_or_default();
            if !reason.trim().is_empty() {
                warn!(contract = %contract.number, reason = %reason, "Sign rejected the document");
                return Ok(Outcome::Unavailable(reason.trim().to_string()));
            }
        }

        info!(contract = %contract.number, signer = %default_signer, "Contract attached in Sign");
        Ok(Outcome::Done(()))
    }

    async fn close(&self) -> Result<()> {
        self.browser.quit().await
    }
}
