//! Chat notifier posting into a WhatsApp Web group.
//!
//! The session lives in a persistent Chrome profile, so the QR code only
//! has to be scanned once per machine. `authenticate` waits for the chat
//! list to show up and fails if the profile is not linked.

use super::browser::{xpath_literal, BrowserProfile, BrowserSession};
use super::compose;
use super::traits::ChatNotifier;
use crate::config::{WebDriverConfig, WhatsAppConfig};
use crate::constants::systems;
use crate::error::{Result, SignBotError};
use crate::models::NewContract;
use async_trait::async_trait;
use chrono::Local;
use std::time::Duration;
use thirtyfour::By;
use tracing::{info, warn};

const CHAT_LIST_XPATH: &str = "//div[@id='pane-side']";
const MESSAGE_BOX_XPATH: &str = "//footer//div[@contenteditable='true']";
const GROUP_OPEN_TIMEOUT: Duration = Duration::from_secs(20);

pub struct WhatsAppNotifier {
    config: WhatsAppConfig,
    browser: BrowserSession,
}

impl WhatsAppNotifier {
    pub fn new(config: WhatsAppConfig, webdriver: WebDriverConfig) -> Self {
        let profile = BrowserProfile {
            download_dir: None,
            user_data_dir: Some(config.profile_dir.clone()),
        };
        Self {
            browser: BrowserSession::new(systems::WHATSAPP, webdriver, profile),
            config,
        }
    }

    async fn post_to_group(&self, message: &str) -> Result<()> {
        let group_xpath = group_title_xpath(&self.config.group);
        self.browser
            .wait_for_within(By::XPath(group_xpath.as_str()), GROUP_OPEN_TIMEOUT)
            .await
            .map_err(|e| {
                SignBotError::notification(
                    systems::WHATSAPP,
                    format!("group '{}' not found: {e}", self.config.group),
                )
            })?
            .click()
            .await?;

        let input = self
            .browser
            .wait_for(By::XPath(MESSAGE_BOX_XPATH))
            .await?;
        for line in message_lines(message) {
            input.send_keys(line).await?;
            input.send_keys("\n").await?;
        }
        Ok(())
    }
}

/// XPath for the group title in the chat list
fn group_title_xpath(group: &str) -> String {
    format!("//span[@title={}]", xpath_literal(group))
}

/// Each non-blank line is typed and sent on its own
fn message_lines(message: &str) -> impl Iterator<Item = &str> {
    message.lines().map(str::trim_end).filter(|line| !line.trim().is_empty())
}

#[async_trait]
impl ChatNotifier for WhatsAppNotifier {
    async fn authenticate(&self) -> Result<()> {
        self.browser.start().await?;
        self.browser.open(&self.config.url).await?;
        self.browser
            .wait_for_within(
                By::XPath(CHAT_LIST_XPATH),
                Duration::from_secs(self.config.login_timeout_seconds),
            )
            .await
            .map_err(|e| {
                SignBotError::session(
                    systems::WHATSAPP,
                    format!(
                        "chat list not visible, is profile {} linked? {e}",
                        self.config.profile_dir.display()
                    ),
                )
            })?;

        info!(group = %self.config.group, "WhatsApp Web session ready");
        Ok(())
    }

    async fn send_daily_summary(&self, contracts: &[NewContract]) -> Result<()> {
        let message = compose::daily_summary_chat(contracts, Local::now());
        self.post_to_group(&message).await?;
        info!(count = contracts.len(), "Daily summary sent via WhatsApp");
        Ok(())
    }

    async fn send_error_alert(&self, error: &str) -> Result<()> {
        let message = compose::error_alert_chat(error, Local::now());
        self.post_to_group(&message).await?;
        warn!(error = %error, "Error alert sent via WhatsApp");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.browser.quit().await
    }
}
