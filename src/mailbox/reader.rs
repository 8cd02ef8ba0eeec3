use super::attachment::extract_pdf_attachments;
use super::session::MailSession;
use crate::client::Mailbox;
use crate::config::ImapConfig;
use crate::constants::systems;
use crate::error::Result;
use crate::logging::log_error;
use crate::models::FinalizedContract;
use crate::storage::DocumentStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// [`Mailbox`] that turns unread signed-contract emails into stored PDFs
pub struct MailboxReader<S: MailSession> {
    config: ImapConfig,
    session: S,
    store: Arc<dyn DocumentStore>,
}

impl<S: MailSession> MailboxReader<S> {
    pub fn new(config: ImapConfig, session: S, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            session,
            store,
        }
    }

    /// Store every PDF of one message, then mark it read
    async fn process_message(&self, id: u32) -> Result<Vec<FinalizedContract>> {
        let raw = self.session.fetch_raw(id).await?;
        let attachments = extract_pdf_attachments(&raw)?;
        debug!(message = id, attachments = attachments.len(), "Message parsed");

        let mut contracts = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            let path = self
                .store
                .save_signed_attachment(&attachment.file_name, &attachment.contents)
                .await?;
            let stored_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or(attachment.file_name);
            contracts.push(FinalizedContract::received(stored_name, path));
        }

        self.session.mark_seen(id).await?;
        Ok(contracts)
    }
}

#[async_trait]
impl<S: MailSession> Mailbox for MailboxReader<S> {
    async fn connect(&self) -> Result<()> {
        self.session.login().await
    }

    async fn fetch_signed_contracts(&self) -> Result<Vec<FinalizedContract>> {
        self.session.select(&self.config.folder).await?;
        let ids = self
            .session
            .search_unseen(&self.config.subject_pattern)
            .await?;

        let mut found = Vec::new();
        for id in ids {
            match self.process_message(id).await {
                Ok(mut contracts) => found.append(&mut contracts),
                Err(e) => log_error(
                    systems::MAILBOX,
                    "fetch_signed_contracts",
                    &e.to_string(),
                    Some(&format!("message {id} left unread")),
                ),
            }
        }

        info!(count = found.len(), folder = %self.config.folder, "Signed contracts received");
        Ok(found)
    }

    async fn disconnect(&self) -> Result<()> {
        self.session.logout().await
    }
}
