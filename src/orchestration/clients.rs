//! Bundle of collaborators a single run drives.

use crate::client::{
    ChatNotifier, EmailNotifier, Mailbox, MaxyconClient, SignClient, SignaturePortal,
    SmtpNotifier, SourcePortal, WhatsAppNotifier,
};
use crate::config::BotConfig;
use crate::mailbox::{ImapSession, MailboxReader};
use crate::storage::{DocumentStore, LocalStorage};
use std::sync::Arc;

/// Every external system behind its trait. Built fresh for each run.
pub struct BotClients {
    pub source: Box<dyn SourcePortal>,
    pub signature: Box<dyn SignaturePortal>,
    pub mailbox: Box<dyn Mailbox>,
    pub email: Box<dyn EmailNotifier>,
    pub chat: Box<dyn ChatNotifier>,
    pub storage: Arc<dyn DocumentStore>,
}

impl BotClients {
    /// Production wiring: WebDriver portals, IMAP mailbox, SMTP relay and
    /// WhatsApp Web, all storing under the configured directories
    pub fn from_config(config: &BotConfig) -> Self {
        let storage: Arc<dyn DocumentStore> =
            Arc::new(LocalStorage::new(config.storage.clone()));
        let session = ImapSession::new(config.imap.clone());

        Self {
            source: Box::new(MaxyconClient::new(
                config.maxycon.clone(),
                config.webdriver.clone(),
            )),
            signature: Box::new(SignClient::new(config.sign.clone(), config.webdriver.clone())),
            mailbox: Box::new(MailboxReader::new(
                config.imap.clone(),
                session,
                Arc::clone(&storage),
            )),
            email: Box::new(SmtpNotifier::new(config.smtp.clone())),
            chat: Box::new(WhatsAppNotifier::new(
                config.whatsapp.clone(),
                config.webdriver.clone(),
            )),
            storage,
        }
    }
}
