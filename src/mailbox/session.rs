//! IMAP session seam.
//!
//! The `imap` crate is blocking, so every call on [`ImapSession`] runs on
//! the blocking pool with the connection parked behind a std mutex.

use crate::config::ImapConfig;
use crate::constants::systems;
use crate::error::{Result, SignBotError};
use async_trait::async_trait;
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

type ImapConnection = imap::Session<native_tls::TlsStream<TcpStream>>;

/// Minimal mailbox protocol the reader needs
#[async_trait]
pub trait MailSession: Send + Sync {
    async fn login(&self) -> Result<()>;

    async fn select(&self, folder: &str) -> Result<()>;

    /// Sequence numbers of unread messages whose subject contains `subject`, ascending
    async fn search_unseen(&self, subject: &str) -> Result<Vec<u32>>;

    /// Full RFC 822 source of a message, without touching its flags
    async fn fetch_raw(&self, id: u32) -> Result<Vec<u8>>;

    async fn mark_seen(&self, id: u32) -> Result<()>;

    async fn logout(&self) -> Result<()>;
}

pub struct ImapSession {
    config: ImapConfig,
    connection: Arc<Mutex<Option<ImapConnection>>>,
}

impl std::fmt::Debug for ImapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImapSession")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("user", &self.config.user)
            .finish()
    }
}

impl ImapSession {
    pub fn new(config: ImapConfig) -> Self {
        Self {
            config,
            connection: Arc::new(Mutex::new(None)),
        }
    }

    async fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut ImapConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| SignBotError::Mailbox("IMAP connection lock poisoned".to_string()))?;
            let session = guard
                .as_mut()
                .ok_or_else(|| SignBotError::session(systems::MAILBOX, "not connected"))?;
            op(session)
        })
        .await
        .map_err(|e| SignBotError::Mailbox(format!("IMAP task failed: {e}")))?
    }
}

/// IMAP SEARCH criteria for unread messages with a subject fragment
pub(crate) fn unseen_subject_query(subject: &str) -> String {
    let escaped = subject.replace('\\', "\\\\").replace('"', "\\\"");
    format!("UNSEEN SUBJECT \"{escaped}\"")
}

#[async_trait]
impl MailSession for ImapSession {
    async fn login(&self) -> Result<()> {
        let ImapConfig {
            host,
            port,
            user,
            password,
            ..
        } = self.config.clone();
        let connection = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || {
            let tls = native_tls::TlsConnector::builder()
                .build()
                .map_err(|e| SignBotError::session(systems::MAILBOX, e.to_string()))?;
            let client = imap::connect((host.as_str(), port), host.as_str(), &tls)
                .map_err(|e| SignBotError::session(systems::MAILBOX, e.to_string()))?;
            let session = client
                .login(&user, &password)
                .map_err(|(e, _)| SignBotError::session(systems::MAILBOX, e.to_string()))?;

            let mut guard = connection
                .lock()
                .map_err(|_| SignBotError::Mailbox("IMAP connection lock poisoned".to_string()))?;
            *guard = Some(session);
            Ok::<_, SignBotError>(())
        })
        .await
        .map_err(|e| SignBotError::Mailbox(format!("IMAP task failed: {e}")))??;

        info!(host = %self.config.host, user = %self.config.user, "Mailbox connection established");
        Ok(())
    }

    async fn select(&self, folder: &str) -> Result<()> {
        let folder = folder.to_string();
        self.with_connection(move |session| {
            session.select(&folder)?;
            Ok(())
        })
        .await
    }

    async fn search_unseen(&self, subject: &str) -> Result<Vec<u32>> {
        let query = unseen_subject_query(subject);
        let ids = self
            .with_connection(move |session| Ok(session.search(&query)?))
            .await?;
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        debug!(count = ids.len(), "Unread matching messages");
        Ok(ids)
    }

    async fn fetch_raw(&self, id: u32) -> Result<Vec<u8>> {
        self.with_connection(move |session| {
            let messages = session.fetch(id.to_string(), "BODY.PEEK[]")?;
            messages
                .iter()
                .find_map(|m| m.body().map(<[u8]>::to_vec))
                .ok_or_else(|| SignBotError::Mailbox(format!("message {id} has no body")))
        })
        .await
    }

    async fn mark_seen(&self, id: u32) -> Result<()> {
        self.with_connection(move |session| {
            session.store(id.to_string(), "+FLAGS (\\Seen)")?;
            Ok(())
        })
        .await
    }

    async fn logout(&self) -> Result<()> {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| SignBotError::Mailbox("IMAP connection lock poisoned".to_string()))?;
            match guard.take() {
                Some(mut session) => Ok(session.logout()?),
                None => Ok(()),
            }
        })
        .await
        .map_err(|e| SignBotError::Mailbox(format!("IMAP task failed: {e}")))?
    }
}
