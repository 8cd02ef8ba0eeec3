//! Email notifier over an authenticated STARTTLS relay.

use super::compose::{self, EmailMessage};
use super::traits::EmailNotifier;
use crate::config::SmtpConfig;
use crate::constants::systems;
use crate::error::{Result, SignBotError};
use crate::models::{NewContract, RunReport};
use async_trait::async_trait;
use chrono::Local;
use lettre::message::header::ContentType;
use lettre::message::Mailbox as Address;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::Mutex;
use tracing::info;

type Transport = AsyncSmtpTransport<Tokio1Executor>;

pub struct SmtpNotifier {
    config: SmtpConfig,
    transport: Mutex<Option<Transport>>,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            transport: Mutex::new(None),
        }
    }

    fn sender(&self) -> &str {
        if self.config.from.is_empty() {
            &self.config.user
        } else {
            &self.config.from
        }
    }

    /// Report recipients, falling back to the registration team
    fn report_recipients(&self) -> Vec<&str> {
        if self.config.report_recipients.is_empty() {
            vec![self.config.registration_recipient.as_str()]
        } else {
            self.config
                .report_recipients
                .iter()
                .map(String::as_str)
                .collect()
        }
    }

    async fn deliver(&self, recipients: &[&str], message: EmailMessage) -> Result<()> {
        let transport = self
            .transport
            .lock()
            .await
            .clone()
            .ok_or_else(|| SignBotError::session(systems::SMTP, "relay not authenticated"))?;

        let email = build_message(self.sender(), recipients, message)?;
        transport.send(email).await?;
        Ok(())
    }
}

fn build_message(from: &str, recipients: &[&str], message: EmailMessage) -> Result<Message> {
    let mut builder = Message::builder()
        .from(from.parse::<Address>()?)
        .subject(message.subject)
        .header(ContentType::TEXT_HTML);
    for recipient in recipients {
        builder = builder.to(recipient.parse::<Address>()?);
    }
    Ok(builder.body(message.html_body)?)
}

#[async_trait]
impl EmailNotifier for SmtpNotifier {
    async fn authenticate(&self) -> Result<()> {
        let transport = Transport::starttls_relay(&self.config.host)
            .map_err(|e| SignBotError::session(systems::SMTP, e.to_string()))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .build();

        let reachable = transport
            .test_connection()
            .await
            .map_err(|e| SignBotError::session(systems::SMTP, e.to_string()))?;
        if !reachable {
            return Err(SignBotError::session(
                systems::SMTP,
                format!("relay {}:{} refused the connection", self.config.host, self.config.port),
            ));
        }

        *self.transport.lock().await = Some(transport);
        info!(host = %self.config.host, port = self.config.port, "Mail relay connection established");
        Ok(())
    }

    async fn send_new_contracts(&self, contracts: &[NewContract]) -> Result<()> {
        let message = compose::new_contracts_email(contracts, Local::now());
        self.deliver(&[self.config.registration_recipient.as_str()], message)
            .await?;
        info!(count = contracts.len(), "New-contracts notification emailed to registration team");
        Ok(())
    }

    async fn send_report(&self, report: &RunReport) -> Result<()> {
        let recipients = self.report_recipients();
        self.deliver(&recipients, compose::report_email(report)).await?;
        info!(recipients = recipients.len(), date = %report.date, "Daily report emailed");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.transport.lock().await.take();
        Ok(())
    }
}
