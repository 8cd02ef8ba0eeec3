//! # Mailbox Reader
//!
//! Polls the inbox for signed contracts: unread messages whose subject
//! matches the configured pattern are fetched, their PDF attachments are
//! stored in the finalized-contracts directory, and the message is marked
//! read. A message that fails to process stays unread for the next run.

pub mod attachment;
pub mod reader;
pub mod session;

pub use attachment::{extract_pdf_attachments, PdfAttachment};
pub use reader::MailboxReader;
pub use session::{ImapSession, MailSession};
