//! # External Collaborator Clients
//!
//! Every external system the bot drives sits behind a trait in [`traits`];
//! the orchestrator only ever holds trait objects.
//!
//! ## Implementations
//!
//! - **MaxyconClient**: source portal (listing, download, status write-back)
//! - **SignClient**: signature portal (document attachment)
//! - **SmtpNotifier**: email notifications over an authenticated relay
//! - **WhatsAppNotifier**: chat summaries and error alerts
//!
//! The browser-driven clients share [`browser::BrowserSession`], the only
//! place that speaks WebDriver. The mailbox reader lives in
//! [`crate::mailbox`].

pub mod browser;
pub mod compose;
pub mod maxycon;
pub mod sign;
pub mod smtp;
pub mod traits;
pub mod whatsapp;

pub use maxycon::MaxyconClient;
pub use sign::SignClient;
pub use smtp::SmtpNotifier;
pub use traits::{
    ChatNotifier, DateWindow, EmailNotifier, Mailbox, Outcome, SignaturePortal, SourcePortal,
};
pub use whatsapp::WhatsAppNotifier;
