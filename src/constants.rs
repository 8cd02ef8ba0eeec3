//! # System Constants
//!
//! Names and formats shared by the orchestrator, the clients and the
//! storage layer.

/// Identity of each external system, used in errors and structured logs
pub mod systems {
    pub const MAXYCON: &str = "maxycon";
    pub const SIGN: &str = "sign";
    pub const SMTP: &str = "email";
    pub const MAILBOX: &str = "mailbox";
    pub const WHATSAPP: &str = "whatsapp";
    pub const STORAGE: &str = "storage";
}

/// Run lifecycle operations recorded in structured logs
pub mod operations {
    pub const PROCESS_NEW_CONTRACT: &str = "process_new_contract";
    pub const PROCESS_FINALIZED_CONTRACTS: &str = "process_finalized_contracts";
    pub const RECONCILE_FINALIZED_CONTRACT: &str = "reconcile_finalized_contract";
    pub const NOTIFY_NEW_CONTRACTS: &str = "notify_new_contracts";
    pub const DAILY_SUMMARY: &str = "daily_summary";
    pub const ERROR_ALERT: &str = "error_alert";
    pub const PERSIST_REPORT: &str = "persist_report";
    pub const EMAIL_REPORT: &str = "email_report";
}

/// Day format used by the portals and the report record
pub const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Timestamp embedded in stored file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const PDF_EXTENSION: &str = "pdf";
