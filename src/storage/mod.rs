//! # Local Storage
//!
//! Durable home for everything a run produces: downloaded contracts,
//! signed copies received by email, and the run reports.
//!
//! ```text
//! contratos/novos/        new contracts, timestamped per download
//! contratos/finalizados/  signed copies, named as attached
//! relatorios/             report JSON plus a CSV of new contracts
//! logs/                   daily structured logs
//! ```

pub mod local;

use crate::error::Result;
use crate::models::RunReport;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use local::LocalStorage;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create every directory of the layout that does not exist yet
    async fn ensure_layout(&self) -> Result<()>;

    /// Copy a downloaded contract into the new-contracts directory
    async fn save_new_contract(&self, source: &Path, contract_number: &str) -> Result<PathBuf>;

    /// Write a signed attachment into the finalized-contracts directory
    async fn save_signed_attachment(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf>;

    /// Persist the run report, returning the path of the JSON record
    async fn write_report(&self, report: &RunReport) -> Result<PathBuf>;

    async fn list_new_contracts(&self) -> Result<Vec<String>>;

    async fn list_finalized_contracts(&self) -> Result<Vec<String>>;
}
