pub mod contract;
pub mod report;

pub use contract::{FinalizedContract, NewContract, ReconciliationStatus};
pub use report::RunReport;
