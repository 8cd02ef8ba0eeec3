//! # Resilience Module
//!
//! Failure containment for the flaky network and browser flows the bot
//! drives. The retry policy is a value passed to the call sites that need
//! it; there is no process-wide instance.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signbot::resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(60));
//!
//! let value = policy
//!     .execute("download_contract", || async { Ok::<_, String>("contract.pdf") })
//!     .await?;
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

pub mod retry_policy;

pub use retry_policy::RetryPolicy;
