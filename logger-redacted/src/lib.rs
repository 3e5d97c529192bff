//! Logging for the EMR data-access layer
//!
//! Installs the process-wide `tracing` subscriber and redacts personally
//! identifiable information out of query input before it reaches a log line.
//! Free-text search terms and filter values routinely carry patient names,
//! phone numbers or record numbers, so services pass them through
//! [`PiiRedactor::redact`] first.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{PiiRedactor, RedactionConfig};
//!
//! let redactor = PiiRedactor::new(RedactionConfig {
//!     hash_for_correlation: false,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! assert_eq!(redactor.redact("ssn 123-45-6789"), "ssn ***-**-****");
//! ```

pub mod config;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;
