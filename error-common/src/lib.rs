//! Common error handling for the EMR data-access layer
//!
//! Every entity service reports failures through a single application error,
//! [`EmrError`], carrying a human-readable message. There are no structured
//! error codes: the message text is what callers match on, and the fixed
//! messages live in [`codes::messages`].
//!
//! # Example
//!
//! ```rust
//! use error_common::{EmrError, messages};
//!
//! fn check_page_size(page_size: i64) -> Result<(), EmrError> {
//!     if page_size < 1 {
//!         return Err(EmrError::validation(messages::PAGE_SIZE_INVALID));
//!     }
//!     Ok(())
//! }
//!
//! let err = check_page_size(0).unwrap_err();
//! assert_eq!(err.to_string(), "Page size invalid!");
//! ```

pub mod types;
pub mod codes;

pub use types::*;
pub use codes::*;
