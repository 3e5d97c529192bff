//! Configuration for the EMR data-access layer
//!
//! Settings are layered with the `config` crate, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional file (YAML, TOML or JSON, picked by extension)
//! 3. `EMR__`-prefixed environment variables, `__` separating sections
//!
//! ```text
//! EMR__DATABASE__URL=postgres://emr@localhost/emr
//! EMR__QUERY__MAX_PAGE_SIZE=500
//! EMR__LOGGING__JSON=true
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::EmrConfig;
//!
//! let config = EmrConfig::load(Some("emr.yaml")).unwrap();
//! println!("max page size: {}", config.query.max_page_size);
//! ```

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;
