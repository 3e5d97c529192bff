//! Persisted EMR record types
//!
//! Each model is a plain row struct. `impl_entity!` registers the fields the
//! query builder may filter and sort on; fields marked `searchable` take part
//! in free-text search.

pub mod billing;
pub mod clinical;

pub use billing::*;
pub use clinical::*;
