//! EMR entity services
//!
//! Entity models for the clinical and billing records plus the single
//! generic [`EntityService`] that gives each of them the same surface:
//!
//! - GetById with field projection
//! - Get / GetPage with filters, free-text search, sorting and paging
//! - Create, Update, JSON Patch and Delete
//!
//! Services are parametrized over a [`database_layer::Repository`], so the
//! same code runs against Postgres ([`database_layer::PgRepository`]) and
//! the in-memory store used in tests.

pub mod models;
pub mod service;
pub mod services;

pub use models::*;
pub use service::*;
pub use services::*;
