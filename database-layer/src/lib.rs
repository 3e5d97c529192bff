//! Data access layer for EMR entities
//!
//! The centre of this crate is the dynamic query builder: a caller supplies
//! [`QueryParams`] (filter criteria, a free-text search term, paging and an
//! optional sort) and the builder validates them against an entity's field
//! table before any store is touched. The resulting [`DynamicQuery`] runs
//! against either store behind the [`Repository`] trait:
//!
//! - [`InMemoryRepository`] evaluates the query directly over a `Vec`
//! - [`PgRepository`] renders it to parameterized PostgreSQL via [`SqlQuery`]
//!
//! Partial updates use RFC 6902 JSON Patch ([`apply_patch`]) and reads can be
//! reduced to a subset of fields with [`project`].
//!
//! # Example
//!
//! ```rust
//! use database_layer::{impl_entity, FilterCriterion, FilterOperator, QueryParams};
//! use serde::{Deserialize, Serialize};
//! use uuid::Uuid;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Ward {
//!     pub id: Uuid,
//!     pub name: String,
//!     pub beds: i64,
//! }
//!
//! impl_entity!(Ward, table = "wards", fields = [
//!     id: Uuid,
//!     name: Text [searchable],
//!     beds: Int,
//! ]);
//!
//! let query = QueryParams::new(1, 10)
//!     .with_filter(FilterCriterion::new("Beds", FilterOperator::GreaterThan, "4"))
//!     .with_sort("name", "desc")
//!     .compile::<Ward>(100)
//!     .unwrap();
//!
//! assert_eq!(query.filters.len(), 1);
//! assert!(QueryParams::new(1, 0).compile::<Ward>(100).is_err());
//! ```

pub mod connection;
pub mod entity;
pub mod error;
pub mod filter;
pub mod patch;
pub mod postgres;
pub mod projection;
pub mod query;
pub mod repository;
pub mod sql;
pub mod transaction;
pub mod value;

pub use connection::{DatabasePool, PoolOptions};
pub use entity::{normalize_name, Entity, Field};
pub use error::{DatabaseError, DatabaseResult};
pub use filter::{CompiledFilter, FilterCriterion, FilterOperator};
pub use patch::{apply_patch, parse_patch};
pub use postgres::PgRepository;
pub use projection::{parse_fields, project};
pub use query::{DynamicQuery, Page, Paged, QueryParams, Sort, SortOrder};
pub use repository::{InMemoryRepository, Repository};
pub use sql::SqlQuery;
pub use transaction::UnitOfWork;
pub use value::{FieldKind, FieldValue};

pub use json_patch::Patch;
pub use uuid::Uuid;
