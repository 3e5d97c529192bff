//! Entity metadata
//!
//! Every persisted record type implements [`Entity`], exposing a static table
//! of named field accessors. The table is what the dynamic query builder uses
//! to resolve filter and sort property names at runtime; it is built at
//! compile time by [`impl_entity!`](crate::impl_entity).

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::value::{FieldKind, FieldValue};

/// A named accessor for one scalar field of `E`
pub struct Field<E> {
    /// Rust field name; also the column name and the serialized key
    pub name: &'static str,
    pub kind: FieldKind,
    /// Included in free-text search
    pub searchable: bool,
    pub get: fn(&E) -> FieldValue,
}

impl<E> Field<E> {
    pub fn value(&self, entity: &E) -> FieldValue {
        (self.get)(entity)
    }

    /// Case-insensitive match that also accepts PascalCase/camelCase names
    pub fn matches(&self, name: &str) -> bool {
        normalize_name(self.name) == normalize_name(name)
    }
}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("searchable", &self.searchable)
            .finish()
    }
}

/// `visit_date`, `VisitDate` and `visitDate` all normalize to `visitdate`
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A persisted record type identified by a UUID
pub trait Entity:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + Unpin + 'static
{
    /// Display name used in logs, e.g. `DayVisit`
    const NAME: &'static str;
    /// Backing table
    const TABLE: &'static str;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);

    /// Field accessor table; the first entry is always `id`
    fn fields() -> &'static [Field<Self>];

    fn field(name: &str) -> Option<&'static Field<Self>> {
        Self::fields().iter().find(|f| f.matches(name))
    }

    fn searchable_fields() -> Vec<&'static Field<Self>> {
        Self::fields().iter().filter(|f| f.searchable).collect()
    }
}

/// Implement [`Entity`] for a struct with an `id: Uuid` field
///
/// ```rust
/// use database_layer::impl_entity;
/// use serde::{Deserialize, Serialize};
/// use uuid::Uuid;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Currency {
///     pub id: Uuid,
///     pub code: String,
///     pub is_default: bool,
/// }
///
/// impl_entity!(Currency, table = "currencies", fields = [
///     id: Uuid,
///     code: Text [searchable],
///     is_default: Bool,
/// ]);
/// ```
#[macro_export]
macro_rules! impl_entity {
    (
        $entity:ident, table = $table:literal, fields = [
            $( $field:ident : $kind:ident $( [$flag:ident] )? ),* $(,)?
        ]
    ) => {
        impl $crate::entity::Entity for $entity {
            const NAME: &'static str = stringify!($entity);
            const TABLE: &'static str = $table;

            fn id(&self) -> $crate::Uuid {
                self.id
            }

            fn set_id(&mut self, id: $crate::Uuid) {
                self.id = id;
            }

            fn fields() -> &'static [$crate::entity::Field<Self>] {
                static FIELDS: &[$crate::entity::Field<$entity>] = &[
                    $(
                        $crate::entity::Field {
                            name: stringify!($field),
                            kind: $crate::value::FieldKind::$kind,
                            searchable: $crate::impl_entity!(@searchable $($flag)?),
                            get: |e: &$entity| $crate::value::FieldValue::from(e.$field.clone()),
                        }
                    ),*
                ];
                FIELDS
            }
        }
    };
    (@searchable) => { false };
    (@searchable searchable) => { true };
}
