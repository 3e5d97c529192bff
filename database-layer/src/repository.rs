//! Persistence seam for entity services
//!
//! [`Repository`] is the unit-of-work boundary every entity service talks to.
//! [`InMemoryRepository`] keeps rows in insertion order and evaluates
//! [`DynamicQuery`] directly; [`crate::postgres::PgRepository`] translates
//! the same query to SQL.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::DynamicQuery;

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetch by primary key
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<E>>;

    /// Filtered, sorted and paged rows
    async fn find(&self, query: &DynamicQuery<E>) -> DatabaseResult<Vec<E>>;

    /// Rows matching the query's filters and search, ignoring sort and paging
    async fn count(&self, query: &DynamicQuery<E>) -> DatabaseResult<u64>;

    /// Persist a new row; a nil id is replaced by a store-generated one
    async fn insert(&self, entity: E) -> DatabaseResult<Uuid>;

    /// Full replace of row `id`; `false` when no such row exists
    async fn update(&self, id: Uuid, entity: E) -> DatabaseResult<bool>;

    /// Remove row `id`; `false` when no such row exists
    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;
}

#[async_trait]
impl<E, R> Repository<E> for Arc<R>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<E>> {
        (**self).find_by_id(id).await
    }

    async fn find(&self, query: &DynamicQuery<E>) -> DatabaseResult<Vec<E>> {
        (**self).find(query).await
    }

    async fn count(&self, query: &DynamicQuery<E>) -> DatabaseResult<u64> {
        (**self).count(query).await
    }

    async fn insert(&self, entity: E) -> DatabaseResult<Uuid> {
        (**self).insert(entity).await
    }

    async fn update(&self, id: Uuid, entity: E) -> DatabaseResult<bool> {
        (**self).update(id, entity).await
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        (**self).delete(id).await
    }
}

/// Process-local store, natural order is insertion order
#[derive(Debug)]
pub struct InMemoryRepository<E> {
    rows: RwLock<Vec<E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Seed with existing rows, kept as given
    pub fn with_rows(rows: Vec<E>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<E>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn find(&self, query: &DynamicQuery<E>) -> DatabaseResult<Vec<E>> {
        let rows = self.rows.read().await;
        debug!(entity = E::NAME, rows = rows.len(), "Evaluating query in memory");
        Ok(query.apply(rows.iter().cloned()))
    }

    async fn count(&self, query: &DynamicQuery<E>) -> DatabaseResult<u64> {
        let rows = self.rows.read().await;
        let count = rows.iter().filter(|row| query.matches(row)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn insert(&self, mut entity: E) -> DatabaseResult<Uuid> {
        if entity.id().is_nil() {
            entity.set_id(Uuid::new_v4());
        }
        let id = entity.id();

        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == id) {
            return Err(DatabaseError::DuplicateId(id));
        }
        rows.push(entity);
        Ok(id)
    }

    async fn update(&self, id: Uuid, mut entity: E) -> DatabaseResult<bool> {
        entity.set_id(id);
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id() == id) {
            Some(row) => {
                *row = entity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCriterion, FilterOperator};
    use crate::query::QueryParams;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Room {
        id: Uuid,
        label: String,
        beds: i64,
    }

    crate::impl_entity!(Room, table = "rooms", fields = [
        id: Uuid,
        label: Text [searchable],
        beds: Int,
    ]);

    fn room(label: &str, beds: i64) -> Room {
        Room {
            id: Uuid::nil(),
            label: label.to_string(),
            beds,
        }
    }

    #[tokio::test]
    async fn test_insert_generates_id_for_nil() {
        let repo = InMemoryRepository::new();
        let id = repo.insert(room("A1", 2)).await.unwrap();
        assert!(!id.is_nil());
        assert_eq!(repo.find_by_id(id).await.unwrap().map(|r| r.label), Some("A1".to_string()));
    }

    #[tokio::test]
    async fn test_insert_keeps_given_id_and_rejects_duplicates() {
        let repo = InMemoryRepository::new();
        let mut row = room("A1", 2);
        row.id = Uuid::new_v4();

        assert_eq!(repo.insert(row.clone()).await.unwrap(), row.id);
        assert!(matches!(
            repo.insert(row.clone()).await,
            Err(DatabaseError::DuplicateId(id)) if id == row.id
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_rows() {
        let repo = InMemoryRepository::new();
        let id = repo.insert(room("A1", 2)).await.unwrap();

        assert!(repo.update(id, room("A1-renamed", 3)).await.unwrap());
        let updated = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.beds, 3);

        assert!(!repo.update(Uuid::new_v4(), room("ghost", 1)).await.unwrap());
        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_find_and_count() {
        let repo = InMemoryRepository::new();
        for (label, beds) in [("A1", 2), ("A2", 4), ("B1", 1), ("B2", 6)] {
            repo.insert(room(label, beds)).await.unwrap();
        }

        let query = QueryParams::new(1, 1)
            .with_filter(FilterCriterion::new("beds", FilterOperator::GreaterThan, "1"))
            .with_sort("beds", "desc")
            .compile::<Room>(100)
            .unwrap();

        let page = repo.find(&query).await.unwrap();
        assert_eq!(page.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(), vec!["B2"]);
        assert_eq!(repo.count(&query).await.unwrap(), 3);
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Slot {
        id: Uuid,
        wing: Option<String>,
    }

    crate::impl_entity!(Slot, table = "slots", fields = [id: Uuid, wing: Text]);

    #[tokio::test]
    async fn test_null_placement_matches_sql() {
        let repo = InMemoryRepository::new();
        for wing in [Some("East"), None] {
            repo.insert(Slot {
                id: Uuid::nil(),
                wing: wing.map(str::to_string),
            })
            .await
            .unwrap();
        }

        let ascending = QueryParams::new(1, 1).with_sort("wing", "asc").compile::<Slot>(100).unwrap();
        assert_eq!(repo.find(&ascending).await.unwrap()[0].wing, None);
        assert!(crate::sql::SqlQuery::select(&ascending)
            .sql()
            .contains("ORDER BY wing ASC NULLS FIRST"));

        let descending = QueryParams::new(1, 1).with_sort("wing", "desc").compile::<Slot>(100).unwrap();
        assert_eq!(repo.find(&descending).await.unwrap()[0].wing.as_deref(), Some("East"));
        assert!(crate::sql::SqlQuery::select(&descending)
            .sql()
            .contains("ORDER BY wing DESC NULLS LAST"));
    }

    #[tokio::test]
    async fn test_shared_through_arc() {
        let repo = Arc::new(InMemoryRepository::new());
        let id = repo.insert(room("C1", 1)).await.unwrap();
        let shared = Arc::clone(&repo);
        assert!(Repository::<Room>::find_by_id(&shared, id).await.unwrap().is_some());
    }
}
