// Postgres-backed repository
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use std::marker::PhantomData;
use tracing::{debug, error};
use uuid::Uuid;

use crate::connection::DatabasePool;
use crate::entity::Entity;
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::DynamicQuery;
use crate::repository::Repository;
use crate::sql::SqlQuery;
use crate::transaction::UnitOfWork;

/// Repository over the entity's table; writes run in their own transaction
pub struct PgRepository<E> {
    pool: DatabasePool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> PgRepository<E> {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

fn query_failed(entity: &str, e: sqlx::Error) -> DatabaseError {
    error!(entity = entity, "Query failed: {}", e);
    DatabaseError::QueryFailed(e.to_string())
}

#[async_trait]
impl<E> Repository<E> for PgRepository<E>
where
    E: Entity + for<'r> FromRow<'r, PgRow>,
{
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<E>> {
        let mut sql = SqlQuery::find_by_id::<E>(id);
        debug!(entity = E::NAME, %id, "Executing query: {}", sql.sql());
        sql.build_query_as::<E>()
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| query_failed(E::NAME, e))
    }

    async fn find(&self, query: &DynamicQuery<E>) -> DatabaseResult<Vec<E>> {
        let mut sql = SqlQuery::select(query);
        debug!(entity = E::NAME, "Executing query: {}", sql.sql());
        sql.build_query_as::<E>()
            .fetch_all(self.pool.pool())
            .await
            .map_err(|e| query_failed(E::NAME, e))
    }

    async fn count(&self, query: &DynamicQuery<E>) -> DatabaseResult<u64> {
        let mut sql = SqlQuery::count(query);
        debug!(entity = E::NAME, "Executing query: {}", sql.sql());
        let count: i64 = sql
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.pool())
            .await
            .map_err(|e| query_failed(E::NAME, e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn insert(&self, mut entity: E) -> DatabaseResult<Uuid> {
        if entity.id().is_nil() {
            entity.set_id(Uuid::new_v4());
        }
        let id = entity.id();

        let mut uow = UnitOfWork::begin(&self.pool, "insert").await?;
        let mut sql = SqlQuery::insert(&entity);
        debug!(entity = E::NAME, %id, "Executing command: {}", sql.sql());
        sql.build()
            .execute(uow.connection())
            .await
            .map_err(|e| query_failed(E::NAME, e))?;
        uow.commit().await?;
        Ok(id)
    }

    async fn update(&self, id: Uuid, entity: E) -> DatabaseResult<bool> {
        let mut uow = UnitOfWork::begin(&self.pool, "update").await?;
        let mut sql = SqlQuery::update(id, &entity);
        debug!(entity = E::NAME, %id, "Executing command: {}", sql.sql());
        let rows_affected = sql
            .build()
            .execute(uow.connection())
            .await
            .map_err(|e| query_failed(E::NAME, e))?
            .rows_affected();

        if rows_affected == 0 {
            uow.rollback().await?;
            return Ok(false);
        }
        uow.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut uow = UnitOfWork::begin(&self.pool, "delete").await?;
        let mut sql = SqlQuery::delete::<E>(id);
        debug!(entity = E::NAME, %id, "Executing command: {}", sql.sql());
        let rows_affected = sql
            .build()
            .execute(uow.connection())
            .await
            .map_err(|e| query_failed(E::NAME, e))?
            .rows_affected();

        if rows_affected == 0 {
            uow.rollback().await?;
            return Ok(false);
        }
        uow.commit().await?;
        Ok(true)
    }
}
