// Unit-of-work scope for write operations
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{Postgres, Transaction};
use tracing::{debug, error};

/// One transaction per operation; dropped without `commit` it rolls back
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
    label: &'static str,
}

impl UnitOfWork {
    /// Begin a new transaction
    pub async fn begin(pool: &DatabasePool, label: &'static str) -> DatabaseResult<Self> {
        debug!(operation = label, "Beginning transaction");

        let tx = pool.pool().begin().await.map_err(|e| {
            error!(operation = label, "Failed to begin transaction: {}", e);
            DatabaseError::TransactionFailed(format!("Failed to begin transaction: {e}"))
        })?;

        Ok(Self { tx, label })
    }

    /// The connection to run statements on
    pub fn connection(&mut self) -> &mut sqlx::PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> DatabaseResult<()> {
        let label = self.label;
        self.tx.commit().await.map_err(|e| {
            error!(operation = label, "Failed to commit transaction: {}", e);
            DatabaseError::TransactionFailed(format!("Failed to commit transaction: {e}"))
        })?;
        debug!(operation = label, "Transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> DatabaseResult<()> {
        let label = self.label;
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(format!("Failed to roll back: {e}")))?;
        debug!(operation = label, "Transaction rolled back");
        Ok(())
    }
}
