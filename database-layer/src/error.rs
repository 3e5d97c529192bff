use error_common::EmrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(uuid::Uuid),
}

impl From<DatabaseError> for EmrError {
    fn from(err: DatabaseError) -> Self {
        EmrError::Database(err.to_string())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
