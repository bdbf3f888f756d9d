use api_client::error::ApiError;
use core_types::CoreError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Person with id {0} not found")]
    NotFound(i64),

    #[error("failed to enrich person: {0}")]
    Enrichment(#[from] ApiError),

    #[error("{0}")]
    Storage(DbError),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(_, message) => ServiceError::Validation(message),
        }
    }
}

impl ServiceError {
    /// Lifts a storage error, turning a missing row into `NotFound` for `id`.
    pub(crate) fn from_db(id: i64, err: DbError) -> Self {
        match err {
            DbError::NotFound => ServiceError::NotFound(id),
            other => ServiceError::Storage(other),
        }
    }
}
