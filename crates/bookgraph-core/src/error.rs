use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate {field} in {collection}: {value}")]
    Duplicate {
        collection: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Document not found in {collection}: {id}")]
    NotFound { collection: &'static str, id: Uuid },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
