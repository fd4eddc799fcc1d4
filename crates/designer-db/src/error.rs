//! Error types for the `MongoDB` store.
//!
//! [`DbError`] carries driver failures with the operation that raised them
//! and converts into the catalog's [`StoreError`] at the trait boundary.

use designer_catalog::StoreError;
use serde::de::Error as _;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `MongoDB` driver operation failed.
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// A document could not be converted between JSON and BSON.
    #[error("BSON conversion error: {0}")]
    Conversion(String),

    /// A multi-document transaction failed and was aborted.
    #[error("transaction aborted: {0}")]
    Transaction(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bson::extjson::de::Error> for DbError {
    fn from(err: bson::extjson::de::Error) -> Self {
        Self::Conversion(err.to_string())
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conversion(message) => Self::Serialization(serde_json::Error::custom(message)),
            DbError::Transaction(message) => Self::Transaction(message),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_onto_store_errors() {
        let store: StoreError = DbError::Transaction("write conflict".to_owned()).into();
        assert!(matches!(store, StoreError::Transaction(_)));

        let store: StoreError = DbError::Conversion("bad $date".to_owned()).into();
        assert!(matches!(store, StoreError::Serialization(_)));

        let store: StoreError = DbError::Config("no host".to_owned()).into();
        assert!(matches!(store, StoreError::Unavailable(message) if message.contains("no host")));
    }
}
