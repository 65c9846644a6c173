use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use std::fmt::Display;
use thiserror::Error;

/// Failures reported by repositories.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Verified lookup or update of an id that is not stored
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A saved entity references a row that does not exist
    #[error("Invalid reference: {0}")]
    EntityReference(String),

    /// The row is still referenced and cannot be removed
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Errors returned by the catalog services.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    ResourceNotFound(String),

    /// Referential integrity conflict while deleting
    #[error("{0}")]
    Database(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn not_found(id: impl Display) -> Self {
        CatalogError::ResourceNotFound(format!("Id not found {id}"))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convert CatalogError to AppError for standardized error responses
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ResourceNotFound(msg) => AppError::NotFound(msg),
            CatalogError::Database(msg) => AppError::BadRequest(msg),
            CatalogError::Store(StoreError::NotFound { entity, id }) => {
                AppError::NotFound(format!("{entity} {id} not found"))
            }
            CatalogError::Store(StoreError::EntityReference(msg)) => {
                AppError::UnprocessableEntity(msg)
            }
            CatalogError::Store(StoreError::IntegrityViolation(msg)) => AppError::Conflict(msg),
            CatalogError::Store(StoreError::Database(msg)) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
