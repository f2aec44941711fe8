// Error types shared by the pricing, search and service layers
use thiserror::Error;

use crate::payment::PaymentError;
use crate::store::StoreError;

// Local validation failures of the calculator and the search pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    // HTTP status an outer REST surface would answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthenticated => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Store(StoreError::NotFound { .. }) => 404,
            ServiceError::Store(StoreError::Conflict { .. }) => 409,
            ServiceError::InvalidState(_) => 409,
            ServiceError::MissingField(_)
            | ServiceError::InvalidRequest(_)
            | ServiceError::MalformedPayload(_)
            | ServiceError::Validation(_)
            | ServiceError::Payment(_) => 400,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
