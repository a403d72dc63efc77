use sea_orm::error::DbErr;
use sea_orm::TransactionError;

/// Error taxonomy for ledger operations.
///
/// Every validation failure is reported synchronously to the caller of the
/// operation that triggered it; nothing is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    /// Unique-key, enumerated-value or CHECK-style violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Reference to a non-existent row, or a delete blocked by rows that
    /// still reference the target.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Lifecycle rule violation, e.g. a tracking event against a
    /// cancelled shipment or a payment against a void invoice.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ServiceError {
    pub fn constraint(msg: impl Into<String>) -> Self {
        ServiceError::ConstraintViolation(msg.into())
    }

    pub fn foreign_key(msg: impl Into<String>) -> Self {
        ServiceError::ForeignKeyViolation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        ServiceError::InvalidTransition(msg.into())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(errors.to_string())
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
