use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// The caller supplied a request that violates a constraint.
    /// The message names the constraint.
    #[error("{0}")]
    InvalidInput(String),

    /// The request was valid but no matching data exists.
    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl RiskError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RiskError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        RiskError::NotFound(msg.into())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for RiskError {
    fn from(e: sqlx::Error) -> Self {
        RiskError::Database(e.to_string())
    }
}

pub type RiskResult<T> = Result<T, RiskError>;
