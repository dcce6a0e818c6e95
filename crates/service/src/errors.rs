use std::error::Error as StdError;

use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Failures surfaced by every fleet service operation.
///
/// Store-originated failures carry the innermost message the store produced,
/// unmodified, so trigger and constraint text reaches the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    StoreRejected(String),
    #[error("{0}")]
    NotSupported(String),
    #[error("Trip {0} not found.")]
    TripNotFound(i32),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("statement references unbound parameter @{0}")]
    Binding(String),
    #[error("result does not match the store contract: {0}")]
    Schema(String),
}

impl FleetError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            FleetError::InvalidInput(_) => 2001,
            FleetError::NotSupported(_) => 2002,
            FleetError::TripNotFound(_) => 2003,
            FleetError::Binding(_) => 2004,
            FleetError::StoreRejected(_) => 2100,
            FleetError::Unavailable(_) => 2101,
            FleetError::Schema(_) => 2102,
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for failures raised by the store itself (constraints, triggers, routines).
    pub fn is_store_rejection(&self) -> bool {
        matches!(self, FleetError::StoreRejected(_))
    }
}

/// Follow `source()` to the innermost error and render it.
pub fn root_message(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

fn sqlx_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => root_message(other),
    }
}

fn from_sqlx_ref(err: &sqlx::Error) -> FleetError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => FleetError::Unavailable(sqlx_message(err)),
        _ => FleetError::StoreRejected(sqlx_message(err)),
    }
}

impl From<sqlx::Error> for FleetError {
    fn from(err: sqlx::Error) -> Self {
        from_sqlx_ref(&err)
    }
}

impl From<DbErr> for FleetError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::Conn(RuntimeErr::SqlxError(inner)) => FleetError::Unavailable(sqlx_message(inner)),
            DbErr::Exec(RuntimeErr::SqlxError(inner)) | DbErr::Query(RuntimeErr::SqlxError(inner)) => {
                from_sqlx_ref(inner)
            }
            DbErr::Conn(RuntimeErr::Internal(msg)) => FleetError::Unavailable(msg.clone()),
            DbErr::Exec(RuntimeErr::Internal(msg)) | DbErr::Query(RuntimeErr::Internal(msg)) => {
                FleetError::StoreRejected(msg.clone())
            }
            DbErr::ConnectionAcquire(_) => FleetError::Unavailable(root_message(&err)),
            DbErr::Custom(msg) => FleetError::StoreRejected(msg.clone()),
            _ => FleetError::StoreRejected(root_message(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_runtime_messages() {
        let err: FleetError = DbErr::Query(RuntimeErr::Internal("Maintenance cost cannot be negative (got -5.00).".into())).into();
        assert_eq!(err, FleetError::StoreRejected("Maintenance cost cannot be negative (got -5.00).".into()));
        assert_eq!(err.to_string(), "Maintenance cost cannot be negative (got -5.00).");
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        let err: FleetError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, FleetError::Unavailable(_)));
        assert_eq!(err.code(), 2101);
    }

    #[test]
    fn root_message_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = sqlx::Error::Io(io);
        assert_eq!(root_message(&err), "connection refused");
    }

    #[test]
    fn trip_not_found_names_the_trip() {
        assert_eq!(FleetError::TripNotFound(42).to_string(), "Trip 42 not found.");
    }
}
