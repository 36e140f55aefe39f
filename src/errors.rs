//! The four error kinds the design calls out: invalid-argument (caller
//! bug, never retried), external (upstream failure, retried on the next
//! poll), internal (unexpected failure, tick skipped), and the
//! table-missing sentinel used exactly once at bootstrap.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("sport_lines table does not exist")]
    TableMissing,
    #[error("no matching row for update")]
    NotFound,
    #[error("internal store error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("external provider error: {0}")]
    External(String),
    #[error("internal provider error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum DeltaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
