//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`EntryError`] returned when a purchase or donation entry is refused.
//! - [`FlowError`] returned when a guided flow transition is not allowed.
//! - [`StoreError`] returned by a [`LedgerStore`] that could not read or write.
//! - [`DirectoryError`] returned when a campaign directory is malformed.
//!
//! An [`EntryError`] or [`FlowError`] always means nothing was recorded: the
//! ledger and the flow are left exactly as they were.
//!
//!  [`LedgerStore`]: crate::LedgerStore
use thiserror::Error;

use crate::flow::FlowStep;

/// Reasons an entry (guided or manual) is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("A campaign must be selected")]
    MissingCampaign,
    #[error("\"{0}\" is not a known campaign")]
    UnknownCampaign(String),
}

/// Guided flow errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Cannot do that while in {actual} (expected {expected})")]
    UnexpectedState { expected: FlowStep, actual: FlowStep },
    #[error(transparent)]
    Entry(#[from] EntryError),
}

/// Persistence errors. The tracker logs them and keeps going with the
/// in-memory ledger.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Campaign directory errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Campaign name must not be empty")]
    EmptyName,
    #[error("\"{0}\" already present!")]
    DuplicateName(String),
    #[error("\"{0}\" is reserved for unlisted campaigns")]
    ReservedName(String),
}
