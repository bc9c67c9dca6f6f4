// Copyright (c) 2024 Mike Tsao

//! Errors that the engine reports to callers.
//!
//! Nothing in the per-sample mixing path returns an error. These come from
//! building things (envelopes, oscillators, settings), looking up pitches, and
//! writing diagnostics.

use derive_builder::UninitializedFieldError;
use thiserror::Error;

/// The crate's recoverable errors.
#[derive(Debug, Error)]
pub enum LaserharpError {
    /// A scientific-pitch name like "A4" wasn't in the frequency table.
    #[error("unknown note name '{0}'")]
    UnknownNote(String),

    /// A builder was given a parameter outside its legal range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A builder was missing a required field.
    #[error(transparent)]
    UninitializedField(#[from] UninitializedFieldError),

    /// Settings were syntactically fine but semantically wrong.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[allow(missing_docs)]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[allow(missing_docs)]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
impl From<String> for LaserharpError {
    fn from(value: String) -> Self {
        Self::InvalidParameter(value)
    }
}
