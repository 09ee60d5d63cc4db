//! Error types for the planar subdivision engine.
//!
//! The teacher crate reaches for an ad hoc `Box<dyn std::error::Error>` plus
//! `simple_error::bail!`, but only declares `thiserror` as a dependency.
//! This crate follows the declared dependency instead and defines a single
//! typed error enum, matching the distinction drawn in spec §7 between
//! argument/property errors (real `Result`s) and mutator pre-condition
//! failures (which are `Option`/`bool`, never errors; see `builder.rs`).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubdivisionError {
    #[error("argument error: {reason}")]
    Argument { reason: String },

    #[error("property error: {reason}")]
    Property { reason: String },

    #[error("internal invariant violation: {reason} (this indicates a bug, or an epsilon too small for the input)")]
    Internal { reason: String },
}

impl SubdivisionError {
    pub fn argument(reason: impl Into<String>) -> Self {
        Self::Argument { reason: reason.into() }
    }

    pub fn property(reason: impl Into<String>) -> Self {
        Self::Property { reason: reason.into() }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal { reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, SubdivisionError>;
