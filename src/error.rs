//! Error types for store access and the streaming decompositions.
//!
//! A single public [`Error`] wraps a private [`ErrorKind`] enum so the
//! variants can evolve without breaking the public surface. Failures are
//! detected as close to the failing operation as possible and reported to the
//! immediate caller; there is no retry and no partial-result recovery. A
//! failed crossproduct or decomposition may leave the destination store
//! partially written, and callers must treat it as invalid.
//!
//! [`faer::linalg::evd::EvdError`] does not implement the standard
//! [`std::error::Error`] trait, so it is wrapped manually.

use crate::element::ElementKind;
use thiserror::Error;

/// Any error produced by this crate.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] pub(crate) ErrorKind);

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Private enum containing the distinct kinds of errors.
#[derive(Error, Debug)]
pub(crate) enum ErrorKind {
    /// A requested region exceeds the store's declared dimensions.
    #[error(
        "region out of bounds: rows {row_start}..{row_end} x cols {col_start}..{col_end} exceeds {nrows}x{ncols} store"
    )]
    OutOfBounds {
        row_start: u64,
        row_end: u64,
        col_start: u64,
        col_end: u64,
        nrows: u64,
        ncols: u64,
    },

    /// Declared dimensions are incompatible with an operation, for example a
    /// destination store whose shape does not match the produced matrix.
    #[error(
        "shape mismatch: expected {expected_rows}x{expected_cols}, found {found_rows}x{found_cols}"
    )]
    ShapeMismatch {
        expected_rows: u64,
        expected_cols: u64,
        found_rows: u64,
        found_cols: u64,
    },

    /// The requested rank is outside 1..=N for the operator's basis size N.
    #[error("invalid rank: requested k = {k} for an operator of dimension {dim}")]
    InvalidRank { k: usize, dim: u64 },

    /// The typed accessor's element kind does not match the store's persisted
    /// element width.
    #[error("element kind mismatch: store holds {stored}, access requested {requested}")]
    ElementMismatch {
        stored: ElementKind,
        requested: ElementKind,
    },

    /// The file is not a recognizable store: bad magic, unknown format
    /// version, unsupported element width, or an inconsistent payload length.
    #[error("invalid store format: {0}")]
    InvalidFormat(String),

    /// An underlying read or write failed; surfaced verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The Lanczos recurrence hit an invariant subspace and no replacement
    /// direction could be found.
    #[error("Lanczos breakdown at step {step}: beta is zero and the basis could not be extended")]
    Breakdown { step: usize },

    /// The dense eigensolve of the tridiagonal matrix failed to converge.
    #[error("eigendecomposition of the tridiagonal matrix failed: {0:?}")]
    Evd(faer::linalg::evd::EvdError),
}

impl Error {
    /// True when the error is a Lanczos breakdown.
    pub fn is_breakdown(&self) -> bool {
        matches!(self.0, ErrorKind::Breakdown { .. })
    }

    /// True for bounds, shape, or rank violations.
    pub fn is_bounds(&self) -> bool {
        matches!(
            self.0,
            ErrorKind::OutOfBounds { .. }
                | ErrorKind::ShapeMismatch { .. }
                | ErrorKind::InvalidRank { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error(ErrorKind::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_message() {
        let error = Error(ErrorKind::OutOfBounds {
            row_start: 2,
            row_end: 5,
            col_start: 0,
            col_end: 4,
            nrows: 4,
            ncols: 4,
        });
        assert_eq!(
            error.to_string(),
            "region out of bounds: rows 2..5 x cols 0..4 exceeds 4x4 store"
        );
        assert!(error.is_bounds());
    }

    #[test]
    fn element_mismatch_message() {
        let error = Error(ErrorKind::ElementMismatch {
            stored: ElementKind::F64,
            requested: ElementKind::F32,
        });
        assert_eq!(
            error.to_string(),
            "element kind mismatch: store holds f64, access requested f32"
        );
    }

    #[test]
    fn breakdown_message() {
        let error = Error(ErrorKind::Breakdown { step: 3 });
        assert_eq!(
            error.to_string(),
            "Lanczos breakdown at step 3: beta is zero and the basis could not be extended"
        );
        assert!(error.is_breakdown());
    }

    #[test]
    fn evd_message_uses_debug_format() {
        let error = Error(ErrorKind::Evd(faer::linalg::evd::EvdError::NoConvergence));
        assert_eq!(
            error.to_string(),
            "eigendecomposition of the tridiagonal matrix failed: NoConvergence"
        );
    }
}
