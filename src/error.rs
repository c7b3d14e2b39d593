//! Error types shared by both vector engines.
//!
//! All failures propagate to the immediate caller of the triggering
//! operation; the engines perform no retries and no logging of their own.
//! After any error the input handle has been consumed, but every other
//! previously existing handle still observes exactly the value it held
//! before the call.

use std::fmt as StdFmt;

// ============================================================================
//  VectorError
// ============================================================================

/// Errors produced by vector operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorError {
    /// A read/write index was at or beyond the vector length, or a
    /// `take`/`slice` bound fell outside `0..=len`.
    IndexOutOfRange {
        /// The offending index or bound.
        index: usize,
        /// The vector length at the time of the call.
        len: usize,
    },

    /// Node allocation failed.
    ///
    /// Surfaced through [`NodeRef::try_new`](crate::policy::NodeRef::try_new),
    /// which is the observable allocation point for fault injection.
    AllocationFailed,
}

impl StdFmt::Display for VectorError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for vector of length {len}")
            }

            Self::AllocationFailed => write!(f, "node allocation failed"),
        }
    }
}

impl std::error::Error for VectorError {}

// ============================================================================
//  UpdateError
// ============================================================================

/// Errors produced by [`try_update`](crate::vector::Vector::try_update).
///
/// Separates engine failures from failures of the user-supplied callback so
/// the caller can recover its own error type unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError<E> {
    /// The engine failed before or while applying the update.
    Vector(VectorError),

    /// The user callback returned an error.
    ///
    /// The element it was inspecting has not been replaced; no handle
    /// observes a partially applied update.
    Callback(E),
}

impl<E> From<VectorError> for UpdateError<E> {
    fn from(error: VectorError) -> Self {
        Self::Vector(error)
    }
}

impl<E: StdFmt::Display> StdFmt::Display for UpdateError<E> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::Vector(error) => write!(f, "{error}"),

            Self::Callback(error) => write!(f, "update callback failed: {error}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for UpdateError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Vector(error) => Some(error),

            Self::Callback(error) => Some(error),
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
