// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Verifai.
//
// Business outcomes ("no document found", "no MRZ read") are not errors and
// never appear here; they are modelled as ordinary return values.

use thiserror::Error;

use crate::types::ServiceKind;

/// Top-level error type for all Verifai operations.
#[derive(Debug, Error)]
pub enum VerifaiError {
    // -- Dispatch errors --
    #[error("network request failed: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no {0} endpoint registered")]
    NoEndpointAvailable(ServiceKind),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    // -- Image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classification of errors for a caller-side retry policy.
///
/// The dispatch layer never retries on its own; this only tells the caller
/// whether trying again could plausibly succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connection blip or timeout, safe to retry.
    Transient,
    /// Retrying the same request will fail the same way.
    Permanent,
}

impl VerifaiError {
    /// Classify this error for retry decisions.
    pub fn class(&self) -> ErrorClass {
        match self {
            VerifaiError::Network(_) | VerifaiError::Timeout(_) => ErrorClass::Transient,
            VerifaiError::Io(io_err) => match io_err.kind() {
                std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::Interrupted => ErrorClass::Transient,
                _ => ErrorClass::Permanent,
            },
            VerifaiError::MalformedResponse(_)
            | VerifaiError::NoEndpointAvailable(_)
            | VerifaiError::Config(_)
            | VerifaiError::ImageError(_)
            | VerifaiError::Serialization(_) => ErrorClass::Permanent,
        }
    }

    /// Shorthand for `self.class() == ErrorClass::Transient`.
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VerifaiError>;
