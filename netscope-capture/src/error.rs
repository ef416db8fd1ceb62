//! Error types for the wrapped network primitives
//!
//! These are domain failures of the calls being observed. The capture
//! layer passes them through to callers untouched.

use thiserror::Error;

/// Why a fetch call rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure; displays as the bare message
    #[error("{0}")]
    Network(String),

    #[error("The operation was aborted.")]
    Aborted,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Why an XHR handle rejected a call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XhrError {
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}
