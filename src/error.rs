//! Error types for pagechrome
//!
//! Failures in this crate fall into a small taxonomy: the document or a
//! fragment cannot be parsed, a fragment fetch fails, a placeholder is
//! missing from the host document, or the readiness gate times out. All
//! errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.
//!
//! Fragment failures are deliberately recoverable: the orchestrator logs
//! them and continues with the remaining independent loads. The display
//! string for a fetch failure carries both the resource URL and the HTTP
//! status so log lines are actionable on their own.

use thiserror::Error;

/// Result type alias for pagechrome operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for pagechrome
#[derive(Error, Debug)]
pub enum Error {
  /// The host document or a fetched fragment could not be parsed as HTML
  #[error("Invalid HTML: {message}")]
  InvalidHtml { message: String },

  /// A fragment fetch completed with a non-success HTTP status
  #[error("Failed to load {url} (status: {status})")]
  FetchFailed { url: String, status: u16 },

  /// The configured placeholder element does not exist in the document
  #[error("No element found for placeholder id '{id}'")]
  MissingPlaceholder { id: String },

  /// The readiness gate's deadline elapsed before the probe succeeded
  #[error("Dependency not available after {waited_ms}ms")]
  GateTimeout { waited_ms: u64 },

  /// I/O error (file reading, network transport, etc.)
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}
