//! Transport error types.

use thiserror::Error;

/// Errors produced by the FTP transport.
///
/// Every failure surfaces as a value; no transport operation panics. Callers
/// at the session layer translate these into completion-code-style tags.
#[derive(Debug, Error)]
pub enum FtpError {
    /// The server refused the control connection.
    #[error("server refused connection: {0}")]
    ConnectionRefused(String),

    /// The control connection dropped mid-operation.
    #[error("server closed connection")]
    ConnectionClosed,

    /// USER/PASS was rejected.
    #[error("authentication failed for user '{0}'")]
    AuthFailed(String),

    /// The SITE command required for JES spool access was rejected.
    #[error("server refused SITE command: {0}")]
    SiteRejected(String),

    /// An operation requires an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// An operation requires an open connection.
    #[error("not connected")]
    NotConnected,

    /// The server reply could not be parsed.
    #[error("malformed server reply: {0}")]
    MalformedReply(String),

    /// A data transfer failed or was refused.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Underlying socket I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FtpError {
    /// Returns `true` if the error indicates the server dropped the session.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, FtpError::ConnectionClosed)
    }
}
