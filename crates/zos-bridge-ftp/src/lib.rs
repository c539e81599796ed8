#![forbid(unsafe_code)]
//! FTP session transport for JES spool access.
//!
//! This crate provides:
//!
//! - **Control channel** — connect, USER/PASS login, SITE, QUIT
//! - **Reply parsing** — single and multi-line (`250-…`) server replies
//! - **Data channel** — passive (PASV) and active (PORT) transfers
//! - **Spool operations** — NLST, LIST, STOR, RETR, DELE
//!
//! The transport is deliberately pessimistic about session state: a JES FTP
//! session can silently die between operations, so callers are expected to
//! [`JesFtpClient::refresh`] before every operation that depends on an active
//! session. Prior connection state is discarded and its errors ignored.

pub mod client;
pub mod error;
pub mod reply;

pub use client::{Credentials, FtpConfig, JesFtpClient};
pub use error::FtpError;
pub use reply::FtpReply;

/// Convenience result type for transport operations.
pub type Result<T> = std::result::Result<T, FtpError>;
