//! In-memory spool transport for tests.
//!
//! Plays the remote host's part with scripted responses, the same way the
//! wire protocol would: a submission reply with (or without) the job-id
//! announcement, a sequence of spool listings as the job progresses, and
//! retrievable log bytes once it finishes.

use std::collections::VecDeque;

use zos_bridge_ftp::{Credentials, FtpError};

use crate::transport::SpoolTransport;

/// How a scripted STOR should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    /// Server dropped the connection mid-transfer.
    ConnectionClosed,
    /// Generic I/O failure.
    Io,
}

/// Scripted in-memory stand-in for a JES FTP server.
///
/// Scripted sequences are sticky: the last scripted response repeats once
/// the sequence is exhausted, so a "job stays ACTIVE forever" scenario is a
/// single script entry.
#[derive(Debug, Default)]
pub struct SpoolSim {
    store_reply: Vec<String>,
    store_failure: Option<StoreFailure>,
    names: VecDeque<Vec<String>>,
    details: VecDeque<Vec<String>>,
    retrieves: VecDeque<Result<Vec<u8>, ()>>,
    /// Refreshes beyond this count fail, when set. `Some(0)` refuses every
    /// login, `Some(1)` lets the submission through and fails the poll loop.
    fail_refresh_after: Option<u32>,
    delete_fails: bool,

    // Observed interactions, for assertions.
    pub refresh_count: u32,
    pub stored: Vec<(String, Vec<u8>)>,
    pub retrieve_count: u32,
    pub deleted: Vec<String>,
    pub closed: bool,
}

impl SpoolSim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the submission reply lines.
    pub fn reply_to_store(&mut self, lines: &[&str]) -> &mut Self {
        self.store_reply = lines.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Script a successful submission announcing `job_id`.
    pub fn announce_job(&mut self, job_id: &str) -> &mut Self {
        self.store_reply = vec![
            format!("250-It is known to JES as {job_id}"),
            "250 Transfer completed successfully.".to_string(),
        ];
        self
    }

    pub fn fail_store(&mut self, failure: StoreFailure) -> &mut Self {
        self.store_failure = Some(failure);
        self
    }

    /// Append one NLST response to the script.
    pub fn script_names(&mut self, names: &[&str]) -> &mut Self {
        self.names
            .push_back(names.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Append one LIST response to the script.
    pub fn script_details(&mut self, lines: &[&str]) -> &mut Self {
        self.details
            .push_back(lines.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Append one successful RETR response to the script.
    pub fn script_retrieve(&mut self, bytes: &[u8]) -> &mut Self {
        self.retrieves.push_back(Ok(bytes.to_vec()));
        self
    }

    /// Append one failing RETR (job not finished / not found).
    pub fn script_retrieve_failure(&mut self) -> &mut Self {
        self.retrieves.push_back(Err(()));
        self
    }

    /// Refuse logins once `count` refreshes have succeeded.
    pub fn fail_refresh_after(&mut self, count: u32) -> &mut Self {
        self.fail_refresh_after = Some(count);
        self
    }

    pub fn fail_delete(&mut self) -> &mut Self {
        self.delete_fails = true;
        self
    }

    fn next_scripted<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl SpoolTransport for SpoolSim {
    fn refresh(&mut self, creds: &Credentials) -> Result<(), FtpError> {
        if let Some(limit) = self.fail_refresh_after {
            if self.refresh_count >= limit {
                return Err(FtpError::AuthFailed(creds.user.clone()));
            }
        }
        self.refresh_count += 1;
        Ok(())
    }

    fn store(&mut self, name: &str, bytes: &[u8]) -> Result<Vec<String>, FtpError> {
        match self.store_failure {
            Some(StoreFailure::ConnectionClosed) => return Err(FtpError::ConnectionClosed),
            Some(StoreFailure::Io) => {
                return Err(FtpError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "scripted I/O failure",
                )))
            }
            None => {}
        }
        self.stored.push((name.to_string(), bytes.to_vec()));
        Ok(self.store_reply.clone())
    }

    fn list_names(&mut self, _pattern: &str) -> Result<Vec<String>, FtpError> {
        Ok(Self::next_scripted(&mut self.names).unwrap_or_default())
    }

    fn list_details(&mut self, _pattern: &str) -> Result<Vec<String>, FtpError> {
        Ok(Self::next_scripted(&mut self.details).unwrap_or_default())
    }

    fn retrieve(&mut self, name: &str) -> Result<Vec<u8>, FtpError> {
        self.retrieve_count += 1;
        match Self::next_scripted(&mut self.retrieves) {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(())) | None => Err(FtpError::TransferFailed(format!(
                "550 {name} not ready",
            ))),
        }
    }

    fn delete(&mut self, name: &str) -> Result<(), FtpError> {
        if self.delete_fails {
            return Err(FtpError::TransferFailed(format!("550 cannot purge {name}")));
        }
        self.deleted.push(name.to_string());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("ibmuser", "pw")
    }

    #[test]
    fn scripted_sequences_are_sticky() {
        let mut sim = SpoolSim::new();
        sim.script_names(&["JOB00001"]).script_names(&[]);
        assert_eq!(sim.list_names("*").unwrap(), vec!["JOB00001"]);
        assert_eq!(sim.list_names("*").unwrap(), Vec::<String>::new());
        // Exhausted: the last entry repeats.
        assert_eq!(sim.list_names("*").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn refresh_failures_start_after_threshold() {
        let mut sim = SpoolSim::new();
        sim.fail_refresh_after(1);
        assert!(sim.refresh(&creds()).is_ok());
        assert!(sim.refresh(&creds()).is_err());
        assert!(sim.refresh(&creds()).is_err());
    }

    #[test]
    fn unscripted_retrieve_fails() {
        let mut sim = SpoolSim::new();
        assert!(sim.retrieve("JOB00001").is_err());
        sim.script_retrieve(b"log");
        assert_eq!(sim.retrieve("JOB00001").unwrap(), b"log");
    }
}
