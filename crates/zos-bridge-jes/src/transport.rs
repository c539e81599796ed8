//! The transport seam between the session state machine and the wire.

use zos_bridge_ftp::{Credentials, FtpError, JesFtpClient};

/// The operations a job-control session needs from its transport.
///
/// Implemented by the real FTP client and by the in-memory simulator used in
/// tests. A session owns its transport exclusively for its lifetime and
/// releases it via [`SpoolTransport::close`] on every exit path.
pub trait SpoolTransport {
    /// Discard any prior session state and establish a fresh
    /// connect + authenticate cycle.
    fn refresh(&mut self, creds: &Credentials) -> Result<(), FtpError>;

    /// Upload `bytes` as a new spool entry; returns the server's final reply
    /// lines (which carry the job-id announcement on a JES interface).
    fn store(&mut self, name: &str, bytes: &[u8]) -> Result<Vec<String>, FtpError>;

    /// Names of spool entries matching `pattern`.
    fn list_names(&mut self, pattern: &str) -> Result<Vec<String>, FtpError>;

    /// Detailed spool listing lines matching `pattern`.
    fn list_details(&mut self, pattern: &str) -> Result<Vec<String>, FtpError>;

    /// Fetch the output of the spool entry `name`.
    fn retrieve(&mut self, name: &str) -> Result<Vec<u8>, FtpError>;

    /// Purge the spool entry `name`.
    fn delete(&mut self, name: &str) -> Result<(), FtpError>;

    /// Release the remote session slot. Never fails.
    fn close(&mut self);
}

// Lets a caller lend a transport to a session and inspect it afterwards.
impl<T: SpoolTransport + ?Sized> SpoolTransport for &mut T {
    fn refresh(&mut self, creds: &Credentials) -> Result<(), FtpError> {
        (**self).refresh(creds)
    }

    fn store(&mut self, name: &str, bytes: &[u8]) -> Result<Vec<String>, FtpError> {
        (**self).store(name, bytes)
    }

    fn list_names(&mut self, pattern: &str) -> Result<Vec<String>, FtpError> {
        (**self).list_names(pattern)
    }

    fn list_details(&mut self, pattern: &str) -> Result<Vec<String>, FtpError> {
        (**self).list_details(pattern)
    }

    fn retrieve(&mut self, name: &str) -> Result<Vec<u8>, FtpError> {
        (**self).retrieve(name)
    }

    fn delete(&mut self, name: &str) -> Result<(), FtpError> {
        (**self).delete(name)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl SpoolTransport for JesFtpClient {
    fn refresh(&mut self, creds: &Credentials) -> Result<(), FtpError> {
        JesFtpClient::refresh(self, creds)
    }

    fn store(&mut self, name: &str, bytes: &[u8]) -> Result<Vec<String>, FtpError> {
        JesFtpClient::store(self, name, bytes)
    }

    fn list_names(&mut self, pattern: &str) -> Result<Vec<String>, FtpError> {
        JesFtpClient::list_names(self, pattern)
    }

    fn list_details(&mut self, pattern: &str) -> Result<Vec<String>, FtpError> {
        JesFtpClient::list_details(self, pattern)
    }

    fn retrieve(&mut self, name: &str) -> Result<Vec<u8>, FtpError> {
        JesFtpClient::retrieve(self, name)
    }

    fn delete(&mut self, name: &str) -> Result<(), FtpError> {
        JesFtpClient::delete(self, name)
    }

    fn close(&mut self) {
        self.quit();
    }
}
