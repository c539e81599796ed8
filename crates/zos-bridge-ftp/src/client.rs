//! FTP control/data channel client for JES spool access.

use std::io::{BufReader, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FtpError;
use crate::reply::FtpReply;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Username and secret for the remote host.
///
/// Owned by the caller and passed by value into each session; the transport
/// never logs or persists the secret.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

// The secret must never reach a log line through `{:?}`.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"*****")
            .finish()
    }
}

/// Fixed per-session transport configuration.
#[derive(Debug, Clone)]
pub struct FtpConfig {
    /// LPAR host name or IP address.
    pub host: String,
    /// FTP control port.
    pub port: u16,
    /// Active (PORT) vs passive (PASV) data connections. Chosen once per
    /// session and applied before every data-bearing operation.
    pub active_mode: bool,
    /// Socket read timeout for control and data channels.
    pub timeout: Duration,
}

impl FtpConfig {
    pub fn new(host: impl Into<String>, port: u16, active_mode: bool) -> Self {
        Self {
            host: host.into(),
            port,
            active_mode,
            timeout: Duration::from_secs(60),
        }
    }
}

// ---------------------------------------------------------------------------
// Control channel
// ---------------------------------------------------------------------------

struct Control {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Control {
    fn open(addr: &str, timeout: Duration) -> crate::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(Some(timeout))?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { stream, reader })
    }

    fn command(&mut self, cmd: &str) -> crate::Result<FtpReply> {
        // Mask the PASS argument from the command trace.
        if cmd.starts_with("PASS ") {
            debug!("ftp> PASS *****");
        } else {
            debug!("ftp> {cmd}");
        }
        self.stream.write_all(cmd.as_bytes())?;
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()?;
        let reply = FtpReply::read_from(&mut self.reader)?;
        debug!("ftp< {reply}");
        Ok(reply)
    }

    fn read_reply(&mut self) -> crate::Result<FtpReply> {
        let reply = FtpReply::read_from(&mut self.reader)?;
        debug!("ftp< {reply}");
        Ok(reply)
    }
}

/// Pending data connection, established per operation.
enum DataChannel {
    /// PASV: the stream is connected up front.
    Passive(TcpStream),
    /// PORT: the server connects back after the transfer command.
    Active(TcpListener),
}

impl DataChannel {
    /// Resolve to a connected stream once the transfer command was accepted.
    fn into_stream(self, timeout: Duration) -> crate::Result<TcpStream> {
        let stream = match self {
            DataChannel::Passive(stream) => stream,
            DataChannel::Active(listener) => listener.accept()?.0,
        };
        stream.set_read_timeout(Some(timeout))?;
        Ok(stream)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// FTP client bound to the JES spool interface of one remote host.
///
/// The session is single-use and single-threaded: one client talks about one
/// host and is owned by exactly one job-control session for its lifetime.
pub struct JesFtpClient {
    config: FtpConfig,
    control: Option<Control>,
    authenticated: bool,
}

impl JesFtpClient {
    pub fn new(config: FtpConfig) -> Self {
        Self {
            config,
            control: None,
            authenticated: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    /// Open the control connection, discarding any previous one.
    ///
    /// Idempotent: prior connection state is dropped and its errors ignored,
    /// because a stale session tells us nothing about whether a fresh one
    /// will succeed.
    pub fn connect(&mut self) -> crate::Result<()> {
        self.drop_connection();

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let mut control = Control::open(&addr, self.config.timeout)?;
        let banner = control.read_reply()?;
        if !banner.is_positive_completion() {
            return Err(FtpError::ConnectionRefused(banner.first_line().to_string()));
        }
        debug!("connected to {addr}");
        self.control = Some(control);
        Ok(())
    }

    /// USER/PASS login followed by the SITE command that switches the session
    /// to the JES spool interface. Both must succeed for the session to be
    /// usable.
    pub fn login(&mut self, creds: &Credentials) -> crate::Result<()> {
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;

        let reply = control.command(&format!("USER {}", creds.user))?;
        if reply.is_positive_intermediate() {
            let reply = control.command(&format!("PASS {}", creds.password))?;
            if !reply.is_positive_completion() {
                return Err(FtpError::AuthFailed(creds.user.clone()));
            }
        } else if !reply.is_positive_completion() {
            return Err(FtpError::AuthFailed(creds.user.clone()));
        }

        let reply = control.command("SITE filetype=jes jesjobname=* jesstatus=ALL")?;
        if !reply.is_positive_completion() {
            return Err(FtpError::SiteRejected(reply.first_line().to_string()));
        }
        self.authenticated = true;
        Ok(())
    }

    /// Log out of any prior session (ignoring errors) and establish a fresh
    /// connect + login cycle. Called before every operation that depends on
    /// an active session.
    pub fn refresh(&mut self, creds: &Credentials) -> crate::Result<()> {
        if let Some(control) = self.control.as_mut() {
            // A dead session makes QUIT fail; the reconnect below is the
            // operation that actually matters.
            let _ = control.command("QUIT");
        }
        self.connect()?;
        self.login(creds)
    }

    /// NLST: names of spool entries matching `pattern`.
    pub fn list_names(&mut self, pattern: &str) -> crate::Result<Vec<String>> {
        let data = self.transfer_read(&format!("NLST {pattern}"))?;
        Ok(text_lines(&data))
    }

    /// LIST: detailed spool listing lines matching `pattern`.
    pub fn list_details(&mut self, pattern: &str) -> crate::Result<Vec<String>> {
        let data = self.transfer_read(&format!("LIST {pattern}"))?;
        Ok(text_lines(&data))
    }

    /// STOR: upload `bytes` under `name`. Returns the final control-channel
    /// reply lines — for a JES session these carry the job-id announcement.
    pub fn store(&mut self, name: &str, bytes: &[u8]) -> crate::Result<Vec<String>> {
        self.require_auth()?;
        let channel = self.open_data_channel()?;
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;

        let reply = control.command(&format!("STOR {name}"))?;
        if !reply.is_preliminary() && !reply.is_positive_completion() {
            return Err(FtpError::TransferFailed(reply.first_line().to_string()));
        }
        {
            let mut stream = channel.into_stream(self.config.timeout)?;
            stream.write_all(bytes)?;
            stream.flush()?;
            // Drop closes the data connection, signalling end of file.
        }
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        let fin = control.read_reply()?;
        if !fin.is_positive_completion() {
            return Err(FtpError::TransferFailed(fin.first_line().to_string()));
        }
        Ok(fin.lines)
    }

    /// RETR: download the spool entry `name`.
    pub fn retrieve(&mut self, name: &str) -> crate::Result<Vec<u8>> {
        self.transfer_read(&format!("RETR {name}"))
    }

    /// DELE: purge the spool entry `name`.
    pub fn delete(&mut self, name: &str) -> crate::Result<()> {
        self.require_auth()?;
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        let reply = control.command(&format!("DELE {name}"))?;
        if !reply.is_positive_completion() {
            return Err(FtpError::TransferFailed(reply.first_line().to_string()));
        }
        Ok(())
    }

    /// QUIT and drop the connection. Never fails: if the farewell is lost the
    /// next refresh reports something more accurate.
    pub fn quit(&mut self) {
        if let Some(control) = self.control.as_mut() {
            if control.command("QUIT").is_err() {
                warn!("QUIT failed; dropping connection anyway");
            }
        }
        self.drop_connection();
    }

    // -- internals ----------------------------------------------------------

    fn drop_connection(&mut self) {
        self.control = None;
        self.authenticated = false;
    }

    fn require_auth(&self) -> crate::Result<()> {
        if !self.authenticated {
            return Err(FtpError::NotAuthenticated);
        }
        Ok(())
    }

    /// Run a read-style transfer command and collect the data channel bytes.
    fn transfer_read(&mut self, command: &str) -> crate::Result<Vec<u8>> {
        self.require_auth()?;
        let channel = self.open_data_channel()?;
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;

        let reply = control.command(command)?;
        if !reply.is_preliminary() && !reply.is_positive_completion() {
            return Err(FtpError::TransferFailed(reply.first_line().to_string()));
        }
        let mut data = Vec::new();
        {
            let mut stream = channel.into_stream(self.config.timeout)?;
            stream.read_to_end(&mut data)?;
        }
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        let fin = control.read_reply()?;
        if !fin.is_positive_completion() {
            return Err(FtpError::TransferFailed(fin.first_line().to_string()));
        }
        Ok(data)
    }

    /// Set up the data connection in the configured mode. Applied before
    /// every data-bearing operation, never remembered across operations.
    fn open_data_channel(&mut self) -> crate::Result<DataChannel> {
        if self.config.active_mode {
            self.open_active()
        } else {
            self.open_passive()
        }
    }

    fn open_passive(&mut self) -> crate::Result<DataChannel> {
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        let reply = control.command("PASV")?;
        if !reply.is_positive_completion() {
            return Err(FtpError::TransferFailed(reply.first_line().to_string()));
        }
        let addr = parse_pasv(reply.first_line())?;
        let stream = TcpStream::connect(addr)?;
        Ok(DataChannel::Passive(stream))
    }

    fn open_active(&mut self) -> crate::Result<DataChannel> {
        let control = self.control.as_mut().ok_or(FtpError::NotConnected)?;
        let local_ip = control.stream.local_addr()?.ip();
        let listener = TcpListener::bind((local_ip, 0))?;
        let port = listener.local_addr()?.port();
        let cmd = format_port_command(local_ip, port)?;
        let reply = control.command(&cmd)?;
        if !reply.is_positive_completion() {
            return Err(FtpError::TransferFailed(reply.first_line().to_string()));
        }
        Ok(DataChannel::Active(listener))
    }
}

impl Drop for JesFtpClient {
    fn drop(&mut self) {
        // The remote session slot must be released on every exit path.
        self.quit();
    }
}

// ---------------------------------------------------------------------------
// Wire format helpers
// ---------------------------------------------------------------------------

/// Parse a PASV reply `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
fn parse_pasv(line: &str) -> crate::Result<SocketAddr> {
    let open = line.find('(');
    let close = line.rfind(')');
    let inner = match (open, close) {
        (Some(o), Some(c)) if c > o => &line[o + 1..c],
        _ => return Err(FtpError::MalformedReply(line.to_string())),
    };
    let parts: Vec<u16> = inner
        .split(',')
        .map(|p| p.trim().parse::<u16>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| FtpError::MalformedReply(line.to_string()))?;
    if parts.len() != 6 || parts[..4].iter().any(|&b| b > 255) || parts[4] > 255 || parts[5] > 255 {
        return Err(FtpError::MalformedReply(line.to_string()));
    }
    let ip = std::net::Ipv4Addr::new(
        parts[0] as u8,
        parts[1] as u8,
        parts[2] as u8,
        parts[3] as u8,
    );
    let port = parts[4] * 256 + parts[5];
    Ok(SocketAddr::from((ip, port)))
}

/// Format a PORT command for an IPv4 local endpoint.
fn format_port_command(ip: IpAddr, port: u16) -> crate::Result<String> {
    let v4 = match ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(_) => {
            return Err(FtpError::TransferFailed(
                "active mode requires an IPv4 local address".to_string(),
            ))
        }
    };
    let [a, b, c, d] = v4.octets();
    Ok(format!(
        "PORT {},{},{},{},{},{}",
        a,
        b,
        c,
        d,
        port / 256,
        port % 256
    ))
}

/// Split data-channel bytes into trimmed text lines, dropping empties.
fn text_lines(data: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(data)
        .lines()
        .map(|l| l.trim_end().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasv_reply_parses() {
        let addr = parse_pasv("227 Entering Passive Mode (192,168,1,9,4,210)").unwrap();
        assert_eq!(addr.to_string(), "192.168.1.9:1234");
    }

    #[test]
    fn pasv_reply_rejects_garbage() {
        assert!(parse_pasv("227 Entering Passive Mode").is_err());
        assert!(parse_pasv("227 (1,2,3)").is_err());
        assert!(parse_pasv("227 (999,0,0,1,0,21)").is_err());
    }

    #[test]
    fn port_command_format() {
        let cmd = format_port_command("10.1.2.3".parse().unwrap(), 1234).unwrap();
        assert_eq!(cmd, "PORT 10,1,2,3,4,210");
    }

    #[test]
    fn port_command_rejects_ipv6() {
        assert!(format_port_command("::1".parse().unwrap(), 21).is_err());
    }

    #[test]
    fn text_lines_drops_blank_lines() {
        let lines = text_lines(b"JOB01234\r\n\r\nJOB05678\r\n");
        assert_eq!(lines, vec!["JOB01234", "JOB05678"]);
    }

    #[test]
    fn credentials_debug_masks_secret() {
        let creds = Credentials::new("ibmuser", "s3cret");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("ibmuser"));
    }

    #[test]
    fn operations_require_connection() {
        let mut client = JesFtpClient::new(FtpConfig::new("localhost", 21, false));
        assert!(matches!(
            client.login(&Credentials::new("u", "p")),
            Err(FtpError::NotConnected)
        ));
        assert!(matches!(
            client.list_names("*"),
            Err(FtpError::NotAuthenticated)
        ));
    }
}
