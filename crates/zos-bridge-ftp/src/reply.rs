//! FTP server reply parsing.

use std::io::BufRead;

use crate::error::FtpError;

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// A parsed FTP server reply: the final reply code plus every line received,
/// including continuation lines.
///
/// JES servers announce the spool id of a submitted job on a continuation
/// line (`250-It is known to JES as JOB01234`), so callers get the raw lines
/// rather than a single collapsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpReply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl FtpReply {
    pub fn new(code: u16, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// 2xx — the requested action completed.
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// 3xx — the action is pending further commands (e.g. 331 after USER).
    pub fn is_positive_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }

    /// 1xx — preliminary reply; the real completion follows.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// First line of the reply, for diagnostics.
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    /// Read one full reply from the control channel.
    ///
    /// Handles multi-line replies per RFC 959: `NNN-text` opens a block that
    /// ends with a line starting `NNN ` (same code, space separator).
    pub fn read_from<R: BufRead>(reader: &mut R) -> crate::Result<FtpReply> {
        let first = read_line(reader)?;
        let code = parse_code(&first)?;
        let mut lines = vec![first.clone()];

        let multiline = first.as_bytes().get(3) == Some(&b'-');
        if multiline {
            let terminator = format!("{code} ");
            loop {
                let line = read_line(reader)?;
                let done = line.starts_with(&terminator);
                lines.push(line);
                if done {
                    break;
                }
            }
        }
        Ok(FtpReply::new(code, lines))
    }
}

impl std::fmt::Display for FtpReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_line())
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> crate::Result<String> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(FtpError::ConnectionClosed);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

fn parse_code(line: &str) -> crate::Result<u16> {
    // get() also rejects a byte index inside a multi-byte character, which
    // a plain length check would let through to a panicking slice.
    line.get(..3)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| FtpError::MalformedReply(line.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
