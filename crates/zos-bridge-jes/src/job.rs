//! Remote job identity, completion codes, and the acceptance threshold.

use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Completion codes
// ---------------------------------------------------------------------------

/// Terminal classification of a submitted job.
///
/// JES servers report completion in several textual shapes; this folds them
/// into one value that displays exactly the way callers expect to compare
/// against: `0004`, `ABEND_S0C4`, `JCL_ERROR`, or an internal failure tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CompletionCode {
    /// Literal return-code token, e.g. `0004`.
    ReturnCode(String),
    /// Abnormal end with the system/user code, e.g. `S0C4`.
    Abend(String),
    /// The job failed JCL conversion.
    JclError,
    /// The session could not resolve the job's fate; the tag says why.
    Tag(FailureTag),
}

impl CompletionCode {
    /// A terminal classification obtained from the server, as opposed to an
    /// internal failure tag. Abends and JCL errors count: the job finished,
    /// the caller decides pass/fail against its own threshold.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CompletionCode::Tag(_))
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionCode::ReturnCode(rc) => write!(f, "{rc}"),
            CompletionCode::Abend(code) => write!(f, "ABEND_{code}"),
            CompletionCode::JclError => write!(f, "JCL_ERROR"),
            CompletionCode::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure tags
// ---------------------------------------------------------------------------

/// Internal failure tags emitted when the protocol cannot produce a real
/// completion code. Each displays as the stable uppercase token callers and
/// log scrapers key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureTag {
    CouldNotConnect,
    FailedToParseJobId,
    ServerClosedConnection,
    IoError,
    WaitInterrupted,
    WaitError,
    JobDidNotFinishInTime,
    JobNotFoundInJes,
    CheckJobAvailabilityErrorLogin,
    CheckJobAvailabilityIoError,
    FetchLogErrorLogin,
    FetchLogIoError,
    RetrErrJobNotFinishedOrNotFound,
    CouldNotRetrieveJobRc,
    /// The log carried a termination marker but no completion token and no
    /// JCL-error line. The job has ended, so waiting longer cannot help.
    EndedWithoutRc,
}

impl FailureTag {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureTag::CouldNotConnect => "COULD_NOT_CONNECT",
            FailureTag::FailedToParseJobId => "FAILED_TO_PARSE_JOB_ID",
            FailureTag::ServerClosedConnection => "SERVER_CLOSED_CONNECTION",
            FailureTag::IoError => "IO_ERROR",
            FailureTag::WaitInterrupted => "WAIT_INTERRUPTED",
            FailureTag::WaitError => "WAIT_ERROR",
            FailureTag::JobDidNotFinishInTime => "JOB_DID_NOT_FINISH_IN_TIME",
            FailureTag::JobNotFoundInJes => "JOB_NOT_FOUND_IN_JES",
            FailureTag::CheckJobAvailabilityErrorLogin => "CHECK_JOB_AVAILABILITY_ERROR_LOGIN",
            FailureTag::CheckJobAvailabilityIoError => "CHECK_JOB_AVAILABILITY_IO_ERROR",
            FailureTag::FetchLogErrorLogin => "FETCH_LOG_ERROR_LOGIN",
            FailureTag::FetchLogIoError => "FETCH_LOG_IO_ERROR",
            FailureTag::RetrErrJobNotFinishedOrNotFound => "RETR_ERR_JOB_NOT_FINISHED_OR_NOT_FOUND",
            FailureTag::CouldNotRetrieveJobRc => "COULD_NOT_RETRIEVE_JOB_RC",
            FailureTag::EndedWithoutRc => "ENDED_WITHOUT_RC",
        }
    }
}

impl fmt::Display for FailureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Remote job
// ---------------------------------------------------------------------------

/// One job tracked by a job-control session.
///
/// Created at submission, mutated only by its owning session during polling,
/// and frozen once a terminal completion code is set or the session abandons
/// it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemoteJob {
    /// Server-assigned spool id, e.g. `JOB01234`. Empty until the submission
    /// reply announced it.
    pub id: String,
    /// Job name as JES knows it; discovered during polling and may differ
    /// from the name on the submitted JOB card.
    pub name: String,
    /// Terminal classification, once known.
    pub completion: Option<CompletionCode>,
    /// Captured output log bytes.
    #[serde(skip)]
    pub log: Vec<u8>,
    /// Whether the output log was successfully retrieved. While set,
    /// retrieval is not repeated; the session clears it only when a
    /// captured log turns out to predate the job's termination marker.
    pub log_captured: bool,
}

// ---------------------------------------------------------------------------
// Acceptance threshold
// ---------------------------------------------------------------------------

/// Maximum acceptable return code, kept as a 4-digit zero-padded string so
/// acceptance is a plain lexicographic comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaxCc(String);

impl MaxCc {
    /// Normalize a caller-supplied cap: empty means `0000`, shorter values
    /// are left-padded with zeroes.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self("0000".to_string());
        }
        Self(format!("{trimmed:0>4}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the completion code passes this threshold. Only numeric
    /// return codes can pass; abends, JCL errors, and failure tags never do.
    pub fn allows(&self, code: &CompletionCode) -> bool {
        match code {
            CompletionCode::ReturnCode(rc) => {
                if rc.is_empty() || !rc.chars().all(|c| c.is_ascii_digit()) {
                    return false;
                }
                let padded = format!("{rc:0>4}");
                self.0.as_str() >= padded.as_str()
            }
            _ => false,
        }
    }
}

impl Default for MaxCc {
    fn default() -> Self {
        Self("0000".to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
