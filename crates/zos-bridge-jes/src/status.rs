//! Status-field classification rules.
//!
//! JES dialects report job status in several textual shapes. Instead of
//! burying the distinctions in control flow, the classification is an
//! ordered table of `(pattern, outcome)` rules so a new dialect means a new
//! table row, not a new branch in the state machine.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::job::CompletionCode;

// ---------------------------------------------------------------------------
// Submission reply
// ---------------------------------------------------------------------------

/// The job-id announcement on the STOR reply:
/// `250-It is known to JES as JOB01234`.
static JOB_ID_ANNOUNCEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"250-It is known to JES as (\S+)").unwrap());

/// Scan submission reply lines for the server-assigned job id.
pub fn scan_job_id(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .find_map(|line| JOB_ID_ANNOUNCEMENT.captures(line))
        .map(|caps| caps[1].to_string())
}

// ---------------------------------------------------------------------------
// Spool listing
// ---------------------------------------------------------------------------

/// Regex locating a job's line in a detailed spool listing. The listing line
/// is `NAME JOBID <status field…>`; group 1 is the name, group 2 the rest.
pub fn job_line_regex(job_id: &str) -> Regex {
    // The id comes from the server's own announcement; it is always a plain
    // token, so the pattern cannot fail to compile after escaping.
    Regex::new(&format!(r"^(\S+)\s+{}\s+(.*)$", regex::escape(job_id)))
        .unwrap_or_else(|_| JOB_ID_ANNOUNCEMENT.clone())
}

/// Regex for the termination marker line of `job_name` in a fetched job log:
/// `… HASP395 NAME ENDED - RC=0004`. The trailing token is optional.
pub fn termination_marker_regex(job_name: &str) -> Regex {
    Regex::new(&format!(
        r"HASP395\s+{}\s+ENDED(?:\s+-\s+(\S+))?",
        regex::escape(job_name)
    ))
    .unwrap_or_else(|_| JOB_ID_ANNOUNCEMENT.clone())
}

/// Line content marking a JCL failure earlier in a job log.
pub const JCL_ERROR_LINE: &str = "JCL ERROR";

// ---------------------------------------------------------------------------
// Coarse three-state interface
// ---------------------------------------------------------------------------

/// The three coarse states a level-1 interface reports instead of a direct
/// completion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoarseStatus {
    /// Still on the input queue.
    Input,
    /// Currently executing.
    Active,
    /// Finished; the log must be fetched and scanned for the real signal.
    Output,
}

impl CoarseStatus {
    /// Parse the leading token of a status field, if it is one of the three
    /// coarse states.
    pub fn parse(status_field: &str) -> Option<Self> {
        if status_field.starts_with("INPUT") {
            Some(CoarseStatus::Input)
        } else if status_field.starts_with("ACTIVE") {
            Some(CoarseStatus::Active)
        } else if status_field.starts_with("OUTPUT") {
            Some(CoarseStatus::Output)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Classification rule table
// ---------------------------------------------------------------------------

/// What a matched rule produces.
#[derive(Debug, Clone, Copy)]
enum RuleOutcome {
    /// Explicit JCL-error phrase.
    JclError,
    /// `ABEND=<code>`.
    Abend,
    /// Unlabeled return-code token; taken literally, uppercased.
    LiteralUpper,
    /// Labeled `RC=<value>` token.
    Literal,
}

/// Ordered classification rules. First match wins; the order encodes the
/// priority JCL error → abend → unlabeled token → labeled `RC=`.
static STATUS_RULES: Lazy<Vec<(Regex, RuleOutcome)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r" \(JCL error\) ").unwrap(),
            RuleOutcome::JclError,
        ),
        (Regex::new(r" ABEND=(\S+?) ").unwrap(), RuleOutcome::Abend),
        (
            Regex::new(r" RC\s+(\S+)\s").unwrap(),
            RuleOutcome::LiteralUpper,
        ),
        (Regex::new(r" RC=(\S+) ").unwrap(), RuleOutcome::Literal),
    ]
});

/// Classify a status field (or a bare termination-marker token) against the
/// rule table. Returns `None` when no rule recognizes the field; the caller
/// logs it and keeps polling rather than guessing.
///
/// The field is padded with one leading and one trailing blank so the
/// delimiter context the rules expect is always present, whether the input
/// is a full status field or a single token lifted from the job log.
pub fn classify_status(field: &str) -> Option<CompletionCode> {
    let padded = format!(" {field} ");
    for (pattern, outcome) in STATUS_RULES.iter() {
        let Some(caps) = pattern.captures(&padded) else {
            continue;
        };
        let code = match outcome {
            RuleOutcome::JclError => CompletionCode::JclError,
            RuleOutcome::Abend => CompletionCode::Abend(caps[1].to_string()),
            RuleOutcome::LiteralUpper => CompletionCode::ReturnCode(caps[1].to_uppercase()),
            RuleOutcome::Literal => CompletionCode::ReturnCode(caps[1].to_string()),
        };
        return Some(code);
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
