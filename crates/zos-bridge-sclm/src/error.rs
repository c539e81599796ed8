//! Error taxonomy for snapshot construction and the changelog codec.
//!
//! Codec errors are hard stops: a malformed changelog document aborts the
//! whole operation instead of yielding a partial entry list.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SclmError>;

#[derive(Debug, Error)]
pub enum SclmError {
    /// Two members with the same compound key in one snapshot.
    #[error("duplicate member {0} in snapshot")]
    DuplicateMember(String),

    /// The document has no top-level `<changelog>` element.
    #[error("document is not a valid changelog: missing <changelog> root")]
    MissingRoot,

    /// An element inside `<entry>` that the schema does not define.
    #[error("unexpected element <{0}> in changelog entry")]
    UnexpectedElement(String),

    /// A known field whose text does not parse.
    #[error("malformed changelog field <{field}>: {value:?}")]
    MalformedField { field: &'static str, value: String },

    /// An `<entry>` missing a required field.
    #[error("changelog entry is missing <{0}>")]
    MissingField(&'static str),

    #[error("failed to read changelog document: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The DBUTIL report job did not resolve cleanly.
    #[error("revision job [{job_id}] failed with completion code {code}")]
    FetchFailed { job_id: String, code: String },
}
