#![forbid(unsafe_code)]
//! JES job submission and completion-code extraction over FTP.
//!
//! This crate provides:
//!
//! - **Job control session** — submit → poll availability → fetch log →
//!   extract completion code → optional spool cleanup
//! - **Completion codes** — numeric return codes, `ABEND_*`, `JCL_ERROR`,
//!   and internal failure tags
//! - **Status rules** — an ordered, data-driven table of patterns for the
//!   heterogeneous status formats JES servers emit
//! - **Two- and three-state interfaces** — direct status classification, or
//!   the coarse `INPUT`/`ACTIVE`/`OUTPUT` protocol with a termination-marker
//!   scan of the job log
//! - **Spool simulator** — an in-memory transport for tests
//!
//! Error policy: a single job's failure never aborts unrelated work, so
//! transport and protocol failures are translated into completion-code-style
//! tags on the [`SubmitOutcome`] instead of propagating as errors.

pub mod cancel;
pub mod job;
pub mod session;
pub mod sim;
pub mod status;
pub mod transport;

pub use cancel::CancelToken;
pub use job::{CompletionCode, FailureTag, MaxCc, RemoteJob};
pub use session::{JobControlSession, SubmitConfig, SubmitOutcome};
pub use sim::SpoolSim;
pub use status::{classify_status, scan_job_id, CoarseStatus};
pub use transport::SpoolTransport;
