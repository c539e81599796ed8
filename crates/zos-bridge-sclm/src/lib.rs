//! SCLM revision tracking over a JES bridge.
//!
//! - [`MemberState`] — one versioned member of an SCLM-controlled library,
//!   keyed by `(project, alternate, group, type, name)`.
//! - [`RevisionSnapshot`] — an ordered, key-unique collection of member
//!   states representing the library at one point in time.
//! - [`diff`] — classifies the members of a new snapshot against a baseline
//!   as `ADD` / `EDIT` / `DELETE`.
//! - [`ChangeLogCodec`] — the strict XML changelog document codec.
//! - [`fetch_revision`] — runs an FLMCMD DBUTIL job through a
//!   [`zos_bridge_jes::JobControlSession`] and parses the report into a
//!   fresh snapshot.
//!
//! The snapshot, diff, and codec pieces are pure and stateless; only the
//! fetch touches the network.

#![forbid(unsafe_code)]

pub mod changelog;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod member;
pub mod snapshot;

pub use changelog::ChangeLogCodec;
pub use diff::diff;
pub use error::{Result, SclmError};
pub use fetch::{fetch_revision, JobTemplate, ProjectFilter};
pub use member::{EditType, MemberKey, MemberState};
pub use snapshot::RevisionSnapshot;
