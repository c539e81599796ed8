//! Revision snapshots: ordered, key-unique collections of member states.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SclmError};
use crate::member::{EditType, MemberState};

/// The state of a monitored library slice at one point in time.
///
/// Entries are held in canonical order and the compound key is unique
/// within a snapshot. Immutable once built; the deletion filter returns a
/// new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisionSnapshot {
    entries: Vec<MemberState>,
}

impl RevisionSnapshot {
    /// Build a snapshot, rejecting duplicate compound keys.
    pub fn new(mut entries: Vec<MemberState>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.key()) {
                return Err(SclmError::DuplicateMember(entry.path()));
            }
        }
        entries.sort_by(MemberState::canonical_order);
        Ok(Self { entries })
    }

    /// Internal constructor for entry sets whose keys are already known to
    /// be unique (diff results, deletion filters).
    pub(crate) fn from_unique(mut entries: Vec<MemberState>) -> Self {
        entries.sort_by(MemberState::canonical_order);
        Self { entries }
    }

    pub fn entries(&self) -> &[MemberState] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries carrying a change classification, in canonical order. This
    /// is what gets serialized to a changelog and what decides whether
    /// changes exist at all.
    pub fn changed_only(&self) -> Vec<MemberState> {
        self.entries
            .iter()
            .filter(|entry| entry.edit_type.is_some())
            .cloned()
            .collect()
    }

    /// Drop `DELETE`-classified entries. Applied once a build has consumed
    /// the revision: a deleted member must not appear in the next baseline.
    pub fn remove_deleted(&self) -> RevisionSnapshot {
        RevisionSnapshot::from_unique(
            self.entries
                .iter()
                .filter(|entry| entry.edit_type != Some(EditType::Delete))
                .cloned()
                .collect(),
        )
    }
}
