//! Classifying a fresh snapshot against a baseline.

use std::collections::HashMap;

use tracing::debug;

use crate::member::{EditType, MemberKey, MemberState};
use crate::snapshot::RevisionSnapshot;

/// Annotate `current`'s entries against `baseline` by compound key.
///
/// - in `current` only → `ADD`
/// - in both with differing version or change date → `EDIT`, unless the
///   remote system already supplied a classification on the current entry,
///   which wins
/// - in `baseline` only → a `DELETE` entry synthesized from the baseline's
///   attributes, since `current` has nothing to annotate
/// - in both, unchanged → carried with no classification
pub fn diff(baseline: &RevisionSnapshot, current: &RevisionSnapshot) -> RevisionSnapshot {
    let old: HashMap<MemberKey, &MemberState> = baseline
        .entries()
        .iter()
        .map(|entry| (entry.key(), entry))
        .collect();

    let mut result = Vec::with_capacity(current.len());
    for entry in current.entries() {
        let mut annotated = entry.clone();
        annotated.edit_type = match old.get(&entry.key()) {
            None => Some(EditType::Add),
            Some(prior) => {
                if prior.version != entry.version || prior.change_date != entry.change_date {
                    entry.edit_type.or(Some(EditType::Edit))
                } else {
                    None
                }
            }
        };
        result.push(annotated);
    }

    for entry in baseline.entries() {
        if current
            .entries()
            .iter()
            .any(|candidate| candidate.key() == entry.key())
        {
            continue;
        }
        let mut removed = entry.clone();
        removed.edit_type = Some(EditType::Delete);
        result.push(removed);
    }

    debug!(
        baseline = baseline.len(),
        current = current.len(),
        changed = result.iter().filter(|e| e.edit_type.is_some()).count(),
        "classified revision"
    );
    // Keys stay unique: every result entry comes from exactly one of the
    // two key-unique inputs.
    RevisionSnapshot::from_unique(result)
}
