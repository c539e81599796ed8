//! Member states and the canonical ordering used everywhere they are
//! listed, diffed, or serialized.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Date format used in changelog documents and DBUTIL reports.
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Edit classification
// ---------------------------------------------------------------------------

/// How a member changed relative to a baseline. Absent means
/// unchanged/baseline; the synthetic `SAME` tag exists only inside changelog
/// documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditType {
    Add,
    Edit,
    Delete,
}

impl EditType {
    pub fn as_str(self) -> &'static str {
        match self {
            EditType::Add => "ADD",
            EditType::Edit => "EDIT",
            EditType::Delete => "DELETE",
        }
    }

    /// Parse the uppercase document token; `SAME` maps to `None`.
    pub fn parse(token: &str) -> Option<Option<Self>> {
        match token {
            "ADD" => Some(Some(EditType::Add)),
            "EDIT" => Some(Some(EditType::Edit)),
            "DELETE" => Some(Some(EditType::Delete)),
            "SAME" => Some(None),
            _ => None,
        }
    }
}

impl fmt::Display for EditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Keys and states
// ---------------------------------------------------------------------------

/// Compound key identifying one member within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberKey {
    pub project: String,
    pub alternate: String,
    pub group: String,
    pub member_type: String,
    pub name: String,
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.project, self.alternate, self.group, self.member_type, self.name
        )
    }
}

/// One versioned member of an SCLM-controlled library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberState {
    pub project: String,
    pub alternate: String,
    pub group: String,
    pub member_type: String,
    pub name: String,
    pub version: u32,
    pub change_user: String,
    pub change_group: String,
    pub change_date: NaiveDateTime,
    /// Change classification against a baseline; `None` means
    /// unchanged/baseline.
    pub edit_type: Option<EditType>,
}

impl MemberState {
    pub fn key(&self) -> MemberKey {
        MemberKey {
            project: self.project.clone(),
            alternate: self.alternate.clone(),
            group: self.group.clone(),
            member_type: self.member_type.clone(),
            name: self.name.clone(),
        }
    }

    /// Display path `project/alternate/group/type/name`.
    pub fn path(&self) -> String {
        self.key().to_string()
    }

    pub fn date_string(&self) -> String {
        self.change_date.format(DATE_FORMAT).to_string()
    }

    /// Canonical ordering: most recent change first, ties broken by the
    /// compound key fields and then the version, so any permutation of the
    /// same entries sorts to one sequence.
    pub fn canonical_order(a: &MemberState, b: &MemberState) -> Ordering {
        b.change_date
            .cmp(&a.change_date)
            .then_with(|| a.project.cmp(&b.project))
            .then_with(|| a.alternate.cmp(&b.alternate))
            .then_with(|| a.group.cmp(&b.group))
            .then_with(|| a.member_type.cmp(&b.member_type))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.version.cmp(&b.version))
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.path(), self.version)?;
        if let Some(edit) = self.edit_type {
            write!(f, " [{edit}]")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn member(name: &str, version: u32, date: &str) -> MemberState {
        MemberState {
            project: "PROJ1".into(),
            alternate: "PROJ1".into(),
            group: "DEV1".into(),
            member_type: "SOURCE".into(),
            name: name.into(),
            version,
            change_user: "IBMUSER".into(),
            change_group: "DEV1".into(),
            change_date: NaiveDateTime::parse_from_str(date, DATE_FORMAT)
                .expect("test date"),
            edit_type: None,
        }
    }

    #[test]
    fn edit_type_tokens() {
        assert_eq!(EditType::Add.to_string(), "ADD");
        assert_eq!(EditType::parse("DELETE"), Some(Some(EditType::Delete)));
        assert_eq!(EditType::parse("SAME"), Some(None));
        assert_eq!(EditType::parse("RENAME"), None);
    }

    #[test]
    fn path_is_slash_joined_key() {
        let m = member("MOD1", 1, "2016/03/01 10:31:05");
        assert_eq!(m.path(), "PROJ1/PROJ1/DEV1/SOURCE/MOD1");
    }

    #[test]
    fn newest_change_sorts_first() {
        let older = member("AAA", 1, "2016/03/01 10:00:00");
        let newer = member("ZZZ", 1, "2016/03/02 09:00:00");
        assert_eq!(
            MemberState::canonical_order(&newer, &older),
            Ordering::Less
        );
    }

    #[test]
    fn equal_dates_fall_back_to_key_then_version() {
        let a = member("AAA", 1, "2016/03/01 10:00:00");
        let z = member("ZZZ", 1, "2016/03/01 10:00:00");
        assert_eq!(MemberState::canonical_order(&a, &z), Ordering::Less);

        let v1 = member("AAA", 1, "2016/03/01 10:00:00");
        let v2 = member("AAA", 2, "2016/03/01 10:00:00");
        assert_eq!(MemberState::canonical_order(&v1, &v2), Ordering::Less);
    }

    #[test]
    fn sorting_is_a_total_order() {
        let mut one = vec![
            member("MOD2", 1, "2016/03/01 10:00:00"),
            member("MOD1", 3, "2016/03/02 11:00:00"),
            member("MOD3", 2, "2016/03/01 10:00:00"),
        ];
        let mut two = vec![one[2].clone(), one[0].clone(), one[1].clone()];
        one.sort_by(MemberState::canonical_order);
        two.sort_by(MemberState::canonical_order);
        assert_eq!(one, two);
        assert_eq!(one[0].name, "MOD1");
    }

    #[test]
    fn date_round_trips_through_the_document_format() {
        let m = member("MOD1", 1, "2016/03/01 10:31:05");
        assert_eq!(m.date_string(), "2016/03/01 10:31:05");
        let _ = NaiveDate::from_ymd_opt(2016, 3, 1).expect("valid date");
    }
}
