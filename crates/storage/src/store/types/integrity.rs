#![forbid(unsafe_code)]

use serde::Serialize;
use temdb_core::hierarchy::EntityKind;

/// A child row whose copied ancestor key disagrees with the row its link points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IntegrityIssue {
    #[serde(serialize_with = "serialize_kind")]
    pub entity: EntityKind,
    pub key: String,
    pub field: &'static str,
    pub stored: String,
    pub linked: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub checked_rows: u64,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

fn serialize_kind<S: serde::Serializer>(kind: &EntityKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.label())
}
