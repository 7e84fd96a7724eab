#![forbid(unsafe_code)]

/// Ancestor keys copied onto a child row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lineage<'a> {
    pub specimen_id: &'a str,
    pub block_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMismatch {
    pub field: &'static str,
    pub declared: String,
    pub resolved: String,
}

impl KeyMismatch {
    pub fn message(&self) -> String {
        format!(
            "{} '{}' does not match the parent's {} '{}'",
            self.field, self.declared, self.field, self.resolved
        )
    }
}

/// Compares a declared ancestor key against the one reached through the link.
pub fn check_key(field: &'static str, declared: &str, resolved: &str) -> Result<(), KeyMismatch> {
    if declared == resolved {
        return Ok(());
    }
    Err(KeyMismatch {
        field,
        declared: declared.to_string(),
        resolved: resolved.to_string(),
    })
}

/// Checks that a declared lineage matches the resolved parent's lineage,
/// specimen first.
pub fn check_lineage(declared: Lineage<'_>, resolved: Lineage<'_>) -> Result<(), KeyMismatch> {
    check_key("specimen_id", declared.specimen_id, resolved.specimen_id)?;
    check_key("block_id", declared.block_id, resolved.block_id)
}

/// A task's ROI must sit under the task's block and specimen.
pub fn roi_belongs_to(roi: Lineage<'_>, block_id: &str, specimen_id: &str) -> bool {
    roi.block_id == block_id && roi.specimen_id == specimen_id
}
