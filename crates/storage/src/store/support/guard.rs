#![forbid(unsafe_code)]

//! Delete guard: a row may only be removed once nothing references it.

use super::super::*;
use rusqlite::params;
use temdb_core::hierarchy::{Dependent, Relation};

pub(in crate::store) fn table_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Specimen => "specimens",
        EntityKind::Block => "blocks",
        EntityKind::CuttingSession => "cutting_sessions",
        EntityKind::Substrate => "substrates",
        EntityKind::Section => "sections",
        EntityKind::Roi => "rois",
        EntityKind::AcquisitionTask => "acquisition_tasks",
        EntityKind::Acquisition => "acquisitions",
        EntityKind::Tile => "tiles",
    }
}

/// Column on the dependent's table that holds the owner's internal id.
fn reference_column(dependent: &Dependent) -> Option<&'static str> {
    match (dependent.kind, dependent.relation) {
        (EntityKind::Block, Relation::Parent) => Some("specimen_ref"),
        (EntityKind::CuttingSession, Relation::Parent) => Some("block_ref"),
        (EntityKind::Section, Relation::Parent) => Some("cutting_session_ref"),
        (EntityKind::Section, Relation::Substrate) => Some("substrate_ref"),
        (EntityKind::Roi, Relation::Parent) => Some("section_ref"),
        (EntityKind::Roi, Relation::ParentRoi) => Some("parent_roi_ref"),
        (EntityKind::AcquisitionTask, Relation::Parent) => Some("roi_ref"),
        (EntityKind::Acquisition, Relation::Parent) => Some("task_ref"),
        (EntityKind::Acquisition, Relation::Roi) => Some("roi_ref"),
        (EntityKind::Tile, Relation::Parent) => Some("acquisition_ref"),
        _ => None,
    }
}

/// Counts rows referencing `owner_id` in each dependent collection of `owner`, in check order.
pub(in crate::store) fn dependent_counts(
    conn: &Connection,
    owner: EntityKind,
    owner_id: i64,
) -> Result<Vec<(Dependent, u64)>, StoreError> {
    let mut out = Vec::with_capacity(owner.dependents().len());
    for dependent in owner.dependents() {
        let Some(column) = reference_column(dependent) else {
            return Err(StoreError::invalid(format!(
                "no reference column for {} -> {}",
                owner.label(),
                dependent.kind.label()
            )));
        };
        let table = table_name(dependent.kind);
        let count = conn.query_row(
            &format!("SELECT COUNT(1) FROM {table} WHERE {column} = ?1"),
            params![owner_id],
            |row| row.get::<_, i64>(0),
        )?;
        out.push((*dependent, u64::try_from(count).unwrap_or(0)));
    }
    Ok(out)
}

/// Fails with `ResourceInUse` on the first dependent collection that still references the row.
pub(in crate::store) fn ensure_unreferenced(
    conn: &Connection,
    owner: EntityKind,
    key: &str,
    owner_id: i64,
) -> Result<(), StoreError> {
    for (dependent, count) in dependent_counts(conn, owner, owner_id)? {
        if count > 0 {
            tracing::warn!(
                entity = owner.label(),
                key,
                dependent = dependent.label,
                count,
                "delete blocked by dependents"
            );
            return Err(StoreError::ResourceInUse {
                entity: owner,
                key: key.to_string(),
                dependent_kind: dependent.kind,
                dependent: dependent.label,
                count,
            });
        }
    }
    Ok(())
}

pub(in crate::store) fn delete_row(
    conn: &Connection,
    kind: EntityKind,
    id: i64,
) -> Result<(), StoreError> {
    let table = table_name(kind);
    conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
    Ok(())
}
