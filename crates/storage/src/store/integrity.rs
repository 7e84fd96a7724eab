#![forbid(unsafe_code)]

//! Read-only audit of denormalized ancestor keys.

use super::*;

struct KeyCheck {
    entity: EntityKind,
    field: &'static str,
    reference: &'static str,
    parent: EntityKind,
    parent_field: &'static str,
}

const fn check(
    entity: EntityKind,
    field: &'static str,
    reference: &'static str,
    parent: EntityKind,
    parent_field: &'static str,
) -> KeyCheck {
    KeyCheck {
        entity,
        field,
        reference,
        parent,
        parent_field,
    }
}

const KEY_CHECKS: &[KeyCheck] = &[
    check(EntityKind::Block, "specimen_id", "specimen_ref", EntityKind::Specimen, "specimen_id"),
    check(EntityKind::CuttingSession, "block_id", "block_ref", EntityKind::Block, "block_id"),
    check(EntityKind::CuttingSession, "specimen_id", "block_ref", EntityKind::Block, "specimen_id"),
    check(EntityKind::Section, "cutting_session_id", "cutting_session_ref", EntityKind::CuttingSession, "cutting_session_id"),
    check(EntityKind::Section, "block_id", "cutting_session_ref", EntityKind::CuttingSession, "block_id"),
    check(EntityKind::Section, "specimen_id", "cutting_session_ref", EntityKind::CuttingSession, "specimen_id"),
    check(EntityKind::Section, "media_id", "substrate_ref", EntityKind::Substrate, "media_id"),
    check(EntityKind::Roi, "section_id", "section_ref", EntityKind::Section, "section_id"),
    check(EntityKind::Roi, "block_id", "section_ref", EntityKind::Section, "block_id"),
    check(EntityKind::Roi, "specimen_id", "section_ref", EntityKind::Section, "specimen_id"),
    check(EntityKind::Roi, "substrate_media_id", "section_ref", EntityKind::Section, "media_id"),
    check(EntityKind::Roi, "parent_roi_id", "parent_roi_ref", EntityKind::Roi, "roi_id"),
    check(EntityKind::AcquisitionTask, "roi_id", "roi_ref", EntityKind::Roi, "roi_id"),
    check(EntityKind::AcquisitionTask, "block_id", "roi_ref", EntityKind::Roi, "block_id"),
    check(EntityKind::AcquisitionTask, "specimen_id", "roi_ref", EntityKind::Roi, "specimen_id"),
    check(EntityKind::Acquisition, "acquisition_task_id", "task_ref", EntityKind::AcquisitionTask, "task_id"),
    check(EntityKind::Acquisition, "roi_id", "roi_ref", EntityKind::Roi, "roi_id"),
    check(EntityKind::Acquisition, "specimen_id", "roi_ref", EntityKind::Roi, "specimen_id"),
    check(EntityKind::Tile, "acquisition_id", "acquisition_ref", EntityKind::Acquisition, "acquisition_id"),
    check(EntityKind::Tile, "roi_id", "acquisition_ref", EntityKind::Acquisition, "roi_id"),
    check(EntityKind::Tile, "specimen_id", "acquisition_ref", EntityKind::Acquisition, "specimen_id"),
];

impl SqliteStore {
    /// Lists child rows whose copied ancestor keys disagree with the rows
    /// their internal references point at.
    pub fn integrity_report(&self) -> Result<IntegrityReport, StoreError> {
        let mut report = IntegrityReport::default();

        for kind in EntityKind::ALL {
            if kind == EntityKind::Specimen || kind == EntityKind::Substrate {
                continue;
            }
            let table = table_name(kind);
            let count: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(1) FROM {table}"), [], |row| row.get(0))?;
            report.checked_rows += u64::try_from(count).unwrap_or(0);
        }

        for check in KEY_CHECKS {
            let child = table_name(check.entity);
            let parent = table_name(check.parent);
            let key = check.entity.key_field();
            let sql = format!(
                r#"
                SELECT c.{key}, c.{field}, p.{parent_field}
                FROM {child} c JOIN {parent} p ON p.id = c.{reference}
                WHERE c.{field} IS NOT p.{parent_field}
                ORDER BY c.id ASC
                "#,
                field = check.field,
                parent_field = check.parent_field,
                reference = check.reference,
            );
            let rows = collect_rows(&self.conn, &sql, &[], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for (key, stored, linked) in rows {
                report.issues.push(IntegrityIssue {
                    entity: check.entity,
                    key,
                    field: check.field,
                    stored: stored.unwrap_or_default(),
                    linked,
                });
            }
        }

        if report.is_clean() {
            tracing::debug!(checked_rows = report.checked_rows, "integrity report clean");
        } else {
            tracing::warn!(
                checked_rows = report.checked_rows,
                issues = report.issues.len(),
                "integrity report found diverged keys"
            );
        }
        Ok(report)
    }
}
