#![forbid(unsafe_code)]

//! Parent-chain resolution for creates.
//!
//! Every create resolves its declared ancestors through here, and every
//! denormalized ancestor key a child copies is compared against the row the
//! link actually points at. Lookups go through a [`LookupCache`] so a batch
//! that shares a parent resolves it once.

use super::super::*;
use std::collections::HashMap;
use temdb_core::hierarchy::{KeyMismatch, Lineage, check_key, check_lineage, roi_belongs_to};

/// Declared parent context of a new ROI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiParentKeys<'a> {
    pub specimen_id: &'a str,
    pub block_id: &'a str,
    pub section_id: &'a str,
    pub substrate_media_id: &'a str,
    pub parent_roi_id: Option<&'a str>,
}

impl<'a> RoiParentKeys<'a> {
    pub fn from_request(request: &'a CreateRoiRequest) -> Self {
        Self {
            specimen_id: &request.specimen_id,
            block_id: &request.block_id,
            section_id: &request.section_id,
            substrate_media_id: &request.substrate_media_id,
            parent_roi_id: request.parent_roi_id.as_deref(),
        }
    }
}

#[derive(Clone, Debug)]
pub(in crate::store) struct ResolvedRoiParent {
    pub(in crate::store) section: SectionRow,
    pub(in crate::store) parent: Option<RoiRow>,
    pub(in crate::store) hierarchy_level: u32,
}

#[derive(Debug, Default)]
pub(in crate::store) struct LookupCache {
    specimens: HashMap<String, SpecimenRow>,
    blocks: HashMap<(String, String), BlockRow>,
    cutting_sessions: HashMap<String, CuttingSessionRow>,
    substrates: HashMap<String, SubstrateRow>,
    sections: HashMap<String, SectionRow>,
    rois: HashMap<String, RoiRow>,
    queries: usize,
}

impl LookupCache {
    /// Number of store round trips made so far.
    pub(in crate::store) fn queries(&self) -> usize {
        self.queries
    }

    pub(in crate::store) fn specimen(
        &mut self,
        conn: &Connection,
        specimen_id: &str,
    ) -> Result<SpecimenRow, StoreError> {
        if let Some(row) = self.specimens.get(specimen_id) {
            return Ok(row.clone());
        }
        self.queries += 1;
        let row = require_specimen(conn, specimen_id)?;
        self.specimens.insert(specimen_id.to_string(), row.clone());
        Ok(row)
    }

    pub(in crate::store) fn block(
        &mut self,
        conn: &Connection,
        specimen_id: &str,
        block_id: &str,
    ) -> Result<BlockRow, StoreError> {
        let key = (specimen_id.to_string(), block_id.to_string());
        if let Some(row) = self.blocks.get(&key) {
            return Ok(row.clone());
        }
        self.queries += 1;
        let row = require_block(conn, specimen_id, block_id)?;
        self.blocks.insert(key, row.clone());
        Ok(row)
    }

    pub(in crate::store) fn cutting_session(
        &mut self,
        conn: &Connection,
        cutting_session_id: &str,
    ) -> Result<CuttingSessionRow, StoreError> {
        if let Some(row) = self.cutting_sessions.get(cutting_session_id) {
            return Ok(row.clone());
        }
        self.queries += 1;
        let row = require_cutting_session(conn, cutting_session_id)?;
        self.cutting_sessions
            .insert(cutting_session_id.to_string(), row.clone());
        Ok(row)
    }

    pub(in crate::store) fn substrate(
        &mut self,
        conn: &Connection,
        media_id: &str,
    ) -> Result<SubstrateRow, StoreError> {
        if let Some(row) = self.substrates.get(media_id) {
            return Ok(row.clone());
        }
        self.queries += 1;
        let row = require_substrate(conn, media_id)?;
        self.substrates.insert(media_id.to_string(), row.clone());
        Ok(row)
    }

    pub(in crate::store) fn section(
        &mut self,
        conn: &Connection,
        section_id: &str,
    ) -> Result<SectionRow, StoreError> {
        if let Some(row) = self.sections.get(section_id) {
            return Ok(row.clone());
        }
        self.queries += 1;
        let row = require_section(conn, section_id)?;
        self.sections.insert(section_id.to_string(), row.clone());
        Ok(row)
    }

    pub(in crate::store) fn roi(&mut self, conn: &Connection, roi_id: &str) -> Result<RoiRow, StoreError> {
        if let Some(row) = self.rois.get(roi_id) {
            return Ok(row.clone());
        }
        self.queries += 1;
        let row = require_roi(conn, roi_id)?;
        self.rois.insert(roi_id.to_string(), row.clone());
        Ok(row)
    }

    /// Makes a row inserted earlier in the same transaction resolvable as a parent.
    pub(in crate::store) fn remember_roi(&mut self, row: RoiRow) {
        self.rois.insert(row.roi_id.clone(), row);
    }
}

fn inconsistent(context: String, mismatch: KeyMismatch) -> StoreError {
    StoreError::InconsistentHierarchy(format!("{context}: {}", mismatch.message()))
}

/// Resolves the section, substrate and optional parent ROI a new ROI hangs off,
/// and checks that the declared keys agree with what was resolved.
pub(in crate::store) fn resolve_roi_parent(
    conn: &Connection,
    cache: &mut LookupCache,
    keys: RoiParentKeys<'_>,
) -> Result<ResolvedRoiParent, StoreError> {
    let section = cache.section(conn, keys.section_id)?;
    cache.substrate(conn, keys.substrate_media_id)?;

    check_lineage(
        Lineage {
            specimen_id: keys.specimen_id,
            block_id: keys.block_id,
        },
        Lineage {
            specimen_id: &section.specimen_id,
            block_id: &section.block_id,
        },
    )
    .map_err(|mismatch| inconsistent(format!("section '{}'", section.section_id), mismatch))?;
    check_key(
        "substrate_media_id",
        keys.substrate_media_id,
        &section.media_id,
    )
    .map_err(|mismatch| inconsistent(format!("section '{}'", section.section_id), mismatch))?;

    let parent = match keys.parent_roi_id {
        Some(parent_roi_id) => {
            let parent = cache.roi(conn, parent_roi_id)?;
            if parent.section_ref != section.id {
                return Err(StoreError::InconsistentHierarchy(format!(
                    "parent ROI '{}' belongs to section '{}', not '{}'",
                    parent.roi_id, parent.section_id, section.section_id
                )));
            }
            Some(parent)
        }
        None => None,
    };

    let hierarchy_level = parent
        .as_ref()
        .map_or(1, |parent| parent.hierarchy_level + 1);

    Ok(ResolvedRoiParent {
        section,
        parent,
        hierarchy_level,
    })
}

/// An acquisition task's ROI must live under the task's block and specimen.
pub fn validate_task_roi_consistency(
    roi: &RoiRow,
    block: &BlockRow,
    specimen: &SpecimenRow,
) -> Result<(), StoreError> {
    let lineage = Lineage {
        specimen_id: &roi.specimen_id,
        block_id: &roi.block_id,
    };
    if roi_belongs_to(lineage, &block.block_id, &specimen.specimen_id) {
        return Ok(());
    }
    Err(StoreError::InconsistentHierarchy(format!(
        "ROI '{}' does not belong to block '{}' or specimen '{}'",
        roi.roi_id, block.block_id, specimen.specimen_id
    )))
}

/// Compares a section's declared specimen/block (when given) with its cutting session.
pub(in crate::store) fn check_section_lineage(
    session: &CuttingSessionRow,
    specimen_id: Option<&str>,
    block_id: Option<&str>,
) -> Result<(), StoreError> {
    let context = || format!("cutting session '{}'", session.cutting_session_id);
    if let Some(specimen_id) = specimen_id {
        check_key("specimen_id", specimen_id, &session.specimen_id)
            .map_err(|mismatch| inconsistent(context(), mismatch))?;
    }
    if let Some(block_id) = block_id {
        check_key("block_id", block_id, &session.block_id)
            .map_err(|mismatch| inconsistent(context(), mismatch))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        install_schema(&conn).expect("install schema");
        conn.execute_batch(
            r#"
            INSERT INTO specimens(id, specimen_id, created_at_ms, updated_at_ms)
              VALUES (1, 'SPEC001', 0, 0);
            INSERT INTO blocks(id, block_id, specimen_ref, specimen_id, created_at_ms, updated_at_ms)
              VALUES (1, 'BLK001', 1, 'SPEC001', 0, 0);
            INSERT INTO cutting_sessions(id, cutting_session_id, block_ref, block_id, specimen_id,
                start_time_ms, media_type, created_at_ms, updated_at_ms)
              VALUES (1, 'CUT001', 1, 'BLK001', 'SPEC001', 0, 'tape', 0, 0);
            INSERT INTO substrates(id, media_id, media_type, status, created_at_ms, updated_at_ms)
              VALUES (1, 'SUB001', 'wafer', 'new', 0, 0);
            INSERT INTO substrates(id, media_id, media_type, status, created_at_ms, updated_at_ms)
              VALUES (2, 'SUB002', 'wafer', 'new', 0, 0);
            INSERT INTO sections(id, section_id, section_number, cutting_session_ref, substrate_ref,
                cutting_session_id, block_id, specimen_id, media_id, cut_at_ms, created_at_ms, updated_at_ms)
              VALUES (1, 'SEC001', 1, 1, 1, 'CUT001', 'BLK001', 'SPEC001', 'SUB001', 0, 0, 0);
            INSERT INTO sections(id, section_id, section_number, cutting_session_ref, substrate_ref,
                cutting_session_id, block_id, specimen_id, media_id, cut_at_ms, created_at_ms, updated_at_ms)
              VALUES (2, 'SEC002', 2, 1, 1, 'CUT001', 'BLK001', 'SPEC001', 'SUB001', 0, 0, 0);
            "#,
        )
        .expect("seed rows");
        conn.execute(
            "INSERT INTO rois(id, roi_id, roi_number, hierarchy_level, section_ref, section_id,
                block_id, specimen_id, substrate_media_id, created_at_ms, updated_at_ms)
             VALUES (1, ?1, 1, 1, 1, 'SEC001', 'BLK001', 'SPEC001', 'SUB001', 0, 0)",
            params!["SPEC001.BLK001.SEC001.SUB001.ROI001"],
        )
        .expect("seed roi");
        conn
    }

    fn keys<'a>(section_id: &'a str, parent: Option<&'a str>) -> RoiParentKeys<'a> {
        RoiParentKeys {
            specimen_id: "SPEC001",
            block_id: "BLK001",
            section_id,
            substrate_media_id: "SUB001",
            parent_roi_id: parent,
        }
    }

    #[test]
    fn resolves_top_level_and_nested_parents() {
        let conn = seeded();
        let mut cache = LookupCache::default();

        let top = resolve_roi_parent(&conn, &mut cache, keys("SEC001", None)).expect("top");
        assert_eq!(top.section.section_id, "SEC001");
        assert!(top.parent.is_none());
        assert_eq!(top.hierarchy_level, 1);

        let nested = resolve_roi_parent(
            &conn,
            &mut cache,
            keys("SEC001", Some("SPEC001.BLK001.SEC001.SUB001.ROI001")),
        )
        .expect("nested");
        assert_eq!(nested.hierarchy_level, 2);
    }

    #[test]
    fn shared_parents_are_looked_up_once() {
        let conn = seeded();
        let mut cache = LookupCache::default();
        for _ in 0..5 {
            resolve_roi_parent(&conn, &mut cache, keys("SEC001", None)).expect("resolve");
        }
        // One section and one substrate query, no matter how many items share them.
        assert_eq!(cache.queries(), 2);
    }

    #[test]
    fn missing_ancestors_are_not_found() {
        let conn = seeded();
        let mut cache = LookupCache::default();

        let err = resolve_roi_parent(&conn, &mut cache, keys("SEC404", None)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                entity: EntityKind::Section,
                ..
            }
        ));

        let mut bad_substrate = keys("SEC001", None);
        bad_substrate.substrate_media_id = "SUB404";
        let err = resolve_roi_parent(&conn, &mut cache, bad_substrate).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                entity: EntityKind::Substrate,
                ..
            }
        ));

        let err = resolve_roi_parent(&conn, &mut cache, keys("SEC001", Some("S.B.C.M.ROI009")))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                entity: EntityKind::Roi,
                ..
            }
        ));
    }

    #[test]
    fn declared_keys_must_match_the_section() {
        let conn = seeded();
        let mut cache = LookupCache::default();

        let mut wrong_block = keys("SEC001", None);
        wrong_block.block_id = "BLK999";
        let err = resolve_roi_parent(&conn, &mut cache, wrong_block).unwrap_err();
        assert!(matches!(err, StoreError::InconsistentHierarchy(_)));

        let mut wrong_media = keys("SEC001", None);
        wrong_media.substrate_media_id = "SUB002";
        let err = resolve_roi_parent(&conn, &mut cache, wrong_media).unwrap_err();
        assert!(matches!(err, StoreError::InconsistentHierarchy(_)));
    }

    #[test]
    fn parent_roi_must_share_the_section() {
        let conn = seeded();
        let mut cache = LookupCache::default();
        let err = resolve_roi_parent(
            &conn,
            &mut cache,
            keys("SEC002", Some("SPEC001.BLK001.SEC001.SUB001.ROI001")),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::InconsistentHierarchy(_)));
    }
}
