use super::*;

#[test]
fn dependent_map_matches_delete_rules() {
    let kinds = |kind: EntityKind| {
        kind.dependents()
            .iter()
            .map(|dep| dep.kind)
            .collect::<Vec<_>>()
    };
    assert_eq!(kinds(EntityKind::Specimen), vec![EntityKind::Block]);
    assert_eq!(kinds(EntityKind::Block), vec![EntityKind::CuttingSession]);
    assert_eq!(kinds(EntityKind::CuttingSession), vec![EntityKind::Section]);
    assert_eq!(kinds(EntityKind::Substrate), vec![EntityKind::Section]);
    assert_eq!(kinds(EntityKind::Section), vec![EntityKind::Roi]);
    assert_eq!(
        kinds(EntityKind::Roi),
        vec![
            EntityKind::Roi,
            EntityKind::AcquisitionTask,
            EntityKind::Acquisition
        ]
    );
    assert_eq!(
        kinds(EntityKind::AcquisitionTask),
        vec![EntityKind::Acquisition]
    );
    assert_eq!(kinds(EntityKind::Acquisition), vec![EntityKind::Tile]);
    assert!(kinds(EntityKind::Tile).is_empty());
}

#[test]
fn child_roi_dependents_are_labelled_for_messages() {
    let first = EntityKind::Roi.dependents()[0];
    assert_eq!(first.relation, Relation::ParentRoi);
    assert_eq!(first.label, "child ROIs");
    assert_eq!(
        EntityKind::Substrate.dependents()[0].relation,
        Relation::Substrate
    );
}

#[test]
fn lineage_check_reports_first_mismatch() {
    let resolved = Lineage {
        specimen_id: "SPEC001",
        block_id: "BLK001",
    };
    assert!(check_lineage(resolved, resolved).is_ok());

    let err = check_lineage(
        Lineage {
            specimen_id: "SPEC001",
            block_id: "BLK002",
        },
        resolved,
    )
    .unwrap_err();
    assert_eq!(err.field, "block_id");
    assert_eq!(err.declared, "BLK002");
    assert_eq!(
        err.message(),
        "block_id 'BLK002' does not match the parent's block_id 'BLK001'"
    );
}

#[test]
fn roi_membership() {
    let roi = Lineage {
        specimen_id: "S1",
        block_id: "B1",
    };
    assert!(roi_belongs_to(roi, "B1", "S1"));
    assert!(!roi_belongs_to(roi, "B2", "S1"));
    assert!(!roi_belongs_to(roi, "B1", "S2"));
}
