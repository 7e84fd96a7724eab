#![forbid(unsafe_code)]

use std::path::PathBuf;
use temdb_core::hierarchy::EntityKind;
use temdb_core::model::MediaType;
use temdb_storage::{
    AcquisitionRow, CreateAcquisitionRequest, CreateAcquisitionTaskRequest, CreateBlockRequest,
    CreateCuttingSessionRequest, CreateRoiRequest, CreateSectionRequest, CreateSpecimenRequest,
    CreateSubstrateRequest, CreateTileRequest, RoiRow, SqliteStore, StoreError,
};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("temdb_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

struct Chain {
    roi: RoiRow,
    child: RoiRow,
    acquisition: AcquisitionRow,
}

fn build_chain(store: &mut SqliteStore) -> Chain {
    store
        .create_specimen(CreateSpecimenRequest {
            specimen_id: "S1".to_string(),
            ..CreateSpecimenRequest::default()
        })
        .expect("specimen");
    store
        .create_block(CreateBlockRequest {
            specimen_id: "S1".to_string(),
            block_id: "B1".to_string(),
            ..CreateBlockRequest::default()
        })
        .expect("block");
    store
        .create_cutting_session(CreateCuttingSessionRequest {
            cutting_session_id: "C1".to_string(),
            specimen_id: "S1".to_string(),
            block_id: "B1".to_string(),
            start_time: Some(1_000),
            end_time: None,
            operator: None,
            sectioning_device: None,
            media_type: MediaType::Grid,
            knife_id: None,
        })
        .expect("cutting session");
    store
        .create_substrate(CreateSubstrateRequest {
            media_id: "M1".to_string(),
            media_type: "grid".to_string(),
            ..CreateSubstrateRequest::default()
        })
        .expect("substrate");
    let section = store
        .create_section(CreateSectionRequest {
            section_number: 1,
            cutting_session_id: "C1".to_string(),
            media_id: "M1".to_string(),
            ..CreateSectionRequest::default()
        })
        .expect("section");
    let roi_request = |roi_number, parent_roi_id: Option<String>| CreateRoiRequest {
        section_id: section.section_id.clone(),
        specimen_id: "S1".to_string(),
        block_id: "B1".to_string(),
        substrate_media_id: "M1".to_string(),
        roi_number,
        parent_roi_id,
        ..CreateRoiRequest::default()
    };
    let roi = store.create_roi(roi_request(1, None)).expect("roi");
    let child = store
        .create_roi(roi_request(1, Some(roi.roi_id.clone())))
        .expect("child roi");
    store
        .create_acquisition_task(CreateAcquisitionTaskRequest {
            task_id: "T1".to_string(),
            specimen_id: "S1".to_string(),
            block_id: "B1".to_string(),
            roi_id: roi.roi_id.clone(),
            ..CreateAcquisitionTaskRequest::default()
        })
        .expect("task");
    let acquisition = store
        .create_acquisition(CreateAcquisitionRequest {
            acquisition_id: "A1".to_string(),
            montage_id: "MON1".to_string(),
            roi_id: roi.roi_id.clone(),
            acquisition_task_id: "T1".to_string(),
            scope_id: "scope-1".to_string(),
            magnification: 2_000,
            ..CreateAcquisitionRequest::default()
        })
        .expect("acquisition");
    for raster_index in 0..2 {
        store
            .add_tile(
                "A1",
                CreateTileRequest {
                    tile_id: format!("A1_T{raster_index}"),
                    raster_index,
                    image_path: format!("/tiles/{raster_index}.tif"),
                    ..CreateTileRequest::default()
                },
            )
            .expect("tile");
    }
    Chain {
        roi,
        child,
        acquisition,
    }
}

fn in_use(err: StoreError) -> (EntityKind, EntityKind, u64) {
    match err {
        StoreError::ResourceInUse {
            entity,
            dependent_kind,
            count,
            ..
        } => (entity, dependent_kind, count),
        other => panic!("expected ResourceInUse, got {other:?}"),
    }
}

#[test]
fn every_parent_is_guarded_by_its_dependents() {
    let storage_dir = temp_dir("every_parent_is_guarded_by_its_dependents");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let chain = build_chain(&mut store);

    assert_eq!(
        in_use(store.delete_specimen("S1").expect_err("specimen")),
        (EntityKind::Specimen, EntityKind::Block, 1)
    );
    assert_eq!(
        in_use(store.delete_block("S1", "B1").expect_err("block")),
        (EntityKind::Block, EntityKind::CuttingSession, 1)
    );
    assert_eq!(
        in_use(store.delete_cutting_session("C1").expect_err("session")),
        (EntityKind::CuttingSession, EntityKind::Section, 1)
    );
    assert_eq!(
        in_use(store.delete_substrate("M1").expect_err("substrate")),
        (EntityKind::Substrate, EntityKind::Section, 1)
    );
    assert_eq!(
        in_use(store.delete_section("M1_S00001").expect_err("section")),
        (EntityKind::Section, EntityKind::Roi, 2)
    );
    assert_eq!(
        in_use(store.delete_roi(&chain.roi.roi_id).expect_err("roi")),
        (EntityKind::Roi, EntityKind::Roi, 1)
    );
    assert_eq!(
        in_use(store.delete_acquisition_task("T1").expect_err("task")),
        (EntityKind::AcquisitionTask, EntityKind::Acquisition, 1)
    );
    let err = store.delete_acquisition("A1").expect_err("acquisition");
    assert_eq!(err.to_string(), "Cannot delete Acquisition 'A1' as it has 2 tiles");

    // Once the child ROI is gone the ROI is still held by its task.
    store.delete_roi(&chain.child.roi_id).expect("delete child roi");
    assert_eq!(
        in_use(store.delete_roi(&chain.roi.roi_id).expect_err("roi with task")),
        (EntityKind::Roi, EntityKind::AcquisitionTask, 1)
    );
}

#[test]
fn deleting_bottom_up_clears_the_tree() {
    let storage_dir = temp_dir("deleting_bottom_up_clears_the_tree");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let chain = build_chain(&mut store);

    store.delete_tile("A1", "A1_T0").expect("tile 0");
    store.delete_tile("A1", "A1_T1").expect("tile 1");
    store
        .delete_acquisition(&chain.acquisition.acquisition_id)
        .expect("acquisition");
    store.delete_acquisition_task("T1").expect("task");
    store.delete_roi(&chain.child.roi_id).expect("child roi");
    store.delete_roi(&chain.roi.roi_id).expect("roi");
    store.delete_section("M1_S00001").expect("section");
    store.delete_substrate("M1").expect("substrate");
    store.delete_cutting_session("C1").expect("session");
    store.delete_block("S1", "B1").expect("block");
    store.delete_specimen("S1").expect("specimen");

    let err = store.get_specimen("S1").expect_err("specimen gone");
    assert!(matches!(err, StoreError::NotFound { entity: EntityKind::Specimen, .. }));
    let err = store.delete_specimen("S1").expect_err("already deleted");
    assert_eq!(err.to_string(), "Specimen 'S1' not found");
}

#[test]
fn roi_guard_message_names_acquisition_tasks() {
    let storage_dir = temp_dir("roi_guard_message_names_acquisition_tasks");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let chain = build_chain(&mut store);
    store.delete_roi(&chain.child.roi_id).expect("child roi");

    let err = store.delete_roi(&chain.roi.roi_id).expect_err("guarded");
    assert_eq!(
        err.to_string(),
        format!(
            "Cannot delete ROI '{}' as it has 1 acquisition tasks",
            chain.roi.roi_id
        )
    );
}
