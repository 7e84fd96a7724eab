#![forbid(unsafe_code)]

use std::path::PathBuf;
use temdb_core::hierarchy::EntityKind;
use temdb_core::model::MediaType;
use temdb_storage::{
    CreateAcquisitionTaskRequest, CreateBlockRequest, CreateCuttingSessionRequest, CreateRoiRequest,
    CreateSectionRequest, CreateSpecimenRequest, CreateSubstrateRequest, ListAcquisitionTasksRequest,
    ListRoisRequest, Page, RoiParentKeys, SqliteStore, StoreError,
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

fn seed(store: &mut SqliteStore) {
    store
        .create_specimen(CreateSpecimenRequest {
            specimen_id: "SPEC001".to_string(),
            ..CreateSpecimenRequest::default()
        })
        .expect("create specimen");
    store
        .create_block(CreateBlockRequest {
            specimen_id: "SPEC001".to_string(),
            block_id: "BLK001".to_string(),
            ..CreateBlockRequest::default()
        })
        .expect("create block");
    store
        .create_cutting_session(CreateCuttingSessionRequest {
            cutting_session_id: "CUT001".to_string(),
            specimen_id: "SPEC001".to_string(),
            block_id: "BLK001".to_string(),
            start_time: None,
            end_time: None,
            operator: Some("op".to_string()),
            sectioning_device: None,
            media_type: MediaType::Tape,
            knife_id: None,
        })
        .expect("create cutting session");
    store
        .create_substrate(CreateSubstrateRequest {
            media_id: "SUB001".to_string(),
            media_type: "tape".to_string(),
            ..CreateSubstrateRequest::default()
        })
        .expect("create substrate");
    store
        .create_section(CreateSectionRequest {
            section_id: Some("SEC001".to_string()),
            section_number: 1,
            cutting_session_id: "CUT001".to_string(),
            media_id: "SUB001".to_string(),
            ..CreateSectionRequest::default()
        })
        .expect("create section");
}

fn roi_request(roi_number: u32, parent_roi_id: Option<&str>) -> CreateRoiRequest {
    CreateRoiRequest {
        section_id: "SEC001".to_string(),
        specimen_id: "SPEC001".to_string(),
        block_id: "BLK001".to_string(),
        substrate_media_id: "SUB001".to_string(),
        roi_number,
        parent_roi_id: parent_roi_id.map(str::to_string),
        ..CreateRoiRequest::default()
    }
}

#[test]
fn nested_roi_ids_follow_the_containment_chain() {
    let storage_dir = temp_dir("nested_roi_ids_follow_the_containment_chain");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    seed(&mut store);

    let parent = store.create_roi(roi_request(1, None)).expect("create parent roi");
    assert_eq!(parent.roi_id, "SPEC001.BLK001.SEC001.SUB001.ROI001");
    assert_eq!(parent.hierarchy_level, 1);
    assert_eq!(parent.parent_roi_id, None);

    let child = store
        .create_roi(roi_request(1, Some(&parent.roi_id)))
        .expect("create child roi");
    assert_eq!(child.roi_id, "SPEC001.BLK001.SEC001.SUB001.ROI001.ROI001");
    assert_eq!(child.hierarchy_level, 2);
    assert_eq!(child.parent_roi_id.as_deref(), Some(parent.roi_id.as_str()));
    assert!(child.roi_id.starts_with("SPEC001.BLK001.SEC001.SUB001."));

    let err = store.delete_roi(&parent.roi_id).expect_err("parent has a child");
    assert_eq!(
        err.to_string(),
        "Cannot delete ROI 'SPEC001.BLK001.SEC001.SUB001.ROI001' as it has 1 child ROIs"
    );
    match err {
        StoreError::ResourceInUse {
            dependent_kind,
            count,
            ..
        } => {
            assert_eq!(dependent_kind, EntityKind::Roi);
            assert_eq!(count, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    store.delete_roi(&child.roi_id).expect("delete child");
    store.delete_roi(&parent.roi_id).expect("delete parent");
    let err = store.get_roi(&parent.roi_id).expect_err("parent is gone");
    assert!(matches!(err, StoreError::NotFound { entity: EntityKind::Roi, .. }));
}

#[test]
fn roi_numbers_are_scoped_to_their_parent() {
    let storage_dir = temp_dir("roi_numbers_are_scoped_to_their_parent");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    seed(&mut store);

    let first = store.create_roi(roi_request(1, None)).expect("roi 1");
    store.create_roi(roi_request(2, None)).expect("roi 2");
    store
        .create_roi(roi_request(2, Some(&first.roi_id)))
        .expect("nested roi 2 under roi 1");

    let err = store.create_roi(roi_request(1, None)).expect_err("duplicate roi");
    assert!(matches!(err, StoreError::Conflict { entity: EntityKind::Roi, .. }));

    let err = store.create_roi(roi_request(0, None)).expect_err("zero roi number");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn children_and_hierarchy_queries() {
    let storage_dir = temp_dir("children_and_hierarchy_queries");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    seed(&mut store);

    let root = store.create_roi(roi_request(1, None)).expect("root");
    for n in 1..=3 {
        store
            .create_roi(roi_request(n, Some(&root.roi_id)))
            .expect("child");
    }
    let leaf_parent = format!("{}.ROI002", root.roi_id);
    let leaf = store
        .create_roi(roi_request(7, Some(&leaf_parent)))
        .expect("grandchild");
    assert_eq!(leaf.hierarchy_level, 3);

    let page = store
        .roi_children(&root.roi_id, Page { limit: 2, offset: 0 })
        .expect("children page");
    assert_eq!(page.children.len(), 2);
    assert_eq!(page.metadata.total_children, 3);
    assert!(page.metadata.has_more);
    assert_eq!(page.children[0].roi_number, 1);

    let page = store
        .roi_children(&root.roi_id, Page { limit: 2, offset: 2 })
        .expect("last children page");
    assert_eq!(page.children.len(), 1);
    assert!(!page.metadata.has_more);

    let path = store.roi_hierarchy(&leaf.roi_id).expect("hierarchy");
    let ids: Vec<_> = path.iter().map(|roi| roi.roi_id.as_str()).collect();
    assert_eq!(ids, vec![root.roi_id.as_str(), leaf_parent.as_str(), leaf.roi_id.as_str()]);

    let top = store
        .list_rois(&ListRoisRequest {
            section_id: Some("SEC001".to_string()),
            top_level_only: true,
            ..ListRoisRequest::default()
        })
        .expect("top-level rois");
    assert_eq!(top.len(), 1);

    let all = store
        .list_section_rois("SEC001", Page { limit: 100, offset: 0 })
        .expect("section rois");
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].roi_id, root.roi_id);
}

#[test]
fn declared_keys_must_match_the_section() {
    let storage_dir = temp_dir("declared_keys_must_match_the_section");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    seed(&mut store);

    let mut wrong_block = roi_request(1, None);
    wrong_block.block_id = "BLK999".to_string();
    let err = store.create_roi(wrong_block).expect_err("wrong block");
    assert!(matches!(err, StoreError::InconsistentHierarchy(_)));

    let mut missing_section = roi_request(1, None);
    missing_section.section_id = "SEC404".to_string();
    let err = store.create_roi(missing_section).expect_err("missing section");
    assert!(matches!(err, StoreError::NotFound { entity: EntityKind::Section, .. }));

    let (section, parent) = store
        .validate_and_resolve_roi_parent(RoiParentKeys {
            specimen_id: "SPEC001",
            block_id: "BLK001",
            section_id: "SEC001",
            substrate_media_id: "SUB001",
            parent_roi_id: None,
        })
        .expect("resolve parent");
    assert_eq!(section.section_id, "SEC001");
    assert!(parent.is_none());
    assert!(store
        .list_rois(&ListRoisRequest::default())
        .expect("list rois")
        .is_empty());
}

#[test]
fn task_on_a_foreign_roi_is_rejected_and_not_persisted() {
    let storage_dir = temp_dir("task_on_a_foreign_roi_is_rejected_and_not_persisted");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    seed(&mut store);
    store
        .create_block(CreateBlockRequest {
            specimen_id: "SPEC001".to_string(),
            block_id: "BLK002".to_string(),
            ..CreateBlockRequest::default()
        })
        .expect("second block");
    let roi = store.create_roi(roi_request(1, None)).expect("roi");

    let err = store
        .create_acquisition_task(CreateAcquisitionTaskRequest {
            task_id: "TASK001".to_string(),
            specimen_id: "SPEC001".to_string(),
            block_id: "BLK002".to_string(),
            roi_id: roi.roi_id.clone(),
            ..CreateAcquisitionTaskRequest::default()
        })
        .expect_err("roi is under BLK001");
    assert_eq!(
        err.to_string(),
        format!("ROI '{}' does not belong to block 'BLK002' or specimen 'SPEC001'", roi.roi_id)
    );
    assert!(store
        .list_acquisition_tasks(&ListAcquisitionTasksRequest::default())
        .expect("list tasks")
        .is_empty());

    let task = store
        .create_acquisition_task(CreateAcquisitionTaskRequest {
            task_id: "TASK001".to_string(),
            specimen_id: "SPEC001".to_string(),
            block_id: "BLK001".to_string(),
            roi_id: roi.roi_id.clone(),
            tags: vec!["Overview".to_string(), "overview".to_string(), " hi-res ".to_string()],
            ..CreateAcquisitionTaskRequest::default()
        })
        .expect("consistent task");
    assert_eq!(task.version, 1);
    assert_eq!(task.task_type, "standard_acquisition");
    assert_eq!(task.tags, vec!["hi-res".to_string(), "overview".to_string()]);
}

#[test]
fn generated_section_ids_pad_the_number() {
    let storage_dir = temp_dir("generated_section_ids_pad_the_number");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    seed(&mut store);

    let section = store
        .create_section(CreateSectionRequest {
            section_number: 42,
            cutting_session_id: "CUT001".to_string(),
            media_id: "SUB001".to_string(),
            specimen_id: Some("SPEC001".to_string()),
            ..CreateSectionRequest::default()
        })
        .expect("create section");
    assert_eq!(section.section_id, "SUB001_S00042");
    assert_eq!(section.block_id, "BLK001");

    let err = store
        .create_section(CreateSectionRequest {
            section_number: 42,
            cutting_session_id: "CUT001".to_string(),
            media_id: "SUB001".to_string(),
            section_id: Some("OTHER".to_string()),
            ..CreateSectionRequest::default()
        })
        .expect_err("number taken in session");
    assert!(matches!(err, StoreError::Conflict { entity: EntityKind::Section, .. }));

    let err = store
        .create_section(CreateSectionRequest {
            section_number: 43,
            cutting_session_id: "CUT001".to_string(),
            media_id: "SUB001".to_string(),
            block_id: Some("BLK999".to_string()),
            ..CreateSectionRequest::default()
        })
        .expect_err("block mismatch");
    assert!(matches!(err, StoreError::InconsistentHierarchy(_)));
}
