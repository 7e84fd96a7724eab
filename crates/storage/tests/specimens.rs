#![forbid(unsafe_code)]

use std::path::PathBuf;
use temdb_storage::{CreateSpecimenRequest, ListSpecimensRequest, SqliteStore};

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

fn search(store: &SqliteStore, text: &str) -> Vec<String> {
    store
        .list_specimens(&ListSpecimensRequest {
            search: Some(text.to_string()),
            ..ListSpecimensRequest::default()
        })
        .expect("list specimens")
        .into_iter()
        .map(|row| row.specimen_id)
        .collect()
}

#[test]
fn search_matches_literal_text() {
    let storage_dir = temp_dir("search_matches_literal_text");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    for (specimen_id, description) in [
        ("MOUSE_01", Some("cortex, 50% coverage")),
        ("MOUSE101", None),
        ("RAT02", Some("hippocampus")),
    ] {
        store
            .create_specimen(CreateSpecimenRequest {
                specimen_id: specimen_id.to_string(),
                description: description.map(str::to_string),
                ..CreateSpecimenRequest::default()
            })
            .expect("specimen");
    }

    assert_eq!(search(&store, "_"), vec!["MOUSE_01".to_string()]);
    assert_eq!(search(&store, "%"), vec!["MOUSE_01".to_string()]);
    assert_eq!(search(&store, "E_0"), vec!["MOUSE_01".to_string()]);
    assert_eq!(
        search(&store, "mouse"),
        vec!["MOUSE101".to_string(), "MOUSE_01".to_string()]
    );
    assert_eq!(search(&store, "HIPPO"), vec!["RAT02".to_string()]);
    assert!(search(&store, "\\").is_empty());
}
