#![forbid(unsafe_code)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::path::PathBuf;
use temdb_server::{AppState, ServerConfig, router};
use temdb_storage::SqliteStore;

const ROI: &str = "SPEC001.BLK001.SEC001.SUB001.ROI001";

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("temdb_server_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

struct TestServer {
    base: String,
    client: Client,
}

impl TestServer {
    async fn start(test_name: &str) -> Self {
        let store = SqliteStore::open(temp_dir(test_name)).expect("open store");
        let app = router(AppState::new(store, &ServerConfig::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .expect("send post");
        read(response).await
    }

    async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .patch(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .expect("send patch");
        read(response).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .expect("send get");
        read(response).await
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .delete(format!("{}{path}", self.base))
            .send()
            .await
            .expect("send delete");
        read(response).await
    }

    async fn seed(&self) {
        let steps = [
            ("/specimens", json!({"specimen_id": "SPEC001"})),
            ("/blocks", json!({"specimen_id": "SPEC001", "block_id": "BLK001"})),
            (
                "/cutting-sessions",
                json!({
                    "cutting_session_id": "CUT001",
                    "specimen_id": "SPEC001",
                    "block_id": "BLK001",
                    "media_type": "tape",
                }),
            ),
            ("/substrates", json!({"media_id": "SUB001", "media_type": "tape"})),
            (
                "/sections",
                json!({
                    "section_id": "SEC001",
                    "section_number": 1,
                    "cutting_session_id": "CUT001",
                    "media_id": "SUB001",
                }),
            ),
        ];
        for (path, body) in steps {
            let (status, body) = self.post(path, body).await;
            assert_eq!(status, StatusCode::CREATED, "{path}: {body}");
        }
    }
}

async fn read(response: reqwest::Response) -> (StatusCode, Value) {
    let status = response.status();
    let text = response.text().await.expect("read body");
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).expect("json body")
    };
    (status, body)
}

fn roi_body(roi_number: u32, parent_roi_id: Option<&str>) -> Value {
    json!({
        "section_id": "SEC001",
        "specimen_id": "SPEC001",
        "block_id": "BLK001",
        "substrate_media_id": "SUB001",
        "roi_number": roi_number,
        "parent_roi_id": parent_roi_id,
    })
}

#[tokio::test]
async fn roi_lifecycle_over_http() {
    let server = TestServer::start("roi_lifecycle_over_http").await;
    server.seed().await;

    let (status, parent) = server.post("/rois", roi_body(1, None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parent["roi_id"], ROI);
    assert_eq!(parent["hierarchy_level"], 1);

    let (status, child) = server.post("/rois", roi_body(1, Some(ROI))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(child["roi_id"], format!("{ROI}.ROI001"));
    assert_eq!(child["hierarchy_level"], 2);

    let (status, body) = server.delete(&format!("/rois/{ROI}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "RESOURCE_IN_USE");
    assert_eq!(
        body["detail"],
        format!("Cannot delete ROI '{ROI}' as it has 1 child ROIs")
    );
    assert_eq!(body["context"]["count"], 1);

    let (status, body) = server.get(&format!("/rois/{ROI}/children")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["total_children"], 1);
    assert_eq!(body["metadata"]["has_more"], false);

    let (status, body) = server.get(&format!("/rois/{ROI}.ROI001/hierarchy")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, _) = server.delete(&format!("/rois/{ROI}.ROI001")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = server.delete(&format!("/rois/{ROI}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = server.get(&format!("/rois/{ROI}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn roi_batch_is_atomic_and_accepts_both_shapes() {
    let server = TestServer::start("roi_batch_is_atomic_and_accepts_both_shapes").await;
    server.seed().await;

    let (status, body) = server
        .post(
            "/rois/batch",
            json!([roi_body(1, None), roi_body(2, None), roi_body(1, None)]),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error_code"], "DUPLICATE_RESOURCE");
    let (_, listed) = server.get("/rois").await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    let (status, body) = server
        .post(
            "/rois/batch",
            json!({"rois": [roi_body(1, None), roi_body(1, Some(ROI))]}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = server
        .post("/rois/batch", json!([roi_body(3, None), roi_body(0, None)]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "invalid roi_number: number must be greater than zero for batch item 1"
    );
    assert_eq!(body["context"]["batch_index"], 1);

    let (status, body) = server.post("/rois/batch", json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "ROI data list cannot be empty.");
    assert_eq!(body["error_code"], "BAD_REQUEST");
}

#[tokio::test]
async fn rejected_requests_use_the_error_body() {
    let server = TestServer::start("rejected_requests_use_the_error_body").await;
    server.seed().await;

    for query in ["limit=0", "limit=101", "skip=-1"] {
        let (status, body) = server.get(&format!("/specimens?{query}")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{query}");
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }

    let (status, body) = server.post("/specimens", json!({"description": "no id"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");

    let (status, body) = server.post("/specimens", json!({"specimen_id": "SPEC001"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Specimen 'SPEC001' already exists");

    let mut wrong_block = roi_body(1, None);
    wrong_block["block_id"] = json!("BLK999");
    let (status, body) = server.post("/rois", wrong_block).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INCONSISTENT_HIERARCHY");

    let (status, body) = server.delete("/specimens/SPEC001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["context"]["dependent"], "blocks");

    let (status, body) = server
        .get("/lens-corrections/current?scope_id=scope-1&magnification=2000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "No lens correction found for scope_id=scope-1, magnification=2000"
    );

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn tasks_acquisitions_and_tiles() {
    let server = TestServer::start("tasks_acquisitions_and_tiles").await;
    server.seed().await;
    let (status, _) = server.post("/rois", roi_body(1, None)).await;
    assert_eq!(status, StatusCode::CREATED);

    let task = json!({
        "task_id": "TASK001",
        "specimen_id": "SPEC001",
        "block_id": "BLK001",
        "roi_id": ROI,
    });
    let (status, body) = server.post("/acquisition-tasks", task).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "Planned");
    assert_eq!(body["version"], 1);

    let (status, body) = server
        .patch(
            "/acquisition-tasks/TASK001/status",
            json!({"status": "In Progress"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["version"], 2);
    assert!(body["started_at"].is_string());

    let (status, body) = server.get("/acquisition-tasks/TASK001?version=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Planned");
    let (_, body) = server.get("/acquisition-tasks/TASK001/versions").await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    let (status, _) = server.get("/acquisition-tasks?status=bogus").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let acquisition = json!({
        "acquisition_id": "ACQ001",
        "montage_id": "MON001",
        "roi_id": ROI,
        "acquisition_task_id": "TASK001",
        "scope_id": "scope-1",
        "magnification": 2000,
        "start_time": "2026-01-05T10:00:00Z",
        "lens_correction_acquisition_id": "LC404",
    });
    let (status, body) = server.post("/acquisitions", acquisition.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_REFERENCE");

    let mut acquisition = acquisition;
    acquisition["lens_correction_acquisition_id"] = Value::Null;
    let (status, body) = server.post("/acquisitions", acquisition).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["start_time"], "2026-01-05T10:00:00Z");

    let tiles: Vec<Value> = (0..3u32)
        .map(|raster_index| {
            json!({
                "tile_id": format!("ACQ001_{raster_index}"),
                "raster_index": raster_index,
                "stage_x": 0.0,
                "stage_y": 0.0,
                "raster_row": 0,
                "raster_col": raster_index,
                "image_path": format!("/tiles/{raster_index}.tif"),
                "focus_score": f64::from(raster_index) + 1.0,
            })
        })
        .collect();
    let (status, body) = server
        .post("/acquisitions/ACQ001/tiles/batch", json!({"tiles": tiles}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, body) = server.get("/acquisitions/ACQ001/tiles/count").await;
    assert_eq!(body["count"], 3);
    let (_, body) = server.get("/acquisitions/ACQ001/tiles?skip=1&limit=1").await;
    assert_eq!(body[0]["raster_index"], 1);

    let (status, body) = server.get("/qc/ACQ001/focus-scores").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["tile_count"], 3);
    assert_eq!(body["focus_scores"][2]["tile_id"], "ACQ001_2");
    assert_eq!(body["mean_focus"], 2.0);
    assert_eq!(body["median_focus"], 2.0);
    assert_eq!(body["stddev_focus"], 1.0);
    let (status, _) = server.get("/qc/ACQ404/focus-scores").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.delete("/acquisitions/ACQ001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Cannot delete Acquisition 'ACQ001' as it has 3 tiles");

    let (status, body) = server.get("/lens-corrections/orphans").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, body) = server.get("/admin/integrity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issues"].as_array().map(Vec::len), Some(0));
}
