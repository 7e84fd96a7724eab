#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        -- roi_id is the full dotted key; roi_number is only unique under its parent.
        CREATE TABLE IF NOT EXISTS rois (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          roi_id TEXT NOT NULL,
          roi_number INTEGER NOT NULL CHECK(roi_number > 0),
          hierarchy_level INTEGER NOT NULL CHECK(hierarchy_level > 0),
          section_ref INTEGER NOT NULL REFERENCES sections(id),
          parent_roi_ref INTEGER REFERENCES rois(id),
          parent_roi_id TEXT,
          section_id TEXT NOT NULL,
          block_id TEXT NOT NULL,
          specimen_id TEXT NOT NULL,
          substrate_media_id TEXT NOT NULL,
          description TEXT,
          aperture_width_mm REAL,
          aperture_height_mm REAL,
          aperture_centroid_x REAL,
          aperture_centroid_y REAL,
          aperture_image TEXT,
          optical_nm_per_pixel REAL,
          barcode TEXT,
          metadata_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS acquisition_tasks (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          task_id TEXT NOT NULL,
          roi_ref INTEGER NOT NULL REFERENCES rois(id),
          roi_id TEXT NOT NULL,
          block_id TEXT NOT NULL,
          specimen_id TEXT NOT NULL,
          task_type TEXT NOT NULL,
          version INTEGER NOT NULL DEFAULT 1,
          status TEXT NOT NULL,
          tags_json TEXT NOT NULL DEFAULT '[]',
          metadata_json TEXT,
          error_message TEXT,
          started_at_ms INTEGER,
          completed_at_ms INTEGER,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS acquisition_task_versions (
          task_ref INTEGER NOT NULL REFERENCES acquisition_tasks(id) ON DELETE CASCADE,
          version INTEGER NOT NULL,
          snapshot_json TEXT NOT NULL,
          recorded_at_ms INTEGER NOT NULL,
          PRIMARY KEY(task_ref, version)
        );
"#;
