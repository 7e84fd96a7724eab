#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS acquisitions (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          acquisition_id TEXT NOT NULL,
          montage_id TEXT NOT NULL,
          task_ref INTEGER NOT NULL REFERENCES acquisition_tasks(id),
          roi_ref INTEGER NOT NULL REFERENCES rois(id),
          acquisition_task_id TEXT NOT NULL,
          roi_id TEXT NOT NULL,
          specimen_id TEXT NOT NULL,
          status TEXT NOT NULL,
          version INTEGER NOT NULL DEFAULT 1,
          replaces_ref INTEGER REFERENCES acquisitions(id),
          replaces_acquisition_id TEXT,
          lens_correction INTEGER NOT NULL DEFAULT 0,
          lens_correction_ref INTEGER REFERENCES acquisitions(id),
          lens_correction_acquisition_id TEXT,
          scope_id TEXT NOT NULL,
          magnification INTEGER NOT NULL,
          tilt_angle REAL,
          montage_set_name TEXT,
          start_time_ms INTEGER NOT NULL,
          end_time_ms INTEGER,
          hardware_settings_json TEXT,
          acquisition_settings_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tiles (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          tile_id TEXT NOT NULL,
          acquisition_ref INTEGER NOT NULL REFERENCES acquisitions(id),
          acquisition_id TEXT NOT NULL,
          roi_id TEXT NOT NULL,
          specimen_id TEXT NOT NULL,
          raster_index INTEGER NOT NULL CHECK(raster_index >= 0),
          stage_x REAL NOT NULL,
          stage_y REAL NOT NULL,
          raster_row INTEGER NOT NULL,
          raster_col INTEGER NOT NULL,
          focus_score REAL,
          image_path TEXT NOT NULL,
          supertile_id TEXT,
          created_at_ms INTEGER NOT NULL
        );
"#;
