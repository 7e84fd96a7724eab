#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE UNIQUE INDEX IF NOT EXISTS idx_specimens_key ON specimens(specimen_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_blocks_key ON blocks(specimen_ref, block_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_cutting_sessions_key ON cutting_sessions(cutting_session_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_substrates_key ON substrates(media_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sections_key ON sections(section_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sections_number ON sections(cutting_session_ref, section_number);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_rois_key ON rois(roi_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_acquisition_tasks_key ON acquisition_tasks(task_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_acquisitions_key ON acquisitions(acquisition_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_tiles_key ON tiles(tile_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_tiles_raster ON tiles(acquisition_ref, raster_index);

        -- Parent references: every delete guard counts through one of these.
        CREATE INDEX IF NOT EXISTS idx_blocks_specimen ON blocks(specimen_ref);
        CREATE INDEX IF NOT EXISTS idx_cutting_sessions_block ON cutting_sessions(block_ref);
        CREATE INDEX IF NOT EXISTS idx_sections_substrate ON sections(substrate_ref);
        CREATE INDEX IF NOT EXISTS idx_rois_section ON rois(section_ref);
        CREATE INDEX IF NOT EXISTS idx_rois_parent ON rois(parent_roi_ref);
        CREATE INDEX IF NOT EXISTS idx_acquisition_tasks_roi ON acquisition_tasks(roi_ref);
        CREATE INDEX IF NOT EXISTS idx_acquisitions_task ON acquisitions(task_ref);
        CREATE INDEX IF NOT EXISTS idx_acquisitions_roi ON acquisitions(roi_ref);
        CREATE INDEX IF NOT EXISTS idx_acquisitions_replaces ON acquisitions(replaces_ref);
        CREATE INDEX IF NOT EXISTS idx_acquisitions_lens_correction ON acquisitions(lens_correction_ref);
        CREATE INDEX IF NOT EXISTS idx_acquisitions_scope
          ON acquisitions(scope_id, magnification, start_time_ms) WHERE lens_correction = 1;
"#;
