#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS specimens (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          specimen_id TEXT NOT NULL,
          description TEXT,
          specimen_images_json TEXT NOT NULL DEFAULT '[]',
          functional_imaging_metadata_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS blocks (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          block_id TEXT NOT NULL,
          specimen_ref INTEGER NOT NULL REFERENCES specimens(id),
          specimen_id TEXT NOT NULL,
          description TEXT,
          microct_info_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cutting_sessions (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          cutting_session_id TEXT NOT NULL,
          block_ref INTEGER NOT NULL REFERENCES blocks(id),
          block_id TEXT NOT NULL,
          specimen_id TEXT NOT NULL,
          start_time_ms INTEGER NOT NULL,
          end_time_ms INTEGER,
          operator TEXT,
          sectioning_device TEXT,
          media_type TEXT NOT NULL,
          knife_id TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        -- Substrates (wafers, tapes, grids) exist independently of the specimen tree.
        CREATE TABLE IF NOT EXISTS substrates (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          media_id TEXT NOT NULL,
          media_type TEXT NOT NULL,
          uid TEXT,
          status TEXT NOT NULL,
          metadata_json TEXT,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;
