#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS sections (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          section_id TEXT NOT NULL,
          section_number INTEGER NOT NULL CHECK(section_number > 0),
          cutting_session_ref INTEGER NOT NULL REFERENCES cutting_sessions(id),
          substrate_ref INTEGER NOT NULL REFERENCES substrates(id),
          cutting_session_id TEXT NOT NULL,
          block_id TEXT NOT NULL,
          specimen_id TEXT NOT NULL,
          media_id TEXT NOT NULL,
          barcode TEXT,
          quality TEXT,
          thickness_um REAL,
          optical_image_json TEXT,
          cut_at_ms INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;
