#![forbid(unsafe_code)]

use super::*;
use rusqlite::params;
use std::collections::HashSet;

impl SqliteStore {
    pub fn add_tile(
        &mut self,
        acquisition_id: &str,
        request: CreateTileRequest,
    ) -> Result<TileRow, StoreError> {
        let tx = self.conn.transaction()?;
        let acquisition = require_acquisition(&tx, acquisition_id.trim())?;
        let row = insert_tile(&tx, &acquisition, request)?;
        tx.commit()?;

        tracing::debug!(
            acquisition_id = %row.acquisition_id,
            tile_id = %row.tile_id,
            raster_index = row.raster_index,
            "tile added"
        );
        Ok(row)
    }

    /// Adds every tile or none of them.
    pub fn add_tiles_batch(
        &mut self,
        acquisition_id: &str,
        requests: Vec<CreateTileRequest>,
    ) -> Result<Vec<TileRow>, StoreError> {
        if requests.is_empty() {
            return Err(StoreError::invalid("Tile data list cannot be empty."));
        }
        let mut seen_ids = HashSet::new();
        let mut seen_indexes = HashSet::new();
        for (index, request) in requests.iter().enumerate() {
            let tile_id =
                canonicalize("tile_id", &request.tile_id).map_err(|err| with_batch_index(err, index))?;
            if !seen_ids.insert(tile_id.clone()) || !seen_indexes.insert(request.raster_index) {
                return Err(StoreError::Conflict {
                    entity: EntityKind::Tile,
                    key: tile_id,
                });
            }
        }

        let tx = self.conn.transaction()?;
        let acquisition = require_acquisition(&tx, acquisition_id.trim())?;
        let mut out = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let row = insert_tile(&tx, &acquisition, request)
                .map_err(|err| with_batch_index(err, index))?;
            out.push(row);
        }
        tx.commit()?;

        tracing::info!(
            acquisition_id = %acquisition.acquisition_id,
            count = out.len(),
            "tile batch added"
        );
        Ok(out)
    }

    /// Tiles of an acquisition in raster order.
    pub fn list_tiles(&self, acquisition_id: &str, page: Page) -> Result<Vec<TileRow>, StoreError> {
        let acquisition = require_acquisition(&self.conn, acquisition_id.trim())?;
        collect_rows(
            &self.conn,
            &format!(
                r#"
                SELECT {TILE_COLUMNS} FROM tiles
                WHERE acquisition_ref = ?1
                ORDER BY raster_index ASC
                LIMIT ?2 OFFSET ?3
                "#
            ),
            params![
                acquisition.id,
                to_sqlite_i64(page.limit)?,
                to_sqlite_i64(page.offset)?
            ],
            tile_from_row,
        )
    }

    pub fn tile_count(&self, acquisition_id: &str) -> Result<u64, StoreError> {
        let acquisition = require_acquisition(&self.conn, acquisition_id.trim())?;
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM tiles WHERE acquisition_ref = ?1",
            params![acquisition.id],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Focus score of every tile in raster order, with summary statistics.
    pub fn acquisition_focus_scores(
        &self,
        acquisition_id: &str,
    ) -> Result<AcquisitionFocusScores, StoreError> {
        let acquisition = require_acquisition(&self.conn, acquisition_id.trim())?;
        let focus_scores = collect_rows(
            &self.conn,
            r#"
            SELECT tile_id, raster_index, focus_score FROM tiles
            WHERE acquisition_ref = ?1
            ORDER BY raster_index ASC
            "#,
            params![acquisition.id],
            |row| {
                Ok(TileFocusScore {
                    tile_id: row.get(0)?,
                    raster_index: row.get(1)?,
                    focus_score: row.get(2)?,
                })
            },
        )?;

        let mut scores = focus_scores
            .iter()
            .filter_map(|tile| tile.focus_score)
            .collect::<Vec<_>>();
        scores.sort_by(f64::total_cmp);
        let summary = FocusSummary::of_sorted(&scores);

        tracing::debug!(
            acquisition_id = %acquisition.acquisition_id,
            tiles = focus_scores.len(),
            scored = scores.len(),
            "focus scores read"
        );
        Ok(AcquisitionFocusScores {
            acquisition_id: acquisition.acquisition_id,
            tile_count: u64::try_from(focus_scores.len()).unwrap_or(u64::MAX),
            focus_scores,
            mean_focus: summary.map(|s| s.mean),
            median_focus: summary.map(|s| s.median),
            stddev_focus: summary.map(|s| s.stddev),
            min_focus: summary.map(|s| s.min),
            max_focus: summary.map(|s| s.max),
        })
    }

    pub fn get_tile(&self, acquisition_id: &str, tile_id: &str) -> Result<TileRow, StoreError> {
        let acquisition = require_acquisition(&self.conn, acquisition_id.trim())?;
        let tile_id = tile_id.trim();
        tile_by_key(&self.conn, acquisition.id, tile_id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Tile, tile_id))
    }

    pub fn delete_tile(&mut self, acquisition_id: &str, tile_id: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let acquisition = require_acquisition(&tx, acquisition_id.trim())?;
        let tile_id = tile_id.trim();
        let existing = tile_by_key(&tx, acquisition.id, tile_id)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Tile, tile_id))?;
        ensure_unreferenced(&tx, EntityKind::Tile, &existing.tile_id, existing.id)?;
        delete_row(&tx, EntityKind::Tile, existing.id)?;
        tx.commit()?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct FocusSummary {
    mean: f64,
    median: f64,
    stddev: f64,
    min: f64,
    max: f64,
}

impl FocusSummary {
    /// `sorted` must be ascending. Standard deviation is the sample one; a
    /// single score has a deviation of zero.
    fn of_sorted(sorted: &[f64]) -> Option<Self> {
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let stddev = if sorted.len() > 1 {
            let sum_sq = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
            (sum_sq / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Self {
            mean,
            median,
            stddev,
            min,
            max,
        })
    }
}

fn insert_tile(
    conn: &Connection,
    acquisition: &AcquisitionRow,
    request: CreateTileRequest,
) -> Result<TileRow, StoreError> {
    let tile_id = canonicalize("tile_id", &request.tile_id)?;
    let image_path = clean_text(Some(request.image_path))
        .ok_or_else(|| StoreError::invalid("image_path must not be empty"))?;
    if request.focus_score.is_some_and(|score| !score.is_finite()) {
        return Err(StoreError::invalid("focus_score must be a finite number"));
    }

    conn.execute(
        r#"
        INSERT INTO tiles(tile_id, acquisition_ref, acquisition_id, roi_id, specimen_id,
                          raster_index, stage_x, stage_y, raster_row, raster_col, focus_score,
                          image_path, supertile_id, created_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            tile_id,
            acquisition.id,
            acquisition.acquisition_id,
            acquisition.roi_id,
            acquisition.specimen_id,
            request.raster_index,
            request.stage_x,
            request.stage_y,
            request.raster_row,
            request.raster_col,
            request.focus_score,
            image_path,
            clean_text(request.supertile_id),
            now_ms()
        ],
    )
    .map_err(|err| map_insert_conflict(err, EntityKind::Tile, &tile_id))?;
    tile_by_key(conn, acquisition.id, &tile_id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Tile, tile_id))
}
