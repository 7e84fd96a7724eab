#![forbid(unsafe_code)]

use crate::handlers::{
    acquisitions, admin, blocks, cutting_sessions, health, lens_corrections, rois, sections,
    specimens, substrates, tasks, tiles,
};
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, patch, post};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/specimens", post(specimens::create).get(specimens::list))
        .route(
            "/specimens/:specimen_id",
            get(specimens::get)
                .patch(specimens::update)
                .delete(specimens::delete),
        )
        .route(
            "/specimens/:specimen_id/images",
            post(specimens::add_image).delete(specimens::remove_image),
        )
        .route("/specimens/:specimen_id/blocks", get(specimens::blocks))
        .route("/blocks", post(blocks::create).get(blocks::list))
        .route(
            "/blocks/:specimen_id/:block_id",
            get(blocks::get).patch(blocks::update).delete(blocks::delete),
        )
        .route(
            "/blocks/:specimen_id/:block_id/cutting-sessions",
            get(blocks::cutting_sessions),
        )
        .route(
            "/cutting-sessions",
            post(cutting_sessions::create).get(cutting_sessions::list),
        )
        .route(
            "/cutting-sessions/:cutting_session_id",
            get(cutting_sessions::get)
                .patch(cutting_sessions::update)
                .delete(cutting_sessions::delete),
        )
        .route(
            "/cutting-sessions/:cutting_session_id/sections",
            get(cutting_sessions::sections),
        )
        .route("/substrates", post(substrates::create).get(substrates::list))
        .route(
            "/substrates/:media_id",
            get(substrates::get)
                .patch(substrates::update)
                .delete(substrates::delete),
        )
        .route("/sections", post(sections::create).get(sections::list))
        .route("/sections/batch", post(sections::create_batch))
        .route(
            "/sections/:section_id",
            get(sections::get)
                .patch(sections::update)
                .delete(sections::delete),
        )
        .route("/sections/:section_id/rois", get(sections::rois))
        .route("/rois", post(rois::create).get(rois::list))
        .route("/rois/batch", post(rois::create_batch))
        .route(
            "/rois/:roi_id",
            get(rois::get).patch(rois::update).delete(rois::delete),
        )
        .route("/rois/:roi_id/children", get(rois::children))
        .route("/rois/:roi_id/hierarchy", get(rois::hierarchy))
        .route("/acquisition-tasks", post(tasks::create).get(tasks::list))
        .route("/acquisition-tasks/batch", post(tasks::create_batch))
        .route(
            "/acquisition-tasks/:task_id",
            get(tasks::get).patch(tasks::update).delete(tasks::delete),
        )
        .route("/acquisition-tasks/:task_id/status", patch(tasks::update_status))
        .route("/acquisition-tasks/:task_id/versions", get(tasks::versions))
        .route(
            "/acquisition-tasks/:task_id/acquisitions",
            get(tasks::acquisitions),
        )
        .route(
            "/acquisitions",
            post(acquisitions::create).get(acquisitions::list),
        )
        .route(
            "/acquisitions/:acquisition_id",
            get(acquisitions::get)
                .patch(acquisitions::update)
                .delete(acquisitions::delete),
        )
        .route(
            "/acquisitions/:acquisition_id/versions",
            get(acquisitions::versions),
        )
        .route(
            "/acquisitions/:acquisition_id/tiles",
            post(tiles::add).get(tiles::list),
        )
        .route(
            "/acquisitions/:acquisition_id/tiles/batch",
            post(tiles::add_batch),
        )
        .route(
            "/acquisitions/:acquisition_id/tiles/count",
            get(tiles::count),
        )
        .route(
            "/acquisitions/:acquisition_id/tiles/:tile_id",
            get(tiles::get).delete(tiles::delete),
        )
        .route(
            "/qc/:acquisition_id/focus-scores",
            get(tiles::focus_scores),
        )
        .route("/lens-corrections", get(lens_corrections::list))
        .route("/lens-corrections/current", get(lens_corrections::current))
        .route("/lens-corrections/latest", get(lens_corrections::latest))
        .route("/lens-corrections/orphans", get(lens_corrections::orphans))
        .route(
            "/lens-corrections/:acquisition_id/acquisitions",
            get(lens_corrections::acquisitions),
        )
        .route("/admin/integrity", get(admin::integrity))
        .with_state(state)
}
