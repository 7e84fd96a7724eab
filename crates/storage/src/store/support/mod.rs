#![forbid(unsafe_code)]

mod containment;
mod guard;
mod rows;
mod schema;

pub use containment::{RoiParentKeys, validate_task_roi_consistency};
pub(in crate::store) use containment::*;
pub(in crate::store) use guard::*;
pub(in crate::store) use rows::*;
pub(in crate::store) use schema::install_schema;
