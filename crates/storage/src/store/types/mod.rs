#![forbid(unsafe_code)]

mod acquisitions;
mod integrity;
mod rois;
mod samples;
mod sections;
mod tasks;

pub use acquisitions::*;
pub use integrity::*;
pub use rois::*;
pub use samples::*;
pub use sections::*;
pub use tasks::*;
