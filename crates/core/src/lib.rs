#![forbid(unsafe_code)]

pub mod hierarchy;
pub mod ids;
pub mod model;
