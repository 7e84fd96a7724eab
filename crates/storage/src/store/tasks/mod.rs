#![forbid(unsafe_code)]

mod create;
mod edit;
mod query;
