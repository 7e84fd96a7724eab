#![forbid(unsafe_code)]

mod consistency;
mod dependents;

pub use consistency::*;
pub use dependents::*;

#[cfg(test)]
mod tests;
