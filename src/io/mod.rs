//! Dataset loading and report output at the edges of a detection run.

pub mod loader;
pub mod report;
