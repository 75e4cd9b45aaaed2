pub mod evaluation;
pub mod linalg;
pub mod matrix;
pub mod stats;
