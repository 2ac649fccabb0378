pub mod classifier;
pub mod csv_exporter;
pub mod normalizer;

pub use classifier::{classify, merge, Classification};
pub use normalizer::{normalize_cells, normalize_text, to_text};
