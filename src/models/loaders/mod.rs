pub mod csv_loader;

pub use csv_loader::{load_identifier_column, read_identifier_column};
