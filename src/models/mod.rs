pub mod entity_type;
pub mod identifier;
pub mod loaders;
pub mod outcome;
pub mod record;
pub mod row;

pub use entity_type::{BusinessIndicator, EntityTypeFilter};
pub use identifier::Identifier;
pub use loaders::{load_identifier_column, read_identifier_column};
pub use outcome::RawOutcome;
pub use record::{CroCompanyPayload, RegistryRecord};
pub use row::{ExportRow, LookupTable, ResultRow, RowStatus};
