pub mod ingest;
pub mod transform;

pub use ingest::IngestHandler;
pub use transform::{parse_and_validate, transform, ValidationError};
