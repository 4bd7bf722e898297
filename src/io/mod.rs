pub mod file;
pub mod records;

pub use file::{load_dataset, save_dataset, JsonFileBackend};
pub use records::{ingest, DatasetRecord, DateValue};
