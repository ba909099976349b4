//! Core object store for hbnb records.
//! This crate owns record identity, the file-backed registry and the console
//! that drives them.

pub mod console;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod storage;

pub use console::{Command, Console, Flow};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::kind::{FieldDefault, FieldSpec, RecordKind, ALL_KINDS};
pub use model::record::{
    composite_key, split_composite_key, EncodedRecord, Record, RecordError, KIND_FIELD,
};
pub use model::timestamp::{Timestamp, TIMESTAMP_FORMAT};
pub use model::value::{FieldType, FieldValue};
pub use registry::{TypeRegistry, TypeRegistryError};
pub use service::record_service::{AttributeInput, RecordService, ServiceError, ServiceResult};
pub use storage::{
    FileStorage, RecordStorage, StorageError, StorageResult, DEFAULT_STORAGE_FILE,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
