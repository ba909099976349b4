//! Record domain model.
//!
//! # Responsibility
//! - Define the record shape shared by every domain kind.
//! - Keep identity, timestamps and field values in one canonical structure.
//!
//! # Invariants
//! - Every record is identified by a stable id, unique per kind and file.
//! - Kind-specific fields are declarative data, not separate types.

pub mod kind;
pub mod record;
pub mod timestamp;
pub mod value;
