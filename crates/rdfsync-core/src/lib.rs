//! rdfsync-core: Shared types and naming rules for the rdfsync workspace.
//!
//! This crate provides the pieces every other rdfsync crate agrees on:
//! - The filename <-> context IRI naming protocol
//! - File, import and cycle record types
//! - The vocabulary used for import bookkeeping inside the store
//! - Mapping error types

pub mod error;
pub mod mapping;
pub mod types;
pub mod vocab;

pub use error::MappingError;
pub use mapping::{context_from_filename, filename_from_context};
pub use types::{CycleId, FileRecord, ImportRecord, RdfFormat};
