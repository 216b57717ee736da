//! rdfsync Graph: the triple store as seen by the sync loop.
//!
//! Every read and write the importer makes goes through the [`Graph`]
//! trait. [`MemoryGraph`] is the in-process implementation; remote stores
//! implement the same trait.

pub mod client;
pub mod export;
pub mod memory;
pub mod parse;

pub use client::{Graph, GraphError, TriplePattern};
pub use export::save_context;
pub use memory::MemoryGraph;
pub use parse::{parse_document, ParseError};
