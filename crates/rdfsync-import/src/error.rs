//! Error types for the rdfsync-import crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Graph error: {0}")]
    Graph(#[from] rdfsync_graph::GraphError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] rdfsync_core::MappingError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
