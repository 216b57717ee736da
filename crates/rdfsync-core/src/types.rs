//! Core domain types shared across rdfsync crates.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Formats ───────────────────────────────────────────────────────

/// Serialization formats recognized in the input tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RdfFormat {
    /// `.nt`
    NTriples,
    /// `.n3`, parsed with the Turtle grammar.
    N3,
    /// `.rdf`, only when RDF/XML input is enabled.
    RdfXml,
}

impl RdfFormat {
    /// Formats accepted when RDF/XML input is disabled.
    pub const DEFAULT: &'static [RdfFormat] = &[RdfFormat::NTriples, RdfFormat::N3];

    /// Formats accepted when RDF/XML input is enabled.
    pub const WITH_RDFXML: &'static [RdfFormat] =
        &[RdfFormat::NTriples, RdfFormat::N3, RdfFormat::RdfXml];

    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::NTriples => "nt",
            Self::N3 => "n3",
            Self::RdfXml => "rdf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "nt" => Some(Self::NTriples),
            "n3" => Some(Self::N3),
            "rdf" => Some(Self::RdfXml),
            _ => None,
        }
    }

    /// Format implied by a path's extension, if it is one of `allowed`.
    pub fn for_path(path: &Path, allowed: &[RdfFormat]) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext).filter(|f| allowed.contains(f))
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NTriples => "N-Triples",
            Self::N3 => "N3",
            Self::RdfXml => "RDF/XML",
        };
        f.write_str(name)
    }
}

// ── Records ───────────────────────────────────────────────────────

/// A candidate input file as seen during one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Modification time of the symlink target, not the link itself.
    pub modified: DateTime<Utc>,
}

/// Bookkeeping for one successfully imported context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub context: NamedNode,
    pub last_import: DateTime<Utc>,
    pub filename: PathBuf,
    /// Hex blake3 digest of the imported bytes. Absent on records written
    /// without one.
    pub content_hash: Option<String>,
}

// ── Cycles ────────────────────────────────────────────────────────

/// Identifier attached to the log lines of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CycleId(pub Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
