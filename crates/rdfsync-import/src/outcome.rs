//! Result of one per-file step of a reconciliation cycle.

use oxrdf::NamedNode;

/// What a successful step did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The file was parsed into its context and the ledger updated.
    Loaded { context: NamedNode, statements: usize },
    /// The file disappeared; its context and ledger record were removed.
    Cleared { context: NamedNode },
    /// A vanished file whose context was reloaded from another file in the
    /// same cycle, e.g. after `a.nt` was renamed to `a.n3`. Left alone.
    Reassigned { context: NamedNode },
    /// A vanished filename that does not resolve under this root. Another
    /// importer with a different root may own it.
    NotOwned,
}

/// Per-file step result. Every variant other than `Ok` leaves the file's
/// context and ledger record as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Ok(Applied),
    MappingSkipped(String),
    ParseFailed(String),
    Unexpected(String),
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}
