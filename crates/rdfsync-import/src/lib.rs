//! rdfsync-import: keeps graph contexts in sync with a tree of RDF files.
//!
//! Each cycle walks the input root, reloads every file that is new or
//! changed since its last recorded import, and clears the contexts of files
//! that disappeared. Import bookkeeping lives in the store itself, in a
//! dedicated internal context.

pub mod config;
pub mod errlog;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod loader;
pub mod outcome;
pub mod reconcile;
pub mod scanner;
pub mod scheduler;

pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use reconcile::{CycleReport, Reconciler};
pub use scheduler::SyncHandle;
