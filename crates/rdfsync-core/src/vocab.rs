//! Terms used for import bookkeeping.
//!
//! The namespace is shared with existing stores populated by earlier sync
//! tools, so records written by them are read back unchanged.

use oxrdf::NamedNodeRef;

pub const IMPORT_NS: &str = "http://projects.bigasterisk.com/2006/01/syncImport/";

/// Context holding every import record. Application data never lives here.
pub const INTERNAL_CONTEXT: NamedNodeRef<'static> = NamedNodeRef::new_unchecked(
    "http://projects.bigasterisk.com/2006/01/syncImport/dbInternal#context",
);

/// `xsd:dateTime` of the last successful import of a context.
pub const LAST_IMPORT_TIME: NamedNodeRef<'static> = NamedNodeRef::new_unchecked(
    "http://projects.bigasterisk.com/2006/01/syncImport/lastImportTime",
);

/// Path of the file a context was imported from.
pub const FILENAME: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://projects.bigasterisk.com/2006/01/syncImport/filename");

/// blake3 digest of the imported bytes.
pub const CONTENT_HASH: NamedNodeRef<'static> = NamedNodeRef::new_unchecked(
    "http://projects.bigasterisk.com/2006/01/syncImport/contentHash",
);
