//! Filename <-> context IRI naming protocol.
//!
//! A file `{root}/{dir}/{dir}/{name}.{ext}` is loaded into the context
//! `{prefix}/{dir}/{dir}/{name}#context`. Both directions are pure: no
//! filesystem access happens here.

use std::path::{Component, Path, PathBuf};

use oxrdf::NamedNode;

use crate::error::MappingError;
use crate::types::RdfFormat;

const CONTEXT_SUFFIX: &str = "#context";

/// Map a file under `root` to the context it is loaded into.
///
/// Fails if `path` is not under `root` or its extension is not one of
/// `allowed`. Files with several recognized extensions for the same name
/// map to the same context; which one wins is not defined.
pub fn context_from_filename(
    path: &Path,
    prefix: &str,
    root: &Path,
    allowed: &[RdfFormat],
) -> Result<NamedNode, MappingError> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| MappingError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    if RdfFormat::for_path(path, allowed).is_none() {
        return Err(MappingError::UnknownExtension {
            path: path.to_path_buf(),
        });
    }

    let stem = rel.with_extension("");
    let mut segments = Vec::new();
    for component in stem.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| MappingError::NonUtf8Path {
                    path: path.to_path_buf(),
                })?;
                segments.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(MappingError::OutsideRoot {
                    path: path.to_path_buf(),
                    root: root.to_path_buf(),
                })
            }
        }
    }

    if segments.is_empty() {
        return Err(MappingError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    let iri = format!(
        "{}{}{CONTEXT_SUFFIX}",
        normalize_prefix(prefix),
        segments.join("/")
    );
    NamedNode::new(iri.as_str()).map_err(|e| MappingError::InvalidIri {
        iri,
        reason: e.to_string(),
    })
}

/// Map a context back to the N-Triples file it is exported to.
///
/// The inverse of [`context_from_filename`] except that the extension is
/// always `.nt`.
pub fn filename_from_context(
    context: &NamedNode,
    prefix: &str,
    root: &Path,
) -> Result<PathBuf, MappingError> {
    let context = context.as_str();
    let prefix = normalize_prefix(prefix);

    let rest = context
        .strip_prefix(prefix.as_str())
        .ok_or_else(|| MappingError::PrefixMismatch {
            context: context.to_string(),
            prefix: prefix.clone(),
        })?;
    let inner = rest
        .strip_suffix(CONTEXT_SUFFIX)
        .ok_or_else(|| MappingError::MissingContextSuffix {
            context: context.to_string(),
        })?;

    let segments: Vec<&str> = inner.split('/').collect();
    let escapes = segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..");
    if escapes {
        return Err(MappingError::EscapesRoot {
            context: context.to_string(),
        });
    }

    let mut path = root.to_path_buf();
    let (last, dirs) = segments
        .split_last()
        .ok_or_else(|| MappingError::EscapesRoot {
            context: context.to_string(),
        })?;
    for dir in dirs {
        path.push(dir);
    }
    path.push(format!("{last}.{}", RdfFormat::NTriples.extension()));
    Ok(path)
}

/// Prefixes always end in exactly one `/`.
fn normalize_prefix(prefix: &str) -> String {
    format!("{}/", prefix.trim_end_matches('/'))
}
