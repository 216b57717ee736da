//! Write contexts back to files named after them.

use std::path::{Path, PathBuf};

use oxrdf::NamedNode;

use rdfsync_core::filename_from_context;

use crate::client::{Graph, GraphError, TriplePattern};

/// Serialize one context as N-Triples.
///
/// Context `{prefix}/{dir}/{name}#context` is written to
/// `{root}/{dir}/{name}.nt`; parent directories are created as needed.
/// Lines are sorted so repeated exports of the same content are identical.
pub async fn save_context<G>(
    graph: &G,
    context: &NamedNode,
    prefix: &str,
    root: &Path,
) -> Result<PathBuf, GraphError>
where
    G: Graph + ?Sized,
{
    let path = filename_from_context(context, prefix, root)?;
    let triples = graph.triples(&TriplePattern::any(), Some(context)).await?;

    let mut lines: Vec<String> = triples.iter().map(|t| format!("{t} .\n")).collect();
    lines.sort();

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, lines.concat()).await?;

    tracing::info!(
        context = %context,
        path = %path.display(),
        statements = lines.len(),
        "Context exported"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraph;
    use crate::parse::parse_document;
    use oxrdf::{Literal, Triple};
    use rdfsync_core::RdfFormat;

    #[tokio::test]
    async fn exported_file_parses_back_to_same_statements() {
        let dir = tempfile::tempdir().unwrap();
        let graph = MemoryGraph::new();
        let ctx = NamedNode::new("http://example.org/a/b#context").unwrap();
        let stmts = vec![
            Triple::new(
                NamedNode::new("http://example.org/dp").unwrap(),
                NamedNode::new("http://example.org/name").unwrap(),
                Literal::new_simple_literal("Drew \"the\" dog"),
            ),
            Triple::new(
                NamedNode::new("http://example.org/dp").unwrap(),
                NamedNode::new("http://example.org/lang").unwrap(),
                Literal::new_language_tagged_literal("chien", "fr").unwrap(),
            ),
        ];
        graph.add(&stmts, &ctx).await.unwrap();

        let path = save_context(&graph, &ctx, "http://example.org", dir.path())
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("a").join("b.nt"));

        let bytes = std::fs::read(&path).unwrap();
        let mut parsed = parse_document(&bytes, &ctx, RdfFormat::NTriples).unwrap();
        let mut expected = stmts;
        parsed.sort_by_key(|t| t.to_string());
        expected.sort_by_key(|t| t.to_string());
        assert_eq!(parsed, expected);
    }

    #[tokio::test]
    async fn context_outside_prefix_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        let graph = MemoryGraph::new();
        let ctx = NamedNode::new("http://other.org/a#context").unwrap();

        let err = save_context(&graph, &ctx, "http://example.org", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Mapping(_)));
    }
}
