//! The graph store capability consumed by the sync loop.

use async_trait::async_trait;
use oxrdf::{NamedNode, Subject, Term, Triple};

use rdfsync_core::{MappingError, RdfFormat};

use crate::parse::{parse_document, ParseError};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("Context mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// True for malformed input, as opposed to store or I/O failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

/// A triple pattern; `None` positions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Subject>,
    pub predicate: Option<NamedNode>,
    pub object: Option<Term>,
}

impl TriplePattern {
    /// The `(?s ?p ?o)` wildcard.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<Subject>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<NamedNode>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn with_object(mut self, object: impl Into<Term>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

impl From<&Triple> for TriplePattern {
    fn from(triple: &Triple) -> Self {
        Self {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
        }
    }
}

/// A mutable statement store partitioned into named contexts.
///
/// Implementations may be local or remote; every call is a suspension
/// point. SPARQL evaluation belongs to the store and is not part of this
/// capability: reads are triple patterns, optionally scoped to one context.
#[async_trait]
pub trait Graph: Send + Sync {
    /// First object of `(subject, predicate, ?)` in any context.
    async fn value(&self, subject: &NamedNode, predicate: &NamedNode)
        -> Result<Option<Term>, GraphError>;

    /// Add statements to a context.
    async fn add(&self, triples: &[Triple], context: &NamedNode) -> Result<(), GraphError>;

    /// Remove every statement of `context` matching `pattern`.
    async fn remove(&self, pattern: &TriplePattern, context: &NamedNode) -> Result<(), GraphError>;

    /// Statements matching `pattern`, in one context or across all of them.
    async fn triples(
        &self,
        pattern: &TriplePattern,
        context: Option<&NamedNode>,
    ) -> Result<Vec<Triple>, GraphError>;

    /// Remove every statement in a context.
    async fn subgraph_clear(&self, context: &NamedNode) -> Result<(), GraphError>;

    /// Swap the whole content of a context for `triples`.
    ///
    /// Readers must observe either the old content or the new content,
    /// never a cleared or partially filled context.
    async fn replace_context(
        &self,
        context: &NamedNode,
        triples: Vec<Triple>,
    ) -> Result<(), GraphError>;

    /// Names of all non-empty contexts.
    async fn contexts(&self) -> Result<Vec<NamedNode>, GraphError>;

    async fn subgraph_len(&self, context: &NamedNode) -> Result<usize, GraphError> {
        Ok(self.triples(&TriplePattern::any(), Some(context)).await?.len())
    }

    async fn contains(&self, triple: &Triple) -> Result<bool, GraphError> {
        Ok(!self.triples(&triple.into(), None).await?.is_empty())
    }

    /// Parse `source` into `public_id`, replacing its content.
    ///
    /// The document is parsed completely before the store is touched, so a
    /// malformed document fails with [`GraphError::Parse`] and leaves the
    /// context as it was. Returns the number of statements loaded.
    async fn safe_parse(
        &self,
        source: &[u8],
        public_id: &NamedNode,
        format: RdfFormat,
    ) -> Result<usize, GraphError> {
        let triples = parse_document(source, public_id, format)?;
        let count = triples.len();
        self.replace_context(public_id, triples).await?;
        Ok(count)
    }
}
