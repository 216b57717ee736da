//! Document parsing into owned triples.
//!
//! Parsing always completes into memory before anything is written to a
//! store; a syntax error anywhere in the document discards the whole batch.

use oxrdf::{NamedNode, Triple};
use oxrdfxml::RdfXmlParser;
use oxttl::{NTriplesParser, TurtleParser};

use rdfsync_core::RdfFormat;

/// A document could not be parsed in the format implied by its extension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{format} syntax error: {message}")]
pub struct ParseError {
    pub format: RdfFormat,
    pub message: String,
}

impl ParseError {
    fn new(format: RdfFormat, err: impl std::fmt::Display) -> Self {
        Self {
            format,
            message: err.to_string(),
        }
    }
}

/// Parse a whole document. Relative IRIs resolve against `base`.
///
/// `.n3` documents are read with the Turtle grammar, which covers the N3
/// used for plain data files.
pub fn parse_document(
    source: &[u8],
    base: &NamedNode,
    format: RdfFormat,
) -> Result<Vec<Triple>, ParseError> {
    match format {
        RdfFormat::NTriples => NTriplesParser::new()
            .for_reader(source)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ParseError::new(format, e)),
        RdfFormat::N3 => TurtleParser::new()
            .with_base_iri(base.as_str())
            .map_err(|e| ParseError::new(format, e))?
            .for_reader(source)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ParseError::new(format, e)),
        RdfFormat::RdfXml => RdfXmlParser::new()
            .with_base_iri(base.as_str())
            .map_err(|e| ParseError::new(format, e))?
            .for_reader(source)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ParseError::new(format, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, Term};

    fn base() -> NamedNode {
        NamedNode::new("http://example.org/new#context").unwrap()
    }

    #[test]
    fn parses_ntriples() {
        let doc = b"<http://example.org/dp> <http://example.org/name> \"Drew\" .\n";
        let triples = parse_document(doc, &base(), RdfFormat::NTriples).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0].object,
            Term::Literal(Literal::new_simple_literal("Drew"))
        );
    }

    #[test]
    fn parses_ntriples_without_trailing_newline() {
        let doc = b"<http://example.org/dp> <http://example.org/name> \"Drew\" .";
        let triples = parse_document(doc, &base(), RdfFormat::NTriples).unwrap();
        assert_eq!(triples.len(), 1);
    }

    #[test]
    fn parses_typed_literal() {
        let doc = b"<http://example.org/dp> <http://example.org/date> \"2007-02-05\"^^<http://www.w3.org/2001/XMLSchema#date> .\n";
        let triples = parse_document(doc, &base(), RdfFormat::NTriples).unwrap();
        let expected = Literal::new_typed_literal(
            "2007-02-05",
            NamedNode::new("http://www.w3.org/2001/XMLSchema#date").unwrap(),
        );
        assert_eq!(triples[0].object, Term::Literal(expected));
    }

    #[test]
    fn parses_n3_with_prefixes() {
        let doc = b"@prefix : <http://example.org/> .\n:dp :name \"from n3\" .\n";
        let triples = parse_document(doc, &base(), RdfFormat::N3).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0].predicate,
            NamedNode::new("http://example.org/name").unwrap()
        );
    }

    #[test]
    fn n3_relative_iris_resolve_against_context() {
        let doc = b"<#me> <http://example.org/name> \"Drew\" .\n";
        let triples = parse_document(doc, &base(), RdfFormat::N3).unwrap();
        assert_eq!(
            triples[0].subject.to_string(),
            "<http://example.org/new#me>"
        );
    }

    #[test]
    fn parses_rdfxml() {
        let doc = br#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/">
  <rdf:Description rdf:about="http://example.org/dp">
    <ex:name>Drew</ex:name>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = parse_document(doc, &base(), RdfFormat::RdfXml).unwrap();
        assert_eq!(triples.len(), 1);
    }

    #[test]
    fn corrupt_ntriples_is_an_error() {
        let err = parse_document(b"<corrupt or partial file", &base(), RdfFormat::NTriples)
            .unwrap_err();
        assert_eq!(err.format, RdfFormat::NTriples);
    }

    #[test]
    fn error_after_valid_lines_discards_everything() {
        let doc = b"<http://example.org/a> <http://example.org/b> \"ok\" .\n<broken\n";
        assert!(parse_document(doc, &base(), RdfFormat::NTriples).is_err());
    }

    #[test]
    fn corrupt_rdfxml_is_an_error() {
        assert!(parse_document(b"<rdf:RDF", &base(), RdfFormat::RdfXml).is_err());
    }
}
