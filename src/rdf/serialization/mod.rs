//! RDF serialization formats
//!
//! Supports:
//! - Turtle (TTL)
//! - N-Triples (NT)
//! - RDF/XML
//! - JSON-LD (serialization only)

mod jsonld;
mod ntriples;
mod rdfxml;
mod turtle;

use crate::rdf::vocab::XSD_STRING;
use crate::rdf::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple, TripleSet};
use oxiri::Iri;
use rio_api::model as rio;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::str::FromStr;
use thiserror::Error;

pub use jsonld::{JsonLdParserWrapper, JsonLdSerializerWrapper};
pub use ntriples::{NTriplesParserWrapper, NTriplesSerializerWrapper};
pub use rdfxml::{RdfXmlParserWrapper, RdfXmlSerializerWrapper};
pub use turtle::{TurtleParserWrapper, TurtleSerializerWrapper};

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    #[default]
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// RDF/XML format (.rdf)
    RdfXml,
    /// JSON-LD format (.jsonld)
    JsonLd,
}

impl RdfFormat {
    /// Canonical media type
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::JsonLd => "application/ld+json",
        }
    }

    /// Preferred file extension
    pub fn file_extension(&self) -> &'static str {
        match self {
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
            RdfFormat::RdfXml => "rdf",
            RdfFormat::JsonLd => "jsonld",
        }
    }

    /// Guess the format from a file extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
            "jsonld" | "json" => Some(RdfFormat::JsonLd),
            _ => None,
        }
    }

    /// Guess the format from a media type, ignoring parameters such as `charset`
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "text/turtle" | "application/x-turtle" => Some(RdfFormat::Turtle),
            "application/n-triples" | "text/plain" => Some(RdfFormat::NTriples),
            "application/rdf+xml" | "application/xml" => Some(RdfFormat::RdfXml),
            "application/ld+json" => Some(RdfFormat::JsonLd),
            _ => None,
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::Turtle => "turtle",
            RdfFormat::NTriples => "n-triples",
            RdfFormat::RdfXml => "rdf-xml",
            RdfFormat::JsonLd => "json-ld",
        };
        f.write_str(name)
    }
}

impl FromStr for RdfFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" => Ok(RdfFormat::Turtle),
            "n-triples" | "ntriples" => Ok(RdfFormat::NTriples),
            "rdf-xml" | "rdfxml" => Ok(RdfFormat::RdfXml),
            "json-ld" | "jsonld" => Ok(RdfFormat::JsonLd),
            other => RdfFormat::from_extension(other)
                .ok_or_else(|| ParseError::UnknownFormat(s.to_string())),
        }
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed Turtle or N-Triples input
    #[error("Turtle parse error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    /// Malformed RDF/XML input
    #[error("RDF/XML parse error: {0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),

    /// Input parsed but contained something the triple model cannot hold
    #[error("Parse error: {0}")]
    Parse(String),

    /// Base IRI is not an absolute IRI
    #[error("Invalid base IRI {iri}: {reason}")]
    InvalidBase { iri: String, reason: String },

    /// Unsupported format
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(RdfFormat),

    /// Format name not recognized
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(RdfFormat),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a reader. `base` resolves relative IRIs in the input.
    pub fn parse<R: Read>(input: R, base: Option<&str>, format: RdfFormat) -> ParseResult<TripleSet> {
        let reader = BufReader::new(input);
        Self::parse_buffered(reader, base, format)
    }

    /// Parse RDF data from a string
    pub fn parse_str(input: &str, base: Option<&str>, format: RdfFormat) -> ParseResult<TripleSet> {
        Self::parse_buffered(Cursor::new(input.as_bytes()), base, format)
    }

    /// Parse RDF data from a file, guessing the format from its extension
    pub fn parse_file(path: &std::path::Path, base: Option<&str>) -> ParseResult<TripleSet> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let format = RdfFormat::from_extension(extension)
            .ok_or_else(|| ParseError::UnknownFormat(path.display().to_string()))?;
        let file = std::fs::File::open(path)?;
        Self::parse(file, base, format)
    }

    fn parse_buffered<R: BufRead>(reader: R, base: Option<&str>, format: RdfFormat) -> ParseResult<TripleSet> {
        let base = base.map(parse_base).transpose()?;
        match format {
            RdfFormat::Turtle => TurtleParserWrapper::parse(reader, base),
            RdfFormat::NTriples => NTriplesParserWrapper::parse(reader),
            RdfFormat::RdfXml => RdfXmlParserWrapper::parse(reader, base),
            RdfFormat::JsonLd => JsonLdParserWrapper::parse(reader),
        }
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize triples to a string
    pub fn serialize(triples: &TripleSet, format: RdfFormat) -> SerializeResult<String> {
        let mut output = Vec::new();
        Self::serialize_to(triples, &mut output, format)?;
        String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }

    /// Serialize triples into a writer
    pub fn serialize_to<W: Write>(triples: &TripleSet, output: W, format: RdfFormat) -> SerializeResult<()> {
        match format {
            RdfFormat::Turtle => TurtleSerializerWrapper::serialize(triples, output),
            RdfFormat::NTriples => NTriplesSerializerWrapper::serialize(triples, output),
            RdfFormat::RdfXml => RdfXmlSerializerWrapper::serialize(triples, output),
            RdfFormat::JsonLd => JsonLdSerializerWrapper::serialize(triples, output),
        }
    }

    /// Serialize triples to a file
    pub fn serialize_file(
        triples: &TripleSet,
        path: &std::path::Path,
        format: RdfFormat,
    ) -> SerializeResult<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        Self::serialize_to(triples, &mut writer, format)?;
        writer.flush()?;
        Ok(())
    }
}

fn parse_base(base: &str) -> ParseResult<Iri<String>> {
    Iri::parse(base.to_string()).map_err(|e| ParseError::InvalidBase {
        iri: base.to_string(),
        reason: e.to_string(),
    })
}

/// Hands a rio view of `triple` to `f`; rio terms borrow their strings.
pub(crate) fn with_rio_triple<R>(triple: &Triple, f: impl FnOnce(&rio::Triple<'_>) -> R) -> R {
    let subject = match &triple.subject {
        RdfSubject::NamedNode(n) => rio::Subject::NamedNode(rio::NamedNode { iri: n.as_str() }),
        RdfSubject::BlankNode(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.as_str() }),
    };
    let predicate = rio::NamedNode {
        iri: triple.predicate.as_str(),
    };

    let datatype;
    let object = match &triple.object {
        RdfObject::NamedNode(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
        RdfObject::BlankNode(b) => rio::Term::BlankNode(rio::BlankNode { id: b.as_str() }),
        RdfObject::Literal(l) => {
            let literal = if let Some(language) = l.language() {
                rio::Literal::LanguageTaggedString {
                    value: l.value(),
                    language,
                }
            } else {
                datatype = l.datatype();
                if datatype.as_str() == XSD_STRING {
                    rio::Literal::Simple { value: l.value() }
                } else {
                    rio::Literal::Typed {
                        value: l.value(),
                        datatype: rio::NamedNode {
                            iri: datatype.as_str(),
                        },
                    }
                }
            };
            rio::Term::Literal(literal)
        }
    };

    f(&rio::Triple {
        subject,
        predicate,
        object,
    })
}

/// Converts a parsed rio triple into an owned one
pub(crate) fn from_rio_triple(t: rio::Triple<'_>) -> ParseResult<Triple> {
    let subject = match t.subject {
        rio::Subject::NamedNode(n) => RdfSubject::NamedNode(named_node(n.iri)?),
        rio::Subject::BlankNode(b) => RdfSubject::BlankNode(blank_node(b.id)?),
        _ => return Err(ParseError::Parse("Unsupported subject type".to_string())),
    };
    let predicate = RdfPredicate::from(named_node(t.predicate.iri)?);
    let object = match t.object {
        rio::Term::NamedNode(n) => RdfObject::NamedNode(named_node(n.iri)?),
        rio::Term::BlankNode(b) => RdfObject::BlankNode(blank_node(b.id)?),
        rio::Term::Literal(rio::Literal::Simple { value }) => {
            RdfObject::Literal(Literal::new_simple_literal(value))
        }
        rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => {
            RdfObject::Literal(
                Literal::new_language_tagged_literal(value, language)
                    .map_err(|e| ParseError::Parse(e.to_string()))?,
            )
        }
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => {
            RdfObject::Literal(Literal::new_typed_literal(value, named_node(datatype.iri)?))
        }
        _ => return Err(ParseError::Parse("Unsupported object type".to_string())),
    };
    Ok(Triple::new(subject, predicate, object))
}

fn named_node(iri: &str) -> ParseResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn blank_node(id: &str) -> ParseResult<BlankNode> {
    BlankNode::with_id(id).map_err(|e| ParseError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lookup() {
        assert_eq!(RdfFormat::from_extension("TTL"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("nt"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_extension("csv"), None);
        assert_eq!(
            RdfFormat::from_media_type("text/turtle; charset=utf-8"),
            Some(RdfFormat::Turtle)
        );
        assert_eq!("n-triples".parse::<RdfFormat>().unwrap(), RdfFormat::NTriples);
        assert!("yaml".parse::<RdfFormat>().is_err());
    }

    #[test]
    fn test_format_display_matches_serde_names() {
        for format in [RdfFormat::Turtle, RdfFormat::NTriples, RdfFormat::RdfXml, RdfFormat::JsonLd] {
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{}\"", format));
            assert_eq!(format.to_string().parse::<RdfFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_parse_with_base_resolves_relative_iris() {
        let input = "<#me> <http://xmlns.com/foaf/0.1/name> \"Alice\" .";
        let triples =
            RdfParser::parse_str(input, Some("http://example.org/profile"), RdfFormat::Turtle).unwrap();
        let triple = triples.iter().next().unwrap();
        assert_eq!(triple.subject.as_str(), "http://example.org/profile#me");
    }

    #[test]
    fn test_invalid_base_rejected() {
        let result = RdfParser::parse_str("", Some("not absolute"), RdfFormat::Turtle);
        assert!(matches!(result, Err(ParseError::InvalidBase { .. })));
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let result = RdfParser::parse_str("<http://example.org/a> <http://example.org/b>", None, RdfFormat::Turtle);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_file_roundtrip() {
        let mut triples = TripleSet::new();
        triples.add(
            NamedNode::new("http://example.org/a").unwrap(),
            NamedNode::new("http://example.org/b").unwrap(),
            Literal::new_simple_literal("c"),
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.nt");
        RdfSerializer::serialize_file(&triples, &path, RdfFormat::NTriples).unwrap();

        let parsed = RdfParser::parse_file(&path, None).unwrap();
        assert_eq!(parsed, triples);
    }
}
