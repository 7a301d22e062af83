//! RDF/XML format implementation

use super::{from_rio_triple, with_rio_triple, ParseError, ParseResult, SerializeResult};
use crate::rdf::TripleSet;
use oxiri::Iri;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_xml::{RdfXmlFormatter, RdfXmlParser};
use std::io::{BufRead, Write};

/// RDF/XML parser
pub struct RdfXmlParserWrapper;

impl RdfXmlParserWrapper {
    /// Parse RDF/XML input into a triple set
    pub fn parse<R: BufRead>(reader: R, base: Option<Iri<String>>) -> ParseResult<TripleSet> {
        let mut parser = RdfXmlParser::new(reader, base);
        let mut triples = TripleSet::new();

        let result: Result<(), ParseError> = parser.parse_all(&mut |t| {
            triples.insert(from_rio_triple(t)?);
            Ok(())
        });
        result.map(|_| triples)
    }
}

/// RDF/XML serializer
pub struct RdfXmlSerializerWrapper;

impl RdfXmlSerializerWrapper {
    /// Serialize a triple set as RDF/XML
    pub fn serialize<W: Write>(triples: &TripleSet, output: W) -> SerializeResult<()> {
        let mut formatter = RdfXmlFormatter::new(output)?;
        for triple in triples {
            with_rio_triple(triple, |t| formatter.format(t))?;
        }
        formatter.finish()?;
        Ok(())
    }
}
