//! Turtle format implementation

use super::{from_rio_triple, with_rio_triple, ParseError, ParseResult, SerializeResult};
use crate::rdf::TripleSet;
use oxiri::Iri;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io::{BufRead, Write};

/// Turtle parser
pub struct TurtleParserWrapper;

impl TurtleParserWrapper {
    /// Parse Turtle input into a triple set
    pub fn parse<R: BufRead>(reader: R, base: Option<Iri<String>>) -> ParseResult<TripleSet> {
        let mut parser = TurtleParser::new(reader, base);
        let mut triples = TripleSet::new();

        let result: Result<(), ParseError> = parser.parse_all(&mut |t| {
            triples.insert(from_rio_triple(t)?);
            Ok(())
        });
        result.map(|_| triples)
    }
}

/// Turtle serializer
pub struct TurtleSerializerWrapper;

impl TurtleSerializerWrapper {
    /// Serialize a triple set as Turtle
    pub fn serialize<W: Write>(triples: &TripleSet, output: W) -> SerializeResult<()> {
        let mut formatter = TurtleFormatter::new(output);
        for triple in triples {
            with_rio_triple(triple, |t| formatter.format(t))?;
        }
        formatter.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_turtle_roundtrip() {
        let input = r#"<http://example.org/a> <http://example.org/b> "c" ."#;
        let triples = TurtleParserWrapper::parse(Cursor::new(input), None).unwrap();
        assert_eq!(triples.len(), 1);

        let mut output = Vec::new();
        TurtleSerializerWrapper::serialize(&triples, &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("http://example.org/a"));

        let reparsed = TurtleParserWrapper::parse(Cursor::new(output), None).unwrap();
        assert_eq!(reparsed, triples);
    }

    #[test]
    fn test_typed_literal_survives() {
        let input = r#"<http://example.org/a> <http://example.org/b> "2017-01-01T10:00:00Z"^^<http://www.w3.org/2001/XMLSchema#dateTime> ."#;
        let triples = TurtleParserWrapper::parse(Cursor::new(input), None).unwrap();

        let mut output = Vec::new();
        TurtleSerializerWrapper::serialize(&triples, &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("XMLSchema#dateTime"));
    }
}
