//! N-Triples format implementation

use super::{from_rio_triple, with_rio_triple, ParseError, ParseResult, SerializeResult};
use crate::rdf::TripleSet;
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser};
use std::io::{BufRead, Write};

/// N-Triples parser
pub struct NTriplesParserWrapper;

impl NTriplesParserWrapper {
    /// Parse N-Triples input into a triple set. N-Triples has no relative IRIs.
    pub fn parse<R: BufRead>(reader: R) -> ParseResult<TripleSet> {
        let mut parser = NTriplesParser::new(reader);
        let mut triples = TripleSet::new();

        let result: Result<(), ParseError> = parser.parse_all(&mut |t| {
            triples.insert(from_rio_triple(t)?);
            Ok(())
        });
        result.map(|_| triples)
    }
}

/// N-Triples serializer
pub struct NTriplesSerializerWrapper;

impl NTriplesSerializerWrapper {
    /// Serialize a triple set as N-Triples, one statement per line
    pub fn serialize<W: Write>(triples: &TripleSet, output: W) -> SerializeResult<()> {
        let mut formatter = NTriplesFormatter::new(output);
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
    fn test_ntriples_one_line_per_triple() {
        let input = "<http://example.org/a> <http://example.org/b> \"c\" .\n\
                     <http://example.org/a> <http://example.org/b> <http://example.org/d> .\n";
        let triples = NTriplesParserWrapper::parse(Cursor::new(input)).unwrap();
        assert_eq!(triples.len(), 2);

        let mut output = Vec::new();
        NTriplesSerializerWrapper::serialize(&triples, &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_ntriples_rejects_relative_iris() {
        let input = "<#a> <http://example.org/b> \"c\" .\n";
        assert!(NTriplesParserWrapper::parse(Cursor::new(input)).is_err());
    }
}
