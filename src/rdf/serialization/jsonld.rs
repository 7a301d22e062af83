//! JSON-LD format implementation (expanded form, serialization only)

use super::{ParseError, ParseResult, RdfFormat, SerializeError, SerializeResult};
use crate::rdf::vocab::XSD_STRING;
use crate::rdf::{RdfObject, RdfSubject, TripleSet};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::io::{BufRead, Write};

/// JSON-LD parser
pub struct JsonLdParserWrapper;

impl JsonLdParserWrapper {
    /// JSON-LD input needs a full expansion processor, which is not available.
    pub fn parse<R: BufRead>(_reader: R) -> ParseResult<TripleSet> {
        Err(ParseError::UnsupportedFormat(RdfFormat::JsonLd))
    }
}

/// JSON-LD serializer
pub struct JsonLdSerializerWrapper;

impl JsonLdSerializerWrapper {
    /// Serialize a triple set as an expanded JSON-LD document: one node object
    /// per subject, in order of first appearance.
    pub fn serialize<W: Write>(triples: &TripleSet, output: W) -> SerializeResult<()> {
        let mut nodes: IndexMap<String, IndexMap<String, Vec<Value>>> = IndexMap::new();

        for triple in triples {
            let subject = match &triple.subject {
                RdfSubject::NamedNode(n) => n.as_str().to_string(),
                RdfSubject::BlankNode(b) => b.to_string(),
            };
            let predicate = triple.predicate.as_str().to_string();
            let object = match &triple.object {
                RdfObject::NamedNode(n) => json!({ "@id": n.as_str() }),
                RdfObject::BlankNode(b) => json!({ "@id": b.to_string() }),
                RdfObject::Literal(l) => {
                    if let Some(lang) = l.language() {
                        json!({ "@value": l.value(), "@language": lang })
                    } else {
                        let datatype = l.datatype();
                        if datatype.as_str() == XSD_STRING {
                            json!({ "@value": l.value() })
                        } else {
                            json!({ "@value": l.value(), "@type": datatype.as_str() })
                        }
                    }
                }
            };

            nodes
                .entry(subject)
                .or_default()
                .entry(predicate)
                .or_default()
                .push(object);
        }

        let document: Vec<Value> = nodes
            .into_iter()
            .map(|(subject, properties)| {
                let mut node = Map::new();
                node.insert("@id".to_string(), Value::String(subject));
                for (predicate, objects) in properties {
                    node.insert(predicate, Value::Array(objects));
                }
                Value::Object(node)
            })
            .collect();

        serde_json::to_writer_pretty(output, &document)
            .map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}
