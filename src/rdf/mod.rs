//! RDF data model and format support
//!
//! This module provides the graph side of the bean mapping:
//! - RDF terms and triples (subject-predicate-object)
//! - An insertion-ordered triple set
//! - Parsing and serialization (Turtle, N-Triples, RDF/XML, JSON-LD output)
//!
//! # Example
//!
//! ```rust
//! use rdf_beans::rdf::{Literal, NamedNode, RdfFormat, RdfSerializer, TripleSet};
//!
//! let mut triples = TripleSet::new();
//! triples.add(
//!     NamedNode::new("http://example.org/alice").unwrap(),
//!     NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
//!     Literal::new_simple_literal("Alice"),
//! );
//!
//! let turtle = RdfSerializer::serialize(&triples, RdfFormat::Turtle).unwrap();
//! assert!(turtle.contains("\"Alice\""));
//! ```

mod serialization;
mod store;
mod types;
pub mod vocab;

pub use types::{
    BlankNode, Literal, NamedNode, RdfError, RdfObject, RdfPredicate, RdfResult, RdfSubject,
    Triple,
};

pub use store::TripleSet;

pub use serialization::{
    ParseError, ParseResult, RdfFormat, RdfParser, RdfSerializer, SerializeError,
    SerializeResult,
};
