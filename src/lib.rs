//! RDF Beans
//!
//! Maps annotated Rust structs ("beans") to RDF triples and back.
//!
//! # Architecture
//!
//! - [`rdf`]: terms, triples, an insertion-ordered triple set, and the
//!   Turtle / N-Triples / RDF/XML / JSON-LD format layer
//! - [`bean`]: bean descriptors, the caching class analyzer with inheritance
//!   and mixins, the write and read engines, and value converters
//! - [`mapper`]: the [`BeanMapper`] facade combining both
//!
//! ## Example Usage
//!
//! ```rust
//! use rdf_beans::{BeanDescriptor, BeanMapper, Predicate, RdfBean, RdfFormat};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Address {
//!     id: String,
//!     city: String,
//! }
//!
//! impl RdfBean for Address {
//!     fn describe(bean: &mut BeanDescriptor<Self>) {
//!         bean.type_iri("http://schema.org/PostalAddress");
//!         bean.field("id", |a: &Address| &a.id, |a: &mut Address, v| a.id = v)
//!             .subject(true);
//!         bean.field("city", |a: &Address| &a.city, |a: &mut Address, v| a.city = v)
//!             .predicate(Predicate::literal("http://schema.org/addressLocality"));
//!     }
//! }
//!
//! rdf_beans::rdf_nested!(Address);
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     address: Option<Address>,
//! }
//!
//! impl RdfBean for Person {
//!     fn describe(bean: &mut BeanDescriptor<Self>) {
//!         bean.type_iri("http://schema.org/Person");
//!         bean.field("name", |p: &Person| &p.name, |p: &mut Person, v| p.name = v)
//!             .predicate(Predicate::literal("http://schema.org/name"));
//!         bean.field("address", |p: &Person| &p.address, |p: &mut Person, v| p.address = v)
//!             .predicate(Predicate::new("http://schema.org/address"));
//!     }
//! }
//!
//! let mapper = BeanMapper::new();
//! let alice = Person {
//!     name: "Alice".to_string(),
//!     address: Some(Address {
//!         id: "#home".to_string(),
//!         city: "Lyon".to_string(),
//!     }),
//! };
//!
//! let mut turtle = Vec::new();
//! mapper
//!     .write(&mut turtle, &alice, "http://example.org/alice", RdfFormat::Turtle)
//!     .unwrap();
//!
//! let read: Person = mapper
//!     .read(turtle.as_slice(), "http://example.org/alice", RdfFormat::Turtle)
//!     .unwrap();
//! assert_eq!(read, alice);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod bean;
pub mod mapper;
pub mod rdf;

// Re-export main types for convenience
pub use bean::{
    BeanAnalyzer, BeanDescriptor, BeanReader, BeanWriter, ClassAnalysis, ConverterRegistry,
    FieldType, MapperConfig, MappingError, MappingResult, MissingSetterPolicy, MixIn,
    MixInDescriptor, Predicate, PropertyAnalysis, RdfBean,
};

pub use mapper::BeanMapper;

pub use rdf::{
    BlankNode, Literal, NamedNode, ParseError, RdfFormat, RdfObject, RdfParser, RdfPredicate,
    RdfSerializer, RdfSubject, SerializeError, Triple, TripleSet,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate version string
pub fn version() -> &'static str {
    VERSION
}
