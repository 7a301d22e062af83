//! Bean mapping engine
//!
//! This module provides the object side of the mapping:
//! - Bean descriptors and the field value model
//! - Class analysis with inheritance, mixins and caching
//! - Write engine (bean → triples) and read engine (triples → bean)
//! - Value converters and mapper configuration
//!
//! # Example
//!
//! ```rust
//! use rdf_beans::bean::{BeanAnalyzer, BeanDescriptor, BeanReader, BeanWriter, Predicate, RdfBean};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Book {
//!     title: String,
//! }
//!
//! impl RdfBean for Book {
//!     fn describe(bean: &mut BeanDescriptor<Self>) {
//!         bean.type_iri("http://schema.org/Book");
//!         bean.field("title", |b: &Book| &b.title, |b: &mut Book, t| b.title = t)
//!             .predicate(Predicate::literal("http://schema.org/name"));
//!     }
//! }
//!
//! let analyzer = BeanAnalyzer::new();
//! let analysis = analyzer.analyze::<Book>().unwrap();
//!
//! let book = Book { title: "Dune".to_string() };
//! let triples = BeanWriter::new()
//!     .write(&analysis, &book, "http://example.org/dune")
//!     .unwrap();
//! assert_eq!(triples.len(), 2);
//!
//! let read: Book = BeanReader::new()
//!     .read(&triples, &analysis, "http://example.org/dune")
//!     .unwrap();
//! assert_eq!(read, book);
//! ```

mod analysis;
mod analyzer;
mod config;
mod converter;
mod descriptor;
mod error;
mod field;
mod mixin;
mod reader;
mod writer;

pub use analysis::{ClassAnalysis, Predicate, PropertyAnalysis, SubjectProperty, TypeProperty};
pub use analyzer::BeanAnalyzer;
pub use config::{ConfigError, ConfigResult, MapperConfig, MissingSetterPolicy};
pub use converter::ConverterRegistry;
pub use descriptor::{
    property_name, setter_name, Accessor, BeanDescriptor, ErasedGetter, ErasedSetter, RdfBean,
    SetFailure,
};
pub use error::{MappingError, MappingResult};
pub use field::{BeanRef, CollectionKind, CompositeShape, FieldType, Item, Shape, Slot, Value};
pub use mixin::{MixIn, MixInDescriptor, MixInMethodBuilder, MixInRegistry};
pub use reader::BeanReader;
pub use writer::BeanWriter;
