//! Bean mapper facade
//!
//! Ties the analyzer, both engines and the format layer together. Every
//! mapping call analyzes the bean type first (cached after the first call),
//! so a malformed bean surfaces as `MappingError::Analysis` from whichever
//! call touches it first.

use crate::bean::{
    BeanAnalyzer, BeanReader, BeanWriter, MapperConfig, MappingResult, MixIn, RdfBean,
};
use crate::rdf::{RdfFormat, RdfObject, RdfParser, RdfSerializer, TripleSet};
use std::fmt::Display;
use std::io::{Read, Write};
use tracing::debug;

/// Maps beans to and from RDF documents
#[derive(Debug, Default)]
pub struct BeanMapper {
    analyzer: BeanAnalyzer,
    writer: BeanWriter,
    reader: BeanReader,
    config: MapperConfig,
}

impl BeanMapper {
    /// Create a mapper with the default configuration
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            analyzer: BeanAnalyzer::new(),
            writer: BeanWriter::new().with_strict(config.strict_write),
            reader: BeanReader::new().with_missing_setter(config.missing_setter),
            config,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &BeanAnalyzer {
        &self.analyzer
    }

    pub fn reader(&self) -> &BeanReader {
        &self.reader
    }

    pub fn writer(&self) -> &BeanWriter {
        &self.writer
    }

    /// Register the converter used to read values of type `T`
    pub fn register_converter<T, E, F>(&mut self, convert: F)
    where
        T: 'static,
        E: Display,
        F: Fn(&RdfObject) -> Result<T, E> + Send + Sync + 'static,
    {
        self.reader.converters_mut().register(convert);
    }

    /// Overlay mixin `M` on `Target`
    pub fn register_mixin<Target: RdfBean, M: MixIn>(&self) {
        self.analyzer.register_mixin::<Target, M>();
    }

    /// Bean → triples
    pub fn to_triples<T: RdfBean>(&self, bean: &T, subject: &str) -> MappingResult<TripleSet> {
        let analysis = self.analyzer.analyze::<T>()?;
        self.writer.write(&analysis, bean, subject)
    }

    /// Triples → bean
    pub fn from_triples<T: RdfBean>(&self, triples: &TripleSet, subject: &str) -> MappingResult<T> {
        let analysis = self.analyzer.analyze::<T>()?;
        self.reader.read(triples, &analysis, subject)
    }

    /// Write `bean` as a document in `format`
    pub fn write<T: RdfBean, W: Write>(
        &self,
        output: W,
        bean: &T,
        subject: &str,
        format: RdfFormat,
    ) -> MappingResult<()> {
        let triples = self.to_triples(bean, subject)?;
        debug!("Serializing {} triples as {}", triples.len(), format);
        RdfSerializer::serialize_to(&triples, output, format)?;
        Ok(())
    }

    /// Read a bean from a document in `format`
    pub fn read<T: RdfBean, R: Read>(&self, input: R, subject: &str, format: RdfFormat) -> MappingResult<T> {
        self.read_with_base(input, None, subject, format)
    }

    /// Read a bean from a document whose relative IRIs resolve against `base`
    pub fn read_with_base<T: RdfBean, R: Read>(
        &self,
        input: R,
        base: Option<&str>,
        subject: &str,
        format: RdfFormat,
    ) -> MappingResult<T> {
        let triples = RdfParser::parse(input, base, format)?;
        debug!("Parsed {} triples from {} input", triples.len(), format);
        self.from_triples(&triples, subject)
    }

    /// Serialize `bean` in the configured format
    pub fn write_string<T: RdfBean>(&self, bean: &T, subject: &str) -> MappingResult<String> {
        let triples = self.to_triples(bean, subject)?;
        Ok(RdfSerializer::serialize(&triples, self.config.format)?)
    }

    /// Parse a document in the configured format
    pub fn read_str<T: RdfBean>(&self, input: &str, subject: &str) -> MappingResult<T> {
        let triples = RdfParser::parse_str(input, None, self.config.format)?;
        self.from_triples(&triples, subject)
    }
}
