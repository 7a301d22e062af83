//! Read engine: triples → bean
//!
//! For every mapped property the engine selects the `(subject, predicate, *)`
//! triples in triple-set order. No match leaves the field at its default.
//! Lists and sets take every match; other fields accept exactly one.

use super::analysis::{ClassAnalysis, PropertyAnalysis, TypeProperty};
use super::config::MissingSetterPolicy;
use super::converter::ConverterRegistry;
use super::descriptor::SetFailure;
use super::error::{MappingError, MappingResult};
use super::field::{CollectionKind, Shape, Slot};
use crate::rdf::{Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, TripleSet};
use std::any::{type_name, Any, TypeId};
use tracing::debug;

/// Rebuilds beans from triple sets
#[derive(Debug, Clone, Default)]
pub struct BeanReader {
    converters: ConverterRegistry,
    missing_setter: MissingSetterPolicy,
}

impl BeanReader {
    /// Reader with the built-in converters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_converters(converters: ConverterRegistry) -> Self {
        Self {
            converters,
            missing_setter: MissingSetterPolicy::default(),
        }
    }

    pub fn with_missing_setter(mut self, policy: MissingSetterPolicy) -> Self {
        self.missing_setter = policy;
        self
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    pub fn missing_setter(&self) -> MissingSetterPolicy {
        self.missing_setter
    }

    /// Read the bean stored under the absolute IRI `subject`
    pub fn read<T: 'static>(
        &self,
        triples: &TripleSet,
        analysis: &ClassAnalysis,
        subject: &str,
    ) -> MappingResult<T> {
        if analysis.type_id() != TypeId::of::<T>() {
            return Err(MappingError::Analysis {
                type_name: type_name::<T>(),
                reason: format!("analysis describes {}", analysis.type_name()),
            });
        }
        let subject: RdfSubject = NamedNode::new(subject)
            .map_err(|e| MappingError::InvalidIri(e.to_string()))?
            .into();

        let bean = self.read_bean(triples, analysis, &subject, None)?;
        bean.downcast::<T>()
            .map(|bean| *bean)
            .map_err(|_| MappingError::Instantiation {
                type_name: type_name::<T>(),
                reason: format!("instantiation produced a different type than {}", analysis.type_name()),
            })
    }

    fn read_bean(
        &self,
        triples: &TripleSet,
        analysis: &ClassAnalysis,
        subject: &RdfSubject,
        parent: Option<&RdfSubject>,
    ) -> MappingResult<Box<dyn Any>> {
        let mut bean = analysis
            .instantiate()
            .map_err(|reason| MappingError::Instantiation {
                type_name: analysis.type_name(),
                reason,
            })?;

        if let Some(TypeProperty::Accessor(property)) = analysis.type_property() {
            if property.setter().is_some() {
                self.read_property(triples, analysis, property, subject, bean.as_mut())?;
            }
        }

        self.read_subject(analysis, subject, parent, bean.as_mut());

        for property in analysis.predicates() {
            self.read_property(triples, analysis, property, subject, bean.as_mut())?;
        }
        Ok(bean)
    }

    /// Stores the subject on nested beans that expose a subject setter.
    /// Relative subjects are stored relative to the enclosing subject.
    fn read_subject(
        &self,
        analysis: &ClassAnalysis,
        subject: &RdfSubject,
        parent: Option<&RdfSubject>,
        bean: &mut dyn Any,
    ) {
        let Some(property) = analysis.subject_property() else {
            return;
        };
        let (Some(setter), Shape::Scalar { type_id, type_name }) = (property.setter(), property.shape()) else {
            return;
        };
        if !self.converters.contains_type(*type_id) {
            return;
        }

        let value: RdfObject = match (property.is_relative(), parent, subject) {
            (true, Some(parent), RdfSubject::NamedNode(node)) => {
                match node.as_str().strip_prefix(parent.as_str()) {
                    Some(suffix) => Literal::new_simple_literal(suffix).into(),
                    None => node.clone().into(),
                }
            }
            _ => subject.clone().into(),
        };

        let stored = self
            .converters
            .convert_erased(*type_id, *type_name, &value)
            .map_err(|e| e.to_string())
            .and_then(|converted| {
                setter
                    .set(bean, Slot::One(converted))
                    .map_err(|failure| format!("{:?}", failure))
            });
        if let Err(reason) = stored {
            debug!(
                "Not storing subject {} on {}: {}",
                subject,
                analysis.type_name(),
                reason
            );
        }
    }

    fn read_property(
        &self,
        triples: &TripleSet,
        analysis: &ClassAnalysis,
        property: &PropertyAnalysis,
        subject: &RdfSubject,
        bean: &mut dyn Any,
    ) -> MappingResult<()> {
        let predicate = RdfPredicate::from(property.predicate().clone());
        let objects = triples.objects(subject, &predicate);
        if objects.is_empty() {
            return Ok(());
        }

        let unsupported = |type_name: &'static str| MappingError::UnsupportedCollection {
            type_name,
            property: property.name().to_string(),
        };
        match property.shape() {
            Shape::Collection {
                kind: CollectionKind::Other(_),
                type_name,
                ..
            } => return Err(unsupported(*type_name)),
            Shape::Collection { .. } => {}
            shape if objects.len() > 1 => return Err(unsupported(shape.type_name())),
            _ => {}
        }

        let Some(setter) = property.setter() else {
            return match self.missing_setter {
                MissingSetterPolicy::Fail => Err(MappingError::MissingSetter {
                    type_name: analysis.type_name(),
                    property: property.name().to_string(),
                }),
                MissingSetterPolicy::Skip => {
                    debug!(
                        "Ignoring {} values for write-only {}.{}",
                        objects.len(),
                        analysis.type_name(),
                        property.name()
                    );
                    Ok(())
                }
            };
        };

        let slot = match property.shape() {
            Shape::Collection { element, .. } => Slot::Many(
                objects
                    .iter()
                    .map(|object| self.convert(triples, property, element, object, subject))
                    .collect::<MappingResult<Vec<_>>>()?,
            ),
            shape => Slot::One(self.convert(triples, property, shape, objects[0], subject)?),
        };

        setter.set(bean, slot).map_err(|failure| match failure {
            SetFailure::Value(err) => err,
            SetFailure::Rejected(reason) => MappingError::Access {
                type_name: analysis.type_name(),
                property: property.name().to_string(),
                reason,
            },
        })
    }

    fn convert(
        &self,
        triples: &TripleSet,
        property: &PropertyAnalysis,
        shape: &Shape,
        object: &RdfObject,
        subject: &RdfSubject,
    ) -> MappingResult<Box<dyn Any>> {
        match shape {
            Shape::Scalar { type_id, type_name } => {
                self.converters.convert_erased(*type_id, *type_name, object)
            }
            Shape::Composite(composite) => {
                let nested = property.nested().ok_or_else(|| MappingError::Analysis {
                    type_name: composite.type_name(),
                    reason: format!("property `{}` has no nested analysis", property.name()),
                })?;
                let nested_subject = object.as_subject().ok_or_else(|| MappingError::Conversion {
                    type_name: nested.type_name(),
                    reason: format!("expected a resource, found literal {}", object),
                })?;
                self.read_bean(triples, nested, &nested_subject, Some(subject))
            }
            Shape::Collection { type_name, .. } => Err(MappingError::UnsupportedCollection {
                type_name: *type_name,
                property: property.name().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{BeanAnalyzer, BeanDescriptor, Predicate, RdfBean};
    use std::collections::{BTreeSet, HashSet};

    const EX: &str = "http://example.com/";

    fn iri(local: &str) -> NamedNode {
        NamedNode::new(format!("{}{}", EX, local)).unwrap()
    }

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        id: String,
        value: String,
    }

    impl RdfBean for Inner {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.field("id", |b: &Inner| &b.id, |b: &mut Inner, v| b.id = v)
                .subject(true);
            bean.field("value", |b: &Inner| &b.value, |b: &mut Inner, v| b.value = v)
                .predicate(Predicate::literal(iri("value").as_str()));
        }
    }

    crate::rdf_nested!(Inner);

    #[derive(Debug, Default)]
    struct Sample {
        name: String,
        ordered: Vec<String>,
        unique: HashSet<String>,
        sorted: BTreeSet<String>,
        inner: Option<Inner>,
        age: i64,
        readonly: String,
    }

    impl RdfBean for Sample {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.field("name", |b: &Sample| &b.name, |b: &mut Sample, v| b.name = v)
                .predicate(Predicate::literal(iri("name").as_str()));
            bean.field("ordered", |b: &Sample| &b.ordered, |b: &mut Sample, v| b.ordered = v)
                .predicate(Predicate::literal(iri("ordered").as_str()));
            bean.field("unique", |b: &Sample| &b.unique, |b: &mut Sample, v| b.unique = v)
                .predicate(Predicate::literal(iri("unique").as_str()));
            bean.field("sorted", |b: &Sample| &b.sorted, |b: &mut Sample, v| b.sorted = v)
                .predicate(Predicate::literal(iri("sorted").as_str()));
            bean.field("inner", |b: &Sample| &b.inner, |b: &mut Sample, v| b.inner = v)
                .predicate(Predicate::new(iri("inner").as_str()));
            bean.getter("get_age", |b: &Sample| &b.age)
                .predicate(Predicate::literal(iri("age").as_str()));
            bean.try_setter("set_age", |b: &mut Sample, v: i64| {
                if v < 0 {
                    return Err("age must not be negative");
                }
                b.age = v;
                Ok(())
            });
            bean.getter("get_readonly", |b: &Sample| &b.readonly)
                .predicate(Predicate::literal(iri("readonly").as_str()));
        }
    }

    fn subject() -> NamedNode {
        iri("s")
    }

    fn read(triples: &TripleSet, reader: &BeanReader) -> MappingResult<Sample> {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Sample>().unwrap();
        reader.read::<Sample>(triples, &analysis, subject().as_str())
    }

    fn literal(triples: &mut TripleSet, predicate: &str, value: &str) {
        triples.add(subject(), iri(predicate), Literal::new_simple_literal(value));
    }

    #[test]
    fn test_absent_predicates_keep_defaults() {
        let sample = read(&TripleSet::new(), &BeanReader::new()).unwrap();
        assert!(sample.name.is_empty());
        assert!(sample.inner.is_none());
    }

    #[test]
    fn test_scalars_and_collections() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "name", "foo");
        for value in ["c", "a", "b"] {
            literal(&mut triples, "ordered", value);
        }
        literal(&mut triples, "unique", "x");
        literal(&mut triples, "unique", "y");
        literal(&mut triples, "age", "42");

        let sample = read(&triples, &BeanReader::new()).unwrap();
        assert_eq!(sample.name, "foo");
        assert_eq!(sample.ordered, vec!["c", "a", "b"]);
        assert_eq!(sample.unique.len(), 2);
        assert!(sample.unique.contains("y"));
        assert_eq!(sample.age, 42);
    }

    #[test]
    fn test_single_value_into_list() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "ordered", "only");
        let sample = read(&triples, &BeanReader::new()).unwrap();
        assert_eq!(sample.ordered, vec!["only"]);
    }

    #[test]
    fn test_multiple_values_for_scalar() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "name", "foo");
        literal(&mut triples, "name", "bar");
        assert!(matches!(
            read(&triples, &BeanReader::new()),
            Err(MappingError::UnsupportedCollection { .. })
        ));
    }

    #[test]
    fn test_unsupported_collection_kind() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "sorted", "a");
        match read(&triples, &BeanReader::new()) {
            Err(MappingError::UnsupportedCollection { property, .. }) => {
                assert_eq!(property, "sorted")
            }
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_nested_bean_with_relative_subject() {
        let mut triples = TripleSet::new();
        let nested = NamedNode::new(format!("{}#inner", subject().as_str())).unwrap();
        triples.add(subject(), iri("inner"), nested.clone());
        triples.add(nested, iri("value"), Literal::new_simple_literal("deep"));

        let sample = read(&triples, &BeanReader::new()).unwrap();
        assert_eq!(
            sample.inner,
            Some(Inner {
                id: "#inner".to_string(),
                value: "deep".to_string(),
            })
        );
    }

    #[test]
    fn test_nested_bean_from_blank_node() {
        let mut triples = TripleSet::new();
        let blank = crate::rdf::BlankNode::with_id("b0").unwrap();
        triples.add(subject(), iri("inner"), blank.clone());
        triples.add(blank, iri("value"), Literal::new_simple_literal("anon"));

        let sample = read(&triples, &BeanReader::new()).unwrap();
        let inner = sample.inner.unwrap();
        assert_eq!(inner.value, "anon");
        assert_eq!(inner.id, "b0");
    }

    #[test]
    fn test_nested_bean_from_literal_fails() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "inner", "not a resource");
        assert!(matches!(
            read(&triples, &BeanReader::new()),
            Err(MappingError::Conversion { .. })
        ));
    }

    #[test]
    fn test_conversion_failure() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "age", "forty");
        assert!(matches!(
            read(&triples, &BeanReader::new()),
            Err(MappingError::Conversion { .. })
        ));
    }

    #[test]
    fn test_setter_rejection_is_access_error() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "age", "-3");
        assert!(matches!(
            read(&triples, &BeanReader::new()),
            Err(MappingError::Access { .. })
        ));
    }

    #[test]
    fn test_missing_setter_policy() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "readonly", "value");
        literal(&mut triples, "name", "foo");

        assert!(matches!(
            read(&triples, &BeanReader::new()),
            Err(MappingError::MissingSetter { .. })
        ));

        let reader = BeanReader::new().with_missing_setter(MissingSetterPolicy::Skip);
        let sample = read(&triples, &reader).unwrap();
        assert!(sample.readonly.is_empty());
        assert_eq!(sample.name, "foo");
    }

    #[test]
    fn test_unknown_scalar_without_converter() {
        let mut triples = TripleSet::new();
        literal(&mut triples, "age", "42");
        let reader = BeanReader::with_converters(ConverterRegistry::empty());
        assert!(matches!(
            read(&triples, &reader),
            Err(MappingError::Conversion { .. })
        ));
    }

    #[derive(Debug)]
    struct Unbuildable;

    impl Default for Unbuildable {
        fn default() -> Self {
            Unbuildable
        }
    }

    impl RdfBean for Unbuildable {
        fn describe(_bean: &mut BeanDescriptor<Self>) {}

        fn instantiate() -> Result<Self, String> {
            Err("no public constructor".to_string())
        }
    }

    #[test]
    fn test_instantiation_failure() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Unbuildable>().unwrap();
        let result = BeanReader::new().read::<Unbuildable>(&TripleSet::new(), &analysis, subject().as_str());
        assert!(matches!(result, Err(MappingError::Instantiation { .. })));
    }

    #[test]
    fn test_analysis_type_must_match() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Inner>().unwrap();
        let result = BeanReader::new().read::<Sample>(&TripleSet::new(), &analysis, subject().as_str());
        assert!(matches!(result, Err(MappingError::Analysis { .. })));
    }
}
