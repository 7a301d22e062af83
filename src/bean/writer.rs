//! Write engine: bean → triples

use super::analysis::{ClassAnalysis, PropertyAnalysis, TypeProperty};
use super::error::{MappingError, MappingResult};
use super::field::Item;
use crate::rdf::{Literal, NamedNode, RdfObject, TripleSet};
use std::any::Any;
use tracing::{debug, warn};

/// Converts beans into triple sets
#[derive(Debug, Clone, Default)]
pub struct BeanWriter {
    strict: bool,
}

impl BeanWriter {
    /// Lenient writer: getter failures skip the property
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer where getter failures abort the write
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Write `bean`, described by `analysis`, under the absolute IRI `subject`
    pub fn write(&self, analysis: &ClassAnalysis, bean: &dyn Any, subject: &str) -> MappingResult<TripleSet> {
        let subject = iri(subject)?;
        let mut triples = TripleSet::new();
        self.write_bean(&mut triples, analysis, bean, &subject)?;
        debug!(
            "Wrote {} as {} triples under {}",
            analysis.type_name(),
            triples.len(),
            subject
        );
        Ok(triples)
    }

    fn write_bean(
        &self,
        triples: &mut TripleSet,
        analysis: &ClassAnalysis,
        bean: &dyn Any,
        subject: &NamedNode,
    ) -> MappingResult<()> {
        match analysis.type_property() {
            Some(TypeProperty::Fixed(type_iri)) => {
                triples.add(subject.clone(), NamedNode::rdf_type(), type_iri.clone());
            }
            Some(TypeProperty::Accessor(property)) => {
                self.write_property(triples, analysis, property, bean, subject)?;
            }
            None => {}
        }

        for property in analysis.predicates() {
            self.write_property(triples, analysis, property, bean, subject)?;
        }
        Ok(())
    }

    fn write_property(
        &self,
        triples: &mut TripleSet,
        analysis: &ClassAnalysis,
        property: &PropertyAnalysis,
        bean: &dyn Any,
        subject: &NamedNode,
    ) -> MappingResult<()> {
        let value = match property.getter().get(bean) {
            Ok(value) => value,
            Err(reason) if self.strict => {
                return Err(MappingError::Access {
                    type_name: analysis.type_name(),
                    property: property.name().to_string(),
                    reason,
                });
            }
            Err(reason) => {
                warn!(
                    "Skipping {}.{}: getter failed: {}",
                    analysis.type_name(),
                    property.name(),
                    reason
                );
                return Ok(());
            }
        };

        for item in value.into_items() {
            match item {
                Item::Text(text) => {
                    let object: RdfObject = if property.is_literal() {
                        Literal::new_typed_literal(text, property.datatype().clone()).into()
                    } else {
                        iri(text)?.into()
                    };
                    triples.add(subject.clone(), property.predicate().clone(), object);
                }
                Item::Bean(nested_bean) => {
                    let nested = property.nested().ok_or_else(|| MappingError::Analysis {
                        type_name: analysis.type_name(),
                        reason: format!("property `{}` has no nested analysis", property.name()),
                    })?;
                    let nested_subject = self.nested_subject(nested, nested_bean.as_any(), subject)?;
                    triples.add(
                        subject.clone(),
                        property.predicate().clone(),
                        nested_subject.clone(),
                    );
                    self.write_bean(triples, nested, nested_bean.as_any(), &nested_subject)?;
                }
            }
        }
        Ok(())
    }

    fn nested_subject(
        &self,
        nested: &ClassAnalysis,
        bean: &dyn Any,
        parent: &NamedNode,
    ) -> MappingResult<NamedNode> {
        let subject_property = nested
            .subject_property()
            .ok_or_else(|| MappingError::MissingSubject {
                type_name: nested.type_name(),
                reason: "no subject accessor declared".to_string(),
            })?;

        let value = subject_property
            .getter()
            .get(bean)
            .map_err(|reason| MappingError::Access {
                type_name: nested.type_name(),
                property: subject_property.name().to_string(),
                reason,
            })?;
        let text = value
            .into_texts()
            .into_iter()
            .next()
            .ok_or_else(|| MappingError::MissingSubject {
                type_name: nested.type_name(),
                reason: format!("`{}` returned no value", subject_property.name()),
            })?;

        if subject_property.is_relative() {
            iri(format!("{}{}", parent.as_str(), text))
        } else {
            iri(text)
        }
    }
}

fn iri(value: impl Into<String>) -> MappingResult<NamedNode> {
    NamedNode::new(value).map_err(|e| MappingError::InvalidIri(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{BeanAnalyzer, BeanDescriptor, Predicate, RdfBean};
    use crate::rdf::{RdfPredicate, RdfSubject};

    const EX: &str = "http://example.com/";

    fn iri_of(local: &str) -> String {
        format!("{}{}", EX, local)
    }

    #[derive(Debug, Default)]
    struct Inner {
        id: String,
        value: String,
    }

    impl RdfBean for Inner {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.type_iri(iri_of("Inner"));
            bean.getter("get_id", |b: &Inner| &b.id).subject(true);
            bean.getter("get_value", |b: &Inner| &b.value)
                .predicate(Predicate::literal(iri_of("value")));
        }
    }

    crate::rdf_nested!(Inner);

    #[derive(Debug, Default)]
    struct Outer {
        label: Option<String>,
        link: Option<NamedNode>,
        inner: Option<Inner>,
        tags: Vec<String>,
        count: i64,
        fail: bool,
    }

    impl RdfBean for Outer {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.type_iri(iri_of("Outer"));
            bean.getter("get_label", |b: &Outer| &b.label)
                .predicate(Predicate::literal(iri_of("label")));
            bean.getter("get_link", |b: &Outer| &b.link)
                .predicate(Predicate::new(iri_of("link")));
            bean.getter("get_inner", |b: &Outer| &b.inner)
                .predicate(Predicate::new(iri_of("inner")));
            bean.getter("get_tags", |b: &Outer| &b.tags)
                .predicate(Predicate::literal(iri_of("tag")));
            bean.computed("get_count", |b: &Outer| {
                if b.fail {
                    Err("count unavailable")
                } else {
                    Ok(b.count)
                }
            })
            .predicate(Predicate::typed(
                iri_of("count"),
                "http://www.w3.org/2001/XMLSchema#long",
            ));
        }
    }

    fn outer() -> Outer {
        Outer {
            label: Some("hello".to_string()),
            link: NamedNode::new(iri_of("target")).ok(),
            inner: Some(Inner {
                id: "#inner".to_string(),
                value: "nested".to_string(),
            }),
            tags: vec!["b".to_string(), "a".to_string()],
            count: 3,
            fail: false,
        }
    }

    fn objects(triples: &TripleSet, subject: &str, predicate: &str) -> Vec<String> {
        let subject: RdfSubject = NamedNode::new(subject).unwrap().into();
        let predicate = RdfPredicate::new(predicate).unwrap();
        triples
            .objects(&subject, &predicate)
            .into_iter()
            .map(|o| o.string_value().to_string())
            .collect()
    }

    #[test]
    fn test_write_literals_links_and_nested() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Outer>().unwrap();
        let subject = iri_of("outer");
        let triples = BeanWriter::new()
            .write(&analysis, &outer(), &subject)
            .unwrap();

        assert_eq!(objects(&triples, &subject, &iri_of("label")), vec!["hello"]);
        assert_eq!(objects(&triples, &subject, &iri_of("link")), vec![iri_of("target")]);
        assert_eq!(objects(&triples, &subject, &iri_of("tag")), vec!["b", "a"]);
        assert_eq!(objects(&triples, &subject, &iri_of("count")), vec!["3"]);

        let nested = format!("{}#inner", subject);
        assert_eq!(objects(&triples, &subject, &iri_of("inner")), vec![nested.clone()]);
        assert_eq!(objects(&triples, &nested, &iri_of("value")), vec!["nested"]);
        assert_eq!(
            objects(&triples, &nested, crate::rdf::vocab::RDF_TYPE),
            vec![iri_of("Inner")]
        );
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Outer>().unwrap();
        let bean = Outer {
            link: NamedNode::new(iri_of("target")).ok(),
            ..Default::default()
        };
        let triples = BeanWriter::new().write(&analysis, &bean, &iri_of("o")).unwrap();
        // rdf:type, link, count
        assert_eq!(triples.len(), 3);
    }

    #[test]
    fn test_getter_failure_lenient_and_strict() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Outer>().unwrap();
        let bean = Outer {
            fail: true,
            ..outer()
        };

        let triples = BeanWriter::new().write(&analysis, &bean, &iri_of("o")).unwrap();
        assert!(objects(&triples, &iri_of("o"), &iri_of("count")).is_empty());
        assert_eq!(objects(&triples, &iri_of("o"), &iri_of("label")), vec!["hello"]);

        let result = BeanWriter::strict().write(&analysis, &bean, &iri_of("o"));
        assert!(matches!(result, Err(MappingError::Access { .. })));
    }

    #[test]
    fn test_invalid_subject() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Outer>().unwrap();
        let result = BeanWriter::new().write(&analysis, &outer(), "relative");
        assert!(matches!(result, Err(MappingError::InvalidIri(_))));
    }

    #[derive(Debug, Default)]
    struct Anonymous {
        value: String,
    }

    impl RdfBean for Anonymous {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.getter("get_value", |b: &Anonymous| &b.value)
                .predicate(Predicate::literal(iri_of("value")));
        }
    }

    crate::rdf_nested!(Anonymous);

    #[derive(Debug, Default)]
    struct Holder {
        child: Anonymous,
    }

    impl RdfBean for Holder {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.getter("get_child", |b: &Holder| &b.child)
                .predicate(Predicate::new(iri_of("child")));
        }
    }

    #[test]
    fn test_nested_bean_without_subject_is_fatal() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Holder>().unwrap();
        let result = BeanWriter::new().write(&analysis, &Holder::default(), &iri_of("h"));
        assert!(matches!(result, Err(MappingError::MissingSubject { .. })));
    }

    #[derive(Debug, Default)]
    struct Keyed {
        key: Option<String>,
    }

    impl RdfBean for Keyed {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.computed("get_key", |b: &Keyed| b.key.clone().ok_or("no key"))
                .subject(true);
        }
    }

    crate::rdf_nested!(Keyed);

    #[derive(Debug, Default)]
    struct KeyedHolder {
        entry: Option<Keyed>,
    }

    impl RdfBean for KeyedHolder {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.getter("get_entry", |b: &KeyedHolder| &b.entry)
                .predicate(Predicate::new(iri_of("entry")));
        }
    }

    #[test]
    fn test_nested_subject_getter_failure_is_fatal_when_lenient() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<KeyedHolder>().unwrap();
        let bean = KeyedHolder {
            entry: Some(Keyed { key: None }),
        };

        let writer = BeanWriter::new();
        assert!(!writer.is_strict());
        let result = writer.write(&analysis, &bean, &iri_of("k"));
        match result {
            Err(MappingError::Access { property, reason, .. }) => {
                assert_eq!(property, "key");
                assert_eq!(reason, "no key");
            }
            other => panic!("expected an access error, got {:?}", other),
        }

        let bean = KeyedHolder {
            entry: Some(Keyed {
                key: Some("#entry".to_string()),
            }),
        };
        let triples = writer.write(&analysis, &bean, &iri_of("k")).unwrap();
        assert_eq!(
            objects(&triples, &iri_of("k"), &iri_of("entry")),
            vec![format!("{}#entry", iri_of("k"))]
        );
    }
}
