//! Bean analyzer
//!
//! Turns a bean's descriptor into a [`ClassAnalysis`] and caches the result
//! per type. Resolution order:
//!
//! 1. the parent bean's analysis, if the type extends one,
//! 2. the mixin registered for the type,
//! 3. the type's own type IRI,
//! 4. the type's own getters, in declaration order.

use super::analysis::{ClassAnalysis, PropertyAnalysis, SubjectProperty, TypeProperty};
use super::descriptor::{property_name, BeanDescriptor, RdfBean, Role};
use super::error::{MappingError, MappingResult};
use super::field::Shape;
use super::mixin::{self, MixIn, MixInRegistry};
use crate::rdf::NamedNode;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Caching bean analyzer, safe to share between threads
#[derive(Debug, Default)]
pub struct BeanAnalyzer {
    cache: RwLock<HashMap<TypeId, Arc<ClassAnalysis>>>,
    mixins: RwLock<MixInRegistry>,
    /// Bumped on every cache clear; analyses started under an older value are not cached
    generation: AtomicU64,
}

impl BeanAnalyzer {
    /// Create an analyzer with no mixins
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mixins(mixins: MixInRegistry) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            mixins: RwLock::new(mixins),
            generation: AtomicU64::new(0),
        }
    }

    /// Attach mixin `M` to `Target`. Cached analyses are dropped so that later
    /// calls see the overlay.
    pub fn register_mixin<Target: RdfBean, M: MixIn>(&self) {
        self.mixins
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register::<Target, M>();
        self.clear_cache();
    }

    /// Analyze `T`, or return the cached analysis
    pub fn analyze<T: RdfBean>(&self) -> MappingResult<Arc<ClassAnalysis>> {
        let mut stack = Vec::new();
        self.analyze_tracked::<T>(&mut stack)
    }

    /// Number of cached analyses
    pub fn cached_count(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_cached<T: 'static>(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&TypeId::of::<T>())
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        self.generation.fetch_add(1, Ordering::AcqRel);
        cache.clear();
    }

    /// Cache `analysis` unless the cache was cleared after `generation` was read
    fn store(&self, type_id: TypeId, analysis: &Arc<ClassAnalysis>, generation: u64) -> bool {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(
                "Cache cleared while analyzing {}; result not cached",
                analysis.type_name()
            );
            return false;
        }
        cache.insert(type_id, analysis.clone());
        true
    }

    /// `stack` holds the types whose analysis is in progress on this call path
    pub(crate) fn analyze_tracked<T: RdfBean>(
        &self,
        stack: &mut Vec<TypeId>,
    ) -> MappingResult<Arc<ClassAnalysis>> {
        let type_id = TypeId::of::<T>();
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&type_id)
        {
            debug!("Analysis cache hit for {}", type_name::<T>());
            return Ok(cached.clone());
        }

        if stack.contains(&type_id) {
            return Err(MappingError::Analysis {
                type_name: type_name::<T>(),
                reason: "bean type contains itself through nested properties".to_string(),
            });
        }

        stack.push(type_id);
        let result = self.build::<T>(stack);
        stack.pop();

        let analysis = Arc::new(result?);
        self.store(type_id, &analysis, generation);
        info!(
            "Analyzed {}: {} predicates",
            analysis.type_name(),
            analysis.predicates().len()
        );
        Ok(analysis)
    }

    fn build<T: RdfBean>(&self, stack: &mut Vec<TypeId>) -> MappingResult<ClassAnalysis> {
        let name = type_name::<T>();
        let fail = |reason: String| MappingError::Analysis {
            type_name: name,
            reason,
        };

        let mut descriptor = BeanDescriptor::<T>::new();
        T::describe(&mut descriptor);
        if let Some(problem) = descriptor.problems.first() {
            return Err(fail(problem.clone()));
        }
        if descriptor.parents.len() > 1 {
            return Err(fail("more than one parent bean declared".to_string()));
        }
        if descriptor.type_iris.len() > 1 {
            return Err(fail("type IRI declared more than once".to_string()));
        }

        let mut analysis = match descriptor.parents.first() {
            Some(parent) => {
                let composite = parent
                    .shape
                    .composite_element()
                    .ok_or_else(|| fail("parent is not a bean type".to_string()))?;
                let parent_analysis = (composite.analyze)(self, stack)?;
                debug!("{} extends {}", name, parent_analysis.type_name());
                ClassAnalysis::inherit::<T>(&parent_analysis, &parent.projection)
            }
            None => ClassAnalysis::empty::<T>(),
        };

        let overlay = self
            .mixins
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(TypeId::of::<T>());
        if let Some(overlay) = overlay {
            let resolution = mixin::resolve(&overlay, &descriptor.table, name)?;
            debug!(
                "Mixin {} adds {} predicates to {}",
                overlay.name(),
                resolution.properties.len(),
                name
            );
            if analysis.type_property.is_none() {
                analysis.type_property = resolution.type_iri.map(TypeProperty::Fixed);
            }
            for mut property in resolution.properties {
                property.nested = self.nested_analysis(&property.shape, stack)?;
                analysis.predicates.push(property);
            }
        }

        let mut own_type = false;
        if let Some(iri) = descriptor.type_iris.first() {
            analysis.type_property = Some(TypeProperty::Fixed(mixin::parse_iri(name, iri)?));
            own_type = true;
        }

        let mut own_subject = false;
        for getter in &descriptor.table.getters {
            let Some(role) = &getter.role else {
                continue;
            };
            let property = property_name(&getter.name);
            let setter = descriptor
                .table
                .setter_for(property, getter.value_type)
                .map(|s| s.setter.clone());

            match role {
                Role::Type => {
                    if own_type {
                        return Err(fail("type declared more than once".to_string()));
                    }
                    if !matches!(getter.shape.element(), Shape::Scalar { .. }) {
                        return Err(fail(format!("type accessor `{}` must yield IRIs", getter.name)));
                    }
                    own_type = true;
                    analysis.type_property = Some(TypeProperty::Accessor(PropertyAnalysis {
                        name: property.to_string(),
                        predicate: NamedNode::rdf_type(),
                        is_literal: false,
                        datatype: NamedNode::xsd_string(),
                        shape: getter.shape.clone(),
                        getter: getter.getter.clone(),
                        setter,
                        nested: None,
                    }));
                }
                Role::Subject { relative } => {
                    if own_subject {
                        return Err(fail("subject declared more than once".to_string()));
                    }
                    if !matches!(getter.shape, Shape::Scalar { .. }) {
                        return Err(fail(format!(
                            "subject accessor `{}` must yield a single value",
                            getter.name
                        )));
                    }
                    own_subject = true;
                    analysis.subject_property = Some(SubjectProperty {
                        name: property.to_string(),
                        relative: *relative,
                        shape: getter.shape.clone(),
                        getter: getter.getter.clone(),
                        setter,
                    });
                }
                Role::Predicate(predicate) => {
                    analysis.predicates.push(PropertyAnalysis {
                        name: property.to_string(),
                        predicate: mixin::parse_iri(name, predicate.iri())?,
                        is_literal: predicate.is_literal(),
                        datatype: mixin::parse_iri(name, predicate.datatype())?,
                        shape: getter.shape.clone(),
                        getter: getter.getter.clone(),
                        setter,
                        nested: self.nested_analysis(&getter.shape, stack)?,
                    });
                }
            }
        }

        Ok(analysis)
    }

    fn nested_analysis(
        &self,
        shape: &Shape,
        stack: &mut Vec<TypeId>,
    ) -> MappingResult<Option<Arc<ClassAnalysis>>> {
        shape
            .composite_element()
            .map(|composite| (composite.analyze)(self, stack))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{MixInDescriptor, Predicate};

    const EX: &str = "http://example.org/";

    fn iri(local: &str) -> String {
        format!("{}{}", EX, local)
    }

    #[derive(Debug, Default)]
    struct Parent {
        id: String,
    }

    impl RdfBean for Parent {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.type_iri(iri("Parent"));
            bean.field("id", |p: &Parent| &p.id, |p: &mut Parent, v| p.id = v)
                .predicate(Predicate::literal(iri("id")));
        }
    }

    #[derive(Debug, Default)]
    struct Child {
        parent: Parent,
        name: String,
    }

    impl RdfBean for Child {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.extends(|c: &Child| &c.parent, |c: &mut Child| &mut c.parent);
            bean.field("name", |c: &Child| &c.name, |c: &mut Child, v| c.name = v)
                .predicate(Predicate::literal(iri("name")));
        }
    }

    #[derive(Debug, Default)]
    struct TreeNode {
        children: Vec<TreeNode>,
    }

    impl RdfBean for TreeNode {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.getter("get_children", |n: &TreeNode| &n.children)
                .predicate(Predicate::new(iri("child")));
        }
    }

    crate::rdf_nested!(TreeNode);

    #[derive(Debug, Default)]
    struct TwoSubjects {
        a: String,
        b: String,
    }

    impl RdfBean for TwoSubjects {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.getter("get_a", |t: &TwoSubjects| &t.a).subject(false);
            bean.getter("get_b", |t: &TwoSubjects| &t.b).subject(true);
        }
    }

    #[derive(Debug, Default)]
    struct BadPredicate {
        a: String,
    }

    impl RdfBean for BadPredicate {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.getter("get_a", |t: &BadPredicate| &t.a)
                .predicate(Predicate::literal("no scheme"));
        }
    }

    #[derive(Debug, Default)]
    struct TypedByAccessor {
        kind: Option<NamedNode>,
    }

    impl RdfBean for TypedByAccessor {
        fn describe(bean: &mut BeanDescriptor<Self>) {
            bean.type_iri(iri("Fixed"));
            bean.getter("get_kind", |t: &TypedByAccessor| &t.kind).rdf_type();
        }
    }

    #[test]
    fn test_analysis_is_cached() {
        let analyzer = BeanAnalyzer::new();
        let first = analyzer.analyze::<Parent>().unwrap();
        let second = analyzer.analyze::<Parent>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(analyzer.is_cached::<Parent>());
        assert_eq!(analyzer.cached_count(), 1);
    }

    #[test]
    fn test_inherited_predicates_first() {
        let analyzer = BeanAnalyzer::new();
        let analysis = analyzer.analyze::<Child>().unwrap();

        let names: Vec<&str> = analysis.predicates().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(
            analysis.type_iri().map(|n| n.as_str()),
            Some("http://example.org/Parent")
        );
        assert!(analyzer.is_cached::<Parent>());
    }

    #[test]
    fn test_recursive_nesting_rejected() {
        let analyzer = BeanAnalyzer::new();
        let result = analyzer.analyze::<TreeNode>();
        assert!(matches!(result, Err(MappingError::Analysis { .. })));
        assert_eq!(analyzer.cached_count(), 0);
    }

    #[test]
    fn test_two_subjects_rejected() {
        let analyzer = BeanAnalyzer::new();
        assert!(matches!(
            analyzer.analyze::<TwoSubjects>(),
            Err(MappingError::Analysis { .. })
        ));
    }

    #[test]
    fn test_invalid_predicate_rejected() {
        let analyzer = BeanAnalyzer::new();
        assert!(matches!(
            analyzer.analyze::<BadPredicate>(),
            Err(MappingError::Analysis { .. })
        ));
    }

    #[test]
    fn test_two_type_declarations_rejected() {
        let analyzer = BeanAnalyzer::new();
        assert!(matches!(
            analyzer.analyze::<TypedByAccessor>(),
            Err(MappingError::Analysis { .. })
        ));
    }

    struct ParentMixIn;

    impl MixIn for ParentMixIn {
        fn describe(mixin: &mut MixInDescriptor) {
            mixin.type_iri(iri("Ignored"));
            mixin
                .method::<String>("id")
                .predicate(Predicate::literal(iri("identifier")));
        }
    }

    #[test]
    fn test_mixin_registration_invalidates_cache() {
        let analyzer = BeanAnalyzer::new();
        let before = analyzer.analyze::<Parent>().unwrap();
        assert_eq!(before.predicates().len(), 1);

        analyzer.register_mixin::<Parent, ParentMixIn>();
        assert_eq!(analyzer.cached_count(), 0);

        let after = analyzer.analyze::<Parent>().unwrap();
        let predicates: Vec<&str> = after
            .predicates()
            .iter()
            .map(|p| p.predicate().as_str())
            .collect();
        assert_eq!(
            predicates,
            vec!["http://example.org/identifier", "http://example.org/id"]
        );
        assert_eq!(
            after.type_iri().map(|n| n.as_str()),
            Some("http://example.org/Parent")
        );
    }

    #[test]
    fn test_analysis_started_before_mixin_is_not_cached() {
        let analyzer = BeanAnalyzer::new();
        let generation = analyzer.generation.load(Ordering::Acquire);
        let stale = Arc::new(ClassAnalysis::empty::<Parent>());

        analyzer.register_mixin::<Parent, ParentMixIn>();
        assert!(!analyzer.store(TypeId::of::<Parent>(), &stale, generation));
        assert!(!analyzer.is_cached::<Parent>());

        let fresh = analyzer.analyze::<Parent>().unwrap();
        assert_eq!(fresh.predicates().len(), 2);
        assert!(analyzer.is_cached::<Parent>());
    }
}
