//! Analysis results
//!
//! A `ClassAnalysis` is what the engines work from: the resolved type
//! indicator, subject accessor and mapped predicates of one bean type. It is
//! built once by the analyzer and never changes afterwards.

use super::descriptor::{
    ErasedGetter, ErasedSetter, Projection, ProjectedGetter, ProjectedSetter, RdfBean,
};
use super::field::Shape;
use crate::rdf::vocab::XSD_STRING;
use crate::rdf::NamedNode;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Predicate declaration on a getter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub(crate) iri: String,
    pub(crate) is_literal: bool,
    pub(crate) datatype: Option<String>,
}

impl Predicate {
    /// Values are written as IRIs or nested beans
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            is_literal: false,
            datatype: None,
        }
    }

    /// Values are written as `xsd:string` literals
    pub fn literal(iri: impl Into<String>) -> Self {
        Self {
            is_literal: true,
            ..Self::new(iri)
        }
    }

    /// Values are written as literals of the given datatype
    pub fn typed(iri: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::literal(iri).with_datatype(datatype)
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn is_literal(&self) -> bool {
        self.is_literal
    }

    /// Declared datatype, `xsd:string` when none was given
    pub fn datatype(&self) -> &str {
        self.datatype.as_deref().unwrap_or(XSD_STRING)
    }
}

/// One mapped accessor
#[derive(Clone)]
pub struct PropertyAnalysis {
    pub(crate) name: String,
    pub(crate) predicate: NamedNode,
    pub(crate) is_literal: bool,
    pub(crate) datatype: NamedNode,
    pub(crate) shape: Shape,
    pub(crate) getter: Arc<dyn ErasedGetter>,
    pub(crate) setter: Option<Arc<dyn ErasedSetter>>,
    pub(crate) nested: Option<Arc<ClassAnalysis>>,
}

impl PropertyAnalysis {
    /// Property name, derived from the getter name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &NamedNode {
        &self.predicate
    }

    pub fn is_literal(&self) -> bool {
        self.is_literal
    }

    pub fn datatype(&self) -> &NamedNode {
        &self.datatype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn getter(&self) -> &Arc<dyn ErasedGetter> {
        &self.getter
    }

    /// `None` for write-only properties
    pub fn setter(&self) -> Option<&Arc<dyn ErasedSetter>> {
        self.setter.as_ref()
    }

    /// Analysis of the nested bean type, if the value is a bean
    pub fn nested(&self) -> Option<&Arc<ClassAnalysis>> {
        self.nested.as_ref()
    }

    fn lift(&self, projection: &Arc<dyn Projection>) -> Self {
        Self {
            getter: Arc::new(ProjectedGetter {
                projection: projection.clone(),
                inner: self.getter.clone(),
            }),
            setter: self.setter.as_ref().map(|setter| {
                Arc::new(ProjectedSetter {
                    projection: projection.clone(),
                    inner: setter.clone(),
                }) as Arc<dyn ErasedSetter>
            }),
            ..self.clone()
        }
    }
}

impl fmt::Debug for PropertyAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAnalysis")
            .field("name", &self.name)
            .field("predicate", &self.predicate.as_str())
            .field("is_literal", &self.is_literal)
            .field("datatype", &self.datatype.as_str())
            .field("shape", &self.shape)
            .field("writable", &self.setter.is_some())
            .field("nested", &self.nested.as_ref().map(|n| n.type_name()))
            .finish()
    }
}

/// Where a bean's `rdf:type` comes from
#[derive(Debug, Clone)]
pub enum TypeProperty {
    /// Declared on the type
    Fixed(NamedNode),
    /// Yielded by an accessor; its predicate is `rdf:type`
    Accessor(PropertyAnalysis),
}

/// Accessor holding a bean's own subject identifier
#[derive(Clone)]
pub struct SubjectProperty {
    pub(crate) name: String,
    pub(crate) relative: bool,
    pub(crate) shape: Shape,
    pub(crate) getter: Arc<dyn ErasedGetter>,
    pub(crate) setter: Option<Arc<dyn ErasedSetter>>,
}

impl SubjectProperty {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appended to the enclosing subject instead of used verbatim
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn getter(&self) -> &Arc<dyn ErasedGetter> {
        &self.getter
    }

    pub fn setter(&self) -> Option<&Arc<dyn ErasedSetter>> {
        self.setter.as_ref()
    }

    fn lift(&self, projection: &Arc<dyn Projection>) -> Self {
        Self {
            getter: Arc::new(ProjectedGetter {
                projection: projection.clone(),
                inner: self.getter.clone(),
            }),
            setter: self.setter.as_ref().map(|setter| {
                Arc::new(ProjectedSetter {
                    projection: projection.clone(),
                    inner: setter.clone(),
                }) as Arc<dyn ErasedSetter>
            }),
            ..self.clone()
        }
    }
}

impl fmt::Debug for SubjectProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectProperty")
            .field("name", &self.name)
            .field("relative", &self.relative)
            .field("writable", &self.setter.is_some())
            .finish()
    }
}

/// Resolved mapping metadata of one bean type
#[derive(Clone)]
pub struct ClassAnalysis {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) instantiate: fn() -> Result<Box<dyn Any>, String>,
    pub(crate) type_property: Option<TypeProperty>,
    pub(crate) subject_property: Option<SubjectProperty>,
    pub(crate) predicates: Vec<PropertyAnalysis>,
}

fn instantiate_erased<T: RdfBean>() -> Result<Box<dyn Any>, String> {
    T::instantiate().map(|bean| Box::new(bean) as Box<dyn Any>)
}

impl ClassAnalysis {
    /// Empty analysis for `T`
    pub(crate) fn empty<T: RdfBean>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            instantiate: instantiate_erased::<T>,
            type_property: None,
            subject_property: None,
            predicates: Vec::new(),
        }
    }

    /// Parent analysis re-targeted at `T`, reaching the parent through `projection`
    pub(crate) fn inherit<T: RdfBean>(parent: &ClassAnalysis, projection: &Arc<dyn Projection>) -> Self {
        Self {
            type_property: parent.type_property.as_ref().map(|property| match property {
                TypeProperty::Fixed(iri) => TypeProperty::Fixed(iri.clone()),
                TypeProperty::Accessor(accessor) => TypeProperty::Accessor(accessor.lift(projection)),
            }),
            subject_property: parent
                .subject_property
                .as_ref()
                .map(|subject| subject.lift(projection)),
            predicates: parent
                .predicates
                .iter()
                .map(|property| property.lift(projection))
                .collect(),
            ..Self::empty::<T>()
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_property(&self) -> Option<&TypeProperty> {
        self.type_property.as_ref()
    }

    /// Fixed type IRI, if the type declares one
    pub fn type_iri(&self) -> Option<&NamedNode> {
        match &self.type_property {
            Some(TypeProperty::Fixed(iri)) => Some(iri),
            _ => None,
        }
    }

    pub fn subject_property(&self) -> Option<&SubjectProperty> {
        self.subject_property.as_ref()
    }

    /// Mapped properties: inherited first, then mixin, then own
    pub fn predicates(&self) -> &[PropertyAnalysis] {
        &self.predicates
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<&PropertyAnalysis> {
        self.predicates.iter().find(|p| p.name == name)
    }

    /// Create an empty bean of this type
    pub fn instantiate(&self) -> Result<Box<dyn Any>, String> {
        (self.instantiate)()
    }
}

impl fmt::Debug for ClassAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassAnalysis")
            .field("type_name", &self.type_name)
            .field("type_property", &self.type_property)
            .field("subject_property", &self.subject_property)
            .field("predicates", &self.predicates)
            .finish()
    }
}
