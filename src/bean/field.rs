//! Field value model
//!
//! `FieldType` is the capability a value type needs before it can be exposed
//! through a bean accessor. It answers three questions:
//!
//! - which shape the value has (scalar, nested bean, or a collection of either),
//! - how the value looks on the write side (lexical strings and nested beans),
//! - how a value is rebuilt from what the read engine assembled.
//!
//! Scalars are declared with [`rdf_scalar!`](crate::rdf_scalar), nested bean
//! types with [`rdf_nested!`](crate::rdf_nested). `Option<T>` is transparent:
//! `None` writes nothing and a missing value reads back as `None`.

use super::analysis::ClassAnalysis;
use super::analyzer::BeanAnalyzer;
use super::descriptor::RdfBean;
use super::error::{MappingError, MappingResult};
use crate::rdf::NamedNode;
use chrono::{DateTime, FixedOffset, Utc};
use oxiri::Iri;
use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Collection flavour of a multi-valued field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Ordered, read back in triple order
    List,
    /// Unordered, read back as a hash set
    Set,
    /// Any other collection; writable, but cannot be rebuilt on read
    Other(&'static str),
}

/// Analyzer hook for a nested bean type
#[derive(Clone, Copy)]
pub struct CompositeShape {
    type_id: TypeId,
    type_name: &'static str,
    pub(crate) analyze: fn(&BeanAnalyzer, &mut Vec<TypeId>) -> MappingResult<Arc<ClassAnalysis>>,
}

impl CompositeShape {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CompositeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeShape")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Declared shape of a field
#[derive(Debug, Clone)]
pub enum Shape {
    /// Single value converted through the converter registry
    Scalar {
        type_id: TypeId,
        type_name: &'static str,
    },
    /// Nested bean
    Composite(CompositeShape),
    /// Multi-valued field
    Collection {
        kind: CollectionKind,
        type_name: &'static str,
        element: Box<Shape>,
    },
}

impl Shape {
    /// Scalar shape for `T`
    pub fn scalar<T: 'static>() -> Self {
        Shape::Scalar {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Nested bean shape for `T`
    pub fn composite<T: RdfBean>() -> Self {
        Shape::Composite(CompositeShape {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            analyze: analyze_composite::<T>,
        })
    }

    /// Collection shape for `C` holding `E`
    pub fn collection<C: 'static, E: FieldType>(kind: CollectionKind) -> Self {
        Shape::Collection {
            kind,
            type_name: type_name::<C>(),
            element: Box::new(E::shape()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Scalar { type_name, .. } => *type_name,
            Shape::Composite(composite) => composite.type_name,
            Shape::Collection { type_name, .. } => *type_name,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Shape::Collection { .. })
    }

    /// Innermost element shape; the shape itself for non-collections
    pub fn element(&self) -> &Shape {
        match self {
            Shape::Collection { element, .. } => element.element(),
            other => other,
        }
    }

    /// Nested bean hook of the innermost element, if it is a bean
    pub fn composite_element(&self) -> Option<&CompositeShape> {
        match self.element() {
            Shape::Composite(composite) => Some(composite),
            _ => None,
        }
    }
}

fn analyze_composite<T: RdfBean>(
    analyzer: &BeanAnalyzer,
    stack: &mut Vec<TypeId>,
) -> MappingResult<Arc<ClassAnalysis>> {
    analyzer.analyze_tracked::<T>(stack)
}

/// Nested bean handed to the write engine
pub enum BeanRef<'a> {
    Borrowed(&'a dyn Any),
    Owned(Box<dyn Any>),
}

impl BeanRef<'_> {
    pub fn as_any(&self) -> &dyn Any {
        match self {
            BeanRef::Borrowed(bean) => *bean,
            BeanRef::Owned(bean) => bean.as_ref(),
        }
    }
}

/// One written value
pub enum Item<'a> {
    /// Lexical form of a scalar
    Text(String),
    /// Nested bean
    Bean(BeanRef<'a>),
}

/// Write-side view of a field
pub enum Value<'a> {
    Absent,
    One(Item<'a>),
    Many(Vec<Item<'a>>),
}

impl<'a> Value<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Values in iteration order
    pub fn into_items(self) -> Vec<Item<'a>> {
        match self {
            Value::Absent => Vec::new(),
            Value::One(item) => vec![item],
            Value::Many(items) => items,
        }
    }

    /// Lexical forms only, nested beans are dropped
    pub fn into_texts(self) -> Vec<String> {
        self.into_items()
            .into_iter()
            .filter_map(|item| match item {
                Item::Text(text) => Some(text),
                Item::Bean(_) => None,
            })
            .collect()
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn item(item: &Item<'_>) -> String {
            match item {
                Item::Text(text) => format!("{:?}", text),
                Item::Bean(_) => "<bean>".to_string(),
            }
        }
        match self {
            Value::Absent => f.write_str("Absent"),
            Value::One(one) => write!(f, "One({})", item(one)),
            Value::Many(many) => {
                let items: Vec<String> = many.iter().map(item).collect();
                write!(f, "Many([{}])", items.join(", "))
            }
        }
    }
}

/// Read-side values assembled for a field, before they are typed again
pub enum Slot {
    One(Box<dyn Any>),
    Many(Vec<Box<dyn Any>>),
}

impl Slot {
    /// Recover a single value of type `T`
    pub fn take<T: 'static>(self) -> MappingResult<T> {
        match self {
            Slot::One(value) => value.downcast::<T>().map(|v| *v).map_err(|_| {
                MappingError::Conversion {
                    type_name: type_name::<T>(),
                    reason: "assembled value has a different type".to_string(),
                }
            }),
            Slot::Many(values) => Err(MappingError::Conversion {
                type_name: type_name::<T>(),
                reason: format!("expected one value, found {}", values.len()),
            }),
        }
    }

    /// Split into single-value slots, one per element
    pub fn into_elements(self) -> Vec<Slot> {
        match self {
            Slot::One(value) => vec![Slot::One(value)],
            Slot::Many(values) => values.into_iter().map(Slot::One).collect(),
        }
    }
}

/// Value types that can sit behind a bean accessor
pub trait FieldType: Sized + 'static {
    fn shape() -> Shape;

    fn to_value(&self) -> Value<'_>;

    /// Owned variant of `to_value`, used for computed getters
    fn into_value(self) -> Value<'static>;

    fn from_slot(slot: Slot) -> MappingResult<Self>;
}

/// Implements [`FieldType`] for scalar types.
///
/// With a list of types the lexical form is their `Display` output. A closure
/// form gives the lexical form explicitly:
///
/// ```rust
/// # use rdf_beans::rdf_scalar;
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Celsius(f64);
///
/// rdf_scalar!(Celsius => |c| format!("{:.1}", c.0));
/// ```
#[macro_export]
macro_rules! rdf_scalar {
    ($ty:ty => |$value:ident| $lexical:expr) => {
        impl $crate::bean::FieldType for $ty {
            fn shape() -> $crate::bean::Shape {
                $crate::bean::Shape::scalar::<$ty>()
            }

            fn to_value(&self) -> $crate::bean::Value<'_> {
                let $value: &$ty = self;
                let lexical: ::std::string::String = $lexical;
                $crate::bean::Value::One($crate::bean::Item::Text(lexical))
            }

            fn into_value(self) -> $crate::bean::Value<'static> {
                let $value: &$ty = &self;
                let lexical: ::std::string::String = $lexical;
                $crate::bean::Value::One($crate::bean::Item::Text(lexical))
            }

            fn from_slot(slot: $crate::bean::Slot) -> $crate::MappingResult<Self> {
                slot.take::<$ty>()
            }
        }
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::rdf_scalar!($ty => |value| ::std::string::ToString::to_string(value));
        )+
    };
}

/// Implements [`FieldType`] for bean types so they can be nested.
///
/// The types must implement [`RdfBean`](crate::bean::RdfBean).
#[macro_export]
macro_rules! rdf_nested {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::bean::FieldType for $ty {
                fn shape() -> $crate::bean::Shape {
                    $crate::bean::Shape::composite::<$ty>()
                }

                fn to_value(&self) -> $crate::bean::Value<'_> {
                    $crate::bean::Value::One($crate::bean::Item::Bean(
                        $crate::bean::BeanRef::Borrowed(self),
                    ))
                }

                fn into_value(self) -> $crate::bean::Value<'static> {
                    $crate::bean::Value::One($crate::bean::Item::Bean(
                        $crate::bean::BeanRef::Owned(::std::boxed::Box::new(self)),
                    ))
                }

                fn from_slot(slot: $crate::bean::Slot) -> $crate::MappingResult<Self> {
                    slot.take::<$ty>()
                }
            }
        )+
    };
}

crate::rdf_scalar!(String, bool, i32, i64, u32, u64, f32, f64);
crate::rdf_scalar!(NamedNode => |node| node.as_str().to_string());
crate::rdf_scalar!(Iri<String> => |iri| iri.as_str().to_string());
crate::rdf_scalar!(DateTime<FixedOffset> => |time| time.to_rfc3339());
crate::rdf_scalar!(DateTime<Utc> => |time| time.to_rfc3339());

impl<T: FieldType> FieldType for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value<'_> {
        match self {
            Some(value) => value.to_value(),
            None => Value::Absent,
        }
    }

    fn into_value(self) -> Value<'static> {
        match self {
            Some(value) => value.into_value(),
            None => Value::Absent,
        }
    }

    fn from_slot(slot: Slot) -> MappingResult<Self> {
        T::from_slot(slot).map(Some)
    }
}

fn collect_items<'a, T: FieldType + 'a>(values: impl Iterator<Item = &'a T>) -> Value<'a> {
    Value::Many(values.flat_map(|v| v.to_value().into_items()).collect())
}

fn collect_owned_items<T: FieldType>(values: impl Iterator<Item = T>) -> Value<'static> {
    Value::Many(values.flat_map(|v| v.into_value().into_items()).collect())
}

fn unsupported<C: 'static>() -> MappingError {
    MappingError::UnsupportedCollection {
        type_name: type_name::<C>(),
        property: String::new(),
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn shape() -> Shape {
        Shape::collection::<Self, T>(CollectionKind::List)
    }

    fn to_value(&self) -> Value<'_> {
        collect_items(self.iter())
    }

    fn into_value(self) -> Value<'static> {
        collect_owned_items(self.into_iter())
    }

    fn from_slot(slot: Slot) -> MappingResult<Self> {
        slot.into_elements().into_iter().map(T::from_slot).collect()
    }
}

impl<T: FieldType + Eq + Hash> FieldType for HashSet<T> {
    fn shape() -> Shape {
        Shape::collection::<Self, T>(CollectionKind::Set)
    }

    fn to_value(&self) -> Value<'_> {
        collect_items(self.iter())
    }

    fn into_value(self) -> Value<'static> {
        collect_owned_items(self.into_iter())
    }

    fn from_slot(slot: Slot) -> MappingResult<Self> {
        slot.into_elements().into_iter().map(T::from_slot).collect()
    }
}

impl<T: FieldType> FieldType for BTreeSet<T> {
    fn shape() -> Shape {
        Shape::collection::<Self, T>(CollectionKind::Other("BTreeSet"))
    }

    fn to_value(&self) -> Value<'_> {
        collect_items(self.iter())
    }

    fn into_value(self) -> Value<'static> {
        collect_owned_items(self.into_iter())
    }

    fn from_slot(_slot: Slot) -> MappingResult<Self> {
        Err(unsupported::<Self>())
    }
}

impl<T: FieldType> FieldType for VecDeque<T> {
    fn shape() -> Shape {
        Shape::collection::<Self, T>(CollectionKind::Other("VecDeque"))
    }

    fn to_value(&self) -> Value<'_> {
        collect_items(self.iter())
    }

    fn into_value(self) -> Value<'static> {
        collect_owned_items(self.into_iter())
    }

    fn from_slot(_slot: Slot) -> MappingResult<Self> {
        Err(unsupported::<Self>())
    }
}
