//! Bean descriptors
//!
//! A bean type lists its accessors once, in [`RdfBean::describe`]. Each getter
//! may carry one mapping role: a predicate, the subject identifier, or the
//! type indicator. Setters are paired with getters by name when the type is
//! analyzed: `value`, `get_value` and `is_value` all pair with `set_value`.
//!
//! ```rust
//! use rdf_beans::bean::{BeanDescriptor, Predicate, RdfBean};
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: String,
//! }
//!
//! impl RdfBean for Person {
//!     fn describe(bean: &mut BeanDescriptor<Self>) {
//!         bean.type_iri("http://xmlns.com/foaf/0.1/Person");
//!         bean.getter("get_name", |p: &Person| &p.name)
//!             .predicate(Predicate::literal("http://xmlns.com/foaf/0.1/name"));
//!         bean.setter("set_name", |p: &mut Person, name: String| p.name = name);
//!     }
//! }
//! ```

use super::analysis::Predicate;
use super::error::MappingError;
use super::field::{FieldType, Shape, Slot, Value};
use std::any::{type_name, Any, TypeId};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// A type that can be mapped to and from triples
pub trait RdfBean: Default + 'static {
    /// Declare accessors, mapping roles and the parent bean
    fn describe(bean: &mut BeanDescriptor<Self>);

    /// Create an empty instance for the read engine
    fn instantiate() -> Result<Self, String> {
        Ok(Self::default())
    }
}

/// Type-erased getter
pub trait ErasedGetter: Send + Sync {
    fn get<'a>(&self, bean: &'a dyn Any) -> Result<Value<'a>, String>;
}

/// Why a setter call did not go through
#[derive(Debug)]
pub enum SetFailure {
    /// The assembled value could not be turned into the field type
    Value(MappingError),
    /// The setter itself refused the value
    Rejected(String),
}

/// Type-erased setter
pub trait ErasedSetter: Send + Sync {
    fn set(&self, bean: &mut dyn Any, slot: Slot) -> Result<(), SetFailure>;
}

/// Path from a bean to its embedded parent bean
pub(crate) trait Projection: Send + Sync {
    fn project<'a>(&self, bean: &'a dyn Any) -> Option<&'a dyn Any>;
    fn project_mut<'a>(&self, bean: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

fn wrong_bean<T>() -> String {
    format!("accessor called on a bean that is not a {}", type_name::<T>())
}

struct FieldGetter<T, V, G> {
    get: G,
    _marker: PhantomData<fn(&T) -> &V>,
}

impl<T, V, G> ErasedGetter for FieldGetter<T, V, G>
where
    T: 'static,
    V: FieldType,
    G: Fn(&T) -> &V + Send + Sync + 'static,
{
    fn get<'a>(&self, bean: &'a dyn Any) -> Result<Value<'a>, String> {
        let bean = bean.downcast_ref::<T>().ok_or_else(wrong_bean::<T>)?;
        Ok((self.get)(bean).to_value())
    }
}

struct ComputedGetter<T, V, E, G> {
    get: G,
    _marker: PhantomData<fn(&T) -> Result<V, E>>,
}

impl<T, V, E, G> ErasedGetter for ComputedGetter<T, V, E, G>
where
    T: 'static,
    V: FieldType,
    E: Display + 'static,
    G: Fn(&T) -> Result<V, E> + Send + Sync + 'static,
{
    fn get<'a>(&self, bean: &'a dyn Any) -> Result<Value<'a>, String> {
        let bean = bean.downcast_ref::<T>().ok_or_else(wrong_bean::<T>)?;
        (self.get)(bean)
            .map(FieldType::into_value)
            .map_err(|e| e.to_string())
    }
}

struct FieldSetter<T, V, S> {
    set: S,
    _marker: PhantomData<fn(&mut T, V)>,
}

impl<T, V, S> ErasedSetter for FieldSetter<T, V, S>
where
    T: 'static,
    V: FieldType,
    S: Fn(&mut T, V) + Send + Sync + 'static,
{
    fn set(&self, bean: &mut dyn Any, slot: Slot) -> Result<(), SetFailure> {
        let bean = bean
            .downcast_mut::<T>()
            .ok_or_else(|| SetFailure::Rejected(wrong_bean::<T>()))?;
        let value = V::from_slot(slot).map_err(SetFailure::Value)?;
        (self.set)(bean, value);
        Ok(())
    }
}

struct TrySetter<T, V, E, S> {
    set: S,
    _marker: PhantomData<fn(&mut T, V) -> Result<(), E>>,
}

impl<T, V, E, S> ErasedSetter for TrySetter<T, V, E, S>
where
    T: 'static,
    V: FieldType,
    E: Display + 'static,
    S: Fn(&mut T, V) -> Result<(), E> + Send + Sync + 'static,
{
    fn set(&self, bean: &mut dyn Any, slot: Slot) -> Result<(), SetFailure> {
        let bean = bean
            .downcast_mut::<T>()
            .ok_or_else(|| SetFailure::Rejected(wrong_bean::<T>()))?;
        let value = V::from_slot(slot).map_err(SetFailure::Value)?;
        (self.set)(bean, value).map_err(|e| SetFailure::Rejected(e.to_string()))
    }
}

struct FieldProjection<T, P, G, M> {
    get: G,
    get_mut: M,
    _marker: PhantomData<fn(&T) -> &P>,
}

impl<T, P, G, M> Projection for FieldProjection<T, P, G, M>
where
    T: 'static,
    P: 'static,
    G: Fn(&T) -> &P + Send + Sync + 'static,
    M: Fn(&mut T) -> &mut P + Send + Sync + 'static,
{
    fn project<'a>(&self, bean: &'a dyn Any) -> Option<&'a dyn Any> {
        bean.downcast_ref::<T>().map(|bean| (self.get)(bean) as &dyn Any)
    }

    fn project_mut<'a>(&self, bean: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        bean.downcast_mut::<T>()
            .map(|bean| (self.get_mut)(bean) as &mut dyn Any)
    }
}

/// Parent accessor seen through a child bean
pub(crate) struct ProjectedGetter {
    pub(crate) projection: Arc<dyn Projection>,
    pub(crate) inner: Arc<dyn ErasedGetter>,
}

impl ErasedGetter for ProjectedGetter {
    fn get<'a>(&self, bean: &'a dyn Any) -> Result<Value<'a>, String> {
        let parent = self
            .projection
            .project(bean)
            .ok_or_else(|| "parent bean is not reachable".to_string())?;
        self.inner.get(parent)
    }
}

/// Parent setter seen through a child bean
pub(crate) struct ProjectedSetter {
    pub(crate) projection: Arc<dyn Projection>,
    pub(crate) inner: Arc<dyn ErasedSetter>,
}

impl ErasedSetter for ProjectedSetter {
    fn set(&self, bean: &mut dyn Any, slot: Slot) -> Result<(), SetFailure> {
        let parent = self
            .projection
            .project_mut(bean)
            .ok_or_else(|| SetFailure::Rejected("parent bean is not reachable".to_string()))?;
        self.inner.set(parent, slot)
    }
}

/// Mapping role of a getter
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Role {
    Predicate(Predicate),
    Subject { relative: bool },
    Type,
}

pub(crate) struct GetterEntry {
    pub(crate) name: String,
    pub(crate) value_type: TypeId,
    pub(crate) shape: Shape,
    pub(crate) getter: Arc<dyn ErasedGetter>,
    pub(crate) role: Option<Role>,
}

pub(crate) struct SetterEntry {
    pub(crate) name: String,
    pub(crate) value_type: TypeId,
    pub(crate) setter: Arc<dyn ErasedSetter>,
}

pub(crate) struct ParentLink {
    pub(crate) shape: Shape,
    pub(crate) projection: Arc<dyn Projection>,
}

/// Accessors of one bean type, looked up by name and value type
#[derive(Default)]
pub(crate) struct AccessorTable {
    pub(crate) getters: Vec<GetterEntry>,
    pub(crate) setters: Vec<SetterEntry>,
}

impl AccessorTable {
    pub(crate) fn getter(&self, name: &str, value_type: TypeId) -> Option<&GetterEntry> {
        self.getters
            .iter()
            .find(|g| g.name == name && g.value_type == value_type)
    }

    /// Setter paired with the given property name
    pub(crate) fn setter_for(&self, property: &str, value_type: TypeId) -> Option<&SetterEntry> {
        let name = setter_name(property);
        self.setters
            .iter()
            .find(|s| s.name == name && s.value_type == value_type)
    }
}

/// Property name of a getter: `get_`/`is_` stripped, otherwise the whole name
pub fn property_name(getter: &str) -> &str {
    ["get_", "is_"]
        .iter()
        .find_map(|prefix| getter.strip_prefix(*prefix).filter(|rest| !rest.is_empty()))
        .unwrap_or(getter)
}

/// Setter name paired with a property
pub fn setter_name(property: &str) -> String {
    format!("set_{}", property)
}

/// Accessor table under construction for bean type `T`
pub struct BeanDescriptor<T: 'static> {
    pub(crate) type_iris: Vec<String>,
    pub(crate) parents: Vec<ParentLink>,
    pub(crate) table: AccessorTable,
    pub(crate) problems: Vec<String>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: 'static> BeanDescriptor<T> {
    pub(crate) fn new() -> Self {
        Self {
            type_iris: Vec::new(),
            parents: Vec::new(),
            table: AccessorTable::default(),
            problems: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Fixed type IRI emitted as `rdf:type`
    pub fn type_iri(&mut self, iri: impl Into<String>) -> &mut Self {
        self.type_iris.push(iri.into());
        self
    }

    /// Inherit the mappings of an embedded parent bean. Its predicates come
    /// before the ones declared here.
    pub fn extends<P, G, M>(&mut self, get: G, get_mut: M) -> &mut Self
    where
        P: RdfBean,
        G: Fn(&T) -> &P + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        self.parents.push(ParentLink {
            shape: Shape::composite::<P>(),
            projection: Arc::new(FieldProjection {
                get,
                get_mut,
                _marker: PhantomData,
            }),
        });
        self
    }

    /// Getter returning a reference to a field
    pub fn getter<V, G>(&mut self, name: &str, get: G) -> Accessor<'_, T>
    where
        V: FieldType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
    {
        self.push_getter::<V>(
            name,
            Arc::new(FieldGetter {
                get,
                _marker: PhantomData,
            }),
        )
    }

    /// Getter that computes its value and may fail
    pub fn computed<V, E, G>(&mut self, name: &str, get: G) -> Accessor<'_, T>
    where
        V: FieldType,
        E: Display + 'static,
        G: Fn(&T) -> Result<V, E> + Send + Sync + 'static,
    {
        self.push_getter::<V>(
            name,
            Arc::new(ComputedGetter {
                get,
                _marker: PhantomData,
            }),
        )
    }

    pub fn setter<V, S>(&mut self, name: &str, set: S) -> &mut Self
    where
        V: FieldType,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.push_setter::<V>(
            name,
            Arc::new(FieldSetter {
                set,
                _marker: PhantomData,
            }),
        )
    }

    /// Setter that may reject the value
    pub fn try_setter<V, E, S>(&mut self, name: &str, set: S) -> &mut Self
    where
        V: FieldType,
        E: Display + 'static,
        S: Fn(&mut T, V) -> Result<(), E> + Send + Sync + 'static,
    {
        self.push_setter::<V>(
            name,
            Arc::new(TrySetter {
                set,
                _marker: PhantomData,
            }),
        )
    }

    /// Getter `name` plus setter `set_<name>` over the same field
    pub fn field<V, G, S>(&mut self, name: &str, get: G, set: S) -> Accessor<'_, T>
    where
        V: FieldType,
        G: Fn(&T) -> &V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.setter::<V, S>(&setter_name(property_name(name)), set);
        self.getter::<V, G>(name, get)
    }

    fn push_getter<V: FieldType>(&mut self, name: &str, getter: Arc<dyn ErasedGetter>) -> Accessor<'_, T> {
        if self.table.getters.iter().any(|g| g.name == name) {
            self.problems.push(format!("getter `{}` declared twice", name));
        }
        self.table.getters.push(GetterEntry {
            name: name.to_string(),
            value_type: TypeId::of::<V>(),
            shape: V::shape(),
            getter,
            role: None,
        });
        let index = self.table.getters.len() - 1;
        Accessor {
            descriptor: self,
            index,
        }
    }

    fn push_setter<V: FieldType>(&mut self, name: &str, setter: Arc<dyn ErasedSetter>) -> &mut Self {
        if self.table.setters.iter().any(|s| s.name == name) {
            self.problems.push(format!("setter `{}` declared twice", name));
        }
        self.table.setters.push(SetterEntry {
            name: name.to_string(),
            value_type: TypeId::of::<V>(),
            setter,
        });
        self
    }
}

/// Freshly declared getter; give it a mapping role or leave it unmapped
pub struct Accessor<'d, T: 'static> {
    descriptor: &'d mut BeanDescriptor<T>,
    index: usize,
}

impl<'d, T: 'static> Accessor<'d, T> {
    /// Map the getter's value to a predicate
    pub fn predicate(self, predicate: Predicate) -> &'d mut BeanDescriptor<T> {
        self.assign(Role::Predicate(predicate))
    }

    /// The getter yields this bean's subject when it is nested in another bean.
    /// A relative subject is appended to the enclosing bean's subject.
    pub fn subject(self, relative: bool) -> &'d mut BeanDescriptor<T> {
        self.assign(Role::Subject { relative })
    }

    /// The getter yields this bean's type IRI
    pub fn rdf_type(self) -> &'d mut BeanDescriptor<T> {
        self.assign(Role::Type)
    }

    fn assign(self, role: Role) -> &'d mut BeanDescriptor<T> {
        self.descriptor.table.getters[self.index].role = Some(role);
        self.descriptor
    }
}
