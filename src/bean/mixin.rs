//! Mixin overlays
//!
//! A mixin adds mapping metadata to a bean type it cannot annotate itself. It
//! names methods of the target, and each method binds to the target getter of
//! the same name and value type. The setter is looked up as `set_<property>`;
//! a target without one yields a write-only property.

use super::analysis::{Predicate, PropertyAnalysis};
use super::descriptor::{property_name, AccessorTable, RdfBean};
use super::error::{MappingError, MappingResult};
use super::field::FieldType;
use crate::rdf::NamedNode;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Metadata overlay for another bean type
pub trait MixIn: 'static {
    fn describe(mixin: &mut MixInDescriptor);
}

#[derive(Debug, Clone)]
pub(crate) struct MixInMethod {
    name: String,
    value_type: TypeId,
    value_type_name: &'static str,
    predicate: Option<Predicate>,
}

/// Overlay under construction
#[derive(Debug, Clone, Default)]
pub struct MixInDescriptor {
    mixin_name: &'static str,
    type_iri: Option<String>,
    methods: Vec<MixInMethod>,
}

impl MixInDescriptor {
    pub(crate) fn of<M: MixIn>() -> Self {
        let mut descriptor = Self {
            mixin_name: type_name::<M>(),
            ..Self::default()
        };
        M::describe(&mut descriptor);
        descriptor
    }

    /// Type IRI adopted when the target has none yet
    pub fn type_iri(&mut self, iri: impl Into<String>) -> &mut Self {
        self.type_iri = Some(iri.into());
        self
    }

    /// Target method with value type `V`
    pub fn method<V: FieldType>(&mut self, name: &str) -> MixInMethodBuilder<'_> {
        self.methods.push(MixInMethod {
            name: name.to_string(),
            value_type: TypeId::of::<V>(),
            value_type_name: type_name::<V>(),
            predicate: None,
        });
        let index = self.methods.len() - 1;
        MixInMethodBuilder {
            descriptor: self,
            index,
        }
    }

    pub fn name(&self) -> &'static str {
        self.mixin_name
    }
}

pub struct MixInMethodBuilder<'d> {
    descriptor: &'d mut MixInDescriptor,
    index: usize,
}

impl<'d> MixInMethodBuilder<'d> {
    pub fn predicate(self, predicate: Predicate) -> &'d mut MixInDescriptor {
        self.descriptor.methods[self.index].predicate = Some(predicate);
        self.descriptor
    }
}

/// Mixins keyed by target type
#[derive(Debug, Clone, Default)]
pub struct MixInRegistry {
    mixins: HashMap<TypeId, Arc<MixInDescriptor>>,
}

impl MixInRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach mixin `M` to `Target`, replacing any previous mixin for it
    pub fn register<Target: RdfBean, M: MixIn>(&mut self) {
        let descriptor = MixInDescriptor::of::<M>();
        debug!(
            "Registering mixin {} for {}",
            descriptor.name(),
            type_name::<Target>()
        );
        if self
            .mixins
            .insert(TypeId::of::<Target>(), Arc::new(descriptor))
            .is_some()
        {
            debug!("Replaced previous mixin for {}", type_name::<Target>());
        }
    }

    pub fn get(&self, target: TypeId) -> Option<Arc<MixInDescriptor>> {
        self.mixins.get(&target).cloned()
    }

    pub fn contains<Target: 'static>(&self) -> bool {
        self.mixins.contains_key(&TypeId::of::<Target>())
    }

    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }
}

/// Outcome of binding a mixin to a target's accessors
#[derive(Debug, Default)]
pub(crate) struct MixInResolution {
    pub(crate) type_iri: Option<NamedNode>,
    /// Nested analyses are not attached yet
    pub(crate) properties: Vec<PropertyAnalysis>,
}

pub(crate) fn parse_iri(type_name: &'static str, iri: &str) -> MappingResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| MappingError::Analysis {
        type_name,
        reason: e.to_string(),
    })
}

/// Bind `mixin` to the accessors of the target type
pub(crate) fn resolve(
    mixin: &MixInDescriptor,
    target: &AccessorTable,
    target_name: &'static str,
) -> MappingResult<MixInResolution> {
    let mut resolution = MixInResolution {
        type_iri: mixin
            .type_iri
            .as_deref()
            .map(|iri| parse_iri(target_name, iri))
            .transpose()?,
        properties: Vec::new(),
    };

    for method in &mixin.methods {
        let Some(getter) = target.getter(&method.name, method.value_type) else {
            warn!(
                "Mixin {} names `{}` ({}), which {} does not have; skipping",
                mixin.mixin_name, method.name, method.value_type_name, target_name
            );
            continue;
        };
        let Some(predicate) = &method.predicate else {
            continue;
        };

        let property = property_name(&method.name);
        let setter = target.setter_for(property, method.value_type);
        if setter.is_none() {
            debug!("{}.{} has no setter; mapped write-only", target_name, property);
        }

        resolution.properties.push(PropertyAnalysis {
            name: property.to_string(),
            predicate: parse_iri(target_name, predicate.iri())?,
            is_literal: predicate.is_literal(),
            datatype: parse_iri(target_name, predicate.datatype())?,
            shape: getter.shape.clone(),
            getter: getter.getter.clone(),
            setter: setter.map(|s| s.setter.clone()),
            nested: None,
        });
    }

    Ok(resolution)
}
