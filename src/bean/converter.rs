//! Value converters
//!
//! The read engine turns graph values into scalar field values through a
//! registry keyed by the target type. A fresh registry knows strings, IRIs,
//! RFC 3339 timestamps, booleans and the primitive numbers; anything else has
//! to be registered before beans using it can be read.

use super::error::{MappingError, MappingResult};
use crate::rdf::{NamedNode, RdfObject};
use chrono::{DateTime, Utc};
use oxiri::Iri;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

type ConvertFn = Arc<dyn Fn(&RdfObject) -> Result<Box<dyn Any>, String> + Send + Sync>;

struct Converter {
    type_name: &'static str,
    convert: ConvertFn,
}

/// Target type → conversion function
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<TypeId, Arc<Converter>>,
}

impl ConverterRegistry {
    /// Registry with the built-in converters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    /// Registry without any converters
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register the converter for `T`, replacing any previous one
    pub fn register<T, E, F>(&mut self, convert: F)
    where
        T: 'static,
        E: Display,
        F: Fn(&RdfObject) -> Result<T, E> + Send + Sync + 'static,
    {
        let erased: ConvertFn = Arc::new(move |value: &RdfObject| {
            convert(value)
                .map(|v| Box::new(v) as Box<dyn Any>)
                .map_err(|e| e.to_string())
        });
        let previous = self.converters.insert(
            TypeId::of::<T>(),
            Arc::new(Converter {
                type_name: type_name::<T>(),
                convert: erased,
            }),
        );
        if previous.is_some() {
            debug!("Replaced converter for {}", type_name::<T>());
        }
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_type(TypeId::of::<T>())
    }

    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.converters.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Convert `value` into a `T`
    pub fn convert<T: 'static>(&self, value: &RdfObject) -> MappingResult<T> {
        let converted = self.convert_erased(TypeId::of::<T>(), type_name::<T>(), value)?;
        converted
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| MappingError::Conversion {
                type_name: type_name::<T>(),
                reason: "converter produced a different type".to_string(),
            })
    }

    pub(crate) fn convert_erased(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        value: &RdfObject,
    ) -> MappingResult<Box<dyn Any>> {
        let converter = self
            .converters
            .get(&type_id)
            .ok_or_else(|| MappingError::Conversion {
                type_name,
                reason: "no converter registered".to_string(),
            })?;
        (converter.convert)(value).map_err(|reason| MappingError::Conversion {
            type_name: converter.type_name,
            reason: format!("{} (value {})", reason, value),
        })
    }

    fn register_parsed<T>(&mut self)
    where
        T: FromStr + 'static,
        T::Err: Display,
    {
        self.register(|value: &RdfObject| value.string_value().parse::<T>());
    }

    fn register_builtins(&mut self) {
        self.register(|value: &RdfObject| {
            Ok::<_, Infallible>(value.string_value().to_string())
        });
        self.register(|value: &RdfObject| match value {
            RdfObject::NamedNode(node) => Ok(node.clone()),
            other => NamedNode::new(other.string_value()),
        });
        self.register(|value: &RdfObject| Iri::parse(value.string_value().to_string()));
        self.register(|value: &RdfObject| DateTime::parse_from_rfc3339(value.string_value()));
        self.register(|value: &RdfObject| {
            DateTime::parse_from_rfc3339(value.string_value()).map(|t| t.with_timezone(&Utc))
        });
        self.register(|value: &RdfObject| match value.string_value() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(format!("`{}` is not a boolean", other)),
        });
        self.register_parsed::<i32>();
        self.register_parsed::<i64>();
        self.register_parsed::<u32>();
        self.register_parsed::<u64>();
        self.register_parsed::<f32>();
        self.register_parsed::<f64>();
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.converters.values().map(|c| c.type_name).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &names)
            .finish()
    }
}
