//! Mapping errors
//!
//! Every variant is fatal for the read or write call that raised it. The only
//! failure the engines recover from locally is a getter error on the lenient
//! write path, which is logged and the property skipped.

use crate::rdf::{ParseError, SerializeError};
use thiserror::Error;

/// Bean mapping errors
#[derive(Error, Debug)]
pub enum MappingError {
    /// Bean metadata is malformed or the type cannot be described
    #[error("Analysis of {type_name} failed: {reason}")]
    Analysis {
        type_name: &'static str,
        reason: String,
    },

    /// No usable bean instance could be created
    #[error("Failed to instantiate {type_name}: {reason}")]
    Instantiation {
        type_name: &'static str,
        reason: String,
    },

    /// No converter for a scalar type, or the converter rejected its input
    #[error("Cannot convert value to {type_name}: {reason}")]
    Conversion {
        type_name: &'static str,
        reason: String,
    },

    /// An accessor rejected the call
    #[error("Failed to access property `{property}` on {type_name}: {reason}")]
    Access {
        type_name: &'static str,
        property: String,
        reason: String,
    },

    /// Multiple values for a property whose type is neither a list nor a set
    #[error("Property `{property}` has unsupported collection type {type_name}")]
    UnsupportedCollection {
        type_name: &'static str,
        property: String,
    },

    /// A value was found for a property that has no setter
    #[error("Property `{property}` on {type_name} has no setter")]
    MissingSetter {
        type_name: &'static str,
        property: String,
    },

    /// A nested bean cannot be linked because its subject is unknown
    #[error("Nested bean {type_name} has no subject: {reason}")]
    MissingSubject {
        type_name: &'static str,
        reason: String,
    },

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Graph input could not be parsed
    #[error(transparent)]
    FormatParse(#[from] ParseError),

    /// Graph output could not be written
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

pub type MappingResult<T> = Result<T, MappingError>;
