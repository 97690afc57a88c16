//! Errors for the conversion engine

use octofhir_convert_types::{CollectionError, HierarchyError, TypeKey, Value};
use thiserror::Error;

/// Result type for conversions
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for registry construction
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while converting a value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// No conversion exists for the pair
    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    /// Input text or shape could not be parsed into the target
    #[error("Cannot convert '{input}' to {target}: {reason}")]
    InvalidFormat {
        target: String,
        input: String,
        reason: String,
    },

    /// Value does not fit the target's range
    #[error("Value {value} is out of range for {target}")]
    RangeOverflow { value: String, target: String },

    /// Source shape cannot be interpreted as the expected one
    #[error("Cannot interpret {found} as {expected}")]
    AmbiguousSource { found: String, expected: String },
}

impl ConvertError {
    /// Create an unsupported conversion error
    pub fn unsupported(from: &TypeKey, to: &TypeKey) -> Self {
        Self::UnsupportedConversion {
            from: from.name(),
            to: to.name(),
        }
    }

    /// Create an invalid format error
    pub fn invalid_format(
        target: &TypeKey,
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            target: target.name(),
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a range overflow error
    pub fn range_overflow(value: impl ToString, target: &TypeKey) -> Self {
        Self::RangeOverflow {
            value: value.to_string(),
            target: target.name(),
        }
    }

    /// Create an ambiguous source error
    pub fn ambiguous(found: &Value, expected: &TypeKey) -> Self {
        Self::AmbiguousSource {
            found: found.type_key().name(),
            expected: expected.name(),
        }
    }
}

impl From<CollectionError> for ConvertError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::Capacity { kind, len } => Self::RangeOverflow {
                value: format!("{} elements", len),
                target: kind,
            },
            CollectionError::ElementType { expected, found } => {
                Self::AmbiguousSource { found, expected }
            }
            CollectionError::ReadOnly { kind } => Self::InvalidFormat {
                target: kind.clone(),
                input: kind,
                reason: "collection is read-only".to_string(),
            },
        }
    }
}

/// Errors raised while building a registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A general source is registered before a more specific one
    #[error(
        "Registry family {family}: {earlier} is registered before its subtype {later}; register specific sources first"
    )]
    Misordered {
        family: String,
        earlier: String,
        later: String,
    },

    /// The exact pair is already registered
    #[error("Conversion from {from} to {to} is already registered")]
    Duplicate { from: String, to: String },

    /// A declared superclass chain loops
    #[error("Type hierarchy of {type_name} is cyclic")]
    CyclicHierarchy { type_name: String },
}

impl RegistryError {
    /// Create a misordered family error
    pub fn misordered(family: &TypeKey, earlier: &TypeKey, later: &TypeKey) -> Self {
        Self::Misordered {
            family: family.name(),
            earlier: earlier.name(),
            later: later.name(),
        }
    }

    /// Create a duplicate pair error
    pub fn duplicate(from: &TypeKey, to: &TypeKey) -> Self {
        Self::Duplicate {
            from: from.name(),
            to: to.name(),
        }
    }
}

impl From<HierarchyError> for RegistryError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::Cycle { type_name } => Self::CyclicHierarchy { type_name },
        }
    }
}
