//! Structural converters
//!
//! Generic conversion between container shapes: arrays, collections and enum
//! sets. A plan is chosen once per pair by the resolver and run per value;
//! each element is converted through the dispatcher with the element target,
//! so nested containers recurse naturally. Output containers are always
//! freshly built and never alias the source.

mod arrays;
mod characteristics;
mod collections;
mod enum_sets;

pub use characteristics::{Selection, select_collection_type};
pub(crate) use enum_sets::constant_by_name;

use crate::ConvertCall;
use crate::error::{ConvertError, ConvertResult};
use octofhir_convert_types::{CollectionType, EnumType, TypeKey, Value};
use std::borrow::Cow;

/// Element-wise conversion strategy for a container target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralPlan {
    /// Build an array of `component`
    ToArray { component: TypeKey },
    /// Build a collection of `kind`
    ToCollection { kind: CollectionType },
    /// Build an enum set of `enum_type`
    ToEnumSet { enum_type: EnumType },
}

impl StructuralPlan {
    /// Plan for a container pair; `None` unless both sides are containers
    pub fn for_pair(source: &TypeKey, target: &TypeKey) -> Option<Self> {
        if !source.is_container() {
            return None;
        }
        match target {
            TypeKey::Array(component) => Some(Self::ToArray {
                component: (**component).clone(),
            }),
            TypeKey::Collection(kind) => Some(Self::ToCollection { kind: kind.clone() }),
            TypeKey::EnumSet(enum_type) => Some(Self::ToEnumSet {
                enum_type: enum_type.clone(),
            }),
            _ => None,
        }
    }

    /// Run the plan against a container value
    pub fn execute(&self, value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
        match self {
            Self::ToArray { component } => arrays::to_array(value, component, call),
            Self::ToCollection { kind } => collections::to_collection(value, kind, call),
            Self::ToEnumSet { enum_type } => enum_sets::to_enum_set(value, enum_type, call),
        }
    }
}

/// Elements of a container value in iteration order
fn elements<'v>(
    value: &'v Value,
    expected: &TypeKey,
) -> ConvertResult<Box<dyn Iterator<Item = Cow<'v, Value>> + 'v>> {
    match value {
        Value::Array(array) => Ok(Box::new(array.iter().map(Cow::Borrowed))),
        Value::Collection(collection) => Ok(Box::new(collection.iter().map(Cow::Borrowed))),
        Value::EnumSet(set) => Ok(Box::new(set.iter().map(|v| Cow::Owned(Value::Enum(v))))),
        other => Err(ConvertError::ambiguous(other, expected)),
    }
}

/// Convert one element; nulls are kept as they are
fn convert_element(
    element: Cow<'_, Value>,
    target: &TypeKey,
    call: &ConvertCall<'_>,
) -> ConvertResult<Value> {
    if element.is_null() {
        return Ok(Value::Null);
    }
    call.convert(&element, target)
}
