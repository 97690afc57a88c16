//! Type model for the conversion engine
//!
//! This crate defines what the engine converts between:
//! - Type keys (scalars, temporals, enums, arrays, collections, named types)
//! - An explicit type hierarchy walked in specificity order
//! - Runtime values with total equality and ordering
//! - Collection values carrying wrapper characteristics
//! - Enum definitions and enum sets

pub mod collection;
pub mod enums;
pub mod hierarchy;
pub mod type_key;
pub mod value;

pub use collection::{CollectionError, CollectionResult, CollectionValue};
pub use enums::{EnumSetValue, EnumValue};
pub use hierarchy::{HierarchyError, HierarchyLevel, TypeHierarchy, TypeNode};
pub use type_key::{
    CollectionType, ConcreteCollection, EnumDef, EnumType, Shape, TypeKey, Wrapper,
};
pub use value::{ArrayValue, ObjectValue, Value};
