//! Universal Value Conversion Engine
//!
//! This crate converts runtime values between types. It provides:
//!
//! - **Registry**: an ordered table of leaf conversions grouped by target family
//! - **Resolver**: finds the most specific conversion for a source/target pair
//!   by walking the source type hierarchy, and caches the outcome
//! - **Structural Converters**: arrays, collections and enum sets converted
//!   element by element, preserving collection characteristics
//! - **Conversion Context**: zone, locale, charset, type lookup and per-call
//!   overrides
//! - **Standard Set**: numeric, text, temporal, enum and null conversions
//!
//! # Example
//!
//! ```ignore
//! use octofhir_convert::{Converter, TypeKey, Value};
//!
//! let converter = Converter::new();
//! let value = converter.convert(&Value::string("42"), &TypeKey::Integer).unwrap();
//! assert_eq!(value, Value::Integer(42));
//! ```
//!
//! # Architecture
//!
//! - `Converter`: the facade; applies overrides, short-circuits values that
//!   already have the target type, then dispatches to the resolver's choice
//! - `Resolver`: exact entry, then hierarchy walk, then structural plan
//! - `Registry`: immutable once built; extend it through `RegistryBuilder`
//!
//! # Resolution Order
//!
//! The hierarchy walk visits the source type level by level: the type itself,
//! its superclass chain, then its interfaces breadth first. Within a level the
//! exact target is tried before the target's family, and ties between several
//! matching types of one level are broken by `TieBreak`.

pub mod context;
pub mod converter;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod standard;
pub mod structural;

// Re-export main types
pub use context::{
    BuiltinTypeLookup, Charset, ConversionContext, ConversionContextBuilder, ConversionSettings,
    DEFAULT_MAX_ENUM_NAME_LENGTH, TypeCatalog, TypeLookup,
};
pub use converter::{ConvertCall, Converter, convert, default_converter};
pub use error::{ConvertError, ConvertResult, RegistryError, RegistryResult};
pub use registry::{
    CollectionFactory, ConversionFn, ConversionPair, Registry, RegistryBuilder, RegistryEntry,
};
pub use resolver::{Resolution, Resolver, TieBreak};
pub use structural::{Selection, StructuralPlan, select_collection_type};

pub use octofhir_convert_types::{
    ArrayValue, CollectionError, CollectionType, CollectionValue, ConcreteCollection, EnumSetValue,
    EnumType, EnumValue, ObjectValue, Shape, TypeHierarchy, TypeKey, Value, Wrapper,
};
