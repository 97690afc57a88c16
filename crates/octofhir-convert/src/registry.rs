//! Conversion registry
//!
//! The registry maps `(source, target)` pairs to conversion functions. Entries
//! are grouped into families by target and kept in registration order; within
//! a family a more specific source must be registered before any of its
//! supertypes, because the resolver falls back to general entries only after
//! specific ones. Ordering is checked on every `register` call and once more
//! when the registry is built, since declarations made later may introduce new
//! supertype relations.
//!
//! A registry is assembled through [`RegistryBuilder`] and is immutable once
//! built.

use crate::ConvertCall;
use crate::error::{ConvertResult, RegistryError, RegistryResult};
use indexmap::IndexMap;
use octofhir_convert_types::{CollectionType, CollectionValue, TypeHierarchy, TypeKey, TypeNode, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Conversion function: produces a value of `call.target()` from `value`
pub type ConversionFn =
    Arc<dyn Fn(&Value, &ConvertCall<'_>) -> ConvertResult<Value> + Send + Sync>;

/// Constructor for output collections, given the expected element count
pub type CollectionFactory = Arc<dyn Fn(usize) -> CollectionValue + Send + Sync>;

/// Ordered pair of source and target type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionPair {
    pub source: TypeKey,
    pub target: TypeKey,
}

impl ConversionPair {
    pub fn new(source: TypeKey, target: TypeKey) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for ConversionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// A registered conversion
#[derive(Clone)]
pub struct RegistryEntry {
    /// Position within the family, in registration order
    pub index: usize,
    pub source: TypeKey,
    pub function: ConversionFn,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("index", &self.index)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Entries sharing one target, in registration order, indexed by source
#[derive(Default)]
struct Family {
    entries: Vec<RegistryEntry>,
    by_source: HashMap<TypeKey, usize>,
}

impl Family {
    fn get(&self, source: &TypeKey) -> Option<&RegistryEntry> {
        self.by_source
            .get(source)
            .and_then(|&index| self.entries.get(index))
    }

    fn push(&mut self, source: TypeKey, function: ConversionFn) {
        let index = self.entries.len();
        self.by_source.insert(source.clone(), index);
        self.entries.push(RegistryEntry {
            index,
            source,
            function,
        });
    }
}

/// Builder for `Registry`
#[derive(Default)]
pub struct RegistryBuilder {
    hierarchy: TypeHierarchy,
    families: IndexMap<TypeKey, Family>,
    factories: HashMap<CollectionType, CollectionFactory>,
}

impl RegistryBuilder {
    /// Create an empty builder with built-in type relations
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the superclass and interfaces of a type
    pub fn declare(
        &mut self,
        key: TypeKey,
        superclass: Option<TypeKey>,
        interfaces: impl IntoIterator<Item = TypeKey>,
    ) -> &mut Self {
        self.hierarchy.declare(key, TypeNode::new(superclass, interfaces));
        self
    }

    /// Register a conversion from `source` to `target`
    ///
    /// Fails if the exact pair is already present, or if an earlier entry of
    /// the same target family has a source that is a supertype of `source`.
    pub fn register<F>(
        &mut self,
        source: TypeKey,
        target: TypeKey,
        function: F,
    ) -> RegistryResult<&mut Self>
    where
        F: Fn(&Value, &ConvertCall<'_>) -> ConvertResult<Value> + Send + Sync + 'static,
    {
        self.register_fn(source, target, Arc::new(function))
    }

    /// Register an already shared conversion function
    pub fn register_fn(
        &mut self,
        source: TypeKey,
        target: TypeKey,
        function: ConversionFn,
    ) -> RegistryResult<&mut Self> {
        if let Some(family) = self.families.get(&target) {
            if family.get(&source).is_some() {
                return Err(RegistryError::duplicate(&source, &target));
            }
            if let Some(entry) = family
                .entries
                .iter()
                .find(|entry| self.hierarchy.is_strict_supertype(&entry.source, &source))
            {
                return Err(RegistryError::misordered(&target, &entry.source, &source));
            }
        }
        self.families.entry(target).or_default().push(source, function);
        Ok(self)
    }

    /// Register the constructor used for output collections of `kind`
    pub fn register_factory<F>(&mut self, kind: CollectionType, factory: F) -> &mut Self
    where
        F: Fn(usize) -> CollectionValue + Send + Sync + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    /// Validate the hierarchy and every family, then freeze the registry
    pub fn build(self) -> RegistryResult<Registry> {
        self.hierarchy.validate()?;
        for (target, family) in &self.families {
            let family = &family.entries;
            for (i, earlier) in family.iter().enumerate() {
                if let Some(later) = family[i + 1..]
                    .iter()
                    .find(|later| self.hierarchy.is_strict_supertype(&earlier.source, &later.source))
                {
                    return Err(RegistryError::misordered(target, &earlier.source, &later.source));
                }
            }
        }

        let entries: usize = self.families.values().map(|family| family.entries.len()).sum();
        log::debug!(
            "Built conversion registry: {} entries in {} families, {} factories",
            entries,
            self.families.len(),
            self.factories.len()
        );

        Ok(Registry {
            hierarchy: self.hierarchy,
            families: self.families,
            factories: self.factories,
        })
    }
}

/// Immutable conversion table with its type hierarchy
pub struct Registry {
    hierarchy: TypeHierarchy,
    families: IndexMap<TypeKey, Family>,
    factories: HashMap<CollectionType, CollectionFactory>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("families", &self.families.len())
            .field("entries", &self.len())
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Entry registered for exactly this pair
    pub fn lookup_exact(&self, pair: &ConversionPair) -> Option<&RegistryEntry> {
        self.lookup(&pair.source, &pair.target)
    }

    /// Entry registered for exactly `source -> target`
    pub fn lookup(&self, source: &TypeKey, target: &TypeKey) -> Option<&RegistryEntry> {
        self.families.get(target)?.get(source)
    }

    /// Entries of one target family in registration order
    pub fn family(&self, target: &TypeKey) -> &[RegistryEntry] {
        self.families
            .get(target)
            .map(|family| family.entries.as_slice())
            .unwrap_or_default()
    }

    /// All families in registration order
    pub fn families(&self) -> impl Iterator<Item = (&TypeKey, &[RegistryEntry])> + '_ {
        self.families
            .iter()
            .map(|(target, family)| (target, family.entries.as_slice()))
    }

    /// Factory registered for a collection type
    pub fn factory(&self, kind: &CollectionType) -> Option<&CollectionFactory> {
        self.factories.get(kind)
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.families.values().map(|family| family.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.families.values().all(|family| family.entries.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: Value) -> impl Fn(&Value, &ConvertCall<'_>) -> ConvertResult<Value> {
        move |_, _| Ok(value.clone())
    }

    #[test]
    fn test_specific_before_general_is_accepted() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeKey::Integer, TypeKey::String, constant(Value::string("int")))
            .unwrap()
            .register(TypeKey::Number, TypeKey::String, constant(Value::string("num")))
            .unwrap();
        let registry = builder.build().unwrap();
        let family = registry.family(&TypeKey::String);
        assert_eq!(family.len(), 2);
        assert_eq!(family[0].source, TypeKey::Integer);
        assert_eq!(family[1].index, 1);
    }

    #[test]
    fn test_general_before_specific_is_rejected() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeKey::Number, TypeKey::String, constant(Value::Null))
            .unwrap();
        let err = builder
            .register(TypeKey::Integer, TypeKey::String, constant(Value::Null))
            .err();
        assert_eq!(
            err,
            Some(RegistryError::Misordered {
                family: "String".to_string(),
                earlier: "Number".to_string(),
                later: "Integer".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_pair_is_rejected() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeKey::Long, TypeKey::Integer, constant(Value::Null))
            .unwrap();
        assert!(matches!(
            builder.register(TypeKey::Long, TypeKey::Integer, constant(Value::Null)),
            Err(RegistryError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_rejected_registration_keeps_family_unchanged() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeKey::Number, TypeKey::String, constant(Value::Null))
            .unwrap();
        assert!(
            builder
                .register(TypeKey::Number, TypeKey::String, constant(Value::Null))
                .is_err()
        );
        let registry = builder.build().unwrap();
        assert_eq!(registry.families().count(), 1);
        assert_eq!(registry.family(&TypeKey::String).len(), 1);
    }

    #[test]
    fn test_lookup_finds_entries_anywhere_in_a_large_family() {
        let mut builder = RegistryBuilder::new();
        for i in 0..200 {
            builder
                .register(TypeKey::named(format!("T{i}")), TypeKey::String, constant(Value::Integer(i)))
                .unwrap();
        }
        let registry = builder.build().unwrap();
        let entry = registry
            .lookup(&TypeKey::named("T150"), &TypeKey::String)
            .unwrap();
        assert_eq!(entry.index, 150);
        assert_eq!(entry.source, TypeKey::named("T150"));
        assert!(registry.lookup(&TypeKey::named("T200"), &TypeKey::String).is_none());
    }

    #[test]
    fn test_build_rechecks_after_late_declarations() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeKey::named("Shape"), TypeKey::String, constant(Value::Null))
            .unwrap()
            .register(TypeKey::named("Circle"), TypeKey::String, constant(Value::Null))
            .unwrap();
        builder.declare(TypeKey::named("Circle"), Some(TypeKey::named("Shape")), []);
        assert!(matches!(
            builder.build(),
            Err(RegistryError::Misordered { .. })
        ));
    }

    #[test]
    fn test_cyclic_declarations_fail_build() {
        let mut builder = RegistryBuilder::new();
        builder
            .declare(TypeKey::named("A"), Some(TypeKey::named("B")), [])
            .declare(TypeKey::named("B"), Some(TypeKey::named("A")), []);
        assert!(matches!(
            builder.build(),
            Err(RegistryError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_lookup_exact_ignores_hierarchy() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(TypeKey::Number, TypeKey::String, constant(Value::Null))
            .unwrap();
        let registry = builder.build().unwrap();
        assert!(
            registry
                .lookup_exact(&ConversionPair::new(TypeKey::Number, TypeKey::String))
                .is_some()
        );
        assert!(
            registry
                .lookup_exact(&ConversionPair::new(TypeKey::Integer, TypeKey::String))
                .is_none()
        );
    }
}
