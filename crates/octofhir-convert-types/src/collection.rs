//! Collection values
//!
//! A `CollectionValue` pairs its runtime collection type with a backing store
//! chosen from that type: sequences for lists, insertion-ordered hash sets,
//! sorted sets, and a case-folding map for case-insensitive sets. Wrapper
//! characteristics are enforced on every mutation: unmodifiable and empty
//! collections reject changes, checked collections reject elements of the
//! wrong type.

use crate::{CollectionType, ConcreteCollection, Shape, TypeHierarchy, TypeKey, Value, Wrapper};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Collection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// Mutation of a read-only collection
    #[error("{kind} does not support modification")]
    ReadOnly { kind: String },

    /// Element is not an instance of the collection's element type
    #[error("Element of type {found} is not allowed, expected {expected}")]
    ElementType { expected: String, found: String },

    /// More elements than the collection can hold
    #[error("{kind} cannot hold {len} elements")]
    Capacity { kind: String, len: usize },
}

/// Result type for collection operations
pub type CollectionResult<T> = Result<T, CollectionError>;

#[derive(Debug, Clone)]
enum Store {
    Sequence(Vec<Value>),
    Hashed(IndexSet<Value>),
    Sorted(BTreeSet<Value>),
    /// Folded key -> first inserted original
    CaseInsensitive(IndexMap<Value, Value>),
}

impl Store {
    fn for_kind(kind: &CollectionType, capacity: usize) -> Self {
        match kind {
            CollectionType::Concrete(ConcreteCollection::CaseInsensitiveSet) => {
                Self::CaseInsensitive(IndexMap::with_capacity(capacity))
            }
            other => match other.shape() {
                Shape::Collection | Shape::List => Self::Sequence(Vec::with_capacity(capacity)),
                Shape::Set => Self::Hashed(IndexSet::with_capacity(capacity)),
                Shape::SortedSet => Self::Sorted(BTreeSet::new()),
            },
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Sequence(elements) => elements.len(),
            Self::Hashed(elements) => elements.len(),
            Self::Sorted(elements) => elements.len(),
            Self::CaseInsensitive(elements) => elements.len(),
        }
    }

    fn insert(&mut self, value: Value) -> bool {
        match self {
            Self::Sequence(elements) => {
                elements.push(value);
                true
            }
            Self::Hashed(elements) => elements.insert(value),
            Self::Sorted(elements) => elements.insert(value),
            Self::CaseInsensitive(elements) => {
                let key = fold_case(&value);
                if elements.contains_key(&key) {
                    false
                } else {
                    elements.insert(key, value);
                    true
                }
            }
        }
    }

    fn remove(&mut self, value: &Value) -> bool {
        match self {
            Self::Sequence(elements) => match elements.iter().position(|e| e == value) {
                Some(index) => {
                    elements.remove(index);
                    true
                }
                None => false,
            },
            Self::Hashed(elements) => elements.shift_remove(value),
            Self::Sorted(elements) => elements.remove(value),
            Self::CaseInsensitive(elements) => elements.shift_remove(&fold_case(value)).is_some(),
        }
    }

    fn contains(&self, value: &Value) -> bool {
        match self {
            Self::Sequence(elements) => elements.contains(value),
            Self::Hashed(elements) => elements.contains(value),
            Self::Sorted(elements) => elements.contains(value),
            Self::CaseInsensitive(elements) => elements.contains_key(&fold_case(value)),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Sequence(elements) => elements.clear(),
            Self::Hashed(elements) => elements.clear(),
            Self::Sorted(elements) => elements.clear(),
            Self::CaseInsensitive(elements) => elements.clear(),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Self::Sequence(elements) => Box::new(elements.iter()),
            Self::Hashed(elements) => Box::new(elements.iter()),
            Self::Sorted(elements) => Box::new(elements.iter()),
            Self::CaseInsensitive(elements) => Box::new(elements.values()),
        }
    }

    fn is_ordered_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

/// Key under which a case-insensitive set stores an element
fn fold_case(value: &Value) -> Value {
    match value {
        Value::String(s) | Value::StringBuilder(s) => Value::String(s.to_lowercase()),
        Value::Char(c) => Value::Char(c.to_lowercase().next().unwrap_or(*c)),
        other => other.clone(),
    }
}

/// A collection together with its runtime type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "CollectionRepr", try_from = "CollectionRepr")]
pub struct CollectionValue {
    kind: CollectionType,
    store: Store,
}

impl CollectionValue {
    /// Empty mutable-or-not collection of `kind`; interfaces become their
    /// default implementation
    pub fn new(kind: CollectionType) -> Self {
        Self::with_capacity(kind, 0)
    }

    /// Empty collection of `kind` with room for `capacity` elements
    pub fn with_capacity(kind: CollectionType, capacity: usize) -> Self {
        let kind = kind.instantiable();
        let store = Store::for_kind(&kind, capacity);
        Self { kind, store }
    }

    /// Growable list holding `elements`
    pub fn list(elements: impl IntoIterator<Item = Value>) -> Self {
        Self {
            kind: CollectionType::Concrete(ConcreteCollection::ArrayList),
            store: Store::Sequence(elements.into_iter().collect()),
        }
    }

    /// Build a collection of `kind` holding `elements`
    ///
    /// This is the only way to populate read-only collections. Empty
    /// collections accept no elements; checked collections validate each one.
    pub fn from_elements(
        kind: CollectionType,
        elements: impl IntoIterator<Item = Value>,
    ) -> CollectionResult<Self> {
        let elements = elements.into_iter();
        let mut collection = Self::with_capacity(kind, elements.size_hint().0);
        for element in elements {
            collection.admit(&element)?;
            collection.store.insert(element);
        }
        if matches!(collection.kind.wrapper(), Some(Wrapper::Empty)) && !collection.is_empty() {
            return Err(CollectionError::Capacity {
                kind: collection.kind.to_string(),
                len: collection.len(),
            });
        }
        Ok(collection)
    }

    /// Runtime collection type
    pub fn kind(&self) -> &CollectionType {
        &self.kind
    }

    pub fn type_key(&self) -> TypeKey {
        TypeKey::Collection(self.kind.clone())
    }

    /// Check if this collection rejects mutation
    pub fn is_read_only(&self) -> bool {
        self.kind.is_read_only()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in the collection's iteration order
    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.store.iter()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.store.contains(value)
    }

    /// Add an element; returns whether the collection changed
    pub fn insert(&mut self, value: Value) -> CollectionResult<bool> {
        self.check_writable()?;
        self.admit(&value)?;
        Ok(self.store.insert(value))
    }

    /// Remove one occurrence of an element; returns whether it was present
    pub fn remove(&mut self, value: &Value) -> CollectionResult<bool> {
        self.check_writable()?;
        Ok(self.store.remove(value))
    }

    /// Remove every element
    pub fn clear(&mut self) -> CollectionResult<()> {
        self.check_writable()?;
        self.store.clear();
        Ok(())
    }

    fn check_writable(&self) -> CollectionResult<()> {
        if self.is_read_only() {
            return Err(CollectionError::ReadOnly {
                kind: self.kind.to_string(),
            });
        }
        Ok(())
    }

    // Checked collections only compare against built-in relations and exact
    // named types; caller-declared hierarchies are not visible here.
    fn admit(&self, value: &Value) -> CollectionResult<()> {
        if let Some(Wrapper::Checked(element)) = self.kind.wrapper() {
            if !value.is_null() && !TypeHierarchy::new().is_instance(value, element) {
                return Err(CollectionError::ElementType {
                    expected: element.name(),
                    found: value.type_key().name(),
                });
            }
        }
        Ok(())
    }

    fn sorted_elements(&self) -> Vec<&Value> {
        let mut elements: Vec<&Value> = self.iter().collect();
        if !self.store.is_ordered_sequence() {
            elements.sort();
        }
        elements
    }
}

impl PartialEq for CollectionValue {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.len() != other.len() {
            return false;
        }
        match (&self.store, &other.store) {
            (Store::Sequence(a), Store::Sequence(b)) => a == b,
            _ => self.iter().all(|element| other.contains(element)),
        }
    }
}

impl Eq for CollectionValue {}

impl std::hash::Hash for CollectionValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.len().hash(state);
    }
}

impl PartialOrd for CollectionValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollectionValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.kind
            .to_string()
            .cmp(&other.kind.to_string())
            .then_with(|| self.sorted_elements().cmp(&other.sorted_elements()))
    }
}

impl fmt::Display for CollectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements: Vec<String> = self.iter().map(ToString::to_string).collect();
        write!(f, "{}[{}]", self.kind, elements.join(", "))
    }
}

/// Serialized form: the runtime type and the elements in iteration order
#[derive(Serialize, Deserialize)]
struct CollectionRepr {
    kind: CollectionType,
    elements: Vec<Value>,
}

impl From<CollectionValue> for CollectionRepr {
    fn from(collection: CollectionValue) -> Self {
        let elements = collection.iter().cloned().collect();
        Self {
            kind: collection.kind,
            elements,
        }
    }
}

impl TryFrom<CollectionRepr> for CollectionValue {
    type Error = CollectionError;

    fn try_from(repr: CollectionRepr) -> Result<Self, Self::Error> {
        Self::from_elements(repr.kind, repr.elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmodifiable_rejects_mutation() {
        let mut list = CollectionValue::from_elements(
            CollectionType::Wrapped(Wrapper::Unmodifiable, Shape::List),
            [Value::Integer(1)],
        )
        .unwrap();
        assert!(list.is_read_only());
        assert!(matches!(
            list.insert(Value::Integer(2)),
            Err(CollectionError::ReadOnly { .. })
        ));
        assert!(list.clear().is_err());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_empty_wrapper_holds_nothing() {
        let result = CollectionValue::from_elements(
            CollectionType::Wrapped(Wrapper::Empty, Shape::Set),
            [Value::Integer(1)],
        );
        assert!(matches!(result, Err(CollectionError::Capacity { len: 1, .. })));
    }

    #[test]
    fn test_checked_wrapper_validates_elements() {
        let mut checked = CollectionValue::new(CollectionType::Wrapped(
            Wrapper::Checked(Box::new(TypeKey::Number)),
            Shape::List,
        ));
        assert!(checked.insert(Value::Long(5)).unwrap());
        assert!(matches!(
            checked.insert(Value::string("five")),
            Err(CollectionError::ElementType { .. })
        ));
    }

    #[test]
    fn test_case_insensitive_set_keeps_first_spelling() {
        let mut set =
            CollectionValue::new(CollectionType::Concrete(ConcreteCollection::CaseInsensitiveSet));
        assert!(set.insert(Value::string("Alpha")).unwrap());
        assert!(!set.insert(Value::string("ALPHA")).unwrap());
        assert!(set.contains(&Value::string("alpha")));
        let elements: Vec<&Value> = set.iter().collect();
        assert_eq!(elements, vec![&Value::string("Alpha")]);
    }

    #[test]
    fn test_interface_kind_becomes_default_implementation() {
        let set = CollectionValue::new(CollectionType::Interface(Shape::SortedSet));
        assert_eq!(
            set.kind(),
            &CollectionType::Concrete(ConcreteCollection::TreeSet)
        );
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let kind = CollectionType::Concrete(ConcreteCollection::LinkedHashSet);
        let a = CollectionValue::from_elements(kind.clone(), [Value::Integer(1), Value::Integer(2)])
            .unwrap();
        let b = CollectionValue::from_elements(kind, [Value::Integer(2), Value::Integer(1)])
            .unwrap();
        assert_eq!(a, b);
    }
}
