//! Explicit type hierarchy
//!
//! Supertype relations are kept as an adjacency list: every type has at most
//! one superclass and an ordered list of capability interfaces. Built-in types
//! carry fixed relations; caller-declared types (`TypeKey::Named`) get theirs
//! through [`TypeHierarchy::declare`]. The resolver walks this graph instead of
//! inspecting values at runtime.
//!
//! `Any` is the implicit root. It never appears in a superclass chain and is
//! always the last member of a walk.

use crate::{CollectionType, ConcreteCollection, Shape, TypeKey, Value};
use smallvec::{SmallVec, smallvec};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Direct supertypes of one type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeNode {
    /// Superclass, `None` when the type extends `Any` directly
    pub superclass: Option<TypeKey>,
    /// Implemented interfaces in declaration order
    pub interfaces: SmallVec<[TypeKey; 4]>,
}

impl TypeNode {
    pub fn new(superclass: Option<TypeKey>, interfaces: impl IntoIterator<Item = TypeKey>) -> Self {
        Self {
            superclass,
            interfaces: interfaces.into_iter().collect(),
        }
    }

    fn interfaces(interfaces: SmallVec<[TypeKey; 4]>) -> Self {
        Self {
            superclass: None,
            interfaces,
        }
    }
}

/// Hierarchy errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// A superclass chain leads back to its start
    #[error("Superclass chain of {type_name} is cyclic")]
    Cycle { type_name: String },
}

/// One specificity level of a hierarchy walk
pub type HierarchyLevel = SmallVec<[TypeKey; 4]>;

/// Supertype graph for built-in and declared types
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    declared: HashMap<TypeKey, TypeNode>,
}

impl TypeHierarchy {
    /// Hierarchy with built-in relations only
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the direct supertypes of a type, replacing any earlier
    /// declaration and the built-in relations for it
    pub fn declare(&mut self, key: TypeKey, node: TypeNode) {
        self.declared.insert(key, node);
    }

    /// Check if a type has an explicit declaration
    pub fn is_declared(&self, key: &TypeKey) -> bool {
        self.declared.contains_key(key)
    }

    /// Direct supertypes of a type
    pub fn node(&self, key: &TypeKey) -> TypeNode {
        self.declared
            .get(key)
            .cloned()
            .unwrap_or_else(|| builtin_node(key))
    }

    /// Check every declared superclass chain for cycles
    pub fn validate(&self) -> Result<(), HierarchyError> {
        for key in self.declared.keys() {
            let mut seen = HashSet::new();
            let mut current = Some(key.clone());
            while let Some(ty) = current {
                if !seen.insert(ty.clone()) {
                    return Err(HierarchyError::Cycle {
                        type_name: key.name(),
                    });
                }
                current = self.node(&ty).superclass;
            }
        }
        Ok(())
    }

    /// Superclass chain of a type, most specific first, excluding the type
    /// itself and `Any`
    pub fn superclass_chain(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut chain = Vec::new();
        let mut seen: HashSet<TypeKey> = HashSet::from([key.clone()]);
        let mut current = self.node(key).superclass;
        while let Some(ty) = current {
            if ty == TypeKey::Any || !seen.insert(ty.clone()) {
                break;
            }
            current = self.node(&ty).superclass;
            chain.push(ty);
        }
        chain
    }

    /// Walk the hierarchy of `key` in specificity order
    ///
    /// Levels are: the type itself; each superclass of its chain; the
    /// interfaces reachable from the type and its superclasses, breadth-first,
    /// one level per BFS depth; finally `Any`. Within an interface level,
    /// members keep declaration order. `Null` has no supertypes at all.
    pub fn levels(&self, key: &TypeKey) -> Vec<HierarchyLevel> {
        let mut levels: Vec<HierarchyLevel> = vec![smallvec![key.clone()]];
        if matches!(key, TypeKey::Null | TypeKey::Any) {
            return levels;
        }

        let chain = self.superclass_chain(key);
        let mut seen: HashSet<TypeKey> = HashSet::from([key.clone(), TypeKey::Any]);
        for superclass in &chain {
            seen.insert(superclass.clone());
            levels.push(smallvec![superclass.clone()]);
        }

        // Interfaces, breadth-first from the type and its superclass chain
        let mut frontier: VecDeque<TypeKey> = VecDeque::new();
        for ty in std::iter::once(key).chain(chain.iter()) {
            frontier.extend(self.node(ty).interfaces);
        }
        while !frontier.is_empty() {
            let mut level = HierarchyLevel::new();
            let mut next = VecDeque::new();
            for ty in frontier.drain(..) {
                if !seen.insert(ty.clone()) {
                    continue;
                }
                let node = self.node(&ty);
                next.extend(node.superclass);
                next.extend(node.interfaces);
                level.push(ty);
            }
            if !level.is_empty() {
                levels.push(level);
            }
            frontier = next;
        }

        levels.push(smallvec![TypeKey::Any]);
        levels
    }

    /// All supertypes of `key` in walk order, the type itself first
    pub fn ancestors(&self, key: &TypeKey) -> Vec<TypeKey> {
        self.levels(key).into_iter().flatten().collect()
    }

    /// Check if a value of type `from` may be used where `to` is expected
    pub fn is_assignable(&self, from: &TypeKey, to: &TypeKey) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (TypeKey::Null, _) => false,
            (_, TypeKey::Any) => true,
            // Arrays are covariant in their component type
            (TypeKey::Array(from_component), TypeKey::Array(to_component)) => {
                self.is_assignable(from_component, to_component)
            }
            _ => self.ancestors(from).iter().any(|ancestor| ancestor == to),
        }
    }

    /// Check if `general` is a supertype of `specific` and not the same type
    pub fn is_strict_supertype(&self, general: &TypeKey, specific: &TypeKey) -> bool {
        general != specific && self.is_assignable(specific, general)
    }

    /// Check if a value is an instance of `target`
    pub fn is_instance(&self, value: &Value, target: &TypeKey) -> bool {
        !value.is_null() && self.is_assignable(&value.type_key(), target)
    }
}

/// Built-in direct supertypes
fn builtin_node(key: &TypeKey) -> TypeNode {
    use TypeKey as T;

    match key {
        T::Any | T::Null | T::Number | T::Comparable | T::CharSequence | T::Temporal => {
            TypeNode::default()
        }
        T::AnyEnum | T::Boolean | T::Char | T::Duration | T::ZoneOffset => {
            TypeNode::interfaces(smallvec![T::Comparable])
        }
        T::Locale | T::TypeRef | T::Named(_) | T::Array(_) => TypeNode::default(),
        T::Byte
        | T::Short
        | T::Integer
        | T::Long
        | T::Float
        | T::Double
        | T::BigInteger
        | T::BigDecimal => TypeNode::new(Some(T::Number), [T::Comparable]),
        T::String | T::StringBuilder => {
            TypeNode::interfaces(smallvec![T::CharSequence, T::Comparable])
        }
        T::Date | T::LocalDateTime | T::DateTime | T::Time | T::Instant => {
            TypeNode::interfaces(smallvec![T::Temporal, T::Comparable])
        }
        T::Enum(_) => TypeNode::new(Some(T::AnyEnum), [T::Comparable]),
        T::EnumSet(_) => TypeNode::interfaces(smallvec![T::interface(Shape::Set)]),
        T::Collection(kind) => collection_node(kind),
    }
}

fn collection_node(kind: &CollectionType) -> TypeNode {
    match kind {
        CollectionType::Interface(shape) => match shape.parent() {
            Some(parent) => TypeNode::interfaces(smallvec![TypeKey::interface(parent)]),
            None => TypeNode::default(),
        },
        CollectionType::Concrete(ConcreteCollection::LinkedHashSet) => TypeNode::new(
            Some(TypeKey::concrete(ConcreteCollection::HashSet)),
            [TypeKey::interface(Shape::Set)],
        ),
        CollectionType::Concrete(concrete) => {
            TypeNode::interfaces(smallvec![TypeKey::interface(concrete.shape())])
        }
        CollectionType::Wrapped(_, shape) => {
            TypeNode::interfaces(smallvec![TypeKey::interface(*shape)])
        }
    }
}
