//! Enum constants and enum sets

use crate::{CollectionError, CollectionResult, EnumType, TypeKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A constant of an enum type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    enum_type: EnumType,
    ordinal: u32,
}

impl EnumValue {
    /// Constant at `ordinal`, if the enum declares one
    pub fn from_ordinal(enum_type: &EnumType, ordinal: u32) -> Option<Self> {
        ((ordinal as usize) < enum_type.len()).then(|| Self {
            enum_type: enum_type.clone(),
            ordinal,
        })
    }

    /// Constant with exactly this name
    pub fn from_name(enum_type: &EnumType, name: &str) -> Option<Self> {
        enum_type.ordinal_of(name).map(|ordinal| Self {
            enum_type: enum_type.clone(),
            ordinal,
        })
    }

    pub fn enum_type(&self) -> &EnumType {
        &self.enum_type
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn name(&self) -> &str {
        self.enum_type
            .constant_name(self.ordinal)
            .unwrap_or_default()
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_type.name(), self.name())
    }
}

/// Set of constants of one enum type, iterated in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumSetValue {
    enum_type: EnumType,
    members: BTreeSet<u32>,
}

impl EnumSetValue {
    /// Empty set for `enum_type`
    pub fn none_of(enum_type: &EnumType) -> Self {
        Self {
            enum_type: enum_type.clone(),
            members: BTreeSet::new(),
        }
    }

    /// Set holding every constant of `enum_type`
    pub fn all_of(enum_type: &EnumType) -> Self {
        let count = u32::try_from(enum_type.len()).unwrap_or(u32::MAX);
        Self {
            enum_type: enum_type.clone(),
            members: (0..count).collect(),
        }
    }

    /// Build a set from constants, all of which must belong to `enum_type`
    pub fn of<'a>(
        enum_type: &EnumType,
        values: impl IntoIterator<Item = &'a EnumValue>,
    ) -> CollectionResult<Self> {
        let mut set = Self::none_of(enum_type);
        for value in values {
            set.insert(value)?;
        }
        Ok(set)
    }

    pub fn enum_type(&self) -> &EnumType {
        &self.enum_type
    }

    /// Add a constant; returns whether it was newly inserted
    pub fn insert(&mut self, value: &EnumValue) -> CollectionResult<bool> {
        if value.enum_type() != &self.enum_type {
            return Err(CollectionError::ElementType {
                expected: self.enum_type.name().to_string(),
                found: value.enum_type().name().to_string(),
            });
        }
        Ok(self.members.insert(value.ordinal()))
    }

    /// Remove a constant; returns whether it was present
    pub fn remove(&mut self, value: &EnumValue) -> bool {
        value.enum_type() == &self.enum_type && self.members.remove(&value.ordinal())
    }

    pub fn contains(&self, value: &EnumValue) -> bool {
        value.enum_type() == &self.enum_type && self.members.contains(&value.ordinal())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Constants in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = EnumValue> + '_ {
        self.members.iter().map(|&ordinal| EnumValue {
            enum_type: self.enum_type.clone(),
            ordinal,
        })
    }

    /// Type key of this set
    pub fn type_key(&self) -> TypeKey {
        TypeKey::EnumSet(self.enum_type.clone())
    }
}

impl fmt::Display for EnumSetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .members
            .iter()
            .filter_map(|&ordinal| self.enum_type.constant_name(ordinal))
            .collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> EnumType {
        EnumType::new("Color", ["RED", "GREEN", "BLUE"])
    }

    #[test]
    fn test_enum_value_lookup() {
        let color = color();
        let blue = EnumValue::from_ordinal(&color, 2).unwrap();
        assert_eq!(blue.name(), "BLUE");
        assert_eq!(EnumValue::from_name(&color, "GREEN").unwrap().ordinal(), 1);
        assert!(EnumValue::from_ordinal(&color, 3).is_none());
    }

    #[test]
    fn test_enum_set_rejects_foreign_constants() {
        let color = color();
        let size = EnumType::new("Size", ["SMALL"]);
        let mut set = EnumSetValue::none_of(&color);
        let small = EnumValue::from_ordinal(&size, 0).unwrap();
        assert!(matches!(
            set.insert(&small),
            Err(CollectionError::ElementType { .. })
        ));
    }

    #[test]
    fn test_enum_set_iterates_in_ordinal_order() {
        let color = color();
        let mut set = EnumSetValue::none_of(&color);
        for name in ["BLUE", "RED"] {
            set.insert(&EnumValue::from_name(&color, name).unwrap()).unwrap();
        }
        let names: Vec<String> = set.iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["RED", "BLUE"]);
        assert_eq!(set.to_string(), "{RED, BLUE}");
        assert_eq!(EnumSetValue::all_of(&color).len(), 3);
    }
}
