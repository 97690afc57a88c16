//! Type keys
//!
//! This module defines the identifiers the conversion engine uses for types:
//! - `TypeKey` naming every scalar, container and caller-declared type
//! - `CollectionType` describing collection interfaces, concrete shapes and
//!   characteristic wrappers
//! - `EnumType`, a shared enum definition compared by name
//!
//! Keys are plain values: two keys are equal iff they name the same type, which
//! makes them usable as map keys in the registry and the resolution cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of a runtime type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKey {
    // === Roots ===
    /// Supertype of every non-null type
    Any,
    /// The type of the null value
    Null,

    // === Abstract types and capabilities ===
    /// Supertype of all numeric types
    Number,
    /// Supertype of all enum types
    AnyEnum,
    /// Capability: values have a natural order
    Comparable,
    /// Capability: readable character sequence
    CharSequence,
    /// Capability: point or span on the time line
    Temporal,

    // === Scalars ===
    Boolean,
    Char,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// 128-bit signed integer
    BigInteger,
    /// Arbitrary precision decimal
    BigDecimal,
    /// Immutable text
    String,
    /// Mutable text buffer
    StringBuilder,

    // === Temporal ===
    /// Calendar date without zone
    Date,
    /// Date and time without zone
    LocalDateTime,
    /// Date and time with a fixed offset
    DateTime,
    /// Time of day
    Time,
    /// Point on the UTC time line
    Instant,
    /// Signed span of time
    Duration,
    /// Fixed offset from UTC
    ZoneOffset,
    /// BCP-47 language tag
    Locale,

    /// A value naming a type
    TypeRef,

    // === Enums ===
    /// A concrete enum type
    Enum(EnumType),

    // === Containers ===
    /// Fixed-size array with a component type
    Array(Box<TypeKey>),
    /// Growable collection
    Collection(CollectionType),
    /// Set restricted to the constants of one enum
    EnumSet(EnumType),

    /// Caller-declared object type
    Named(String),
}

impl TypeKey {
    // === Constructors ===

    /// Create an array type
    pub fn array(component: TypeKey) -> Self {
        Self::Array(Box::new(component))
    }

    /// Create a named object type
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Collection interface type
    pub fn interface(shape: Shape) -> Self {
        Self::Collection(CollectionType::Interface(shape))
    }

    /// Concrete collection type
    pub fn concrete(concrete: ConcreteCollection) -> Self {
        Self::Collection(CollectionType::Concrete(concrete))
    }

    /// Collection with a wrapper characteristic
    pub fn wrapped(wrapper: Wrapper, shape: Shape) -> Self {
        Self::Collection(CollectionType::Wrapped(wrapper, shape))
    }

    /// The `List` interface
    pub fn list() -> Self {
        Self::interface(Shape::List)
    }

    /// The `Set` interface
    pub fn set() -> Self {
        Self::interface(Shape::Set)
    }

    /// Enum type
    pub fn enumeration(ty: EnumType) -> Self {
        Self::Enum(ty)
    }

    /// Enum set type
    pub fn enum_set(ty: EnumType) -> Self {
        Self::EnumSet(ty)
    }

    // === Properties ===

    /// Check if this is an integral numeric type
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Short | Self::Integer | Self::Long | Self::BigInteger
        )
    }

    /// Check if this is a numeric type (abstract `Number` included)
    pub fn is_numeric(&self) -> bool {
        self.is_integral()
            || matches!(
                self,
                Self::Float | Self::Double | Self::BigDecimal | Self::Number
            )
    }

    /// Check if this is a temporal type
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::LocalDateTime | Self::DateTime | Self::Time | Self::Instant
        )
    }

    /// Check if this type is a structural container
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Collection(_) | Self::EnumSet(_))
    }

    /// Component type of an array type
    pub fn component_type(&self) -> Option<&TypeKey> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    /// The registry family this type falls back to when it has no entries of
    /// its own. Concrete enums share the `AnyEnum` family.
    pub fn family(&self) -> Option<TypeKey> {
        match self {
            Self::Enum(_) => Some(Self::AnyEnum),
            _ => None,
        }
    }

    /// Get the display name of this type
    pub fn name(&self) -> String {
        match self {
            Self::Any => "Any".to_string(),
            Self::Null => "Null".to_string(),
            Self::Number => "Number".to_string(),
            Self::AnyEnum => "Enum".to_string(),
            Self::Comparable => "Comparable".to_string(),
            Self::CharSequence => "CharSequence".to_string(),
            Self::Temporal => "Temporal".to_string(),
            Self::Boolean => "Boolean".to_string(),
            Self::Char => "Char".to_string(),
            Self::Byte => "Byte".to_string(),
            Self::Short => "Short".to_string(),
            Self::Integer => "Integer".to_string(),
            Self::Long => "Long".to_string(),
            Self::Float => "Float".to_string(),
            Self::Double => "Double".to_string(),
            Self::BigInteger => "BigInteger".to_string(),
            Self::BigDecimal => "BigDecimal".to_string(),
            Self::String => "String".to_string(),
            Self::StringBuilder => "StringBuilder".to_string(),
            Self::Date => "Date".to_string(),
            Self::LocalDateTime => "LocalDateTime".to_string(),
            Self::DateTime => "DateTime".to_string(),
            Self::Time => "Time".to_string(),
            Self::Instant => "Instant".to_string(),
            Self::Duration => "Duration".to_string(),
            Self::ZoneOffset => "ZoneOffset".to_string(),
            Self::Locale => "Locale".to_string(),
            Self::TypeRef => "Type".to_string(),
            Self::Enum(ty) => ty.name().to_string(),
            Self::Array(component) => format!("{}[]", component.name()),
            Self::Collection(kind) => kind.to_string(),
            Self::EnumSet(ty) => format!("EnumSet<{}>", ty.name()),
            Self::Named(name) => name.clone(),
        }
    }

    /// Resolve a built-in type by name
    ///
    /// Accepts the names produced by [`TypeKey::name`] for scalars and
    /// collection types, and a trailing `[]` for arrays. Enum, enum set and
    /// named types are not built in and return `None`.
    pub fn from_name(name: &str) -> Option<TypeKey> {
        let name = name.trim();
        if let Some(component) = name.strip_suffix("[]") {
            return Self::from_name(component).map(Self::array);
        }

        let key = match name {
            "Any" | "Object" => Self::Any,
            "Number" => Self::Number,
            "Enum" => Self::AnyEnum,
            "Comparable" => Self::Comparable,
            "CharSequence" => Self::CharSequence,
            "Temporal" => Self::Temporal,
            "Boolean" | "boolean" => Self::Boolean,
            "Char" | "char" | "Character" => Self::Char,
            "Byte" | "byte" => Self::Byte,
            "Short" | "short" => Self::Short,
            "Integer" | "int" => Self::Integer,
            "Long" | "long" => Self::Long,
            "Float" | "float" => Self::Float,
            "Double" | "double" => Self::Double,
            "BigInteger" => Self::BigInteger,
            "BigDecimal" => Self::BigDecimal,
            "String" => Self::String,
            "StringBuilder" => Self::StringBuilder,
            "Date" => Self::Date,
            "LocalDateTime" => Self::LocalDateTime,
            "DateTime" => Self::DateTime,
            "Time" => Self::Time,
            "Instant" => Self::Instant,
            "Duration" => Self::Duration,
            "ZoneOffset" => Self::ZoneOffset,
            "Locale" => Self::Locale,
            "Type" => Self::TypeRef,
            other => return CollectionType::from_name(other).map(Self::Collection),
        };
        Some(key)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for TypeKey {
    fn default() -> Self {
        Self::Any
    }
}

/// Collection interface shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Any collection
    Collection,
    /// Ordered sequence allowing duplicates
    List,
    /// Unique elements
    Set,
    /// Unique elements in natural order
    SortedSet,
}

impl Shape {
    /// Check if a collection of shape `other` is usable where `self` is expected
    pub fn accepts(&self, other: Shape) -> bool {
        match self {
            Self::Collection => true,
            Self::List => other == Self::List,
            Self::Set => matches!(other, Self::Set | Self::SortedSet),
            Self::SortedSet => other == Self::SortedSet,
        }
    }

    /// The interface this shape directly extends
    pub fn parent(&self) -> Option<Shape> {
        match self {
            Self::Collection => None,
            Self::List | Self::Set => Some(Self::Collection),
            Self::SortedSet => Some(Self::Set),
        }
    }

    /// Concrete collection used when nothing more specific is requested
    pub fn default_concrete(&self) -> ConcreteCollection {
        match self {
            Self::Collection | Self::List => ConcreteCollection::ArrayList,
            Self::Set => ConcreteCollection::LinkedHashSet,
            Self::SortedSet => ConcreteCollection::TreeSet,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Collection => "Collection",
            Self::List => "List",
            Self::Set => "Set",
            Self::SortedSet => "SortedSet",
        }
    }
}

/// Concrete collection implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcreteCollection {
    /// Growable sequence
    ArrayList,
    /// Hash set without a defined order
    HashSet,
    /// Hash set keeping insertion order
    LinkedHashSet,
    /// Sorted set
    TreeSet,
    /// Set comparing text elements ignoring case
    CaseInsensitiveSet,
    /// Sequence intended for shared use across threads
    ConcurrentList,
    /// Set intended for shared use across threads
    ConcurrentSet,
}

impl ConcreteCollection {
    /// The interface shape this implementation provides
    pub fn shape(&self) -> Shape {
        match self {
            Self::ArrayList | Self::ConcurrentList => Shape::List,
            Self::HashSet | Self::LinkedHashSet | Self::CaseInsensitiveSet | Self::ConcurrentSet => {
                Shape::Set
            }
            Self::TreeSet => Shape::SortedSet,
        }
    }

    /// Check if this implementation is safe for concurrent use
    pub fn is_concurrent(&self) -> bool {
        matches!(self, Self::ConcurrentList | Self::ConcurrentSet)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ArrayList => "ArrayList",
            Self::HashSet => "HashSet",
            Self::LinkedHashSet => "LinkedHashSet",
            Self::TreeSet => "TreeSet",
            Self::CaseInsensitiveSet => "CaseInsensitiveSet",
            Self::ConcurrentList => "ConcurrentList",
            Self::ConcurrentSet => "ConcurrentSet",
        }
    }
}

/// Wrapper characteristics layered over a collection shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wrapper {
    /// Rejects every mutation
    Unmodifiable,
    /// Serializes access to the underlying collection
    Synchronized,
    /// Rejects elements that are not instances of the element type
    Checked(Box<TypeKey>),
    /// Always empty, rejects every mutation
    Empty,
}

impl Wrapper {
    /// Check if collections with this characteristic reject mutation
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Unmodifiable | Self::Empty)
    }
}

/// Collection types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionType {
    /// An interface; never the runtime type of a value
    Interface(Shape),
    /// A concrete implementation
    Concrete(ConcreteCollection),
    /// A characteristic wrapper over a shape
    Wrapped(Wrapper, Shape),
}

impl CollectionType {
    /// Interface shape of this collection type
    pub fn shape(&self) -> Shape {
        match self {
            Self::Interface(shape) | Self::Wrapped(_, shape) => *shape,
            Self::Concrete(concrete) => concrete.shape(),
        }
    }

    /// Wrapper characteristic, if any
    pub fn wrapper(&self) -> Option<&Wrapper> {
        match self {
            Self::Wrapped(wrapper, _) => Some(wrapper),
            _ => None,
        }
    }

    /// Check if this is an interface type
    pub fn is_interface(&self) -> bool {
        matches!(self, Self::Interface(_))
    }

    /// Check if collections of this type reject mutation
    pub fn is_read_only(&self) -> bool {
        self.wrapper().is_some_and(Wrapper::is_read_only)
    }

    /// The type used to hold values requested as this type. Interfaces map to
    /// their default implementation; everything else is already instantiable.
    pub fn instantiable(&self) -> CollectionType {
        match self {
            Self::Interface(shape) => Self::Concrete(shape.default_concrete()),
            other => other.clone(),
        }
    }

    fn from_name(name: &str) -> Option<CollectionType> {
        let kind = match name {
            "Collection" => Self::Interface(Shape::Collection),
            "List" => Self::Interface(Shape::List),
            "Set" => Self::Interface(Shape::Set),
            "SortedSet" => Self::Interface(Shape::SortedSet),
            "ArrayList" => Self::Concrete(ConcreteCollection::ArrayList),
            "HashSet" => Self::Concrete(ConcreteCollection::HashSet),
            "LinkedHashSet" => Self::Concrete(ConcreteCollection::LinkedHashSet),
            "TreeSet" => Self::Concrete(ConcreteCollection::TreeSet),
            "CaseInsensitiveSet" => Self::Concrete(ConcreteCollection::CaseInsensitiveSet),
            "ConcurrentList" => Self::Concrete(ConcreteCollection::ConcurrentList),
            "ConcurrentSet" => Self::Concrete(ConcreteCollection::ConcurrentSet),
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface(shape) => write!(f, "{}", shape.name()),
            Self::Concrete(concrete) => write!(f, "{}", concrete.name()),
            Self::Wrapped(Wrapper::Unmodifiable, shape) => {
                write!(f, "Unmodifiable<{}>", shape.name())
            }
            Self::Wrapped(Wrapper::Synchronized, shape) => {
                write!(f, "Synchronized<{}>", shape.name())
            }
            Self::Wrapped(Wrapper::Checked(element), shape) => {
                write!(f, "Checked<{}, {}>", shape.name(), element)
            }
            Self::Wrapped(Wrapper::Empty, shape) => write!(f, "Empty<{}>", shape.name()),
        }
    }
}

/// Definition of an enum: its name and constants in ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub constants: Vec<String>,
}

/// Shared handle to an enum definition
///
/// Two handles name the same type when they share the definition or declare
/// the same name and constants. Hashing uses the name alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EnumDef", into = "EnumDef")]
pub struct EnumType(Arc<EnumDef>);

impl EnumType {
    /// Create an enum type from its constants in ordinal order
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Arc::new(EnumDef {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn constants(&self) -> &[String] {
        &self.0.constants
    }

    /// Number of declared constants
    pub fn len(&self) -> usize {
        self.0.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.constants.is_empty()
    }

    /// Ordinal of the constant with exactly this name
    pub fn ordinal_of(&self, name: &str) -> Option<u32> {
        self.0
            .constants
            .iter()
            .position(|constant| constant == name)
            .and_then(|ordinal| u32::try_from(ordinal).ok())
    }

    /// Name of the constant at `ordinal`
    pub fn constant_name(&self, ordinal: u32) -> Option<&str> {
        self.0
            .constants
            .get(ordinal as usize)
            .map(String::as_str)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for EnumType {}

impl std::hash::Hash for EnumType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl From<EnumDef> for EnumType {
    fn from(def: EnumDef) -> Self {
        Self(Arc::new(def))
    }
}

impl From<EnumType> for EnumDef {
    fn from(ty: EnumType) -> Self {
        Arc::unwrap_or_clone(ty.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_key_names() {
        assert_eq!(TypeKey::Integer.name(), "Integer");
        assert_eq!(
            TypeKey::array(TypeKey::array(TypeKey::Short)).name(),
            "Short[][]"
        );
        assert_eq!(TypeKey::list().name(), "List");
        assert_eq!(
            TypeKey::wrapped(Wrapper::Checked(Box::new(TypeKey::Long)), Shape::Set).name(),
            "Checked<Set, Long>"
        );
    }

    #[test]
    fn test_from_name_round_trips_builtin_names() {
        for key in [
            TypeKey::Integer,
            TypeKey::BigDecimal,
            TypeKey::Instant,
            TypeKey::array(TypeKey::Byte),
            TypeKey::concrete(ConcreteCollection::TreeSet),
            TypeKey::interface(Shape::SortedSet),
        ] {
            assert_eq!(TypeKey::from_name(&key.name()), Some(key));
        }
        assert_eq!(TypeKey::from_name("Widget"), None);
    }

    #[test]
    fn test_shape_acceptance() {
        assert!(Shape::Collection.accepts(Shape::SortedSet));
        assert!(Shape::Set.accepts(Shape::SortedSet));
        assert!(!Shape::SortedSet.accepts(Shape::Set));
        assert!(!Shape::List.accepts(Shape::Set));
    }

    #[test]
    fn test_enum_type_identity_is_by_definition() {
        let a = EnumType::new("Color", ["RED", "GREEN"]);
        let b = EnumType::new("Color", ["RED", "GREEN"]);
        let wider = EnumType::new("Color", ["RED", "GREEN", "PURPLE"]);
        assert_eq!(TypeKey::Enum(a.clone()), TypeKey::Enum(b));
        assert_ne!(a, wider);
        assert_eq!(a.ordinal_of("GREEN"), Some(1));
        assert_eq!(a.ordinal_of("green"), None);
        assert_eq!(a.constant_name(2), None);
    }

    #[test]
    fn test_family_of_enum_targets() {
        let color = EnumType::new("Color", ["RED"]);
        assert_eq!(TypeKey::Enum(color).family(), Some(TypeKey::AnyEnum));
        assert_eq!(TypeKey::String.family(), None);
    }
}
