//! Runtime values
//!
//! This module defines the `Value` enum handled by the conversion engine and
//! the array and object types it carries. Values have total equality, hashing
//! and ordering (floats compare by bit pattern / `total_cmp`) so they can live
//! in hash and sorted sets.

use crate::{CollectionValue, EnumSetValue, EnumValue, TypeKey};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A runtime value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Absent value
    Null,

    // === Scalars ===
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(i128),
    BigDecimal(Decimal),
    String(String),
    /// Mutable text; copied rather than shared on same-type conversion
    StringBuilder(String),

    // === Temporal ===
    Date(NaiveDate),
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    Time(NaiveTime),
    Instant(DateTime<Utc>),
    Duration(#[serde(with = "duration_serde")] TimeDelta),
    #[serde(with = "offset_serde")]
    ZoneOffset(FixedOffset),
    Locale(String),

    /// Reference to a type
    TypeRef(TypeKey),

    // === Enums ===
    Enum(EnumValue),
    EnumSet(EnumSetValue),

    // === Containers ===
    Array(ArrayValue),
    Collection(CollectionValue),

    /// Instance of a caller-declared type
    Object(ObjectValue),
}

impl Value {
    // === Constructors ===

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Array of `component` holding `elements`
    pub fn array(component: TypeKey, elements: impl IntoIterator<Item = Value>) -> Self {
        Self::Array(ArrayValue::new(component, elements))
    }

    /// Growable list holding `elements`
    pub fn list(elements: impl IntoIterator<Item = Value>) -> Self {
        Self::Collection(CollectionValue::list(elements))
    }

    /// Object of a named type
    pub fn object(type_name: impl Into<String>, fields: IndexMap<String, Value>) -> Self {
        Self::Object(ObjectValue::new(type_name, fields))
    }

    // === Properties ===

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Runtime type of this value
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::Null => TypeKey::Null,
            Self::Boolean(_) => TypeKey::Boolean,
            Self::Char(_) => TypeKey::Char,
            Self::Byte(_) => TypeKey::Byte,
            Self::Short(_) => TypeKey::Short,
            Self::Integer(_) => TypeKey::Integer,
            Self::Long(_) => TypeKey::Long,
            Self::Float(_) => TypeKey::Float,
            Self::Double(_) => TypeKey::Double,
            Self::BigInteger(_) => TypeKey::BigInteger,
            Self::BigDecimal(_) => TypeKey::BigDecimal,
            Self::String(_) => TypeKey::String,
            Self::StringBuilder(_) => TypeKey::StringBuilder,
            Self::Date(_) => TypeKey::Date,
            Self::LocalDateTime(_) => TypeKey::LocalDateTime,
            Self::DateTime(_) => TypeKey::DateTime,
            Self::Time(_) => TypeKey::Time,
            Self::Instant(_) => TypeKey::Instant,
            Self::Duration(_) => TypeKey::Duration,
            Self::ZoneOffset(_) => TypeKey::ZoneOffset,
            Self::Locale(_) => TypeKey::Locale,
            Self::TypeRef(_) => TypeKey::TypeRef,
            Self::Enum(value) => TypeKey::Enum(value.enum_type().clone()),
            Self::EnumSet(set) => set.type_key(),
            Self::Array(array) => TypeKey::array(array.component.clone()),
            Self::Collection(collection) => collection.type_key(),
            Self::Object(object) => TypeKey::named(object.type_name.clone()),
        }
    }

    /// Check if this value can change after creation. Mutable values are
    /// copied, never shared, when converted to a type they already have.
    pub fn is_mutable(&self) -> bool {
        match self {
            Self::StringBuilder(_) | Self::Array(_) | Self::EnumSet(_) | Self::Object(_) => true,
            Self::Collection(collection) => !collection.is_read_only(),
            _ => false,
        }
    }

    /// Check if this value has a container shape
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Collection(_) | Self::EnumSet(_))
    }

    // === Accessors ===

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text of `String` and `StringBuilder` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::StringBuilder(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut CollectionValue> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Self::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_enum_set(&self) -> Option<&EnumSetValue> {
        match self {
            Self::EnumSet(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Position of the variant in the cross-type ordering
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::Char(_) => 2,
            Self::Byte(_) => 3,
            Self::Short(_) => 4,
            Self::Integer(_) => 5,
            Self::Long(_) => 6,
            Self::Float(_) => 7,
            Self::Double(_) => 8,
            Self::BigInteger(_) => 9,
            Self::BigDecimal(_) => 10,
            Self::String(_) => 11,
            Self::StringBuilder(_) => 12,
            Self::Date(_) => 13,
            Self::LocalDateTime(_) => 14,
            Self::DateTime(_) => 15,
            Self::Time(_) => 16,
            Self::Instant(_) => 17,
            Self::Duration(_) => 18,
            Self::ZoneOffset(_) => 19,
            Self::Locale(_) => 20,
            Self::TypeRef(_) => 21,
            Self::Enum(_) => 22,
            Self::EnumSet(_) => 23,
            Self::Array(_) => 24,
            Self::Collection(_) => 25,
            Self::Object(_) => 26,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::BigInteger(a), Self::BigInteger(b)) => a == b,
            // Scale is significant: 1.0 and 1.00 are distinct values
            (Self::BigDecimal(a), Self::BigDecimal(b)) => {
                a == b && a.scale() == b.scale()
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::StringBuilder(a), Self::StringBuilder(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::LocalDateTime(a), Self::LocalDateTime(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b && a.offset() == b.offset(),
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Instant(a), Self::Instant(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::ZoneOffset(a), Self::ZoneOffset(b)) => a == b,
            (Self::Locale(a), Self::Locale(b)) => a == b,
            (Self::TypeRef(a), Self::TypeRef(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::EnumSet(a), Self::EnumSet(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Collection(a), Self::Collection(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(b) => b.hash(state),
            Self::Char(c) => c.hash(state),
            Self::Byte(i) => i.hash(state),
            Self::Short(i) => i.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Long(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Double(f) => f.to_bits().hash(state),
            Self::BigInteger(i) => i.hash(state),
            Self::BigDecimal(d) => {
                d.hash(state);
                d.scale().hash(state);
            }
            Self::String(s) | Self::StringBuilder(s) | Self::Locale(s) => s.hash(state),
            Self::Date(d) => d.hash(state),
            Self::LocalDateTime(dt) => dt.hash(state),
            Self::DateTime(dt) => {
                dt.hash(state);
                dt.offset().local_minus_utc().hash(state);
            }
            Self::Time(t) => t.hash(state),
            Self::Instant(i) => i.hash(state),
            Self::Duration(d) => d.hash(state),
            Self::ZoneOffset(o) => o.local_minus_utc().hash(state),
            Self::TypeRef(key) => key.hash(state),
            Self::Enum(value) => value.hash(state),
            Self::EnumSet(set) => set.hash(state),
            Self::Array(array) => array.hash(state),
            Self::Collection(collection) => collection.hash(state),
            Self::Object(object) => object.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Char(a), Self::Char(b)) => a.cmp(b),
            (Self::Byte(a), Self::Byte(b)) => a.cmp(b),
            (Self::Short(a), Self::Short(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::BigInteger(a), Self::BigInteger(b)) => a.cmp(b),
            (Self::BigDecimal(a), Self::BigDecimal(b)) => {
                a.cmp(b).then_with(|| a.scale().cmp(&b.scale()))
            }
            (Self::String(a), Self::String(b))
            | (Self::StringBuilder(a), Self::StringBuilder(b))
            | (Self::Locale(a), Self::Locale(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::LocalDateTime(a), Self::LocalDateTime(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b).then_with(|| {
                a.offset()
                    .local_minus_utc()
                    .cmp(&b.offset().local_minus_utc())
            }),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Instant(a), Self::Instant(b)) => a.cmp(b),
            (Self::Duration(a), Self::Duration(b)) => a.cmp(b),
            (Self::ZoneOffset(a), Self::ZoneOffset(b)) => {
                a.local_minus_utc().cmp(&b.local_minus_utc())
            }
            (Self::TypeRef(a), Self::TypeRef(b)) => {
                if a == b {
                    Ordering::Equal
                } else {
                    a.name().cmp(&b.name())
                }
            }
            (Self::Enum(a), Self::Enum(b)) => a
                .enum_type()
                .name()
                .cmp(b.enum_type().name())
                .then_with(|| a.ordinal().cmp(&b.ordinal())),
            (Self::EnumSet(a), Self::EnumSet(b)) => a
                .enum_type()
                .name()
                .cmp(b.enum_type().name())
                .then_with(|| {
                    let a: Vec<u32> = a.iter().map(|v| v.ordinal()).collect();
                    let b: Vec<u32> = b.iter().map(|v| v.ordinal()).collect();
                    a.cmp(&b)
                }),
            (Self::Array(a), Self::Array(b)) => a.cmp(b),
            (Self::Collection(a), Self::Collection(b)) => a.cmp(b),
            (Self::Object(a), Self::Object(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Char(c) => write!(f, "'{}'", c),
            Self::Byte(i) => write!(f, "{}", i),
            Self::Short(i) => write!(f, "{}", i),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Long(i) => write!(f, "{}L", i),
            Self::Float(x) => write!(f, "{:?}f", x),
            Self::Double(x) => write!(f, "{:?}", x),
            Self::BigInteger(i) => write!(f, "{}n", i),
            Self::BigDecimal(d) => write!(f, "{}m", d),
            Self::String(s) | Self::StringBuilder(s) => write!(f, "\"{}\"", s),
            Self::Date(d) => write!(f, "{}", d),
            Self::LocalDateTime(dt) => write!(f, "{}", dt),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Time(t) => write!(f, "{}", t),
            Self::Instant(i) => write!(f, "{}", i.to_rfc3339()),
            Self::Duration(d) => write!(f, "{}", d),
            Self::ZoneOffset(o) => write!(f, "{}", o),
            Self::Locale(l) => write!(f, "{}", l),
            Self::TypeRef(key) => write!(f, "{}", key),
            Self::Enum(value) => write!(f, "{}", value),
            Self::EnumSet(set) => write!(f, "{}", set),
            Self::Array(array) => write!(f, "{}", array),
            Self::Collection(collection) => write!(f, "{}", collection),
            Self::Object(object) => write!(f, "{}", object),
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Numbers become `Integer`, `Long`, `BigInteger` or `Double` by the
    /// narrowest fit; arrays become lists; objects become `Object` values.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).map_or(Self::Long(i), Self::Integer)
                } else if let Some(u) = n.as_u64() {
                    Self::BigInteger(i128::from(u))
                } else {
                    Self::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::list(items.into_iter().map(Self::from)),
            serde_json::Value::Object(map) => Self::object(
                ObjectValue::JSON_TYPE_NAME,
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

/// Fixed-size array with a declared component type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayValue {
    component: TypeKey,
    elements: Vec<Value>,
}

impl ArrayValue {
    pub fn new(component: TypeKey, elements: impl IntoIterator<Item = Value>) -> Self {
        Self {
            component,
            elements: elements.into_iter().collect(),
        }
    }

    pub fn component(&self) -> &TypeKey {
        &self.component
    }

    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    /// Replace the element at `index`, returning the previous one
    pub fn set(&mut self, index: usize, value: Value) -> Option<Value> {
        self.elements
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }
}

impl PartialOrd for ArrayValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArrayValue {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.component == other.component {
            self.elements.cmp(&other.elements)
        } else {
            self.component.name().cmp(&other.component.name())
        }
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(ToString::to_string).collect();
        write!(f, "{}[{}]", self.component, elements.join(", "))
    }
}

/// Instance of a named type with ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectValue {
    pub type_name: String,
    pub fields: IndexMap<String, Value>,
}

impl ObjectValue {
    /// Type name given to objects read from JSON documents
    pub const JSON_TYPE_NAME: &'static str = "Object";

    pub fn new(type_name: impl Into<String>, fields: IndexMap<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    fn sorted_fields(&self) -> Vec<(&String, &Value)> {
        let mut fields: Vec<(&String, &Value)> = self.fields.iter().collect();
        fields.sort();
        fields
    }
}

impl Hash for ObjectValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
        self.fields.len().hash(state);
    }
}

impl PartialOrd for ObjectValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
            .cmp(&other.type_name)
            .then_with(|| self.sorted_fields().cmp(&other.sorted_fields()))
    }
}

impl fmt::Display for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();
        write!(f, "{} {{ {} }}", self.type_name, fields.join(", "))
    }
}

mod duration_serde {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(
        duration: &TimeDelta,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        (duration.num_seconds(), duration.subsec_nanos()).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<TimeDelta, D::Error> {
        let (seconds, nanos) = <(i64, i32)>::deserialize(deserializer)?;
        TimeDelta::try_seconds(seconds)
            .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(i64::from(nanos))))
            .ok_or_else(|| D::Error::custom("duration out of range"))
    }
}

mod offset_serde {
    use chrono::FixedOffset;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(
        offset: &FixedOffset,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        offset.local_minus_utc().serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<FixedOffset, D::Error> {
        let seconds = i32::deserialize(deserializer)?;
        FixedOffset::east_opt(seconds).ok_or_else(|| D::Error::custom("offset out of range"))
    }
}
