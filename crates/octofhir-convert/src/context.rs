//! Conversion context
//!
//! A `ConversionContext` is immutable configuration shared by a top-level
//! conversion and every nested element conversion it triggers. The
//! serializable part lives in [`ConversionSettings`]; the builder adds type
//! lookup and per-pair overrides.

use crate::error::{ConvertError, ConvertResult};
use crate::registry::{ConversionFn, ConversionPair};
use crate::ConvertCall;
use chrono::{FixedOffset, Offset, Utc};
use indexmap::IndexMap;
use octofhir_convert_types::{EnumType, TypeKey, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default upper bound for enum constant names read from input
pub const DEFAULT_MAX_ENUM_NAME_LENGTH: usize = 256;

/// Character set used for byte/text conversions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    #[default]
    #[serde(alias = "UTF-8")]
    Utf8,
    #[serde(alias = "ISO-8859-1", alias = "latin-1")]
    Latin1,
    #[serde(alias = "US-ASCII")]
    Ascii,
}

impl Charset {
    /// Encode text, failing on characters the charset cannot represent
    pub fn encode(&self, text: &str) -> ConvertResult<Vec<u8>> {
        let limit = match self {
            Self::Utf8 => return Ok(text.as_bytes().to_vec()),
            Self::Latin1 => 0xFF,
            Self::Ascii => 0x7F,
        };
        text.chars()
            .map(|c| {
                u8::try_from(u32::from(c))
                    .ok()
                    .filter(|b| u32::from(*b) <= limit)
                    .ok_or_else(|| {
                        ConvertError::invalid_format(
                            &TypeKey::array(TypeKey::Byte),
                            text,
                            format!("'{}' is not representable in {}", c, self),
                        )
                    })
            })
            .collect()
    }

    /// Decode bytes, failing on sequences that are invalid in the charset
    pub fn decode(&self, bytes: &[u8]) -> ConvertResult<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|err| {
                ConvertError::invalid_format(&TypeKey::String, format!("{:?}", bytes), err.to_string())
            }),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => {
                if let Some(b) = bytes.iter().find(|b| !b.is_ascii()) {
                    return Err(ConvertError::invalid_format(
                        &TypeKey::String,
                        format!("{:?}", bytes),
                        format!("byte {:#04x} is not ASCII", b),
                    ));
                }
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Latin1 => write!(f, "ISO-8859-1"),
            Self::Ascii => write!(f, "US-ASCII"),
        }
    }
}

/// Serializable conversion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConversionSettings {
    /// Offset used for zone-bearing conversions, in seconds east of UTC
    pub zone_offset_seconds: i32,
    /// BCP-47 language tag
    pub locale: String,
    pub charset: Charset,
    /// Longest enum constant name accepted from input
    pub max_enum_name_length: usize,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            zone_offset_seconds: 0,
            locale: "en-US".to_string(),
            charset: Charset::Utf8,
            max_enum_name_length: DEFAULT_MAX_ENUM_NAME_LENGTH,
        }
    }
}

impl ConversionSettings {
    /// Load settings from a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Resolves type names to type keys
pub trait TypeLookup: Send + Sync {
    /// Find the type with this name
    fn lookup(&self, name: &str) -> Option<TypeKey>;
}

/// Lookup of built-in type names only
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypeLookup;

impl TypeLookup for BuiltinTypeLookup {
    fn lookup(&self, name: &str) -> Option<TypeKey> {
        TypeKey::from_name(name)
    }
}

/// Lookup of registered enum and named types, falling back to built-in names
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, TypeKey>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type under its display name
    pub fn with_type(mut self, key: TypeKey) -> Self {
        self.types.insert(key.name(), key);
        self
    }

    /// Register an enum type under its name
    pub fn with_enum(self, enum_type: EnumType) -> Self {
        self.with_type(TypeKey::Enum(enum_type))
    }

    /// Register a type under an alias
    pub fn with_alias(mut self, alias: impl Into<String>, key: TypeKey) -> Self {
        self.types.insert(alias.into(), key);
        self
    }
}

impl TypeLookup for TypeCatalog {
    fn lookup(&self, name: &str) -> Option<TypeKey> {
        let name = name.trim();
        if let Some(component) = name.strip_suffix("[]") {
            return self.lookup(component).map(TypeKey::array);
        }
        self.types
            .get(name)
            .cloned()
            .or_else(|| TypeKey::from_name(name))
    }
}

/// Immutable per-call configuration
#[derive(Clone)]
pub struct ConversionContext {
    zone: FixedOffset,
    locale: String,
    charset: Charset,
    max_enum_name_length: usize,
    type_lookup: Arc<dyn TypeLookup>,
    overrides: Arc<IndexMap<ConversionPair, ConversionFn>>,
}

impl Default for ConversionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("zone", &self.zone)
            .field("locale", &self.locale)
            .field("charset", &self.charset)
            .field("max_enum_name_length", &self.max_enum_name_length)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ConversionContext {
    /// Context with default settings, built-in type lookup and no overrides
    pub fn new() -> Self {
        Self {
            zone: Utc.fix(),
            locale: ConversionSettings::default().locale,
            charset: Charset::Utf8,
            max_enum_name_length: DEFAULT_MAX_ENUM_NAME_LENGTH,
            type_lookup: Arc::new(BuiltinTypeLookup),
            overrides: Arc::new(IndexMap::new()),
        }
    }

    pub fn builder() -> ConversionContextBuilder {
        ConversionContextBuilder::new()
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn max_enum_name_length(&self) -> usize {
        self.max_enum_name_length
    }

    /// Find a type by name through the configured lookup
    pub fn lookup_type(&self, name: &str) -> Option<TypeKey> {
        self.type_lookup.lookup(name)
    }

    /// Override registered for exactly this pair
    pub fn override_for(&self, pair: &ConversionPair) -> Option<&ConversionFn> {
        self.overrides.get(pair)
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Serializable part of this context
    pub fn settings(&self) -> ConversionSettings {
        ConversionSettings {
            zone_offset_seconds: self.zone.local_minus_utc(),
            locale: self.locale.clone(),
            charset: self.charset,
            max_enum_name_length: self.max_enum_name_length,
        }
    }
}

/// Builder for `ConversionContext`
pub struct ConversionContextBuilder {
    zone: FixedOffset,
    locale: String,
    charset: Charset,
    max_enum_name_length: usize,
    type_lookup: Arc<dyn TypeLookup>,
    overrides: IndexMap<ConversionPair, ConversionFn>,
}

impl Default for ConversionContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionContextBuilder {
    pub fn new() -> Self {
        let defaults = ConversionContext::new();
        Self {
            zone: defaults.zone,
            locale: defaults.locale,
            charset: defaults.charset,
            max_enum_name_length: defaults.max_enum_name_length,
            type_lookup: defaults.type_lookup,
            overrides: IndexMap::new(),
        }
    }

    /// Start from serialized settings
    pub fn from_settings(settings: &ConversionSettings) -> ConvertResult<Self> {
        let zone = FixedOffset::east_opt(settings.zone_offset_seconds).ok_or_else(|| {
            ConvertError::range_overflow(settings.zone_offset_seconds, &TypeKey::ZoneOffset)
        })?;
        Ok(Self::new()
            .zone(zone)
            .locale(settings.locale.clone())
            .charset(settings.charset)
            .max_enum_name_length(settings.max_enum_name_length))
    }

    pub fn zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn max_enum_name_length(mut self, max: usize) -> Self {
        self.max_enum_name_length = max;
        self
    }

    pub fn type_lookup(mut self, lookup: impl TypeLookup + 'static) -> Self {
        self.type_lookup = Arc::new(lookup);
        self
    }

    /// Use `function` for exactly `source -> target`, ahead of the registry
    /// and of the same-type shortcut
    pub fn override_conversion<F>(mut self, source: TypeKey, target: TypeKey, function: F) -> Self
    where
        F: Fn(&Value, &ConvertCall<'_>) -> ConvertResult<Value> + Send + Sync + 'static,
    {
        self.overrides
            .insert(ConversionPair::new(source, target), Arc::new(function));
        self
    }

    pub fn build(self) -> ConversionContext {
        ConversionContext {
            zone: self.zone,
            locale: self.locale,
            charset: self.charset,
            max_enum_name_length: self.max_enum_name_length,
            type_lookup: self.type_lookup,
            overrides: Arc::new(self.overrides),
        }
    }
}
