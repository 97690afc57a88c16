//! Conversion facade
//!
//! `Converter` is the entry point: it applies context overrides, returns
//! values that already have the requested type without resolving anything,
//! and otherwise runs whatever the resolver finds for the pair.

use crate::context::ConversionContext;
use crate::error::{ConvertError, ConvertResult};
use crate::registry::{ConversionPair, Registry};
use crate::resolver::{Resolution, Resolver, TieBreak};
use crate::standard;
use indexmap::IndexMap;
use octofhir_convert_types::{TypeKey, Value};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::sync::Arc;

/// Converts values between types using a registry and a resolution cache
pub struct Converter {
    resolver: Resolver,
    context: ConversionContext,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Converter over the standard registry with the default context
    pub fn new() -> Self {
        Self::with_registry(standard::registry())
    }

    /// Converter over a custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            resolver: Resolver::new(registry, TieBreak::default()),
            context: ConversionContext::new(),
        }
    }

    /// Use a different tie-break policy. Starts from an empty cache.
    pub fn tie_break(self, tie_break: TieBreak) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(self.resolver.registry()), tie_break),
            context: self.context,
        }
    }

    /// Use a different default context for [`Converter::convert`]
    pub fn with_context(mut self, context: ConversionContext) -> Self {
        self.context = context;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.resolver.registry()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Default context used by [`Converter::convert`]
    pub fn context(&self) -> &ConversionContext {
        &self.context
    }

    /// Convert with the converter's default context
    pub fn convert(&self, value: &Value, target: &TypeKey) -> ConvertResult<Value> {
        self.convert_with(value, target, &self.context)
    }

    /// Convert with an explicit context
    pub fn convert_with(
        &self,
        value: &Value,
        target: &TypeKey,
        context: &ConversionContext,
    ) -> ConvertResult<Value> {
        self.convert_ref(value, target, context).map(Cow::into_owned)
    }

    /// Convert, borrowing the input when it already is an immutable instance
    /// of the target
    pub fn convert_ref<'v>(
        &self,
        value: &'v Value,
        target: &TypeKey,
        context: &ConversionContext,
    ) -> ConvertResult<Cow<'v, Value>> {
        let pair = ConversionPair::new(value.type_key(), target.clone());
        let call = ConvertCall {
            converter: self,
            context,
            target,
        };

        if let Some(function) = context.override_for(&pair) {
            return function(value, &call).map(Cow::Owned);
        }

        if !value.is_null() && self.resolver.is_assignable(&pair) {
            return Ok(if value.is_mutable() {
                Cow::Owned(value.clone())
            } else {
                Cow::Borrowed(value)
            });
        }

        match &*self.resolver.resolve(&pair) {
            Resolution::Direct(function) => function(value, &call).map(Cow::Owned),
            Resolution::Structural(plan) => plan.execute(value, &call).map(Cow::Owned),
            Resolution::Ambiguous => Err(ConvertError::ambiguous(value, target)),
            Resolution::Unsupported => Err(ConvertError::unsupported(&pair.source, target)),
        }
    }

    /// Check if values of `source` can be converted to `target`
    pub fn is_conversion_supported(&self, source: &TypeKey, target: &TypeKey) -> bool {
        let pair = ConversionPair::new(source.clone(), target.clone());
        self.resolver.is_assignable(&pair) || self.resolver.resolve(&pair).is_supported()
    }

    /// Registered sources per target family, in registration order
    pub fn supported_conversions(&self) -> IndexMap<TypeKey, Vec<TypeKey>> {
        self.registry()
            .families()
            .map(|(target, entries)| {
                let sources = entries.iter().map(|entry| entry.source.clone()).collect();
                (target.clone(), sources)
            })
            .collect()
    }

    /// Number of pairs resolved so far
    pub fn cached_pairs(&self) -> usize {
        self.resolver.cached_pairs()
    }
}

/// A single conversion in progress, handed to conversion functions
pub struct ConvertCall<'a> {
    converter: &'a Converter,
    context: &'a ConversionContext,
    target: &'a TypeKey,
}

impl<'a> ConvertCall<'a> {
    /// The requested target type; for family entries this is the concrete
    /// type (e.g. the exact enum)
    pub fn target(&self) -> &'a TypeKey {
        self.target
    }

    pub fn context(&self) -> &'a ConversionContext {
        self.context
    }

    pub fn converter(&self) -> &'a Converter {
        self.converter
    }

    /// Convert a nested value with the same context
    pub fn convert(&self, value: &Value, target: &TypeKey) -> ConvertResult<Value> {
        self.converter.convert_with(value, target, self.context)
    }
}

static DEFAULT_CONVERTER: Lazy<Converter> = Lazy::new(Converter::new);

/// Convert with the process-wide converter over the standard registry
pub fn convert(value: &Value, target: &TypeKey) -> ConvertResult<Value> {
    DEFAULT_CONVERTER.convert(value, target)
}

/// The process-wide converter used by [`convert`]
pub fn default_converter() -> &'static Converter {
    &DEFAULT_CONVERTER
}
