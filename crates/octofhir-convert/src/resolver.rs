//! Conversion resolution
//!
//! Resolution turns a `(source, target)` pair into something runnable:
//!
//! 1. The resolution cache, keyed by the requested pair
//! 2. An exact registry entry
//! 3. A walk of the source hierarchy in specificity order, looking up each
//!    member against the target and then against the target's family
//! 4. A structural plan when both sides are containers
//!
//! Whatever the outcome, including "no conversion", it is cached under the
//! requested pair. The cache is a `DashMap`; resolution itself runs without
//! holding any shard lock, so concurrent callers may compute the same
//! resolution twice, but only the first insertion is kept and returned to
//! everyone.
//!
//! Assignability answers for the same-type shortcut are memoized the same
//! way, so a hot path never repeats a hierarchy walk.

use crate::registry::{ConversionFn, ConversionPair, Registry, RegistryEntry};
use crate::structural::StructuralPlan;
use dashmap::DashMap;
use octofhir_convert_types::TypeKey;
use std::fmt;
use std::sync::Arc;

/// How to choose between entries found at the same specificity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// The entry registered first in its family wins
    #[default]
    RegistryOrder,
    /// The supertype declared first in the source hierarchy wins
    DeclarationOrder,
}

/// Outcome of resolving a pair
#[derive(Clone)]
pub enum Resolution {
    /// A registered function
    Direct(ConversionFn),
    /// Element-wise container conversion
    Structural(StructuralPlan),
    /// Container target requested from a non-container source
    Ambiguous,
    /// No conversion exists
    Unsupported,
}

impl Resolution {
    /// Check if this resolution can convert anything
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Direct(_) | Self::Structural(_))
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => write!(f, "Direct(..)"),
            Self::Structural(plan) => f.debug_tuple("Structural").field(plan).finish(),
            Self::Ambiguous => write!(f, "Ambiguous"),
            Self::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// Resolves pairs against a registry and memoizes the results
pub struct Resolver {
    registry: Arc<Registry>,
    cache: DashMap<ConversionPair, Arc<Resolution>>,
    assignable: DashMap<ConversionPair, bool>,
    tie_break: TieBreak,
}

impl Resolver {
    pub fn new(registry: Arc<Registry>, tie_break: TieBreak) -> Self {
        Self {
            registry,
            cache: DashMap::new(),
            assignable: DashMap::new(),
            tie_break,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Number of cached resolutions
    pub fn cached_pairs(&self) -> usize {
        self.cache.len()
    }

    /// Number of memoized assignability answers
    pub fn cached_assignability(&self) -> usize {
        self.assignable.len()
    }

    /// Check if a value of `pair.source` may be used where `pair.target` is
    /// expected, walking the hierarchy at most once per pair
    pub fn is_assignable(&self, pair: &ConversionPair) -> bool {
        match (&pair.source, &pair.target) {
            (source, target) if source == target => return true,
            (TypeKey::Null, _) => return false,
            (_, TypeKey::Any) => return true,
            _ => {}
        }
        if let Some(hit) = self.assignable.get(pair) {
            return *hit.value();
        }
        let assignable = self
            .registry
            .hierarchy()
            .is_assignable(&pair.source, &pair.target);
        self.assignable.insert(pair.clone(), assignable);
        assignable
    }

    /// Resolve a pair, consulting and filling the cache
    pub fn resolve(&self, pair: &ConversionPair) -> Arc<Resolution> {
        if let Some(hit) = self.cache.get(pair) {
            return Arc::clone(hit.value());
        }

        log::trace!("Resolution cache miss for {}", pair);
        let resolution = Arc::new(self.compute(pair));
        let cached = self.cache.entry(pair.clone()).or_insert(resolution);
        Arc::clone(cached.value())
    }

    fn compute(&self, pair: &ConversionPair) -> Resolution {
        if let Some(entry) = self.registry.lookup_exact(pair) {
            return Resolution::Direct(entry.function.clone());
        }

        if let Some(function) = self.walk_hierarchy(pair) {
            return Resolution::Direct(function);
        }

        if pair.target.is_container() {
            if let Some(plan) = StructuralPlan::for_pair(&pair.source, &pair.target) {
                log::trace!("Structural plan {:?} for {}", plan, pair);
                return Resolution::Structural(plan);
            }
            if pair.source != TypeKey::Null {
                return Resolution::Ambiguous;
            }
        }

        Resolution::Unsupported
    }

    /// Search the source hierarchy level by level. Within a level the exact
    /// target is preferred over its family.
    fn walk_hierarchy(&self, pair: &ConversionPair) -> Option<ConversionFn> {
        let targets: Vec<TypeKey> = std::iter::once(pair.target.clone())
            .chain(pair.target.family())
            .collect();
        let hierarchy = self.registry.hierarchy();

        for level in hierarchy.levels(&pair.source) {
            for target in &targets {
                let candidates: Vec<(usize, &TypeKey, &RegistryEntry)> = level
                    .iter()
                    .enumerate()
                    .filter_map(|(position, member)| {
                        self.registry
                            .lookup(member, target)
                            .map(|entry| (position, member, entry))
                    })
                    .collect();

                let chosen = match self.tie_break {
                    TieBreak::RegistryOrder => candidates
                        .into_iter()
                        .min_by_key(|(_, _, entry)| entry.index),
                    TieBreak::DeclarationOrder => candidates
                        .into_iter()
                        .min_by_key(|(position, _, _)| *position),
                };

                if let Some((_, member, entry)) = chosen {
                    log::trace!("Resolved {} through {} -> {}", pair, member, target);
                    return Some(entry.function.clone());
                }
            }
        }
        None
    }
}
