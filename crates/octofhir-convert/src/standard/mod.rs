//! Standard conversion set
//!
//! The built-in leaf conversions between scalar types. Container conversions
//! are not registered here; the resolver plans them structurally.
//!
//! Modules register in a fixed order so that, within each target family,
//! narrower sources always come before wider ones.

mod enums;
mod nulls;
mod numeric;
mod temporal;
mod text;

use crate::error::RegistryResult;
use crate::registry::{Registry, RegistryBuilder};
use once_cell::sync::Lazy;
use std::sync::Arc;

static STANDARD: Lazy<Arc<Registry>> = Lazy::new(|| {
    let registry = builder()
        .and_then(RegistryBuilder::build)
        .unwrap_or_else(|err| panic!("standard conversion set is inconsistent: {err}"));
    Arc::new(registry)
});

/// Shared registry holding the standard conversion set
pub fn registry() -> Arc<Registry> {
    Arc::clone(&STANDARD)
}

/// Fresh builder pre-loaded with the standard set, for extension
pub fn builder() -> RegistryResult<RegistryBuilder> {
    let mut builder = RegistryBuilder::new();
    register_all(&mut builder)?;
    Ok(builder)
}

/// Register the standard set into `builder`
pub fn register_all(builder: &mut RegistryBuilder) -> RegistryResult<()> {
    enums::register(builder)?;
    numeric::register(builder)?;
    text::register(builder)?;
    temporal::register(builder)?;
    nulls::register(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_convert_types::TypeKey;

    #[test]
    fn test_standard_registry_builds() {
        let registry = registry();
        assert!(!registry.is_empty());
        assert!(registry.lookup(&TypeKey::Number, &TypeKey::Integer).is_some());
        assert!(registry.lookup(&TypeKey::Null, &TypeKey::Any).is_some());
        assert!(registry.lookup(&TypeKey::Any, &TypeKey::String).is_none());
    }

    #[test]
    fn test_registry_is_shared() {
        assert!(Arc::ptr_eq(&registry(), &registry()));
    }
}
