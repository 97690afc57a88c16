//! Resolution Tests
//!
//! Tests for registry ordering, hierarchy walks, tie-breaking and the
//! resolution cache under concurrent use.

use octofhir_convert::{
    ConversionPair, ConvertError, Converter, Registry, RegistryBuilder, RegistryError, Resolution,
    Resolver, TieBreak, TypeKey, Value,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use std::thread;

// ============================================================================
// Test Helpers
// ============================================================================

fn widget() -> TypeKey {
    TypeKey::named("Widget")
}

fn widget_value() -> Value {
    Value::object("Widget", Default::default())
}

/// Widget implements Sized then Labeled; the registry lists Labeled first
fn widget_registry() -> Arc<Registry> {
    let mut builder = RegistryBuilder::new();
    builder.declare(
        widget(),
        None,
        [TypeKey::named("Sized"), TypeKey::named("Labeled")],
    );
    builder
        .register(TypeKey::named("Labeled"), TypeKey::String, |_, _| {
            Ok(Value::string("labeled"))
        })
        .unwrap()
        .register(TypeKey::named("Sized"), TypeKey::String, |_, _| {
            Ok(Value::string("sized"))
        })
        .unwrap();
    Arc::new(builder.build().unwrap())
}

// ============================================================================
// Registry ordering
// ============================================================================

#[test]
fn test_registering_supertype_first_is_rejected() {
    let mut builder = RegistryBuilder::new();
    builder
        .register(TypeKey::Number, TypeKey::String, |_, _| Ok(Value::Null))
        .unwrap();
    let err = builder
        .register(TypeKey::Long, TypeKey::String, |_, _| Ok(Value::Null))
        .err()
        .unwrap();
    assert!(matches!(err, RegistryError::Misordered { .. }));
}

#[test]
fn test_declared_subtype_ordering_is_checked() {
    let mut builder = RegistryBuilder::new();
    builder.declare(TypeKey::named("Gadget"), Some(widget()), []);
    builder
        .register(widget(), TypeKey::String, |_, _| Ok(Value::Null))
        .unwrap();
    assert!(matches!(
        builder.register(TypeKey::named("Gadget"), TypeKey::String, |_, _| Ok(Value::Null)),
        Err(RegistryError::Misordered { .. })
    ));
}

#[test]
fn test_duplicate_pair_is_rejected() {
    let mut builder = RegistryBuilder::new();
    builder
        .register(TypeKey::Integer, TypeKey::String, |_, _| Ok(Value::Null))
        .unwrap();
    assert!(matches!(
        builder.register(TypeKey::Integer, TypeKey::String, |_, _| Ok(Value::Null)),
        Err(RegistryError::Duplicate { .. })
    ));
}

#[test]
fn test_cyclic_hierarchy_fails_build() {
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
fn test_standard_set_extends_with_user_entries() {
    let mut builder = octofhir_convert::standard::builder().unwrap();
    builder
        .register(widget(), TypeKey::String, |_, _| Ok(Value::string("widget")))
        .unwrap();
    let converter = Converter::with_registry(Arc::new(builder.build().unwrap()));
    assert_eq!(
        converter.convert(&widget_value(), &TypeKey::String).unwrap(),
        Value::string("widget")
    );
    assert_eq!(
        converter.convert(&Value::string("5"), &TypeKey::Long).unwrap(),
        Value::Long(5)
    );
}

// ============================================================================
// Hierarchy walk
// ============================================================================

#[rstest]
#[case(TieBreak::RegistryOrder, "labeled")]
#[case(TieBreak::DeclarationOrder, "sized")]
fn test_tie_break_policies(#[case] tie_break: TieBreak, #[case] expected: &str) {
    let converter = Converter::with_registry(widget_registry()).tie_break(tie_break);
    assert_eq!(
        converter.convert(&widget_value(), &TypeKey::String).unwrap(),
        Value::string(expected)
    );
}

#[test]
fn test_superclass_beats_interface() {
    let mut builder = RegistryBuilder::new();
    builder
        .declare(TypeKey::named("Base"), None, [])
        .declare(widget(), Some(TypeKey::named("Base")), [TypeKey::named("Sized")]);
    builder
        .register(TypeKey::named("Sized"), TypeKey::String, |_, _| {
            Ok(Value::string("interface"))
        })
        .unwrap()
        .register(TypeKey::named("Base"), TypeKey::String, |_, _| {
            Ok(Value::string("superclass"))
        })
        .unwrap();
    let converter = Converter::with_registry(Arc::new(builder.build().unwrap()));
    assert_eq!(
        converter.convert(&widget_value(), &TypeKey::String).unwrap(),
        Value::string("superclass")
    );
}

#[test]
fn test_exact_target_entry_beats_family_entry() {
    let color = octofhir_convert::EnumType::new("Color", ["RED", "GREEN"]);
    let exact = color.clone();
    let mut builder = RegistryBuilder::new();
    builder
        .register(TypeKey::String, TypeKey::Enum(color.clone()), move |_, _| {
            Ok(Value::Enum(
                octofhir_convert::EnumValue::from_ordinal(&exact, 1).unwrap(),
            ))
        })
        .unwrap()
        .register(TypeKey::String, TypeKey::AnyEnum, |_, _| Ok(Value::Null))
        .unwrap();
    let converter = Converter::with_registry(Arc::new(builder.build().unwrap()));
    let result = converter
        .convert(&Value::string("RED"), &TypeKey::Enum(color))
        .unwrap();
    assert_eq!(result.as_enum().map(|e| e.name()), Some("GREEN"));
}

#[test]
fn test_unsupported_message_names_both_types() {
    let err = Converter::new()
        .convert(&Value::Boolean(true), &TypeKey::Date)
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedConversion { .. }));
    let message = err.to_string();
    assert!(message.contains("Boolean"), "{}", message);
    assert!(message.contains("Date"), "{}", message);
}

#[test]
fn test_scalar_into_container_is_ambiguous() {
    let err = Converter::new()
        .convert(&Value::Integer(1), &TypeKey::list())
        .unwrap_err();
    assert!(matches!(err, ConvertError::AmbiguousSource { .. }));
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_concurrent_resolution_is_deterministic() {
    let resolver = Resolver::new(octofhir_convert::standard::registry(), TieBreak::default());
    let pair = ConversionPair::new(TypeKey::Short, TypeKey::String);

    let resolutions: Vec<Arc<Resolution>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| resolver.resolve(&pair)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = resolver.resolve(&pair);
    assert!(first.is_supported());
    for resolution in &resolutions {
        assert!(Arc::ptr_eq(resolution, &first));
    }
    assert_eq!(resolver.cached_pairs(), 1);
}

#[test]
fn test_converter_is_shareable_across_threads() {
    let converter = Arc::new(Converter::new());
    let results: Vec<Value> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let converter = Arc::clone(&converter);
                scope.spawn(move || {
                    converter
                        .convert(&Value::string(i.to_string()), &TypeKey::Integer)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(
        results,
        vec![
            Value::Integer(0),
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3)
        ]
    );
}

#[test]
fn test_tie_break_change_starts_from_empty_cache() {
    let converter = Converter::with_registry(widget_registry());
    converter.convert(&widget_value(), &TypeKey::String).unwrap();
    assert_eq!(converter.cached_pairs(), 1);
    let converter = converter.tie_break(TieBreak::DeclarationOrder);
    assert_eq!(converter.cached_pairs(), 0);
}

// ============================================================================
// Introspection
// ============================================================================

#[rstest]
#[case(TypeKey::String, TypeKey::Integer, true)]
#[case(TypeKey::Integer, TypeKey::Number, true)]
#[case(TypeKey::array(TypeKey::Integer), TypeKey::array(TypeKey::Short), true)]
#[case(TypeKey::Boolean, TypeKey::Date, false)]
#[case(TypeKey::Integer, TypeKey::list(), false)]
#[case(TypeKey::Long, TypeKey::Time, false)]
fn test_is_conversion_supported(
    #[case] source: TypeKey,
    #[case] target: TypeKey,
    #[case] expected: bool,
) {
    assert_eq!(
        Converter::new().is_conversion_supported(&source, &target),
        expected
    );
}

#[test]
fn test_supported_conversions_lists_families_in_order() {
    let converter = Converter::with_registry(widget_registry());
    let supported = converter.supported_conversions();
    assert_eq!(
        supported.get(&TypeKey::String),
        Some(&vec![TypeKey::named("Labeled"), TypeKey::named("Sized")])
    );
    assert_eq!(supported.len(), 1);
}
