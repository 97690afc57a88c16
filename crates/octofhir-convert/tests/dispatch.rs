//! Dispatcher Tests
//!
//! Tests for the conversion facade: the same-type shortcut, context
//! overrides and contexts loaded from settings.

use chrono::FixedOffset;
use octofhir_convert::{
    Charset, ConversionContext, ConversionContextBuilder, ConversionSettings, Converter,
    RegistryBuilder, TypeCatalog, TypeKey, Value,
};
use pretty_assertions::assert_eq;
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Same-type shortcut
// ============================================================================

#[test]
fn test_immutable_instance_is_returned_as_is() {
    let converter = Converter::new();
    let value = Value::string("hello");
    let result = converter
        .convert_ref(&value, &TypeKey::String, converter.context())
        .unwrap();
    assert!(matches!(result, Cow::Borrowed(v) if std::ptr::eq(v, &value)));
}

#[test]
fn test_instance_of_supertype_is_returned_as_is() {
    let converter = Converter::new();
    let value = Value::Integer(7);
    let result = converter
        .convert_ref(&value, &TypeKey::Number, converter.context())
        .unwrap();
    assert!(matches!(result, Cow::Borrowed(v) if std::ptr::eq(v, &value)));
}

#[test]
fn test_mutable_instance_is_copied() {
    let converter = Converter::new();
    let value = Value::StringBuilder("buffer".to_string());
    let result = converter
        .convert_ref(&value, &TypeKey::CharSequence, converter.context())
        .unwrap();
    assert!(matches!(result, Cow::Owned(_)));
    assert_eq!(result.into_owned(), value);
}

#[test]
fn test_shortcut_skips_registered_function() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut builder = RegistryBuilder::new();
    builder
        .register(TypeKey::Integer, TypeKey::Number, move |value, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value.clone())
        })
        .unwrap();
    let converter = Converter::with_registry(Arc::new(builder.build().unwrap()));

    converter.convert(&Value::Integer(1), &TypeKey::Number).unwrap();
    converter.convert(&Value::Integer(2), &TypeKey::Integer).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(converter.cached_pairs(), 0);
}

#[test]
fn test_shortcut_walks_the_hierarchy_once_per_pair() {
    let converter = Converter::new();
    for value in (0..50).map(Value::Integer) {
        converter.convert(&value, &TypeKey::Comparable).unwrap();
    }
    converter.convert(&Value::Long(1), &TypeKey::Number).unwrap();
    converter.convert(&Value::Integer(1), &TypeKey::Integer).unwrap();
    assert_eq!(converter.resolver().cached_assignability(), 2);
    assert_eq!(converter.cached_pairs(), 0);
}

#[test]
fn test_null_is_never_an_instance() {
    let converter = Converter::new();
    assert_eq!(
        converter.convert(&Value::Null, &TypeKey::Integer).unwrap(),
        Value::Integer(0)
    );
    assert_eq!(
        converter.convert(&Value::Null, &TypeKey::Any).unwrap(),
        Value::Null
    );
}

// ============================================================================
// Overrides
// ============================================================================

fn minus_one_context() -> ConversionContext {
    ConversionContext::builder()
        .override_conversion(TypeKey::String, TypeKey::Integer, |_, _| {
            Ok(Value::Integer(-1))
        })
        .build()
}

#[test]
fn test_override_wins_over_registry() {
    let converter = Converter::new();
    let context = minus_one_context();
    assert!(context.has_overrides());
    assert_eq!(
        converter
            .convert_with(&Value::string("42"), &TypeKey::Integer, &context)
            .unwrap(),
        Value::Integer(-1)
    );
    assert_eq!(
        converter
            .convert(&Value::string("42"), &TypeKey::Integer)
            .unwrap(),
        Value::Integer(42)
    );
}

#[test]
fn test_override_applies_to_nested_elements() {
    let converter = Converter::new();
    let list = Value::list([Value::string("1"), Value::string("2")]);
    assert_eq!(
        converter
            .convert_with(
                &list,
                &TypeKey::array(TypeKey::Integer),
                &minus_one_context()
            )
            .unwrap(),
        Value::array(TypeKey::Integer, [Value::Integer(-1), Value::Integer(-1)])
    );
}

#[test]
fn test_override_wins_over_shortcut() {
    let context = ConversionContext::builder()
        .override_conversion(TypeKey::Integer, TypeKey::Integer, |value, _| match value {
            Value::Integer(i) => Ok(Value::Integer(i * 10)),
            other => Ok(other.clone()),
        })
        .build();
    let converter = Converter::new().with_context(context);
    assert_eq!(
        converter.convert(&Value::Integer(3), &TypeKey::Integer).unwrap(),
        Value::Integer(30)
    );
}

#[test]
fn test_override_only_matches_exact_pair() {
    let converter = Converter::new().with_context(minus_one_context());
    assert_eq!(
        converter
            .convert(&Value::StringBuilder("5".to_string()), &TypeKey::Integer)
            .unwrap(),
        Value::Integer(5)
    );
}

// ============================================================================
// Context configuration
// ============================================================================

#[test]
fn test_context_from_json_settings() {
    let settings = ConversionSettings::from_json(
        r#"{"zoneOffsetSeconds": 7200, "locale": "de-DE", "charset": "ISO-8859-1"}"#,
    )
    .unwrap();
    let context = ConversionContextBuilder::from_settings(&settings)
        .unwrap()
        .build();
    assert_eq!(context.zone(), FixedOffset::east_opt(7200).unwrap());
    assert_eq!(context.locale(), "de-DE");
    assert_eq!(context.charset(), Charset::Latin1);

    let converter = Converter::new().with_context(context);
    assert_eq!(
        converter.convert(&Value::Null, &TypeKey::Locale).unwrap(),
        Value::Locale("de-DE".to_string())
    );
    assert_eq!(
        converter.convert(&Value::string("é"), &TypeKey::array(TypeKey::Byte)).unwrap(),
        Value::array(TypeKey::Byte, [Value::Byte(-23)])
    );
}

#[test]
fn test_unknown_charset_is_rejected() {
    assert!(ConversionSettings::from_json(r#"{"charset": "EBCDIC"}"#).is_err());
}

#[test]
fn test_unknown_settings_field_is_rejected() {
    assert!(ConversionSettings::from_json(r#"{"timeZone": "Europe/Berlin"}"#).is_err());
    assert!(ConversionSettings::from_json(r#"{"locale": "fr-FR"}"#).is_ok());
}

#[test]
fn test_type_lookup_through_catalog() {
    let color = octofhir_convert::EnumType::new("Color", ["RED"]);
    let context = ConversionContext::builder()
        .type_lookup(TypeCatalog::new().with_enum(color.clone()))
        .build();
    let converter = Converter::new();
    assert_eq!(
        converter
            .convert_with(&Value::string("Color"), &TypeKey::TypeRef, &context)
            .unwrap(),
        Value::TypeRef(TypeKey::Enum(color))
    );
    assert!(
        converter
            .convert(&Value::string("Color"), &TypeKey::TypeRef)
            .is_err()
    );
}

#[test]
fn test_default_converter_is_shared() {
    assert!(std::ptr::eq(
        octofhir_convert::default_converter(),
        octofhir_convert::default_converter()
    ));
    assert_eq!(
        octofhir_convert::convert(&Value::string("true"), &TypeKey::Boolean).unwrap(),
        Value::Boolean(true)
    );
}
