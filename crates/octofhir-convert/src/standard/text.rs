//! Text, boolean and character targets
//!
//! Also covers byte and character arrays (through the context charset),
//! locales and type references looked up by name.

use super::numeric::Numeric;
use crate::ConvertCall;
use crate::error::{ConvertError, ConvertResult, RegistryResult};
use crate::registry::RegistryBuilder;
use octofhir_convert_types::{TypeKey, Value};

/// Canonical text of a scalar value
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Boolean(b) => b.to_string(),
        Value::Char(c) => c.to_string(),
        Value::Byte(i) => i.to_string(),
        Value::Short(i) => i.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Long(i) => i.to_string(),
        Value::BigInteger(i) => i.to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::Double(f) => format!("{:?}", f),
        Value::BigDecimal(d) => d.to_string(),
        Value::String(s) | Value::StringBuilder(s) | Value::Locale(s) => s.clone(),
        Value::TypeRef(key) => key.name(),
        _ => return None,
    };
    Some(text)
}

fn to_string(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    scalar_text(value)
        .map(Value::String)
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

fn to_string_builder(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    value
        .as_str()
        .map(|s| Value::StringBuilder(s.to_string()))
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

fn text_of<'v>(value: &'v Value, call: &ConvertCall<'_>) -> ConvertResult<&'v str> {
    value
        .as_str()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

// === Byte and character arrays ===

fn bytes_to_string(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let array = value
        .as_array()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    let bytes = array
        .iter()
        .map(|element| match element {
            Value::Byte(b) => Ok(b.to_ne_bytes()[0]),
            other => Err(ConvertError::ambiguous(other, &TypeKey::Byte)),
        })
        .collect::<ConvertResult<Vec<u8>>>()?;
    call.context().charset().decode(&bytes).map(Value::String)
}

fn chars_to_string(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let array = value
        .as_array()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    array
        .iter()
        .map(|element| match element {
            Value::Char(c) => Ok(*c),
            other => Err(ConvertError::ambiguous(other, &TypeKey::Char)),
        })
        .collect::<ConvertResult<String>>()
        .map(Value::String)
}

fn string_to_bytes(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let bytes = call.context().charset().encode(text_of(value, call)?)?;
    Ok(Value::array(
        TypeKey::Byte,
        bytes.into_iter().map(|b| Value::Byte(i8::from_ne_bytes([b]))),
    ))
}

fn string_to_chars(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = text_of(value, call)?;
    Ok(Value::array(TypeKey::Char, text.chars().map(Value::Char)))
}

// === Boolean ===

fn text_to_boolean(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = text_of(value, call)?;
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(Value::Boolean(true)),
        "false" | "no" | "n" | "0" => Ok(Value::Boolean(false)),
        _ => Err(ConvertError::invalid_format(
            &TypeKey::Boolean,
            text,
            "expected true/false, yes/no, y/n or 1/0",
        )),
    }
}

fn number_to_boolean(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    Numeric::of(value)
        .map(|n| Value::Boolean(!n.is_zero()))
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

fn char_to_boolean(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    match value {
        Value::Char('t' | 'T' | 'y' | 'Y' | '1') => Ok(Value::Boolean(true)),
        Value::Char('f' | 'F' | 'n' | 'N' | '0') => Ok(Value::Boolean(false)),
        Value::Char(c) => Err(ConvertError::invalid_format(
            &TypeKey::Boolean,
            c.to_string(),
            "expected t/f, y/n or 1/0",
        )),
        other => Err(ConvertError::unsupported(&other.type_key(), call.target())),
    }
}

// === Char ===

fn text_to_char(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = text_of(value, call)?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err(ConvertError::invalid_format(
            &TypeKey::Char,
            text,
            "expected exactly one character",
        )),
    }
}

fn number_to_char(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let numeric = Numeric::of(value)
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    let code = numeric.truncated(&TypeKey::Char)?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Char)
        .ok_or_else(|| ConvertError::range_overflow(code, &TypeKey::Char))
}

fn boolean_to_char(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    value
        .as_boolean()
        .map(|b| Value::Char(if b { 't' } else { 'f' }))
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

// === Locale and type references ===

fn text_to_locale(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = text_of(value, call)?;
    let tag = text.trim().replace('_', "-");
    let well_formed = !tag.is_empty()
        && tag.split('-').all(|subtag| {
            (1..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
        });
    if !well_formed {
        return Err(ConvertError::invalid_format(
            &TypeKey::Locale,
            text,
            "expected a BCP-47 language tag",
        ));
    }
    Ok(Value::Locale(tag))
}

fn text_to_type(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = text_of(value, call)?;
    call.context()
        .lookup_type(text.trim())
        .map(Value::TypeRef)
        .ok_or_else(|| ConvertError::invalid_format(&TypeKey::TypeRef, text, "unknown type"))
}

pub(super) fn register(builder: &mut RegistryBuilder) -> RegistryResult<()> {
    builder
        .register(TypeKey::Boolean, TypeKey::String, to_string)?
        .register(TypeKey::Char, TypeKey::String, to_string)?
        .register(TypeKey::Number, TypeKey::String, to_string)?
        .register(TypeKey::StringBuilder, TypeKey::String, to_string)?
        .register(TypeKey::Locale, TypeKey::String, to_string)?
        .register(TypeKey::TypeRef, TypeKey::String, to_string)?
        .register(TypeKey::array(TypeKey::Byte), TypeKey::String, bytes_to_string)?
        .register(TypeKey::array(TypeKey::Char), TypeKey::String, chars_to_string)?
        .register(TypeKey::CharSequence, TypeKey::StringBuilder, to_string_builder)?
        .register(TypeKey::CharSequence, TypeKey::array(TypeKey::Byte), string_to_bytes)?
        .register(TypeKey::CharSequence, TypeKey::array(TypeKey::Char), string_to_chars)?
        .register(TypeKey::Char, TypeKey::Boolean, char_to_boolean)?
        .register(TypeKey::CharSequence, TypeKey::Boolean, text_to_boolean)?
        .register(TypeKey::Number, TypeKey::Boolean, number_to_boolean)?
        .register(TypeKey::Boolean, TypeKey::Char, boolean_to_char)?
        .register(TypeKey::CharSequence, TypeKey::Char, text_to_char)?
        .register(TypeKey::Number, TypeKey::Char, number_to_char)?
        .register(TypeKey::CharSequence, TypeKey::Locale, text_to_locale)?
        .register(TypeKey::CharSequence, TypeKey::TypeRef, text_to_type)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Value::Double(1.0)).as_deref(), Some("1.0"));
        assert_eq!(scalar_text(&Value::Long(-7)).as_deref(), Some("-7"));
        assert_eq!(
            scalar_text(&Value::TypeRef(TypeKey::array(TypeKey::Integer))).as_deref(),
            Some("Integer[]")
        );
        assert_eq!(scalar_text(&Value::Null), None);
    }
}
