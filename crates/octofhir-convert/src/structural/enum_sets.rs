//! Conversions into enum sets

use super::elements;
use crate::ConvertCall;
use crate::error::{ConvertError, ConvertResult};
use octofhir_convert_types::{EnumSetValue, EnumType, EnumValue, TypeKey, Value};
use std::borrow::Cow;

/// Build an enum set from a container of constants, names and ordinals
pub(super) fn to_enum_set(
    value: &Value,
    enum_type: &EnumType,
    call: &ConvertCall<'_>,
) -> ConvertResult<Value> {
    let target = TypeKey::EnumSet(enum_type.clone());
    let mut set = EnumSetValue::none_of(enum_type);
    for element in elements(value, &target)? {
        let constant = constant_of(element, enum_type, call)?;
        set.insert(&constant)?;
    }
    Ok(Value::EnumSet(set))
}

fn constant_of(
    element: Cow<'_, Value>,
    enum_type: &EnumType,
    call: &ConvertCall<'_>,
) -> ConvertResult<EnumValue> {
    let target = TypeKey::Enum(enum_type.clone());
    match element.as_ref() {
        Value::Enum(constant) if constant.enum_type() == enum_type => Ok(constant.clone()),
        Value::String(name) | Value::StringBuilder(name) => {
            constant_by_name(name, enum_type, call.context().max_enum_name_length())
        }
        Value::Byte(_) | Value::Short(_) | Value::Integer(_) | Value::Long(_) | Value::BigInteger(_) => {
            let ordinal = integral_value(&element).unwrap_or(-1);
            u32::try_from(ordinal)
                .ok()
                .and_then(|ordinal| EnumValue::from_ordinal(enum_type, ordinal))
                .ok_or_else(|| ConvertError::range_overflow(ordinal, &target))
        }
        other => Err(ConvertError::ambiguous(other, &target)),
    }
}

/// Exact, case-sensitive lookup with a bound on the name length
pub(crate) fn constant_by_name(
    name: &str,
    enum_type: &EnumType,
    max_length: usize,
) -> ConvertResult<EnumValue> {
    let target = TypeKey::Enum(enum_type.clone());
    if name.chars().nth(max_length).is_some() {
        let shown: String = name.chars().take(32).collect();
        return Err(ConvertError::invalid_format(
            &target,
            format!("{}...", shown),
            format!("name longer than {} characters", max_length),
        ));
    }
    EnumValue::from_name(enum_type, name).ok_or_else(|| {
        ConvertError::invalid_format(&target, name, format!("no constant named {}", name))
    })
}

fn integral_value(value: &Value) -> Option<i128> {
    match value {
        Value::Byte(i) => Some(i128::from(*i)),
        Value::Short(i) => Some(i128::from(*i)),
        Value::Integer(i) => Some(i128::from(*i)),
        Value::Long(i) => Some(i128::from(*i)),
        Value::BigInteger(i) => Some(*i),
        _ => None,
    }
}
