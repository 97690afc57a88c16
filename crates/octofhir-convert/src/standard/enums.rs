//! Enum targets and enum sources
//!
//! Enum targets are registered once under the `AnyEnum` family; the leaves
//! read the concrete enum from the requested target.

use super::numeric::{Numeric, integral_value};
use crate::ConvertCall;
use crate::error::{ConvertError, ConvertResult, RegistryResult};
use crate::registry::RegistryBuilder;
use crate::structural::constant_by_name;
use octofhir_convert_types::{EnumType, EnumValue, TypeKey, Value};

const ORDINAL_TARGETS: [TypeKey; 5] = [
    TypeKey::Byte,
    TypeKey::Short,
    TypeKey::Integer,
    TypeKey::Long,
    TypeKey::BigInteger,
];

fn target_enum<'a>(value: &Value, call: &ConvertCall<'a>) -> ConvertResult<&'a EnumType> {
    match call.target() {
        TypeKey::Enum(enum_type) => Ok(enum_type),
        other => Err(ConvertError::unsupported(&value.type_key(), other)),
    }
}

fn source_enum<'v>(value: &'v Value, call: &ConvertCall<'_>) -> ConvertResult<&'v EnumValue> {
    value
        .as_enum()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

fn name_to_enum(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let enum_type = target_enum(value, call)?;
    let name = value
        .as_str()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    constant_by_name(name, enum_type, call.context().max_enum_name_length()).map(Value::Enum)
}

fn ordinal_to_enum(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let enum_type = target_enum(value, call)?;
    let ordinal = match Numeric::of(value) {
        Some(Numeric::Integral(i)) => i,
        _ => return Err(ConvertError::ambiguous(value, call.target())),
    };
    u32::try_from(ordinal)
        .ok()
        .and_then(|ordinal| EnumValue::from_ordinal(enum_type, ordinal))
        .map(Value::Enum)
        .ok_or_else(|| ConvertError::range_overflow(ordinal, call.target()))
}

/// Constant of another enum with the same name
fn enum_to_enum(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let enum_type = target_enum(value, call)?;
    let constant = source_enum(value, call)?;
    constant_by_name(
        constant.name(),
        enum_type,
        call.context().max_enum_name_length(),
    )
    .map(Value::Enum)
}

fn enum_to_name(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    source_enum(value, call).map(|constant| Value::string(constant.name()))
}

fn enum_to_ordinal(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let constant = source_enum(value, call)?;
    integral_value(i128::from(constant.ordinal()), call.target())
}

fn enum_to_type(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    source_enum(value, call)
        .map(|constant| Value::TypeRef(TypeKey::Enum(constant.enum_type().clone())))
}

pub(super) fn register(builder: &mut RegistryBuilder) -> RegistryResult<()> {
    builder
        .register(TypeKey::AnyEnum, TypeKey::AnyEnum, enum_to_enum)?
        .register(TypeKey::CharSequence, TypeKey::AnyEnum, name_to_enum)?
        .register(TypeKey::Number, TypeKey::AnyEnum, ordinal_to_enum)?
        .register(TypeKey::AnyEnum, TypeKey::String, enum_to_name)?
        .register(TypeKey::AnyEnum, TypeKey::TypeRef, enum_to_type)?;
    for target in ORDINAL_TARGETS {
        builder.register(TypeKey::AnyEnum, target, enum_to_ordinal)?;
    }
    Ok(())
}
