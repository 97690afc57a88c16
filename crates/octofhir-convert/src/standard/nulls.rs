//! Conversions from `Null`
//!
//! Primitive targets get their zero value; zone and locale targets get the
//! context defaults; everything else stays `Null`.

use super::numeric::NUMERIC_TARGETS;
use crate::ConvertCall;
use crate::error::{ConvertResult, RegistryResult};
use crate::registry::RegistryBuilder;
use octofhir_convert_types::{TypeKey, Value};
use rust_decimal::Decimal;

const NULL_TARGETS: [TypeKey; 12] = [
    TypeKey::Any,
    TypeKey::String,
    TypeKey::StringBuilder,
    TypeKey::Date,
    TypeKey::LocalDateTime,
    TypeKey::DateTime,
    TypeKey::Time,
    TypeKey::Instant,
    TypeKey::Duration,
    TypeKey::TypeRef,
    TypeKey::AnyEnum,
    TypeKey::Number,
];

fn zero(_: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    Ok(match call.target() {
        TypeKey::Byte => Value::Byte(0),
        TypeKey::Short => Value::Short(0),
        TypeKey::Integer => Value::Integer(0),
        TypeKey::Long => Value::Long(0),
        TypeKey::Float => Value::Float(0.0),
        TypeKey::Double => Value::Double(0.0),
        TypeKey::BigInteger => Value::BigInteger(0),
        TypeKey::BigDecimal => Value::BigDecimal(Decimal::ZERO),
        TypeKey::Boolean => Value::Boolean(false),
        TypeKey::Char => Value::Char('\0'),
        _ => Value::Null,
    })
}

fn null(_: &Value, _: &ConvertCall<'_>) -> ConvertResult<Value> {
    Ok(Value::Null)
}

fn context_zone(_: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    Ok(Value::ZoneOffset(call.context().zone()))
}

fn context_locale(_: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    Ok(Value::Locale(call.context().locale().to_string()))
}

pub(super) fn register(builder: &mut RegistryBuilder) -> RegistryResult<()> {
    for target in NUMERIC_TARGETS {
        builder.register(TypeKey::Null, target, zero)?;
    }
    builder
        .register(TypeKey::Null, TypeKey::Boolean, zero)?
        .register(TypeKey::Null, TypeKey::Char, zero)?
        .register(TypeKey::Null, TypeKey::ZoneOffset, context_zone)?
        .register(TypeKey::Null, TypeKey::Locale, context_locale)?;
    for target in NULL_TARGETS {
        builder.register(TypeKey::Null, target, null)?;
    }
    Ok(())
}
