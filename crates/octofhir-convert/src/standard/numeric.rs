//! Numeric targets
//!
//! Every numeric type converts from any `Number`, from text, from `Boolean`
//! (1/0) and from `Char` (code point). Narrowing is range checked; floating
//! and decimal sources are truncated toward zero for integral targets.

use crate::ConvertCall;
use crate::error::{ConvertError, ConvertResult, RegistryResult};
use crate::registry::RegistryBuilder;
use octofhir_convert_types::{TypeKey, Value};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::num::IntErrorKind;

pub(super) const NUMERIC_TARGETS: [TypeKey; 8] = [
    TypeKey::Byte,
    TypeKey::Short,
    TypeKey::Integer,
    TypeKey::Long,
    TypeKey::Float,
    TypeKey::Double,
    TypeKey::BigInteger,
    TypeKey::BigDecimal,
];

// 2^127, the first magnitude outside i128
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Numeric view of a value
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Numeric {
    Integral(i128),
    Floating(f64),
    Decimal(Decimal),
}

impl Numeric {
    pub(super) fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(i) => Some(Self::Integral(i128::from(*i))),
            Value::Short(i) => Some(Self::Integral(i128::from(*i))),
            Value::Integer(i) => Some(Self::Integral(i128::from(*i))),
            Value::Long(i) => Some(Self::Integral(i128::from(*i))),
            Value::BigInteger(i) => Some(Self::Integral(*i)),
            Value::Float(f) => Some(Self::Floating(f64::from(*f))),
            Value::Double(f) => Some(Self::Floating(*f)),
            Value::BigDecimal(d) => Some(Self::Decimal(*d)),
            _ => None,
        }
    }

    pub(super) fn is_zero(&self) -> bool {
        match self {
            Self::Integral(i) => *i == 0,
            Self::Floating(f) => *f == 0.0,
            Self::Decimal(d) => d.is_zero(),
        }
    }

    /// Integral part, truncated toward zero
    pub(super) fn truncated(&self, target: &TypeKey) -> ConvertResult<i128> {
        match *self {
            Self::Integral(i) => Ok(i),
            Self::Floating(f) if f.is_nan() => Err(ConvertError::invalid_format(
                target,
                "NaN",
                "not a number",
            )),
            Self::Floating(f) => {
                let t = f.trunc();
                if t >= -I128_BOUND && t < I128_BOUND {
                    Ok(t as i128)
                } else {
                    Err(ConvertError::range_overflow(f, target))
                }
            }
            Self::Decimal(d) => d
                .trunc()
                .to_i128()
                .ok_or_else(|| ConvertError::range_overflow(d, target)),
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Self::Integral(i) => i as f64,
            Self::Floating(f) => f,
            Self::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Convert to the numeric `target`, checking its range
    fn to_value(self, target: &TypeKey) -> ConvertResult<Value> {
        match target {
            TypeKey::Float => {
                let f = self.to_f64();
                if f.is_finite() && f.abs() > f64::from(f32::MAX) {
                    return Err(ConvertError::range_overflow(f, target));
                }
                Ok(Value::Float(f as f32))
            }
            TypeKey::Double => Ok(Value::Double(self.to_f64())),
            TypeKey::BigDecimal => {
                let decimal = match self {
                    Self::Integral(i) => Decimal::from_i128(i),
                    Self::Floating(f) => Decimal::from_f64(f),
                    Self::Decimal(d) => Some(d),
                };
                decimal
                    .map(Value::BigDecimal)
                    .ok_or_else(|| ConvertError::range_overflow(self.to_f64(), target))
            }
            integral => integral_value(self.truncated(integral)?, integral),
        }
    }
}

/// Build an integral value of `target`, checking its range
pub(super) fn integral_value(i: i128, target: &TypeKey) -> ConvertResult<Value> {
    let value = match target {
        TypeKey::Byte => i8::try_from(i).ok().map(Value::Byte),
        TypeKey::Short => i16::try_from(i).ok().map(Value::Short),
        TypeKey::Integer => i32::try_from(i).ok().map(Value::Integer),
        TypeKey::Long => i64::try_from(i).ok().map(Value::Long),
        TypeKey::BigInteger => Some(Value::BigInteger(i)),
        other => return Err(ConvertError::unsupported(&TypeKey::BigInteger, other)),
    };
    value.ok_or_else(|| ConvertError::range_overflow(i, target))
}

/// Parse trimmed text as a number suitable for `target`
fn parse_numeric(text: &str, target: &TypeKey) -> ConvertResult<Numeric> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::invalid_format(target, text, "empty text"));
    }

    if target.is_integral() {
        return match trimmed.parse::<i128>() {
            Ok(i) => Ok(Numeric::Integral(i)),
            Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                Err(ConvertError::range_overflow(trimmed, target))
            }
            Err(_) => match trimmed.parse::<Decimal>() {
                Ok(d) if d.fract().is_zero() => Ok(Numeric::Decimal(d)),
                _ => Err(ConvertError::invalid_format(target, text, "not an integer")),
            },
        };
    }

    if *target == TypeKey::BigDecimal {
        return trimmed
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Numeric::Decimal)
            .map_err(|err| ConvertError::invalid_format(target, text, err.to_string()));
    }

    trimmed
        .parse::<f64>()
        .map(Numeric::Floating)
        .map_err(|err| ConvertError::invalid_format(target, text, err.to_string()))
}

fn from_number(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let numeric = Numeric::of(value)
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    numeric.to_value(call.target())
}

fn from_text(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    parse_numeric(text, call.target())?.to_value(call.target())
}

fn from_boolean(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let flag = value
        .as_boolean()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    Numeric::Integral(i128::from(flag)).to_value(call.target())
}

fn from_char(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    match value {
        Value::Char(c) => Numeric::Integral(i128::from(u32::from(*c))).to_value(call.target()),
        other => Err(ConvertError::unsupported(&other.type_key(), call.target())),
    }
}

pub(super) fn register(builder: &mut RegistryBuilder) -> RegistryResult<()> {
    for target in NUMERIC_TARGETS {
        builder
            .register(TypeKey::Boolean, target.clone(), from_boolean)?
            .register(TypeKey::Char, target.clone(), from_char)?
            .register(TypeKey::CharSequence, target.clone(), from_text)?
            .register(TypeKey::Number, target, from_number)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Numeric::Integral(127), TypeKey::Byte, Value::Byte(127))]
    #[case(Numeric::Floating(-3.9), TypeKey::Integer, Value::Integer(-3))]
    #[case(Numeric::Decimal(Decimal::new(1999, 2)), TypeKey::Long, Value::Long(19))]
    #[case(Numeric::Integral(5), TypeKey::BigDecimal, Value::BigDecimal(Decimal::from(5)))]
    #[case(Numeric::Integral(2), TypeKey::Double, Value::Double(2.0))]
    fn test_to_value(#[case] numeric: Numeric, #[case] target: TypeKey, #[case] expected: Value) {
        assert_eq!(numeric.to_value(&target).unwrap(), expected);
    }

    #[rstest]
    #[case(Numeric::Integral(128), TypeKey::Byte)]
    #[case(Numeric::Integral(-32_769), TypeKey::Short)]
    #[case(Numeric::Floating(1e40), TypeKey::BigInteger)]
    #[case(Numeric::Floating(1e39), TypeKey::Float)]
    fn test_range_overflow(#[case] numeric: Numeric, #[case] target: TypeKey) {
        assert!(matches!(
            numeric.to_value(&target),
            Err(ConvertError::RangeOverflow { .. })
        ));
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(
            parse_numeric(" 42 ", &TypeKey::Integer).unwrap(),
            Numeric::Integral(42)
        );
        assert_eq!(
            parse_numeric("7.00", &TypeKey::Long).unwrap(),
            Numeric::Decimal(Decimal::new(700, 2))
        );
        assert!(matches!(
            parse_numeric("7.5", &TypeKey::Long),
            Err(ConvertError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_numeric("9".repeat(50).as_str(), &TypeKey::BigInteger),
            Err(ConvertError::RangeOverflow { .. })
        ));
        assert!(matches!(
            parse_numeric("  ", &TypeKey::Double),
            Err(ConvertError::InvalidFormat { .. })
        ));
        assert_eq!(
            parse_numeric("1.5e3", &TypeKey::BigDecimal).unwrap(),
            Numeric::Decimal(Decimal::new(1500, 0))
        );
    }
}
