//! Temporal targets
//!
//! Dates, date-times, times and instants convert between each other, from
//! ISO-8601 text and from epoch milliseconds. Values without an offset are
//! placed in the context zone. Durations use ISO-8601 text and milliseconds.

use super::numeric::Numeric;
use crate::ConvertCall;
use crate::error::{ConvertError, ConvertResult, RegistryResult};
use crate::registry::RegistryBuilder;
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Timelike,
    Utc,
};
use octofhir_convert_types::{TypeKey, Value};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const TEMPORAL_TARGETS: [TypeKey; 5] = [
    TypeKey::Date,
    TypeKey::LocalDateTime,
    TypeKey::DateTime,
    TypeKey::Time,
    TypeKey::Instant,
];

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

// === Formatting ===

/// ISO-8601 text of a temporal value
fn format_temporal(value: &Value) -> Option<String> {
    let text = match value {
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::LocalDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
        Value::Instant(i) => i.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Value::Duration(d) => d.to_string(),
        Value::ZoneOffset(o) => o.to_string(),
        _ => return None,
    };
    Some(text)
}

fn to_string(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    format_temporal(value)
        .map(Value::String)
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

// === Parsing ===

fn parse_local(text: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn parse_moment(text: &str, zone: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .or_else(|| parse_local(text).and_then(|local| local.and_local_timezone(zone).single()))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

/// Parse an ISO-8601 duration such as `PT1.5S`, `P2DT3H` or `-PT10M`
fn parse_duration(text: &str) -> Option<TimeDelta> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let rest = rest.strip_prefix(['P', 'p'])?;
    let (date_part, time_part) = match rest.split_once(['T', 't']) {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return None,
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return None;
    }

    let mut nanos = Decimal::ZERO;
    for (amount, unit) in duration_components(date_part)? {
        let scale = match unit {
            'W' => 604_800_000_000_000_i64,
            'D' => 86_400_000_000_000_i64,
            _ => return None,
        };
        nanos = nanos.checked_add(amount.checked_mul(Decimal::from(scale))?)?;
    }
    for (amount, unit) in duration_components(time_part.unwrap_or_default())? {
        let scale = match unit {
            'H' => 3_600_000_000_000_i64,
            'M' => 60_000_000_000_i64,
            'S' => 1_000_000_000_i64,
            _ => return None,
        };
        nanos = nanos.checked_add(amount.checked_mul(Decimal::from(scale))?)?;
    }

    let nanos = nanos.trunc().to_i64()?;
    let delta = TimeDelta::nanoseconds(nanos);
    Some(if negative { -delta } else { delta })
}

fn duration_components(text: &str) -> Option<Vec<(Decimal, char)>> {
    let mut components = Vec::new();
    let mut number = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() || c == '.' || c == ',' || c == '-' {
            number.push(if c == ',' { '.' } else { c });
        } else {
            let amount = number.parse::<Decimal>().ok()?;
            components.push((amount, c.to_ascii_uppercase()));
            number.clear();
        }
    }
    number.is_empty().then_some(components)
}

/// Parse `Z`, `UTC` or a signed offset (`+01`, `+0130`, `+01:30`, `-05:00:00`)
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let text = text.trim();
    if matches!(text, "Z" | "z" | "UTC" | "GMT") {
        return FixedOffset::east_opt(0);
    }
    let (sign, digits) = match text.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let field = |range: std::ops::Range<usize>| -> Option<i32> {
        digits.get(range).map_or(Some(0), |s| s.parse().ok())
    };
    let (hours, minutes, seconds) = match digits.len() {
        2 | 4 | 6 => (field(0..2)?, field(2..4)?, field(4..6)?),
        _ => return None,
    };
    if minutes >= 60 || seconds >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60 + seconds))
}

// === Conversions ===

fn invalid_text(text: &str, target: &TypeKey) -> ConvertError {
    ConvertError::invalid_format(target, text, "expected ISO-8601 text")
}

fn text_to_temporal(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))?;
    let trimmed = text.trim();
    let target = call.target();
    let zone = call.context().zone();
    let parsed = match target {
        TypeKey::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_moment(trimmed, zone).map(|m| m.date_naive()))
            .map(Value::Date),
        TypeKey::LocalDateTime => parse_local(trimmed)
            .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|m| m.naive_local()))
            .map(Value::LocalDateTime),
        TypeKey::DateTime => parse_moment(trimmed, zone).map(Value::DateTime),
        TypeKey::Instant => parse_moment(trimmed, zone).map(|m| Value::Instant(m.with_timezone(&Utc))),
        TypeKey::Time => parse_time(trimmed).map(Value::Time),
        TypeKey::Duration => parse_duration(trimmed).map(Value::Duration),
        TypeKey::ZoneOffset => parse_offset(trimmed).map(Value::ZoneOffset),
        other => return Err(ConvertError::unsupported(&value.type_key(), other)),
    };
    parsed.ok_or_else(|| invalid_text(text, target))
}

/// Wall-clock time of `moment`, or overflow when it leaves the representable range
fn local_time(moment: &DateTime<FixedOffset>, target: &TypeKey) -> ConvertResult<NaiveDateTime> {
    let utc = moment.naive_utc();
    utc.checked_add_offset(*moment.offset())
        .ok_or_else(|| ConvertError::range_overflow(utc.and_utc().to_rfc3339(), target))
}

fn temporal_to_temporal(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let target = call.target();
    let zone = call.context().zone();
    let unsupported = || ConvertError::unsupported(&value.type_key(), target);

    let local = match value {
        Value::Date(d) => d.and_time(NaiveTime::MIN),
        Value::LocalDateTime(dt) => *dt,
        Value::DateTime(dt) => local_time(dt, target)?,
        Value::Instant(i) => local_time(&i.with_timezone(&zone), target)?,
        _ => return Err(unsupported()),
    };
    let moment = match value {
        Value::DateTime(dt) => *dt,
        Value::Instant(i) => i.with_timezone(&zone),
        _ => local
            .and_local_timezone(zone)
            .single()
            .ok_or_else(unsupported)?,
    };

    match target {
        TypeKey::Date => Ok(Value::Date(local.date())),
        TypeKey::LocalDateTime => Ok(Value::LocalDateTime(local)),
        TypeKey::DateTime => Ok(Value::DateTime(moment)),
        TypeKey::Instant => Ok(Value::Instant(moment.with_timezone(&Utc))),
        TypeKey::Time if !matches!(value, Value::Date(_)) => Ok(Value::Time(local.time())),
        _ => Err(unsupported()),
    }
}

fn epoch_millis(value: &Value, target: &TypeKey) -> ConvertResult<i64> {
    let numeric =
        Numeric::of(value).ok_or_else(|| ConvertError::unsupported(&value.type_key(), target))?;
    let millis = numeric.truncated(target)?;
    i64::try_from(millis).map_err(|_| ConvertError::range_overflow(millis, target))
}

fn millis_to_temporal(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let target = call.target();
    let millis = epoch_millis(value, target)?;
    if *target == TypeKey::Duration {
        return TimeDelta::try_milliseconds(millis)
            .map(Value::Duration)
            .ok_or_else(|| ConvertError::range_overflow(millis, target));
    }
    let instant = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| ConvertError::range_overflow(millis, target))?;
    temporal_to_temporal(&Value::Instant(instant), call)
}

fn temporal_to_millis(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    let zone = call.context().zone();
    let millis = match value {
        Value::Date(d) => d
            .and_time(NaiveTime::MIN)
            .and_local_timezone(zone)
            .single()
            .map(|m| m.timestamp_millis()),
        Value::LocalDateTime(dt) => dt
            .and_local_timezone(zone)
            .single()
            .map(|m| m.timestamp_millis()),
        Value::DateTime(dt) => Some(dt.timestamp_millis()),
        Value::Instant(i) => Some(i.timestamp_millis()),
        Value::Time(t) => Some(
            i64::from(t.num_seconds_from_midnight()) * 1000 + i64::from(t.nanosecond() / 1_000_000),
        ),
        Value::Duration(d) => Some(d.num_milliseconds()),
        _ => None,
    };
    millis
        .map(Value::Long)
        .ok_or_else(|| ConvertError::unsupported(&value.type_key(), call.target()))
}

fn offset_of(value: &Value, call: &ConvertCall<'_>) -> ConvertResult<Value> {
    match value {
        Value::DateTime(dt) => Ok(Value::ZoneOffset(*dt.offset())),
        other => Err(ConvertError::unsupported(&other.type_key(), call.target())),
    }
}

pub(super) fn register(builder: &mut RegistryBuilder) -> RegistryResult<()> {
    for target in TEMPORAL_TARGETS {
        builder
            .register(TypeKey::Temporal, target.clone(), temporal_to_temporal)?
            .register(TypeKey::CharSequence, target.clone(), text_to_temporal)?;
        if target != TypeKey::Time {
            builder.register(TypeKey::Number, target, millis_to_temporal)?;
        }
    }
    builder
        .register(TypeKey::CharSequence, TypeKey::Duration, text_to_temporal)?
        .register(TypeKey::Number, TypeKey::Duration, millis_to_temporal)?
        .register(TypeKey::DateTime, TypeKey::ZoneOffset, offset_of)?
        .register(TypeKey::CharSequence, TypeKey::ZoneOffset, text_to_temporal)?
        .register(TypeKey::Temporal, TypeKey::Long, temporal_to_millis)?
        .register(TypeKey::Duration, TypeKey::Long, temporal_to_millis)?
        .register(TypeKey::Temporal, TypeKey::String, to_string)?
        .register(TypeKey::Duration, TypeKey::String, to_string)?
        .register(TypeKey::ZoneOffset, TypeKey::String, to_string)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PT1.5S", TimeDelta::milliseconds(1500))]
    #[case("P1D", TimeDelta::days(1))]
    #[case("-PT10M", TimeDelta::minutes(-10))]
    #[case("P1DT2H", TimeDelta::hours(26))]
    #[case("PT0S", TimeDelta::zero())]
    fn test_parse_duration(#[case] text: &str, #[case] expected: TimeDelta) {
        assert_eq!(parse_duration(text), Some(expected));
    }

    #[rstest]
    #[case("1.5S")]
    #[case("P")]
    #[case("PT")]
    #[case("P1H")]
    #[case("PT5")]
    fn test_parse_duration_rejects(#[case] text: &str) {
        assert_eq!(parse_duration(text), None);
    }

    #[rstest]
    #[case("P79228162514264337593543950335W")]
    #[case("PT9999999999999999999999999H")]
    fn test_parse_duration_overflow_is_none(#[case] text: &str) {
        assert_eq!(parse_duration(text), None);
    }

    #[test]
    fn test_local_time_out_of_range() {
        let zone = FixedOffset::east_opt(3600).unwrap();
        let moment = DateTime::<Utc>::MAX_UTC.with_timezone(&zone);
        assert!(matches!(
            local_time(&moment, &TypeKey::LocalDateTime),
            Err(ConvertError::RangeOverflow { .. })
        ));
        let moment = DateTime::<Utc>::MIN_UTC.with_timezone(&zone);
        assert!(local_time(&moment, &TypeKey::LocalDateTime).is_ok());
    }

    #[test]
    fn test_duration_text_round_trips() {
        let delta = TimeDelta::milliseconds(90_250);
        assert_eq!(parse_duration(&delta.to_string()), Some(delta));
    }

    #[rstest]
    #[case("Z", 0)]
    #[case("+01:00", 3600)]
    #[case("-0530", -19_800)]
    #[case("+02", 7200)]
    fn test_parse_offset(#[case] text: &str, #[case] seconds: i32) {
        assert_eq!(
            parse_offset(text).map(|o| o.local_minus_utc()),
            Some(seconds)
        );
    }

    #[test]
    fn test_parse_offset_rejects_garbage() {
        assert_eq!(parse_offset("01:00"), None);
        assert_eq!(parse_offset("+1:00"), None);
        assert_eq!(parse_offset("+01:75"), None);
    }

    #[test]
    fn test_parse_local_accepts_date_only() {
        assert_eq!(
            parse_local("2024-02-29").map(|dt| dt.to_string()),
            Some("2024-02-29 00:00:00".to_string())
        );
    }
}
