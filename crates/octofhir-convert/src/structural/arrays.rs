//! Conversions into arrays

use super::{convert_element, elements};
use crate::ConvertCall;
use crate::error::ConvertResult;
use octofhir_convert_types::{ArrayValue, TypeKey, Value};

/// Build a new array of `component` from any container, in source order
///
/// Enum sets feed their constants, so the component decides the output:
/// names for `String`, ordinals for integral types, the declaring type for
/// `TypeRef`, the constants themselves for the enum's own type.
pub(super) fn to_array(
    value: &Value,
    component: &TypeKey,
    call: &ConvertCall<'_>,
) -> ConvertResult<Value> {
    let target = TypeKey::array(component.clone());
    let converted = elements(value, &target)?
        .map(|element| convert_element(element, component, call))
        .collect::<ConvertResult<Vec<Value>>>()?;
    Ok(Value::Array(ArrayValue::new(component.clone(), converted)))
}
