//! Conversions into collections

use super::characteristics::{Selection, select_collection_type};
use super::{convert_element, elements};
use crate::ConvertCall;
use crate::error::ConvertResult;
use octofhir_convert_types::{CollectionType, CollectionValue, TypeKey, Value};

/// Build a new collection from any container, in source order
///
/// Checked results convert each element to the checked element type first;
/// otherwise elements are copied as they are. Sets drop duplicates as usual.
pub(super) fn to_collection(
    value: &Value,
    kind: &CollectionType,
    call: &ConvertCall<'_>,
) -> ConvertResult<Value> {
    let target = TypeKey::Collection(kind.clone());
    let source_kind = value.as_collection().map(CollectionValue::kind);
    let selection = select_collection_type(kind, source_kind);
    log::trace!("Collection {} selected as {:?}", target, selection);

    let converted = match selection.element_type() {
        Some(element_type) => elements(value, &target)?
            .map(|element| convert_element(element, element_type, call))
            .collect::<ConvertResult<Vec<Value>>>()?,
        None => elements(value, &target)?.map(|e| e.into_owned()).collect(),
    };

    let collection = match selection {
        Selection::Requested(kind) | Selection::CarriedOver(kind) => {
            CollectionValue::from_elements(kind, converted)?
        }
        Selection::Default(shape) => {
            let interface = CollectionType::Interface(shape);
            match call.converter().registry().factory(&interface) {
                Some(factory) => {
                    let mut collection = factory(converted.len());
                    for element in converted {
                        collection.insert(element)?;
                    }
                    collection
                }
                None => CollectionValue::from_elements(interface, converted)?,
            }
        }
    };
    Ok(Value::Collection(collection))
}
