//! Choosing the runtime type of an output collection
//!
//! Precedence:
//! 1. A wrapped or concrete target is used as requested
//! 2. For interface targets, a characteristic of the source collection
//!    (wrapper, case-insensitivity, concurrency) carries over when it fits the
//!    target shape
//! 3. Otherwise the target shape's default, or a registered factory

use octofhir_convert_types::{CollectionType, ConcreteCollection, Shape, TypeKey, Wrapper};

/// Chosen output collection type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The target type itself
    Requested(CollectionType),
    /// A characteristic carried over from the source
    CarriedOver(CollectionType),
    /// The default for an interface shape
    Default(Shape),
}

impl Selection {
    /// Element type enforced by a checked result
    pub fn element_type(&self) -> Option<&TypeKey> {
        match self {
            Self::Requested(kind) | Self::CarriedOver(kind) => match kind.wrapper() {
                Some(Wrapper::Checked(element)) => Some(element.as_ref()),
                _ => None,
            },
            Self::Default(_) => None,
        }
    }
}

/// Select the output type for converting a `source` collection (if the
/// source is one) into `target`
pub fn select_collection_type(
    target: &CollectionType,
    source: Option<&CollectionType>,
) -> Selection {
    let shape = match target {
        CollectionType::Interface(shape) => *shape,
        requested => return Selection::Requested(requested.clone()),
    };

    match source {
        Some(CollectionType::Wrapped(wrapper, _)) => {
            Selection::CarriedOver(CollectionType::Wrapped(wrapper.clone(), shape))
        }
        Some(CollectionType::Concrete(ConcreteCollection::CaseInsensitiveSet))
            if matches!(shape, Shape::Set | Shape::Collection) =>
        {
            Selection::CarriedOver(CollectionType::Concrete(
                ConcreteCollection::CaseInsensitiveSet,
            ))
        }
        Some(CollectionType::Concrete(concrete)) if concrete.is_concurrent() => {
            let carried = match shape {
                Shape::List => Some(ConcreteCollection::ConcurrentList),
                Shape::Set => Some(ConcreteCollection::ConcurrentSet),
                Shape::Collection => Some(*concrete),
                Shape::SortedSet => None,
            };
            carried.map_or(Selection::Default(shape), |c| {
                Selection::CarriedOver(CollectionType::Concrete(c))
            })
        }
        _ => Selection::Default(shape),
    }
}
