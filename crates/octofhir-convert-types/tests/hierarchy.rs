//! Hierarchy walk and instance tests
//!
//! Covers:
//! - Specificity levels for built-in scalars, enums and collections
//! - Caller-declared types with superclasses and interfaces
//! - Instance checks used by the dispatcher short-circuit

use octofhir_convert_types::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn flat(hierarchy: &TypeHierarchy, key: &TypeKey) -> Vec<TypeKey> {
    hierarchy.ancestors(key)
}

// === Built-in walks ===

#[rstest]
#[case(TypeKey::Long, vec![TypeKey::Long, TypeKey::Number, TypeKey::Comparable, TypeKey::Any])]
#[case(TypeKey::String, vec![TypeKey::String, TypeKey::CharSequence, TypeKey::Comparable, TypeKey::Any])]
#[case(TypeKey::Instant, vec![TypeKey::Instant, TypeKey::Temporal, TypeKey::Comparable, TypeKey::Any])]
#[case(TypeKey::Boolean, vec![TypeKey::Boolean, TypeKey::Comparable, TypeKey::Any])]
#[case(TypeKey::Locale, vec![TypeKey::Locale, TypeKey::Any])]
fn test_builtin_walks(#[case] key: TypeKey, #[case] expected: Vec<TypeKey>) {
    assert_eq!(flat(&TypeHierarchy::new(), &key), expected);
}

#[test]
fn test_enum_walk_goes_through_any_enum() {
    let color = EnumType::new("Color", ["RED", "GREEN", "BLUE"]);
    let levels = TypeHierarchy::new().levels(&TypeKey::Enum(color.clone()));
    assert_eq!(levels.len(), 4);
    assert_eq!(levels[0].as_slice(), &[TypeKey::Enum(color)]);
    assert_eq!(levels[1].as_slice(), &[TypeKey::AnyEnum]);
    assert_eq!(levels[2].as_slice(), &[TypeKey::Comparable]);
    assert_eq!(levels[3].as_slice(), &[TypeKey::Any]);
}

#[test]
fn test_sorted_set_walk() {
    let tree_set = TypeKey::concrete(ConcreteCollection::TreeSet);
    assert_eq!(
        flat(&TypeHierarchy::new(), &tree_set),
        vec![
            tree_set.clone(),
            TypeKey::interface(Shape::SortedSet),
            TypeKey::set(),
            TypeKey::interface(Shape::Collection),
            TypeKey::Any,
        ]
    );
}

// === Declared types ===

#[test]
fn test_declared_interfaces_share_a_level() {
    let mut hierarchy = TypeHierarchy::new();
    let widget = TypeKey::named("Widget");
    hierarchy.declare(
        widget.clone(),
        TypeNode::new(
            Some(TypeKey::named("Component")),
            [TypeKey::named("Sized"), TypeKey::named("Labeled")],
        ),
    );
    hierarchy.declare(
        TypeKey::named("Component"),
        TypeNode::new(None, [TypeKey::named("Drawable")]),
    );

    let levels = hierarchy.levels(&widget);
    let levels: Vec<Vec<TypeKey>> = levels.into_iter().map(|l| l.into_vec()).collect();
    assert_eq!(
        levels,
        vec![
            vec![widget.clone()],
            vec![TypeKey::named("Component")],
            vec![
                TypeKey::named("Sized"),
                TypeKey::named("Labeled"),
                TypeKey::named("Drawable"),
            ],
            vec![TypeKey::Any],
        ]
    );
    assert!(hierarchy.validate().is_ok());
    assert!(hierarchy.is_strict_supertype(&TypeKey::named("Drawable"), &widget));
    assert!(!hierarchy.is_strict_supertype(&widget, &widget));
}

// === Instances ===

#[rstest]
#[case(Value::Integer(1), TypeKey::Number, true)]
#[case(Value::Integer(1), TypeKey::Long, false)]
#[case(Value::string("x"), TypeKey::CharSequence, true)]
#[case(Value::Null, TypeKey::Any, false)]
#[case(Value::list([Value::Integer(1)]), TypeKey::list(), true)]
#[case(Value::list([Value::Integer(1)]), TypeKey::set(), false)]
#[case(Value::array(TypeKey::Integer, [Value::Integer(1)]), TypeKey::array(TypeKey::Number), true)]
fn test_is_instance(#[case] value: Value, #[case] target: TypeKey, #[case] expected: bool) {
    assert_eq!(TypeHierarchy::new().is_instance(&value, &target), expected);
}

#[test]
fn test_enum_set_is_a_set() {
    let color = EnumType::new("Color", ["RED"]);
    let set = Value::EnumSet(EnumSetValue::all_of(&color));
    let hierarchy = TypeHierarchy::new();
    assert!(hierarchy.is_instance(&set, &TypeKey::set()));
    assert!(hierarchy.is_instance(&set, &TypeKey::interface(Shape::Collection)));
    assert!(!hierarchy.is_instance(&set, &TypeKey::list()));
}
