use std::collections::HashMap;

use proptest::prelude::*;
use subcase_core::ops;
use subcase_core::{Args, ExceptionKind, Signature, Value};

const BUILTIN_KINDS: &[ExceptionKind] = &[
    ExceptionKind::Exception,
    ExceptionKind::ArithmeticError,
    ExceptionKind::ZeroDivisionError,
    ExceptionKind::OverflowError,
    ExceptionKind::LookupError,
    ExceptionKind::IndexError,
    ExceptionKind::KeyError,
    ExceptionKind::TypeError,
    ExceptionKind::ValueError,
    ExceptionKind::AttributeError,
    ExceptionKind::RuntimeError,
    ExceptionKind::NotImplementedError,
    ExceptionKind::AssertionError,
    ExceptionKind::MemoryError,
];

#[test]
fn exception_names_unique_and_resolvable() {
    let mut seen: HashMap<&str, &ExceptionKind> = HashMap::new();

    for kind in BUILTIN_KINDS {
        assert_eq!(
            &ExceptionKind::from_name(kind.name()),
            kind,
            "exception name not resolvable: {}",
            kind.name()
        );
        if let Some(prev) = seen.insert(kind.name(), kind) {
            panic!("duplicate exception name {:?}: {:?} and {:?}", kind.name(), prev, kind);
        }
    }
}

#[test]
fn every_exception_derives_from_exception() {
    for kind in BUILTIN_KINDS {
        assert!(
            kind.is_subclass_of(&ExceptionKind::Exception),
            "{kind} does not derive from Exception"
        );
    }
    let custom = ExceptionKind::from_name("MyError");
    assert_eq!(custom, ExceptionKind::Custom("MyError".to_string()));
    assert!(custom.is_subclass_of(&ExceptionKind::Exception));
    assert!(!ExceptionKind::Exception.is_subclass_of(&custom));
}

fn nested_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z']{0,5}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec(inner, 0..4).prop_map(Value::Tuple),
        ]
    })
}

proptest! {
    /// Property: a deep clone is equal to, and renders like, the original.
    #[test]
    fn deep_clone_preserves_value(value in nested_value()) {
        let copy = value.deep_clone();
        prop_assert_eq!(&copy, &value);
        prop_assert_eq!(copy.repr(), value.repr());
    }

    /// Property: mutating a deep-cloned list never reaches the original.
    #[test]
    fn deep_clone_is_independent(items in prop::collection::vec(nested_value(), 0..4), extra in nested_value()) {
        let original = Value::List(items);
        let mut copy = original.deep_clone();
        let before = original.repr();
        ops::list_append(&mut copy, extra).unwrap();
        prop_assert_eq!(original.repr(), before);
    }

    /// Property: binding exactly the declared parameters (positionally or by keyword) always succeeds.
    #[test]
    fn binding_matching_arguments_succeeds(values in prop::collection::vec(any::<i64>(), 1..5), split in 0usize..5) {
        let names: Vec<String> = (0..values.len()).map(|i| format!("p{i}")).collect();
        let signature = names.iter().fold(Signature::new(), |sig, name| sig.param(name.as_str()));
        let split = split.min(values.len());

        let mut args = Args::new();
        for value in &values[..split] {
            args = args.arg(*value);
        }
        for (name, value) in names.iter().zip(&values).skip(split) {
            args = args.kwarg(name.as_str(), *value);
        }

        let bound = signature.bind(&args).unwrap();
        for (name, value) in names.iter().zip(&values) {
            prop_assert_eq!(bound.get(name).unwrap(), &Value::from(*value));
        }
    }

    /// Property: dropping any required parameter is reported as missing, naming it.
    #[test]
    fn binding_missing_argument_names_it(count in 1usize..5, dropped in 0usize..5) {
        let dropped = dropped % count;
        let signature = (0..count).fold(Signature::new(), |sig, i| sig.param(format!("p{i}")));
        let args = (0..count)
            .filter(|i| *i != dropped)
            .fold(Args::new(), |args, i| args.kwarg(format!("p{i}"), 0));

        let err = signature.bind(&args).unwrap_err();
        prop_assert_eq!(err.kind(), &ExceptionKind::TypeError);
        let message = err.to_string();
        prop_assert!(message.starts_with("subject() missing 1 required positional argument: "));
        let expected_name = format!("'p{dropped}'");
        prop_assert!(message.ends_with(&expected_name));
    }
}
