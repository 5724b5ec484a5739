use std::sync::Arc;

use patmat::is::{
    array, bind, guarded, id, ignore, in_range, in_range_inclusive, instance, map, object,
    one_of, preguarded, rest, string, tag, type_of, view,
};
use patmat::{
    Bindings, Class, Extraction, Extractor, Object, Pattern, PatternError, Symbol, Template,
    Cases, Clauses, Union, Value, VariantKind, case, clause, clause_guarded, keyed, match_pattern,
    record, seq,
};
use pretty_assertions::assert_eq;

fn bindings<const N: usize>(pairs: [(&str, Value); N]) -> Bindings {
    pairs.into_iter().collect()
}

fn assert_send_sync<T: Send + Sync>() {}

fn num(b: &Bindings, name: &str) -> f64 {
    b[name].as_number().unwrap()
}

// ---------------------------------------------------------------------------
// Core properties
// ---------------------------------------------------------------------------

#[test]
fn normalization_is_idempotent() {
    let pattern = Pattern::of(record! { "x" => id("x") });
    assert!(Pattern::of(pattern.clone()).ptr_eq(&pattern));
}

#[test]
fn failed_match_yields_no_bindings() {
    // `a` matches before the second element fails; nothing leaks out.
    let result = match_pattern(seq![id("a"), 2], &Value::sequence([1, 3])).unwrap();
    assert_eq!(result, None);
}

#[test]
fn repeated_capture_requires_identical_values() {
    let describe = case(seq![id("x"), id("x")], |b| num(&b, "x"))
        .case(seq![id("x"), id("y")], |b| num(&b, "x") + num(&b, "y"));

    assert_eq!(describe.dispatch(&Value::sequence([1, 2])), Ok(3.0));
    assert_eq!(describe.dispatch(&Value::sequence([2, 2])), Ok(2.0));
}

#[test]
fn composites_compare_by_identity() {
    let shared = Value::sequence([1]);
    let same = Value::sequence([shared.clone(), shared.clone()]);
    let equal_but_distinct = Value::sequence([Value::sequence([1]), Value::sequence([1])]);

    let pattern = Pattern::of(seq![id("x"), id("x")]);
    assert!(pattern.test(&same).unwrap());
    assert!(!pattern.test(&equal_but_distinct).unwrap());
}

#[test]
fn rest_carve_out() {
    let tail = case(array(seq![ignore()], Some(id("rest").into())).unwrap(), |b| {
        b["rest"].clone()
    });

    assert_eq!(
        tail.dispatch(&Value::sequence([1, 2, 3])),
        Ok(Value::sequence([2, 3]))
    );
    // A rest needs no elements of its own.
    assert_eq!(
        tail.dispatch(&Value::sequence([1])),
        Ok(Value::sequence(Vec::<Value>::new()))
    );
    assert_eq!(
        tail.dispatch(&Value::sequence(Vec::<Value>::new())),
        Err(PatternError::NoCaseMatched)
    );
}

#[test]
fn rest_marker_in_template() {
    let b = match_pattern(seq![ignore(), rest(id("xs"))], &Value::sequence(["a", "b", "c"]))
        .unwrap()
        .unwrap();
    assert_eq!(b, bindings([("xs", Value::sequence(["b", "c"]))]));
}

#[test]
fn nested_sequences() {
    let pattern = seq![seq![seq![id("a"), id("b")], id("c")], seq![id("d")]];
    let subject = Value::sequence([
        Value::sequence([Value::sequence([1, 2]), Value::from(3)]),
        Value::sequence([4]),
    ]);
    let b = match_pattern(pattern, &subject).unwrap().unwrap();
    assert_eq!(b.names().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    assert_eq!(num(&b, "d"), 4.0);
}

#[test]
fn structural_rest_with_nested_bind() {
    let pattern = record! {
        "array" => preguarded(|v| v.as_sequence().is_some(), id("array")),
        "map" => keyed! { "x" => 1, "y" => 2 },
        "object" => record! {
            "object2" => record! {
                "object3" => object(
                    record! { "z" => bind(in_range(1.0, 100.0), "z") },
                    Some(id("rest").into()),
                ).unwrap(),
            },
        },
    };
    let subject = Value::object([
        ("array", Value::sequence([1, 2, 3])),
        ("map", Value::map([("x", 1), ("y", 2)])),
        (
            "object",
            Value::object([(
                "object2",
                Value::object([("object3", Value::object([("z", 10), ("zz", 15)]))]),
            )]),
        ),
    ]);

    let b = match_pattern(pattern, &subject).unwrap().unwrap();
    assert_eq!(
        b,
        bindings([
            ("array", Value::sequence([1, 2, 3])),
            ("rest", Value::object([("zz", 15)])),
            ("z", Value::from(10)),
        ])
    );
}

#[test]
fn bind_with_self_collision_is_an_error() {
    let dispatch = case(bind(id("x"), "x"), |b| b["x"].clone());
    assert_eq!(
        dispatch.dispatch(&Value::from(1)),
        Err(PatternError::BindingCollision { name: "x".into() })
    );
}

#[test]
fn bind_captures_the_whole_subject() {
    let dispatch = case(bind(1, "x"), |b| b["x"].clone());
    assert_eq!(dispatch.dispatch(&Value::from(1)), Ok(Value::from(1)));
}

#[test]
fn bind_checks_previous_bindings() {
    let pattern = seq![id("x"), bind(ignore(), "x")];
    assert!(patmat::test(pattern.clone(), &Value::sequence([5, 5])).unwrap());
    assert!(!patmat::test(pattern, &Value::sequence([5, 6])).unwrap());
}

#[test]
fn one_of_short_circuits() {
    let picked = case(one_of([1, 2, 3]), |_| 1).case(one_of([4, 5, 6]), |_| 2);
    assert_eq!(picked.dispatch(&Value::from(1)), Ok(1));
    assert_eq!(picked.dispatch(&Value::from(4)), Ok(2));

    let first = Pattern::one_of([Template::from(id("a")), Template::from(id("b"))]);
    let b = first.match_value(&Value::from(9)).unwrap().unwrap();
    assert_eq!(b, bindings([("a", Value::from(9))]));
}

#[test]
fn range_boundaries() {
    let small = case(in_range(1.0, 10.0), |_| 1).case(ignore(), |_| 0);
    assert_eq!(small.dispatch(&Value::from(5)), Ok(1));
    assert_eq!(small.dispatch(&Value::from(1)), Ok(1));
    assert_eq!(small.dispatch(&Value::from(10)), Ok(0));
    assert_eq!(small.dispatch(&Value::from("5")), Ok(0));

    assert!(in_range_inclusive(1.0, 10.0).test(&Value::from(10)).unwrap());
}

#[test]
fn dispatch_exhaustiveness() {
    let numbers = case(1, |_| "one").case(2, |_| "two");
    assert_eq!(numbers.dispatch(&Value::from(1)), Ok("one"));
    assert_eq!(numbers.dispatch(&Value::from(2)), Ok("two"));
    assert_eq!(
        numbers.dispatch(&Value::from(100)),
        Err(PatternError::NoCaseMatched)
    );
}

#[test]
fn sum_of_squares() {
    let squares = case(record! { "x" => id("x"), "y" => id("y"), "z" => id("z") }, |b| {
        num(&b, "x").powi(2) + num(&b, "y").powi(2) + num(&b, "z").powi(2)
    })
    .case(record! { "x" => id("x"), "y" => id("y") }, |b| {
        num(&b, "x").powi(2) + num(&b, "y").powi(2)
    });

    assert_eq!(squares.dispatch(&Value::object([("x", 2), ("y", 3)])), Ok(13.0));
    assert_eq!(
        squares.dispatch(&Value::object([("x", 2), ("y", 2), ("z", 3)])),
        Ok(17.0)
    );
}

// ---------------------------------------------------------------------------
// Pattern kinds
// ---------------------------------------------------------------------------

#[test]
fn ignore_binds_nothing() {
    let b = case(ignore(), |b| b).dispatch(&Value::from(1)).unwrap();
    assert!(b.is_empty());
}

#[test]
fn type_patterns() {
    let describe = case(type_of("string", id("x")), |b| {
        b["x"].as_str().unwrap().to_uppercase()
    })
    .case(type_of("number", id("x")), |b| (num(&b, "x") * 100.0).to_string());

    assert_eq!(describe.dispatch(&Value::from("hi")), Ok("HI".to_string()));
    assert_eq!(describe.dispatch(&Value::from(1)), Ok("100".to_string()));
}

#[test]
fn instance_patterns_follow_inheritance() {
    let shape = Class::new("Shape");
    let square = Class::extending("Square", &shape);
    let other = Class::new("Other");

    let value = square.instantiate([("side", Value::from(2))]).unwrap();
    assert!(instance(&shape, ignore()).test(&value).unwrap());
    assert!(instance(&square, record! { "side" => 2 }).test(&value).unwrap());
    assert!(!instance(&other, ignore()).test(&value).unwrap());
    assert!(!instance(&shape, ignore()).test(&Value::from(1)).unwrap());
}

#[test]
fn preguard_and_view() {
    let first = case(preguarded(|v| v.as_sequence().is_some(), id("a")), |b| {
        b["a"].as_sequence().unwrap()[0].clone()
    });
    assert_eq!(first.dispatch(&Value::sequence([1])), Ok(Value::from(1)));

    let head_is_one = view(
        |v| v.as_sequence().and_then(|s| s.first().cloned()).unwrap_or(Value::Undefined),
        1,
    );
    assert!(head_is_one.test(&Value::sequence([1, 2])).unwrap());
    assert!(!head_is_one.test(&Value::Null).unwrap());
}

#[test]
fn guard_sees_the_bindings() {
    let big = case(guarded(id("x"), |b| b["x"].as_number() > Some(10.0)), |b| {
        num(&b, "x")
    })
    .case(ignore(), |_| 0.0);

    assert_eq!(big.dispatch(&Value::from(50)), Ok(50.0));
    assert_eq!(big.dispatch(&Value::from(1)), Ok(0.0));
}

#[test]
fn guard_sees_earlier_siblings() {
    let pattern = seq![id("a"), guarded(id("b"), |b| b.contains("a"))];
    assert!(patmat::test(pattern, &Value::sequence([1, 2])).unwrap());
}

#[test]
fn empty_and_fixed_length_sequences() {
    let arity = case(seq![], |_| 0)
        .case(seq![ignore(), id("x")], |b| num(&b, "x") as i32)
        .case(seq![ignore(), ignore(), id("x")], |b| num(&b, "x") as i32);

    assert_eq!(arity.dispatch(&Value::sequence(Vec::<Value>::new())), Ok(0));
    assert_eq!(arity.dispatch(&Value::sequence([1, 2])), Ok(2));
    assert_eq!(arity.dispatch(&Value::sequence([1, 2, 3])), Ok(3));
}

#[test]
fn objects_see_inherited_properties() {
    let proto = Arc::new(Object::new().with("x", 1));
    let child = Value::from(Object::new().with("y", 2).with_prototype(proto));

    let b = match_pattern(record! { "x" => id("x") }, &child).unwrap().unwrap();
    assert_eq!(b["x"], Value::from(1));

    // The residual only carries own keys.
    let b = match_pattern(
        object(record! { "x" => ignore() }, Some(id("rest").into())).unwrap(),
        &child,
    )
    .unwrap()
    .unwrap();
    assert_eq!(b["rest"], Value::object([("y", 2)]));
}

#[test]
fn symbol_property_keys() {
    let s = Symbol::new("s");
    let subject = Value::from(Object::new().with(s.clone(), 1));

    let b = match_pattern(record! { s.clone() => id("x") }, &subject)
        .unwrap()
        .unwrap();
    assert_eq!(b["x"], Value::from(1));
    assert!(!patmat::test(record! { Symbol::new("s") => ignore() }, &subject).unwrap());
}

#[test]
fn object_rest() {
    let b = match_pattern(
        object(record! { "x" => 1 }, Some(id("rest").into())).unwrap(),
        &Value::object([("x", 1), ("y", 2), ("z", 3)]),
    )
    .unwrap()
    .unwrap();
    assert_eq!(b["rest"], Value::object([("y", 2), ("z", 3)]));
}

#[test]
fn sequences_expose_length() {
    let pattern = record! { "length" => id("n") };
    let b = match_pattern(pattern, &Value::sequence([7, 8, 9])).unwrap().unwrap();
    assert_eq!(b["n"], Value::from(3));
    assert!(!patmat::test(record! { "x" => ignore() }, &Value::from(1)).unwrap());
}

#[test]
fn keyed_maps() {
    let b = match_pattern(keyed! { "x" => id("x") }, &Value::map([("x", 5)]))
        .unwrap()
        .unwrap();
    assert_eq!(b["x"], Value::from(5));

    let b = match_pattern(
        map(keyed! { "x" => ignore() }, Some(id("rest").into())).unwrap(),
        &Value::map([("x", 5), ("y", 7)]),
    )
    .unwrap()
    .unwrap();
    assert_eq!(b["rest"], Value::map([("y", 7)]));

    assert!(!patmat::test(keyed! { "z" => ignore() }, &Value::map([("x", 5)])).unwrap());
    assert!(!patmat::test(keyed! { "x" => ignore() }, &Value::object([("x", 5)])).unwrap());
}

#[test]
fn map_rest_via_rest_key() {
    let pattern = keyed! { 1 => "one", Symbol::rest() => id("others") };
    let b = match_pattern(pattern, &Value::map([(1, "one"), (2, "two")]))
        .unwrap()
        .unwrap();
    assert_eq!(b["others"], Value::map([(2, "two")]));
}

#[test]
fn string_prefix() {
    let command = string("cmd:", id("name"));
    let b = command.match_value(&Value::from("cmd:run")).unwrap().unwrap();
    assert_eq!(b["name"], Value::from("run"));
    assert!(!command.test(&Value::from("run")).unwrap());
    assert!(!command.test(&Value::from(1)).unwrap());
}

#[test]
fn tagged_unions() {
    let option = Union::new("Option", [("Some", VariantKind::Value), ("None", VariantKind::Array)]);
    let some = option.variant("Some").unwrap();
    let none = option.variant("None").unwrap();

    let unwrap_or_zero = case(tag(some, id("x")), |b| num(&b, "x"))
        .case(tag(none, ignore()), |_| 0.0);

    assert_eq!(unwrap_or_zero.dispatch(&some.of(4)), Ok(4.0));
    assert_eq!(unwrap_or_zero.dispatch(&none.construct(vec![])), Ok(0.0));
    assert_eq!(
        unwrap_or_zero.dispatch(&Value::from(4)),
        Err(PatternError::NoCaseMatched)
    );

    let pair = Union::new("Pair", [("Both", VariantKind::Array)]);
    let both = pair.variant("Both").unwrap();
    let b = match_pattern(
        tag(both, seq![id("l"), id("r")]),
        &both.construct(vec![Value::from(1), Value::from(2)]),
    )
    .unwrap()
    .unwrap();
    assert_eq!(b, bindings([("l", Value::from(1)), ("r", Value::from(2))]));
}

struct IsOne;

impl Extractor for IsOne {
    fn extract(&self, subject: &Value, _context: &Bindings) -> Extraction {
        Ok(subject
            .identical(&Value::from(1))
            .then(|| Bindings::new().set("x", subject.clone())))
    }
}

#[test]
fn custom_extractor() {
    let one = case(Pattern::custom(IsOne), |b| num(&b, "x")).case(ignore(), |_| 0.0);
    assert_eq!(one.dispatch(&Value::from(1)), Ok(1.0));
    assert_eq!(one.dispatch(&Value::from(6)), Ok(0.0));
}

#[test]
fn custom_extractor_results_are_checked_against_siblings() {
    let pattern = seq![id("x"), Pattern::custom(IsOne)];
    assert!(patmat::test(pattern.clone(), &Value::sequence([1, 1])).unwrap());
    assert!(!patmat::test(pattern, &Value::sequence([2, 1])).unwrap());
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

#[test]
fn clauses_by_arity_with_rest() {
    let sum = |b: &Bindings, names: &[&str]| names.iter().map(|n| num(b, n)).sum::<f64>();
    let f = clause([id("x")], move |b| Value::from(sum(&b, &["x"])))
        .clause([id("x"), id("y")], move |b| Value::from(sum(&b, &["x", "y"])))
        .clause([id("x"), id("y"), id("z")], move |b| {
            Value::from(sum(&b, &["x", "y", "z"]))
        })
        .clause_with_rest([id("x")], id("xs"), |b| {
            let mut items = b["xs"].as_sequence().unwrap().to_vec();
            items.push(b["x"].clone());
            Value::from(items)
        })
        .into_fn();

    let args = |ns: &[i32]| ns.iter().map(|n| Value::from(*n)).collect::<Vec<_>>();
    assert_eq!(f(&args(&[1])), Ok(Value::from(1)));
    assert_eq!(f(&args(&[1, 2])), Ok(Value::from(3)));
    assert_eq!(f(&args(&[1, 2, 3])), Ok(Value::from(6)));
    assert_eq!(f(&args(&[1, 2, 3, 4])), Ok(Value::sequence([2, 3, 4, 1])));
}

#[test]
fn guarded_clauses_with_rest() {
    let f = Clauses::new()
        .clause_guarded_with_rest(
            [id("n")],
            id("xs"),
            |b| {
                let count = b["xs"].as_sequence().map_or(0, |xs| xs.len());
                num(b, "n") == count as f64
            },
            |b| format!("{} counted", num(&b, "n")),
        )
        .clause_with_rest([ignore()], ignore(), |_| "miscounted".to_string());

    let args = |ns: &[i32]| ns.iter().map(|n| Value::from(*n)).collect::<Vec<_>>();
    assert_eq!(f.call(&args(&[2, 7, 8])), Ok("2 counted".to_string()));
    assert_eq!(f.call(&args(&[0])), Ok("0 counted".to_string()));
    assert_eq!(f.call(&args(&[3, 7])), Ok("miscounted".to_string()));
    assert_eq!(f.call(&[]), Err(PatternError::NoClauseMatched));
}

#[test]
fn guarded_clauses() {
    let f = clause_guarded([id("x")], |b| b["x"].identical(&Value::from(1)), |b| {
        num(&b, "x")
    })
    .clause([ignore()], |_| 0.0);

    assert_eq!(f.call(&[Value::from(1)]), Ok(1.0));
    assert_eq!(f.call(&[Value::from(2)]), Ok(0.0));
    assert_eq!(
        f.call(&[Value::from(1), Value::from(2)]),
        Err(PatternError::NoClauseMatched)
    );
}

#[test]
fn recursive_map_over_a_sequence() {
    fn double_all(items: &Value) -> Vec<f64> {
        let step = clause([Template::from(seq![])], |_| Vec::new()).clause(
            [Template::from(array(seq![id("x")], Some(id("xs").into())).unwrap())],
            |b| {
                let mut out = vec![num(&b, "x") * 2.0];
                out.extend(double_all(&b["xs"]));
                out
            },
        );
        step.call(std::slice::from_ref(items)).unwrap_or_default()
    }

    assert_eq!(double_all(&Value::sequence([1, 2, 3, 4])), vec![2.0, 4.0, 6.0, 8.0]);
}

// ---------------------------------------------------------------------------
// Scale and thread safety
// ---------------------------------------------------------------------------

#[test]
fn long_capture_sequence() {
    let n = 20_000;
    let pattern = Pattern::of(Template::Sequence(
        (0..n).map(|i| Template::from(id(format!("x{}", i)))).collect(),
    ));
    let b = pattern
        .match_value(&Value::sequence(0..n as i32))
        .unwrap()
        .unwrap();

    assert_eq!(b.len(), n);
    assert_eq!(num(&b, "x0"), 0.0);
    assert_eq!(num(&b, "x19999"), 19_999.0);
}

#[test]
fn long_sequence_of_nested_captures() {
    let n = 5_000;
    let pattern = Pattern::of(Template::Sequence(
        (0..n)
            .map(|i| Template::Sequence(vec![id(format!("x{}", i)).into(), id("shared").into()]))
            .collect(),
    ));
    let subject = Value::sequence((0..n as i32).map(|i| Value::sequence([i, -1])));
    let b = pattern.match_value(&subject).unwrap().unwrap();

    assert_eq!(b.len(), n + 1);
    assert_eq!(num(&b, "x4999"), 4_999.0);
    assert_eq!(num(&b, "shared"), -1.0);
}

#[test]
fn core_types_are_send_and_sync() {
    assert_send_sync::<Value>();
    assert_send_sync::<Pattern>();
    assert_send_sync::<Bindings>();
    assert_send_sync::<Template>();
    assert_send_sync::<Cases<Value>>();
    assert_send_sync::<Clauses<Value>>();
}
