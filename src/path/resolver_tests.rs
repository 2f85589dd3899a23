use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::config::{EmptyAssignment, LyneConfig};
use crate::error::LyneError;
use crate::value::{Func, Kwargs, Namespace, Record, Value};

// Test Helpers
fn image_context() -> Value {
    Namespace::new()
        .with("path", "tiles/a.png")
        .with("size", Value::tuple(vec![Value::Int(640), Value::Int(480)]))
        .with(
            "meta",
            Value::dict(vec![(Value::str("tags"), Value::list(vec![Value::str("red"), Value::str("blue")]))]).unwrap(),
        )
        .into_value()
}

fn strict_resolver() -> Resolver {
    Resolver::new(Arc::new(LyneConfig {
        empty_assignment: EmptyAssignment::Reject,
        ..LyneConfig::default()
    }))
}

/// A record that logs every capability used on it, in order.
#[derive(Debug, Default)]
struct Canvas {
    log: Arc<Mutex<Vec<String>>>,
}

impl Record for Canvas {
    fn type_name(&self) -> &str {
        "canvas"
    }

    fn get_attr(&self, name: &str) -> Result<Value, LyneError> {
        self.log.lock().push(format!("get {}", name));
        match name {
            "bbox" => Ok(Value::tuple(vec![Value::Int(1), Value::Int(2)])),
            "crop" => {
                let log = Arc::clone(&self.log);
                Ok(Value::Func(Func::new("crop", move |args, _kwargs| {
                    log.lock().push(format!(
                        "call crop({})",
                        args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ")
                    ));
                    Ok(Value::str("cropped"))
                })))
            }
            _ => Err(LyneError::Attribute {
                type_name: "canvas".to_string(),
                name: name.to_string(),
            }),
        }
    }
}

//==================================================================================
// Read resolution
//==================================================================================

#[test]
fn test_empty_chain_resolves_to_context() {
    let ctx = image_context();
    let resolved = resolve(&plain(), &ctx).unwrap();
    assert!(resolved.is_same(&ctx));
}

#[test]
fn test_attribute_and_index_steps() {
    let ctx = image_context();
    let p = plain();
    assert_eq!(resolve(&p.attr("path"), &ctx).unwrap(), Value::str("tiles/a.png"));
    assert_eq!(resolve(&p.attr("size").item(-1), &ctx).unwrap(), Value::Int(480));
    assert_eq!(resolve(&p.item("path"), &ctx).unwrap(), Value::str("tiles/a.png"));
    assert_eq!(
        resolve(&p.attr("meta").item("tags").item(0), &ctx).unwrap(),
        Value::str("red")
    );
}

#[test]
fn test_operator_steps() {
    let ctx = image_context();
    let p = plain();
    let width = p.attr("size").item(0);
    assert_eq!(resolve(&(&width / 2), &ctx).unwrap(), Value::Float(320.0));
    assert_eq!(resolve(&(1000i64 - &width), &ctx).unwrap(), Value::Int(360));
    assert_eq!(resolve(&width.gt(600), &ctx).unwrap(), Value::Bool(true));
    assert_eq!(
        resolve(&p.attr("meta").item("tags").contains("blue"), &ctx).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(resolve(&(-width).abs(), &ctx).unwrap(), Value::Int(640));
}

#[test]
fn test_sequence_repetition_steps() {
    let ctx = Namespace::new()
        .with("name", "ab")
        .with("pair", Value::tuple(vec![Value::Int(1), Value::Int(2)]))
        .with("tags", Value::list(vec![Value::str("x")]))
        .into_value();
    let p = plain();
    assert_eq!(resolve(&(p.attr("name") * 3), &ctx).unwrap(), Value::str("ababab"));
    assert_eq!(
        resolve(&(2i64 * p.attr("pair")), &ctx).unwrap(),
        Value::tuple(vec![Value::Int(1), Value::Int(2), Value::Int(1), Value::Int(2)])
    );
    assert_eq!(
        resolve(&(p.attr("tags") * 2), &ctx).unwrap(),
        Value::list(vec![Value::str("x"), Value::str("x")])
    );
    assert_eq!(resolve(&(p.attr("name") * 0), &ctx).unwrap(), Value::str(""));
    assert_eq!(resolve(&(p.attr("pair") * -1), &ctx).unwrap(), Value::tuple(vec![]));
}

#[test]
fn test_lambda_chain_invokes_function_with_context() {
    let ctx = image_context();
    let path_len = Func::unary("path_len", |ctx| match ctx {
        Value::Object(record) => {
            let path = record.get_attr("path")?;
            Ok(Value::Int(path.as_str().map_or(0, |s| s.len() as i64)))
        }
        other => Err(LyneError::Type(format!("unexpected {}", other.type_name()))),
    });
    let chain = plain().item(path_len);
    assert_eq!(resolve(&chain, &ctx).unwrap(), Value::Int(11));
}

/// A callable record that reports which context it was called with.
#[derive(Debug)]
struct PathReader;

impl Record for PathReader {
    fn type_name(&self) -> &str {
        "path_reader"
    }

    fn get_attr(&self, name: &str) -> Result<Value, LyneError> {
        Err(LyneError::Attribute {
            type_name: "path_reader".to_string(),
            name: name.to_string(),
        })
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn call(&self, args: &[Value], _kwargs: &Kwargs) -> Result<Value, LyneError> {
        match args {
            [Value::Object(record)] => record.get_attr("path"),
            _ => Err(LyneError::Type("path_reader expects one record".to_string())),
        }
    }
}

#[test]
fn test_lambda_chain_accepts_callable_record() {
    let ctx = image_context();
    let chain = plain().item(Value::object(PathReader));
    assert_eq!(resolve(&chain, &ctx).unwrap(), Value::str("tiles/a.png"));
}

#[test]
fn test_nested_chain_is_resolved_before_outer_step() {
    let canvas = Canvas::default();
    let log = Arc::clone(&canvas.log);
    let ctx = Value::object(canvas);

    let p = plain();
    let chain = p.attr("crop").call(vec![p.attr("bbox").into()]);
    assert_eq!(resolve(&chain, &ctx).unwrap(), Value::str("cropped"));
    assert_eq!(
        *log.lock(),
        vec!["get crop".to_string(), "get bbox".to_string(), "call crop((1, 2))".to_string()]
    );
}

#[test]
fn test_chains_inside_containers_and_kwargs() {
    let collect = Func::new("collect", |args, kwargs| {
        let mut items = args.to_vec();
        items.extend(kwargs.values().cloned());
        Ok(Value::tuple(items))
    });
    let ctx = Namespace::new()
        .with("collect", collect)
        .with("path", "x.png")
        .with("size", Value::tuple(vec![Value::Int(3), Value::Int(4)]))
        .into_value();

    let p = plain();
    let mut kwargs = Kwargs::new();
    kwargs.insert("w".to_string(), p.attr("size").item(0).into());
    let call = p.attr("collect").call_with(
        vec![
            Value::tuple(vec![p.attr("path").into(), Value::Int(7)]),
            Value::dict(vec![(Value::str("h"), p.attr("size").item(1).into())]).unwrap(),
        ],
        kwargs,
    );

    assert_eq!(
        resolve(&call, &ctx).unwrap(),
        Value::tuple(vec![
            Value::tuple(vec![Value::str("x.png"), Value::Int(7)]),
            Value::dict(vec![(Value::str("h"), Value::Int(4))]).unwrap(),
            Value::Int(3),
        ])
    );
}

#[test]
fn test_resolve_value_passes_plain_values_through() {
    let ctx = image_context();
    let list = Value::list(vec![Value::Int(1)]);
    assert!(resolve_value(&list, &ctx).unwrap().is_same(&list));
    assert_eq!(resolve_value(&Value::Int(5), &ctx).unwrap(), Value::Int(5));
    assert_eq!(
        resolve_value(&Value::list(vec![plain().attr("path").into()]), &ctx).unwrap(),
        Value::list(vec![Value::str("tiles/a.png")])
    );
}

#[test]
fn test_resolution_errors_propagate() {
    let ctx = image_context();
    assert!(matches!(
        resolve(&plain().attr("missing"), &ctx),
        Err(LyneError::Attribute { name, .. }) if name == "missing"
    ));
    assert!(matches!(
        resolve(&plain().attr("size").item(5), &ctx),
        Err(LyneError::Index(_))
    ));
    assert!(matches!(
        resolve(&(plain().attr("path") - 1), &ctx),
        Err(LyneError::Type(_))
    ));
}

#[test]
fn test_nesting_depth_is_bounded() {
    let ctx = Namespace::from_pairs([("k", "a"), ("a", "b"), ("b", "c"), ("c", "d")]).into_value();
    let p = plain();
    let c0 = p.attr("k");
    let c1 = p.item(&c0);
    let c2 = p.item(&c1);
    let c3 = p.item(&c2);

    let shallow = Resolver::new(Arc::new(LyneConfig {
        max_nesting_depth: 2,
        ..LyneConfig::default()
    }));
    assert_eq!(shallow.resolve(&c2, &ctx).unwrap(), Value::str("c"));
    assert!(matches!(shallow.resolve(&c3, &ctx), Err(LyneError::NestingTooDeep(2))));
    assert_eq!(resolve(&c3, &ctx).unwrap(), Value::str("d"));
}

#[test]
fn test_resolution_is_deterministic() {
    let ctx = image_context();
    let chain = plain().attr("size").item(0) * plain().attr("size").item(1);
    let first = resolve(&chain, &ctx).unwrap();
    let second = resolve(&chain, &ctx).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Value::Int(640 * 480));
}

#[test]
fn test_shared_chain_resolves_concurrently() {
    let chain = plain().attr("n") * 2;
    let resolver = Resolver::default();
    std::thread::scope(|scope| {
        for n in 0..8i64 {
            let chain = &chain;
            let resolver = &resolver;
            scope.spawn(move || {
                let ctx = Namespace::new().with("n", n).into_value();
                assert_eq!(resolver.resolve(chain, &ctx).unwrap(), Value::Int(n * 2));
            });
        }
    });
}

#[test]
fn test_trace_resolution_does_not_change_results() {
    let traced = Resolver::new(Arc::new(LyneConfig {
        trace_resolution: true,
        ..LyneConfig::default()
    }));
    let ctx = image_context();
    assert_eq!(
        traced.resolve(&plain().attr("size").item(1), &ctx).unwrap(),
        Value::Int(480)
    );
}

//==================================================================================
// Write resolution
//==================================================================================

#[test]
fn test_assign_attribute_returns_same_context() {
    let ctx = Namespace::new().into_value();
    let returned = assign(&plain().attr("mask"), &ctx, Value::Bool(true)).unwrap();
    assert!(returned.is_same(&ctx));
    assert_eq!(resolve(&plain().attr("mask"), &ctx).unwrap(), Value::Bool(true));
}

#[test]
fn test_assign_through_nested_containers() {
    let ctx = image_context();
    let tag = plain().attr("meta").item("tags").item(-1);
    assign(&tag, &ctx, Value::str("green")).unwrap();
    assert_eq!(resolve(&tag, &ctx).unwrap(), Value::str("green"));

    let new_key = plain().attr("meta").item("score");
    assign(&new_key, &ctx, Value::Float(0.5)).unwrap();
    assert_eq!(resolve(&new_key, &ctx).unwrap(), Value::Float(0.5));
}

#[test]
fn test_assign_key_may_be_a_chain() {
    let ctx = Namespace::new()
        .with("field", "result")
        .with("slots", Value::dict(Vec::new()).unwrap())
        .into_value();
    let chain = plain().attr("slots").item(plain().attr("field"));
    assign(&chain, &ctx, Value::Int(9)).unwrap();
    assert_eq!(
        resolve(&plain().attr("slots").item("result"), &ctx).unwrap(),
        Value::Int(9)
    );
}

#[test]
fn test_unhashable_dict_keys_are_rejected() {
    let inner = Value::dict(Vec::new()).unwrap();
    let ctx = Namespace::new()
        .with("d", Value::dict(vec![(Value::str("k"), inner)]).unwrap())
        .into_value();
    let p = plain();

    // The key resolves to the dict being written into.
    let self_keyed = p.attr("d").item(p.attr("d"));
    assert!(matches!(
        assign(&self_keyed, &ctx, Value::Int(2)),
        Err(LyneError::UnhashableValue(name)) if name == "dict"
    ));

    let list_keyed = p.attr("d").item(Value::list(vec![Value::Int(1)]));
    assert!(matches!(
        assign(&list_keyed, &ctx, Value::Int(2)),
        Err(LyneError::UnhashableValue(name)) if name == "list"
    ));
    assert!(matches!(resolve(&list_keyed, &ctx), Err(LyneError::UnhashableValue(_))));
    assert!(matches!(
        resolve(&p.attr("d").contains(Value::set(vec![])), &ctx),
        Err(LyneError::UnhashableValue(_))
    ));

    let tuple_keyed = p.attr("d").item(Value::tuple(vec![Value::Int(1), Value::str("a")]));
    assign(&tuple_keyed, &ctx, Value::Int(3)).unwrap();
    assert_eq!(resolve(&tuple_keyed, &ctx).unwrap(), Value::Int(3));
}

#[test]
fn test_empty_chain_assignment_is_ignored_by_default() {
    let ctx = image_context();
    let returned = assign(&plain(), &ctx, Value::Int(1)).unwrap();
    assert!(returned.is_same(&ctx));
    assert_eq!(resolve(&plain().attr("path"), &ctx).unwrap(), Value::str("tiles/a.png"));
}

#[test]
fn test_empty_chain_assignment_can_be_rejected() {
    let ctx = image_context();
    assert!(matches!(
        strict_resolver().assign(&plain(), &ctx, Value::Int(1)),
        Err(LyneError::NotAssignable(_))
    ));
    assert!(strict_resolver().assign(&plain().attr("x"), &ctx, Value::Int(1)).is_ok());
}

#[test]
fn test_non_assignable_chains_are_rejected() {
    let ctx = image_context();
    match assign(&(plain().attr("size") + 1), &ctx, Value::None) {
        Err(LyneError::NotAssignable(chain)) => assert_eq!(chain, "P.size + 1"),
        other => panic!("expected NotAssignable, got {:?}", other),
    }
    assert!(matches!(
        assign(&output().attr("mask"), &ctx, Value::None),
        Err(LyneError::NotAssignable(_))
    ));
    assert!(matches!(
        assign(&plain().attr("path").call(vec![]), &ctx, Value::None),
        Err(LyneError::NotAssignable(_))
    ));
}

#[test]
fn test_assign_into_immutable_target_fails() {
    let ctx = image_context();
    assert!(matches!(
        assign(&plain().attr("size").item(0), &ctx, Value::Int(1)),
        Err(LyneError::Type(_))
    ));
}

#[test]
fn test_assign_then_resolve_round_trips_with_seeded_paths() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let keys = ["a", "b", "c"];
    let data = Value::dict(keys.iter().map(|key| {
        (Value::str(*key), Value::list((0..4).map(Value::Int)))
    }))
    .unwrap();
    let ctx = Namespace::new().with("data", data).into_value();

    for _ in 0..200 {
        let key = keys[rng.random_range(0..keys.len())];
        let index: i64 = rng.random_range(-4..4);
        let value = Value::Int(rng.random_range(-1000..1000));

        let chain = plain().attr("data").item(key).item(index);
        assign(&chain, &ctx, value.clone()).unwrap();
        assert_eq!(resolve(&chain, &ctx).unwrap(), value, "{}", chain);
    }
}
