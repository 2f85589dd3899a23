use super::ops::{apply, binary, compare, contains, get_item, set_item, unary};
use super::*;
use crate::error::LyneError;
use crate::path::OperatorId;

fn run(op: OperatorId, current: Value, args: Vec<Value>) -> Result<Value, LyneError> {
    apply(op, &current, &args, &Kwargs::new())
}

//==================================================================================
// Arithmetic
//==================================================================================

#[test]
fn test_integer_arithmetic_uses_floor_semantics() {
    assert_eq!(run(OperatorId::FloorDiv, Value::Int(-7), vec![Value::Int(2)]).unwrap(), Value::Int(-4));
    assert_eq!(run(OperatorId::Mod, Value::Int(-7), vec![Value::Int(2)]).unwrap(), Value::Int(1));
    assert_eq!(run(OperatorId::Mod, Value::Int(7), vec![Value::Int(-2)]).unwrap(), Value::Int(-1));
    assert_eq!(
        run(OperatorId::DivMod, Value::Int(7), vec![Value::Int(-2)]).unwrap(),
        Value::tuple(vec![Value::Int(-4), Value::Int(-1)])
    );
    assert_eq!(run(OperatorId::TrueDiv, Value::Int(7), vec![Value::Int(2)]).unwrap(), Value::Float(3.5));
}

#[test]
fn test_float_floor_mod_takes_divisor_sign() {
    assert_eq!(run(OperatorId::Mod, Value::Float(-1.5), vec![Value::Int(1)]).unwrap(), Value::Float(0.5));
    assert_eq!(run(OperatorId::FloorDiv, Value::Float(7.5), vec![Value::Int(2)]).unwrap(), Value::Float(3.0));
}

#[test]
fn test_checked_integer_overflow() {
    assert!(matches!(
        run(OperatorId::Add, Value::Int(i64::MAX), vec![Value::Int(1)]),
        Err(LyneError::Overflow(_))
    ));
    assert!(matches!(
        run(OperatorId::Neg, Value::Int(i64::MIN), vec![]),
        Err(LyneError::Overflow(_))
    ));
    assert!(matches!(
        run(OperatorId::LShift, Value::Int(1), vec![Value::Int(64)]),
        Err(LyneError::Overflow(_))
    ));
    assert_eq!(run(OperatorId::LShift, Value::Int(3), vec![Value::Int(2)]).unwrap(), Value::Int(12));
}

#[test]
fn test_division_by_zero() {
    for op in [OperatorId::TrueDiv, OperatorId::FloorDiv, OperatorId::Mod] {
        assert!(matches!(
            run(op, Value::Int(1), vec![Value::Int(0)]),
            Err(LyneError::ZeroDivision(_))
        ));
        assert!(matches!(
            run(op, Value::Float(1.0), vec![Value::Float(0.0)]),
            Err(LyneError::ZeroDivision(_))
        ));
    }
}

#[test]
fn test_power_rules() {
    assert_eq!(run(OperatorId::Pow, Value::Int(2), vec![Value::Int(10)]).unwrap(), Value::Int(1024));
    assert_eq!(run(OperatorId::Pow, Value::Int(2), vec![Value::Int(-1)]).unwrap(), Value::Float(0.5));
    assert!(matches!(
        run(OperatorId::Pow, Value::Int(0), vec![Value::Int(-1)]),
        Err(LyneError::ZeroDivision(_))
    ));
}

#[test]
fn test_reflected_operators_swap_operands() {
    // current=10, recorded `3 - chain` must compute 3 - 10.
    assert_eq!(run(OperatorId::RSub, Value::Int(10), vec![Value::Int(3)]).unwrap(), Value::Int(-7));
    assert_eq!(
        run(OperatorId::RTrueDiv, Value::Int(4), vec![Value::Int(2)]).unwrap(),
        Value::Float(0.5)
    );
}

#[test]
fn test_bool_bitwise_stays_bool() {
    assert_eq!(binary(OperatorId::And, &Value::Bool(true), &Value::Bool(false)).unwrap(), Value::Bool(false));
    assert!(matches!(
        binary(OperatorId::Or, &Value::Bool(true), &Value::Bool(false)).unwrap(),
        Value::Bool(true)
    ));
    assert!(matches!(binary(OperatorId::Add, &Value::Bool(true), &Value::Bool(true)).unwrap(), Value::Int(2)));
}

#[test]
fn test_complex_arithmetic() {
    let a = Value::Complex(Complex::new(1.0, 2.0));
    let b = Value::Complex(Complex::new(3.0, -1.0));
    assert_eq!(binary(OperatorId::Mul, &a, &b).unwrap(), Value::Complex(Complex::new(5.0, 5.0)));
    assert_eq!(binary(OperatorId::Add, &a, &Value::Int(1)).unwrap(), Value::Complex(Complex::new(2.0, 2.0)));
    assert!(matches!(binary(OperatorId::FloorDiv, &a, &b), Err(LyneError::Type(_))));
}

#[test]
fn test_sequence_concatenation_and_repetition() {
    assert_eq!(
        binary(OperatorId::Add, &Value::str("ab"), &Value::str("cd")).unwrap(),
        Value::str("abcd")
    );
    assert_eq!(binary(OperatorId::Mul, &Value::Int(2), &Value::str("ab")).unwrap(), Value::str("abab"));
    assert_eq!(
        binary(OperatorId::Mul, &Value::tuple(vec![Value::Int(1)]), &Value::Int(3)).unwrap(),
        Value::tuple(vec![Value::Int(1), Value::Int(1), Value::Int(1)])
    );
    let joined = binary(
        OperatorId::Add,
        &Value::list(vec![Value::Int(1)]),
        &Value::list(vec![Value::Int(2)]),
    )
    .unwrap();
    assert_eq!(joined, Value::list(vec![Value::Int(1), Value::Int(2)]));
}

#[test]
fn test_set_and_dict_operators() {
    let a = Value::set(vec![Value::Int(1), Value::Int(2)]);
    let b = Value::set(vec![Value::Int(2), Value::Int(3)]);
    assert_eq!(binary(OperatorId::And, &a, &b).unwrap(), Value::set(vec![Value::Int(2)]));
    assert_eq!(
        binary(OperatorId::Xor, &a, &b).unwrap(),
        Value::set(vec![Value::Int(1), Value::Int(3)])
    );
    assert_eq!(binary(OperatorId::Sub, &a, &b).unwrap(), Value::set(vec![Value::Int(1)]));

    let left = Value::dict(vec![(Value::str("k"), Value::Int(1))]).unwrap();
    let right = Value::dict(vec![(Value::str("k"), Value::Int(2)), (Value::str("j"), Value::Int(3))]).unwrap();
    assert_eq!(
        binary(OperatorId::Or, &left, &right).unwrap(),
        Value::dict(vec![(Value::str("k"), Value::Int(2)), (Value::str("j"), Value::Int(3))]).unwrap()
    );
}

#[test]
fn test_unsupported_operands_name_both_types() {
    let err = binary(OperatorId::Add, &Value::Int(1), &Value::str("x")).unwrap_err();
    assert_eq!(
        err.to_string(),
        LyneError::Type("unsupported operand type(s) for +: 'int' and 'str'".to_string()).to_string()
    );
}

//==================================================================================
// Comparisons
//==================================================================================

#[test]
fn test_ordering_comparisons() {
    let lt = |a: Value, b: Value| compare(OperatorId::Lt, &a, &b).unwrap();
    assert_eq!(lt(Value::Int(1), Value::Float(1.5)), Value::Bool(true));
    assert_eq!(lt(Value::str("abc"), Value::str("abd")), Value::Bool(true));
    assert_eq!(
        lt(Value::tuple(vec![Value::Int(1), Value::Int(2)]), Value::tuple(vec![Value::Int(1), Value::Int(3)])),
        Value::Bool(true)
    );
    assert_eq!(
        lt(Value::tuple(vec![Value::Int(1)]), Value::tuple(vec![Value::Int(1), Value::Int(0)])),
        Value::Bool(true)
    );
    assert_eq!(lt(Value::Float(f64::NAN), Value::Int(1)), Value::Bool(false));
    assert!(matches!(
        compare(OperatorId::Lt, &Value::Int(1), &Value::str("x")),
        Err(LyneError::Type(_))
    ));
}

#[test]
fn test_equality_never_fails() {
    assert_eq!(compare(OperatorId::Eq, &Value::Int(1), &Value::str("x")).unwrap(), Value::Bool(false));
    assert_eq!(compare(OperatorId::Ne, &Value::Int(1), &Value::Float(1.0)).unwrap(), Value::Bool(false));
}

//==================================================================================
// Access
//==================================================================================

#[test]
fn test_negative_indices() {
    let items = Value::list(vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
    assert_eq!(get_item(&items, &Value::Int(-1)).unwrap(), Value::Int(30));
    assert!(matches!(get_item(&items, &Value::Int(3)), Err(LyneError::Index(_))));
    assert!(matches!(get_item(&items, &Value::str("0")), Err(LyneError::Type(_))));
    assert_eq!(get_item(&Value::str("héllo"), &Value::Int(1)).unwrap(), Value::str("é"));
}

#[test]
fn test_set_item_on_shared_list() {
    let items = Value::list(vec![Value::Int(1), Value::Int(2)]);
    let alias = items.clone();
    set_item(&alias, &Value::Int(-1), Value::str("x")).unwrap();
    assert_eq!(items, Value::list(vec![Value::Int(1), Value::str("x")]));
    assert!(matches!(
        set_item(&Value::tuple(vec![Value::Int(1)]), &Value::Int(0), Value::None),
        Err(LyneError::Type(_))
    ));
}

#[test]
fn test_dict_missing_key() {
    let dict = Value::dict(vec![(Value::str("a"), Value::Int(1))]).unwrap();
    assert!(get_item(&dict, &Value::Float(1.0)).is_err());
    assert!(matches!(get_item(&dict, &Value::str("b")), Err(LyneError::Key(_))));
}

#[test]
fn test_containment() {
    assert!(contains(&Value::str("hello"), &Value::str("ell")).unwrap());
    assert!(contains(&Value::tuple(vec![Value::Int(1)]), &Value::Float(1.0)).unwrap());
    assert!(!contains(&Value::dict(vec![]).unwrap(), &Value::str("k")).unwrap());
    assert!(matches!(contains(&Value::Int(3), &Value::Int(3)), Err(LyneError::Type(_))));
    let ns = Namespace::new().with("mask", Value::None).into_value();
    assert!(contains(&ns, &Value::str("mask")).unwrap());
}

#[test]
fn test_complex_parts_are_attributes() {
    let c = Value::Complex(Complex::new(1.0, -2.0));
    assert_eq!(run(OperatorId::Attr, c.clone(), vec![Value::str("imag")]).unwrap(), Value::Float(-2.0));
    assert!(matches!(
        run(OperatorId::Attr, c, vec![Value::str("phase")]),
        Err(LyneError::Attribute { .. })
    ));
}

#[test]
fn test_arity_is_enforced() {
    assert!(matches!(
        run(OperatorId::GetItem, Value::list(vec![]), vec![]),
        Err(LyneError::Arity { operator: "getitem", got: 0, .. })
    ));
    assert!(matches!(
        run(OperatorId::Neg, Value::Int(1), vec![Value::Int(1)]),
        Err(LyneError::Arity { operator: "neg", got: 1, .. })
    ));
    assert!(matches!(
        run(OperatorId::Attr, Value::Int(1), vec![Value::Int(1)]),
        Err(LyneError::Type(_))
    ));
}

#[test]
fn test_kwargs_rejected_outside_calls() {
    let mut kwargs = Kwargs::new();
    kwargs.insert("k".to_string(), Value::Int(1));
    assert!(matches!(
        apply(OperatorId::Add, &Value::Int(1), &[Value::Int(1)], &kwargs),
        Err(LyneError::Type(_))
    ));
    let echo = Func::new("echo", |_args, kwargs| Ok(Value::Int(kwargs.len() as i64)));
    assert_eq!(apply(OperatorId::Call, &Value::Func(echo), &[], &kwargs).unwrap(), Value::Int(1));
}

//==================================================================================
// Unary & conversions
//==================================================================================

#[test]
fn test_round_half_to_even() {
    assert_eq!(unary(OperatorId::Round, &Value::Float(2.5), &[]).unwrap(), Value::Int(2));
    assert_eq!(unary(OperatorId::Round, &Value::Float(3.5), &[]).unwrap(), Value::Int(4));
    assert!(matches!(
        unary(OperatorId::Round, &Value::Float(0.125), &[Value::Int(2)]).unwrap(),
        Value::Float(f) if (f - 0.12).abs() < 1e-9
    ));
    assert_eq!(unary(OperatorId::Round, &Value::Int(1250), &[Value::Int(-2)]).unwrap(), Value::Int(1200));
    assert_eq!(unary(OperatorId::Round, &Value::Int(1350), &[Value::Int(-2)]).unwrap(), Value::Int(1400));
}

#[test]
fn test_numeric_conversions() {
    assert_eq!(unary(OperatorId::Int, &Value::Float(-2.7), &[]).unwrap(), Value::Int(-2));
    assert_eq!(unary(OperatorId::Floor, &Value::Float(-2.2), &[]).unwrap(), Value::Int(-3));
    assert_eq!(unary(OperatorId::Ceil, &Value::Float(-2.2), &[]).unwrap(), Value::Int(-2));
    assert_eq!(unary(OperatorId::Int, &Value::str(" 42 "), &[]).unwrap(), Value::Int(42));
    assert_eq!(unary(OperatorId::Float, &Value::Bool(true), &[]).unwrap(), Value::Float(1.0));
    assert_eq!(unary(OperatorId::Abs, &Value::Complex(Complex::new(3.0, 4.0)), &[]).unwrap(), Value::Float(5.0));
    assert_eq!(unary(OperatorId::Invert, &Value::Int(5), &[]).unwrap(), Value::Int(-6));
    assert!(matches!(unary(OperatorId::Index, &Value::Float(1.0), &[]), Err(LyneError::Type(_))));
    assert!(matches!(unary(OperatorId::Int, &Value::Float(f64::NAN), &[]), Err(LyneError::Value(_))));
    assert!(matches!(unary(OperatorId::Int, &Value::Float(1e300), &[]), Err(LyneError::Overflow(_))));
}

//==================================================================================
// Records
//==================================================================================

/// A record that only knows how to be added to, from either side.
#[derive(Debug)]
struct Meters(f64);

impl Record for Meters {
    fn type_name(&self) -> &str {
        "meters"
    }

    fn get_attr(&self, name: &str) -> Result<Value, LyneError> {
        Err(LyneError::Attribute {
            type_name: "meters".to_string(),
            name: name.to_string(),
        })
    }

    fn apply(&self, op: OperatorId, args: &[Value], _kwargs: &Kwargs) -> Result<Option<Value>, LyneError> {
        match (op, args) {
            (OperatorId::Add | OperatorId::RAdd, [Value::Float(f)]) => Ok(Some(Value::Float(self.0 + f))),
            (OperatorId::Gt, [Value::Float(f)]) => Ok(Some(Value::Bool(self.0 > *f))),
            _ => Ok(None),
        }
    }
}

#[test]
fn test_record_is_offered_forward_and_reflected_operators() {
    let m = Value::object(Meters(2.0));
    assert_eq!(binary(OperatorId::Add, &m, &Value::Float(1.0)).unwrap(), Value::Float(3.0));
    assert_eq!(binary(OperatorId::Add, &Value::Float(1.0), &m).unwrap(), Value::Float(3.0));
    assert!(matches!(binary(OperatorId::Sub, &m, &Value::Float(1.0)), Err(LyneError::Type(_))));
}

#[test]
fn test_record_comparison_is_swapped_when_on_the_right() {
    let m = Value::object(Meters(2.0));
    // 1.0 < m  holds iff  m > 1.0
    assert_eq!(compare(OperatorId::Lt, &Value::Float(1.0), &m).unwrap(), Value::Bool(true));
}
