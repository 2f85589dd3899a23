// In: src/value/ops.rs

//! Operator semantics on runtime values.
//!
//! `apply` is the single entry point the resolver uses to replay one recorded
//! step against the current value. Records (`Value::Object`) are always offered
//! the operator first; built-in values follow numeric-tower rules with checked
//! integer arithmetic and floor-style division.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use num_traits::ToPrimitive;

use super::dynamic::{Complex, DictKey, Kwargs, Mapping, Value};
use crate::error::LyneError;
use crate::path::{OperatorId, OperatorKind};

//==================================================================================
// 0. Numeric Tower
//==================================================================================

/// A value viewed as a number. Booleans count as integers.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
    Complex(Complex),
}

impl Number {
    fn as_complex(self) -> Complex {
        match self {
            Number::Int(i) => Complex::new(i as f64, 0.0),
            Number::Float(f) => Complex::new(f, 0.0),
            Number::Complex(c) => c,
        }
    }

    fn as_f64(self) -> Option<f64> {
        match self {
            Number::Int(i) => Some(i as f64),
            Number::Float(f) => Some(f),
            Number::Complex(_) => None,
        }
    }

    pub(crate) fn num_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Complex(_), _) | (_, Number::Complex(_)) => {
                self.as_complex() == other.as_complex()
            }
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }

    /// Integral floats (and complex numbers with no imaginary part) hash as
    /// the matching integer so hashing agrees with `num_eq`.
    pub(crate) fn hash_into<H: Hasher>(self, state: &mut H) {
        let integral = match self {
            Number::Int(i) => Some(i),
            Number::Float(f) => float_as_exact_int(f),
            Number::Complex(c) if c.im == 0.0 => float_as_exact_int(c.re),
            Number::Complex(_) => None,
        };
        match (integral, self) {
            (Some(i), _) => {
                1u8.hash(state);
                i.hash(state);
            }
            (None, Number::Complex(c)) if c.im != 0.0 => {
                4u8.hash(state);
                c.re.to_bits().hash(state);
                c.im.to_bits().hash(state);
            }
            (None, other) => {
                3u8.hash(state);
                other.as_complex().re.to_bits().hash(state);
            }
        }
    }
}

fn float_as_exact_int(f: f64) -> Option<i64> {
    if f.fract() == 0.0 {
        f.to_i64()
    } else {
        None
    }
}

impl Value {
    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Complex(c) => Some(Number::Complex(*c)),
            _ => None,
        }
    }
}

//==================================================================================
// 1. Step Dispatch
//==================================================================================

/// Applies `op` to `current` with already-resolved arguments.
pub fn apply(
    op: OperatorId,
    current: &Value,
    args: &[Value],
    kwargs: &Kwargs,
) -> Result<Value, LyneError> {
    if op != OperatorId::Call && !kwargs.is_empty() {
        if let Value::Object(record) = current {
            if let Some(result) = record.apply(op, args, kwargs)? {
                return Ok(result);
            }
        }
        return Err(LyneError::Type(format!(
            "'{}' does not accept keyword arguments",
            op.name()
        )));
    }

    match op.kind() {
        OperatorKind::Access => match op {
            OperatorId::Attr | OperatorId::GetAttribute => {
                get_attr(current, expect_name(op, args)?)
            }
            OperatorId::GetItem => get_item(current, expect_one(op, args)?),
            OperatorId::Contains => contains(current, expect_one(op, args)?).map(Value::Bool),
            _ => call(current, args, kwargs),
        },
        OperatorKind::Comparison => compare(op, current, expect_one(op, args)?),
        OperatorKind::Binary => binary(op, current, expect_one(op, args)?),
        OperatorKind::Reflected => binary(op.forward(), expect_one(op, args)?, current),
        OperatorKind::Unary | OperatorKind::Conversion => unary(op, current, args),
    }
}

fn expect_one(op: OperatorId, args: &[Value]) -> Result<&Value, LyneError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(LyneError::Arity {
            operator: op.name(),
            expected: "exactly 1",
            got: args.len(),
        }),
    }
}

fn expect_name(op: OperatorId, args: &[Value]) -> Result<&str, LyneError> {
    let arg = expect_one(op, args)?;
    arg.as_str().ok_or_else(|| {
        LyneError::Type(format!(
            "attribute name must be string, not '{}'",
            arg.type_name()
        ))
    })
}

//==================================================================================
// 2. Access: attributes, items, calls, containment
//==================================================================================

pub fn get_attr(target: &Value, name: &str) -> Result<Value, LyneError> {
    match (target, name) {
        (Value::Object(record), _) => record.get_attr(name),
        (Value::Complex(c), "real") => Ok(Value::Float(c.re)),
        (Value::Complex(c), "imag") => Ok(Value::Float(c.im)),
        _ => Err(no_attribute(target, name)),
    }
}

pub fn set_attr(target: &Value, name: &str, value: Value) -> Result<(), LyneError> {
    match target {
        Value::Object(record) => record.set_attr(name, value),
        _ => Err(no_attribute(target, name)),
    }
}

fn no_attribute(target: &Value, name: &str) -> LyneError {
    LyneError::Attribute {
        type_name: target.type_name().to_string(),
        name: name.to_string(),
    }
}

pub fn get_item(target: &Value, key: &Value) -> Result<Value, LyneError> {
    match target {
        Value::Tuple(items) => {
            let index = sequence_index(target, key, items.len())?;
            Ok(items[index].clone())
        }
        Value::List(items) => {
            let items = items.read();
            let index = sequence_index(target, key, items.len())?;
            Ok(items[index].clone())
        }
        Value::Str(s) => {
            let count = s.chars().count();
            let index = sequence_index(target, key, count)?;
            let ch = s.chars().nth(index).unwrap_or_default();
            Ok(Value::Str(ch.to_string()))
        }
        Value::Dict(map) => map
            .read()
            .get(key)?
            .cloned()
            .ok_or_else(|| LyneError::Key(key.to_string())),
        Value::Object(record) => record.get_item(key),
        _ => Err(LyneError::Type(format!(
            "'{}' object is not subscriptable",
            target.type_name()
        ))),
    }
}

pub fn set_item(target: &Value, key: &Value, value: Value) -> Result<(), LyneError> {
    match target {
        Value::List(items) => {
            let mut items = items.write();
            let index = sequence_index(target, key, items.len())?;
            items[index] = value;
            Ok(())
        }
        Value::Dict(map) => {
            // Hash before locking: a key that is this very dict must fail, not wait.
            let key = DictKey::new(key.clone())?;
            map.write().insert_key(key, value);
            Ok(())
        }
        Value::Object(record) => record.set_item(key, value),
        _ => Err(LyneError::Type(format!(
            "'{}' object does not support item assignment",
            target.type_name()
        ))),
    }
}

/// Resolves a (possibly negative) index against a sequence of `len` items.
fn sequence_index(target: &Value, key: &Value, len: usize) -> Result<usize, LyneError> {
    let raw = key.as_int().ok_or_else(|| {
        LyneError::Type(format!(
            "{} indices must be integers, not '{}'",
            target.type_name(),
            key.type_name()
        ))
    })?;
    let len_i = len as i64;
    let index = if raw < 0 { raw + len_i } else { raw };
    if (0..len_i).contains(&index) {
        Ok(index as usize)
    } else {
        Err(LyneError::Index(format!(
            "{} index {} out of range for length {}",
            target.type_name(),
            raw,
            len
        )))
    }
}

pub fn call(target: &Value, args: &[Value], kwargs: &Kwargs) -> Result<Value, LyneError> {
    match target {
        Value::Func(func) => func.invoke(args, kwargs),
        Value::Object(record) => record.call(args, kwargs),
        _ => Err(LyneError::Type(format!(
            "'{}' object is not callable",
            target.type_name()
        ))),
    }
}

/// `item in container`.
pub fn contains(container: &Value, item: &Value) -> Result<bool, LyneError> {
    match container {
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(needle.as_str())),
            _ => Err(LyneError::Type(format!(
                "'in <string>' requires string as left operand, not {}",
                item.type_name()
            ))),
        },
        Value::Tuple(items) | Value::Set(items) => Ok(items.contains(item)),
        Value::List(items) => Ok(items.read().contains(item)),
        Value::Dict(map) => map.read().contains_key(item),
        Value::Object(record) => {
            match record.apply(OperatorId::Contains, std::slice::from_ref(item), &Kwargs::new())? {
                Some(result) => Ok(result.is_truthy()),
                None => Err(not_iterable(container)),
            }
        }
        _ => Err(not_iterable(container)),
    }
}

fn not_iterable(container: &Value) -> LyneError {
    LyneError::Type(format!(
        "argument of type '{}' is not iterable",
        container.type_name()
    ))
}

//==================================================================================
// 3. Comparisons
//==================================================================================

pub fn compare(op: OperatorId, lhs: &Value, rhs: &Value) -> Result<Value, LyneError> {
    if let Value::Object(record) = lhs {
        if let Some(result) = record.apply(op, std::slice::from_ref(rhs), &Kwargs::new())? {
            return Ok(result);
        }
    }
    if let Value::Object(record) = rhs {
        let swapped = op.swapped_comparison();
        if let Some(result) = record.apply(swapped, std::slice::from_ref(lhs), &Kwargs::new())? {
            return Ok(result);
        }
    }

    let outcome = match op {
        OperatorId::Eq => lhs == rhs,
        OperatorId::Ne => lhs != rhs,
        _ => {
            let ordering = partial_order(op, lhs, rhs)?;
            match op {
                OperatorId::Lt => ordering == Some(Ordering::Less),
                OperatorId::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                OperatorId::Gt => ordering == Some(Ordering::Greater),
                _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            }
        }
    };
    Ok(Value::Bool(outcome))
}

/// Orders two values; `Ok(None)` means unordered (NaN involved).
fn partial_order(op: OperatorId, lhs: &Value, rhs: &Value) -> Result<Option<Ordering>, LyneError> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Tuple(a), Value::Tuple(b)) => lexicographic(op, a, b),
        (Value::List(a), Value::List(b)) => {
            if std::sync::Arc::ptr_eq(a, b) {
                return Ok(Some(Ordering::Equal));
            }
            let (a, b) = (a.read().clone(), b.read().clone());
            lexicographic(op, &a, &b)
        }
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(Some(a.cmp(&b))),
            (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(x.partial_cmp(&y)),
                _ => Err(not_supported(op, lhs, rhs)),
            },
            _ => Err(not_supported(op, lhs, rhs)),
        },
    }
}

fn lexicographic(op: OperatorId, a: &[Value], b: &[Value]) -> Result<Option<Ordering>, LyneError> {
    for (x, y) in a.iter().zip(b) {
        if x != y {
            return partial_order(op, x, y);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

fn not_supported(op: OperatorId, lhs: &Value, rhs: &Value) -> LyneError {
    LyneError::Type(format!(
        "'{}' not supported between instances of '{}' and '{}'",
        op.symbol().unwrap_or(op.name()),
        lhs.type_name(),
        rhs.type_name()
    ))
}

//==================================================================================
// 4. Binary Arithmetic & Bitwise
//==================================================================================

/// Evaluates the forward binary operator `op` as `lhs op rhs`.
///
/// A record on the left is offered `op`; a record on the right is offered the
/// reflected operator with `lhs` as its argument.
pub fn binary(op: OperatorId, lhs: &Value, rhs: &Value) -> Result<Value, LyneError> {
    if let Value::Object(record) = lhs {
        if let Some(result) = record.apply(op, std::slice::from_ref(rhs), &Kwargs::new())? {
            return Ok(result);
        }
    }
    if let Value::Object(record) = rhs {
        let reflected = op.reflected();
        if let Some(result) = record.apply(reflected, std::slice::from_ref(lhs), &Kwargs::new())? {
            return Ok(result);
        }
    }

    let result = match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) if matches!(op, OperatorId::And | OperatorId::Or | OperatorId::Xor) => {
            Some(Value::Bool(match op {
                OperatorId::And => a & b,
                OperatorId::Or => a | b,
                _ => a ^ b,
            }))
        }
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => numeric(op, a, b)?,
            _ => sequence(op, lhs, rhs)?,
        },
    };

    result.ok_or_else(|| {
        LyneError::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol().unwrap_or(op.name()),
            lhs.type_name(),
            rhs.type_name()
        ))
    })
}

fn numeric(op: OperatorId, a: Number, b: Number) -> Result<Option<Value>, LyneError> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => int_op(op, x, y),
        (Number::Complex(_), _) | (_, Number::Complex(_)) => complex_op(op, a.as_complex(), b.as_complex()),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => float_op(op, x, y),
            _ => Ok(None),
        },
    }
}

fn overflow(op: OperatorId) -> LyneError {
    LyneError::Overflow(format!("result of '{}' does not fit in a 64-bit integer", op.name()))
}

fn int_floor_div(op: OperatorId, x: i64, y: i64) -> Result<i64, LyneError> {
    if y == 0 {
        return Err(LyneError::ZeroDivision("integer division or modulo by zero".to_string()));
    }
    let quotient = x.checked_div(y).ok_or_else(|| overflow(op))?;
    if x.wrapping_rem(y) != 0 && ((x < 0) != (y < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn int_floor_mod(x: i64, y: i64) -> Result<i64, LyneError> {
    if y == 0 {
        return Err(LyneError::ZeroDivision("integer division or modulo by zero".to_string()));
    }
    let remainder = x.wrapping_rem(y);
    if remainder != 0 && ((remainder < 0) != (y < 0)) {
        Ok(remainder + y)
    } else {
        Ok(remainder)
    }
}

fn int_op(op: OperatorId, x: i64, y: i64) -> Result<Option<Value>, LyneError> {
    let value = match op {
        OperatorId::Add => Value::Int(x.checked_add(y).ok_or_else(|| overflow(op))?),
        OperatorId::Sub => Value::Int(x.checked_sub(y).ok_or_else(|| overflow(op))?),
        OperatorId::Mul => Value::Int(x.checked_mul(y).ok_or_else(|| overflow(op))?),
        OperatorId::TrueDiv => {
            if y == 0 {
                return Err(LyneError::ZeroDivision("division by zero".to_string()));
            }
            Value::Float(x as f64 / y as f64)
        }
        OperatorId::FloorDiv => Value::Int(int_floor_div(op, x, y)?),
        OperatorId::Mod => Value::Int(int_floor_mod(x, y)?),
        OperatorId::DivMod => Value::Tuple(vec![
            Value::Int(int_floor_div(op, x, y)?),
            Value::Int(int_floor_mod(x, y)?),
        ]),
        OperatorId::Pow => {
            if y >= 0 {
                let exponent = u32::try_from(y).map_err(|_| overflow(op))?;
                Value::Int(x.checked_pow(exponent).ok_or_else(|| overflow(op))?)
            } else if x == 0 {
                return Err(LyneError::ZeroDivision(
                    "0 cannot be raised to a negative power".to_string(),
                ));
            } else {
                Value::Float((x as f64).powf(y as f64))
            }
        }
        OperatorId::LShift => {
            if y < 0 {
                return Err(LyneError::Value("negative shift count".to_string()));
            }
            if x == 0 {
                Value::Int(0)
            } else if y >= 63 {
                return Err(overflow(op));
            } else {
                let shifted = x << y;
                if shifted >> y != x {
                    return Err(overflow(op));
                }
                Value::Int(shifted)
            }
        }
        OperatorId::RShift => {
            if y < 0 {
                return Err(LyneError::Value("negative shift count".to_string()));
            }
            Value::Int(if y >= 64 { if x < 0 { -1 } else { 0 } } else { x >> y })
        }
        OperatorId::And => Value::Int(x & y),
        OperatorId::Or => Value::Int(x | y),
        OperatorId::Xor => Value::Int(x ^ y),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn float_floor_mod(x: f64, y: f64) -> f64 {
    let remainder = x % y;
    if remainder != 0.0 && ((remainder < 0.0) != (y < 0.0)) {
        remainder + y
    } else {
        remainder
    }
}

fn float_op(op: OperatorId, x: f64, y: f64) -> Result<Option<Value>, LyneError> {
    let divides = matches!(
        op,
        OperatorId::TrueDiv | OperatorId::FloorDiv | OperatorId::Mod | OperatorId::DivMod
    );
    if divides && y == 0.0 {
        return Err(LyneError::ZeroDivision("float division by zero".to_string()));
    }
    let value = match op {
        OperatorId::Add => x + y,
        OperatorId::Sub => x - y,
        OperatorId::Mul => x * y,
        OperatorId::TrueDiv => x / y,
        OperatorId::FloorDiv => (x / y).floor(),
        OperatorId::Mod => float_floor_mod(x, y),
        OperatorId::DivMod => {
            return Ok(Some(Value::Tuple(vec![
                Value::Float((x / y).floor()),
                Value::Float(float_floor_mod(x, y)),
            ])))
        }
        OperatorId::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(LyneError::ZeroDivision(
                    "0.0 cannot be raised to a negative power".to_string(),
                ));
            }
            if x < 0.0 && y.fract() != 0.0 {
                return Err(LyneError::Value(
                    "negative number cannot be raised to a fractional power".to_string(),
                ));
            }
            x.powf(y)
        }
        _ => return Ok(None),
    };
    Ok(Some(Value::Float(value)))
}

fn complex_op(op: OperatorId, a: Complex, b: Complex) -> Result<Option<Value>, LyneError> {
    let value = match op {
        OperatorId::Add => Complex::new(a.re + b.re, a.im + b.im),
        OperatorId::Sub => Complex::new(a.re - b.re, a.im - b.im),
        OperatorId::Mul => Complex::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re),
        OperatorId::TrueDiv => {
            let denominator = b.re * b.re + b.im * b.im;
            if denominator == 0.0 {
                return Err(LyneError::ZeroDivision("complex division by zero".to_string()));
            }
            Complex::new(
                (a.re * b.re + a.im * b.im) / denominator,
                (a.im * b.re - a.re * b.im) / denominator,
            )
        }
        _ => return Ok(None),
    };
    Ok(Some(Value::Complex(value)))
}

fn repeat<T: Clone>(items: &[T], times: i64, op: OperatorId) -> Result<Vec<T>, LyneError> {
    let times = usize::try_from(times.max(0)).map_err(|_| overflow(op))?;
    let total = items.len().checked_mul(times).ok_or_else(|| overflow(op))?;
    Ok(items.iter().cloned().cycle().take(total).collect())
}

fn sequence(op: OperatorId, lhs: &Value, rhs: &Value) -> Result<Option<Value>, LyneError> {
    let value = match (op, lhs, rhs) {
        (OperatorId::Add, Value::Str(a), Value::Str(b)) => Value::Str(format!("{a}{b}")),
        (OperatorId::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Value::Tuple(a.iter().chain(b).cloned().collect())
        }
        (OperatorId::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.read().clone();
            items.extend(b.read().iter().cloned());
            Value::list(items)
        }
        (OperatorId::Mul, seq, count) | (OperatorId::Mul, count, seq)
            if count.as_int().is_some() && is_repeatable(seq) =>
        {
            let times = count.as_int().unwrap_or_default();
            match seq {
                Value::Str(s) => {
                    let chars: Vec<char> = s.chars().collect();
                    Value::Str(repeat(&chars, times, op)?.into_iter().collect())
                }
                Value::Tuple(items) => Value::Tuple(repeat(items, times, op)?),
                Value::List(items) => {
                    let items = items.read().clone();
                    Value::list(repeat(&items, times, op)?)
                }
                _ => return Ok(None),
            }
        }
        (_, Value::Set(a), Value::Set(b)) => {
            let items: Vec<Value> = match op {
                OperatorId::Or => a.iter().chain(b).cloned().collect(),
                OperatorId::And => a.iter().filter(|x| b.contains(x)).cloned().collect(),
                OperatorId::Sub => a.iter().filter(|x| !b.contains(x)).cloned().collect(),
                OperatorId::Xor => a
                    .iter()
                    .filter(|x| !b.contains(x))
                    .chain(b.iter().filter(|x| !a.contains(x)))
                    .cloned()
                    .collect(),
                _ => return Ok(None),
            };
            Value::set(items)
        }
        (OperatorId::Or, Value::Dict(a), Value::Dict(b)) => {
            let mut merged: Mapping = a.read().clone();
            merged.extend_from(&b.read());
            Value::from(merged)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn is_repeatable(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::Tuple(_) | Value::List(_))
}

//==================================================================================
// 5. Unary Operators & Numeric Conversions
//==================================================================================

pub fn unary(op: OperatorId, operand: &Value, args: &[Value]) -> Result<Value, LyneError> {
    if let Value::Object(record) = operand {
        if let Some(result) = record.apply(op, args, &Kwargs::new())? {
            return Ok(result);
        }
    }

    if op == OperatorId::Round {
        return match args {
            [] => round(operand, None),
            [Value::None] => round(operand, None),
            [ndigits] => {
                let ndigits = ndigits.as_int().ok_or_else(|| {
                    LyneError::Type(format!(
                        "'{}' object cannot be interpreted as an integer",
                        ndigits.type_name()
                    ))
                })?;
                round(operand, Some(ndigits))
            }
            _ => Err(LyneError::Arity {
                operator: op.name(),
                expected: "at most 1",
                got: args.len(),
            }),
        };
    }
    if !args.is_empty() {
        return Err(LyneError::Arity {
            operator: op.name(),
            expected: "no",
            got: args.len(),
        });
    }

    let bad_operand = || {
        LyneError::Type(format!(
            "bad operand type for {}(): '{}'",
            op.name(),
            operand.type_name()
        ))
    };

    match op {
        OperatorId::Neg => match operand.as_number().ok_or_else(bad_operand)? {
            Number::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(|| overflow(op)),
            Number::Float(f) => Ok(Value::Float(-f)),
            Number::Complex(c) => Ok(Value::Complex(Complex::new(-c.re, -c.im))),
        },
        OperatorId::Pos => match operand.as_number().ok_or_else(bad_operand)? {
            Number::Int(i) => Ok(Value::Int(i)),
            Number::Float(f) => Ok(Value::Float(f)),
            Number::Complex(c) => Ok(Value::Complex(c)),
        },
        OperatorId::Abs => match operand.as_number().ok_or_else(bad_operand)? {
            Number::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| overflow(op)),
            Number::Float(f) => Ok(Value::Float(f.abs())),
            Number::Complex(c) => Ok(Value::Float(c.re.hypot(c.im))),
        },
        OperatorId::Invert => operand.as_int().map(|i| Value::Int(!i)).ok_or_else(bad_operand),
        OperatorId::Complex => match operand {
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(|re| Value::Complex(Complex::new(re, 0.0)))
                .map_err(|_| LyneError::Value(format!("could not convert string to complex: {s:?}"))),
            _ => operand
                .as_number()
                .map(|n| Value::Complex(n.as_complex()))
                .ok_or_else(bad_operand),
        },
        OperatorId::Int => match operand {
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| LyneError::Value(format!("invalid literal for int(): {s:?}"))),
            _ => match operand.as_number().ok_or_else(bad_operand)? {
                Number::Int(i) => Ok(Value::Int(i)),
                Number::Float(f) => float_to_int(op, f.trunc()),
                Number::Complex(_) => Err(bad_operand()),
            },
        },
        OperatorId::Float => match operand {
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| LyneError::Value(format!("could not convert string to float: {s:?}"))),
            _ => operand
                .as_number()
                .and_then(Number::as_f64)
                .map(Value::Float)
                .ok_or_else(bad_operand),
        },
        OperatorId::Index => operand.as_int().map(Value::Int).ok_or_else(|| {
            LyneError::Type(format!(
                "'{}' object cannot be interpreted as an integer",
                operand.type_name()
            ))
        }),
        OperatorId::Trunc | OperatorId::Floor | OperatorId::Ceil => {
            match operand.as_number().ok_or_else(bad_operand)? {
                Number::Int(i) => Ok(Value::Int(i)),
                Number::Float(f) => float_to_int(
                    op,
                    match op {
                        OperatorId::Trunc => f.trunc(),
                        OperatorId::Floor => f.floor(),
                        _ => f.ceil(),
                    },
                ),
                Number::Complex(_) => Err(bad_operand()),
            }
        }
        _ => Err(bad_operand()),
    }
}

fn float_to_int(op: OperatorId, f: f64) -> Result<Value, LyneError> {
    if f.is_nan() {
        return Err(LyneError::Value("cannot convert float NaN to integer".to_string()));
    }
    f.to_i64().map(Value::Int).ok_or_else(|| overflow(op))
}

/// Round half to even. Without `ndigits` the result is an `Int`; with it the
/// result keeps the operand's kind.
fn round(operand: &Value, ndigits: Option<i64>) -> Result<Value, LyneError> {
    let op = OperatorId::Round;
    match (operand.as_number(), ndigits) {
        (Some(Number::Int(i)), None) => Ok(Value::Int(i)),
        (Some(Number::Float(f)), None) => float_to_int(op, f.round_ties_even()),
        (Some(Number::Int(i)), Some(n)) if n >= 0 => Ok(Value::Int(i)),
        (Some(Number::Int(i)), Some(n)) => {
            let Some(scale) = u32::try_from(-n).ok().and_then(|e| 10i64.checked_pow(e)) else {
                return Ok(Value::Int(0));
            };
            let quotient = int_floor_div(op, i, scale)?;
            let remainder = i - quotient * scale;
            let twice = remainder * 2;
            let bumped = twice > scale || (twice == scale && quotient % 2 != 0);
            let quotient = if bumped { quotient + 1 } else { quotient };
            quotient.checked_mul(scale).map(Value::Int).ok_or_else(|| overflow(op))
        }
        (Some(Number::Float(f)), Some(n)) => {
            if !f.is_finite() || n > 308 {
                return Ok(Value::Float(f));
            }
            let exponent = i32::try_from(n.clamp(-308, 308)).unwrap_or_default();
            let scale = 10f64.powi(exponent.abs());
            let rounded = if exponent >= 0 {
                (f * scale).round_ties_even() / scale
            } else {
                (f / scale).round_ties_even() * scale
            };
            Ok(Value::Float(rounded))
        }
        _ => Err(LyneError::Type(format!(
            "type {} doesn't define round()",
            operand.type_name()
        ))),
    }
}
