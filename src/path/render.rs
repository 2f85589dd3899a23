// In: src/path/render.rs

//! Turns chains back into readable expressions, for diagnostics only.
//!
//! Rendering starts from the family letter and folds each step through a
//! per-operator template. `{text}` is the expression so far, `{fargs}` the
//! formatted arguments and `{name}` the bare first argument. Operators without
//! a template use `{text}.<operator>({fargs})`. No parentheses are inserted,
//! so `(P.x + 1) * 2` renders as `P.x + 1 * 2`.

use std::fmt;

use super::chain::{Chain, Operation};
use super::operator::OperatorId;
use crate::value::{self, Value};

//==================================================================================
// 1. Template Table
//==================================================================================

fn template(operation: &Operation) -> Option<&'static str> {
    use OperatorId::*;
    let template = match operation.op {
        Lt => "{text} < {fargs}",
        Le => "{text} <= {fargs}",
        Eq => "{text} == {fargs}",
        Ne => "{text} != {fargs}",
        Gt => "{text} > {fargs}",
        Ge => "{text} >= {fargs}",

        Attr => "{text}.{name}",
        GetItem => "{text}[{fargs}]",
        Contains => "{fargs} in {text}",
        Call => "{text}({fargs})",

        Add => "{text} + {fargs}",
        Sub => "{text} - {fargs}",
        Mul => "{text} * {fargs}",
        MatMul => "{text} @ {fargs}",
        TrueDiv => "{text} / {fargs}",
        FloorDiv => "{text} // {fargs}",
        Mod => "{text} % {fargs}",
        DivMod => "divmod({text}, {fargs})",
        Pow => "{text} ** {fargs}",
        LShift => "{text} << {fargs}",
        RShift => "{text} >> {fargs}",
        And => "{text} & {fargs}",
        Xor => "{text} ^ {fargs}",
        Or => "{text} | {fargs}",

        RAdd => "{fargs} + {text}",
        RSub => "{fargs} - {text}",
        RMul => "{fargs} * {text}",
        RMatMul => "{fargs} @ {text}",
        RTrueDiv => "{fargs} / {text}",
        RFloorDiv => "{fargs} // {text}",
        RMod => "{fargs} % {text}",
        RDivMod => "divmod({fargs}, {text})",
        RPow => "{fargs} ** {text}",
        RLShift => "{fargs} << {text}",
        RRShift => "{fargs} >> {text}",
        RAnd => "{fargs} & {text}",
        RXor => "{fargs} ^ {text}",
        ROr => "{fargs} | {text}",

        Neg => "-{text}",
        Pos => "+{text}",
        Abs => "abs({text})",
        Invert => "~{text}",

        Complex => "complex({text})",
        Int => "int({text})",
        Float => "float({text})",
        Index => "operator.index({text})",
        Round if operation.args.is_empty() => "round({text})",
        Round => "round({text}, {fargs})",
        Trunc => "math.trunc({text})",
        Floor => "math.floor({text})",
        Ceil => "math.ceil({text})",

        GetAttribute => return None,
    };
    Some(template)
}

fn format_arguments(operation: &Operation) -> String {
    let positional = operation.args.iter().map(|arg| arg.to_string());
    let keyword = operation
        .kwargs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value));
    positional.chain(keyword).collect::<Vec<_>>().join(", ")
}

/// Substitutes placeholders in one left-to-right scan, so text that happens
/// to contain `{fargs}` is never expanded twice.
fn fill(template: &str, text: &str, operation: &Operation) -> String {
    let mut out = String::with_capacity(template.len() + text.len() + 16);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{text}") {
            out.push_str(text);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{fargs}") {
            out.push_str(&format_arguments(operation));
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{name}") {
            match operation.args.first() {
                Some(Value::Str(name)) => out.push_str(name),
                Some(other) => out.push_str(&other.to_string()),
                None => {}
            }
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Renders `chain` as an expression, e.g. `P.foo[0] + 1`.
pub fn render(chain: &Chain) -> String {
    let mut text = chain.family().letter().to_string();
    for operation in chain.operations() {
        text = match template(operation) {
            Some(template) => fill(template, &text, operation),
            None => format!("{}.{}({})", text, operation.op.name(), format_arguments(operation)),
        };
    }
    text
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

//==================================================================================
// 2. Value Representation
//==================================================================================

fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("nan")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        write!(f, "{:?}", value)
    }
}

/// Complex parts drop a trailing `.0`.
fn write_complex_part(f: &mut fmt::Formatter<'_>, part: f64) -> fmt::Result {
    if part.is_finite() && part.fract() == 0.0 && part.abs() < 1e16 {
        write!(f, "{}", part as i64)
    } else {
        write_float(f, part)
    }
}

fn write_complex(f: &mut fmt::Formatter<'_>, c: &value::Complex) -> fmt::Result {
    if c.re == 0.0 && c.re.is_sign_positive() {
        write_complex_part(f, c.im)?;
        return f.write_str("j");
    }
    f.write_str("(")?;
    write_complex_part(f, c.re)?;
    if c.im >= 0.0 || c.im.is_nan() {
        f.write_str("+")?;
    }
    write_complex_part(f, c.im)?;
    f.write_str("j)")
}

fn write_str_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in s.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            other => write!(f, "{}", other)?,
        }
    }
    f.write_str("'")
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Values display as their literal representation: strings are quoted,
/// containers are bracketed, records use `Record::repr`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write_float(f, *x),
            Value::Complex(c) => write_complex(f, c),
            Value::Str(s) => write_str_literal(f, s),
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::List(items) => {
                f.write_str("[")?;
                write_items(f, &items.read())?;
                f.write_str("]")
            }
            Value::Set(items) if items.is_empty() => f.write_str("set()"),
            Value::Set(items) => {
                f.write_str("{")?;
                write_items(f, items)?;
                f.write_str("}")
            }
            Value::Dict(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.read().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Object(record) => f.write_str(&record.repr()),
            Value::Func(func) => write!(f, "<function {}>", func.name()),
            Value::Path(chain) => write!(f, "{}", chain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{item, output, plain, stream};
    use crate::value::{Complex, Func, Kwargs};

    #[test]
    fn test_attribute_index_and_arithmetic() {
        let chain = plain().attr("foo").item(0) + 1;
        assert_eq!(render(&chain), "P.foo[0] + 1");
    }

    #[test]
    fn test_family_letters() {
        assert_eq!(render(&plain()), "P");
        assert_eq!(stream().attr("x").to_string(), "S.x");
        assert_eq!(item().item("k").to_string(), "I['k']");
        assert_eq!(output().attr("mask").to_string(), "O.mask");
    }

    #[test]
    fn test_reflected_and_prefix_forms() {
        assert_eq!((2i64 - plain().attr("n")).to_string(), "2 - P.n");
        assert_eq!(plain().attr("n").divmod(3).to_string(), "divmod(P.n, 3)");
        assert_eq!(plain().attr("n").rdivmod(3).to_string(), "divmod(3, P.n)");
        assert_eq!((-plain().attr("n")).to_string(), "-P.n");
        assert_eq!((!plain().attr("n")).to_string(), "~P.n");
        assert_eq!(plain().attr("n").abs().to_string(), "abs(P.n)");
        assert_eq!(plain().attr("n").round(None).to_string(), "round(P.n)");
        assert_eq!(plain().attr("n").round(Some(2)).to_string(), "round(P.n, 2)");
        assert_eq!(plain().attr("n").pow(2).to_string(), "P.n ** 2");
    }

    #[test]
    fn test_conversion_forms_name_their_module() {
        let n = plain().attr("n");
        assert_eq!(n.as_index().to_string(), "operator.index(P.n)");
        assert_eq!(n.trunc().to_string(), "math.trunc(P.n)");
        assert_eq!(n.floor().to_string(), "math.floor(P.n)");
        assert_eq!(n.ceil().to_string(), "math.ceil(P.n)");
        assert_eq!(n.to_float().to_string(), "float(P.n)");
    }

    #[test]
    fn test_containment_and_calls() {
        let p = plain();
        assert_eq!(p.attr("tags").contains("red").to_string(), "'red' in P.tags");

        let mut kwargs = Kwargs::new();
        kwargs.insert("size".to_string(), Value::tuple(vec![Value::Int(3)]));
        let call = p.attr("resize").call_with(vec![p.attr("image").into()], kwargs);
        assert_eq!(call.to_string(), "P.resize(P.image, size=(3,))");
    }

    #[test]
    fn test_fallback_template() {
        assert_eq!(plain().getattribute("x").to_string(), "P.getattribute('x')");
    }

    #[test]
    fn test_no_parenthesization() {
        let chain = (plain().attr("x") + 1) * 2;
        assert_eq!(chain.to_string(), "P.x + 1 * 2");
    }

    #[test]
    fn test_placeholder_text_is_not_re_expanded() {
        let chain = plain().attr("{fargs}").item(1);
        assert_eq!(chain.to_string(), "P.{fargs}[1]");
    }

    #[test]
    fn test_value_repr() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::Complex(Complex::new(1.0, -2.0)).to_string(), "(1-2j)");
        assert_eq!(Value::Complex(Complex::new(0.0, 2.5)).to_string(), "2.5j");
        assert_eq!(Value::str("it's").to_string(), "'it\\'s'");
        assert_eq!(Value::set(Vec::new()).to_string(), "set()");
        assert_eq!(
            Value::dict(vec![(Value::str("a"), Value::list(vec![Value::None, Value::Bool(true)]))]).unwrap().to_string(),
            "{'a': [None, True]}"
        );
        let f = Func::unary("blur", |v| Ok(v.clone()));
        assert_eq!(plain().item(f).to_string(), "P[<function blur>]");
    }
}
