// In: src/path/operator.rs

//! The closed set of operators a chain can record.
//!
//! Every step of a chain names exactly one `OperatorId`. In-place operators
//! have no identifier of their own: `x += 1` is recorded as `Add`.

use serde::{Deserialize, Serialize};

/// Identifies the operator of one recorded step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperatorId {
    // --- Comparisons ---
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,

    // --- Access ---
    /// `.name` attribute access.
    Attr,
    /// Generic attribute read. Path-only like `Attr`, but rendered through the
    /// fallback template.
    GetAttribute,
    GetItem,
    Contains,
    Call,

    // --- Arithmetic & bitwise ---
    Add,
    Sub,
    Mul,
    MatMul,
    TrueDiv,
    FloorDiv,
    Mod,
    DivMod,
    Pow,
    LShift,
    RShift,
    And,
    Xor,
    Or,

    // --- Reflected arithmetic & bitwise ---
    RAdd,
    RSub,
    RMul,
    RMatMul,
    RTrueDiv,
    RFloorDiv,
    RMod,
    RDivMod,
    RPow,
    RLShift,
    RRShift,
    RAnd,
    RXor,
    ROr,

    // --- Unary ---
    Neg,
    Pos,
    Abs,
    Invert,

    // --- Numeric conversions ---
    Complex,
    Int,
    Float,
    Index,
    Round,
    Trunc,
    Floor,
    Ceil,
}

/// Coarse grouping used by the resolver to pick an evaluation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Comparison,
    Access,
    Binary,
    Reflected,
    Unary,
    Conversion,
}

impl OperatorId {
    pub const ALL: [OperatorId; 51] = {
        use OperatorId::*;
        [
            Lt, Le, Eq, Ne, Gt, Ge, Attr, GetAttribute, GetItem, Contains, Call, Add, Sub, Mul,
            MatMul, TrueDiv, FloorDiv, Mod, DivMod, Pow, LShift, RShift, And, Xor, Or, RAdd, RSub,
            RMul, RMatMul, RTrueDiv, RFloorDiv, RMod, RDivMod, RPow, RLShift, RRShift, RAnd, RXor,
            ROr, Neg, Pos, Abs, Invert, Complex, Int, Float, Index, Round, Trunc, Floor, Ceil,
        ]
    };

    pub fn kind(self) -> OperatorKind {
        use OperatorId::*;
        match self {
            Lt | Le | Eq | Ne | Gt | Ge => OperatorKind::Comparison,
            Attr | GetAttribute | GetItem | Contains | Call => OperatorKind::Access,
            Add | Sub | Mul | MatMul | TrueDiv | FloorDiv | Mod | DivMod | Pow | LShift | RShift
            | And | Xor | Or => OperatorKind::Binary,
            RAdd | RSub | RMul | RMatMul | RTrueDiv | RFloorDiv | RMod | RDivMod | RPow
            | RLShift | RRShift | RAnd | RXor | ROr => OperatorKind::Reflected,
            Neg | Pos | Abs | Invert => OperatorKind::Unary,
            Complex | Int | Float | Index | Round | Trunc | Floor | Ceil => OperatorKind::Conversion,
        }
    }

    /// Stable lowercase name, used in error messages and the fallback
    /// rendering template.
    pub fn name(self) -> &'static str {
        use OperatorId::*;
        match self {
            Lt => "lt",
            Le => "le",
            Eq => "eq",
            Ne => "ne",
            Gt => "gt",
            Ge => "ge",
            Attr => "getattr",
            GetAttribute => "getattribute",
            GetItem => "getitem",
            Contains => "contains",
            Call => "call",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            MatMul => "matmul",
            TrueDiv => "truediv",
            FloorDiv => "floordiv",
            Mod => "mod",
            DivMod => "divmod",
            Pow => "pow",
            LShift => "lshift",
            RShift => "rshift",
            And => "and",
            Xor => "xor",
            Or => "or",
            RAdd => "radd",
            RSub => "rsub",
            RMul => "rmul",
            RMatMul => "rmatmul",
            RTrueDiv => "rtruediv",
            RFloorDiv => "rfloordiv",
            RMod => "rmod",
            RDivMod => "rdivmod",
            RPow => "rpow",
            RLShift => "rlshift",
            RRShift => "rrshift",
            RAnd => "rand",
            RXor => "rxor",
            ROr => "ror",
            Neg => "neg",
            Pos => "pos",
            Abs => "abs",
            Invert => "invert",
            Complex => "complex",
            Int => "int",
            Float => "float",
            Index => "index",
            Round => "round",
            Trunc => "trunc",
            Floor => "floor",
            Ceil => "ceil",
        }
    }

    /// The infix symbol of a comparison or (reflected) binary operator.
    pub fn symbol(self) -> Option<&'static str> {
        use OperatorId::*;
        let symbol = match self.forward() {
            Lt => "<",
            Le => "<=",
            Eq => "==",
            Ne => "!=",
            Gt => ">",
            Ge => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            MatMul => "@",
            TrueDiv => "/",
            FloorDiv => "//",
            Mod => "%",
            DivMod => "divmod()",
            Pow => "**",
            LShift => "<<",
            RShift => ">>",
            And => "&",
            Xor => "^",
            Or => "|",
            _ => return None,
        };
        Some(symbol)
    }

    /// Maps a forward binary operator to its reflected form and back.
    /// Every other operator maps to itself.
    pub fn reflected(self) -> OperatorId {
        use OperatorId::*;
        match self {
            Add => RAdd,
            Sub => RSub,
            Mul => RMul,
            MatMul => RMatMul,
            TrueDiv => RTrueDiv,
            FloorDiv => RFloorDiv,
            Mod => RMod,
            DivMod => RDivMod,
            Pow => RPow,
            LShift => RLShift,
            RShift => RRShift,
            And => RAnd,
            Xor => RXor,
            Or => ROr,
            RAdd => Add,
            RSub => Sub,
            RMul => Mul,
            RMatMul => MatMul,
            RTrueDiv => TrueDiv,
            RFloorDiv => FloorDiv,
            RMod => Mod,
            RDivMod => DivMod,
            RPow => Pow,
            RLShift => LShift,
            RRShift => RShift,
            RAnd => And,
            RXor => Xor,
            ROr => Or,
            other => other,
        }
    }

    /// The forward form of a reflected operator; identity otherwise.
    pub fn forward(self) -> OperatorId {
        match self.kind() {
            OperatorKind::Reflected => self.reflected(),
            _ => self,
        }
    }

    /// The comparison that holds with both operands swapped (`a < b` iff `b > a`).
    pub fn swapped_comparison(self) -> OperatorId {
        use OperatorId::*;
        match self {
            Lt => Gt,
            Le => Ge,
            Gt => Lt,
            Ge => Le,
            other => other,
        }
    }

    /// True for the steps a path-only chain may contain.
    pub fn is_path_step(self) -> bool {
        matches!(
            self,
            OperatorId::Attr | OperatorId::GetAttribute | OperatorId::GetItem
        )
    }

    pub fn is_attribute_read(self) -> bool {
        matches!(self, OperatorId::Attr | OperatorId::GetAttribute)
    }
}
