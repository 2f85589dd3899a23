// In: src/path/surface.rs

//! The recording surface: every way of building a chain.
//!
//! Each builder appends exactly one `Operation` and returns a new chain.
//! Nothing is evaluated here. Operator syntax (`chain + 1`, `-chain`,
//! `2 * chain`, `chain += 1`) is routed through the std operator traits onto
//! the same builders.

use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

use super::chain::{Chain, Operation};
use super::operator::OperatorId;
use crate::value::{Kwargs, Value};

//==================================================================================
// 1. Builder Methods
//==================================================================================

impl Chain {
    /// The single generic append every other builder goes through.
    pub fn apply(&self, op: OperatorId, args: Vec<Value>, kwargs: Kwargs) -> Chain {
        self.append(Operation::new(op, args, kwargs))
    }

    fn unary_step(&self, op: OperatorId) -> Chain {
        self.apply(op, Vec::new(), Kwargs::new())
    }

    fn binary_step(&self, op: OperatorId, operand: impl Into<Value>) -> Chain {
        self.apply(op, vec![operand.into()], Kwargs::new())
    }

    // --- Access ---

    /// `.name`
    pub fn attr(&self, name: impl Into<String>) -> Chain {
        self.binary_step(OperatorId::Attr, Value::Str(name.into()))
    }

    /// Generic attribute read; path-only like `attr`.
    pub fn getattribute(&self, name: impl Into<String>) -> Chain {
        self.binary_step(OperatorId::GetAttribute, Value::Str(name.into()))
    }

    /// `[key]`. A function key makes the chain function-wrapped.
    pub fn item(&self, key: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::GetItem, key)
    }

    /// `value in chain`
    pub fn contains(&self, value: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Contains, value)
    }

    pub fn call(&self, args: Vec<Value>) -> Chain {
        self.apply(OperatorId::Call, args, Kwargs::new())
    }

    pub fn call_with(&self, args: Vec<Value>, kwargs: Kwargs) -> Chain {
        self.apply(OperatorId::Call, args, kwargs)
    }

    // --- Comparisons ---

    pub fn lt(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Lt, other)
    }

    pub fn le(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Le, other)
    }

    pub fn equals(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Eq, other)
    }

    pub fn not_equals(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Ne, other)
    }

    pub fn gt(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Ge, other)
    }

    // --- Arithmetic without std operator syntax ---

    pub fn matmul(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::MatMul, other)
    }

    pub fn floordiv(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::FloorDiv, other)
    }

    pub fn divmod(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::DivMod, other)
    }

    pub fn pow(&self, other: impl Into<Value>) -> Chain {
        self.binary_step(OperatorId::Pow, other)
    }

    // --- Unary & conversions ---

    pub fn pos(&self) -> Chain {
        self.unary_step(OperatorId::Pos)
    }

    pub fn abs(&self) -> Chain {
        self.unary_step(OperatorId::Abs)
    }

    pub fn invert(&self) -> Chain {
        self.unary_step(OperatorId::Invert)
    }

    pub fn to_complex(&self) -> Chain {
        self.unary_step(OperatorId::Complex)
    }

    pub fn to_int(&self) -> Chain {
        self.unary_step(OperatorId::Int)
    }

    pub fn to_float(&self) -> Chain {
        self.unary_step(OperatorId::Float)
    }

    pub fn as_index(&self) -> Chain {
        self.unary_step(OperatorId::Index)
    }

    pub fn round(&self, ndigits: Option<i64>) -> Chain {
        match ndigits {
            Some(n) => self.binary_step(OperatorId::Round, n),
            None => self.unary_step(OperatorId::Round),
        }
    }

    pub fn trunc(&self) -> Chain {
        self.unary_step(OperatorId::Trunc)
    }

    pub fn floor(&self) -> Chain {
        self.unary_step(OperatorId::Floor)
    }

    pub fn ceil(&self) -> Chain {
        self.unary_step(OperatorId::Ceil)
    }
}

macro_rules! reflected_builders {
    ($($method:ident => $op:ident),* $(,)?) => {
        impl Chain {
            $(
                /// Records the reflected form: `other <op> self`.
                pub fn $method(&self, other: impl Into<Value>) -> Chain {
                    self.binary_step(OperatorId::$op, other)
                }
            )*
        }
    };
}

reflected_builders!(
    radd => RAdd,
    rsub => RSub,
    rmul => RMul,
    rmatmul => RMatMul,
    rtruediv => RTrueDiv,
    rfloordiv => RFloorDiv,
    rmod => RMod,
    rdivmod => RDivMod,
    rpow => RPow,
    rlshift => RLShift,
    rrshift => RRShift,
    rand => RAnd,
    rxor => RXor,
    ror => ROr,
);

//==================================================================================
// 2. Std Operator Syntax
//==================================================================================

macro_rules! binary_operator_traits {
    ($($trait:ident :: $method:ident, $assign:ident :: $assign_method:ident => $op:ident;)*) => {
        $(
            impl<T: Into<Value>> $trait<T> for Chain {
                type Output = Chain;

                fn $method(self, rhs: T) -> Chain {
                    self.binary_step(OperatorId::$op, rhs)
                }
            }

            impl<T: Into<Value>> $trait<T> for &Chain {
                type Output = Chain;

                fn $method(self, rhs: T) -> Chain {
                    self.binary_step(OperatorId::$op, rhs)
                }
            }

            // In-place syntax records the plain operator.
            impl<T: Into<Value>> $assign<T> for Chain {
                fn $assign_method(&mut self, rhs: T) {
                    *self = self.binary_step(OperatorId::$op, rhs);
                }
            }
        )*
    };
}

binary_operator_traits! {
    Add::add, AddAssign::add_assign => Add;
    Sub::sub, SubAssign::sub_assign => Sub;
    Mul::mul, MulAssign::mul_assign => Mul;
    Div::div, DivAssign::div_assign => TrueDiv;
    Rem::rem, RemAssign::rem_assign => Mod;
    Shl::shl, ShlAssign::shl_assign => LShift;
    Shr::shr, ShrAssign::shr_assign => RShift;
    BitAnd::bitand, BitAndAssign::bitand_assign => And;
    BitOr::bitor, BitOrAssign::bitor_assign => Or;
    BitXor::bitxor, BitXorAssign::bitxor_assign => Xor;
}

/// `1 + chain` and friends: a primitive on the left records the reflected
/// operator on the chain.
macro_rules! reflected_operator_traits {
    ($prim:ty => $($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl $trait<Chain> for $prim {
                type Output = Chain;

                fn $method(self, rhs: Chain) -> Chain {
                    rhs.binary_step(OperatorId::$op, self)
                }
            }

            impl $trait<&Chain> for $prim {
                type Output = Chain;

                fn $method(self, rhs: &Chain) -> Chain {
                    rhs.binary_step(OperatorId::$op, self)
                }
            }
        )*
    };
}

reflected_operator_traits!(i64 =>
    Add::add => RAdd, Sub::sub => RSub, Mul::mul => RMul, Div::div => RTrueDiv,
    Rem::rem => RMod, Shl::shl => RLShift, Shr::shr => RRShift,
    BitAnd::bitand => RAnd, BitOr::bitor => ROr, BitXor::bitxor => RXor,
);

reflected_operator_traits!(i32 =>
    Add::add => RAdd, Sub::sub => RSub, Mul::mul => RMul, Div::div => RTrueDiv,
    Rem::rem => RMod, Shl::shl => RLShift, Shr::shr => RRShift,
    BitAnd::bitand => RAnd, BitOr::bitor => ROr, BitXor::bitxor => RXor,
);

reflected_operator_traits!(f64 =>
    Add::add => RAdd, Sub::sub => RSub, Mul::mul => RMul, Div::div => RTrueDiv,
    Rem::rem => RMod,
);

impl Neg for Chain {
    type Output = Chain;

    fn neg(self) -> Chain {
        self.unary_step(OperatorId::Neg)
    }
}

impl Neg for &Chain {
    type Output = Chain;

    fn neg(self) -> Chain {
        self.unary_step(OperatorId::Neg)
    }
}

/// `!chain` records bitwise inversion (`~` in the rendered form).
impl Not for Chain {
    type Output = Chain;

    fn not(self) -> Chain {
        self.invert()
    }
}

impl Not for &Chain {
    type Output = Chain;

    fn not(self) -> Chain {
        self.invert()
    }
}
