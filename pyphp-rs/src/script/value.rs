//! Runtime value type.
//!
//! Only two runtime types exist: integers and strings.  Operator
//! application is type-dependent and may fail; such failures are the one
//! error class the interpreter does not recover from.

use std::fmt;

use super::ast::BinOp;

/// Longest string an operator may build, in bytes.
pub const MAX_STR_LEN: usize = 1 << 30;

/// A script runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Default for Value {
    /// Unbound variables read as the empty string.
    fn default() -> Self {
        Value::Str(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

// ── Operator errors ───────────────────────────────────────────────────────────

/// Failure raised while applying a binary operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// The operand types have no meaning for this operator.
    UnsupportedOperands {
        op: BinOp,
        lhs: &'static str,
        rhs: &'static str,
    },
    DivisionByZero,
    Overflow(BinOp),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpError::UnsupportedOperands { op, lhs, rhs } => write!(
                f,
                "unsupported operand type(s) for {}: '{lhs}' and '{rhs}'",
                op.symbol()
            ),
            OpError::DivisionByZero => write!(f, "integer division by zero"),
            OpError::Overflow(op) => write!(f, "result of '{}' is too large", op.symbol()),
        }
    }
}

impl std::error::Error for OpError {}

/// Type name used in operator error messages for a possibly-absent value.
pub fn type_name_of(v: Option<&Value>) -> &'static str {
    v.map_or("void", Value::type_name)
}

impl Value {
    /// Name of the type, as shown in operator error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "str",
        }
    }

    // ── Arithmetic helpers ────────────────────────────────────────────────────

    /// Apply `op` to `self` and `rhs`.
    pub fn apply(&self, op: BinOp, rhs: &Value) -> Result<Value, OpError> {
        match op {
            BinOp::Add => self.arith_add(rhs),
            BinOp::Sub => self.arith_sub(rhs),
            BinOp::Mul => self.arith_mul(rhs),
            BinOp::Div => self.arith_div(rhs),
        }
    }

    fn unsupported(&self, op: BinOp, rhs: &Value) -> OpError {
        OpError::UnsupportedOperands {
            op,
            lhs: self.type_name(),
            rhs: rhs.type_name(),
        }
    }

    pub fn arith_add(&self, rhs: &Value) -> Result<Value, OpError> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or(OpError::Overflow(BinOp::Add)),
            (Value::Str(a), Value::Str(b)) if a.len() + b.len() <= MAX_STR_LEN => {
                Ok(Value::Str(format!("{a}{b}")))
            }
            (Value::Str(_), Value::Str(_)) => Err(OpError::Overflow(BinOp::Add)),
            _ => Err(self.unsupported(BinOp::Add, rhs)),
        }
    }

    pub fn arith_sub(&self, rhs: &Value) -> Result<Value, OpError> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(*b)
                .map(Value::Int)
                .ok_or(OpError::Overflow(BinOp::Sub)),
            _ => Err(self.unsupported(BinOp::Sub, rhs)),
        }
    }

    /// Integer product, or string repetition when one side is a string.
    pub fn arith_mul(&self, rhs: &Value) -> Result<Value, OpError> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(*b)
                .map(Value::Int)
                .ok_or(OpError::Overflow(BinOp::Mul)),
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                let count = usize::try_from(*n).unwrap_or(0);
                match s.len().checked_mul(count) {
                    Some(len) if len <= MAX_STR_LEN => {}
                    _ => return Err(OpError::Overflow(BinOp::Mul)),
                }
                Ok(Value::Str(s.repeat(count)))
            }
            _ => Err(self.unsupported(BinOp::Mul, rhs)),
        }
    }

    /// Floor division: the quotient rounds toward negative infinity.
    pub fn arith_div(&self, rhs: &Value) -> Result<Value, OpError> {
        match (self, rhs) {
            (Value::Int(_), Value::Int(0)) => Err(OpError::DivisionByZero),
            (Value::Int(a), Value::Int(b)) => {
                let q = a.checked_div(*b).ok_or(OpError::Overflow(BinOp::Div))?;
                let floored = if (a % b != 0) && ((*a < 0) != (*b < 0)) { q - 1 } else { q };
                Ok(Value::Int(floored))
            }
            _ => Err(self.unsupported(BinOp::Div, rhs)),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
