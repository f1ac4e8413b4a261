//! Tree-walking evaluator.
//!
//! Expressions evaluate to `Option<Value>`: `None` is the "no usable value"
//! left behind by a call that failed to dispatch.  Dispatch failures are
//! reported through the context and absorbed; operator failures are not,
//! and travel up to the caller as [`RuntimeError::Operator`].

use std::fmt;
use std::io;

use super::ast::{Expr, Stmt};
use super::builtins::CallError;
use super::value::{type_name_of, OpError, Value};

// ── EvalContext ───────────────────────────────────────────────────────────────

/// Dependency-injection interface used by the evaluator.
///
/// The interpreter implements this over its environment and output sink.
pub trait EvalContext {
    /// Look up a variable; `None` when unbound.
    fn get_var(&self, name: &str) -> Option<Value>;

    /// Invoke a native function.
    fn call_fn(&mut self, name: &str, args: Vec<Value>) -> Result<Value, CallError>;

    /// Append text to the output sink.
    fn write_out(&mut self, text: &str) -> io::Result<()>;

    /// Report a recoverable diagnostic as one output line.
    fn report(&mut self, msg: &dyn fmt::Display) -> io::Result<()> {
        self.write_out(&format!("{msg}\n"))
    }

    /// Whether bare expression statements echo their value.
    fn is_interactive(&self) -> bool;
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// A failure that aborts the current parse call entirely.
#[derive(Debug)]
pub enum RuntimeError {
    /// Operator application failed.  Never caught by the interpreter.
    Operator(OpError),
    /// The output sink failed.
    Io(io::Error),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Operator(e) => write!(f, "{e}"),
            RuntimeError::Io(e) => write!(f, "output error: {e}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Operator(e) => Some(e),
            RuntimeError::Io(e) => Some(e),
        }
    }
}

impl From<OpError> for RuntimeError {
    fn from(e: OpError) -> Self {
        RuntimeError::Operator(e)
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> Self {
        RuntimeError::Io(e)
    }
}

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Evaluate an [`Expr`] against the given context.
pub fn eval_expr(expr: &Expr, ctx: &mut dyn EvalContext) -> Result<Option<Value>, RuntimeError> {
    match expr {
        Expr::IntLiteral(n) => Ok(Some(Value::Int(*n))),

        Expr::EmptyStringLiteral => Ok(Some(Value::Str(String::new()))),

        Expr::VariableRef(name) => Ok(Some(ctx.get_var(name).unwrap_or_default())),

        Expr::Binary { op, lhs, rhs } => {
            let l = eval_expr(lhs, ctx)?;
            let r = eval_expr(rhs, ctx)?;
            match (&l, &r) {
                (Some(l), Some(r)) => Ok(Some(l.apply(*op, r)?)),
                _ => Err(RuntimeError::Operator(OpError::UnsupportedOperands {
                    op: *op,
                    lhs: type_name_of(l.as_ref()),
                    rhs: type_name_of(r.as_ref()),
                })),
            }
        }

        Expr::Call { name, args: arg_exprs } => {
            let mut args = Vec::with_capacity(arg_exprs.len());
            let mut missing = None;
            for (i, ae) in arg_exprs.iter().enumerate() {
                match eval_expr(ae, ctx)? {
                    Some(v) => args.push(v),
                    None => {
                        missing.get_or_insert(i + 1);
                    }
                }
            }
            let result = match missing {
                Some(n) => Err(CallError::BadArguments(format!(
                    "{name}() argument {n} has no value"
                ))),
                None => ctx.call_fn(name, args),
            };
            match result {
                Ok(v) => Ok(Some(v)),
                Err(e) => {
                    log::debug!("call to {name} absorbed: {e:?}");
                    ctx.report(&e)?;
                    Ok(None)
                }
            }
        }
    }
}

/// Execute one statement, performing its output side effect.
pub fn exec_stmt(stmt: &Stmt, ctx: &mut dyn EvalContext) -> Result<(), RuntimeError> {
    match stmt {
        Stmt::Echo(expr) => {
            if let Some(v) = eval_expr(expr, ctx)? {
                ctx.write_out(&v.to_string())?;
            }
        }
        Stmt::Expr(expr) => {
            let v = eval_expr(expr, ctx)?;
            if let (Some(v), true) = (v, ctx.is_interactive()) {
                ctx.write_out(&format!("{v}\n"))?;
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
