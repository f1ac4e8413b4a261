//! Native function table.
//!
//! A native callable receives its already-evaluated arguments and returns a
//! value or a message describing why it refused them.  The table checks the
//! declared [`Arity`] before invoking the callable so argument-count errors
//! read the same for every function.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::value::Value;

/// Greeting returned by the seeded `test_func` built-in.
pub const TEST_FUNC_GREETING: &str = "hey this is pretty cool.\n";

/// How many arguments a native callable accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Any,
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Any => true,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(0) => "no arguments".to_owned(),
            Arity::Exact(1) => "exactly 1 argument".to_owned(),
            Arity::Exact(k) => format!("exactly {k} arguments"),
            Arity::Any => "any number of arguments".to_owned(),
        }
    }
}

type Callable = dyn Fn(Vec<Value>) -> Result<Value, String>;

/// A host-implemented function callable from script code.
#[derive(Clone)]
pub struct NativeFn {
    arity: Arity,
    func: Rc<Callable>,
}

impl NativeFn {
    pub fn new(arity: Arity, func: impl Fn(Vec<Value>) -> Result<Value, String> + 'static) -> Self {
        NativeFn {
            arity,
            func: Rc::new(func),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("arity", &self.arity).finish_non_exhaustive()
    }
}

// ── Dispatch errors ───────────────────────────────────────────────────────────

/// A call that could not produce a value.  Always recoverable: the call
/// expression yields nothing and the statement carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    UndefinedFunction(String),
    /// Wrong argument count or types; carries the callable's own message.
    BadArguments(String),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::UndefinedFunction(name) => write!(f, "Undefined function: {name}"),
            CallError::BadArguments(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CallError {}

// ── FunctionTable ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    fns: HashMap<String, NativeFn>,
}

impl FunctionTable {
    /// An empty table, with no built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table seeded with the fixed built-ins.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.insert(
            "test_func",
            NativeFn::new(Arity::Exact(0), |_| Ok(Value::from(TEST_FUNC_GREETING))),
        );
        table
    }

    /// Register (or replace) a function.
    pub fn insert(&mut self, name: impl Into<String>, f: NativeFn) {
        self.fns.insert(name.into(), f);
    }

    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.fns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }

    /// Look up `name` and invoke it with `args`.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, CallError> {
        let f = self
            .get(name)
            .ok_or_else(|| CallError::UndefinedFunction(name.to_owned()))?;
        if !f.arity.accepts(args.len()) {
            return Err(CallError::BadArguments(format!(
                "{name}() takes {} ({} given)",
                f.arity.describe(),
                args.len()
            )));
        }
        (f.func)(args).map_err(CallError::BadArguments)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
