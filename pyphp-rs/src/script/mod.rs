//! The scripting core: tokenizer, parser, evaluator, and runtime tables.
//!
//! Script regions are delimited by `<?php` and `?>`.  Inside them the
//! supported surface is:
//!
//! - `echo expr;` and `expr;` statements
//! - integer literals, `$name` reads, the empty literals `''` and `""`
//! - binary `+ - * /` with the usual precedence, left-associative
//! - native function calls `name(arg, ...)`
//!
//! # Quick start
//!
//! ```rust
//! use pyphp::script::Interpreter;
//!
//! let mut interp = Interpreter::new(Vec::new());
//! interp.set_var("x", 6i64);
//! interp.run_batch("<?php echo $x * 7; ?>").unwrap();
//! assert_eq!(interp.output_str(), "42");
//! ```

pub mod ast;
pub mod builtins;
pub mod env;
pub mod eval;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod value;

// Re-exports for convenience.
pub use builtins::{Arity, CallError, FunctionTable, NativeFn};
pub use env::Environment;
pub use eval::{EvalContext, RuntimeError};
pub use interp::{Interpreter, UnitSummary};
pub use value::Value;
