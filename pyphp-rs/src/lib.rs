//! pyphp: a minimal interpreter for a tiny PHP-like language embedded in
//! free-form text.
//!
//! The [`script`] module is the interpreter proper.  [`cli`], [`config`], and
//! [`repl`] are the thin layers the `pyphp` binary puts around it.

pub mod cli;
pub mod config;
pub mod repl;
pub mod script;
