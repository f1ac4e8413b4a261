//! Interpreter instance.
//!
//! The [`Interpreter`] owns the environment, the output sink, and the lexer
//! state that carries over between input units.  Each call to
//! [`Interpreter::run_batch`] or [`Interpreter::run_line`] is one input unit:
//! statements are parsed and executed one at a time, in source order, and a
//! syntax error abandons whatever is left of that unit.

use std::fmt;
use std::io::{self, Write};

use super::{
    builtins::{CallError, NativeFn},
    env::Environment,
    eval::{exec_stmt, EvalContext, RuntimeError},
    lexer::{Lexer, LexerMode, LexerState},
    parser::{Parser, SyntaxError},
    value::Value,
};

// ── Unit summary ──────────────────────────────────────────────────────────────

/// What happened during one input unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitSummary {
    /// Statements executed.
    pub statements: usize,
    /// Characters skipped by the lexer.
    pub lex_errors: usize,
    /// Set when the unit was cut short by a syntax error.
    pub syntax_error: Option<SyntaxError>,
}

impl UnitSummary {
    pub fn completed(&self) -> bool {
        self.syntax_error.is_none()
    }
}

/// Functions may only be registered before the first input unit runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationClosed(pub String);

impl fmt::Display for RegistrationClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot register function '{}' after parsing has started", self.0)
    }
}

impl std::error::Error for RegistrationClosed {}

// ── Session ───────────────────────────────────────────────────────────────────

/// The evaluator's view of an interpreter while one statement executes.
struct Session<'a, W: Write> {
    env: &'a Environment,
    out: &'a mut W,
    interactive: bool,
}

impl<W: Write> EvalContext for Session<'_, W> {
    fn get_var(&self, name: &str) -> Option<Value> {
        self.env.vars.get(name).cloned()
    }

    fn call_fn(&mut self, name: &str, args: Vec<Value>) -> Result<Value, CallError> {
        self.env.functions.call(name, args)
    }

    fn write_out(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

pub struct Interpreter<W: Write> {
    env: Environment,
    lexer_state: LexerState,
    out: W,
    interactive: bool,
    started: bool,
}

impl<W: Write> Interpreter<W> {
    /// An interpreter for batch input: each unit starts outside a script region.
    pub fn new(out: W) -> Self {
        Interpreter {
            env: Environment::new(),
            lexer_state: LexerState::new(LexerMode::Passthrough),
            out,
            interactive: false,
            started: false,
        }
    }

    /// An interpreter for line-at-a-time input.  The lexer starts inside a
    /// script region and bare expression statements print their value.
    pub fn interactive(out: W) -> Self {
        Interpreter {
            lexer_state: LexerState::new(LexerMode::Script),
            interactive: true,
            ..Self::new(out)
        }
    }

    /// Register a native function.  Refused once any input has been run.
    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        f: NativeFn,
    ) -> Result<(), RegistrationClosed> {
        let name = name.into();
        if self.started {
            return Err(RegistrationClosed(name));
        }
        log::debug!("registered native function {name}");
        self.env.functions.insert(name, f);
        Ok(())
    }

    /// Bind a variable.  This is the host's only write path into the table.
    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.env.vars.set(name, value);
    }

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.env.vars.get(name)
    }

    pub fn lexer_state(&self) -> LexerState {
        self.lexer_state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run a complete text blob.
    pub fn run_batch(&mut self, src: &str) -> Result<UnitSummary, RuntimeError> {
        self.run_unit(src)
    }

    /// Run one line of interactive input as an independent unit.
    pub fn run_line(&mut self, line: &str) -> Result<UnitSummary, RuntimeError> {
        self.run_unit(line)
    }

    fn run_unit(&mut self, src: &str) -> Result<UnitSummary, RuntimeError> {
        self.started = true;
        let mut parser = Parser::new(Lexer::with_state(src, self.lexer_state));
        let result = self.drive(&mut parser);
        self.lexer_state = parser.lexer_state();
        if let Err(e) = &result {
            log::warn!("input unit aborted: {e}");
        }
        result
    }

    fn drive(&mut self, parser: &mut Parser<'_>) -> Result<UnitSummary, RuntimeError> {
        let mut summary = UnitSummary::default();
        loop {
            let next = parser.next_statement();
            for e in parser.take_lex_errors() {
                summary.lex_errors += 1;
                self.report(&e)?;
            }
            match next {
                None => return Ok(summary),
                Some(Err(e)) => {
                    log::debug!("syntax error at line {}: found {:?}", e.line, e.found);
                    self.report(&e)?;
                    summary.syntax_error = Some(e);
                    return Ok(summary);
                }
                Some(Ok(stmt)) => {
                    log::debug!("exec {stmt:?}");
                    let mut session = Session {
                        env: &self.env,
                        out: &mut self.out,
                        interactive: self.interactive,
                    };
                    exec_stmt(&stmt, &mut session)?;
                    summary.statements += 1;
                }
            }
        }
    }

    fn report(&mut self, msg: &dyn fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{msg}")
    }
}

impl Interpreter<Vec<u8>> {
    /// Output so far, for in-memory sinks.
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
