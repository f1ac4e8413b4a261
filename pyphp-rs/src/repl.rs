//! Interactive line loop.
//!
//! Each non-empty input line is handed to the interpreter as its own input
//! unit.  The banner and prompt are written to the interpreter's output sink
//! so they interleave correctly with script output.

use std::io::{BufRead, Write};

use crate::script::{Interpreter, RuntimeError};

pub const BANNER: &str = "pyPHP 0.1";
pub const PROMPT: &str = "php >> ";

/// Read lines from `input` until end of input.
///
/// An operator failure ends the session: it is returned to the caller
/// untouched.
pub fn run<R: BufRead, W: Write>(
    interp: &mut Interpreter<W>,
    input: R,
    show_prompt: bool,
) -> Result<(), RuntimeError> {
    if show_prompt {
        writeln!(interp.output_mut(), "{BANNER}")?;
    }
    let mut lines = input.lines();
    loop {
        if show_prompt {
            write!(interp.output_mut(), "{PROMPT}")?;
            interp.output_mut().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let summary = interp.run_line(&line)?;
        log::debug!("line done: {summary:?}");
        interp.output_mut().flush()?;
    }
    writeln!(interp.output_mut())?;
    interp.output_mut().flush()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
