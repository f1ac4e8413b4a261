//! Command-line argument parsing.
//!
//! Usage:
//!   pyphp [-dq] [-f[<file>]] [-D<name>=<value>]... [<script>]
//!   pyphp [-dq] [-f[<file>]] [-D<name>=<value>]... -c<code>

use std::path::PathBuf;

use crate::config::parse_define;
use crate::script::Value;

pub const USAGE: &str = "Usage: pyphp [-dq] [-f[<file>]] [-D<name>=<value>]... [<script> | -c<code>]";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Which rc file to load.
    pub rc: RcFile,
    /// Code to run in batch mode instead of a file (`-c<code>`).
    pub code: Option<String>,
    /// Variables seeded from the command line (`-D<name>=<value>`).
    pub defines: Vec<(String, Value)>,
    /// Suppress the interactive banner and prompt (`-q`).
    pub quiet: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Script file; `-` reads the script from standard input.
    pub script: Option<PathBuf>,
}

/// How to choose the rc file.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum RcFile {
    /// Search the standard locations (default).
    #[default]
    Search,
    /// `-f` with no file argument: load no rc file.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

/// What the binary should run.
#[derive(Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Batch over a script file.
    File(PathBuf),
    /// Batch over all of standard input.
    Stdin,
    /// Batch over the `-c` argument.
    Code(String),
    /// Line-at-a-time session on standard input.
    Interactive,
}

impl CliArgs {
    pub fn mode(&self) -> RunMode {
        match (&self.code, &self.script) {
            (Some(code), _) => RunMode::Code(code.clone()),
            (None, Some(p)) if p.as_os_str() == "-" => RunMode::Stdin,
            (None, Some(p)) => RunMode::File(p.clone()),
            (None, None) => RunMode::Interactive,
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'q' => args.quiet = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.rc = RcFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else {
                        args.rc = RcFile::Skip;
                    }
                }

                // -c<code> / -D<name>=<value> take a value, attached or separate.
                flag @ ('c' | 'D') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    if flag == 'c' {
                        args.code = Some(value);
                    } else {
                        args.defines.push(parse_define(&value)?);
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => args.script = Some(PathBuf::from(positional.remove(0))),
        n => return Err(format!("too many arguments ({n})")),
    }
    if args.code.is_some() && args.script.is_some() {
        return Err("-c cannot be combined with a script file".to_owned());
    }

    Ok(args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
