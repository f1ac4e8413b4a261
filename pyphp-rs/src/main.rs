use std::io::{self, Read, Write};
use std::path::Path;

use pyphp::cli::{self, RcFile, RunMode};
use pyphp::config::{self, Config};
use pyphp::repl;
use pyphp::script::{Interpreter, RuntimeError};

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("pyphp: {e}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("pyphp: cannot initialise logging: {e}");
    }

    let mode = args.mode();
    let stdout = io::stdout();
    let mut interp = match mode {
        RunMode::Interactive => Interpreter::interactive(stdout),
        _ => Interpreter::new(stdout),
    };

    // ── Seed variables: rc file first, then -D overrides ─────────────────────
    let rc_path = match &args.rc {
        RcFile::Skip => None,
        RcFile::Explicit(p) => Some(p.clone()),
        RcFile::Search => config::find_rc_file(),
    };
    if let Some(path) = rc_path {
        load_rc(&path, &mut interp);
    }
    for (name, value) in args.defines {
        interp.set_var(name, value);
    }

    // ── Run ──────────────────────────────────────────────────────────────────
    let result = match mode {
        RunMode::File(path) => match std::fs::read_to_string(&path) {
            Ok(src) => interp.run_batch(&src).map(drop),
            Err(e) => {
                eprintln!("pyphp: cannot read {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        RunMode::Stdin => {
            let mut src = String::new();
            match io::stdin().read_to_string(&mut src) {
                Ok(_) => interp.run_batch(&src).map(drop),
                Err(e) => Err(RuntimeError::Io(e)),
            }
        }
        RunMode::Code(code) => interp.run_batch(&code).map(drop),
        RunMode::Interactive => {
            let is_tty = unsafe { libc::isatty(libc::STDIN_FILENO) != 0 };
            let show_prompt = is_tty && !args.quiet;
            repl::run(&mut interp, io::stdin().lock(), show_prompt)
        }
    };

    let flushed = interp.output_mut().flush();
    if let Err(e) = result {
        eprintln!("pyphp: {e}");
        std::process::exit(1);
    }
    if let Err(e) = flushed {
        eprintln!("pyphp: {e}");
        std::process::exit(1);
    }
}

fn load_rc<W: Write>(path: &Path, interp: &mut Interpreter<W>) {
    match Config::load_file(path) {
        Ok((cfg, errors)) => {
            for e in errors {
                log::warn!("{}: {e}", path.display());
            }
            log::debug!("loaded {} variable(s) from {}", cfg.vars.len(), path.display());
            for (name, value) in cfg.vars.iter() {
                interp.set_var(name.clone(), value.clone());
            }
        }
        Err(e) => log::warn!("cannot read rc file {}: {e}", path.display()),
    }
}
