//! rc-file loader.
//!
//! An rc file seeds the variable table before any script runs.  Format:
//!
//! | Line | Action |
//! |------|--------|
//! | `name = value` | bind `$name` |
//! | blank, or starting with `;` or `#` | ignored |
//!
//! Values that parse as integers become integers; anything else is a string,
//! with one pair of surrounding double quotes removed.  A malformed line is
//! reported and skipped; it never stops the rest of the file loading.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::script::env::VariableTable;
use crate::script::Value;

/// Environment variable naming an rc file explicitly.
pub const RC_ENV_VAR: &str = "PYPHPRC";

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading an rc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Variable definitions loaded from an rc file.
#[derive(Debug, Default)]
pub struct Config {
    pub vars: VariableTable,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rc-file text.  Returns the config and any per-line errors.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            match parse_define(line) {
                Ok((name, value)) => config.vars.set(name, value),
                Err(message) => errors.push(ConfigError { line: lineno, message }),
            }
        }

        (config, errors)
    }

    /// Read and parse an rc file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }
}

// ── Definitions ───────────────────────────────────────────────────────────────

fn definition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$")
            .expect("definition pattern is a valid regex")
    })
}

/// Parse one `name=value` definition (rc-file line or `-D` argument).
pub fn parse_define(s: &str) -> Result<(String, Value), String> {
    let caps = definition_re()
        .captures(s)
        .ok_or_else(|| format!("expected `name = value`, got '{s}'"))?;
    Ok((caps[1].to_owned(), parse_value(&caps[2])))
}

/// Integer if the text is one, otherwise a string.
fn parse_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(raw);
    Value::Str(unquoted.to_owned())
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the user rc file in the standard locations.
///
/// Order: `$PYPHPRC`, `<config dir>/pyphprc`, `~/.pyphprc`.  Returns
/// the first path that exists, or `None`.
pub fn find_rc_file() -> Option<PathBuf> {
    let explicit = std::env::var_os(RC_ENV_VAR).map(PathBuf::from);
    let project = directories::ProjectDirs::from("", "", "pyphp")
        .map(|d| d.config_dir().join("pyphprc"));
    let home = directories::BaseDirs::new().map(|d| d.home_dir().join(".pyphprc"));

    [explicit, project, home]
        .into_iter()
        .flatten()
        .find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn integer_and_string_values() {
        let (cfg, errs) = Config::load_str("n = 42\nname=world\nneg=-3");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("n"), Some(&Value::Int(42)));
        assert_eq!(cfg.vars.get("name"), Some(&Value::from("world")));
        assert_eq!(cfg.vars.get("neg"), Some(&Value::Int(-3)));
    }

    #[test]
    fn quoted_string_value() {
        let (cfg, errs) = Config::load_str(r#"greeting = "hello world""#);
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("greeting"), Some(&Value::from("hello world")));
    }

    #[test]
    fn quoted_number_stays_a_string() {
        let (cfg, _) = Config::load_str(r#"zip = "01234""#);
        assert_eq!(cfg.vars.get("zip"), Some(&Value::from("01234")));
    }

    #[test]
    fn empty_value() {
        let (cfg, errs) = Config::load_str("blank =");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.get("blank"), Some(&Value::from("")));
    }

    #[test]
    fn comments_and_blank_lines_ignored() {
        let (cfg, errs) = Config::load_str(
            ";; comment\n\
             # also a comment\n\
             \n\
             real = yes",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.vars.len(), 1);
    }

    #[test]
    fn bad_lines_are_reported_and_skipped() {
        let (cfg, errs) = Config::load_str("ok = 1\n9lives = 2\nnot a definition\nalso_ok = 3");
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].line, 2);
        assert_eq!(errs[1].line, 3);
        assert!(cfg.vars.contains("ok"));
        assert!(cfg.vars.contains("also_ok"));
    }

    #[test]
    fn later_definition_wins() {
        let (cfg, _) = Config::load_str("x = 1\nx = 2");
        assert_eq!(cfg.vars.get("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn define_argument() {
        assert_eq!(parse_define("x=5"), Ok(("x".to_owned(), Value::Int(5))));
        assert!(parse_define("=5").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "limit = 10").unwrap();
        let (cfg, errs) = Config::load_file(f.path()).unwrap();
        assert!(errs.is_empty());
        assert_eq!(cfg.vars.get("limit"), Some(&Value::Int(10)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(Config::load_file(Path::new("/definitely/not/here/pyphprc")).is_err());
    }
}
