use proptest::prelude::*;
use pyphp::script::Interpreter;

fn batch(src: &str) -> String {
    let mut interp = Interpreter::new(Vec::new());
    interp.run_batch(src).expect("run failed");
    interp.output_str()
}

proptest! {
    /// `echo a+b;` prints the decimal sum.
    #[test]
    fn addition_matches_native(a in 0i64..=i64::MAX / 2, b in 0i64..=i64::MAX / 2) {
        let out = batch(&format!("<?php echo {a}+{b}; ?>"));
        prop_assert_eq!(out, (a + b).to_string());
    }
}

proptest! {
    /// `*` and `/` bind tighter than `+` and `-`; everything is left-associative.
    #[test]
    fn precedence_matches_native(a in 0i64..1000, b in 0i64..1000, c in 1i64..1000) {
        let out = batch(&format!("<?php echo {a}-{b}*{c}+{a}/{c}; ?>"));
        prop_assert_eq!(out, (a - b * c + a / c).to_string());
    }
}

proptest! {
    /// The interpreter never panics on arbitrary input; it returns Ok or Err.
    #[test]
    fn interpreter_does_not_panic(s in "\\PC*") {
        let mut interp = Interpreter::new(Vec::new());
        let _ = interp.run_batch(&s);
        let _ = interp.run_batch(&format!("<?php {s}"));
    }
}

proptest! {
    /// A single illegal character is skipped and the statement after it still runs.
    #[test]
    fn lexical_recovery(bad in "[#@!~`\\[\\]{}<>.:%&|^=]", n in 0i64..10_000) {
        let out = batch(&format!("<?php {bad}echo {n}; ?>"));
        prop_assert_eq!(out, format!("illegal character in PHP state: {:?}\n{n}", bad.chars().next().unwrap()));
    }
}

proptest! {
    /// Text outside a script region never reaches the parser: every
    /// character is reported and nothing else is written.
    #[test]
    fn passthrough_is_never_tokenized(s in "[a-z0-9 ;$+*()]{0,40}") {
        let out = batch(&s);
        prop_assert_eq!(out.lines().count(), s.chars().count());
        prop_assert!(out.lines().all(|l| l.starts_with("illegal character in INITIAL state")));
    }
}
