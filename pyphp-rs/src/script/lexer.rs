//! Dual-mode tokenizer.
//!
//! The lexer starts in [`LexerMode::Passthrough`], where the only thing it
//! recognises is the `<?php` open tag.  Inside a script region
//! ([`LexerMode::Script`]) it produces [`Token`]s until the `?>` close tag
//! switches it back.  Neither tag produces a token.
//!
//! An unrecognised character is never fatal: the lexer yields a [`LexError`]
//! naming the mode and the character, skips exactly that one character, and
//! carries on in the same mode.

use std::fmt;

pub const OPEN_TAG: &str = "<?php";
pub const CLOSE_TAG: &str = "?>";

// ── Mode / state ──────────────────────────────────────────────────────────────

/// Which rule set is active.  The modes are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexerMode {
    #[default]
    Passthrough,
    Script,
}

impl fmt::Display for LexerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LexerMode::Passthrough => "INITIAL",
            LexerMode::Script => "PHP",
        })
    }
}

/// The part of the lexer that outlives a single input unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerState {
    pub mode: LexerMode,
    pub line: usize,
}

impl Default for LexerState {
    fn default() -> Self {
        LexerState {
            mode: LexerMode::Passthrough,
            line: 1,
        }
    }
}

impl LexerState {
    pub fn new(mode: LexerMode) -> Self {
        LexerState { mode, line: 1 }
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Echo,
    Dollar,
    Semi,
    Label,
    SingleQuote,
    DoubleQuote,
    Int,
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Times,
    Divide,
}

/// Reserved words, checked before a lexeme is classified as a [`TokenKind::Label`].
const RESERVED: &[(&str, TokenKind)] = &[("echo", TokenKind::Echo)];

fn keyword(lexeme: &str) -> Option<TokenKind> {
    RESERVED
        .iter()
        .find(|(word, _)| *word == lexeme)
        .map(|&(_, kind)| kind)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// An unrecognised character.  Recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub mode: LexerMode,
    pub ch: char,
    pub line: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal character in {} state: {:?}", self.mode, self.ch)
    }
}

impl std::error::Error for LexError {}

// ── Lexer ─────────────────────────────────────────────────────────────────────

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    state: LexerState,
}

impl<'a> Lexer<'a> {
    /// A lexer for a fresh batch input: passthrough mode, line 1.
    pub fn new(src: &'a str) -> Self {
        Self::with_state(src, LexerState::default())
    }

    /// Resume tokenizing with state carried over from a previous input unit.
    pub fn with_state(src: &'a str, state: LexerState) -> Self {
        Lexer { src, pos: 0, state }
    }

    pub fn state(&self) -> LexerState {
        self.state
    }

    pub fn mode(&self) -> LexerMode {
        self.state.mode
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn switch_mode(&mut self, mode: LexerMode) {
        log::debug!("lexer: {} -> {} at line {}", self.state.mode, mode, self.state.line);
        self.state.mode = mode;
    }

    fn illegal(&mut self) -> Option<Result<Token, LexError>> {
        let ch = self.bump()?;
        Some(Err(LexError {
            mode: self.state.mode,
            ch,
            line: self.state.line,
        }))
    }

    fn token(&self, kind: TokenKind, lexeme: &str) -> Token {
        let tok = Token {
            kind,
            lexeme: lexeme.to_owned(),
            line: self.state.line,
        };
        log::trace!("token {:?} {:?} line {}", tok.kind, tok.lexeme, tok.line);
        tok
    }

    /// Produce the next token, a recoverable error, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            match self.state.mode {
                LexerMode::Passthrough => {
                    self.peek()?;
                    if self.rest().starts_with(OPEN_TAG) {
                        self.pos += OPEN_TAG.len();
                        self.switch_mode(LexerMode::Script);
                        continue;
                    }
                    return self.illegal();
                }
                LexerMode::Script => {
                    if let Some(tok) = self.next_script_token() {
                        return Some(tok);
                    }
                    if self.state.mode == LexerMode::Script {
                        return None;
                    }
                }
            }
        }
    }

    /// Script-mode rules.  Returns `None` at end of input or after a mode
    /// switch (the caller re-dispatches on the new mode).
    fn next_script_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            let ch = self.peek()?;
            match ch {
                ' ' | '\t' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    self.state.line += 1;
                }
                '\r' if self.rest().starts_with("\r\n") => {
                    self.pos += 2;
                    self.state.line += 1;
                }
                '?' if self.rest().starts_with(CLOSE_TAG) => {
                    self.pos += CLOSE_TAG.len();
                    self.switch_mode(LexerMode::Passthrough);
                    return None;
                }
                '0'..='9' => {
                    let digits = self.take_while(|c| c.is_ascii_digit());
                    return Some(Ok(self.token(TokenKind::Int, digits)));
                }
                'a'..='z' | 'A'..='Z' | '_' => {
                    let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                    let kind = keyword(word).unwrap_or(TokenKind::Label);
                    return Some(Ok(self.token(kind, word)));
                }
                _ => {
                    let kind = match ch {
                        '$' => TokenKind::Dollar,
                        ';' => TokenKind::Semi,
                        '\'' => TokenKind::SingleQuote,
                        '"' => TokenKind::DoubleQuote,
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        ',' => TokenKind::Comma,
                        '+' => TokenKind::Plus,
                        '-' => TokenKind::Minus,
                        '*' => TokenKind::Times,
                        '/' => TokenKind::Divide,
                        _ => return self.illegal(),
                    };
                    let start = self.pos;
                    self.bump();
                    let lexeme = &self.src[start..self.pos];
                    return Some(Ok(self.token(kind, lexeme)));
                }
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).filter_map(Result::ok).map(|t| t.kind).collect()
    }

    fn errors(src: &str) -> Vec<LexError> {
        Lexer::new(src).filter_map(Result::err).collect()
    }

    #[test]
    fn echo_statement() {
        use TokenKind::*;
        assert_eq!(kinds("<?php echo 1+2; ?>"), vec![Echo, Int, Plus, Int, Semi]);
    }

    #[test]
    fn tags_produce_no_tokens() {
        assert!(kinds("<?php ?>").is_empty());
        assert!(errors("<?php ?>").is_empty());
    }

    #[test]
    fn all_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("<?php $ ; ' \" ( ) , + - * /"),
            vec![Dollar, Semi, SingleQuote, DoubleQuote, LParen, RParen, Comma, Plus, Minus, Times, Divide]
        );
    }

    #[test]
    fn keyword_resolution() {
        let toks: Vec<Token> = Lexer::new("<?php echo echoes _x1").filter_map(Result::ok).collect();
        assert_eq!(toks[0].kind, TokenKind::Echo);
        assert_eq!(toks[1].kind, TokenKind::Label);
        assert_eq!(toks[1].lexeme, "echoes");
        assert_eq!(toks[2].kind, TokenKind::Label);
        assert_eq!(toks[2].lexeme, "_x1");
    }

    #[test]
    fn int_lexeme_kept_verbatim() {
        let toks: Vec<Token> = Lexer::new("<?php 007 99999999999999999999").filter_map(Result::ok).collect();
        assert_eq!(toks[0].lexeme, "007");
        assert_eq!(toks[1].lexeme, "99999999999999999999");
    }

    #[test]
    fn newlines_advance_line_counter() {
        let toks: Vec<Token> = Lexer::new("<?php 1\n2\n\n3\r\n4").filter_map(Result::ok).collect();
        let lines: Vec<usize> = toks.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5]);
    }

    #[test]
    fn passthrough_text_is_not_tokenized() {
        assert_eq!(kinds("echo 1;"), vec![]);
        let errs = errors("ab<?php 1");
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.mode == LexerMode::Passthrough));
        assert_eq!(kinds("ab<?php 1"), vec![TokenKind::Int]);
    }

    #[test]
    fn close_tag_returns_to_passthrough() {
        let mut lx = Lexer::new("<?php 1 ?>2");
        assert_eq!(lx.next().unwrap().unwrap().kind, TokenKind::Int);
        let err = lx.next().unwrap().unwrap_err();
        assert_eq!(err.mode, LexerMode::Passthrough);
        assert_eq!(err.ch, '2');
        assert!(lx.next().is_none());
        assert_eq!(lx.mode(), LexerMode::Passthrough);
    }

    #[test]
    fn illegal_character_is_skipped() {
        let items: Vec<_> = Lexer::new("<?php #1;").collect();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            Err(LexError { mode: LexerMode::Script, ch: '#', line: 1 })
        );
        assert_eq!(items[1].as_ref().unwrap().kind, TokenKind::Int);
        assert_eq!(items[2].as_ref().unwrap().kind, TokenKind::Semi);
    }

    #[test]
    fn lone_question_mark_is_illegal() {
        let errs = errors("<?php ?");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].ch, '?');
    }

    #[test]
    fn non_ascii_is_skipped_whole() {
        let errs = errors("<?php é1");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].ch, 'é');
        assert_eq!(kinds("<?php é1"), vec![TokenKind::Int]);
    }

    #[test]
    fn error_message_format() {
        let e = LexError { mode: LexerMode::Script, ch: '#', line: 1 };
        assert_eq!(e.to_string(), "illegal character in PHP state: '#'");
        let e = LexError { mode: LexerMode::Passthrough, ch: '\n', line: 1 };
        assert_eq!(e.to_string(), "illegal character in INITIAL state: '\\n'");
    }

    #[test]
    fn state_carries_over() {
        let mut lx = Lexer::with_state("1 ?>", LexerState::new(LexerMode::Script));
        assert_eq!(lx.next().unwrap().unwrap().kind, TokenKind::Int);
        assert!(lx.next().is_none());
        let state = lx.state();
        assert_eq!(state.mode, LexerMode::Passthrough);

        let mut next = Lexer::with_state("1", state);
        assert!(next.next().unwrap().is_err());
    }
}
