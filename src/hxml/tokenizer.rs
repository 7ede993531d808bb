//! Tokenizer for `.hxml` argument files.
//!
//! An hxml file is a list of compiler arguments separated by whitespace.
//! Arguments may be quoted with `'` or `"` to include whitespace, and `#`
//! starts a comment that runs to the end of the line.
//!
//! The tokenizer is a three-state machine (unquoted, single-quoted,
//! double-quoted) driven character by character across the whole file:
//!
//! - `#` outside quotes ends the current token and discards the rest of the
//!   line; inside quotes it is a literal character.
//! - A quote outside quotes opens a quoted token; the matching quote closes
//!   it, emitting the token even when it is empty. The quote characters
//!   themselves are never part of a token, and the *other* quote character
//!   inside a quoted token is literal.
//! - Whitespace outside quotes ends the current token.
//! - An unquoted token never continues past the end of its line. A quoted
//!   token does, with the line break itself dropped.
//!
//! ```rust
//! use hxdeps::hxml::tokenize;
//!
//! let tokens = tokenize("-cp \"dir/with space\" # trailing comment\n-main Main");
//! assert_eq!(tokens, ["-cp", "dir/with space", "-main", "Main"]);
//! ```

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

struct Tokenizer {
    tokens: Vec<String>,
    current: String,
    state: State,
}

impl Tokenizer {
    const fn new() -> Self {
        Self {
            tokens: Vec::new(),
            current: String::new(),
            state: State::Unquoted,
        }
    }

    /// Emit the token under construction if it is not empty.
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.tokens.push(std::mem::take(&mut self.current));
        }
    }

    /// Emit the token under construction unconditionally (closing quote).
    fn close_quoted(&mut self) {
        self.tokens.push(std::mem::take(&mut self.current));
        self.state = State::Unquoted;
    }

    fn feed_line(&mut self, line: &str) {
        for c in line.chars() {
            match self.state {
                State::Unquoted => match c {
                    '#' => {
                        self.flush();
                        return;
                    }
                    '\'' => self.state = State::SingleQuoted,
                    '"' => self.state = State::DoubleQuoted,
                    c if c.is_whitespace() => self.flush(),
                    c => self.current.push(c),
                },
                State::SingleQuoted => match c {
                    '\'' => self.close_quoted(),
                    c => self.current.push(c),
                },
                State::DoubleQuoted => match c {
                    '"' => self.close_quoted(),
                    c => self.current.push(c),
                },
            }
        }
        self.end_line();
    }

    fn end_line(&mut self) {
        if self.state == State::Unquoted {
            self.flush();
        }
    }

    fn finish(mut self) -> Vec<String> {
        // An unterminated quote keeps whatever it collected.
        self.flush();
        self.tokens
    }
}

/// Split hxml content into its ordered argument tokens.
#[must_use]
pub fn tokenize(content: &str) -> Vec<String> {
    let mut tokenizer = Tokenizer::new();
    for line in content.lines() {
        tokenizer.feed_line(line);
    }
    tokenizer.finish()
}

/// Tokenize an hxml file from disk.
///
/// A missing or unreadable file yields no tokens. Invalid UTF-8 is replaced
/// rather than rejected.
#[must_use]
pub fn tokenize_file(path: &Path) -> Vec<String> {
    match std::fs::read(path) {
        Ok(bytes) => tokenize(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::debug!(target: "build_file", "Cannot read {}: {e}", path.display());
            Vec::new()
        }
    }
}
