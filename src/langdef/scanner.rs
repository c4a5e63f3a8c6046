//! The maximal-munch scanner driver.

use crate::automata::set::DfaSet;
use crate::grammar::EOF;

/// A lexical unit: the pattern id of the matched terminal (or `-1` at end of
/// input) and the matched text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub id: i32,
    pub lexeme: String,
}

impl Token {
    pub fn new(id: i32, lexeme: &str) -> Self {
        Token {
            id,
            lexeme: String::from(lexeme),
        }
    }

    pub fn eof() -> Self {
        Token::new(EOF, "$")
    }
}

/// A lazy token stream over a source string.
///
/// Whitespace between tokens is skipped; the stream always ends with the EOF
/// token. A position where the scanner DFA can only match the empty string is
/// skipped one character at a time without emitting anything, so ill-formed
/// input degrades to a stream of dropped characters instead of a livelock.
pub struct Tokens<'a> {
    dfa: &'a DfaSet,
    rest: &'a str,
    finished: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(dfa: &'a DfaSet, source: &'a str) -> Self {
        Tokens {
            dfa,
            rest: source,
            finished: false,
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        loop {
            self.rest = self
                .rest
                .trim_start_matches(|c| c == ' ' || c == '\t' || c == '\n');
            if self.rest.is_empty() {
                self.finished = true;
                return Some(Token::eof());
            }

            match self.dfa.match_one(self.rest) {
                (Some(pattern), lexeme) if !lexeme.is_empty() => {
                    let token = Token::new(pattern as i32, lexeme);
                    self.rest = &self.rest[lexeme.len()..];
                    return Some(token);
                }
                _ => {
                    // No progress possible here; drop one character.
                    let mut chars = self.rest.chars();
                    chars.next();
                    self.rest = chars.as_str();
                }
            }
        }
    }
}
