//! The table-driven shift/reduce parse driver.

use std::error::Error;
use std::fmt;

use crate::tables::ActionEntry;

use super::scanner::Token;
use super::{LangDef, LangDefError, ParseValue};

impl<V, C> LangDef<V, C> {
    /// Run the shift/reduce loop over a token stream.
    ///
    /// Shifts push the lexeme; reduces pop the right-hand side, hand it to
    /// the registered callback together with the shared context, and push the
    /// returned value; an empty ACTION cell is a syntax error carrying the
    /// offending state and token.
    pub fn parse<I>(&self, tokens: I, context: &mut C) -> Result<V, Box<dyn Error>>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut states: Vec<usize> = vec![0];
        let mut values: Vec<ParseValue<V>> = vec![ParseValue::Lexeme(String::from("$"))];
        let mut state = 0;

        for token in tokens {
            loop {
                let entry = match self.action.get(state, token.id) {
                    Some(entry) => entry,
                    None => return Err(Box::new(SyntaxError::new(state, &token))),
                };

                match entry {
                    ActionEntry::Shift(next) => {
                        states.push(next);
                        values.push(ParseValue::Lexeme(token.lexeme));
                        state = next;
                        break;
                    }
                    ActionEntry::Reduce(production) => {
                        let (arity, lhs) = self.productions.get(&production).ok_or_else(|| {
                            LangDefError::from(format!("unknown production id {}", production))
                        })?;

                        let mut arguments = Vec::with_capacity(*arity);
                        for _ in 0..*arity {
                            states.pop();
                            arguments.push(values.pop().ok_or_else(|| {
                                LangDefError::from("value stack underflow during reduce")
                            })?);
                        }
                        arguments.reverse();

                        let callback = self.callbacks.get(&production).ok_or_else(|| {
                            LangDefError::from(format!(
                                "no callback registered for production `{}`",
                                self.production_text(production).unwrap_or("?")
                            ))
                        })?;
                        let value = callback(context, arguments);

                        state = *states.last().ok_or_else(|| {
                            LangDefError::from("state stack underflow during reduce")
                        })?;
                        let next = self.goto.get(state, lhs).ok_or_else(|| {
                            LangDefError::from(format!("missing goto for `{}`", lhs))
                        })?;
                        states.push(next);
                        values.push(ParseValue::Value(value));
                        state = next;
                    }
                    ActionEntry::Accept => {
                        return match values.pop() {
                            Some(ParseValue::Value(value)) => Ok(value),
                            _ => Err(Box::new(LangDefError::from(
                                "parse accepted without a reduced value",
                            ))),
                        };
                    }
                }
            }
        }

        Err(Box::new(LangDefError::from(
            "token stream ended without EOF",
        )))
    }
}

/// An empty ACTION cell: the input does not belong to the language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub state: usize,
    pub token: i32,
    pub lexeme: String,
}

impl SyntaxError {
    fn new(state: usize, token: &Token) -> Self {
        SyntaxError {
            state,
            token: token.id,
            lexeme: token.lexeme.clone(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "syntax error: state {}, token {} (`{}`)",
            self.state, self.token, self.lexeme
        )
    }
}

impl Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use crate::langdef::scanner::Token;
    use crate::langdef::{LangDef, ParseValue};

    use super::SyntaxError;

    fn counter() -> LangDef<i64> {
        let mut ld: LangDef<i64> = LangDef::build(
            r#"
            S -> S "a" | "a"
            "#,
        )
        .unwrap();
        ld.register(&[r#"S -> "a""#], |_, _| 1).unwrap();
        ld.register(&[r#"S -> S "a""#], |_, mut args| {
            args.truncate(1);
            args.pop().unwrap().into_value().unwrap() + 1
        })
        .unwrap();
        ld
    }

    #[test]
    fn shift_and_reduce_to_a_value() {
        let ld = counter();
        assert_eq!(ld.eval("a", &mut ()).unwrap(), 1);
        assert_eq!(ld.eval("a a a a", &mut ()).unwrap(), 4);
    }

    #[test]
    fn syntax_error_carries_state_and_token() {
        let mut ld: LangDef<i64> = LangDef::build(
            r#"
            S -> "a" "b"
            "#,
        )
        .unwrap();
        ld.register(&[r#"S -> "a" "b""#], |_, _| 0).unwrap();

        let err = ld.eval("a a", &mut ()).unwrap_err();
        let syntax = err.downcast_ref::<SyntaxError>().unwrap();
        assert_eq!(syntax.lexeme, "a");
        assert_eq!(syntax.token, 0);

        // An early end of input surfaces as a syntax error on EOF.
        let err = ld.eval("a", &mut ()).unwrap_err();
        let syntax = err.downcast_ref::<SyntaxError>().unwrap();
        assert_eq!(syntax.token, -1);
    }

    #[test]
    fn truncated_streams_are_rejected() {
        let ld = counter();
        let tokens = vec![Token::new(0, "a")];
        let err = ld.parse(tokens, &mut ()).unwrap_err();
        assert!(err.to_string().contains("without EOF"));
    }

    #[test]
    fn context_is_threaded_through_reductions() {
        let mut ld: LangDef<i64, Vec<String>> = LangDef::build(
            r#"
            S -> S "a" | "a"
            "#,
        )
        .unwrap();
        ld.register(&[r#"S -> "a""#, r#"S -> S "a""#], |seen, mut args| {
            seen.push(
                args.pop()
                    .and_then(|arg| arg.lexeme().map(String::from))
                    .unwrap(),
            );
            seen.len() as i64
        })
        .unwrap();

        let mut seen = Vec::new();
        assert_eq!(ld.eval("a a a", &mut seen).unwrap(), 3);
        assert_eq!(seen, vec!["a", "a", "a"]);
    }
}
