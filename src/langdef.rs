//! The portable language definition.
//!
//! A [`LangDef`] captures everything a front end needs at run time — the
//! merged scanner DFA, the production registry, and the ACTION/GOTO tables —
//! with no dependency on the structures that generated them. Build one from a
//! grammar, or reload one from its serialized form and re-register the
//! reduction callbacks.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::automata::set::DfaSet;
use crate::grammar::ContextFreeGrammar;
use crate::tables::automaton::ItemSetAutomaton;
use crate::tables::{ActionTable, GotoTable};

use self::scanner::Tokens;

pub mod json;
pub mod parser;
pub mod scanner;

/// A value on the parse stack: the raw lexeme of a shifted terminal, or the
/// value an earlier reduction produced for a non-terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseValue<V> {
    Lexeme(String),
    Value(V),
}

impl<V> ParseValue<V> {
    pub fn lexeme(&self) -> Option<&str> {
        match self {
            ParseValue::Lexeme(lexeme) => Some(lexeme),
            ParseValue::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            ParseValue::Lexeme(_) => None,
            ParseValue::Value(value) => Some(value),
        }
    }
}

/// A reduction callback: the shared context first, then the right-hand-side
/// values in source order. Callbacks are `Send + Sync` so a populated
/// [`LangDef`] can be shared immutably across threads.
pub type Callback<V, C> = Arc<dyn Fn(&mut C, Vec<ParseValue<V>>) -> V + Send + Sync>;

/// A frozen language definition producing values of type `V`, threading a
/// caller-owned context of type `C` through every reduction.
pub struct LangDef<V, C = ()> {
    dfa: DfaSet,
    raw_grammar_to_id: HashMap<String, usize>,
    productions: HashMap<usize, (usize, String)>,
    action: ActionTable,
    goto: GotoTable,
    callbacks: HashMap<usize, Callback<V, C>>,
}

impl<V, C> fmt::Debug for LangDef<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangDef")
            .field("dfa", &self.dfa)
            .field("raw_grammar_to_id", &self.raw_grammar_to_id)
            .field("productions", &self.productions)
            .field("action", &self.action)
            .field("goto", &self.goto)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<V, C> LangDef<V, C> {
    /// Generate a language definition from a grammar text: scanner DFA,
    /// LR(1) item-set automaton, and ACTION/GOTO tables.
    pub fn build(grammar: &str) -> Result<Self, Box<dyn Error>> {
        let cfg = ContextFreeGrammar::from_string(grammar)?;
        let automaton = ItemSetAutomaton::from_grammar(&cfg);
        let (action, goto) = crate::tables::build(&cfg, &automaton)?;
        let dfa = cfg.typedef().build_dfa_set()?;

        Ok(LangDef {
            dfa,
            raw_grammar_to_id: cfg.raw_to_id().clone(),
            productions: cfg.production_info(),
            action,
            goto,
            callbacks: HashMap::new(),
        })
    }

    /// Attach one callback to one or more productions, named by their raw
    /// grammar text. Whitespace is normalized, so the spelling only has to
    /// match up to spacing.
    pub fn register<F>(&mut self, productions: &[&str], callback: F) -> Result<(), Box<dyn Error>>
    where
        F: Fn(&mut C, Vec<ParseValue<V>>) -> V + Send + Sync + 'static,
    {
        let callback: Callback<V, C> = Arc::new(callback);
        for production in productions {
            let key = crate::grammar::normalize(production);
            let id = self.raw_grammar_to_id.get(&key).ok_or_else(|| {
                LangDefError::from(format!("unknown production `{}`", production))
            })?;
            self.callbacks.insert(*id, Arc::clone(&callback));
        }
        Ok(())
    }

    /// Tokenize a source string against the scanner DFA. The stream is lazy
    /// and always ends with the EOF token `(-1, "$")`.
    pub fn scan<'a>(&'a self, source: &'a str) -> Tokens<'a> {
        Tokens::new(&self.dfa, source)
    }

    /// Tokenize and parse in one step.
    pub fn eval(&self, source: &str, context: &mut C) -> Result<V, Box<dyn Error>> {
        self.parse(self.scan(source), context)
    }

    pub(crate) fn production_text(&self, id: usize) -> Option<&str> {
        self.raw_grammar_to_id
            .iter()
            .find(|(_, &candidate)| candidate == id)
            .map(|(text, _)| text.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LangDefError {
    msg: String,
}

impl From<&str> for LangDefError {
    fn from(msg: &str) -> Self {
        LangDefError {
            msg: msg.to_string(),
        }
    }
}

impl From<String> for LangDefError {
    fn from(msg: String) -> Self {
        LangDefError { msg }
    }
}

impl fmt::Display for LangDefError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "langdef: {}", self.msg)
    }
}

impl Error for LangDefError {}
