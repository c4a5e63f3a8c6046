//! The terminal-pattern registry.
//!
//! Patterns are keyed by their raw text and receive dense ids in insertion
//! order; re-inserting an existing pattern keeps its original id. The
//! registry also owns the construction of the merged scanner automaton,
//! taking a straight-line fast path for literal patterns and the full
//! regex pipeline for the rest.

use std::collections::HashMap;

use crate::automata::regex::RegexError;
use crate::automata::set::DfaSet;
use crate::automata::FiniteAutomata;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeDefinition {
    patterns: Vec<(String, bool)>,
    ids: HashMap<String, usize>,
}

impl TypeDefinition {
    pub fn new() -> Self {
        TypeDefinition::default()
    }

    /// Register a pattern and return its id. A no-op for known patterns.
    pub fn add(&mut self, pattern: &str, is_regex: bool) -> usize {
        match self.ids.get(pattern) {
            Some(&id) => id,
            None => {
                let id = self.patterns.len();
                self.patterns.push((String::from(pattern), is_regex));
                self.ids.insert(String::from(pattern), id);
                id
            }
        }
    }

    pub fn id_of(&self, pattern: &str) -> Option<usize> {
        self.ids.get(pattern).copied()
    }

    pub fn text_of(&self, id: usize) -> Option<&str> {
        self.patterns.get(id).map(|(text, _)| text.as_str())
    }

    /// The pattern in its grammar spelling: `"text"` or `r"text"`.
    pub fn pattern(&self, id: usize) -> Option<String> {
        self.patterns.get(id).map(|(text, is_regex)| {
            if *is_regex {
                format!("r\"{}\"", text)
            } else {
                format!("\"{}\"", text)
            }
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Build the merged scanner DFA over all registered patterns.
    pub fn build_dfa_set(&self) -> Result<DfaSet, RegexError> {
        let mut automata = Vec::with_capacity(self.patterns.len());
        for (text, is_regex) in &self.patterns {
            let fa = if *is_regex {
                FiniteAutomata::from_regex(text)?.minimize()
            } else {
                FiniteAutomata::from_literal(text)
            };
            automata.push(fa);
        }
        Ok(DfaSet::new(automata))
    }
}
