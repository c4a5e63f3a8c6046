//! The context-free grammar model.
//!
//! A grammar is written one production per line as
//! `LHS -> ALT | ALT | ...`, where each alternative is a whitespace-separated
//! list of bare identifiers (non-terminals, resolved after a first pass that
//! collects every left-hand side), `"literal"` terminals, `r"regex"`
//! terminals, and `''` for the empty alternative. The left-hand side of the
//! first production is the start symbol; a dedicated `$accept` production
//! wrapping it is synthesized with id 0 so the accept action never depends on
//! the textual order of the user's productions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::error::Error;
use std::fmt;

use self::typedef::TypeDefinition;

pub mod typedef;

/// The sentinel terminal id for the end of input.
pub const EOF: i32 = -1;

/// The left-hand side of the synthesized start production. The `$` keeps it
/// out of the identifier space of user grammars.
pub const ACCEPT: &str = "$accept";

/// Suffix used to name substitute non-terminals during left-recursion
/// elimination.
const SUBSTITUTE: &str = "_";

/// A grammar symbol: a terminal pattern id, a non-terminal name, or ε.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(i32),
    NonTerminal(String),
    Empty,
}

/// A single production alternative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl Production {
    /// The number of grammar symbols on the right-hand side, with ε counting
    /// for nothing.
    pub fn arity(&self) -> usize {
        self.rhs.iter().filter(|sym| **sym != Symbol::Empty).count()
    }
}

/// The FIRST set of a symbol or sequence: the terminals that may begin a
/// derivation, plus whether the whole thing can derive ε.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<i32>,
    pub empty: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextFreeGrammar {
    typedef: TypeDefinition,
    terminals: BTreeSet<i32>,
    non_terminals: BTreeSet<String>,
    start_symbol: String,
    productions: Vec<Production>,
    raw_to_id: HashMap<String, usize>,
    by_lhs: BTreeMap<String, Vec<usize>>,
}

impl ContextFreeGrammar {
    /// Parse a grammar text.
    pub fn from_string(grammar: &str) -> Result<Self, GrammarError> {
        // First pass: line structure and the set of non-terminal names.
        let mut lines: Vec<(String, Vec<Vec<String>>)> = Vec::new();
        let mut lhs_names: BTreeSet<String> = BTreeSet::new();

        for (number, raw) in grammar.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (lhs, rest) = line.split_once("->").ok_or_else(|| {
                GrammarError::from(format!("line {}: expected `LHS -> ...`", number + 1))
            })?;
            let lhs = lhs.trim();
            if lhs.is_empty() {
                return Err(GrammarError::from(format!(
                    "line {}: missing left-hand side",
                    number + 1
                )));
            }

            let mut alternatives: Vec<Vec<String>> = vec![Vec::new()];
            for token in rest.split_whitespace() {
                if token == "|" {
                    alternatives.push(Vec::new());
                } else {
                    alternatives
                        .last_mut()
                        .expect("at least one alternative")
                        .push(String::from(token));
                }
            }
            if alternatives.iter().any(Vec::is_empty) {
                return Err(GrammarError::from(format!(
                    "line {}: empty alternative (use '' for ε)",
                    number + 1
                )));
            }

            lhs_names.insert(String::from(lhs));
            lines.push((String::from(lhs), alternatives));
        }

        let start_symbol = match lines.first() {
            Some((lhs, _)) => lhs.clone(),
            None => return Err(GrammarError::from("empty grammar")),
        };

        // Second pass: resolve symbols, registering terminals as they appear.
        let mut typedef = TypeDefinition::new();
        let mut terminals: BTreeSet<i32> = BTreeSet::new();
        let mut productions = vec![Production {
            lhs: String::from(ACCEPT),
            rhs: vec![Symbol::NonTerminal(start_symbol.clone())],
        }];
        let mut raw_to_id: HashMap<String, usize> = HashMap::new();
        let mut by_lhs: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        by_lhs.insert(String::from(ACCEPT), vec![0]);

        for (lhs, alternatives) in &lines {
            for alternative in alternatives {
                let mut rhs = Vec::with_capacity(alternative.len());
                for token in alternative {
                    if token == "''" {
                        rhs.push(Symbol::Empty);
                    } else if lhs_names.contains(token.as_str()) {
                        rhs.push(Symbol::NonTerminal(token.clone()));
                    } else if let Some((text, is_regex)) = parse_quoted(token) {
                        let id = typedef.add(text, is_regex) as i32;
                        terminals.insert(id);
                        rhs.push(Symbol::Terminal(id));
                    } else {
                        return Err(GrammarError::from(format!(
                            "`{}` is neither a defined non-terminal nor a quoted terminal",
                            token
                        )));
                    }
                }

                // ε only stands alone; drop it from longer alternatives.
                if rhs.len() > 1 {
                    rhs.retain(|sym| *sym != Symbol::Empty);
                    if rhs.is_empty() {
                        rhs.push(Symbol::Empty);
                    }
                }

                let id = productions.len();
                raw_to_id.insert(format!("{} -> {}", lhs, alternative.join(" ")), id);
                by_lhs.entry(lhs.clone()).or_default().push(id);
                productions.push(Production {
                    lhs: lhs.clone(),
                    rhs,
                });
            }
        }

        let mut non_terminals = lhs_names;
        non_terminals.insert(String::from(ACCEPT));

        Ok(ContextFreeGrammar {
            typedef,
            terminals,
            non_terminals,
            start_symbol,
            productions,
            raw_to_id,
            by_lhs,
        })
    }

    pub fn typedef(&self) -> &TypeDefinition {
        &self.typedef
    }

    pub fn terminals(&self) -> &BTreeSet<i32> {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &BTreeSet<String> {
        &self.non_terminals
    }

    /// The user's start symbol (the first left-hand side).
    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: usize) -> &Production {
        &self.productions[id]
    }

    /// Production ids with the given left-hand side.
    pub fn productions_of(&self, lhs: &str) -> &[usize] {
        self.by_lhs.get(lhs).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The id registered for a raw production line, with whitespace
    /// normalized on both sides.
    pub fn production_id(&self, raw: &str) -> Option<usize> {
        self.raw_to_id.get(&normalize(raw)).copied()
    }

    pub fn raw_to_id(&self) -> &HashMap<String, usize> {
        &self.raw_to_id
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(name)
    }

    /// The symbol after the dot, or `None` when the dot is at the end
    /// (ε alternatives put the dot at the end immediately).
    pub fn symbol_after_dot(&self, production: usize, dot: usize) -> Option<&Symbol> {
        let p = &self.productions[production];
        if p.arity() == 0 {
            return None;
        }
        p.rhs.get(dot)
    }

    pub fn at_end(&self, production: usize, dot: usize) -> bool {
        dot >= self.productions[production].arity()
    }

    /// Per-production argument count and left-hand side, keyed by id. This is
    /// the shape the parse driver needs at run time.
    pub fn production_info(&self) -> HashMap<usize, (usize, String)> {
        self.productions
            .iter()
            .enumerate()
            .map(|(id, p)| (id, (p.arity(), p.lhs.clone())))
            .collect()
    }

    /// FIRST sets of every non-terminal, computed as the least fixed point.
    pub fn first(&self) -> BTreeMap<String, FirstSet> {
        let mut map: BTreeMap<String, FirstSet> = self
            .non_terminals
            .iter()
            .map(|name| (name.clone(), FirstSet::default()))
            .collect();

        loop {
            let mut changed = false;
            for production in &self.productions {
                let first = self.first_of_sequence(&production.rhs, &map);
                let entry = map
                    .get_mut(&production.lhs)
                    .expect("every lhs is a non-terminal");
                for terminal in first.terminals {
                    changed |= entry.terminals.insert(terminal);
                }
                if first.empty && !entry.empty {
                    entry.empty = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        map
    }

    /// FIRST of a symbol sequence, scanning left to right and continuing past
    /// a symbol only while it can derive ε.
    pub fn first_of_sequence(
        &self,
        sequence: &[Symbol],
        map: &BTreeMap<String, FirstSet>,
    ) -> FirstSet {
        let mut out = FirstSet::default();
        let mut nullable = true;

        for symbol in sequence {
            match symbol {
                Symbol::Terminal(t) => {
                    out.terminals.insert(*t);
                    nullable = false;
                }
                Symbol::Empty => {
                    out.empty = true;
                }
                Symbol::NonTerminal(name) => match map.get(name) {
                    Some(first) => {
                        out.terminals.extend(first.terminals.iter().copied());
                        nullable = first.empty;
                    }
                    None => nullable = false,
                },
            }
            if !nullable {
                break;
            }
        }

        if nullable {
            out.empty = true;
        }
        out
    }

    /// Whether any production is directly left recursive.
    pub fn is_left_recursive(&self) -> bool {
        self.productions
            .iter()
            .any(|p| p.rhs.first() == Some(&Symbol::NonTerminal(p.lhs.clone())))
    }

    /// Rewrite away direct left recursion: `A -> A α | β` becomes
    /// `A -> β A_` and `A_ -> α A_ | ''`.
    pub fn remove_left_recursion(&self) -> Self {
        let mut productions: Vec<Production> = Vec::new();
        let mut non_terminals = self.non_terminals.clone();
        let mut by_lhs: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (lhs, ids) in &self.by_lhs {
            let recursive = ids
                .iter()
                .any(|&id| self.productions[id].rhs.first() == Some(&Symbol::NonTerminal(lhs.clone())));

            if !recursive {
                for &id in ids {
                    by_lhs.entry(lhs.clone()).or_default().push(productions.len());
                    productions.push(self.productions[id].clone());
                }
                continue;
            }

            let substitute = format!("{}{}", lhs, SUBSTITUTE);
            non_terminals.insert(substitute.clone());

            for &id in ids {
                let rhs = &self.productions[id].rhs;
                let (new_lhs, mut new_rhs) = if rhs.first() == Some(&Symbol::NonTerminal(lhs.clone()))
                {
                    (substitute.clone(), rhs[1..].to_vec())
                } else if *rhs == [Symbol::Empty] {
                    (lhs.clone(), Vec::new())
                } else {
                    (lhs.clone(), rhs.clone())
                };
                new_rhs.push(Symbol::NonTerminal(substitute.clone()));

                by_lhs.entry(new_lhs.clone()).or_default().push(productions.len());
                productions.push(Production {
                    lhs: new_lhs,
                    rhs: new_rhs,
                });
            }

            by_lhs
                .entry(substitute.clone())
                .or_default()
                .push(productions.len());
            productions.push(Production {
                lhs: substitute,
                rhs: vec![Symbol::Empty],
            });
        }

        ContextFreeGrammar {
            typedef: self.typedef.clone(),
            terminals: self.terminals.clone(),
            non_terminals,
            start_symbol: self.start_symbol.clone(),
            productions,
            raw_to_id: self.raw_to_id.clone(),
            by_lhs,
        }
    }
}

/// Strip the quoting of a terminal token: `"text"` and `'text'` are literal
/// patterns, `r"text"` and `r'text'` are regex patterns.
pub(crate) fn parse_quoted(token: &str) -> Option<(&str, bool)> {
    let (body, is_regex) = match token.strip_prefix('r') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if body.len() >= 2
        && ((body.starts_with('"') && body.ends_with('"'))
            || (body.starts_with('\'') && body.ends_with('\'')))
    {
        Some((&body[1..body.len() - 1], is_regex))
    } else {
        None
    }
}

/// Collapse runs of whitespace so registration and lookup of production text
/// agree on one spelling.
pub(crate) fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone)]
pub struct GrammarError {
    msg: String,
}

impl From<&str> for GrammarError {
    fn from(msg: &str) -> Self {
        GrammarError {
            msg: msg.to_string(),
        }
    }
}

impl From<String> for GrammarError {
    fn from(msg: String) -> Self {
        GrammarError { msg }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "grammar: {}", self.msg)
    }
}

impl Error for GrammarError {}
