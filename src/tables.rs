//! ACTION and GOTO tables and their construction from the item-set
//! automaton.
//!
//! Every terminal-labeled edge becomes a shift, every non-terminal edge a
//! goto, and every completed item a reduce under each of its lookaheads
//! (or the accept, for the synthesized start production). Writing two
//! different values into one cell means the grammar is not LR(1); the builder
//! fails with both entries rather than overwriting.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::grammar::{ContextFreeGrammar, Symbol};

use self::automaton::ItemSetAutomaton;

pub mod automaton;
pub mod display;
pub mod item;
pub mod itemset;

/// One ACTION cell. On the wire this is the `[kind, argument]` pair
/// `[0, state]` for shift, `[1, production]` for reduce, and `[2, null]` for
/// accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionEntry {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl fmt::Display for ActionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ActionEntry::Shift(state) => write!(f, "shift {}", state),
            ActionEntry::Reduce(production) => write!(f, "reduce {}", production),
            ActionEntry::Accept => write!(f, "accept"),
        }
    }
}

impl Serialize for ActionEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let pair: (u8, Option<usize>) = match self {
            ActionEntry::Shift(state) => (0, Some(*state)),
            ActionEntry::Reduce(production) => (1, Some(*production)),
            ActionEntry::Accept => (2, None),
        };
        pair.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActionEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match <(u8, Option<usize>)>::deserialize(deserializer)? {
            (0, Some(state)) => Ok(ActionEntry::Shift(state)),
            (1, Some(production)) => Ok(ActionEntry::Reduce(production)),
            (2, _) => Ok(ActionEntry::Accept),
            (kind, _) => Err(serde::de::Error::custom(format!(
                "malformed action entry of kind {}",
                kind
            ))),
        }
    }
}

/// The partial map `state × terminal → action`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTable {
    pub state_count: usize,
    pub table: Vec<BTreeMap<i32, ActionEntry>>,
}

impl ActionTable {
    pub fn new(state_count: usize) -> Self {
        ActionTable {
            state_count,
            table: vec![BTreeMap::new(); state_count],
        }
    }

    pub fn get(&self, state: usize, terminal: i32) -> Option<ActionEntry> {
        self.table.get(state).and_then(|row| row.get(&terminal)).copied()
    }

    /// Insert a cell, refusing to overwrite a different existing entry.
    fn set(&mut self, state: usize, terminal: i32, entry: ActionEntry) -> Result<(), ActionEntry> {
        match self.table[state].get(&terminal) {
            Some(&existing) if existing != entry => Err(existing),
            _ => {
                self.table[state].insert(terminal, entry);
                Ok(())
            }
        }
    }
}

impl fmt::Display for ActionTable {
    /// An aligned grid of every populated terminal column per state.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let columns: Vec<i32> = self
            .table
            .iter()
            .flat_map(|row| row.keys().copied())
            .sorted()
            .dedup()
            .collect();

        let mut widths: Vec<usize> = columns.iter().map(|t| t.to_string().len()).collect();
        for row in &self.table {
            for (i, terminal) in columns.iter().enumerate() {
                if let Some(entry) = row.get(terminal) {
                    widths[i] = widths[i].max(entry.to_string().len());
                }
            }
        }

        let header = columns
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{:>width$}", t, width = widths[i]))
            .join("\t");
        writeln!(f, " \t{}", header)?;

        for (state, row) in self.table.iter().enumerate() {
            let cells = columns
                .iter()
                .enumerate()
                .map(|(i, terminal)| match row.get(terminal) {
                    Some(entry) => format!("{:>width$}", entry.to_string(), width = widths[i]),
                    None => format!("{:>width$}", "", width = widths[i]),
                })
                .join("\t");
            writeln!(f, "{}\t{}", state, cells)?;
        }
        Ok(())
    }
}

/// The map `state × non-terminal → state`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoTable {
    pub state_count: usize,
    pub table: Vec<BTreeMap<String, usize>>,
}

impl GotoTable {
    pub fn new(state_count: usize) -> Self {
        GotoTable {
            state_count,
            table: vec![BTreeMap::new(); state_count],
        }
    }

    pub fn get(&self, state: usize, non_terminal: &str) -> Option<usize> {
        self.table
            .get(state)
            .and_then(|row| row.get(non_terminal))
            .copied()
    }
}

impl fmt::Display for GotoTable {
    /// An aligned grid of every populated non-terminal column per state.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let columns: Vec<&String> = self
            .table
            .iter()
            .flat_map(|row| row.keys())
            .sorted()
            .dedup()
            .collect();

        let mut widths: Vec<usize> = columns.iter().map(|name| name.len()).collect();
        for row in &self.table {
            for (i, name) in columns.iter().enumerate() {
                if let Some(target) = row.get(*name) {
                    widths[i] = widths[i].max(target.to_string().len());
                }
            }
        }

        let header = columns
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{:>width$}", name, width = widths[i]))
            .join("\t");
        writeln!(f, " \t{}", header)?;

        for (state, row) in self.table.iter().enumerate() {
            let cells = columns
                .iter()
                .enumerate()
                .map(|(i, name)| match row.get(*name) {
                    Some(target) => format!("{:>width$}", target, width = widths[i]),
                    None => format!("{:>width$}", "", width = widths[i]),
                })
                .join("\t");
            writeln!(f, "{}\t{}", state, cells)?;
        }
        Ok(())
    }
}

/// Two different entries competing for one ACTION cell: the grammar is not
/// LR(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictError {
    pub state: usize,
    pub symbol: String,
    pub existing: ActionEntry,
    pub attempted: ActionEntry,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "tables: grammar is not LR(1): state {} on {}: {} conflicts with {}",
            self.state, self.symbol, self.existing, self.attempted
        )
    }
}

impl Error for ConflictError {}

/// Emit the ACTION and GOTO tables for a grammar and its item-set automaton.
pub fn build(
    cfg: &ContextFreeGrammar,
    automaton: &ItemSetAutomaton,
) -> Result<(ActionTable, GotoTable), ConflictError> {
    let mut action = ActionTable::new(automaton.state_count());
    let mut goto = GotoTable::new(automaton.state_count());

    for (source, edges) in automaton.edges.iter().enumerate() {
        for (symbol, target) in edges {
            match symbol {
                Symbol::Terminal(terminal) => {
                    action.set(source, *terminal, ActionEntry::Shift(*target)).map_err(
                        |existing| ConflictError {
                            state: source,
                            symbol: display::terminal_string(cfg.typedef(), *terminal),
                            existing,
                            attempted: ActionEntry::Shift(*target),
                        },
                    )?;
                }
                Symbol::NonTerminal(name) => {
                    goto.table[source].insert(name.clone(), *target);
                }
                Symbol::Empty => {}
            }
        }
    }

    for (state, set) in automaton.states.iter().enumerate() {
        for item in set.items() {
            if !item.at_end(cfg) {
                continue;
            }
            let entry = if item.production == 0 {
                ActionEntry::Accept
            } else {
                ActionEntry::Reduce(item.production)
            };
            for &lookahead in item.lookaheads.iter() {
                action.set(state, lookahead, entry).map_err(|existing| ConflictError {
                    state,
                    symbol: display::terminal_string(cfg.typedef(), lookahead),
                    existing,
                    attempted: entry,
                })?;
            }
        }
    }

    Ok((action, goto))
}

#[cfg(test)]
mod tests {
    use crate::grammar::{ContextFreeGrammar, EOF};

    use super::automaton::ItemSetAutomaton;
    use super::{build, ActionEntry, ActionTable};

    fn tables(grammar: &str) -> Result<(super::ActionTable, super::GotoTable), super::ConflictError> {
        let cfg = ContextFreeGrammar::from_string(grammar).unwrap();
        let automaton = ItemSetAutomaton::from_grammar(&cfg);
        build(&cfg, &automaton)
    }

    #[test]
    fn calculator_grammar_builds() {
        let (action, goto) = tables(
            r#"
            E -> E "+" T | E "-" T | T
            T -> T "*" F | F
            F -> "(" E ")" | int
            int -> r"0|-?[1-9][0-9]*"
            "#,
        )
        .unwrap();

        assert_eq!(action.state_count, goto.state_count);
        assert!(action.state_count > 0);
        // Exactly one accept cell, on EOF.
        let mut accepts = Vec::new();
        for (state, row) in action.table.iter().enumerate() {
            for (&terminal, &entry) in row {
                if entry == ActionEntry::Accept {
                    accepts.push((state, terminal));
                }
            }
        }
        assert_eq!(accepts.len(), 1);
        assert_eq!(accepts[0].1, EOF);
    }

    #[test]
    fn shift_reduce_conflict_is_reported() {
        // The dangling else: after `"i" S`, an `"e"` can extend the statement
        // or close the outer one.
        let err = tables(r#"S -> "i" S | "i" S "e" S | "x""#).unwrap_err();
        assert_eq!(err.symbol, "\"e\"");
        assert!(matches!(err.existing, ActionEntry::Shift(_)));
        assert!(matches!(err.attempted, ActionEntry::Reduce(_)));
    }

    #[test]
    fn reduce_reduce_conflict_is_reported() {
        let err = tables(
            r#"
            S -> A | B
            A -> "a"
            B -> "a"
            "#,
        )
        .unwrap_err();
        assert_eq!(err.symbol, "$");
        assert!(matches!(err.existing, ActionEntry::Reduce(_)));
        assert!(matches!(err.attempted, ActionEntry::Reduce(_)));
        assert_ne!(err.existing, err.attempted);
    }

    #[test]
    fn action_entry_wire_format() {
        let shift = serde_json::to_string(&ActionEntry::Shift(7)).unwrap();
        assert_eq!(shift, "[0,7]");
        let reduce = serde_json::to_string(&ActionEntry::Reduce(3)).unwrap();
        assert_eq!(reduce, "[1,3]");
        let accept = serde_json::to_string(&ActionEntry::Accept).unwrap();
        assert_eq!(accept, "[2,null]");

        for text in ["[0,7]", "[1,3]", "[2,null]"] {
            let entry: ActionEntry = serde_json::from_str(text).unwrap();
            assert_eq!(serde_json::to_string(&entry).unwrap(), text);
        }
        assert!(serde_json::from_str::<ActionEntry>("[9,0]").is_err());
    }

    #[test]
    fn table_json_uses_string_keys() {
        let mut table = ActionTable::new(1);
        table.set(0, EOF, ActionEntry::Accept).unwrap();
        table.set(0, 2, ActionEntry::Shift(1)).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.contains("\"-1\":[2,null]"));
        assert!(json.contains("\"2\":[0,1]"));

        let restored: ActionTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn grid_rendering_mentions_every_state() {
        let (action, goto) = tables(r#"S -> "a" S | "b""#).unwrap();
        let grid = action.to_string();
        for state in 0..action.state_count {
            assert!(grid.contains(&format!("\n{}\t", state)));
        }

        let grid = goto.to_string();
        assert!(grid.contains('S'));
        assert_eq!(grid.lines().count(), goto.state_count + 1);
    }
}
