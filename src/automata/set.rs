//! The merged scanner automaton.
//!
//! Many per-pattern automata are fused into a single DFA that remembers, at
//! every accept state, which pattern it accepts for. Ties between patterns
//! accepting the same prefix are resolved once, at determinization time, by
//! keeping the smallest pattern id.

use super::transition::Transition;
use super::{DfaJson, FiniteAutomata, Node};

/// A deterministic automaton scanning for an ordered list of patterns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaSet {
    dfa: FiniteAutomata,
}

impl DfaSet {
    /// Merge the given automata, in priority order, into one scanner DFA.
    pub fn new(automata: Vec<FiniteAutomata>) -> Self {
        let mut merged = FiniteAutomata::new();

        for (pattern, mut fa) in automata.into_iter().enumerate() {
            fa.tag_accepts(pattern);

            let offset = merged.nodes.len();
            let entry = fa.start + offset;
            for node in fa.nodes {
                merged.nodes.push(Node {
                    edges: node
                        .edges
                        .into_iter()
                        .map(|(label, to)| (label, to + offset))
                        .collect(),
                    pattern: node.pattern,
                });
            }
            for accept in fa.accepts {
                merged.accepts.insert(accept + offset);
            }
            merged.add_edge(merged.start, Transition::epsilon(), entry);
        }

        DfaSet {
            dfa: merged.determinize(),
        }
    }

    /// The longest prefix of `input` accepted by any pattern, together with
    /// the id of the pattern accepting it.
    ///
    /// The id is taken from the last accept state visited along the longest
    /// match; at equal length, the smallest pattern id wins. Returns an empty
    /// lexeme (and no pattern) when nothing matches.
    pub fn match_one<'a>(&self, input: &'a str) -> (Option<usize>, &'a str) {
        debug_assert!(self.dfa.deterministic);

        let mut current = self.dfa.start;
        let mut consumed = 0;
        let mut committed = 0;
        let mut pattern = None;

        for c in input.chars() {
            if self.dfa.accepts.contains(&current) {
                committed = consumed;
                pattern = self.dfa.nodes[current].pattern;
            }
            match self.dfa.step(current, c) {
                Some(next) => {
                    current = next;
                    consumed += c.len_utf8();
                }
                None => break,
            }
        }
        if self.dfa.accepts.contains(&current) {
            committed = consumed;
            pattern = self.dfa.nodes[current].pattern;
        }

        (pattern, &input[..committed])
    }

    pub fn node_count(&self) -> usize {
        self.dfa.node_count()
    }

    pub fn to_json(&self) -> DfaJson {
        self.dfa.to_json()
    }

    pub fn from_json(json: &DfaJson) -> Self {
        DfaSet {
            dfa: FiniteAutomata::from_json(json),
        }
    }
}
