//! The canonical collection of LR(1) item sets.

use std::collections::{HashMap, VecDeque};

use crate::grammar::{ContextFreeGrammar, Symbol, EOF};

use super::itemset::{FirstMemo, ItemSet};

/// The item-set automaton: states in discovery order and the labeled edges
/// between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSetAutomaton {
    pub states: Vec<ItemSet>,
    pub edges: Vec<Vec<(Symbol, usize)>>,
}

impl ItemSetAutomaton {
    /// Build the canonical collection for a grammar.
    ///
    /// Seeds with the closure of the start production under EOF lookahead,
    /// then explores breadth-first, assigning state ids in discovery order.
    /// Goto results are memoized by kernel so the closure of a state reached
    /// along several paths is computed once.
    pub fn from_grammar(cfg: &ContextFreeGrammar) -> Self {
        let first_map = cfg.first();
        let mut memo = FirstMemo::new();

        let mut seed = ItemSet::new();
        seed.insert(0, 0, [EOF]);
        let seed = seed.closure(cfg, &first_map, &mut memo);

        let mut states = vec![seed.clone()];
        let mut edges: Vec<Vec<(Symbol, usize)>> = vec![Vec::new()];
        let mut state_ids: HashMap<ItemSet, usize> = HashMap::from([(seed, 0)]);
        let mut kernel_ids: HashMap<ItemSet, usize> = HashMap::new();
        let mut queue: VecDeque<usize> = VecDeque::from([0]);

        while let Some(current) = queue.pop_front() {
            let state = states[current].clone();
            for symbol in state.next_symbols(cfg) {
                let kernel = state.goto_kernel(cfg, &symbol);
                let target = match kernel_ids.get(&kernel) {
                    Some(&id) => id,
                    None => {
                        let closure = kernel.closure(cfg, &first_map, &mut memo);
                        let id = match state_ids.get(&closure) {
                            Some(&id) => id,
                            None => {
                                let id = states.len();
                                states.push(closure.clone());
                                edges.push(Vec::new());
                                state_ids.insert(closure, id);
                                queue.push_back(id);
                                id
                            }
                        };
                        kernel_ids.insert(kernel, id);
                        id
                    }
                };
                edges[current].push((symbol, target));
            }
        }

        ItemSetAutomaton { states, edges }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The id of a state equal to the given item set, if present.
    pub fn state_id(&self, set: &ItemSet) -> Option<usize> {
        self.states.iter().position(|state| state == set)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{ContextFreeGrammar, Symbol};
    use crate::tables::display;

    use super::ItemSetAutomaton;

    /// The textbook grammar whose canonical collection has ten states.
    fn sample() -> ContextFreeGrammar {
        ContextFreeGrammar::from_string(
            r#"
            S -> B B
            B -> "b" B | "a"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn canonical_collection_of_the_textbook_grammar() {
        let cfg = sample();
        let automaton = ItemSetAutomaton::from_grammar(&cfg);

        let expected = [
            r#"
            $accept ->  ◦ S, $
            S ->  ◦ B B, $
            B ->  ◦ "b" B, "b"/"a"
            B ->  ◦ "a", "b"/"a"
            "#,
            "$accept -> S ◦ , $",
            r#"
            S -> B ◦ B, $
            B ->  ◦ "b" B, $
            B ->  ◦ "a", $
            "#,
            r#"
            B -> "b" ◦ B, "b"/"a"
            B ->  ◦ "b" B, "b"/"a"
            B ->  ◦ "a", "b"/"a"
            "#,
            r#"B -> "a" ◦ , "b"/"a""#,
            "S -> B B ◦ , $",
            r#"
            B -> "b" ◦ B, $
            B ->  ◦ "b" B, $
            B ->  ◦ "a", $
            "#,
            r#"B -> "b" B ◦ , "b"/"a""#,
            r#"B -> "a" ◦ , $"#,
            r#"B -> "b" B ◦ , $"#,
        ];

        assert_eq!(automaton.state_count(), expected.len());
        for text in expected {
            let set = display::parse_item_set(&cfg, text).unwrap();
            assert!(
                automaton.state_id(&set).is_some(),
                "missing state:\n{}",
                display::item_set_string(&cfg, &set)
            );
        }
    }

    #[test]
    fn edges_of_the_textbook_grammar() {
        let cfg = sample();
        let automaton = ItemSetAutomaton::from_grammar(&cfg);

        let b = Symbol::Terminal(cfg.typedef().id_of("b").unwrap() as i32);
        let a = Symbol::Terminal(cfg.typedef().id_of("a").unwrap() as i32);
        let s = Symbol::NonTerminal(String::from("S"));
        let nt_b = Symbol::NonTerminal(String::from("B"));

        let id = |text: &str| {
            automaton
                .state_id(&display::parse_item_set(&cfg, text).unwrap())
                .unwrap()
        };

        let i0 = id(r#"
            $accept ->  ◦ S, $
            S ->  ◦ B B, $
            B ->  ◦ "b" B, "b"/"a"
            B ->  ◦ "a", "b"/"a"
        "#);
        let i1 = id("$accept -> S ◦ , $");
        let i2 = id(r#"
            S -> B ◦ B, $
            B ->  ◦ "b" B, $
            B ->  ◦ "a", $
        "#);
        let i3 = id(r#"
            B -> "b" ◦ B, "b"/"a"
            B ->  ◦ "b" B, "b"/"a"
            B ->  ◦ "a", "b"/"a"
        "#);
        let i4 = id(r#"B -> "a" ◦ , "b"/"a""#);
        let i5 = id("S -> B B ◦ , $");
        let i6 = id(r#"
            B -> "b" ◦ B, $
            B ->  ◦ "b" B, $
            B ->  ◦ "a", $
        "#);
        let i7 = id(r#"B -> "b" B ◦ , "b"/"a""#);
        let i8 = id(r#"B -> "a" ◦ , $"#);
        let i9 = id(r#"B -> "b" B ◦ , $"#);

        let expected_edges = [
            (i0, s.clone(), i1),
            (i0, nt_b.clone(), i2),
            (i0, b.clone(), i3),
            (i0, a.clone(), i4),
            (i2, nt_b.clone(), i5),
            (i2, b.clone(), i6),
            (i2, a.clone(), i8),
            (i3, b.clone(), i3),
            (i3, a.clone(), i4),
            (i3, nt_b.clone(), i7),
            (i6, b, i6),
            (i6, a, i8),
            (i6, nt_b, i9),
        ];

        for (src, symbol, dst) in &expected_edges {
            assert!(
                automaton.edges[*src].contains(&(symbol.clone(), *dst)),
                "missing edge {} -{:?}-> {}",
                src,
                symbol,
                dst
            );
        }
        assert_eq!(automaton.edge_count(), expected_edges.len());
    }

    #[test]
    fn collection_with_empty_productions() {
        let cfg = ContextFreeGrammar::from_string(
            r#"
            L -> M L "b" | "a"
            M -> ''
            "#,
        )
        .unwrap();
        let automaton = ItemSetAutomaton::from_grammar(&cfg);

        let expected = [
            r#"
            $accept ->  ◦ L, $
            L ->  ◦ M L "b", $
            L ->  ◦ "a", $
            M ->  ◦ '', "a"
            "#,
            "$accept -> L ◦ , $",
            r#"L -> "a" ◦ , $"#,
            r#"
            L -> M ◦ L "b", $
            L ->  ◦ M L "b", "b"
            L ->  ◦ "a", "b"
            M ->  ◦ '', "a"
            "#,
            r#"
            L -> M ◦ L "b", "b"
            L ->  ◦ M L "b", "b"
            L ->  ◦ "a", "b"
            M ->  ◦ '', "a"
            "#,
            r#"L -> "a" ◦ , "b""#,
            r#"L -> M L ◦ "b", $"#,
            r#"L -> M L "b" ◦ , $"#,
            r#"L -> M L ◦ "b", "b""#,
            r#"L -> M L "b" ◦ , "b""#,
        ];

        assert_eq!(automaton.state_count(), expected.len());
        let id = |text: &str| {
            automaton
                .state_id(&display::parse_item_set(&cfg, text).unwrap())
                .unwrap()
        };
        for text in expected {
            let _ = id(text);
        }
        assert_eq!(id(expected[0]), 0);

        // The self-loop on M: shifting M from the derived state lands back in
        // the same state.
        let derived = id(expected[4]);
        let m = Symbol::NonTerminal(String::from("M"));
        assert!(automaton.edges[derived].contains(&(m, derived)));
        assert_eq!(automaton.edge_count(), 11);
    }

    #[test]
    fn discovery_order_is_reproducible() {
        let cfg = sample();
        let first = ItemSetAutomaton::from_grammar(&cfg);
        let second = ItemSetAutomaton::from_grammar(&cfg);
        assert_eq!(first.states, second.states);
        assert_eq!(first.edges, second.edges);
    }
}
