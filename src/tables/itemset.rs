//! LR(1) item sets, closure, and goto kernels.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use crate::grammar::{ContextFreeGrammar, FirstSet, Symbol};

use super::item::Item;

/// Memoized FIRST of the right-hand-side suffix after the dot, keyed by
/// `(production, dot)`. Closure computation hits the same suffixes over and
/// over across states.
pub type FirstMemo = HashMap<(usize, usize), FirstSet>;

/// A set of LR(1) items, stored as a map from item core `(production, dot)`
/// to the union of its lookaheads.
///
/// Closure always merges lookaheads per core, so this representation is
/// canonical: two sets with the same item membership compare and hash equal
/// regardless of construction order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemSet {
    items: BTreeMap<(usize, usize), BTreeSet<i32>>,
}

impl ItemSet {
    pub fn new() -> Self {
        ItemSet::default()
    }

    /// Merge an item into the set. Returns whether the set grew.
    pub fn insert<I>(&mut self, production: usize, dot: usize, lookaheads: I) -> bool
    where
        I: IntoIterator<Item = i32>,
    {
        let entry = self.items.entry((production, dot)).or_default();
        let before = entry.len();
        entry.extend(lookaheads);
        entry.len() > before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The items of the set, in core order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.items
            .iter()
            .map(|(&(production, dot), lookaheads)| {
                Item::new(production, dot, Rc::new(lookaheads.clone()))
            })
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.items
            .get(&(item.production, item.dot))
            .map(|lookaheads| item.lookaheads.iter().all(|la| lookaheads.contains(la)))
            .unwrap_or(false)
    }

    /// Every symbol appearing immediately after a dot, in symbol order.
    pub fn next_symbols(&self, cfg: &ContextFreeGrammar) -> BTreeSet<Symbol> {
        self.items
            .keys()
            .filter_map(|&(production, dot)| cfg.symbol_after_dot(production, dot).cloned())
            .collect()
    }

    /// The kernel reached by shifting `symbol`: every item with that symbol
    /// after the dot, advanced by one.
    pub fn goto_kernel(&self, cfg: &ContextFreeGrammar, symbol: &Symbol) -> ItemSet {
        let mut kernel = ItemSet::new();
        for (&(production, dot), lookaheads) in &self.items {
            if cfg.symbol_after_dot(production, dot) == Some(symbol) {
                kernel.insert(production, dot + 1, lookaheads.iter().copied());
            }
        }
        kernel
    }

    /// The LR(1) closure of this set.
    ///
    /// For an item `A -> α ◦ B β, L`, every production of `B` is added with
    /// dot 0 and lookaheads `FIRST(β · a)` for each `a ∈ L`, with ε dropped
    /// before insertion; lookaheads of coinciding cores are merged until
    /// nothing grows.
    pub fn closure(
        &self,
        cfg: &ContextFreeGrammar,
        first_map: &BTreeMap<String, FirstSet>,
        memo: &mut FirstMemo,
    ) -> ItemSet {
        let mut result = ItemSet::new();
        let mut queue: VecDeque<Item> = self.items().collect();

        while let Some(item) = queue.pop_front() {
            if !result.insert(item.production, item.dot, item.lookaheads.iter().copied()) {
                continue;
            }

            let target = match item.next_symbol(cfg) {
                Some(Symbol::NonTerminal(name)) => name.clone(),
                _ => continue,
            };

            let suffix_first = memo
                .entry((item.production, item.dot))
                .or_insert_with(|| {
                    let rhs = &cfg.production(item.production).rhs;
                    cfg.first_of_sequence(&rhs[item.dot + 1..], first_map)
                })
                .clone();

            for &lookahead in item.lookaheads.iter() {
                let mut lookaheads = suffix_first.terminals.clone();
                if suffix_first.empty {
                    lookaheads.insert(lookahead);
                }
                let lookaheads = Rc::new(lookaheads);

                for &production in cfg.productions_of(&target) {
                    let candidate = Item::new(production, 0, Rc::clone(&lookaheads));
                    if !result.contains(&candidate) {
                        queue.push_back(candidate);
                    }
                }
            }
        }

        result
    }
}
