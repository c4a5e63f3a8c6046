//! LR(1) items.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::grammar::{ContextFreeGrammar, Symbol};

/// A shared, immutable lookahead set. Sharing one allocation across the many
/// items produced during closure expansion is safe because the set is never
/// mutated after construction.
pub type Lookaheads = Rc<BTreeSet<i32>>;

/// A production with a dot position and a set of one-terminal lookaheads.
///
/// Two items are equal only when all three fields are; ordering is by
/// production, dot, then the sorted lookahead contents, which keeps every
/// derived traversal reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: usize,
    pub dot: usize,
    pub lookaheads: Lookaheads,
}

impl Item {
    pub fn new(production: usize, dot: usize, lookaheads: Lookaheads) -> Self {
        Item {
            production,
            dot,
            lookaheads,
        }
    }

    /// The item with the dot moved one symbol to the right, sharing the
    /// lookahead set.
    pub fn advanced(&self) -> Self {
        Item {
            production: self.production,
            dot: self.dot + 1,
            lookaheads: Rc::clone(&self.lookaheads),
        }
    }

    pub fn next_symbol<'a>(&self, cfg: &'a ContextFreeGrammar) -> Option<&'a Symbol> {
        cfg.symbol_after_dot(self.production, self.dot)
    }

    pub fn at_end(&self, cfg: &ContextFreeGrammar) -> bool {
        cfg.at_end(self.production, self.dot)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use crate::grammar::{ContextFreeGrammar, Symbol, EOF};

    use super::Item;

    fn cfg() -> ContextFreeGrammar {
        ContextFreeGrammar::from_string(
            r#"
            S -> A "b"
            A -> "a" | ''
            "#,
        )
        .unwrap()
    }

    #[test]
    fn equality_includes_lookaheads() {
        let a = Item::new(1, 0, Rc::new(BTreeSet::from([EOF])));
        let b = Item::new(1, 0, Rc::new(BTreeSet::from([EOF])));
        let c = Item::new(1, 0, Rc::new(BTreeSet::from([0])));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn advancing_walks_the_production() {
        let cfg = cfg();
        let id = cfg.production_id(r#"S -> A "b""#).unwrap();
        let item = Item::new(id, 0, Rc::new(BTreeSet::from([EOF])));

        assert_eq!(
            item.next_symbol(&cfg),
            Some(&Symbol::NonTerminal(String::from("A")))
        );
        let item = item.advanced();
        let b = cfg.typedef().id_of("b").unwrap() as i32;
        assert_eq!(item.next_symbol(&cfg), Some(&Symbol::Terminal(b)));
        let item = item.advanced();
        assert!(item.at_end(&cfg));
    }

    #[test]
    fn empty_production_ends_immediately() {
        let cfg = cfg();
        let id = cfg.production_id("A -> ''").unwrap();
        let item = Item::new(id, 0, Rc::new(BTreeSet::from([EOF])));
        assert!(item.at_end(&cfg));
        assert_eq!(item.next_symbol(&cfg), None);
    }
}
