//! Text forms for LR(1) items and item sets.
//!
//! An item prints as `LHS -> α ◦ β, la/la/...` and an item set as one item
//! per line. The same forms parse back, which lets tests state expected item
//! sets verbatim and lets conflict reports name symbols the way the grammar
//! spells them.

use itertools::Itertools;

use crate::grammar::typedef::TypeDefinition;
use crate::grammar::{self, ContextFreeGrammar, GrammarError, Symbol, EOF};

use super::item::Item;
use super::itemset::ItemSet;

/// Render a lookahead terminal: `$` for EOF, the quoted pattern otherwise.
pub fn terminal_string(typedef: &TypeDefinition, terminal: i32) -> String {
    if terminal == EOF {
        return String::from("$");
    }
    typedef
        .pattern(terminal as usize)
        .unwrap_or_else(|| format!("#{}", terminal))
}

pub fn symbol_string(cfg: &ContextFreeGrammar, symbol: &Symbol) -> String {
    match symbol {
        Symbol::Terminal(t) => terminal_string(cfg.typedef(), *t),
        Symbol::NonTerminal(name) => name.clone(),
        Symbol::Empty => String::from("''"),
    }
}

pub fn item_string(cfg: &ContextFreeGrammar, item: &Item) -> String {
    let production = cfg.production(item.production);
    let before = production.rhs[..item.dot]
        .iter()
        .map(|sym| symbol_string(cfg, sym))
        .join(" ");
    let after = production.rhs[item.dot..]
        .iter()
        .map(|sym| symbol_string(cfg, sym))
        .join(" ");
    let lookaheads = item
        .lookaheads
        .iter()
        .map(|&la| terminal_string(cfg.typedef(), la))
        .sorted()
        .join("/");

    format!("{} -> {} ◦ {}, {}", production.lhs, before, after, lookaheads)
}

/// One line per item, sorted, so equal sets render identically.
pub fn item_set_string(cfg: &ContextFreeGrammar, set: &ItemSet) -> String {
    set.items()
        .map(|item| item_string(cfg, &item))
        .sorted()
        .join("\n")
}

/// Parse a symbol token: a known non-terminal name, `''`, `$`, or a quoted
/// terminal registered in the grammar.
pub fn parse_symbol(cfg: &ContextFreeGrammar, token: &str) -> Result<Symbol, GrammarError> {
    if cfg.is_non_terminal(token) {
        return Ok(Symbol::NonTerminal(String::from(token)));
    }
    if token == "''" {
        return Ok(Symbol::Empty);
    }
    if token == "$" {
        return Ok(Symbol::Terminal(EOF));
    }
    let (text, _) = grammar::parse_quoted(token)
        .ok_or_else(|| GrammarError::from(format!("unknown symbol `{}`", token)))?;
    let id = cfg
        .typedef()
        .id_of(text)
        .ok_or_else(|| GrammarError::from(format!("unknown terminal `{}`", token)))?;
    Ok(Symbol::Terminal(id as i32))
}

/// Split a `la/la/...` lookahead list. A plain split on `/` would break
/// terminals that contain one, so quoted tokens are scanned as units.
fn lookahead_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            'r' | '"' | '\'' => {
                let mut token = String::from(c);
                let quote = if c == 'r' {
                    match chars.next() {
                        Some(q) => {
                            token.push(q);
                            q
                        }
                        None => break,
                    }
                } else {
                    c
                };
                while let Some(c) = chars.next() {
                    token.push(c);
                    if c == quote {
                        break;
                    }
                    if c == '\\' {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                }
                tokens.push(token);
            }
            '$' => tokens.push(String::from('$')),
            _ => {}
        }
    }

    tokens
}

/// Parse one item line of the form produced by [`item_string`].
pub fn parse_item(cfg: &ContextFreeGrammar, line: &str) -> Result<Item, GrammarError> {
    let (lhs, rest) = line
        .trim()
        .split_once(" -> ")
        .ok_or_else(|| GrammarError::from(format!("malformed item `{}`", line)))?;
    let (dotted, lookaheads) = rest
        .split_once(", ")
        .ok_or_else(|| GrammarError::from(format!("missing lookaheads in `{}`", line)))?;
    let (before, after) = dotted
        .split_once('◦')
        .ok_or_else(|| GrammarError::from(format!("missing dot in `{}`", line)))?;

    let dot = before.split_whitespace().count();
    let rhs: Vec<Symbol> = before
        .split_whitespace()
        .chain(after.split_whitespace())
        .map(|token| parse_symbol(cfg, token))
        .collect::<Result<_, _>>()?;

    let production = cfg
        .productions()
        .iter()
        .position(|p| p.lhs == lhs.trim() && p.rhs == rhs)
        .ok_or_else(|| GrammarError::from(format!("no production matches `{}`", line)))?;

    let lookaheads: Result<std::collections::BTreeSet<i32>, GrammarError> =
        lookahead_tokens(lookaheads)
            .iter()
            .map(|token| match parse_symbol(cfg, token)? {
                Symbol::Terminal(t) => Ok(t),
                other => Err(GrammarError::from(format!(
                    "lookahead `{:?}` is not a terminal",
                    other
                ))),
            })
            .collect();

    Ok(Item::new(production, dot, std::rc::Rc::new(lookaheads?)))
}

/// Parse a whole item set, one item per non-blank line.
pub fn parse_item_set(cfg: &ContextFreeGrammar, text: &str) -> Result<ItemSet, GrammarError> {
    let mut set = ItemSet::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let item = parse_item(cfg, line)?;
        set.insert(item.production, item.dot, item.lookaheads.iter().copied());
    }
    Ok(set)
}
