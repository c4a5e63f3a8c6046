//! # LR Generator
//!
//! A compiler front-end generator: from a single declarative grammar text it
//! produces a portable, self-contained language definition that tokenizes
//! input with a merged scanner DFA and drives a bottom-up LR(1) parser with
//! user-supplied reduction callbacks.
//!
//! The build pipeline runs grammar text through the [`grammar`] model, the
//! [`automata`] engine (regex compilation, determinization, minimization, and
//! the merged scanner automaton), and the [`tables`] generator (the canonical
//! LR(1) collection and the ACTION/GOTO tables), freezing the result into a
//! [`langdef::LangDef`] that serializes to JSON minus its callbacks.

pub mod automata;
pub mod grammar;
pub mod langdef;
pub mod tables;
