//! The serialized form of a language definition.
//!
//! Everything except the callbacks round-trips: the merged scanner DFA, the
//! raw-production-text index, the per-production argument counts, and the
//! ACTION/GOTO tables. Callbacks are code, not data, and must be re-registered
//! after loading.

use std::collections::{BTreeMap, HashMap};
use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::automata::set::DfaSet;
use crate::automata::DfaJson;
use crate::tables::{ActionTable, GotoTable};

use super::{LangDef, LangDefError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LangDefJson {
    pub dfa_set_json: DfaJson,
    pub raw_grammar_to_id: BTreeMap<String, usize>,
    pub prod_id_to_narg_and_non_terminal: BTreeMap<String, (usize, String)>,
    pub action_json: ActionTable,
    pub goto_json: GotoTable,
}

impl<V, C> LangDef<V, C> {
    pub fn to_json(&self) -> LangDefJson {
        LangDefJson {
            dfa_set_json: self.dfa.to_json(),
            raw_grammar_to_id: self
                .raw_grammar_to_id
                .iter()
                .map(|(text, &id)| (text.clone(), id))
                .collect(),
            prod_id_to_narg_and_non_terminal: self
                .productions
                .iter()
                .map(|(&id, info)| (id.to_string(), info.clone()))
                .collect(),
            action_json: self.action.clone(),
            goto_json: self.goto.clone(),
        }
    }

    /// Rebuild a language definition from its serialized form, with an empty
    /// callback registry.
    pub fn from_json(json: &LangDefJson) -> Result<Self, Box<dyn Error>> {
        let mut productions = HashMap::new();
        for (key, info) in &json.prod_id_to_narg_and_non_terminal {
            let id: usize = key
                .parse()
                .map_err(|_| LangDefError::from(format!("bad production id `{}`", key)))?;
            productions.insert(id, info.clone());
        }

        Ok(LangDef {
            dfa: DfaSet::from_json(&json.dfa_set_json),
            raw_grammar_to_id: json
                .raw_grammar_to_id
                .iter()
                .map(|(text, &id)| (text.clone(), id))
                .collect(),
            productions,
            action: json.action_json.clone(),
            goto: json.goto_json.clone(),
            callbacks: HashMap::new(),
        })
    }
}
