use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

use crate::grammar::*;

// Maps every nonterminal that duplicates an earlier one onto it. The start
// symbol is visited first so it always survives.
fn duplicate_nonterminals(grammar: &Grammar) -> IndexMap<String, String> {
    let start = grammar.start_symbol();
    let order = std::iter::once(start)
        .chain(grammar.nonterminals().iter().map(String::as_str).filter(|name| *name != start));

    let mut representatives: HashMap<BTreeSet<&Alternative>, &str> = HashMap::new();
    let mut renaming = IndexMap::new();
    for name in order {
        let key: BTreeSet<&Alternative> = grammar.productions(name).iter().collect();
        match representatives.get(&key) {
            Some(representative) => {
                renaming.insert(name.to_string(), representative.to_string());
            }
            None => {
                representatives.insert(key, name);
            }
        }
    }

    renaming
}

fn rename_symbol(symbol: &Symbol, renaming: &IndexMap<String, String>) -> Symbol {
    match symbol {
        Symbol::Nonterminal(name) => Symbol::Nonterminal(renaming.get(name).unwrap_or(name).clone()),
        Symbol::Terminal(_) => symbol.clone(),
    }
}

// Repeats until no two nonterminals have identical productions. The start
// symbol is never renamed away.
pub fn merge_equivalent_nonterminals(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;

    let mut current = grammar.clone();
    loop {
        let renaming = duplicate_nonterminals(&current);
        if renaming.is_empty() {
            return Ok(current);
        }
        debug!("merging equivalent nonterminals: {:?}", renaming);

        let nonterminals = current
            .nonterminals()
            .iter()
            .filter(|name| !renaming.contains_key(*name))
            .cloned()
            .collect_vec();
        let rules = current
            .rules()
            .iter()
            .filter(|(head, _)| !renaming.contains_key(*head))
            .map(|(head, rewrite)| {
                let renamed: Rewrite = rewrite
                    .iter()
                    .map(|alternative| alternative.iter().map(|s| rename_symbol(s, &renaming)).collect())
                    .collect();
                (head.clone(), renamed)
            })
            .collect_vec();

        current = Grammar::new(
            nonterminals,
            current.terminals().iter().cloned(),
            rules,
            current.start_symbol(),
        )?;
    }
}
