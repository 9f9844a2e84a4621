/*
    This module removes useless symbols, ε-productions and unit productions
*/

mod merge;

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;

use crate::grammar::*;

pub use merge::merge_equivalent_nonterminals;

fn references_any(alternative: &[Symbol], nonterminals: &IndexSet<String>) -> bool {
    alternative
        .iter()
        .filter_map(Symbol::as_nonterminal)
        .any(|name| nonterminals.contains(name))
}

pub fn generating_nonterminals(grammar: &Grammar) -> IndexSet<String> {
    let mut generating = IndexSet::new();

    let mut changed = true;
    while changed {
        changed = false;
        for (head, rewrite) in grammar.rules() {
            if generating.contains(head) {
                continue;
            }
            let generates = rewrite.iter().any(|alternative| {
                alternative.iter().all(|symbol| match symbol {
                    Symbol::Terminal(_) => true,
                    Symbol::Nonterminal(name) => generating.contains(name),
                })
            });
            if generates {
                generating.insert(head.clone());
                changed = true;
            }
        }
    }

    generating
}

// Productions mentioning a dropped nonterminal go with it
pub fn remove_non_generating(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;

    let generating = generating_nonterminals(grammar);
    if !generating.contains(grammar.start_symbol()) {
        return Err(GrammarError::EmptyLanguage(grammar.start_symbol().to_string()));
    }

    let dropped: IndexSet<String> = grammar.nonterminals().difference(&generating).cloned().collect();
    debug!("non-generating nonterminals: {:?}", dropped);

    let nonterminals = grammar.nonterminals().intersection(&generating).cloned().collect_vec();
    let rules = grammar
        .rules()
        .iter()
        .filter(|(head, _)| generating.contains(*head))
        .map(|(head, rewrite)| {
            let kept: Rewrite = rewrite
                .iter()
                .filter(|alternative| !references_any(alternative, &dropped))
                .cloned()
                .collect();
            (head.clone(), kept)
        })
        .collect_vec();

    Ok(Grammar::new(nonterminals, grammar.terminals().iter().cloned(), rules, grammar.start_symbol())?)
}

// Breadth-first from the start symbol
pub fn reachable_nonterminals(grammar: &Grammar) -> IndexSet<String> {
    let mut reachable = IndexSet::new();
    let mut queue = VecDeque::from([grammar.start_symbol().to_string()]);

    while let Some(current) = queue.pop_front() {
        if !reachable.insert(current.clone()) {
            continue;
        }
        for name in grammar.productions(&current).iter().flatten().filter_map(Symbol::as_nonterminal) {
            if !reachable.contains(name) {
                queue.push_back(name.to_string());
            }
        }
    }

    reachable
}

// Terminals that no longer occur anywhere are dropped as well
pub fn remove_unreachable(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;

    let reachable = reachable_nonterminals(grammar);
    debug!(
        "unreachable nonterminals: {:?}",
        grammar.nonterminals().difference(&reachable).collect_vec()
    );

    let nonterminals = grammar.nonterminals().intersection(&reachable).cloned().collect_vec();
    let rules = grammar
        .rules()
        .iter()
        .filter(|(head, _)| reachable.contains(*head))
        .map(|(head, rewrite)| (head.clone(), rewrite.clone()))
        .collect_vec();

    let used: IndexSet<&str> = rules
        .iter()
        .flat_map(|(_, rewrite)| rewrite.iter().flatten())
        .filter(|symbol| symbol.is_terminal())
        .map(Symbol::name)
        .collect();
    let terminals = grammar
        .terminals()
        .iter()
        .filter(|terminal| used.contains(terminal.as_str()))
        .cloned()
        .collect_vec();

    Ok(Grammar::new(nonterminals, terminals, rules, grammar.start_symbol())?)
}

pub fn nullable_nonterminals(grammar: &Grammar) -> IndexSet<String> {
    let mut nullable = IndexSet::new();

    let mut changed = true;
    while changed {
        changed = false;
        for (head, rewrite) in grammar.rules() {
            if nullable.contains(head) {
                continue;
            }
            let erases = rewrite.iter().any(|alternative| {
                alternative
                    .iter()
                    .all(|symbol| symbol.as_nonterminal().is_some_and(|name| nullable.contains(name)))
            });
            if erases {
                nullable.insert(head.clone());
                changed = true;
            }
        }
    }

    nullable
}

// Every way of deleting some of the nullable occurrences, except deleting everything
fn nullable_variants(alternative: &[Symbol], nullable: &IndexSet<String>) -> Vec<Alternative> {
    let positions = alternative
        .iter()
        .positions(|symbol| symbol.as_nonterminal().is_some_and(|name| nullable.contains(name)))
        .collect_vec();

    positions
        .into_iter()
        .powerset()
        .map(|deleted| {
            alternative
                .iter()
                .enumerate()
                .filter(|(i, _)| !deleted.contains(i))
                .map(|(_, symbol)| symbol.clone())
                .collect_vec()
        })
        .filter(|variant| !variant.is_empty())
        .collect()
}

// A nullable start symbol gets a fresh start `S' = S | ε`, so ε stays derivable
// without occurring anywhere else.
pub fn eliminate_epsilon(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;

    let nullable = nullable_nonterminals(grammar);
    debug!("nullable nonterminals: {:?}", nullable);

    let mut rules: IndexMap<String, IndexSet<Alternative>> = grammar
        .nonterminals()
        .iter()
        .map(|name| (name.clone(), IndexSet::new()))
        .collect();
    for (head, rewrite) in grammar.rules() {
        let variants = rewrite
            .iter()
            .filter(|alternative| !alternative.is_empty())
            .flat_map(|alternative| nullable_variants(alternative, &nullable));
        if let Some(alternatives) = rules.get_mut(head) {
            alternatives.extend(variants);
        }
    }

    // Nonterminals left without productions only derived ε, so they go
    // together with every production that mentions them
    loop {
        let empty: IndexSet<String> = rules
            .iter()
            .filter(|(_, alternatives)| alternatives.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        if empty.is_empty() {
            break;
        }
        rules.retain(|name, _| !empty.contains(name));
        for alternatives in rules.values_mut() {
            alternatives.retain(|alternative| !references_any(alternative, &empty));
        }
    }

    let start = grammar.start_symbol();
    let terminals = grammar.terminals().iter().cloned().collect_vec();

    if !nullable.contains(start) {
        if !rules.contains_key(start) {
            return Err(GrammarError::EmptyLanguage(start.to_string()));
        }
        let nonterminals = rules.keys().cloned().collect_vec();
        let rules = rules.into_iter().map(|(name, alternatives)| (name, alternatives.into_iter().collect::<Rewrite>()));
        return Ok(Grammar::new(nonterminals, terminals, rules, start)?);
    }

    let mut names = NameSupply::new(grammar.nonterminals().iter().chain(grammar.terminals()));
    let new_start = names.fresh(start);
    debug!("start symbol `{}` is nullable, introducing `{}`", start, new_start);

    if !rules.contains_key(start) {
        // Only the empty word is left
        return Ok(Grammar::new(
            [new_start.clone()],
            terminals,
            [(new_start.clone(), vec![vec![]])],
            new_start,
        )?);
    }

    let mut with_start = IndexMap::new();
    with_start.insert(
        new_start.clone(),
        IndexSet::from([vec![Symbol::Nonterminal(start.to_string())], vec![]]),
    );
    with_start.extend(rules);

    let nonterminals = with_start.keys().cloned().collect_vec();
    let rules = with_start.into_iter().map(|(name, alternatives)| (name, alternatives.into_iter().collect::<Rewrite>()));
    Ok(Grammar::new(nonterminals, terminals, rules, new_start)?)
}

// Includes the nonterminal itself
pub fn unit_closure(grammar: &Grammar) -> IndexMap<String, IndexSet<String>> {
    let mut closure: IndexMap<String, IndexSet<String>> = grammar
        .nonterminals()
        .iter()
        .map(|name| (name.clone(), IndexSet::from([name.clone()])))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for head in grammar.nonterminals() {
            let derived = grammar
                .productions(head)
                .iter()
                .filter_map(|alternative| unit_target(alternative))
                .flat_map(|target| closure.get(target).into_iter().flatten().cloned())
                .collect_vec();
            if let Some(reached) = closure.get_mut(head) {
                for name in derived {
                    changed |= reached.insert(name);
                }
            }
        }
    }

    closure
}

pub fn eliminate_unit(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;

    let closure = unit_closure(grammar);
    let rules = closure
        .iter()
        .map(|(head, reached)| {
            let alternatives: IndexSet<Alternative> = reached
                .iter()
                .flat_map(|name| grammar.productions(name))
                .filter(|alternative| unit_target(alternative).is_none())
                .cloned()
                .collect();
            (head.clone(), alternatives.into_iter().collect::<Rewrite>())
        })
        .collect_vec();

    Ok(Grammar::new(
        grammar.nonterminals().iter().cloned(),
        grammar.terminals().iter().cloned(),
        rules,
        grammar.start_symbol(),
    )?)
}

// Eliminating ε can introduce unit productions and strand symbols, so those
// passes run a second time.
pub fn simplify(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;
    debug!("simplifying grammar with {} productions", grammar.production_count());

    let grammar = eliminate_unit(grammar)?;
    let grammar = remove_unreachable(&grammar)?;
    let grammar = remove_non_generating(&grammar)?;
    let grammar = eliminate_epsilon(&grammar)?;
    let grammar = eliminate_unit(&grammar)?;
    let grammar = remove_unreachable(&grammar)?;

    debug!(
        "simplified grammar has {} nonterminals and {} productions",
        grammar.nonterminals().len(),
        grammar.production_count()
    );
    Ok(grammar)
}
