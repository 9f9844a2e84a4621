use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::{debug, info};

use super::cnf::to_cnf;
use crate::grammar::*;
use crate::simplify::remove_unreachable;

type Table = IndexMap<String, IndexSet<Alternative>>;

// Replaces the leading `lead` of every production of `head` by each production of `lead`
fn substitute_leading(rules: &mut Table, head: &str, lead: &str) {
    let replacements = rules.get(lead).cloned().unwrap_or_default();
    let current = rules.get(head).cloned().unwrap_or_default();

    let mut expanded = IndexSet::new();
    for alternative in current {
        if leading_nonterminal(&alternative) == Some(lead) {
            for replacement in &replacements {
                expanded.insert(replacement.iter().chain(&alternative[1..]).cloned().collect_vec());
            }
        } else {
            expanded.insert(alternative);
        }
    }
    rules.insert(head.to_string(), expanded);
}

// Rewrites `head -> head α | β` as `head -> β | β helper`, `helper -> α | α helper`.
// Returns the helper when one was needed.
fn remove_left_recursion(rules: &mut Table, head: &str, names: &mut NameSupply) -> Option<String> {
    let current = rules.get(head).cloned().unwrap_or_default();
    let (recursive, others): (Vec<Alternative>, Vec<Alternative>) = current
        .into_iter()
        .partition(|alternative| leading_nonterminal(alternative) == Some(head));
    if recursive.is_empty() {
        return None;
    }

    // `head -> head` derives nothing new
    let tails = recursive
        .into_iter()
        .map(|alternative| alternative[1..].to_vec())
        .filter(|tail| !tail.is_empty())
        .collect_vec();
    if tails.is_empty() {
        rules.insert(head.to_string(), others.into_iter().collect());
        return None;
    }

    let helper = names.fresh(head);
    let marker = Symbol::Nonterminal(helper.clone());
    debug!("removing left recursion of {} through {}", head, helper);

    let with_marker = |alternatives: Vec<Alternative>| -> IndexSet<Alternative> {
        alternatives
            .into_iter()
            .flat_map(|alternative| {
                let mut extended = alternative.clone();
                extended.push(marker.clone());
                [alternative, extended]
            })
            .collect()
    };

    rules.insert(head.to_string(), with_marker(others));
    rules.insert(helper.clone(), with_marker(tails));
    Some(helper)
}

// Substitutes leading nonterminals of `head` until every production starts
// with a terminal. Gives up after `limit` rounds.
fn resolve_leading(rules: &mut Table, head: &str, limit: usize) -> GrammarResult<()> {
    for _ in 0..limit {
        let leads = rules
            .get(head)
            .into_iter()
            .flatten()
            .filter_map(|alternative| leading_nonterminal(alternative))
            .filter(|lead| *lead != head)
            .map(str::to_string)
            .unique()
            .collect_vec();
        if leads.is_empty() {
            break;
        }
        for lead in leads {
            substitute_leading(rules, head, &lead);
        }
    }

    let resolved = rules
        .get(head)
        .into_iter()
        .flatten()
        .all(|alternative| leading_nonterminal(alternative).is_none());
    if resolved {
        Ok(())
    } else {
        Err(GrammarError::Normalization(limit))
    }
}

// Works on the CNF grammar with the start symbol ordered first. Lower-indexed
// leading nonterminals are substituted away and direct left recursion becomes
// right recursion through primed helpers. Substituting back from the highest
// index down leaves a terminal at the front of every production.
pub fn to_gnf(grammar: &Grammar) -> GrammarResult<Grammar> {
    grammar.require_context_free()?;
    let cnf = to_cnf(grammar)?;

    let start = cnf.start_symbol();
    let order = std::iter::once(start)
        .chain(cnf.nonterminals().iter().map(String::as_str).filter(|name| *name != start))
        .map(str::to_string)
        .collect_vec();
    debug!("greibach ordering: {:?}", order);

    let mut names = NameSupply::new(cnf.nonterminals().iter().chain(cnf.terminals()));
    let mut rules: Table = order
        .iter()
        .map(|name| (name.clone(), cnf.productions(name).iter().cloned().collect()))
        .collect();

    let mut helpers = Vec::new();
    for (i, head) in order.iter().enumerate() {
        for lead in &order[..i] {
            substitute_leading(&mut rules, head, lead);
        }
        helpers.extend(remove_left_recursion(&mut rules, head, &mut names));
    }

    let limit = order.len() + helpers.len() + 1;
    for head in order.iter().rev() {
        resolve_leading(&mut rules, head, limit)?;
    }
    for helper in &helpers {
        resolve_leading(&mut rules, helper, limit)?;
    }

    let nonterminals = order.iter().chain(&helpers).cloned().collect_vec();
    let converted = Grammar::new(
        nonterminals,
        cnf.terminals().iter().cloned(),
        rules.into_iter().map(|(head, alternatives)| (head, alternatives.into_iter().collect::<Rewrite>())),
        start,
    )?;
    let converted = remove_unreachable(&converted)?;

    if !is_in_gnf(&converted) {
        return Err(GrammarError::Normalization(limit));
    }
    info!(
        "greibach normal form: {} nonterminals, {} productions",
        converted.nonterminals().len(),
        converted.production_count()
    );
    Ok(converted)
}

pub fn is_in_gnf(grammar: &Grammar) -> bool {
    grammar.is_context_free()
        && grammar.rules().iter().all(|(head, rewrite)| {
            rewrite.iter().all(|alternative| match alternative.split_first() {
                None => head == grammar.start_symbol(),
                Some((first, rest)) => first.is_terminal() && rest.iter().all(|symbol| !symbol.is_terminal()),
            })
        })
}
