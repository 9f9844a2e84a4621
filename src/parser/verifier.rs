use indexmap::IndexSet;

use super::BnfErrorKind::UndefinedNonterminal;
use super::{BnfError, BnfErrors, BnfResult, Rule};

// A nonterminal is defined when it occurs on the left side of some rule
pub fn defined_nonterminals(rules: &[Rule]) -> IndexSet<String> {
    rules
        .iter()
        .flat_map(|rule| &rule.head)
        .filter_map(|symbol| symbol.as_nonterminal())
        .map(str::to_string)
        .collect()
}

// Every use of an undefined nonterminal, reported at the line of the rule using it
fn undefined_uses(rule: &Rule, defined: &IndexSet<String>) -> BnfErrors {
    rule.rewrite
        .iter()
        .flatten()
        .filter_map(|symbol| symbol.as_nonterminal())
        .filter(|name| !defined.contains(*name))
        .map(|name| BnfError {
            location: rule.location.clone(),
            error: UndefinedNonterminal(name.to_string()),
        })
        .collect()
}

pub fn verify_rules(rules: &[Rule]) -> BnfResult<()> {
    let defined = defined_nonterminals(rules);
    let errors: BnfErrors = rules.iter().flat_map(|rule| undefined_uses(rule, &defined)).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
