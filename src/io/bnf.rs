use indexmap::IndexSet;
use itertools::Itertools;
use thiserror::Error;

use crate::grammar::*;
use crate::parser::is_delimiter;

// Grammars the BNF dialect has no way to spell
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BnfWriteError {
    #[error("`{0}` is used but has no rules, which BNF cannot express")]
    Undefined(String),
    #[error("the start symbol `{0}` has no rule that could be written first")]
    UnmarkedStart(String),
    #[error("the terminal {0:?} cannot be written between quotes")]
    UnquotableTerminal(String),
    #[error("`{0}` cannot be written as a bare nonterminal name")]
    UnwritableNonterminal(String),
}

fn check_symbol(symbol: &Symbol) -> Result<(), BnfWriteError> {
    match symbol {
        Symbol::Terminal(text) if text.contains(|c: char| matches!(c, '"' | '\n' | '\r')) => {
            Err(BnfWriteError::UnquotableTerminal(text.clone()))
        }
        Symbol::Nonterminal(name) if name == "ε" || name.chars().any(is_delimiter) => {
            Err(BnfWriteError::UnwritableNonterminal(name.clone()))
        }
        _ => Ok(()),
    }
}

// The reader only knows a nonterminal through a rule with it on the left side
fn check_defined(grammar: &Grammar) -> Result<(), BnfWriteError> {
    let defined: IndexSet<&str> = grammar
        .rules()
        .iter()
        .filter(|(_, rewrite)| !rewrite.is_empty())
        .map(|(head, _)| head.as_str())
        .chain(grammar.phrase_rules().iter().flat_map(|rule| rule.lhs.iter().filter_map(Symbol::as_nonterminal)))
        .collect();

    let mut used = grammar
        .rules()
        .values()
        .flatten()
        .flatten()
        .chain(grammar.phrase_rules().iter().flat_map(|rule| &rule.rhs))
        .filter_map(Symbol::as_nonterminal);
    match used.find(|name| !defined.contains(name)) {
        Some(name) => Err(BnfWriteError::Undefined(name.to_string())),
        None => Ok(()),
    }
}

fn format_symbol(symbol: &Symbol) -> String {
    match symbol {
        Symbol::Terminal(terminal) => format!("\"{}\"", terminal),
        Symbol::Nonterminal(name) => name.clone(),
    }
}

fn format_sequence(symbols: &[Symbol]) -> String {
    if symbols.is_empty() {
        return "ε".to_string();
    }
    symbols.iter().map(format_symbol).join(" ")
}

fn format_phrase_rule(rule: &PhraseRule) -> String {
    format!("{} = {}", format_sequence(&rule.lhs), format_sequence(&rule.rhs))
}

// The reader takes the first nonterminal of the first line as the start symbol
pub fn to_bnf(grammar: &Grammar) -> Result<String, BnfWriteError> {
    let symbols = grammar
        .rules()
        .iter()
        .flat_map(|(head, rewrite)| std::iter::once(Symbol::nonterminal(head)).chain(rewrite.iter().flatten().cloned()))
        .chain(grammar.phrase_rules().iter().flat_map(|rule| rule.lhs.iter().chain(&rule.rhs).cloned()));
    for symbol in symbols {
        check_symbol(&symbol)?;
    }
    check_defined(grammar)?;

    let start = grammar.start_symbol();
    let mut phrase_rules = grammar.phrase_rules().iter().collect_vec();
    let mut lines = Vec::new();

    if grammar.productions(start).is_empty() {
        let leading = phrase_rules
            .iter()
            .position(|rule| rule.lhs.iter().find_map(Symbol::as_nonterminal) == Some(start))
            .ok_or_else(|| BnfWriteError::UnmarkedStart(start.to_string()))?;
        lines.push(format_phrase_rule(phrase_rules.remove(leading)));
    }

    let heads = std::iter::once(start)
        .chain(grammar.rules().keys().map(String::as_str).filter(|head| *head != start))
        .filter(|head| !grammar.productions(head).is_empty());
    for head in heads {
        let alternatives = grammar.productions(head).iter().map(|a| format_sequence(a)).join(" | ");
        lines.push(format!("{} = {}", head, alternatives));
    }
    lines.extend(phrase_rules.into_iter().map(format_phrase_rule));

    Ok(lines.into_iter().map(|line| line + "\n").collect())
}
