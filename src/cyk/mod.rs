/*
    This module decides membership with the Cocke-Younger-Kasami algorithm
*/

mod table;

use std::collections::HashMap;

use indexmap::IndexSet;
use itertools::Itertools;
use log::{debug, info, trace};

use crate::grammar::*;
use crate::normal_form::{is_in_cnf, to_cnf};

pub use table::CykTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CykOptions {
    pub want_table: bool,
    // Fail instead of picking the longest terminal when several match
    pub strict_tokens: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub accepted: bool,
    pub tokens: Vec<String>,
    pub table: Option<CykTable>,
}

// Longest match wins. A character no terminal matches becomes a token on its own.
pub fn tokenize(word: &str, terminals: &IndexSet<String>, strict: bool) -> GrammarResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut rest = word;

    while !rest.is_empty() {
        let candidates = terminals
            .iter()
            .filter(|terminal| !terminal.is_empty() && rest.starts_with(terminal.as_str()))
            .collect_vec();

        if strict && candidates.len() > 1 {
            return Err(GrammarError::TokenizationAmbiguity {
                position: word[..word.len() - rest.len()].chars().count(),
                candidates: candidates.into_iter().cloned().sorted().collect(),
            });
        }

        let length = match candidates.iter().map(|terminal| terminal.len()).max() {
            Some(length) => length,
            None => rest.chars().next().map_or(rest.len(), char::len_utf8),
        };
        tokens.push(rest[..length].to_string());
        rest = &rest[length..];
    }

    Ok(tokens)
}

// Productions of a CNF grammar looked up by their right side
struct ProductionIndex<'a> {
    unary: HashMap<&'a str, Vec<&'a str>>,
    binary: HashMap<(&'a str, &'a str), Vec<&'a str>>,
}

impl<'a> ProductionIndex<'a> {
    fn new(grammar: &'a Grammar) -> Self {
        let mut unary: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut binary: HashMap<(&str, &str), Vec<&str>> = HashMap::new();

        for (head, rewrite) in grammar.rules() {
            for alternative in rewrite {
                match alternative.as_slice() {
                    [Symbol::Terminal(terminal)] => unary.entry(terminal.as_str()).or_default().push(head.as_str()),
                    [Symbol::Nonterminal(left), Symbol::Nonterminal(right)] => {
                        binary.entry((left.as_str(), right.as_str())).or_default().push(head.as_str())
                    }
                    _ => {}
                }
            }
        }

        ProductionIndex { unary, binary }
    }
}

fn fill_table(grammar: &Grammar, tokens: Vec<String>) -> CykTable {
    let index = ProductionIndex::new(grammar);
    let n = tokens.len();
    let mut table = CykTable::new(tokens);

    for i in 0..n {
        let heads = index.unary.get(table.tokens()[i].as_str()).cloned().unwrap_or_default();
        table.cell_mut(i, i).extend(heads.into_iter().map(str::to_string));
    }

    for length in 2..=n {
        for start in 0..=n - length {
            let end = start + length - 1;
            let mut found = Vec::new();
            for split in start..end {
                for (left, right) in table.cell(start, split).iter().cartesian_product(table.cell(split + 1, end)) {
                    if let Some(heads) = index.binary.get(&(left.as_str(), right.as_str())) {
                        found.extend(heads.iter().map(|head| head.to_string()));
                    }
                }
            }
            trace!("span {}..={}: {:?}", start, end, found);
            table.cell_mut(start, end).extend(found);
        }
    }

    table
}

// Grammars not already in CNF are converted first
pub fn cyk_membership(grammar: &Grammar, word: &str, options: CykOptions) -> GrammarResult<Membership> {
    grammar.require_context_free()?;
    let tokens = tokenize(word, grammar.terminals(), options.strict_tokens)?;
    debug!("tokens: {:?}", tokens);

    let cnf = if is_in_cnf(grammar) {
        grammar.clone()
    } else {
        match to_cnf(grammar) {
            Ok(cnf) => cnf,
            Err(GrammarError::EmptyLanguage(start)) => {
                info!("`{}` generates nothing, rejecting {:?}", start, word);
                return Ok(Membership {
                    accepted: false,
                    table: options.want_table.then(|| CykTable::new(tokens.clone())),
                    tokens,
                });
            }
            Err(error) => return Err(error),
        }
    };
    let start = cnf.start_symbol();

    let table = fill_table(&cnf, tokens.clone());
    let accepted = match tokens.len() {
        0 => cnf.productions(start).iter().any(Vec::is_empty),
        n => table.cell(0, n - 1).contains(start),
    };
    info!("{:?} {}", word, if accepted { "accepted" } else { "rejected" });

    Ok(Membership {
        accepted,
        tokens,
        table: options.want_table.then_some(table),
    })
}

pub fn accepts(grammar: &Grammar, word: &str) -> GrammarResult<bool> {
    cyk_membership(grammar, word, CykOptions::default()).map(|membership| membership.accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn terminals(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn balanced_words() {
        let g = parse_str("S = \"a\" S \"b\" | ε").unwrap();

        assert_eq!(accepts(&g, ""), Ok(true));
        assert_eq!(accepts(&g, "ab"), Ok(true));
        assert_eq!(accepts(&g, "aabb"), Ok(true));
        assert_eq!(accepts(&g, "aab"), Ok(false));
        assert_eq!(accepts(&g, "ba"), Ok(false));
    }

    #[test]
    fn arithmetic_words() {
        let g = parse_str("E = E \"+\" T | T\nT = T \"*\" F | F\nF = \"(\" E \")\" | \"x\"").unwrap();

        assert_eq!(accepts(&g, "x+x*x"), Ok(true));
        assert_eq!(accepts(&g, "(x+x)*x"), Ok(true));
        assert_eq!(accepts(&g, "x+"), Ok(false));
        assert_eq!(accepts(&g, ""), Ok(false));
    }

    #[test]
    fn longest_terminal_wins() {
        let tokens = tokenize("abab", &terminals(&["a", "ab", "b"]), false).unwrap();

        assert_eq!(tokens, vec!["ab", "ab"]);
    }

    #[test]
    fn unknown_characters_become_tokens() {
        let tokens = tokenize("xaé", &terminals(&["a"]), false).unwrap();

        assert_eq!(tokens, vec!["x", "a", "é"]);
    }

    #[test]
    fn strict_tokens_report_ambiguity() {
        let result = tokenize("cab", &terminals(&["ab", "c", "a"]), true);

        assert_eq!(
            result,
            Err(GrammarError::TokenizationAmbiguity {
                position: 1,
                candidates: vec!["a".to_string(), "ab".to_string()],
            })
        );
    }

    #[test]
    fn multi_character_terminals() {
        let g = parse_str("S = \"if\" S \"fi\" | \"x\"").unwrap();

        assert_eq!(accepts(&g, "ifxfi"), Ok(true));
        assert_eq!(accepts(&g, "ififxfifi"), Ok(true));
        assert_eq!(accepts(&g, "ifx"), Ok(false));
    }

    #[test]
    fn table_is_kept_on_request() {
        let g = parse_str("S = \"a\" S \"b\" | ε").unwrap();
        let options = CykOptions {
            want_table: true,
            ..CykOptions::default()
        };
        let membership = cyk_membership(&g, "ab", options).unwrap();
        let table = membership.table.unwrap();

        assert!(membership.accepted);
        assert_eq!(membership.tokens, vec!["a", "b"]);
        assert_eq!(table.cell(0, 0).len(), 1);
        assert!(table.to_string().starts_with("Word: a b"));
        assert!(cyk_membership(&g, "ab", CykOptions::default()).unwrap().table.is_none());
    }

    #[test]
    fn grammars_in_cnf_are_used_as_is() {
        let g = parse_str("S = A B\nA = \"a\"\nB = \"b\"").unwrap();
        let table = cyk_membership(&g, "ab", CykOptions { want_table: true, strict_tokens: false })
            .unwrap()
            .table
            .unwrap();

        assert!(table.cell(0, 1).contains("S"));
        assert!(table.cell(0, 0).contains("A"));
    }

    #[test]
    fn empty_language_accepts_nothing() {
        let g = parse_str("S = S \"a\"").unwrap();

        assert_eq!(accepts(&g, "a"), Ok(false));
        assert_eq!(accepts(&g, ""), Ok(false));
    }

    #[test]
    fn phrase_grammars_are_rejected() {
        let g = parse_str("S = \"a\"\n\"a\" S = S").unwrap();

        assert_eq!(accepts(&g, "a"), Err(GrammarError::UnsupportedGrammarType(1)));
    }
}
