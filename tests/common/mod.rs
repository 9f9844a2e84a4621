// Shared helpers for the integration tests

use std::collections::{BTreeSet, HashMap};

use grammarian::grammar::{Grammar, Symbol};
use grammarian::parser::parse_str;

pub type Word = Vec<String>;

// Grammars exercising left recursion, ε, unit cycles and useless symbols
pub const SAMPLES: &[(&str, &str)] = &[
    ("arithmetic", "E = E \"+\" T | T\nT = T \"*\" F | F\nF = \"(\" E \")\" | \"x\""),
    ("balanced", "S = \"a\" S \"b\" | ε"),
    ("palindromes", "S = \"a\" S \"a\" | \"b\" S \"b\" | \"a\" | \"b\" | ε"),
    ("nullable chain", "S = A B C\nA = \"a\" A | ε\nB = \"b\" | ε\nC = A | \"c\""),
    ("unit cycle", "S = A | \"s\"\nA = B | \"a\" S\nB = S | \"b\""),
    ("useless symbols", "S = A | \"x\" S | \"y\"\nA = A \"a\"\nB = \"b\""),
    ("indirect left recursion", "S = A \"a\" | \"b\"\nA = S \"c\" | A \"d\" | \"e\""),
    ("long productions", "S = \"a\" \"b\" S \"c\" \"d\" | \"a\" \"b\" \"c\" \"d\" | \"e\""),
];

pub fn sample(name: &str) -> Grammar {
    let (_, text) = SAMPLES.iter().find(|(sample, _)| *sample == name).unwrap();
    parse_str(text).unwrap()
}

pub fn samples() -> impl Iterator<Item = (&'static str, Grammar)> {
    SAMPLES.iter().map(|(name, text)| (*name, parse_str(text).unwrap()))
}

fn concatenations(alternative: &[Symbol], languages: &HashMap<String, BTreeSet<Word>>, max_len: usize) -> BTreeSet<Word> {
    let mut partial: BTreeSet<Word> = BTreeSet::from([Vec::new()]);
    for symbol in alternative {
        let options = match symbol {
            Symbol::Terminal(terminal) => BTreeSet::from([vec![terminal.clone()]]),
            Symbol::Nonterminal(name) => languages.get(name).cloned().unwrap_or_default(),
        };
        partial = partial
            .iter()
            .flat_map(|prefix| {
                options.iter().filter_map(move |suffix| {
                    (prefix.len() + suffix.len() <= max_len).then(|| prefix.iter().chain(suffix).cloned().collect())
                })
            })
            .collect();
    }
    partial
}

/// Every word of at most `max_len` terminals the grammar derives, by brute force.
pub fn bounded_language(grammar: &Grammar, max_len: usize) -> BTreeSet<Word> {
    let mut languages: HashMap<String, BTreeSet<Word>> = HashMap::new();

    let mut changed = true;
    while changed {
        changed = false;
        for (head, rewrite) in grammar.rules() {
            for alternative in rewrite {
                let words = concatenations(alternative, &languages, max_len);
                let known = languages.entry(head.clone()).or_default();
                for word in words {
                    changed |= known.insert(word);
                }
            }
        }
    }

    languages.remove(grammar.start_symbol()).unwrap_or_default()
}

// Spelled out the way the CYK tokenizer would read it back
pub fn spell(word: &Word) -> String {
    word.concat()
}
