use std::fmt::Display;

use indexmap::IndexSet;

// The base unit in a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn terminal(name: &str) -> Self {
        Symbol::Terminal(name.to_string())
    }

    pub fn nonterminal(name: &str) -> Self {
        Symbol::Nonterminal(name.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn as_nonterminal(&self) -> Option<&str> {
        match self {
            Symbol::Nonterminal(name) => Some(name),
            Symbol::Terminal(_) => None,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// The symbols in a single alternative. An empty alternative is ε.
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

/// A rule whose left side is more than a single nonterminal, e.g. `a S b = "a" S S "b"`.
///
/// Grammars carrying any of these are outside the context-free class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhraseRule {
    pub lhs: Vec<Symbol>,
    pub rhs: Alternative,
}

// A unit alternative is exactly one nonterminal
pub fn unit_target(alternative: &[Symbol]) -> Option<&str> {
    match alternative {
        [Symbol::Nonterminal(name)] => Some(name),
        _ => None,
    }
}

pub fn leading_nonterminal(alternative: &[Symbol]) -> Option<&str> {
    alternative.first().and_then(Symbol::as_nonterminal)
}

pub fn format_alternative(alternative: &[Symbol]) -> String {
    if alternative.is_empty() {
        return "ε".to_string();
    }
    alternative.iter().map(Symbol::name).collect::<Vec<_>>().join(" ")
}

// `S` becomes `S'`, then `S''`, until the name is free
#[derive(Debug, Clone, Default)]
pub struct NameSupply {
    taken: IndexSet<String>,
}

impl NameSupply {
    pub fn new<'a>(taken: impl IntoIterator<Item = &'a String>) -> Self {
        NameSupply {
            taken: taken.into_iter().cloned().collect(),
        }
    }

    pub fn fresh(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        while self.taken.contains(&name) {
            name.push('\'');
        }
        self.taken.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_names_avoid_taken_ones() {
        let taken = vec!["S".to_string(), "S'".to_string()];
        let mut supply = NameSupply::new(&taken);

        assert_eq!(supply.fresh("S"), "S''");
        assert_eq!(supply.fresh("S"), "S'''");
        assert_eq!(supply.fresh("A"), "A");
    }

    #[test]
    fn unit_and_leading() {
        let unit = vec![Symbol::nonterminal("B")];
        let pair = vec![Symbol::terminal("a"), Symbol::nonterminal("B")];

        assert_eq!(unit_target(&unit), Some("B"));
        assert_eq!(unit_target(&pair), None);
        assert_eq!(leading_nonterminal(&pair), None);
        assert_eq!(leading_nonterminal(&unit), Some("B"));
        assert_eq!(format_alternative(&[]), "ε");
        assert_eq!(format_alternative(&pair), "a B");
    }
}
