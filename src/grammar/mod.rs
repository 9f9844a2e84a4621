/*
    This module is for storing and inspecting grammars
*/

mod classify;
mod error;
mod symbol;

use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

pub use classify::ChomskyType;
pub use error::{GrammarError, GrammarResult, MalformedGrammar};
pub use symbol::*;

/// A grammar G = (N, Σ, P, S).
///
/// Values are immutable once built: every transformation in this crate returns a
/// fresh `Grammar`, and every constructor re-checks the structural invariants.
/// Symbol sets and rules keep insertion order so transformations are deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: IndexSet<String>,
    terminals: IndexSet<String>,
    rules: IndexMap<String, Rewrite>,
    phrase_rules: Vec<PhraseRule>,
    start_symbol: String,
}

impl Grammar {
    /// Builds a context-free grammar, rejecting it if any invariant is violated.
    ///
    /// Rules listed twice for the same nonterminal are concatenated and duplicate
    /// alternatives are dropped (first occurrence wins).
    pub fn new(
        nonterminals: impl IntoIterator<Item = String>,
        terminals: impl IntoIterator<Item = String>,
        rules: impl IntoIterator<Item = (String, Rewrite)>,
        start_symbol: impl Into<String>,
    ) -> Result<Self, MalformedGrammar> {
        Self::with_phrase_rules(nonterminals, terminals, rules, Vec::new(), start_symbol)
    }

    /// Like [`Grammar::new`], but also accepts rules whose left side is a symbol sequence.
    ///
    /// A phrase rule whose left side is a single nonterminal is an ordinary
    /// production and is stored as one.
    pub fn with_phrase_rules(
        nonterminals: impl IntoIterator<Item = String>,
        terminals: impl IntoIterator<Item = String>,
        rules: impl IntoIterator<Item = (String, Rewrite)>,
        phrase_rules: Vec<PhraseRule>,
        start_symbol: impl Into<String>,
    ) -> Result<Self, MalformedGrammar> {
        let nonterminals: IndexSet<String> = nonterminals.into_iter().collect();
        let terminals: IndexSet<String> = terminals.into_iter().collect();

        let mut folded = Vec::new();
        let mut phrase_rules: Vec<PhraseRule> = phrase_rules
            .into_iter()
            .filter_map(|rule| match rule.lhs.as_slice() {
                [Symbol::Nonterminal(head)] => {
                    folded.push((head.clone(), vec![rule.rhs]));
                    None
                }
                _ => Some(rule),
            })
            .collect();

        let mut merged: IndexMap<String, IndexSet<Alternative>> = IndexMap::new();
        for (head, rewrite) in rules.into_iter().chain(folded) {
            merged.entry(head).or_default().extend(rewrite);
        }
        let rules = merged
            .into_iter()
            .map(|(head, alternatives)| (head, alternatives.into_iter().collect()))
            .collect();

        let mut seen = IndexSet::new();
        phrase_rules.retain(|rule| seen.insert(rule.clone()));

        let grammar = Grammar {
            nonterminals,
            terminals,
            rules,
            phrase_rules,
            start_symbol: start_symbol.into(),
        };
        grammar.validate()?;
        Ok(grammar)
    }

    fn validate(&self) -> Result<(), MalformedGrammar> {
        use MalformedGrammar::*;

        if self.nonterminals.iter().chain(&self.terminals).any(String::is_empty) {
            return Err(EmptySymbolName);
        }
        if !self.nonterminals.contains(&self.start_symbol) {
            return Err(StartNotNonterminal(self.start_symbol.clone()));
        }
        if let Some(name) = self.nonterminals.intersection(&self.terminals).next() {
            return Err(TerminalNonterminal(name.clone()));
        }
        if let Some(head) = self.rules.keys().find(|head| !self.nonterminals.contains(*head)) {
            return Err(ProductionsNotNonterminal(head.clone()));
        }

        for rule in &self.phrase_rules {
            if !rule.lhs.iter().any(|symbol| !symbol.is_terminal()) {
                return Err(PhraseRuleWithoutNonterminal);
            }
        }

        let used = self
            .rules
            .values()
            .flatten()
            .flatten()
            .chain(self.phrase_rules.iter().flat_map(|rule| rule.lhs.iter().chain(&rule.rhs)));
        for symbol in used {
            let declared = match symbol {
                Symbol::Terminal(name) => self.terminals.contains(name),
                Symbol::Nonterminal(name) => self.nonterminals.contains(name),
            };
            if !declared {
                return Err(UndeclaredSymbol(symbol.name().to_string()));
            }
        }

        Ok(())
    }

    pub fn nonterminals(&self) -> &IndexSet<String> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &IndexSet<String> {
        &self.terminals
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn rules(&self) -> &IndexMap<String, Rewrite> {
        &self.rules
    }

    pub fn phrase_rules(&self) -> &[PhraseRule] {
        &self.phrase_rules
    }

    // The alternatives of a nonterminal, empty when it has none
    pub fn productions(&self, nonterminal: &str) -> &[Alternative] {
        self.rules.get(nonterminal).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.nonterminals.contains(name)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.contains(name)
    }

    pub fn production_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum::<usize>() + self.phrase_rules.len()
    }

    pub fn with_start(&self, start_symbol: &str) -> Result<Grammar, MalformedGrammar> {
        let mut grammar = self.clone();
        grammar.start_symbol = start_symbol.to_string();
        grammar.validate()?;
        Ok(grammar)
    }

    pub(crate) fn require_context_free(&self) -> GrammarResult<()> {
        if self.phrase_rules.is_empty() {
            Ok(())
        } else {
            Err(GrammarError::UnsupportedGrammarType(self.phrase_rules.len()))
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Non-Terminals:")?;
        writeln!(f, "  {{ {} }}", self.nonterminals.iter().join(", "))?;
        writeln!(f, "Terminals:")?;
        writeln!(f, "  {{ {} }}", self.terminals.iter().join(", "))?;
        writeln!(f, "Productions:")?;
        for (head, rewrite) in &self.rules {
            let alternatives = rewrite.iter().map(|alt| format_alternative(alt)).join(" | ");
            writeln!(f, "  {} -> {}", head, alternatives)?;
        }
        for rule in &self.phrase_rules {
            writeln!(f, "  {} -> {}", format_alternative(&rule.lhs), format_alternative(&rule.rhs))?;
        }
        writeln!(f, "Start Symbol:")?;
        write!(f, "  {}", self.start_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn balanced() -> Grammar {
        Grammar::new(
            names(&["S"]),
            names(&["a", "b"]),
            vec![(
                "S".to_string(),
                vec![
                    vec![Symbol::terminal("a"), Symbol::nonterminal("S"), Symbol::terminal("b")],
                    vec![],
                ],
            )],
            "S",
        )
        .unwrap()
    }

    #[test]
    fn construct_valid_grammar() {
        let grammar = balanced();

        assert_eq!(grammar.start_symbol(), "S");
        assert_eq!(grammar.productions("S").len(), 2);
        assert!(grammar.productions("T").is_empty());
        assert_eq!(grammar.production_count(), 2);
        assert!(grammar.is_terminal("a"));
        assert!(grammar.is_nonterminal("S"));
    }

    #[test]
    fn duplicate_alternatives_collapse() {
        let grammar = Grammar::new(
            names(&["S"]),
            names(&["a"]),
            vec![
                ("S".to_string(), vec![vec![Symbol::terminal("a")], vec![Symbol::terminal("a")]]),
                ("S".to_string(), vec![vec![], vec![Symbol::terminal("a")]]),
            ],
            "S",
        )
        .unwrap();

        assert_eq!(grammar.productions("S"), &[vec![Symbol::terminal("a")], vec![]]);
    }

    #[test]
    fn reject_malformed_grammars() {
        let a = || vec![vec![Symbol::terminal("a")]];

        assert_eq!(
            Grammar::new(names(&["S"]), names(&["a"]), vec![("S".to_string(), a())], "T"),
            Err(MalformedGrammar::StartNotNonterminal("T".to_string()))
        );
        assert_eq!(
            Grammar::new(names(&["S", "a"]), names(&["a"]), vec![("S".to_string(), a())], "S"),
            Err(MalformedGrammar::TerminalNonterminal("a".to_string()))
        );
        assert_eq!(
            Grammar::new(names(&["S"]), names(&["a"]), vec![("T".to_string(), a())], "S"),
            Err(MalformedGrammar::ProductionsNotNonterminal("T".to_string()))
        );
        assert_eq!(
            Grammar::new(
                names(&["S"]),
                names(&["a"]),
                vec![("S".to_string(), vec![vec![Symbol::terminal("b")]])],
                "S"
            ),
            Err(MalformedGrammar::UndeclaredSymbol("b".to_string()))
        );
        // A terminal tag on a nonterminal name is still undeclared
        assert_eq!(
            Grammar::new(
                names(&["S"]),
                names(&["a"]),
                vec![("S".to_string(), vec![vec![Symbol::terminal("S")]])],
                "S"
            ),
            Err(MalformedGrammar::UndeclaredSymbol("S".to_string()))
        );
        assert_eq!(
            Grammar::new(names(&["S"]), names(&[""]), Vec::<(String, Rewrite)>::new(), "S"),
            Err(MalformedGrammar::EmptySymbolName)
        );
        assert_eq!(
            Grammar::with_phrase_rules(
                names(&["S"]),
                names(&["a"]),
                Vec::<(String, Rewrite)>::new(),
                vec![PhraseRule { lhs: vec![Symbol::terminal("a")], rhs: vec![] }],
                "S"
            ),
            Err(MalformedGrammar::PhraseRuleWithoutNonterminal)
        );
    }

    #[test]
    fn single_nonterminal_phrase_rules_are_ordinary_productions() {
        let grammar = Grammar::with_phrase_rules(
            names(&["S", "A"]),
            names(&["a"]),
            vec![("A".to_string(), vec![vec![Symbol::terminal("a")]])],
            vec![
                PhraseRule { lhs: vec![Symbol::nonterminal("S")], rhs: vec![Symbol::nonterminal("A")] },
                PhraseRule { lhs: vec![Symbol::nonterminal("A")], rhs: vec![] },
            ],
            "S",
        )
        .unwrap();

        assert!(grammar.phrase_rules().is_empty());
        assert!(grammar.is_context_free());
        assert_eq!(grammar.productions("S"), &[vec![Symbol::nonterminal("A")]]);
        assert_eq!(grammar.productions("A"), &[vec![Symbol::terminal("a")], vec![]]);

        assert_eq!(
            Grammar::with_phrase_rules(
                names(&["S"]),
                names(&["a"]),
                Vec::<(String, Rewrite)>::new(),
                vec![PhraseRule { lhs: vec![Symbol::nonterminal("T")], rhs: vec![] }],
                "S"
            ),
            Err(MalformedGrammar::ProductionsNotNonterminal("T".to_string()))
        );
    }

    #[test]
    fn change_start_symbol() {
        let grammar = balanced();

        assert!(grammar.with_start("S").is_ok());
        assert_eq!(
            grammar.with_start("X"),
            Err(MalformedGrammar::StartNotNonterminal("X".to_string()))
        );
    }

    #[test]
    fn display_lists_everything() {
        let text = balanced().to_string();

        assert!(text.contains("{ S }"));
        assert!(text.contains("{ a, b }"));
        assert!(text.contains("S -> a S b | ε"));
        assert!(text.ends_with("Start Symbol:\n  S"));
    }
}
