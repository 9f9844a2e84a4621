use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::LoadError;
use crate::grammar::*;

// Symbols are stored by name and resolved against the declared sets
#[derive(Debug, Serialize, Deserialize)]
struct GrammarDocument {
    nonterminals: Vec<String>,
    terminals: Vec<String>,
    start_symbol: String,
    productions: IndexMap<String, Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    phrase_rules: Vec<PhraseRuleDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PhraseRuleDocument {
    lhs: Vec<String>,
    rhs: Vec<String>,
}

fn names(symbols: &[Symbol]) -> Vec<String> {
    symbols.iter().map(|symbol| symbol.name().to_string()).collect()
}

impl From<&Grammar> for GrammarDocument {
    fn from(grammar: &Grammar) -> Self {
        GrammarDocument {
            nonterminals: grammar.nonterminals().iter().cloned().collect(),
            terminals: grammar.terminals().iter().cloned().collect(),
            start_symbol: grammar.start_symbol().to_string(),
            productions: grammar
                .rules()
                .iter()
                .map(|(head, rewrite)| (head.clone(), rewrite.iter().map(|alternative| names(alternative)).collect()))
                .collect(),
            phrase_rules: grammar
                .phrase_rules()
                .iter()
                .map(|rule| PhraseRuleDocument {
                    lhs: names(&rule.lhs),
                    rhs: names(&rule.rhs),
                })
                .collect(),
        }
    }
}

struct Resolver {
    nonterminals: IndexSet<String>,
    terminals: IndexSet<String>,
}

impl Resolver {
    fn symbol(&self, name: String) -> Result<Symbol, LoadError> {
        if self.nonterminals.contains(&name) {
            Ok(Symbol::Nonterminal(name))
        } else if self.terminals.contains(&name) {
            Ok(Symbol::Terminal(name))
        } else {
            Err(LoadError::UnknownSymbol(name))
        }
    }

    fn sequence(&self, names: Vec<String>) -> Result<Alternative, LoadError> {
        names.into_iter().map(|name| self.symbol(name)).collect()
    }
}

impl GrammarDocument {
    fn into_grammar(self) -> Result<Grammar, LoadError> {
        let resolver = Resolver {
            nonterminals: self.nonterminals.into_iter().collect(),
            terminals: self.terminals.into_iter().collect(),
        };

        let rules = self
            .productions
            .into_iter()
            .map(|(head, rewrite)| {
                let rewrite = rewrite
                    .into_iter()
                    .map(|alternative| resolver.sequence(alternative))
                    .collect::<Result<Rewrite, _>>()?;
                Ok::<_, LoadError>((head, rewrite))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        let phrase_rules = self
            .phrase_rules
            .into_iter()
            .map(|rule| {
                Ok::<_, LoadError>(PhraseRule {
                    lhs: resolver.sequence(rule.lhs)?,
                    rhs: resolver.sequence(rule.rhs)?,
                })
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        Ok(Grammar::with_phrase_rules(
            resolver.nonterminals.iter().cloned(),
            resolver.terminals.iter().cloned(),
            rules,
            phrase_rules,
            self.start_symbol,
        )?)
    }
}

pub fn from_json(text: &str) -> Result<Grammar, LoadError> {
    let document: GrammarDocument = serde_json::from_str(text)?;
    document.into_grammar()
}

pub fn to_json(grammar: &Grammar) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&GrammarDocument::from(grammar))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::parser::{parse_file, parse_str};

    #[test]
    fn read_balanced_grammar() {
        let text = std::fs::read_to_string("example_data/balanced.json").unwrap();
        let from_json = from_json(&text).unwrap();
        let from_bnf = parse_file(Path::new("example_data/balanced.bnf")).unwrap();

        assert_eq!(from_json, from_bnf);
    }

    #[test]
    fn phrase_rules_survive_json() {
        let g = parse_file(Path::new("example_data/anbncn.bnf")).unwrap();

        assert_eq!(from_json(&to_json(&g).unwrap()).unwrap(), g);
    }

    #[test]
    fn phrase_rules_are_omitted_when_absent() {
        let g = parse_str("S = \"a\"").unwrap();

        assert!(!to_json(&g).unwrap().contains("phrase_rules"));
    }

    #[test]
    fn single_nonterminal_left_sides_stay_context_free() {
        let text = r#"{"nonterminals": ["S"], "terminals": ["a"], "start_symbol": "S", "productions": {},
            "phrase_rules": [{"lhs": ["S"], "rhs": ["a"]}]}"#;
        let g = from_json(text).unwrap();

        assert!(g.is_context_free());
        assert_eq!(g.grammar_type(), ChomskyType::Regular);
        assert_eq!(g, parse_str("S = \"a\"").unwrap());
        assert!(crate::normal_form::to_cnf(&g).is_ok());
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let text = r#"{"nonterminals": ["S"], "terminals": ["a"], "start_symbol": "S", "productions": {"S": [["b"]]}}"#;

        assert!(matches!(from_json(text), Err(LoadError::UnknownSymbol(name)) if name == "b"));
    }

    #[test]
    fn invariants_are_checked() {
        let text = r#"{"nonterminals": ["S"], "terminals": ["a"], "start_symbol": "a", "productions": {"S": [["a"]]}}"#;

        assert!(matches!(
            from_json(text),
            Err(LoadError::Malformed(MalformedGrammar::StartNotNonterminal(name))) if name == "a"
        ));
        assert!(matches!(from_json("{"), Err(LoadError::Json(_))));
    }
}
