use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::{debug, info};

use crate::grammar::*;
use crate::simplify::simplify;

/// A grammar in Chomsky normal form together with the names its original
/// nonterminals were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnfConversion {
    pub grammar: Grammar,
    pub renaming: IndexMap<String, String>,
}

// Keeps track of the helper nonterminals introduced while converting
struct CnfBuilder {
    names: NameSupply,
    helper_rules: IndexMap<String, Rewrite>,
    terminal_helpers: HashMap<String, String>,
    suffix_helpers: HashMap<Vec<Symbol>, String>,
}

impl CnfBuilder {
    // One helper per distinct terminal, shared by every production
    fn terminal_helper(&mut self, terminal: &str) -> String {
        if let Some(name) = self.terminal_helpers.get(terminal) {
            return name.clone();
        }
        // Punctuation is kept out of names so they survive a BNF round trip
        let base = if terminal.chars().all(|c| c.is_alphanumeric() || c == '_') {
            format!("T_{}", terminal)
        } else {
            format!("T_{}", self.terminal_helpers.len() + 1)
        };
        let name = self.names.fresh(&base);
        self.terminal_helpers.insert(terminal.to_string(), name.clone());
        self.helper_rules.insert(name.clone(), vec![vec![Symbol::Terminal(terminal.to_string())]]);
        name
    }

    // One helper per distinct tail, so equal tails share a chain
    fn suffix_helper(&mut self, suffix: &[Symbol]) -> String {
        if let Some(name) = self.suffix_helpers.get(suffix) {
            return name.clone();
        }
        let name = self.names.fresh(&format!("B{}", self.suffix_helpers.len() + 1));
        self.suffix_helpers.insert(suffix.to_vec(), name.clone());
        self.helper_rules.insert(name.clone(), Vec::new());

        let production = match suffix {
            [_, _] => suffix.to_vec(),
            _ => vec![suffix[0].clone(), Symbol::Nonterminal(self.suffix_helper(&suffix[1..]))],
        };
        if let Some(rewrite) = self.helper_rules.get_mut(&name) {
            rewrite.push(production);
        }
        name
    }

    fn isolate_terminals(&mut self, alternative: &[Symbol]) -> Alternative {
        if alternative.len() < 2 {
            return alternative.to_vec();
        }
        alternative
            .iter()
            .map(|symbol| match symbol {
                Symbol::Terminal(terminal) => Symbol::Nonterminal(self.terminal_helper(terminal)),
                Symbol::Nonterminal(_) => symbol.clone(),
            })
            .collect()
    }

    fn binarize(&mut self, alternative: Alternative) -> Alternative {
        if alternative.len() <= 2 {
            return alternative;
        }
        let tail = self.suffix_helper(&alternative[1..]);
        vec![alternative[0].clone(), Symbol::Nonterminal(tail)]
    }
}

// Nonterminals are renamed `X1, X2, ...` (start first) after simplifying, so
// the `T_a` and `B1, B2, ...` helpers can never collide with them.
pub fn convert_to_cnf(grammar: &Grammar) -> GrammarResult<CnfConversion> {
    grammar.require_context_free()?;
    let simplified = simplify(grammar)?;

    let mut names = NameSupply::new(simplified.terminals());
    let start = simplified.start_symbol();
    let order = std::iter::once(start)
        .chain(simplified.nonterminals().iter().map(String::as_str).filter(|name| *name != start));
    let renaming: IndexMap<String, String> = order
        .enumerate()
        .map(|(i, name)| (name.to_string(), names.fresh(&format!("X{}", i + 1))))
        .collect();
    debug!("canonical renaming: {:?}", renaming);

    let rename = |symbol: &Symbol| match symbol {
        Symbol::Nonterminal(name) => Symbol::Nonterminal(renaming.get(name).unwrap_or(name).clone()),
        Symbol::Terminal(_) => symbol.clone(),
    };

    let mut builder = CnfBuilder {
        names,
        helper_rules: IndexMap::new(),
        terminal_helpers: HashMap::new(),
        suffix_helpers: HashMap::new(),
    };

    let mut rules: IndexMap<String, IndexSet<Alternative>> = IndexMap::new();
    for (original, renamed) in &renaming {
        let converted = simplified
            .productions(original)
            .iter()
            .map(|alternative| {
                let alternative = alternative.iter().map(&rename).collect_vec();
                let isolated = builder.isolate_terminals(&alternative);
                builder.binarize(isolated)
            })
            .collect();
        rules.insert(renamed.clone(), converted);
    }
    for (helper, rewrite) in builder.helper_rules {
        rules.entry(helper).or_default().extend(rewrite);
    }

    let nonterminals = rules.keys().cloned().collect_vec();
    let new_start = renaming.get(start).cloned().unwrap_or_else(|| start.to_string());
    let converted = Grammar::new(
        nonterminals,
        simplified.terminals().iter().cloned(),
        rules.into_iter().map(|(head, alternatives)| (head, alternatives.into_iter().collect::<Rewrite>())),
        new_start,
    )?;

    info!(
        "chomsky normal form: {} nonterminals, {} productions",
        converted.nonterminals().len(),
        converted.production_count()
    );
    Ok(CnfConversion {
        grammar: converted,
        renaming,
    })
}

pub fn to_cnf(grammar: &Grammar) -> GrammarResult<Grammar> {
    convert_to_cnf(grammar).map(|conversion| conversion.grammar)
}

// A start symbol with `S -> ε` may not occur on any right side
pub fn is_in_cnf(grammar: &Grammar) -> bool {
    let start = grammar.start_symbol();
    let start_erasable = grammar.productions(start).iter().any(Vec::is_empty);
    let start_on_right = grammar
        .rules()
        .values()
        .flatten()
        .flatten()
        .any(|symbol| symbol.as_nonterminal() == Some(start));

    grammar.is_context_free()
        && !(start_erasable && start_on_right)
        && grammar.rules().iter().all(|(head, rewrite)| {
            rewrite.iter().all(|alternative| match alternative.as_slice() {
                [] => head == start,
                [Symbol::Terminal(_)] => true,
                [Symbol::Nonterminal(_), Symbol::Nonterminal(_)] => true,
                _ => false,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn convert_arithmetic_grammar() {
        let g = parse_str("E = E \"+\" T | T\nT = T \"*\" F | F\nF = \"(\" E \")\" | \"x\"").unwrap();
        let conversion = convert_to_cnf(&g).unwrap();

        assert!(is_in_cnf(&conversion.grammar));
        assert_eq!(conversion.grammar.start_symbol(), "X1");
        assert_eq!(conversion.renaming["E"], "X1");
        assert!(!is_in_cnf(&g));
    }

    #[test]
    fn terminal_helpers_are_shared() {
        let g = parse_str("S = \"a\" S \"a\" | \"a\" \"a\"").unwrap();
        let cnf = to_cnf(&g).unwrap();

        let helpers = cnf
            .rules()
            .iter()
            .filter(|(_, rewrite)| rewrite.as_slice() == [vec![Symbol::terminal("a")]])
            .count();
        assert_eq!(helpers, 1);
        assert!(cnf.is_nonterminal("T_a"));
        assert!(is_in_cnf(&cnf));
    }

    #[test]
    fn equal_tails_share_a_chain() {
        let g = parse_str("S = A B C D | B B C D\nA = \"a\"\nB = \"b\"\nC = \"c\"\nD = \"d\"").unwrap();
        let cnf = to_cnf(&g).unwrap();

        // One helper for `B C D` and one for `C D`
        let chains = cnf.nonterminals().iter().filter(|name| name.starts_with('B')).count();
        assert_eq!(chains, 2);
        assert!(is_in_cnf(&cnf));
    }

    #[test]
    fn helper_names_avoid_terminals() {
        let g = parse_str("S = \"X1\" S \"b\" | \"b\"").unwrap();
        let cnf = to_cnf(&g).unwrap();

        assert_eq!(cnf.start_symbol(), "X1'");
        assert!(is_in_cnf(&cnf));
    }

    #[test]
    fn epsilon_stays_on_the_start_symbol() {
        let g = parse_str("S = \"a\" S \"b\" | ε").unwrap();
        let cnf = to_cnf(&g).unwrap();

        assert!(is_in_cnf(&cnf));
        assert!(cnf.productions(cnf.start_symbol()).contains(&vec![]));
    }

    #[test]
    fn checker_rejects_other_shapes() {
        let long = parse_str("S = A A A\nA = \"a\"").unwrap();
        let mixed = parse_str("S = \"a\" A\nA = \"a\"").unwrap();
        let inner_epsilon = parse_str("S = A A\nA = \"a\" | ε").unwrap();
        let unit = parse_str("S = A\nA = \"a\"").unwrap();
        let recursive_start = parse_str("S = A S | ε\nA = \"a\"").unwrap();

        assert!(!is_in_cnf(&long));
        assert!(!is_in_cnf(&mixed));
        assert!(!is_in_cnf(&inner_epsilon));
        assert!(!is_in_cnf(&unit));
        assert!(!is_in_cnf(&recursive_start));
    }

    #[test]
    fn unsupported_and_empty_grammars() {
        let phrase = parse_str("S = \"a\"\n\"a\" S = S").unwrap();
        let empty = parse_str("S = S \"a\"").unwrap();

        assert_eq!(to_cnf(&phrase), Err(GrammarError::UnsupportedGrammarType(1)));
        assert_eq!(to_cnf(&empty), Err(GrammarError::EmptyLanguage("S".to_string())));
    }
}
