/*
    This module generates random sentences of a grammar's language
*/

use std::collections::HashMap;

use log::{debug, trace};
use rand::prelude::*;

use crate::grammar::*;

pub const DEFAULT_MAX_DEPTH: usize = 16;

// The fewest derivation levels each nonterminal needs to reach a terminal string.
// Nonterminals that never do are missing from the map.
fn minimal_heights(grammar: &Grammar) -> HashMap<&str, usize> {
    let mut heights: HashMap<&str, usize> = HashMap::new();

    let mut changed = true;
    while changed {
        changed = false;
        for (head, rewrite) in grammar.rules() {
            let best = rewrite.iter().filter_map(|alternative| alternative_height(alternative, &heights)).min();
            if let Some(best) = best {
                if heights.get(head.as_str()).map_or(true, |current| best < *current) {
                    heights.insert(head.as_str(), best);
                    changed = true;
                }
            }
        }
    }

    heights
}

fn alternative_height(alternative: &[Symbol], heights: &HashMap<&str, usize>) -> Option<usize> {
    alternative
        .iter()
        .filter_map(Symbol::as_nonterminal)
        .map(|name| heights.get(name).copied())
        .try_fold(0, |highest, height| height.map(|height| highest.max(height)))
        .map(|highest| highest + 1)
}

struct Generator<'a, R: Rng> {
    grammar: &'a Grammar,
    heights: HashMap<&'a str, usize>,
    rng: &'a mut R,
    max_depth: usize,
}

impl<R: Rng> Generator<'_, R> {
    fn generate_nonterminal(&mut self, nonterminal: &str, depth: usize) -> String {
        let grammar = self.grammar;
        let target = self.heights.get(nonterminal).copied();
        let eligible: Vec<&Alternative> = grammar
            .productions(nonterminal)
            .iter()
            .filter(|alternative| match alternative_height(alternative, &self.heights) {
                Some(height) => depth < self.max_depth || Some(height) == target,
                None => false,
            })
            .collect();

        match eligible.choose(&mut *self.rng) {
            Some(alternative) => {
                trace!("{} -> {}", nonterminal, format_alternative(alternative));
                self.generate_rewrite(alternative, depth + 1)
            }
            None => String::new(),
        }
    }

    fn generate_rewrite(&mut self, alternative: &[Symbol], depth: usize) -> String {
        let mut result = String::new();
        for symbol in alternative {
            result.push_str(&self.generate_symbol(symbol, depth));
        }
        result
    }

    fn generate_symbol(&mut self, symbol: &Symbol, depth: usize) -> String {
        match symbol {
            Symbol::Nonterminal(name) => self.generate_nonterminal(name, depth),
            Symbol::Terminal(terminal) => terminal.clone(),
        }
    }
}

// Past `max_depth` only the alternatives that finish fastest stay eligible,
// so generation always terminates.
pub fn generate<R: Rng>(grammar: &Grammar, rng: &mut R, max_depth: usize) -> GrammarResult<String> {
    grammar.require_context_free()?;

    let heights = minimal_heights(grammar);
    if !heights.contains_key(grammar.start_symbol()) {
        return Err(GrammarError::EmptyLanguage(grammar.start_symbol().to_string()));
    }
    debug!("minimal derivation heights: {:?}", heights);

    let mut generator = Generator {
        grammar,
        heights,
        rng,
        max_depth,
    };
    Ok(generator.generate_nonterminal(grammar.start_symbol(), 0))
}
