use std::fmt::Display;

use super::{unit_target, Grammar, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChomskyType {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

impl ChomskyType {
    // The conventional type number, 0 for unrestricted up to 3 for regular
    pub fn level(self) -> u8 {
        match self {
            ChomskyType::Unrestricted => 0,
            ChomskyType::ContextSensitive => 1,
            ChomskyType::ContextFree => 2,
            ChomskyType::Regular => 3,
        }
    }
}

impl Display for ChomskyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChomskyType::Unrestricted => "unrestricted",
            ChomskyType::ContextSensitive => "context-sensitive",
            ChomskyType::ContextFree => "context-free",
            ChomskyType::Regular => "regular",
        };
        write!(f, "Type {} ({})", self.level(), name)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Linearity {
    Right,
    Left,
}

impl Grammar {
    // Most specific class first
    pub fn grammar_type(&self) -> ChomskyType {
        if self.is_regular() {
            ChomskyType::Regular
        } else if self.is_context_free() {
            ChomskyType::ContextFree
        } else if self.is_context_sensitive() {
            ChomskyType::ContextSensitive
        } else {
            ChomskyType::Unrestricted
        }
    }

    pub fn is_context_free(&self) -> bool {
        self.phrase_rules.is_empty()
    }

    // Right-linear and left-linear productions cannot be mixed
    pub fn is_regular(&self) -> bool {
        if !self.is_context_free() {
            return false;
        }

        let mut direction = None;
        for alternative in self.rules.values().flatten() {
            let this_direction = match alternative.as_slice() {
                [] | [Symbol::Terminal(_)] => continue,
                [Symbol::Terminal(_), Symbol::Nonterminal(_)] => Linearity::Right,
                [Symbol::Nonterminal(_), Symbol::Terminal(_)] => Linearity::Left,
                _ => return false,
            };
            match direction {
                None => direction = Some(this_direction),
                Some(d) if d != this_direction => return false,
                Some(_) => {}
            }
        }

        true
    }

    // Non-contracting, except `S -> ε` when `S` is on no right side
    pub fn is_context_sensitive(&self) -> bool {
        let start = Symbol::Nonterminal(self.start_symbol.clone());

        let mut start_erases = false;
        for (head, rewrite) in &self.rules {
            if rewrite.iter().any(Vec::is_empty) {
                if *head != self.start_symbol {
                    return false;
                }
                start_erases = true;
            }
        }
        for rule in &self.phrase_rules {
            if rule.rhs.is_empty() {
                if rule.lhs != [start.clone()] {
                    return false;
                }
                start_erases = true;
            } else if rule.rhs.len() < rule.lhs.len() {
                return false;
            }
        }

        if start_erases {
            let mut right_sides = self
                .rules
                .values()
                .flatten()
                .chain(self.phrase_rules.iter().map(|rule| &rule.rhs));
            if right_sides.any(|alternative| alternative.contains(&start)) {
                return false;
            }
        }

        true
    }

    pub fn has_epsilon_productions(&self) -> bool {
        self.rules.values().flatten().any(Vec::is_empty)
            || self.phrase_rules.iter().any(|rule| rule.rhs.is_empty())
    }

    pub fn has_unit_productions(&self) -> bool {
        self.rules
            .values()
            .flatten()
            .any(|alternative| unit_target(alternative).is_some())
    }
}
