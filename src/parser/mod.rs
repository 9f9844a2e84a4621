/*
    This module reads grammars written in BNF
*/

mod lexer;
mod verifier;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexSet;
use thiserror::Error;

use crate::error_handling::*;
use crate::grammar::*;
use lexer::{lex_line, Token};
use verifier::{defined_nonterminals, verify_rules};

pub(crate) use lexer::is_delimiter;

#[derive(Debug, Error)]
pub enum BnfErrorKind {
    // A line starting with a nonterminal has no `=`
    #[error("Expected `=` after the left side of a rule")]
    MissingEquals,
    #[error("A rule can only have one `=`")]
    ExtraEquals,
    // The left side is empty, or made of terminals only
    #[error("The left side of a rule must contain a nonterminal")]
    MissingNonterminal,
    #[error("A terminal is missing its closing quote")]
    UnmatchedQuote,
    #[error("`{0}` is used but never defined")]
    UndefinedNonterminal(String),
    #[error("The grammar has no rules")]
    NoRules,
    // Every line parsed, but together they break a grammar invariant
    #[error("Invalid grammar: {0}")]
    InvalidGrammar(MalformedGrammar),
    #[error("Could not read the file: {0}")]
    Io(std::io::Error),
}

impl ErrorType for BnfErrorKind {}

impl PartialEq for BnfErrorKind {
    fn eq(&self, other: &Self) -> bool {
        use BnfErrorKind::*;

        match (self, other) {
            (Io(a), Io(b)) => a.kind() == b.kind(),
            (UndefinedNonterminal(a), UndefinedNonterminal(b)) => a == b,
            (InvalidGrammar(a), InvalidGrammar(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

pub type BnfError = Error<BnfErrorKind>;
pub type BnfErrors = Errors<BnfErrorKind>;

// Results inside a single line, before a location is attached
type Parsed<T> = std::result::Result<T, BnfErrorKind>;
pub type BnfResult<T> = std::result::Result<T, BnfErrors>;

// One line of the file. A head of a single nonterminal is an ordinary rule,
// anything longer is a phrase-structure rule.
#[derive(PartialEq, Debug)]
pub struct Rule {
    head: Vec<Symbol>,
    rewrite: Rewrite,
    location: Location,
}

fn parse_head(tokens: &[Token]) -> Parsed<Vec<Symbol>> {
    let head = tokens
        .iter()
        .map(|token| match token {
            Token::Nonterminal(name) => Ok(Symbol::Nonterminal(name.clone())),
            Token::Terminal(text) if !text.is_empty() => Ok(Symbol::Terminal(text.clone())),
            _ => Err(BnfErrorKind::MissingNonterminal),
        })
        .collect::<Parsed<Vec<Symbol>>>()?;

    if head.iter().any(|symbol| !symbol.is_terminal()) {
        Ok(head)
    } else {
        Err(BnfErrorKind::MissingNonterminal)
    }
}

// `ε` and `""` contribute nothing, so an alternative made only of them is ε
fn parse_rewrite(tokens: &[Token]) -> Parsed<Rewrite> {
    let mut rewrite = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        match token {
            Token::Equals => return Err(BnfErrorKind::ExtraEquals),
            Token::Or => rewrite.push(std::mem::take(&mut current)),
            Token::Epsilon => {}
            Token::Terminal(text) if text.is_empty() => {}
            Token::Terminal(text) => current.push(Symbol::Terminal(text.clone())),
            Token::Nonterminal(name) => current.push(Symbol::Nonterminal(name.clone())),
        }
    }
    rewrite.push(current);

    Ok(rewrite)
}

fn parse_rule(tokens: &[Token], location: Location) -> Parsed<Rule> {
    let Some(equals) = tokens.iter().position(|token| *token == Token::Equals) else {
        return Err(match tokens.first() {
            Some(Token::Nonterminal(_)) => BnfErrorKind::MissingEquals,
            _ => BnfErrorKind::MissingNonterminal,
        });
    };

    Ok(Rule {
        head: parse_head(&tokens[..equals])?,
        rewrite: parse_rewrite(&tokens[equals + 1..])?,
        location,
    })
}

fn grammar_from_rules(rules: Vec<Rule>, path: &Path) -> BnfResult<Grammar> {
    verify_rules(&rules)?;

    let whole_file = |error| vec![BnfError { location: Location::whole_file(path), error }];

    let start_symbol = rules
        .first()
        .and_then(|rule| rule.head.iter().find_map(Symbol::as_nonterminal))
        .map(str::to_string)
        .ok_or_else(|| whole_file(BnfErrorKind::NoRules))?;

    let nonterminals = defined_nonterminals(&rules);
    let terminals: IndexSet<String> = rules
        .iter()
        .flat_map(|rule| rule.head.iter().chain(rule.rewrite.iter().flatten()))
        .filter(|symbol| symbol.is_terminal())
        .map(|symbol| symbol.name().to_string())
        .collect();

    let mut ordinary = Vec::new();
    let mut phrase_rules = Vec::new();
    for Rule { head, rewrite, .. } in rules {
        match head.as_slice() {
            [Symbol::Nonterminal(name)] => ordinary.push((name.clone(), rewrite)),
            _ => phrase_rules.extend(rewrite.into_iter().map(|rhs| PhraseRule { lhs: head.clone(), rhs })),
        }
    }

    Grammar::with_phrase_rules(nonterminals, terminals, ordinary, phrase_rules, start_symbol)
        .map_err(|e| whole_file(BnfErrorKind::InvalidGrammar(e)))
}

// Blank and comment-only lines are skipped. Every broken line is reported,
// not just the first.
fn parse_lines(lines: impl Iterator<Item = std::io::Result<String>>, path: &Path) -> BnfResult<Grammar> {
    let mut rules = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in lines.enumerate() {
        let location = Location {
            file: path.to_path_buf(),
            line: index + 1,
        };
        let parsed = line
            .map_err(BnfErrorKind::Io)
            .and_then(|line| lex_line(&line))
            .and_then(|tokens| {
                if tokens.is_empty() {
                    Ok(None)
                } else {
                    parse_rule(&tokens, location.clone()).map(Some)
                }
            });

        match parsed {
            Ok(Some(rule)) => rules.push(rule),
            Ok(None) => {}
            Err(error) => errors.push(BnfError { location, error }),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    grammar_from_rules(rules, path)
}

pub fn parse_file(path: &Path) -> BnfResult<Grammar> {
    let file = File::open(path).map_err(|e| {
        vec![BnfError {
            location: Location::whole_file(path),
            error: BnfErrorKind::Io(e),
        }]
    })?;

    parse_lines(BufReader::new(file).lines(), path)
}

// Parses grammar text that did not come from a file
pub fn parse_str(text: &str) -> BnfResult<Grammar> {
    parse_lines(text.lines().map(|line| Ok(line.to_string())), Path::new(""))
}
