use itertools::{Itertools, PeekingNext};

use super::{BnfErrorKind, Parsed};

#[derive(PartialEq, Debug)]
pub enum Token {
    Equals,
    Or,
    Epsilon,
    Nonterminal(String),
    Terminal(String),
}

pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Parsed<Token> {
    if line.next() != Some('"') {
        return Err(BnfErrorKind::UnmatchedQuote);
    }
    let text: String = line.peeking_take_while(|&c| c != '"').collect();

    match line.next() {
        Some('"') => Ok(Token::Terminal(text)),
        _ => Err(BnfErrorKind::UnmatchedQuote),
    }
}

// Characters that end a bare word even without surrounding whitespace
pub(crate) fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '|' | '"' | ';')
}

pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> Parsed<Token> {
    let word: String = line.peeking_take_while(|&c| !is_delimiter(c)).collect();
    if word == "ε" {
        return Ok(Token::Epsilon);
    }
    Ok(Token::Nonterminal(word))
}

pub fn lex_line(line: &str) -> Parsed<Vec<Token>> {
    let mut chars = line.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        let token = match c {
            // The rest of the line is a comment
            ';' => break,
            '=' => {
                chars.next();
                Token::Equals
            }
            '|' => {
                chars.next();
                Token::Or
            }
            '"' => lex_terminal(&mut chars)?,
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            _ => lex_nonterminal(&mut chars)?,
        };
        tokens.push(token);
    }

    Ok(tokens)
}
