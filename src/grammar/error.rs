use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedGrammar {
    #[error("the start symbol `{0}` is not a nonterminal")]
    StartNotNonterminal(String),
    #[error("`{0}` is declared as both a nonterminal and a terminal symbol")]
    TerminalNonterminal(String),
    #[error("`{0}` appears in a production but is not a declared symbol of that kind")]
    UndeclaredSymbol(String),
    #[error("`{0}` has productions but is not a nonterminal symbol")]
    ProductionsNotNonterminal(String),
    #[error("symbol names cannot be empty; write ε as an empty production")]
    EmptySymbolName,
    #[error("the left side of a phrase rule must contain a nonterminal")]
    PhraseRuleWithoutNonterminal,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("malformed grammar: {0}")]
    Malformed(#[from] MalformedGrammar),
    #[error("the start symbol `{0}` generates no terminal string, so the language is empty")]
    EmptyLanguage(String),
    #[error("a context-free grammar is required, but {0} rule(s) have a left side other than a single nonterminal")]
    UnsupportedGrammarType(usize),
    #[error("greibach normalisation still had nonterminal-leading productions after {0} substitution rounds")]
    Normalization(usize),
    #[error("cannot tokenize position {position}: terminals {candidates:?} all match")]
    TokenizationAmbiguity {
        position: usize,
        candidates: Vec<String>,
    },
}

pub type GrammarResult<T> = Result<T, GrammarError>;
