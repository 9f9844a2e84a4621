/*
    This module reads and writes grammars in the supported file formats
*/

mod bnf;
mod json;

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::debug;
use thiserror::Error;

use crate::error_handling::report;
use crate::grammar::*;
use crate::parser::{parse_file, BnfErrors};

pub use bnf::{to_bnf, BnfWriteError};
pub use json::{from_json, to_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Bnf,
    Json,
}

impl InputFormat {
    // `.json` files are JSON, everything else is BNF
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Bnf,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Bnf,
    Json,
    /// Human-readable summary
    #[default]
    Text,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}", report(.0))]
    Bnf(BnfErrors),
    #[error("invalid JSON grammar: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{0}` is neither a declared nonterminal nor a declared terminal")]
    UnknownSymbol(String),
    #[error("malformed grammar: {0}")]
    Malformed(#[from] MalformedGrammar),
    #[error("could not read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot write the grammar as BNF: {0}")]
    Bnf(#[from] BnfWriteError),
    #[error("cannot write the grammar as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn read_grammar(path: &Path, format: InputFormat) -> Result<Grammar, LoadError> {
    debug!("reading {} as {:?}", path.display(), format);
    match format {
        InputFormat::Bnf => parse_file(path).map_err(LoadError::Bnf),
        InputFormat::Json => {
            let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            from_json(&text)
        }
    }
}

pub fn render_grammar(grammar: &Grammar, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Bnf => Ok(to_bnf(grammar)?),
        OutputFormat::Json => Ok(to_json(grammar)? + "\n"),
        OutputFormat::Text => Ok(grammar.to_string() + "\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(InputFormat::from_path(Path::new("g.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("g.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("g.bnf")), InputFormat::Bnf);
        assert_eq!(InputFormat::from_path(Path::new("grammar")), InputFormat::Bnf);
    }

    #[test]
    fn both_formats_read_the_same_grammar() {
        let bnf = read_grammar(Path::new("example_data/balanced.bnf"), InputFormat::Bnf).unwrap();
        let json = read_grammar(Path::new("example_data/balanced.json"), InputFormat::Json).unwrap();

        assert_eq!(bnf, json);
    }

    #[test]
    fn bnf_errors_are_reported_with_locations() {
        let error = read_grammar(Path::new("example_data/malformed.bnf"), InputFormat::Bnf).unwrap_err();
        let message = error.to_string();

        assert!(message.contains("malformed.bnf:3"));
        assert!(message.contains("malformed.bnf:6"));
    }

    #[test]
    fn missing_files_are_reported() {
        let error = read_grammar(Path::new("example_data/missing.json"), InputFormat::Json).unwrap_err();

        assert!(matches!(error, LoadError::Read { .. }));
    }

    #[test]
    fn render_every_format() {
        let g = read_grammar(Path::new("example_data/balanced.bnf"), InputFormat::Bnf).unwrap();

        assert_eq!(render_grammar(&g, OutputFormat::Bnf).unwrap(), "S = \"a\" S \"b\" | ε\n");
        assert!(render_grammar(&g, OutputFormat::Json).unwrap().contains("\"start_symbol\": \"S\""));
        assert!(render_grammar(&g, OutputFormat::Text).unwrap().starts_with("Non-Terminals:"));
    }

    #[test]
    fn unwritable_bnf_is_an_error_not_bad_text() {
        let g = Grammar::new(
            vec!["S".to_string(), "A".to_string()],
            vec!["a".to_string()],
            vec![("S".to_string(), vec![vec![Symbol::nonterminal("A")]])],
            "S",
        )
        .unwrap();

        let error = render_grammar(&g, OutputFormat::Bnf).unwrap_err();
        assert!(matches!(error, RenderError::Bnf(BnfWriteError::Undefined(ref name)) if name == "A"));
        assert!(render_grammar(&g, OutputFormat::Json).is_ok());
    }
}
