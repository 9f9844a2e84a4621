use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use grammarian::generator::DEFAULT_MAX_DEPTH;
use grammarian::io::{InputFormat, OutputFormat};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GrammarArgs {
    /// File containing the grammar
    pub file: PathBuf,

    /// Format of the grammar file (default: from the file extension)
    #[arg(short, long, value_enum)]
    pub format: Option<InputFormat>,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,
}

#[derive(Args)]
pub struct OutputArgs {
    /// How to print the resulting grammar
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Write the resulting grammar here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the most specific Chomsky type of the grammar
    Type {
        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Remove useless symbols, ε-productions and unit productions
    Simplify {
        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Also merge nonterminals with identical productions
        #[arg(long)]
        merge: bool,
    },

    /// Convert the grammar to Chomsky normal form
    Cnf {
        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Convert the grammar to Greibach normal form
    Gnf {
        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check whether a word is in the language of the grammar
    Cyk {
        #[command(flatten)]
        grammar: GrammarArgs,

        /// The word to check (use "" for the empty word)
        word: String,

        /// Print the CYK table
        #[arg(long)]
        table: bool,

        /// Fail when more than one terminal matches at a position
        #[arg(long)]
        strict_tokens: bool,
    },

    /// Generate random words of the language
    Generate {
        #[command(flatten)]
        grammar: GrammarArgs,

        /// Amount to generate
        #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 1)]
        amount: u32,

        /// Derivation depth after which only the shortest ways out are taken
        #[arg(long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}
