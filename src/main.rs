mod cli;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::prelude::*;

use grammarian::cyk::{cyk_membership, CykOptions};
use grammarian::generator::generate;
use grammarian::grammar::Grammar;
use grammarian::io::{read_grammar, render_grammar, InputFormat};
use grammarian::normal_form::{to_cnf, to_gnf};
use grammarian::simplify::{merge_equivalent_nonterminals, simplify};

use cli::{Cli, Command, GrammarArgs, OutputArgs};

fn load(args: &GrammarArgs) -> Result<Grammar> {
    let format = args.format.unwrap_or_else(|| InputFormat::from_path(&args.file));
    let grammar = read_grammar(&args.file, format)?;
    info!(
        "loaded {} nonterminals and {} productions from {}",
        grammar.nonterminals().len(),
        grammar.production_count(),
        args.file.display()
    );

    match &args.start {
        Some(start) => grammar
            .with_start(start)
            .with_context(|| format!("cannot use `{}` as the start symbol", start)),
        None => Ok(grammar),
    }
}

fn emit(grammar: &Grammar, output: &OutputArgs) -> Result<()> {
    let rendered = render_grammar(grammar, output.output_format)?;
    match &output.output_file {
        Some(path) => fs::write(path, rendered).with_context(|| format!("could not write {}", path.display())),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Type { grammar } => {
            let grammar = load(&grammar)?;
            println!("{}", grammar.grammar_type());
        }
        Command::Simplify { grammar, output, merge } => {
            let grammar = load(&grammar)?;
            let mut simplified = simplify(&grammar)?;
            if merge {
                simplified = merge_equivalent_nonterminals(&simplified)?;
            }
            emit(&simplified, &output)?;
        }
        Command::Cnf { grammar, output } => {
            let grammar = load(&grammar)?;
            emit(&to_cnf(&grammar)?, &output)?;
        }
        Command::Gnf { grammar, output } => {
            let grammar = load(&grammar)?;
            emit(&to_gnf(&grammar)?, &output)?;
        }
        Command::Cyk {
            grammar,
            word,
            table,
            strict_tokens,
        } => {
            let grammar = load(&grammar)?;
            let options = CykOptions {
                want_table: table,
                strict_tokens,
            };
            let membership = cyk_membership(&grammar, &word, options)?;
            if let Some(table) = &membership.table {
                println!("{}", table);
            }
            if membership.accepted {
                println!("{:?} is in the language", word);
            } else {
                println!("{:?} is not in the language", word);
            }
        }
        Command::Generate {
            grammar,
            amount,
            max_depth,
            seed,
        } => {
            let grammar = load(&grammar)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for _ in 0..amount {
                println!("{}", generate(&grammar, &mut rng, max_depth)?);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}
