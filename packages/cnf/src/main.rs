//! Converts a grammar definition file to Chomsky normal form.

#[macro_use]
extern crate log;

use anyhow::{anyhow, Context, Result};
use chomsky::grammar::{parse_grammar, Conversion};
use clap::{App, Arg};

fn main() -> Result<()> {
    let matches = App::new("cnf")
        .version(clap::crate_version!())
        .about("Converts a context-free grammar to Chomsky normal form.")
        .arg(
            Arg::with_name("grammar")
                .help("Grammar definition with sections V_N, V_T and P")
                .takes_value(true)
                .required(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("steps")
                .short("s")
                .long("steps")
                .help("Print the grammar after every step"),
        )
        .arg(
            Arg::with_name("summary")
                .long("summary")
                .help("Print a table summarizing every step"),
        )
        .arg(
            Arg::with_name("words")
                .short("w")
                .long("words")
                .help("Print the words of the result up to the given length")
                .takes_value(true)
                .value_name("N"),
        )
        .get_matches();

    pretty_env_logger::init();

    let path = matches
        .value_of("grammar")
        .ok_or_else(|| anyhow!("no grammar file given"))?;
    let source =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path))?;
    let grammar = parse_grammar(&source).with_context(|| format!("cannot parse {}", path))?;
    info!(
        "Grammar has {} productions, {} non-terminals, {} terminals",
        grammar.productions().len(),
        grammar.non_terminals().len(),
        grammar.terminals().len(),
    );

    println!("Original grammar:\n{}", grammar.definition());

    let conversion = Conversion::run(&grammar);

    if matches.is_present("steps") {
        for (i, step) in conversion.steps().iter().enumerate() {
            println!("Step {}: {}\n{}", i + 1, step.pass, step.grammar.definition());
        }
    }

    if matches.is_present("summary") {
        println!("{}", conversion);
    }

    let cnf = conversion.normal_form();
    println!("Chomsky normal form:\n{}", cnf.definition());

    if conversion.is_language_empty() {
        println!("The grammar generates the empty language.");
    }

    if let Some(max_len) = matches.value_of("words") {
        let max_len = max_len
            .parse::<usize>()
            .with_context(|| format!("invalid word length `{}`", max_len))?;
        let words = cnf.words_up_to(max_len);

        println!("Words up to length {} ({}):", max_len, words.len());
        for word in &words {
            println!("  {}", word);
        }
    }

    Ok(())
}
