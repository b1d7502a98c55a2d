//! Reader for grammar definitions of the form
//!
//! ```text
//! V_N={S, A, B}
//! V_T={a, b}
//! P={
//!   S -> aSb | ε,
//!   A -> B
//! }
//! ```
//!
//! The start symbol is always `S`. Right-hand sides may glue symbols together
//! (`aSb`) or separate them with spaces (`T_a X1`). Each chunk is split into
//! declared symbol names, preferring longer names, so with `a`, `ab` and `bc`
//! declared, `abab` reads as `ab ab` and `abc` as `a bc`.

use std::cmp::Reverse;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use winnow::{
    ascii::multispace0,
    combinator::{alt, delimited, preceded, separated, terminated},
    prelude::*,
    token::{take_till, take_while},
};

use crate::{
    error::ParseError,
    grammars::{
        context_free::ContextFreeGrammar,
        types::{NonTerminal, Production, ProductionSymbol, Terminal, Word},
    },
    language::EPSILON,
};

pub const START_SYMBOL: &str = "S";

#[derive(Debug, PartialEq)]
struct Definition<'s> {
    non_terminals: Vec<&'s str>,
    terminals: Vec<&'s str>,
    rules: Vec<Rule<'s>>,
}

#[derive(Debug, PartialEq)]
struct Rule<'s> {
    lhs: &'s str,
    alternatives: Vec<&'s str>,
}

fn is_reserved(c: char) -> bool {
    matches!(c, ',' | '{' | '}' | '|')
}

fn name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    delimited(
        multispace0,
        take_while(1.., |c: char| !c.is_whitespace() && !is_reserved(c)),
        multispace0,
    )
    .parse_next(input)
}

fn symbol_set<'s>(key: &'static str) -> impl FnMut(&mut &'s str) -> ModalResult<Vec<&'s str>> {
    move |input: &mut &'s str| {
        preceded(
            (multispace0, key, multispace0, '=', multispace0, '{'),
            terminated(separated(0.., name, ','), (multispace0, '}')),
        )
        .parse_next(input)
    }
}

fn left_hand_side<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    delimited(
        multispace0,
        take_while(1.., |c: char| {
            !c.is_whitespace() && !is_reserved(c) && c != '-' && c != '→'
        }),
        multispace0,
    )
    .parse_next(input)
}

fn alternative<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_till(0.., |c: char| matches!(c, ',' | '|' | '}'))
        .map(str::trim)
        .parse_next(input)
}

fn rule<'s>(input: &mut &'s str) -> ModalResult<Rule<'s>> {
    let lhs = left_hand_side.parse_next(input)?;
    alt(("->", "→")).parse_next(input)?;
    let alternatives = separated(1.., alternative, '|').parse_next(input)?;

    Ok(Rule { lhs, alternatives })
}

fn rules<'s>(input: &mut &'s str) -> ModalResult<Vec<Rule<'s>>> {
    preceded(
        (multispace0, "P", multispace0, '=', multispace0, '{'),
        terminated(separated(0.., rule, ','), (multispace0, '}')),
    )
    .parse_next(input)
}

fn definition<'s>(input: &mut &'s str) -> ModalResult<Definition<'s>> {
    let non_terminals = symbol_set("V_N").parse_next(input)?;
    let terminals = symbol_set("V_T").parse_next(input)?;
    let rules = rules.parse_next(input)?;
    multispace0.parse_next(input)?;

    Ok(Definition {
        non_terminals,
        terminals,
        rules,
    })
}

/// Parses and validates a grammar definition.
pub fn parse_grammar(input: &str) -> Result<ContextFreeGrammar, ParseError> {
    let parsed = definition.parse(input).map_err(|err| ParseError::Syntax {
        message: err.to_string(),
    })?;

    if parsed.non_terminals.is_empty() {
        return Err(ParseError::NoNonTerminals);
    }
    if parsed.terminals.is_empty() {
        return Err(ParseError::NoTerminals);
    }

    let non_terminals = parsed
        .non_terminals
        .iter()
        .map(|name| NonTerminal::new(*name))
        .collect::<IndexSet<_>>();
    let terminals = parsed
        .terminals
        .iter()
        .map(|name| Terminal::new(*name))
        .collect::<IndexSet<_>>();

    let symbols = non_terminals
        .iter()
        .cloned()
        .map(ProductionSymbol::from)
        .chain(terminals.iter().cloned().map(ProductionSymbol::from))
        .map(|symbol| (symbol.name().to_owned(), symbol))
        .collect::<IndexMap<_, _>>();

    let mut productions = IndexSet::new();
    for rule in &parsed.rules {
        let lhs = match symbols.get(rule.lhs) {
            Some(ProductionSymbol::NonTerminal(nt)) => nt.clone(),
            _ => {
                return Err(ParseError::InvalidLeftHandSide {
                    lhs: rule.lhs.to_owned(),
                })
            }
        };

        for alternative in rule.alternatives.iter().filter(|a| !a.is_empty()) {
            let rhs = if *alternative == EPSILON {
                Word::epsilon()
            } else {
                tokenize(alternative, &symbols)?
            };
            productions.insert(Production {
                lhs: lhs.clone(),
                rhs,
            });
        }
    }

    if productions.is_empty() {
        return Err(ParseError::NoProductions);
    }

    Ok(ContextFreeGrammar::new(
        non_terminals,
        terminals,
        NonTerminal::new(START_SYMBOL),
        productions,
    )?)
}

/// Splits `alternative` into declared symbols.
fn tokenize(
    alternative: &str,
    symbols: &IndexMap<String, ProductionSymbol>,
) -> Result<Word<ProductionSymbol>, ParseError> {
    let mut word = Vec::new();

    for chunk in alternative.split_whitespace() {
        let split = split_chunk(chunk, symbols).map_err(|rest| ParseError::UnknownSymbol {
            rest: rest.to_owned(),
            alternative: alternative.to_owned(),
        })?;
        word.extend(split);
    }

    Ok(Word(word))
}

/// Splits `chunk` into declared symbols, trying longer names first and falling
/// back to shorter ones when the remainder cannot be split. On failure, returns
/// the shortest remainder no name matched.
fn split_chunk<'c>(
    chunk: &'c str,
    symbols: &IndexMap<String, ProductionSymbol>,
) -> Result<Vec<ProductionSymbol>, &'c str> {
    if chunk.is_empty() {
        return Ok(Vec::new());
    }

    let mut furthest = chunk;
    for (name, symbol) in symbols
        .iter()
        .filter(|(name, _)| chunk.starts_with(name.as_str()))
        .sorted_by_key(|(name, _)| Reverse(name.len()))
    {
        match split_chunk(&chunk[name.len()..], symbols) {
            Ok(rest) => return Ok(std::iter::once(symbol.clone()).chain(rest).collect()),
            Err(rest) if rest.len() < furthest.len() => furthest = rest,
            Err(_) => {}
        }
    }

    Err(furthest)
}
