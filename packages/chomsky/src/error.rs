use derive_more::{Display, Error};

use crate::grammars::types::{NonTerminal, Production, ProductionSymbol};

/// A grammar that breaks one of the symbol-set invariants.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[display("start symbol `{symbol}` is not a declared non-terminal")]
    UndeclaredStartSymbol { symbol: NonTerminal },
    #[display("`{name}` is declared both as a terminal and as a non-terminal")]
    AmbiguousSymbol { name: String },
    #[display("production `{production}` uses undeclared symbol `{symbol}`")]
    UndeclaredSymbol {
        symbol: ProductionSymbol,
        production: Production,
    },
}

/// A production that does not have the shape `A → a` or `A → BC`.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
#[display("production `{production}` is not in Chomsky normal form")]
pub struct ShapeError {
    pub production: Production,
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[display("malformed grammar definition:\n{message}")]
    Syntax { message: String },
    #[display("no non-terminal symbols declared")]
    NoNonTerminals,
    #[display("no terminal symbols declared")]
    NoTerminals,
    #[display("no production rules found")]
    NoProductions,
    #[display("invalid production `{production}`, expected `A → α`")]
    InvalidProduction { production: String },
    #[display("left-hand side `{lhs}` is not a non-terminal")]
    InvalidLeftHandSide { lhs: String },
    #[display("unknown symbol at `{rest}` in `{alternative}`")]
    UnknownSymbol { rest: String, alternative: String },
    #[display("{source}")]
    Grammar { source: GrammarError },
}

impl From<GrammarError> for ParseError {
    fn from(source: GrammarError) -> Self {
        ParseError::Grammar { source }
    }
}
