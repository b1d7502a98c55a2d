pub use crate::{
    error::{GrammarError, ParseError, ShapeError},
    grammars::{
        chomsky_normal_form::{ChomskyNormalFormGrammar, CnfWord},
        context_free::ContextFreeGrammar,
        pipeline::{convert_to_cnf, Conversion, Observation, Pass, Step, PIPELINE},
        types::{NonTerminal, Production, ProductionSymbol, ProductionWord, Terminal},
    },
    language::{Symbol, Word, EPSILON},
    parser::parse_grammar,
};
