use std::fmt::Display;

use derive_more::Display;
use enumflags2::{bitflags, BitFlags};
use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use crate::grammars::{
    chomsky_normal_form::ChomskyNormalFormGrammar, context_free::ContextFreeGrammar,
};

/// One rewrite of the normalization pipeline.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    #[display("Eliminate ε-productions")]
    EliminateErasingProductions,
    #[display("Eliminate unit productions")]
    EliminateUnitProductions,
    #[display("Eliminate non-productive symbols")]
    EliminateNonProductive,
    #[display("Eliminate inaccessible symbols")]
    EliminateInaccessible,
    #[display("Transform productions to A → BC or A → a")]
    ToChomskyForm,
}

impl Pass {
    pub fn apply(self, grammar: &ContextFreeGrammar) -> ContextFreeGrammar {
        match self {
            Pass::EliminateErasingProductions => grammar.eliminate_erasing_productions(),
            Pass::EliminateUnitProductions => grammar.eliminate_unit_productions(),
            Pass::EliminateNonProductive => grammar.eliminate_non_productive(),
            Pass::EliminateInaccessible => grammar.eliminate_inaccessible(),
            Pass::ToChomskyForm => grammar.to_chomsky_form(),
        }
    }

    /// What the output of this pass reveals about the language.
    fn observe(self, output: &ContextFreeGrammar) -> BitFlags<Observation> {
        match self {
            Pass::EliminateNonProductive if !output.declares_start_symbol() => {
                Observation::StartNonProductive.into()
            }
            Pass::EliminateInaccessible if !output.declares_start_symbol() => {
                Observation::StartInaccessible.into()
            }
            _ => BitFlags::empty(),
        }
    }
}

/// The passes in the order they run. Shaping can bring back unit productions
/// and useless symbols, hence the second round of cleanup after it.
pub const PIPELINE: [Pass; 8] = [
    Pass::EliminateErasingProductions,
    Pass::EliminateUnitProductions,
    Pass::EliminateNonProductive,
    Pass::EliminateInaccessible,
    Pass::ToChomskyForm,
    Pass::EliminateUnitProductions,
    Pass::EliminateNonProductive,
    Pass::EliminateInaccessible,
];

/// Facts about the language noticed along the way. Either one means the
/// grammar generates no non-empty word. Each is reported once, on the first
/// step that makes it.
///
/// Reachability never drops a declared start symbol, so `StartInaccessible`
/// follows from a start symbol that an earlier pass already removed, normally
/// after `StartNonProductive`.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    #[display("start symbol is non-productive")]
    StartNonProductive = 0b01,
    #[display("start symbol is inaccessible")]
    StartInaccessible = 0b10,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub pass: Pass,
    pub grammar: ContextFreeGrammar,
    pub observations: BitFlags<Observation>,
}

/// The record of one run of the pipeline: the input, every intermediate
/// grammar, and whether the input language contains the empty word.
#[derive(Debug, Clone)]
pub struct Conversion {
    original: ContextFreeGrammar,
    steps: Vec<Step>,
    derives_empty_word: bool,
}

impl Conversion {
    pub fn run(grammar: &ContextFreeGrammar) -> Self {
        let derives_empty_word = grammar
            .nullable_non_terminals()
            .contains(grammar.start_symbol());

        let mut steps = Vec::<Step>::with_capacity(PIPELINE.len());
        let mut seen = BitFlags::<Observation>::empty();

        for (i, pass) in PIPELINE.into_iter().enumerate() {
            let input = steps.last().map_or(grammar, |step| &step.grammar);

            info!("Step {}: {}", i + 1, pass);
            let output = pass.apply(input);
            debug_assert!(
                output.check_symbols().is_ok(),
                "{} broke the grammar: {:?}",
                pass,
                output.check_symbols()
            );
            debug!("{}", output.definition());

            let observations = pass.observe(&output) & !seen;
            seen |= observations;
            steps.push(Step {
                pass,
                grammar: output,
                observations,
            });
        }

        Self {
            original: grammar.clone(),
            steps,
            derives_empty_word,
        }
    }

    pub fn original(&self) -> &ContextFreeGrammar {
        &self.original
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The final grammar.
    pub fn grammar(&self) -> &ContextFreeGrammar {
        self.steps
            .last()
            .map_or(&self.original, |step| &step.grammar)
    }

    pub fn into_grammar(self) -> ContextFreeGrammar {
        match self.steps.into_iter().last() {
            Some(step) => step.grammar,
            None => self.original,
        }
    }

    /// Whether `ε` belongs to the language of the original grammar. The
    /// normal form has no way to express it.
    pub fn derives_empty_word(&self) -> bool {
        self.derives_empty_word
    }

    pub fn observations(&self) -> BitFlags<Observation> {
        self.steps
            .iter()
            .fold(BitFlags::empty(), |acc, step| acc | step.observations)
    }

    /// Whether the original grammar generates no word at all.
    pub fn is_language_empty(&self) -> bool {
        !self.derives_empty_word && !self.observations().is_empty()
    }

    /// The final grammar as a typed normal-form grammar.
    ///
    /// # Panics
    ///
    /// If the final grammar has a production outside normal form, which the
    /// shaping pass followed by the cleanup passes rules out.
    pub fn normal_form(&self) -> ChomskyNormalFormGrammar {
        debug_assert!(
            self.grammar().productions().iter().all(|p| p.is_normal()),
            "{}",
            self.grammar().definition()
        );
        let mut cnf = ChomskyNormalFormGrammar::try_from(self.grammar()).unwrap_or_else(|err| {
            panic!("Normalization left a production outside normal form: {err}")
        });
        cnf.is_start_symbol_erasable = self.derives_empty_word;
        cnf
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();

        builder.push_record(
            ["#", "Step", "Non-terminals", "Terminals", "Productions", "Notes"].map(String::from),
        );
        builder.push_record([
            String::new(),
            "Original grammar".to_string(),
            self.original.non_terminals().len().to_string(),
            self.original.terminals().len().to_string(),
            self.original.productions().len().to_string(),
            String::new(),
        ]);
        for (i, step) in self.steps.iter().enumerate() {
            builder.push_record([
                (i + 1).to_string(),
                step.pass.to_string(),
                step.grammar.non_terminals().len().to_string(),
                step.grammar.terminals().len().to_string(),
                step.grammar.productions().len().to_string(),
                step.observations.iter().join(", "),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        writeln!(f, "{}", table)
    }
}

/// Converts `grammar` to Chomsky normal form: no ε-productions, no unit
/// productions, no useless symbols, and every production shaped `A → BC` or
/// `A → a`.
pub fn convert_to_cnf(grammar: &ContextFreeGrammar) -> ContextFreeGrammar {
    Conversion::run(grammar).into_grammar()
}
