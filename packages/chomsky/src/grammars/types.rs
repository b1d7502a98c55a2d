use std::fmt::Display;

use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

pub use crate::language::Word;
use crate::language::Symbol;

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Terminal(pub Symbol);

impl Terminal {
    pub fn new(name: impl Into<String>) -> Self {
        Terminal(Symbol::new(name))
    }

    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal(pub Symbol);

impl NonTerminal {
    pub fn new(name: impl Into<String>) -> Self {
        NonTerminal(Symbol::new(name))
    }

    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductionSymbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl ProductionSymbol {
    pub fn name(&self) -> &str {
        match self {
            ProductionSymbol::Terminal(t) => t.name(),
            ProductionSymbol::NonTerminal(nt) => nt.name(),
        }
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            ProductionSymbol::Terminal(t) => Some(t),
            ProductionSymbol::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            ProductionSymbol::Terminal(_) => None,
            ProductionSymbol::NonTerminal(nt) => Some(nt),
        }
    }
}

impl From<Terminal> for ProductionSymbol {
    fn from(t: Terminal) -> Self {
        ProductionSymbol::Terminal(t)
    }
}

impl From<NonTerminal> for ProductionSymbol {
    fn from(nt: NonTerminal) -> Self {
        ProductionSymbol::NonTerminal(nt)
    }
}

/// A right-hand side that can be spelled out as a plain word of symbols.
pub trait ProductionWord: Display + Clone {
    fn to_word(&self) -> Word<ProductionSymbol>;
}

impl ProductionWord for Word<ProductionSymbol> {
    fn to_word(&self) -> Word<ProductionSymbol> {
        Word(self.0.clone())
    }
}

/// A rewrite rule `lhs → rhs`. An empty `rhs` is an ε-production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Word<ProductionSymbol>,
}

impl Production {
    pub fn new(lhs: NonTerminal, rhs: impl IntoIterator<Item = ProductionSymbol>) -> Self {
        Self {
            lhs,
            rhs: Word::new(rhs),
        }
    }

    pub fn is_erasing(&self) -> bool {
        self.rhs.is_empty()
    }

    /// The target `B` of a unit production `A → B`.
    pub fn unit_target(&self) -> Option<&NonTerminal> {
        match self.rhs.0.as_slice() {
            [ProductionSymbol::NonTerminal(nt)] => Some(nt),
            _ => None,
        }
    }

    /// The terminal `a` of a production `A → a`.
    pub fn single_terminal(&self) -> Option<&Terminal> {
        match self.rhs.0.as_slice() {
            [ProductionSymbol::Terminal(t)] => Some(t),
            _ => None,
        }
    }

    /// Whether the production already has one of the shapes `A → a` or `A → BC`.
    pub fn is_normal(&self) -> bool {
        matches!(
            self.rhs.0.as_slice(),
            [ProductionSymbol::Terminal(_)]
                | [ProductionSymbol::NonTerminal(_), ProductionSymbol::NonTerminal(_)]
        )
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = &NonTerminal> {
        self.rhs.iter().filter_map(ProductionSymbol::as_non_terminal)
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.rhs.iter().filter_map(ProductionSymbol::as_terminal)
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.lhs, self.rhs)
    }
}

/// Renders `G = ({N}, {T}, P, S)` followed by the production block. The start
/// symbol is listed first, everything else is sorted.
pub(crate) fn format_definition<'a, W: ProductionWord + 'a>(
    start_symbol: &NonTerminal,
    non_terminals: impl IntoIterator<Item = &'a NonTerminal>,
    terminals: impl IntoIterator<Item = &'a Terminal>,
    productions: impl IntoIterator<Item = (&'a NonTerminal, &'a W)>,
    erasable: &IndexSet<NonTerminal>,
) -> String {
    let start_first = |a: &&NonTerminal, b: &&NonTerminal| {
        (*a != start_symbol)
            .cmp(&(*b != start_symbol))
            .then_with(|| a.cmp(b))
    };

    let non_terminals = non_terminals.into_iter().sorted_by(start_first).join(", ");
    let terminals = terminals.into_iter().sorted().join(", ");

    let mut string_productions = IndexMap::<&NonTerminal, Vec<String>>::new();
    for (lhs, rhs) in productions {
        string_productions
            .entry(lhs)
            .or_default()
            .push(rhs.to_string());
    }
    for lhs in erasable {
        string_productions
            .entry(lhs)
            .or_default()
            .push(Word::<ProductionSymbol>::epsilon().to_string());
    }

    let mut definition = format!("G = ({{{non_terminals}}}, {{{terminals}}}, P, {start_symbol})\n\n");

    definition += "P = {\n";
    for (lhs, mut rhs) in string_productions
        .into_iter()
        .sorted_by(|(a, _), (b, _)| start_first(a, b))
    {
        rhs.sort();
        rhs.dedup();
        definition += &format!("  {} → {}\n", lhs, rhs.join(" | "));
    }
    definition += "}\n";

    definition
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(name: &str) -> ProductionSymbol {
        Terminal::new(name).into()
    }

    fn nt(name: &str) -> ProductionSymbol {
        NonTerminal::new(name).into()
    }

    #[test]
    fn production_shapes() {
        let s = NonTerminal::new("S");

        assert!(Production::new(s.clone(), [t("a")]).is_normal());
        assert!(Production::new(s.clone(), [nt("A"), nt("B")]).is_normal());
        assert!(!Production::new(s.clone(), [nt("A")]).is_normal());
        assert!(!Production::new(s.clone(), [t("a"), nt("B")]).is_normal());
        assert!(!Production::new(s.clone(), [nt("A"), nt("B"), nt("C")]).is_normal());
        assert!(!Production::new(s.clone(), []).is_normal());

        assert!(Production::new(s.clone(), []).is_erasing());
        assert_eq!(
            Production::new(s.clone(), [nt("A")]).unit_target(),
            Some(&NonTerminal::new("A"))
        );
        assert_eq!(Production::new(s.clone(), [t("a")]).unit_target(), None);
        assert_eq!(
            Production::new(s, [t("a")]).single_terminal(),
            Some(&Terminal::new("a"))
        );
    }

    #[test]
    fn production_display() {
        let p = Production::new(NonTerminal::new("S"), [t("a"), nt("S"), t("b")]);
        assert_eq!(p.to_string(), "S → aSb");

        let p = Production::new(NonTerminal::new("S"), []);
        assert_eq!(p.to_string(), "S → ε");
    }
}
