use std::fmt::Display;

use indexmap::IndexSet;

use crate::{
    error::{GrammarError, ParseError},
    grammars::types::{
        format_definition, NonTerminal, Production, ProductionSymbol, Terminal, Word,
    },
    language::EPSILON,
};

/// A context-free grammar `G = (N, T, P, S)`.
///
/// Values are never modified after construction: every normalization pass
/// borrows a grammar and builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFreeGrammar {
    pub(super) non_terminals: IndexSet<NonTerminal>,
    pub(super) terminals: IndexSet<Terminal>,
    pub(super) start_symbol: NonTerminal,
    pub(super) productions: IndexSet<Production>,
}

impl ContextFreeGrammar {
    /// Builds a grammar, checking that the start symbol is declared, that no
    /// name is both a terminal and a non-terminal, and that every production
    /// only uses declared symbols.
    pub fn new(
        non_terminals: impl IntoIterator<Item = NonTerminal>,
        terminals: impl IntoIterator<Item = Terminal>,
        start_symbol: NonTerminal,
        productions: impl IntoIterator<Item = Production>,
    ) -> Result<Self, GrammarError> {
        let grammar = Self::from_parts(
            non_terminals.into_iter().collect(),
            terminals.into_iter().collect(),
            start_symbol,
            productions.into_iter().collect(),
        );
        grammar.validate()?;
        Ok(grammar)
    }

    pub(super) fn from_parts(
        non_terminals: IndexSet<NonTerminal>,
        terminals: IndexSet<Terminal>,
        start_symbol: NonTerminal,
        productions: IndexSet<Production>,
    ) -> Self {
        Self {
            non_terminals,
            terminals,
            start_symbol,
            productions,
        }
    }

    /// Builds a grammar from rules such as `"S → aSb | ε"`.
    ///
    /// Every character is a symbol of its own: upper-case ASCII letters are
    /// non-terminals, anything else is a terminal. The symbol sets are the
    /// symbols that occur in the rules, plus the start symbol.
    pub fn from_productions<S: AsRef<str>>(
        start_symbol: &str,
        productions: &[S],
    ) -> Result<Self, ParseError> {
        fn symbol(c: char) -> ProductionSymbol {
            if c.is_ascii_uppercase() {
                NonTerminal::new(c).into()
            } else {
                Terminal::new(c).into()
            }
        }

        let start_symbol = NonTerminal::new(start_symbol);
        let mut non_terminals = IndexSet::from([start_symbol.clone()]);
        let mut terminals = IndexSet::new();
        let mut rules = IndexSet::new();

        for production in productions {
            let production = production.as_ref();
            let Some((lhs, rhs)) = production
                .split_once('→')
                .or_else(|| production.split_once("->"))
            else {
                return Err(ParseError::InvalidProduction {
                    production: production.to_owned(),
                });
            };

            let lhs = lhs.trim();
            let mut chars = lhs.chars();
            let lhs = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_uppercase() => NonTerminal::new(c),
                _ => {
                    return Err(ParseError::InvalidLeftHandSide {
                        lhs: lhs.to_owned(),
                    })
                }
            };
            non_terminals.insert(lhs.clone());

            for rhs in rhs.split('|').map(str::trim).filter(|rhs| !rhs.is_empty()) {
                let word = if rhs == EPSILON {
                    Word::epsilon()
                } else {
                    rhs.chars()
                        .filter(|c| !c.is_whitespace())
                        .map(symbol)
                        .collect::<Word<_>>()
                };

                for symbol in &word {
                    match symbol {
                        ProductionSymbol::Terminal(t) => terminals.insert(t.clone()),
                        ProductionSymbol::NonTerminal(nt) => non_terminals.insert(nt.clone()),
                    };
                }

                rules.insert(Production {
                    lhs: lhs.clone(),
                    rhs: word,
                });
            }
        }

        Ok(Self::new(non_terminals, terminals, start_symbol, rules)?)
    }

    pub fn non_terminals(&self) -> &IndexSet<NonTerminal> {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &IndexSet<Terminal> {
        &self.terminals
    }

    pub fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    pub fn productions(&self) -> &IndexSet<Production> {
        &self.productions
    }

    /// The productions whose left-hand side is `lhs`.
    pub fn productions_of<'a>(
        &'a self,
        lhs: &'a NonTerminal,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        self.productions.iter().filter(move |p| &p.lhs == lhs)
    }

    /// Whether the start symbol is still among the non-terminals. Once a pass
    /// has found it non-productive or inaccessible, it is dropped and the
    /// grammar generates the empty language.
    pub fn declares_start_symbol(&self) -> bool {
        self.non_terminals.contains(&self.start_symbol)
    }

    pub fn declares(&self, symbol: &ProductionSymbol) -> bool {
        match symbol {
            ProductionSymbol::Terminal(t) => self.terminals.contains(t),
            ProductionSymbol::NonTerminal(nt) => self.non_terminals.contains(nt),
        }
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        if !self.declares_start_symbol() {
            return Err(GrammarError::UndeclaredStartSymbol {
                symbol: self.start_symbol.clone(),
            });
        }
        self.check_symbols()
    }

    /// Checks the invariants that hold after every pass, including those that
    /// dropped the start symbol.
    pub fn check_symbols(&self) -> Result<(), GrammarError> {
        if let Some(t) = self
            .terminals
            .iter()
            .find(|t| self.non_terminals.contains(&NonTerminal(t.0.clone())))
        {
            return Err(GrammarError::AmbiguousSymbol {
                name: t.name().to_owned(),
            });
        }

        for production in &self.productions {
            let lhs = ProductionSymbol::NonTerminal(production.lhs.clone());
            if let Some(symbol) = std::iter::once(&lhs)
                .chain(production.rhs.iter())
                .find(|symbol| !self.declares(symbol))
            {
                return Err(GrammarError::UndeclaredSymbol {
                    symbol: symbol.clone(),
                    production: production.clone(),
                });
            }
        }

        Ok(())
    }

    /// Every name used by the grammar, terminal or not.
    pub fn symbol_names(&self) -> impl Iterator<Item = &str> {
        self.non_terminals
            .iter()
            .map(NonTerminal::name)
            .chain(self.terminals.iter().map(Terminal::name))
            .chain(std::iter::once(self.start_symbol.name()))
            .chain(self.productions.iter().flat_map(|p| {
                std::iter::once(p.lhs.name()).chain(p.rhs.iter().map(ProductionSymbol::name))
            }))
    }

    pub fn definition(&self) -> String {
        format_definition(
            &self.start_symbol,
            &self.non_terminals,
            &self.terminals,
            self.productions.iter().map(|p| (&p.lhs, &p.rhs)),
            &IndexSet::new(),
        )
    }

    /// Terminals used by `productions`, in declaration order.
    pub(super) fn used_terminals<'a>(
        &self,
        productions: impl IntoIterator<Item = &'a Production>,
    ) -> IndexSet<Terminal> {
        let used = productions
            .into_iter()
            .flat_map(Production::terminals)
            .collect::<IndexSet<_>>();

        self.terminals
            .iter()
            .filter(|t| used.contains(t))
            .cloned()
            .collect()
    }
}

impl Display for ContextFreeGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_productions_infers_symbols() {
        let g = ContextFreeGrammar::from_productions("S", &["S → aSb | ε", "S -> A", "A → c"])
            .unwrap();

        assert_eq!(
            g.non_terminals(),
            &IndexSet::from([NonTerminal::new("S"), NonTerminal::new("A")])
        );
        assert_eq!(
            g.terminals(),
            &IndexSet::from(["a", "b", "c"].map(Terminal::new))
        );
        assert_eq!(g.productions().len(), 4);
        assert!(g
            .productions()
            .iter()
            .any(|p| p.lhs == NonTerminal::new("S") && p.is_erasing()));
    }

    #[test]
    fn from_productions_skips_empty_alternatives() {
        let g = ContextFreeGrammar::from_productions("S", &["S → a |", "S → | b"]).unwrap();

        assert_eq!(g.productions().len(), 2);
        assert!(g.productions().iter().all(|p| !p.is_erasing()));
        assert!(g.nullable_non_terminals().is_empty());
    }

    #[test]
    fn from_productions_rejects_bad_rules() {
        assert_eq!(
            ContextFreeGrammar::from_productions("S", &["S = a"]),
            Err(ParseError::InvalidProduction {
                production: "S = a".to_owned()
            })
        );
        assert_eq!(
            ContextFreeGrammar::from_productions("S", &["ab → a"]),
            Err(ParseError::InvalidLeftHandSide {
                lhs: "ab".to_owned()
            })
        );
    }

    #[test]
    fn new_validates_symbols() {
        let s = NonTerminal::new("S");
        let a = Terminal::new("a");

        assert_eq!(
            ContextFreeGrammar::new([], [a.clone()], s.clone(), []),
            Err(GrammarError::UndeclaredStartSymbol { symbol: s.clone() })
        );

        assert_eq!(
            ContextFreeGrammar::new([s.clone()], [Terminal::new("S")], s.clone(), []),
            Err(GrammarError::AmbiguousSymbol {
                name: "S".to_owned()
            })
        );

        let production = Production::new(s.clone(), [NonTerminal::new("B").into()]);
        assert_eq!(
            ContextFreeGrammar::new([s.clone()], [a], s, [production.clone()]),
            Err(GrammarError::UndeclaredSymbol {
                symbol: NonTerminal::new("B").into(),
                production,
            })
        );
    }

    #[test]
    fn definition() {
        let g = ContextFreeGrammar::from_productions("S", &["S → aA | ε", "A → b | SA"])
            .unwrap();

        assert_snapshot!(g.definition(), @r"
        G = ({S, A}, {a, b}, P, S)

        P = {
          S → aA | ε
          A → SA | b
        }
        ");
    }
}
