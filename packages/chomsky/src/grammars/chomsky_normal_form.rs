use std::fmt::Display;

use indexmap::{indexset, IndexMap, IndexSet};

use crate::{
    error::ShapeError,
    grammars::{
        context_free::ContextFreeGrammar,
        fresh::FreshNames,
        pipeline::Conversion,
        types::{
            format_definition, NonTerminal, Production, ProductionSymbol, ProductionWord,
            Terminal, Word,
        },
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CnfWord {
    Terminal(Terminal),
    NonTerminals(NonTerminal, NonTerminal),
}

impl Display for CnfWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_word())
    }
}

impl TryFrom<Word<ProductionSymbol>> for CnfWord {
    /// The rejected word.
    type Error = Word<ProductionSymbol>;

    fn try_from(value: Word<ProductionSymbol>) -> Result<Self, Self::Error> {
        match value.0.as_slice() {
            [ProductionSymbol::Terminal(t)] => Ok(CnfWord::Terminal(t.clone())),
            [ProductionSymbol::NonTerminal(nt1), ProductionSymbol::NonTerminal(nt2)] => {
                Ok(CnfWord::NonTerminals(nt1.clone(), nt2.clone()))
            }
            _ => Err(value),
        }
    }
}

impl ProductionWord for CnfWord {
    fn to_word(&self) -> Word<ProductionSymbol> {
        match self {
            CnfWord::Terminal(t) => Word(vec![ProductionSymbol::Terminal(t.clone())]),
            CnfWord::NonTerminals(nt1, nt2) => Word(vec![
                ProductionSymbol::NonTerminal(nt1.clone()),
                ProductionSymbol::NonTerminal(nt2.clone()),
            ]),
        }
    }
}

/// A grammar whose productions all have the shape `A → a` or `A → BC`.
///
/// Normal form cannot express the empty word, so whether the language it was
/// derived from contains `ε` is kept as a flag on the start symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChomskyNormalFormGrammar {
    pub(super) start_symbol: NonTerminal,
    pub(super) is_start_symbol_erasable: bool,
    pub(super) productions: IndexMap<NonTerminal, IndexSet<CnfWord>>,
}

impl TryFrom<&ContextFreeGrammar> for ChomskyNormalFormGrammar {
    type Error = ShapeError;

    fn try_from(cfg: &ContextFreeGrammar) -> Result<Self, Self::Error> {
        let mut productions = IndexMap::<_, IndexSet<_>>::new();

        for production in cfg.productions() {
            let word = CnfWord::try_from(production.rhs.clone()).map_err(|_| ShapeError {
                production: production.clone(),
            })?;
            productions
                .entry(production.lhs.clone())
                .or_default()
                .insert(word);
        }

        Ok(Self {
            start_symbol: cfg.start_symbol().clone(),
            is_start_symbol_erasable: false,
            productions,
        })
    }
}

impl ChomskyNormalFormGrammar {
    /// Runs the whole normalization pipeline on `cfg`.
    pub fn from_context_free_grammar(cfg: &ContextFreeGrammar) -> Self {
        Conversion::run(cfg).normal_form()
    }

    pub fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    pub fn is_start_symbol_erasable(&self) -> bool {
        self.is_start_symbol_erasable
    }

    pub fn productions(&self) -> &IndexMap<NonTerminal, IndexSet<CnfWord>> {
        &self.productions
    }

    /// Whether the grammar generates no word at all, not even `ε`.
    pub fn is_empty(&self) -> bool {
        !self.is_start_symbol_erasable && !self.productions.contains_key(&self.start_symbol)
    }

    pub fn definition(&self) -> String {
        let (non_terminals, terminals) = self.symbols();
        let erasable = if self.is_start_symbol_erasable {
            indexset! {self.start_symbol.clone()}
        } else {
            IndexSet::new()
        };

        format_definition(
            &self.start_symbol,
            &non_terminals,
            &terminals,
            self.productions
                .iter()
                .flat_map(|(lhs, rhs)| rhs.iter().map(move |word| (lhs, word))),
            &erasable,
        )
    }

    /// An equivalent grammar without the normal-form restrictions. An erasable
    /// start symbol becomes a fresh start symbol `S'` with `S' → S | ε`, so the
    /// old one may keep appearing on right-hand sides.
    pub fn to_context_free_grammar(&self) -> ContextFreeGrammar {
        let mut grammar = self.without_empty_word();

        if self.is_start_symbol_erasable {
            let start_symbol = FreshNames::new(&grammar).primed(&self.start_symbol);

            grammar.non_terminals.insert(start_symbol.clone());
            grammar
                .productions
                .insert(Production::new(start_symbol.clone(), []));
            grammar.productions.insert(Production::new(
                start_symbol.clone(),
                [self.start_symbol.clone().into()],
            ));
            grammar.start_symbol = start_symbol;
        }

        grammar
    }

    /// The words of length at most `max_len` in the language of the grammar.
    pub fn words_up_to(&self, max_len: usize) -> IndexSet<Word<Terminal>> {
        let mut words = IndexSet::new();
        if self.is_start_symbol_erasable {
            words.insert(Word::epsilon());
        }
        words.extend(self.without_empty_word().words_up_to(max_len));
        words
    }

    fn symbols(&self) -> (IndexSet<NonTerminal>, IndexSet<Terminal>) {
        let mut non_terminals = indexset! {self.start_symbol.clone()};
        let mut terminals = IndexSet::new();

        for (lhs, rhs) in &self.productions {
            non_terminals.insert(lhs.clone());
            for word in rhs {
                match word {
                    CnfWord::Terminal(t) => {
                        terminals.insert(t.clone());
                    }
                    CnfWord::NonTerminals(nt1, nt2) => {
                        non_terminals.insert(nt1.clone());
                        non_terminals.insert(nt2.clone());
                    }
                }
            }
        }

        (non_terminals, terminals)
    }

    fn without_empty_word(&self) -> ContextFreeGrammar {
        let (non_terminals, terminals) = self.symbols();

        let productions = self
            .productions
            .iter()
            .flat_map(|(lhs, rhs)| {
                rhs.iter().map(move |word| Production {
                    lhs: lhs.clone(),
                    rhs: word.to_word(),
                })
            })
            .collect();

        ContextFreeGrammar::from_parts(
            non_terminals,
            terminals,
            self.start_symbol.clone(),
            productions,
        )
    }
}

impl Display for ChomskyNormalFormGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition())
    }
}

impl ContextFreeGrammar {
    /// Rewrites every production into the shapes `A → a` and `A → BC`.
    ///
    /// Terminals inside right-hand sides of two or more symbols are replaced by
    /// proxy non-terminals `T_a → a` (TERM), then right-hand sides longer than
    /// two are split into a chain through fresh non-terminals `X1, X2, …` (BIN).
    /// The rewrite is repeated until a round changes nothing. Unit productions
    /// are left alone and stray ε-productions are dropped.
    pub fn to_chomsky_form(&self) -> Self {
        let mut names = FreshNames::new(self);
        let mut non_terminals = self.non_terminals.clone();
        let mut productions = self.productions.clone();

        loop {
            let mut proxies = terminal_proxies(&productions);
            let mut next = IndexSet::new();

            for production in &productions {
                if production.is_normal() || production.unit_target().is_some() {
                    next.insert(production.clone());
                    continue;
                }

                if production.is_erasing() {
                    warn!("Dropping ε-production {}", production);
                    continue;
                }

                let mut rhs = Vec::with_capacity(production.rhs.len());
                for symbol in &production.rhs {
                    match symbol {
                        ProductionSymbol::NonTerminal(nt) => rhs.push(nt.clone()),
                        ProductionSymbol::Terminal(t) => {
                            let proxy = proxies.entry(t.clone()).or_insert_with(|| {
                                let proxy = names.proxy_for(t);
                                trace!("Introducing {} → {}", proxy, t);
                                non_terminals.insert(proxy.clone());
                                next.insert(Production::new(proxy.clone(), [t.clone().into()]));
                                proxy
                            });
                            rhs.push(proxy.clone());
                        }
                    }
                }

                let mut lhs = production.lhs.clone();
                let (chained, tail) = rhs.split_at(rhs.len().saturating_sub(2));
                for nt in chained {
                    let intermediate = names.intermediate();
                    non_terminals.insert(intermediate.clone());
                    next.insert(Production::new(
                        lhs,
                        [nt.clone().into(), intermediate.clone().into()],
                    ));
                    lhs = intermediate;
                }
                let rewritten = Production::new(lhs, tail.iter().cloned().map(Into::into));
                trace!("{} yields {}", production, rewritten);
                next.insert(rewritten);
            }

            if next == productions {
                break;
            }
            productions = next;
        }

        let terminals = self.used_terminals(
            productions
                .iter()
                .filter(|p| p.single_terminal().is_some()),
        );

        Self::from_parts(
            non_terminals,
            terminals,
            self.start_symbol.clone(),
            productions,
        )
    }
}

/// Non-terminals that can stand in for a terminal: those whose only production
/// is `A → a`.
fn terminal_proxies(productions: &IndexSet<Production>) -> IndexMap<Terminal, NonTerminal> {
    let mut by_lhs = IndexMap::<&NonTerminal, Vec<&Production>>::new();
    for production in productions {
        by_lhs.entry(&production.lhs).or_default().push(production);
    }

    let mut proxies = IndexMap::new();
    for (lhs, group) in by_lhs {
        if let [production] = group.as_slice() {
            if let Some(t) = production.single_terminal() {
                proxies.entry(t.clone()).or_insert_with(|| lhs.clone());
            }
        }
    }
    proxies
}
