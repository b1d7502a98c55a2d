use std::collections::VecDeque;

use indexmap::IndexSet;
use itertools::Itertools;

use crate::grammars::{
    context_free::ContextFreeGrammar,
    types::{NonTerminal, Production, ProductionSymbol},
};

impl ContextFreeGrammar {
    /// The non-terminals that derive at least one word made of terminals only.
    pub fn productive_non_terminals(&self) -> IndexSet<NonTerminal> {
        let mut productive = IndexSet::new();

        loop {
            let mut changed = false;

            for production in &self.productions {
                if productive.contains(&production.lhs) {
                    continue;
                }

                if production.non_terminals().all(|nt| productive.contains(nt)) {
                    productive.insert(production.lhs.clone());
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        productive
    }

    /// Drops the non-productive non-terminals together with every production
    /// that mentions one, and the terminals no surviving production uses.
    ///
    /// A non-productive start symbol means the language is empty. That is not
    /// an error: the result simply no longer declares the start symbol.
    pub fn eliminate_non_productive(&self) -> Self {
        let productive = self.productive_non_terminals();
        debug!(
            "Productive non-terminals: {{{}}}",
            productive.iter().join(", ")
        );

        let productions = self
            .productions
            .iter()
            .filter(|p| {
                productive.contains(&p.lhs) && p.non_terminals().all(|nt| productive.contains(nt))
            })
            .cloned()
            .collect::<IndexSet<_>>();

        let non_terminals = self
            .non_terminals
            .iter()
            .filter(|nt| productive.contains(*nt))
            .cloned()
            .collect::<IndexSet<_>>();

        if self.declares_start_symbol() && !productive.contains(&self.start_symbol) {
            warn!(
                "Start symbol {} is non-productive, the language is empty",
                self.start_symbol
            );
        }

        Self::from_parts(
            non_terminals,
            self.used_terminals(&productions),
            self.start_symbol.clone(),
            productions,
        )
    }

    /// The symbols occurring in some sentential form derived from the start
    /// symbol. Empty if the start symbol is not declared.
    pub fn accessible_symbols(&self) -> IndexSet<ProductionSymbol> {
        let mut accessible = IndexSet::new();
        let mut todo = VecDeque::new();

        if self.declares_start_symbol() {
            accessible.insert(ProductionSymbol::NonTerminal(self.start_symbol.clone()));
            todo.push_back(&self.start_symbol);
        }

        while let Some(nt) = todo.pop_front() {
            for symbol in self.productions_of(nt).flat_map(|p| p.rhs.iter()) {
                if !self.declares(symbol) || !accessible.insert(symbol.clone()) {
                    continue;
                }
                if let ProductionSymbol::NonTerminal(nt) = symbol {
                    todo.push_back(nt);
                }
            }
        }

        accessible
    }

    /// Drops the symbols that cannot be reached from the start symbol, and every
    /// production that mentions one.
    pub fn eliminate_inaccessible(&self) -> Self {
        if !self.declares_start_symbol() {
            warn!(
                "Start symbol {} is not a non-terminal of the grammar, the language is empty",
                self.start_symbol
            );
        }

        let accessible = self.accessible_symbols();
        debug!(
            "Accessible symbols: {{{}}}",
            accessible.iter().join(", ")
        );

        let non_terminals = self
            .non_terminals
            .iter()
            .filter(|nt| accessible.contains(&ProductionSymbol::NonTerminal((*nt).clone())))
            .cloned()
            .collect::<IndexSet<_>>();

        let productions = self
            .productions
            .iter()
            .filter(|p| {
                non_terminals.contains(&p.lhs)
                    && p.non_terminals().all(|nt| non_terminals.contains(nt))
            })
            .cloned()
            .collect::<IndexSet<Production>>();

        Self::from_parts(
            non_terminals,
            self.used_terminals(&productions),
            self.start_symbol.clone(),
            productions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::types::Terminal;
    use pretty_assertions::assert_eq;

    fn grammar(productions: &[&str]) -> ContextFreeGrammar {
        ContextFreeGrammar::from_productions("S", productions).unwrap()
    }

    fn productions(productions: &[&str]) -> IndexSet<Production> {
        grammar(productions).productions
    }

    #[test]
    fn productive_fixpoint() {
        let g = grammar(&["S → AB | Cc", "A → a", "B → bA", "C → CD", "D → d"]);

        assert_eq!(
            g.productive_non_terminals(),
            IndexSet::from(["A", "B", "D", "S"].map(NonTerminal::new))
        );
    }

    #[test]
    fn non_productive_rules_disappear() {
        let g = grammar(&["S → Ac | b", "A → AB", "B → b"]).eliminate_non_productive();

        assert_eq!(g.productions, productions(&["S → b", "B → b"]));
        assert_eq!(
            g.non_terminals,
            IndexSet::from(["S", "B"].map(NonTerminal::new))
        );
        assert_eq!(g.terminals, IndexSet::from([Terminal::new("b")]));
    }

    #[test]
    fn non_productive_start_symbol() {
        let g = grammar(&["S → aS", "A → a"]).eliminate_non_productive();

        assert!(!g.declares_start_symbol());
        assert_eq!(g.productions, productions(&["A → a"]));
        assert!(g.check_symbols().is_ok());
    }

    #[test]
    fn erasing_productions_are_productive() {
        let g = grammar(&["S → AA", "A → ε"]);

        assert_eq!(
            g.productive_non_terminals(),
            IndexSet::from(["A", "S"].map(NonTerminal::new))
        );
    }

    #[test]
    fn unreachable_rules_disappear() {
        let g = grammar(&["S → aA", "A → a", "Z → zA"]).eliminate_inaccessible();

        assert_eq!(g.productions, productions(&["S → aA", "A → a"]));
        assert_eq!(
            g.non_terminals,
            IndexSet::from(["S", "A"].map(NonTerminal::new))
        );
        assert_eq!(g.terminals, IndexSet::from([Terminal::new("a")]));
    }

    #[test]
    fn undeclared_start_symbol_reaches_nothing() {
        let g = grammar(&["S → aS", "A → a"]).eliminate_non_productive();
        let g = g.eliminate_inaccessible();

        assert!(g.non_terminals.is_empty());
        assert!(g.terminals.is_empty());
        assert!(g.productions.is_empty());
    }
}
