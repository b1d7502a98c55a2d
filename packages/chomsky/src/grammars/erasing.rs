use indexmap::IndexSet;
use itertools::Itertools;

use crate::grammars::{
    context_free::ContextFreeGrammar,
    types::{NonTerminal, Production, ProductionSymbol, Word},
};

impl ContextFreeGrammar {
    /// The non-terminals that can derive the empty word.
    pub fn nullable_non_terminals(&self) -> IndexSet<NonTerminal> {
        let mut nullable = IndexSet::new();

        loop {
            let mut changed = false;

            for production in &self.productions {
                if nullable.contains(&production.lhs) {
                    continue;
                }

                // Vacuously true for `A → ε`.
                let is_lhs_erasable = production.rhs.iter().all(|symbol| match symbol {
                    ProductionSymbol::NonTerminal(nt) => nullable.contains(nt),
                    ProductionSymbol::Terminal(_) => false,
                });

                if is_lhs_erasable {
                    nullable.insert(production.lhs.clone());
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        nullable
    }

    /// Removes every ε-production. Each remaining production is replaced by all
    /// the variants obtained by leaving out any subset of its nullable
    /// non-terminals; variants that would be empty are dropped.
    ///
    /// A right-hand side with `k` nullable occurrences yields up to `2^k`
    /// productions.
    pub fn eliminate_erasing_productions(&self) -> Self {
        let nullable = self.nullable_non_terminals();
        debug!(
            "Nullable non-terminals: {{{}}}",
            nullable.iter().join(", ")
        );

        let mut productions = IndexSet::new();

        for production in self.productions.iter().filter(|p| !p.is_erasing()) {
            let words = production
                .rhs
                .iter()
                .cloned()
                .map(|symbol| {
                    let is_erasable = matches!(
                        &symbol,
                        ProductionSymbol::NonTerminal(nt) if nullable.contains(nt)
                    );
                    if is_erasable {
                        vec![Some(symbol), None]
                    } else {
                        vec![Some(symbol)]
                    }
                })
                .multi_cartesian_product()
                .filter_map(|word| {
                    let word = word.into_iter().flatten().collect::<Word<_>>();
                    if word.is_empty() {
                        None
                    } else {
                        Some(word)
                    }
                });

            for rhs in words {
                let rewritten = Production {
                    lhs: production.lhs.clone(),
                    rhs,
                };
                if &rewritten != production {
                    trace!("{} yields {}", production, rewritten);
                }
                productions.insert(rewritten);
            }
        }

        Self::from_parts(
            self.non_terminals.clone(),
            self.terminals.clone(),
            self.start_symbol.clone(),
            productions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grammar(productions: &[&str]) -> ContextFreeGrammar {
        ContextFreeGrammar::from_productions("S", productions).unwrap()
    }

    fn productions(productions: &[&str]) -> IndexSet<Production> {
        grammar(productions).productions
    }

    #[test]
    fn nullable_needs_a_fixpoint() {
        let g = grammar(&["S → AB | a", "A → BB", "B → ε | b", "C → Ca"]);

        assert_eq!(
            g.nullable_non_terminals(),
            IndexSet::from(["B", "A", "S"].map(NonTerminal::new))
        );
    }

    #[test]
    fn self_embedding_rule() {
        let g = grammar(&["S → aSb | ε"]).eliminate_erasing_productions();

        assert_eq!(g.productions, productions(&["S → aSb | ab"]));
    }

    #[test]
    fn every_subset_of_nullable_positions() {
        let g = grammar(&["S → AbA", "A → a | ε"]).eliminate_erasing_productions();

        assert_eq!(g.productions, productions(&["S → AbA | Ab | bA | b", "A → a"]));
    }

    #[test]
    fn duplicate_variants_collapse() {
        let g = grammar(&["S → AA", "A → a | ε"]).eliminate_erasing_productions();

        assert_eq!(g.productions, productions(&["S → AA | A", "A → a"]));
    }

    #[test]
    fn empty_variants_are_dropped() {
        let g = grammar(&["S → A", "A → ε"]).eliminate_erasing_productions();

        assert_eq!(g.productions, productions(&["S → A"]));
    }

    #[test]
    fn symbol_sets_are_kept() {
        let original = grammar(&["S → ε | A", "A → ε"]);
        let g = original.eliminate_erasing_productions();

        assert_eq!(g.productions, productions(&["S → A"]));
        assert_eq!(g.non_terminals, original.non_terminals);
        assert_eq!(g.terminals, original.terminals);

        let g = grammar(&["S → ε"]).eliminate_erasing_productions();
        assert!(g.productions.is_empty());
        assert_eq!(g.non_terminals, IndexSet::from([NonTerminal::new("S")]));
    }
}
