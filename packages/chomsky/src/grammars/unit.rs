use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::grammars::{
    context_free::ContextFreeGrammar,
    types::{NonTerminal, Production},
};

impl ContextFreeGrammar {
    /// For every left-hand side `A`, the non-terminals `B` with `A ⇒* B` using
    /// unit productions only. `A` itself comes first.
    pub fn unit_closures(&self) -> IndexMap<NonTerminal, IndexSet<NonTerminal>> {
        self.productions
            .iter()
            .map(|p| &p.lhs)
            .unique()
            .map(|nt| {
                let mut unit_closure = IndexSet::from([nt.clone()]);
                let mut todo = VecDeque::from([nt]);

                while let Some(closure_nt) = todo.pop_front() {
                    for target in self
                        .productions_of(closure_nt)
                        .filter_map(Production::unit_target)
                    {
                        if unit_closure.insert(target.clone()) {
                            todo.push_back(target);
                        }
                    }
                }

                (nt.clone(), unit_closure)
            })
            .collect()
    }

    /// Removes every unit production `A → B`.
    ///
    /// `A → A` is simply dropped. Otherwise `A` receives a copy `A → α` of every
    /// non-unit production `B → α` of the input grammar, for every `B` reachable
    /// from `A` through a chain of unit productions, so `A → B`, `B → C`,
    /// `C → a` yields `A → a`. Chasing the chains through the precomputed
    /// closures keeps unit cycles from bouncing between rewrites forever.
    pub fn eliminate_unit_productions(&self) -> Self {
        let mut productions = IndexSet::new();

        for (nt, closure) in self.unit_closures() {
            if closure.len() > 1 {
                debug!(
                    "Unit closure of {}: {{{}}}",
                    nt,
                    closure.iter().join(", ")
                );
            }

            for target in &closure {
                for production in self
                    .productions_of(target)
                    .filter(|p| p.unit_target().is_none())
                {
                    let copy = Production {
                        lhs: nt.clone(),
                        rhs: production.rhs.clone(),
                    };
                    if target != &nt {
                        trace!("{} yields {}", production, copy);
                    }
                    productions.insert(copy);
                }
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
    fn unit_chain() {
        let g = grammar(&["S → A", "A → B", "B → c"]).eliminate_unit_productions();

        assert_eq!(g.productions, productions(&["S → c", "A → c", "B → c"]));
    }

    #[test]
    fn self_loops_are_dropped() {
        let g = grammar(&["S → S | a"]).eliminate_unit_productions();

        assert_eq!(g.productions, productions(&["S → a"]));
    }

    #[test]
    fn cycles_terminate() {
        let g = grammar(&["S → A", "A → B", "B → C | b", "C → B | c"])
            .eliminate_unit_productions();

        assert_eq!(
            g.productions,
            productions(&["S → b | c", "A → b | c", "B → b | c", "C → b | c"])
        );
    }

    #[test]
    fn non_unit_productions_are_copied_verbatim() {
        let g = grammar(&["S → A | SS", "A → aA | a"]).eliminate_unit_productions();

        assert_eq!(
            g.productions,
            productions(&["S → SS | aA | a", "A → aA | a"])
        );
    }

    #[test]
    fn closures() {
        let closures = grammar(&["S → A | a", "A → B", "B → A | b"]).unit_closures();

        assert_eq!(
            closures[&NonTerminal::new("S")],
            IndexSet::from(["S", "A", "B"].map(NonTerminal::new))
        );
        assert_eq!(
            closures[&NonTerminal::new("B")],
            IndexSet::from(["B", "A"].map(NonTerminal::new))
        );
    }
}
