use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::grammars::{
    context_free::ContextFreeGrammar,
    types::{NonTerminal, ProductionSymbol, Terminal, Word},
};

impl ContextFreeGrammar {
    /// The words of length at most `max_len` derivable from the start symbol,
    /// shortest first.
    ///
    /// Every non-terminal collects the short words it derives until no
    /// production adds anything new. Words only ever get longer when symbols
    /// are concatenated, so truncating at `max_len` keeps the sets finite
    /// without losing anything.
    pub fn words_up_to(&self, max_len: usize) -> IndexSet<Word<Terminal>> {
        let mut derived = IndexMap::<NonTerminal, IndexSet<Vec<Terminal>>>::new();

        loop {
            let mut changed = false;

            for production in &self.productions {
                let words = concatenations(&production.rhs, &derived, max_len);
                let entry = derived.entry(production.lhs.clone()).or_default();
                for word in words {
                    changed |= entry.insert(word);
                }
            }

            if !changed {
                break;
            }
        }

        derived
            .swap_remove(&self.start_symbol)
            .unwrap_or_default()
            .into_iter()
            .sorted_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .map(Word)
            .collect()
    }
}

/// Every way to spell `rhs` with the words derived so far, up to `max_len`.
fn concatenations(
    rhs: &Word<ProductionSymbol>,
    derived: &IndexMap<NonTerminal, IndexSet<Vec<Terminal>>>,
    max_len: usize,
) -> Vec<Vec<Terminal>> {
    let mut prefixes = vec![Vec::new()];

    for symbol in rhs {
        let suffixes = match symbol {
            ProductionSymbol::Terminal(t) => vec![vec![t.clone()]],
            ProductionSymbol::NonTerminal(nt) => derived
                .get(nt)
                .map(|words| words.iter().cloned().collect())
                .unwrap_or_default(),
        };

        prefixes = prefixes
            .iter()
            .cartesian_product(&suffixes)
            .filter(|(prefix, suffix)| prefix.len() + suffix.len() <= max_len)
            .map(|(prefix, suffix)| prefix.iter().chain(suffix).cloned().collect())
            .collect();

        if prefixes.is_empty() {
            break;
        }
    }

    prefixes
}
