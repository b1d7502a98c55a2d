use std::collections::HashSet;

use crate::grammars::{
    context_free::ContextFreeGrammar,
    types::{NonTerminal, Terminal},
};

/// Hands out non-terminal names that clash neither with a symbol of the
/// grammar it was created for nor with a name it handed out before.
///
/// Each normalization run owns its generator, so conversions of unrelated
/// grammars never share a counter.
#[derive(Debug)]
pub struct FreshNames {
    taken: HashSet<String>,
    counter: usize,
}

impl FreshNames {
    pub fn new(grammar: &ContextFreeGrammar) -> Self {
        Self {
            taken: grammar.symbol_names().map(str::to_owned).collect(),
            counter: 1,
        }
    }

    /// A proxy for `terminal`, `T_<terminal>` when that name is free and
    /// `T_<terminal>_0`, `T_<terminal>_1`, … otherwise. Characters other than
    /// ASCII letters and digits are left out of the name.
    pub fn proxy_for(&mut self, terminal: &Terminal) -> NonTerminal {
        let base = format!(
            "T_{}",
            terminal
                .name()
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
        );

        if !self.taken.contains(&base) {
            return self.reserve(base);
        }

        let mut suffix = 0;
        loop {
            let name = format!("{base}_{suffix}");
            if !self.taken.contains(&name) {
                return self.reserve(name);
            }
            suffix += 1;
        }
    }

    /// The next free `X<n>` name. Numbering is shared by every call made
    /// through this generator.
    pub fn intermediate(&mut self) -> NonTerminal {
        loop {
            let name = format!("X{}", self.counter);
            self.counter += 1;

            if !self.taken.contains(&name) {
                return self.reserve(name);
            }
        }
    }

    /// `S'`, or `S''` and so on when that is taken.
    pub fn primed(&mut self, nt: &NonTerminal) -> NonTerminal {
        let mut name = format!("{nt}'");
        while self.taken.contains(&name) {
            name.push('\'');
        }
        self.reserve(name)
    }

    fn reserve(&mut self, name: String) -> NonTerminal {
        self.taken.insert(name.clone());
        NonTerminal::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn proxies_avoid_existing_names() {
        let s = NonTerminal::new("S");
        let g = ContextFreeGrammar::new(
            [s.clone(), NonTerminal::new("T_a")],
            [Terminal::new("a"), Terminal::new("T_a_0"), Terminal::new("+")],
            s,
            [],
        )
        .unwrap();
        let mut names = FreshNames::new(&g);

        assert_eq!(names.proxy_for(&Terminal::new("a")), NonTerminal::new("T_a_1"));
        assert_eq!(names.proxy_for(&Terminal::new("a")), NonTerminal::new("T_a_2"));
        assert_eq!(names.proxy_for(&Terminal::new("+")), NonTerminal::new("T_"));
        assert_eq!(names.proxy_for(&Terminal::new("b")), NonTerminal::new("T_b"));
    }

    #[test]
    fn intermediates_are_numbered_monotonically() {
        let s = NonTerminal::new("S");
        let g = ContextFreeGrammar::new([s.clone(), NonTerminal::new("X2")], [], s, []).unwrap();
        let mut names = FreshNames::new(&g);

        assert_eq!(names.intermediate(), NonTerminal::new("X1"));
        assert_eq!(names.intermediate(), NonTerminal::new("X3"));
        assert_eq!(names.intermediate(), NonTerminal::new("X4"));
    }

    #[test]
    fn primed_names() {
        let s = NonTerminal::new("S");
        let g = ContextFreeGrammar::new([s.clone(), NonTerminal::new("S'")], [], s.clone(), [])
            .unwrap();
        let mut names = FreshNames::new(&g);

        assert_eq!(names.primed(&s), NonTerminal::new("S''"));
        assert_eq!(names.primed(&s), NonTerminal::new("S'''"));
    }
}
