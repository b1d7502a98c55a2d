use std::fmt::Display;

use derive_more::Display;

pub const EPSILON: &str = "ε";

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        assert!(!s.is_empty());
        Symbol(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A finite sequence of symbols. The empty word is written `ε`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word<T>(pub Vec<T>);

impl<T> Word<T> {
    pub fn new(symbols: impl IntoIterator<Item = T>) -> Self {
        Word(symbols.into_iter().collect())
    }

    pub fn epsilon() -> Self {
        Word(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> Default for Word<T> {
    fn default() -> Self {
        Self::epsilon()
    }
}

impl<T: Display> Display for Word<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{EPSILON}");
        }

        let symbols = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();

        // Single-character symbols read fine glued together (`aSb`), longer
        // generated names (`T_a X1`) need a separator.
        if symbols.iter().all(|s| s.chars().count() == 1) {
            write!(f, "{}", symbols.concat())
        } else {
            write!(f, "{}", symbols.join(" "))
        }
    }
}

impl<T> FromIterator<T> for Word<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Word::new(iter)
    }
}

impl<'a, T> IntoIterator for &'a Word<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
