// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The per-compile symbol set.

use indexmap::IndexSet;

/// Names the caller declares as bound in the compiled expression.
///
/// Built once per compile from explicit names and the inferred name of a
/// named function literal. The rewrite only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    names: IndexSet<String>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl From<&str> for Symbols {
    fn from(name: &str) -> Self {
        let mut symbols = Symbols::new();
        symbols.insert(name);
        symbols
    }
}

impl From<String> for Symbols {
    fn from(name: String) -> Self {
        let mut symbols = Symbols::new();
        symbols.insert(name);
        symbols
    }
}

impl From<Vec<String>> for Symbols {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<&[&str]> for Symbols {
    fn from(names: &[&str]) -> Self {
        names.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Symbols {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl From<Option<&str>> for Symbols {
    fn from(name: Option<&str>) -> Self {
        name.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Symbols {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { names: iter.into_iter().map(Into::into).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert!(Symbols::from("a").contains("a"));
        assert!(Symbols::from(vec!["a".to_string(), "b".to_string()]).contains("b"));
        assert!(Symbols::from(["x", "y"]).contains("y"));
        assert!(Symbols::from(None).is_empty());
        assert!(Symbols::default().is_empty());
    }

    #[test]
    fn keeps_insertion_order() {
        let symbols = Symbols::from(["b", "a", "b"]);
        assert_eq!(symbols.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
