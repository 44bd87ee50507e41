//! Normalized symbol lists.

/// Sorted, de-duplicated, uppercase symbol list.
///
/// Two lists naming the same symbols in any order or case compare equal, so
/// re-observing an equivalent portfolio does not restart polling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SymbolSet(Vec<String>);

impl SymbolSet {
    /// Normalize raw symbols. Blank entries are dropped.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symbols: Vec<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        Self(symbols)
    }

    /// Symbols in canonical order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of distinct symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no symbol is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
