//! Filtering of internal presentation wrappers from reconstructed text

use std::collections::HashSet;

/// Suffix of the helpers amsmath emits for `\DeclareMathOperator`
pub const DEFAULT_WRAPPER_SUFFIXES: &[&str] = &["@wrapper"];

/// Denylist of control sequences that never appear in reconstructed text
///
/// A token is a wrapper when its text equals one of the listed names or ends
/// with one of the listed suffixes. Filtering works on whole tokens, so the
/// tokens around a wrapper (braces included) are kept byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperFilter {
    names: HashSet<Vec<u8>>,
    suffixes: Vec<Vec<u8>>,
}

impl WrapperFilter {
    /// A filter that drops nothing
    pub fn none() -> Self {
        Self {
            names: HashSet::new(),
            suffixes: Vec::new(),
        }
    }

    /// Add exact control sequence names (e.g. `\op@wrapper`)
    pub fn names(mut self, names: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add name suffixes (e.g. `@wrapper`)
    pub fn suffixes(mut self, suffixes: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Self {
        self.suffixes.extend(
            suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &Vec<u8>| !s.is_empty()),
        );
        self
    }

    /// Whether a token's text is a wrapper control sequence
    pub fn is_wrapper(&self, token: &[u8]) -> bool {
        if !token.starts_with(b"\\") {
            return false;
        }
        self.names.contains(token) || self.suffixes.iter().any(|s| token.ends_with(s))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.suffixes.is_empty()
    }
}

impl Default for WrapperFilter {
    fn default() -> Self {
        Self::none().suffixes(DEFAULT_WRAPPER_SUFFIXES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_drops_operator_wrapper() {
        let filter = WrapperFilter::default();
        assert!(filter.is_wrapper(br"\op@wrapper"));
        assert!(filter.is_wrapper(br"\argmax@wrapper"));
        assert!(!filter.is_wrapper(br"\op@presentation"));
        assert!(!filter.is_wrapper(b"{"));
    }

    #[test]
    fn test_only_control_sequences_match() {
        let filter = WrapperFilter::none().suffixes(["wrapper"]);
        assert!(!filter.is_wrapper(b"wrapper"));
        assert!(filter.is_wrapper(br"\mywrapper"));
    }

    #[test]
    fn test_exact_names() {
        let filter = WrapperFilter::none().names([r"\nolimits@".as_bytes()]);
        assert!(filter.is_wrapper(br"\nolimits@"));
        assert!(!filter.is_wrapper(br"\nolimits"));
    }

    #[test]
    fn test_none_is_empty() {
        assert!(WrapperFilter::none().is_empty());
        assert!(!WrapperFilter::default().is_empty());
        assert!(!WrapperFilter::none().is_wrapper(br"\op@wrapper"));
    }

    #[test]
    fn test_empty_suffix_ignored() {
        let filter = WrapperFilter::none().suffixes([""]);
        assert!(filter.is_empty());
        assert!(!filter.is_wrapper(br"\x"));
    }
}
