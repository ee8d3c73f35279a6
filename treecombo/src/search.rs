//! Label matching for search mode.

use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Case-insensitive substring matcher over row labels.
///
/// Built once per flatten pass and reused for every row.
///
/// Case folding is nucleo's per-character folding, not full Unicode
/// lowercasing: special cases such as `İ` (dotted capital I) or final sigma
/// `ς` do not fold the way `str::to_lowercase` does, so `"i"` does not match
/// `"İstanbul"`. Providers that need locale-aware search should apply it in
/// their own search answers; this only drives the per-row match flag.
pub struct LabelMatcher {
    atom: Atom,
    matcher: Matcher,
    buf: Vec<char>,
}

impl LabelMatcher {
    /// Creates a matcher for `query`.
    pub fn new(query: &str) -> Self {
        Self {
            atom: Atom::new(
                query,
                CaseMatching::Ignore,
                Normalization::Never,
                AtomKind::Substring,
                false,
            ),
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    /// Whether `label` contains the query, ignoring case.
    pub fn is_match(&mut self, label: &str) -> bool {
        let haystack = Utf32Str::new(label, &mut self.buf);
        self.atom.score(haystack, &mut self.matcher).is_some()
    }
}

impl std::fmt::Debug for LabelMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelMatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_ignores_case() {
        let mut matcher = LabelMatcher::new("child 1");
        assert!(matcher.is_match("Child 1-0"));
        assert!(matcher.is_match("CHILD 12"));
        assert!(!matcher.is_match("Child 2-1"));
    }

    #[test]
    fn test_special_case_folds_are_not_applied() {
        let mut matcher = LabelMatcher::new("i");
        assert!(!matcher.is_match("İstanbul"));
        assert!(matcher.is_match("Istanbul"));
    }

    #[test]
    fn test_not_fuzzy() {
        // Characters in order but not contiguous must not match.
        let mut matcher = LabelMatcher::new("nd0");
        assert!(!matcher.is_match("Node 0"));
    }
}
