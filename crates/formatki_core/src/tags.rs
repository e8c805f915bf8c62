//! Ordered, duplicate-free token sets and the candidate pool derived from them.
//!
//! Tokens compare case-insensitively but keep the casing they were added with;
//! insertion order is the order shown to the user and sent to the service.

/// Case-folded comparison key for a token.
fn fold(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Selected tokens for one stage (GT or KW).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    items: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token` unless it is blank or already present.
    ///
    /// # Returns
    /// `true` when the set changed.
    pub fn add(&mut self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.items.push(token.to_string());
        true
    }

    /// Remove the member equal to `token`, ignoring case.
    ///
    /// # Returns
    /// `true` when a member was removed.
    pub fn remove(&mut self, token: &str) -> bool {
        self.take(token).is_some()
    }

    /// Remove the member equal to `token` and return it with its stored casing.
    pub fn take(&mut self, token: &str) -> Option<String> {
        let key = fold(token);
        let index = self.items.iter().position(|item| fold(item) == key)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, token: &str) -> bool {
        let key = fold(token);
        self.items.iter().any(|item| fold(item) == key)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.clone()
    }

    /// Items of `full` still selectable given this set and an optional filter.
    ///
    /// See [`candidates`].
    pub fn candidates(&self, full: &[String], prefix: &str) -> Vec<String> {
        candidates(full, self, prefix)
    }
}

/// Compute the candidate pool for a stage.
///
/// Keeps the items of `full` that are not in `selected` and, when `prefix` is
/// non-blank, whose text contains it. Both checks ignore case. Output order
/// follows `full`.
pub fn candidates(full: &[String], selected: &TagSet, prefix: &str) -> Vec<String> {
    let needle = fold(prefix);
    full.iter()
        .filter(|item| !selected.contains(item))
        .filter(|item| needle.is_empty() || item.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Split pasted text on `,` or `;`, trimming pieces and dropping blanks.
pub fn split_tokens(raw: &str) -> Vec<&str> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{candidates, split_tokens, TagSet};

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn add_ignores_case_duplicates() {
        let mut tags = TagSet::new();
        assert!(tags.add("Farby"));
        assert!(!tags.add("FARBY"));
        assert!(!tags.add("  farby "));
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.as_slice(), &["Farby".to_string()]);
    }

    #[test]
    fn add_rejects_blank_and_trims() {
        let mut tags = TagSet::new();
        assert!(!tags.add(""));
        assert!(!tags.add("   "));
        assert!(tags.add("  Lakiery "));
        assert_eq!(tags.to_vec(), list(&["Lakiery"]));
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut tags = TagSet::new();
        for token in ["c", "a", "b"] {
            tags.add(token);
        }
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn remove_missing_token_is_noop() {
        let mut tags = TagSet::new();
        tags.add("a");
        tags.add("b");
        assert!(!tags.remove("zzz"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn remove_matches_case_insensitively() {
        let mut tags = TagSet::new();
        tags.add("Ściany");
        tags.add("Podłogi");
        assert_eq!(tags.take("ŚCIANY").as_deref(), Some("Ściany"));
        assert_eq!(tags.to_vec(), list(&["Podłogi"]));
        assert!(!tags.contains("ściany"));
    }

    #[test]
    fn candidates_exclude_selected_tokens_in_any_case() {
        let full = list(&["Alpha", "beta", "Gamma"]);
        let mut tags = TagSet::new();
        tags.add("BETA");
        assert_eq!(candidates(&full, &tags, ""), list(&["Alpha", "Gamma"]));
    }

    #[test]
    fn candidates_filter_by_contained_text_and_keep_source_order() {
        let full = list(&["10 Farby", "20 Lakiery", "30 Farby zewn", "40 Kleje"]);
        let tags = TagSet::new();
        let pool = tags.candidates(&full, "  FARB ");
        assert_eq!(pool, list(&["10 Farby", "30 Farby zewn"]));
        for item in &pool {
            assert!(item.to_lowercase().contains("farb"));
        }
    }

    #[test]
    fn candidates_of_empty_list_are_empty() {
        let mut tags = TagSet::new();
        tags.add("x");
        assert!(candidates(&[], &tags, "x").is_empty());
    }

    #[test]
    fn split_tokens_handles_both_separators_and_blanks() {
        assert_eq!(
            split_tokens(" a, B ;c,,d ; "),
            vec!["a", "B", "c", "d"]
        );
        assert!(split_tokens(" ,; ").is_empty());
    }
}
