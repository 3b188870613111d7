//! Word-frequency search index.
//!
//! Each page's OCR text is tokenized and counted on its own, then the page
//! tables are summed into one publication-level table.

use std::collections::HashMap;

/// Characters a normalized token may contain.
const ALLOWED_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789.,@$";

/// Token counts kept in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCount {
    entries: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl WordCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `word`.
    pub fn add(&mut self, word: &str, count: u64) {
        match self.positions.get(word) {
            Some(&pos) => self.entries[pos].1 += count,
            None => {
                self.positions.insert(word.to_string(), self.entries.len());
                self.entries.push((word.to_string(), count));
            }
        }
    }

    /// Sum another table into this one. New words are appended in the
    /// other table's order.
    pub fn merge(&mut self, other: &WordCount) {
        for (word, count) in other.iter() {
            self.add(word, count);
        }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.positions.get(word).map(|&pos| self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted tokens.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

/// Lowercase `raw` and drop every character outside the allowed set.
pub fn normalize_token(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| ALLOWED_CHARS.contains(*c))
        .collect()
}

/// Count the normalized tokens of one page.
pub fn count_page(text: &str) -> WordCount {
    let mut counts = WordCount::new();
    for raw in text.split_whitespace() {
        let token = normalize_token(raw);
        if !token.is_empty() {
            counts.add(&token, 1);
        }
    }
    counts
}

/// Build the publication-level table from every page's text, in page order.
pub fn aggregate<I, S>(pages: I) -> WordCount
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut total = WordCount::new();
    for page in pages {
        total.merge(&count_page(page.as_ref()));
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_map(counts: &WordCount) -> HashMap<String, u64> {
        counts.iter().map(|(w, c)| (w.to_string(), c)).collect()
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("Hello!"), "hello");
        assert_eq!(normalize_token("$4.99,"), "$4.99,");
        assert_eq!(normalize_token("user@Example.COM"), "user@example.com");
        assert_eq!(normalize_token("—"), "");
        assert_eq!(normalize_token("naïve"), "nave");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["Hello!", "$4.99,", "Ünïcödé", "(ISBN-13)", "a@b.c"] {
            let once = normalize_token(raw);
            assert_eq!(normalize_token(&once), once);
        }
    }

    #[test]
    fn test_count_page_drops_empty_tokens() {
        let counts = count_page("The the -- THE end\n\t***");
        assert_eq!(counts.get("the"), Some(3));
        assert_eq!(counts.get("end"), Some(1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_aggregate_sums_pages() {
        let counts = aggregate(["apple", "apple", "banana"]);
        assert_eq!(counts.get("apple"), Some(2));
        assert_eq!(counts.get("banana"), Some(1));
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_order_is_first_occurrence() {
        let counts = aggregate(["zebra apple", "mango zebra", "apple kiwi"]);
        let words: Vec<&str> = counts.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["zebra", "apple", "mango", "kiwi"]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let pages = ["one two two", "three one", "two four four four", ""];
        let forward = aggregate(pages);
        let reversed = aggregate(pages.iter().rev());

        let mut grouped = aggregate(&pages[..2]);
        grouped.merge(&aggregate(&pages[2..]));

        assert_eq!(as_map(&forward), as_map(&reversed));
        assert_eq!(as_map(&forward), as_map(&grouped));
    }
}
