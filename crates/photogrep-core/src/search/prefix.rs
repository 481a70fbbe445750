//! Character-trie prefix index over OCR words.
//!
//! Maps every word recognized in the library to the set of images whose
//! OCR text contains it, and answers "which images contain a word starting
//! with P" by unioning the id sets in the subtree below P.
//!
//! # Architecture
//!
//! Each trie edge is one `char`; image ids are stored only at the node
//! where a word ends. A prefix query walks to the node for the prefix and
//! gathers ids from the entire subtree, so `"sun"` matches images
//! containing `"sun"`, `"sunset"`, and `"sunday"` alike.
//!
//! The index is case-exact by design: callers normalize case (the engine
//! lowercases both indexed words and query terms) so normalization lives
//! in one layer and lookups stay a straight character walk.

use crate::search::types::ImageId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    /// Images whose OCR text contains the word ending at this node.
    ids: HashSet<ImageId>,
}

/// In-memory prefix index over recognized words.
///
/// Rebuilt from the OCR result cache at startup; never persisted itself.
#[derive(Debug)]
pub struct PrefixIndex {
    root: TrieNode,
    /// Number of distinct words with at least one image attached.
    word_count: usize,
}

impl PrefixIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            word_count: 0,
        }
    }

    /// Associates `word` with `id`.
    ///
    /// Insertion is idempotent: re-inserting the same pair is a no-op, so
    /// repeated words within one image and repeated indexing passes never
    /// distort the index. Empty words are ignored.
    pub fn insert(&mut self, word: &str, id: ImageId) {
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        let first_for_word = node.ids.is_empty();
        if node.ids.insert(id) && first_for_word {
            self.word_count += 1;
        }
    }

    /// Returns every image containing a word that starts with `prefix`.
    ///
    /// The prefix is trimmed before use; a prefix that is empty after
    /// trimming returns the empty set without touching the trie. A prefix
    /// with no matching words also returns the empty set. Lookups never
    /// fail and never mutate the index.
    pub fn search_prefix(&self, prefix: &str) -> HashSet<ImageId> {
        let prefix = prefix.trim();
        let mut results = HashSet::new();
        if prefix.is_empty() {
            return results;
        }

        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return results,
            }
        }

        Self::collect_subtree(node, &mut results);
        results
    }

    /// Returns the number of distinct indexed words.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Returns true if no words are indexed.
    #[allow(dead_code)] // Public API
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    fn collect_subtree(node: &TrieNode, out: &mut HashSet<ImageId>) {
        out.extend(node.ids.iter().cloned());
        for child in node.children.values() {
            Self::collect_subtree(child, out);
        }
    }
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ImageId {
        ImageId::new(s)
    }

    #[test]
    fn test_prefix_unions_subtree() {
        let mut index = PrefixIndex::new();
        index.insert("sunset", id("img-1"));
        index.insert("sunday", id("img-2"));
        index.insert("moon", id("img-3"));

        let results = index.search_prefix("sun");
        assert_eq!(results.len(), 2);
        assert!(results.contains(&id("img-1")));
        assert!(results.contains(&id("img-2")));
        assert!(!results.contains(&id("img-3")));
    }

    #[test]
    fn test_exact_word_is_its_own_prefix() {
        let mut index = PrefixIndex::new();
        index.insert("sunset", id("img-1"));

        assert_eq!(index.search_prefix("sunset").len(), 1);
        assert!(index.search_prefix("sunsets").is_empty());
    }

    #[test]
    fn test_insert_idempotent() {
        let mut index = PrefixIndex::new();
        index.insert("receipt", id("img-1"));
        index.insert("receipt", id("img-1"));
        index.insert("receipt", id("img-1"));

        assert_eq!(index.search_prefix("receipt").len(), 1);
        assert_eq!(index.word_count(), 1);
    }

    #[test]
    fn test_multiple_images_share_word() {
        let mut index = PrefixIndex::new();
        index.insert("menu", id("img-1"));
        index.insert("menu", id("img-2"));
        index.insert("menu", id("img-3"));

        assert_eq!(index.search_prefix("menu").len(), 3);
        assert_eq!(index.word_count(), 1);
    }

    #[test]
    fn test_empty_and_whitespace_prefix() {
        let mut index = PrefixIndex::new();
        index.insert("sunset", id("img-1"));

        assert!(index.search_prefix("").is_empty());
        assert!(index.search_prefix("   ").is_empty());
        assert!(index.search_prefix("\t\n").is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let mut index = PrefixIndex::new();
        index.insert("sunset", id("img-1"));

        assert_eq!(index.search_prefix("  sun  ").len(), 1);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let mut index = PrefixIndex::new();
        index.insert("sunset", id("img-1"));

        assert!(index.search_prefix("xyz").is_empty());
        assert!(index.search_prefix("sunsetx").is_empty());
    }

    #[test]
    fn test_matching_is_case_exact() {
        // Case folding happens in the engine layer; the trie itself
        // matches characters exactly.
        let mut index = PrefixIndex::new();
        index.insert("sunset", id("img-1"));

        assert!(index.search_prefix("Sun").is_empty());
        assert_eq!(index.search_prefix("sun").len(), 1);
    }

    #[test]
    fn test_unicode_words() {
        let mut index = PrefixIndex::new();
        index.insert("café", id("img-1"));
        index.insert("caffè", id("img-2"));

        let results = index.search_prefix("caf");
        assert_eq!(results.len(), 2);
        assert_eq!(index.search_prefix("café").len(), 1);
    }

    #[test]
    fn test_empty_word_ignored() {
        let mut index = PrefixIndex::new();
        index.insert("", id("img-1"));

        assert_eq!(index.word_count(), 0);
        assert!(index.search_prefix("a").is_empty());
    }

    #[test]
    fn test_word_count_tracks_distinct_words() {
        let mut index = PrefixIndex::new();
        assert_eq!(index.word_count(), 0);
        assert!(index.is_empty());

        index.insert("sunset", id("img-1"));
        index.insert("sunset", id("img-2"));
        index.insert("beach", id("img-1"));

        assert_eq!(index.word_count(), 2);
        assert!(!index.is_empty());
    }
}
