//! Character trie over configuration keys
//!
//! Prefix lookup walks the prefix one character at a time and then collects the
//! landing node's subtree, so the cost is proportional to the prefix length plus
//! the size of the matching subtree, independent of the total key count.
//!
//! Children are ordered by character, which gives every trie a stable
//! depth-first pre-order: a key always precedes keys it is a prefix of, and
//! siblings come out in ascending character order.

use std::collections::BTreeMap;

use crate::settings::KeyEntry;

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<char, Node>,
    entry: Option<KeyEntry>,
}

/// Prefix trie mapping key names to their entries
#[derive(Debug, Default)]
pub struct PropertyTrie {
    root: Node,
    len: usize,
}

impl PropertyTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any entry already stored under the same name
    pub fn insert(&mut self, entry: KeyEntry) {
        let mut current = &mut self.root;
        for c in entry.name().chars() {
            current = current.children.entry(c).or_default();
        }
        if current.entry.replace(entry).is_none() {
            self.len += 1;
        }
    }

    /// All entries whose name starts with `prefix`, in depth-first pre-order.
    ///
    /// An unmatched prefix yields an empty vector.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<KeyEntry> {
        let mut current = &self.root;
        for c in prefix.chars() {
            match current.children.get(&c) {
                Some(next) => current = next,
                None => return Vec::new(),
            }
        }

        let mut results = Vec::new();
        let mut stack = vec![current];
        while let Some(node) = stack.pop() {
            if let Some(entry) = &node.entry {
                results.push(entry.clone());
            }
            // Reversed so the smallest child is popped first
            stack.extend(node.children.values().rev());
        }
        results
    }

    /// Number of distinct key names stored
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Extend<KeyEntry> for PropertyTrie {
    fn extend<I: IntoIterator<Item = KeyEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<KeyEntry> for PropertyTrie {
    fn from_iter<I: IntoIterator<Item = KeyEntry>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}
