//! Byte trie mapping property names to member positions.
//!
//! Text formats hand the raw UTF-8 bytes of an unquoted property name to
//! [`AutomataDictionary::get`]; the walk costs one sorted-edge lookup per
//! byte and never allocates. A miss means the member is unknown and its value
//! should be skipped.

/// One trie node: an optional terminal value and its outgoing edges.
#[derive(Debug, Clone, Default)]
struct Node {
    value: Option<usize>,
    /// `(byte, child index)`, sorted by byte.
    edges: Vec<(u8, u32)>,
}

impl Node {
    fn child(&self, byte: u8) -> Option<u32> {
        // Most nodes have one or two edges; a linear scan beats bisecting.
        if self.edges.len() <= 4 {
            return self
                .edges
                .iter()
                .find(|&&(b, _)| b == byte)
                .map(|&(_, child)| child);
        }
        self.edges
            .binary_search_by_key(&byte, |&(b, _)| b)
            .ok()
            .map(|i| self.edges[i].1)
    }
}

/// A byte-sequence trie from names to small integers.
///
/// Built once when a formatter is constructed and only read afterwards.
#[derive(Debug, Clone)]
pub struct AutomataDictionary {
    nodes: Vec<Node>,
    len: usize,
}

impl AutomataDictionary {
    /// An empty dictionary.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            len: 0,
        }
    }

    /// Map `name` to `value`, returning the previous value for that name.
    pub fn insert(&mut self, name: &str, value: usize) -> Option<usize> {
        let mut node = 0usize;
        for &byte in name.as_bytes() {
            node = match self.nodes[node].child(byte) {
                Some(child) => child as usize,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    let edges = &mut self.nodes[node].edges;
                    let at = edges.partition_point(|&(b, _)| b < byte);
                    edges.insert(at, (byte, child as u32));
                    child
                }
            };
        }
        let previous = self.nodes[node].value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// The value for the exact byte sequence `name`.
    #[inline]
    pub fn get(&self, name: &[u8]) -> Option<usize> {
        let mut node = &self.nodes[0];
        for &byte in name {
            node = &self.nodes[node.child(byte)? as usize];
        }
        node.value
    }

    /// Number of names stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no name is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for AutomataDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FromIterator<(&'a str, usize)> for AutomataDictionary {
    fn from_iter<I: IntoIterator<Item = (&'a str, usize)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        for (name, value) in iter {
            dictionary.insert(name, value);
        }
        dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinpack_testhelpers::test;

    #[test]
    fn key_value_lookup() {
        let dictionary: AutomataDictionary = [("Key", 0), ("Value", 1)].into_iter().collect();
        assert_eq!(dictionary.get(b"Key"), Some(0));
        assert_eq!(dictionary.get(b"Value"), Some(1));
        assert_eq!(dictionary.get(b"Unknown"), None);
        assert_eq!(dictionary.len(), 2);
    }

    #[test]
    fn prefixes_and_extensions_do_not_match() {
        let dictionary: AutomataDictionary = [("item", 0), ("items", 1)].into_iter().collect();
        assert_eq!(dictionary.get(b"ite"), None);
        assert_eq!(dictionary.get(b"item"), Some(0));
        assert_eq!(dictionary.get(b"items"), Some(1));
        assert_eq!(dictionary.get(b"itemsx"), None);
        assert_eq!(dictionary.get(b""), None);
    }

    #[test]
    fn wide_fanout_uses_sorted_edges() {
        let names: Vec<String> = (b'a'..=b'z').map(|b| format!("f{}", b as char)).collect();
        let dictionary: AutomataDictionary = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(dictionary.get(name.as_bytes()), Some(i));
        }
        assert_eq!(dictionary.get(b"f{"), None);
    }

    #[test]
    fn reinsert_replaces_value() {
        let mut dictionary = AutomataDictionary::new();
        assert_eq!(dictionary.insert("naïve", 3), None);
        assert_eq!(dictionary.insert("naïve", 4), Some(3));
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get("naïve".as_bytes()), Some(4));
        assert!(!dictionary.is_empty());
    }
}
