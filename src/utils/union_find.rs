//! Generic disjoint-set structure with path compression

use std::collections::HashMap;
use std::hash::Hash;

/// Union-find over an arbitrary hashable key type.
///
/// `unite` keeps the smaller root (by the key's natural order) as the
/// surviving representative. Callers that mix sentinel keys with ordinary
/// keys rely on this: a sentinel that compares less than every real key is
/// guaranteed to end up as the root of any class it joins.
#[derive(Debug, Default)]
pub struct UnionFind<K> {
    parent: HashMap<K, K>,
}

impl<K: Eq + Hash + Ord + Clone> UnionFind<K> {
    pub fn new() -> Self {
        Self {
            parent: HashMap::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            parent: HashMap::with_capacity(n),
        }
    }

    /// Ensure the element exists as a singleton class.
    pub fn make_set(&mut self, k: K) {
        self.parent.entry(k.clone()).or_insert(k);
    }

    /// Find the representative of k's class, with full path compression.
    /// Unknown keys are inserted as singletons.
    pub fn find(&mut self, k: K) -> K {
        if !self.parent.contains_key(&k) {
            self.parent.insert(k.clone(), k.clone());
            return k;
        }
        // Walk to the root, then compress the visited chain.
        let mut root = k.clone();
        loop {
            let parent = self.parent[&root].clone();
            if parent == root {
                break;
            }
            root = parent;
        }
        let mut cur = k;
        while cur != root {
            let next = self.parent[&cur].clone();
            self.parent.insert(cur, root.clone());
            cur = next;
        }
        root
    }

    /// Merge the classes of a and b. The smaller root survives.
    pub fn unite(&mut self, a: K, b: K) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            if ra < rb {
                self.parent.insert(rb, ra);
            } else {
                self.parent.insert(ra, rb);
            }
        }
    }

    pub fn same(&mut self, a: K, b: K) -> bool {
        self.find(a) == self.find(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut uf: UnionFind<i32> = UnionFind::new();
        uf.make_set(1);
        uf.make_set(2);
        assert_eq!(uf.find(1), 1);
        assert_eq!(uf.find(2), 2);
        assert!(!uf.same(1, 2));
    }

    #[test]
    fn test_unite_smaller_root_wins() {
        let mut uf: UnionFind<i32> = UnionFind::new();
        uf.unite(5, 3);
        assert_eq!(uf.find(5), 3);
        uf.unite(7, 5);
        assert_eq!(uf.find(7), 3);
        // A class containing a yet-smaller key pulls the root down
        uf.unite(1, 7);
        assert_eq!(uf.find(5), 1);
        assert_eq!(uf.find(3), 1);
    }

    #[test]
    fn test_find_inserts_unknown_keys() {
        let mut uf: UnionFind<u32> = UnionFind::new();
        assert_eq!(uf.find(42), 42);
        uf.unite(42, 10);
        assert!(uf.same(10, 42));
    }

    #[test]
    fn test_transitive_union() {
        let mut uf: UnionFind<&str> = UnionFind::new();
        uf.unite("b", "c");
        uf.unite("c", "d");
        uf.unite("a", "d");
        assert_eq!(uf.find("b"), "a");
        assert_eq!(uf.find("c"), "a");
        assert_eq!(uf.find("d"), "a");
        assert!(uf.same("b", "d"));
    }

    #[test]
    fn test_sentinel_becomes_root() {
        // Tuple keys: (0, _) sentinels order below all (1, _) real keys
        let mut uf: UnionFind<(u8, i32)> = UnionFind::new();
        let sentinel = (0u8, 0i32);
        uf.make_set(sentinel);
        uf.unite((1, 100), (1, 50));
        uf.unite((1, 50), sentinel);
        assert_eq!(uf.find((1, 100)), sentinel);
    }
}
