//! Persistent ordered map backing [`crate::Options`].
//!
//! An AVL tree whose nodes are shared through `Arc`. `insert` copies only the
//! path from the root to the touched node, so the receiver and the result share
//! every other subtree and both stay valid.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type Link<K, V> = Option<Arc<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    height: u8,
    left: Link<K, V>,
    right: Link<K, V>,
}

pub struct PersistentMap<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> PersistentMap<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// In-order iteration over `(key, value)` pairs.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            stack: Vec::with_capacity(height(&self.root) as usize),
            remaining: self.len,
        };
        iter.push_left(&self.root);
        iter
    }
}

impl<K: Ord, V> PersistentMap<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        let mut link = &self.root;
        while let Some(node) = link {
            match key.cmp(&node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Greater => link = &node.right,
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

impl<K: Ord + Clone, V: Clone> PersistentMap<K, V> {
    /// Return a new map with `key` bound to `value`; `self` is untouched.
    pub fn insert(&self, key: K, value: V) -> Self {
        let (root, added) = insert_node(&self.root, key, value);
        Self {
            root: Some(root),
            len: if added { self.len + 1 } else { self.len },
        }
    }
}

impl<K, V> Clone for PersistentMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<K, V> Default for PersistentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

fn height<K, V>(link: &Link<K, V>) -> u8 {
    link.as_ref().map_or(0, |node| node.height)
}

fn make<K, V>(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> Arc<Node<K, V>> {
    let height = 1 + height(&left).max(height(&right));
    Arc::new(Node {
        key,
        value,
        height,
        left,
        right,
    })
}

fn insert_node<K: Ord + Clone, V: Clone>(
    link: &Link<K, V>,
    key: K,
    value: V,
) -> (Arc<Node<K, V>>, bool) {
    let Some(node) = link else {
        return (make(key, value, None, None), true);
    };
    match key.cmp(&node.key) {
        Ordering::Less => {
            let (left, added) = insert_node(&node.left, key, value);
            let balanced = balance(
                node.key.clone(),
                node.value.clone(),
                Some(left),
                node.right.clone(),
            );
            (balanced, added)
        }
        Ordering::Greater => {
            let (right, added) = insert_node(&node.right, key, value);
            let balanced = balance(
                node.key.clone(),
                node.value.clone(),
                node.left.clone(),
                Some(right),
            );
            (balanced, added)
        }
        Ordering::Equal => (
            make(key, value, node.left.clone(), node.right.clone()),
            false,
        ),
    }
}

fn balance<K: Clone, V: Clone>(
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
) -> Arc<Node<K, V>> {
    let hl = height(&left);
    let hr = height(&right);
    if hl > hr + 1 {
        if let Some(l) = &left {
            if height(&l.left) >= height(&l.right) {
                let lowered = make(key, value, l.right.clone(), right);
                return make(l.key.clone(), l.value.clone(), l.left.clone(), Some(lowered));
            }
            if let Some(lr) = &l.right {
                let new_left = make(l.key.clone(), l.value.clone(), l.left.clone(), lr.left.clone());
                let new_right = make(key, value, lr.right.clone(), right);
                return make(lr.key.clone(), lr.value.clone(), Some(new_left), Some(new_right));
            }
        }
    } else if hr > hl + 1 {
        if let Some(r) = &right {
            if height(&r.right) >= height(&r.left) {
                let lowered = make(key, value, left, r.left.clone());
                return make(r.key.clone(), r.value.clone(), Some(lowered), r.right.clone());
            }
            if let Some(rl) = &r.left {
                let new_left = make(key, value, left, rl.left.clone());
                let new_right = make(r.key.clone(), r.value.clone(), rl.right.clone(), r.right.clone());
                return make(rl.key.clone(), rl.value.clone(), Some(new_left), Some(new_right));
            }
        }
    }
    make(key, value, left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_avl<K: Ord, V>(link: &Link<K, V>) -> u8 {
        match link {
            None => 0,
            Some(node) => {
                let hl = check_avl(&node.left);
                let hr = check_avl(&node.right);
                assert!(hl.abs_diff(hr) <= 1, "unbalanced node");
                assert_eq!(node.height, 1 + hl.max(hr));
                if let Some(l) = &node.left {
                    assert!(l.key < node.key);
                }
                if let Some(r) = &node.right {
                    assert!(r.key > node.key);
                }
                node.height
            }
        }
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut map = PersistentMap::new();
        for i in 0..1000u32 {
            map = map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 1000);
        let h = check_avl(&map.root);
        assert!(h <= 15, "height {h} too large for 1000 keys");
        assert_eq!(map.get(&500), Some(&1000));
        let keys: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn descending_and_zigzag_inserts_stay_balanced() {
        let mut map = PersistentMap::new();
        for i in (0..300i32).rev() {
            map = map.insert(i, ());
        }
        for i in 0..300i32 {
            let k = if i % 2 == 0 { 1000 + i } else { -i - 1000 };
            map = map.insert(k, ());
        }
        check_avl(&map.root);
        assert_eq!(map.len(), 600);
        assert_eq!(map.iter().len(), 600);
    }

    #[test]
    fn insert_leaves_receiver_untouched() {
        let base = PersistentMap::new().insert("a", 1).insert("b", 2);
        let next = base.insert("a", 10).insert("c", 3);
        assert_eq!(base.len(), 2);
        assert_eq!(base.get(&"a"), Some(&1));
        assert!(!base.contains_key(&"c"));
        assert_eq!(next.len(), 3);
        assert_eq!(next.get(&"a"), Some(&10));
    }

    #[test]
    fn replacing_shares_untouched_subtrees() {
        let mut map = PersistentMap::new();
        for i in 0..15u8 {
            map = map.insert(i, i);
        }
        let root = map.root.as_ref().unwrap();
        let updated = map.insert(root.key, 99);
        let new_root = updated.root.as_ref().unwrap();
        assert!(Arc::ptr_eq(
            root.left.as_ref().unwrap(),
            new_root.left.as_ref().unwrap()
        ));
        assert!(Arc::ptr_eq(
            root.right.as_ref().unwrap(),
            new_root.right.as_ref().unwrap()
        ));
    }
}
