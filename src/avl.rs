//! A self-balancing BST (specifically, an AVL tree).
//!
//! Every node stores a balance factor: the height of its right subtree minus the height of its
//! left subtree. Between public calls every balance factor is `-1`, `0` or `1`. Instead of
//! recomputing heights, each insert and remove adjusts the balance factors on the path back up
//! to the root and rotates where a factor reaches `±2`.
//!
//! # Examples
//!
//! ```
//! use avlbst::avl::Tree;
//! use avlbst::KeyError;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), Err(KeyError));
//!
//! tree.insert(1, 2);
//! assert_eq!(tree.find(&1), Ok(&2));
//!
//! // Inserting a new value for the same key overwrites the value.
//! tree.insert(1, 3);
//! assert_eq!(tree.find(&1), Ok(&3));
//!
//! // Removing a node returns its value.
//! assert_eq!(tree.remove(&1), Some(3));
//! assert_eq!(tree.find(&1), Err(KeyError));
//!
//! // Ascending inserts would make a plain BST a linked list 1000 nodes high.
//! for key in 0..1000 {
//!     tree.insert(key, key);
//! }
//! assert!(tree.height() < 15);
//! ```

use std::fmt;
use std::ops::Index;

use crate::bst::{NodeId, RawTree, Side};
use crate::iter::{Iter, Keys, Values};
use crate::KeyError;

/// A self-balancing Binary Search Tree (specifically, an AVL tree). This can be used for
/// inserting, finding, and deleting keys and values, each in `O(lg N)`.
#[derive(Clone)]
pub struct Tree<K, V> {
    raw: RawTree<K, V>,
}

impl<K, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Tree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> PartialEq for Tree<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for Tree<K, V>
where
    K: Eq,
    V: Eq,
{
}

/// The outcome of a rotation at an overweight node.
struct Rotated {
    /// The node now at the top of the rotated subtree.
    top: NodeId,
    /// Whether the rotated subtree is one level shorter than the overweight one was.
    shrunk: bool,
}

impl<K, V> Tree<K, V> {
    /// Generate a new, empty `Tree`.
    pub const fn new() -> Self {
        Self {
            raw: RawTree::new(),
        }
    }

    /// The number of entries in the tree.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Finds the value associated with the given key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if no node holds `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlbst::avl::Tree;
    /// use avlbst::KeyError;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.find(&1), Ok(&2));
    /// assert_eq!(tree.find(&42), Err(KeyError));
    /// ```
    pub fn find(&self, key: &K) -> Result<&V, KeyError>
    where
        K: Ord,
    {
        self.raw.get(key).ok_or(KeyError)
    }

    /// Potentially finds the value associated with the given key in this tree. If no node has the
    /// corresponding key, `None` is returned.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        self.raw.get(key)
    }

    /// A mutable reference to the value stored at `key`, if any.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V>
    where
        K: Ord,
    {
        self.raw.get_mut(key)
    }

    /// Whether some node holds `key`.
    pub fn contains_key(&self, key: &K) -> bool
    where
        K: Ord,
    {
        self.raw.find(key).is_some()
    }

    /// The entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|id| {
            let node = self.raw.node(id);
            (&node.key, &node.value)
        })
    }

    /// The entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|id| {
            let node = self.raw.node(id);
            (&node.key, &node.value)
        })
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has height
    /// `0`. This is computed by walking the whole tree.
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Whether, for every node, the heights of its two subtrees differ by at most one. Always
    /// `true` for this tree; the check walks the whole tree and does not trust the stored balance
    /// factors.
    pub fn is_balanced(&self) -> bool {
        self.raw.is_balanced()
    }

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Iterates over the values in ascending order of their keys.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Inserts the given value into the tree stored at the given key. Inserting a new value for an
    /// existing key overwites its value without changing the shape of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlbst::avl::Tree;
    ///
    /// let mut tree = Tree::new();
    ///
    /// tree.insert(1, 2);
    /// assert_eq!(tree.get(&1), Some(&2));
    ///
    /// tree.insert(1, 3);
    /// assert_eq!(tree.get(&1), Some(&3));
    /// ```
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        let Err((hang, key, value)) = self.raw.upsert(key, value) else {
            return;
        };
        self.raw.attach(hang, key, value);

        if let Some((parent, side)) = hang {
            if self.tilt(parent, side.tilt()) != 0 {
                self.insert_fix(parent);
            }
        }
    }

    /// Deletes the node containing the given key from the tree and returns its value. If the tree
    /// does not contain a node with the key, nothing happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlbst::avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.remove(&1), Some(2));
    /// assert_eq!(tree.remove(&1), None);
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
    {
        let id = self.raw.find(key)?;
        let (removed, hang) = self.raw.remove(id);

        // The spliced out node's side of its parent lost a level.
        if let Some((parent, side)) = hang {
            self.remove_fix(parent, -side.tilt());
        }
        Some(removed.value)
    }

    /// Adds `diff` to the balance factor of `id` and returns the new balance factor.
    fn tilt(&mut self, id: NodeId, diff: i8) -> i8 {
        let node = self.raw.node_mut(id);
        node.balance += diff;
        node.balance
    }

    /// Walks up from `node`, whose balance factor just went from `0` to `±1` because its subtree
    /// grew taller, until the growth is absorbed by an ancestor or fixed by a rotation.
    fn insert_fix(&mut self, mut node: NodeId) {
        while let Some((parent, side)) = self.raw.hang_of(node) {
            match self.tilt(parent, side.tilt()) {
                0 => return,
                -1 | 1 => node = parent,
                _ => {
                    // A rotation after an insert always restores the subtree's old height.
                    let rotated = self.rotate_overweight(parent);
                    debug_assert!(rotated.shrunk);
                    return;
                }
            }
        }
    }

    /// Walks up from `node`, applying `diff` to its balance factor because one of its subtrees
    /// got shorter, until the change in height stops propagating or the root is reached.
    fn remove_fix(&mut self, mut node: NodeId, mut diff: i8) {
        loop {
            let top = match self.tilt(node, diff) {
                -1 | 1 => return,
                0 => node,
                _ => match self.rotate_overweight(node) {
                    Rotated { top, shrunk: true } => top,
                    Rotated { shrunk: false, .. } => return,
                },
            };

            let Some((parent, side)) = self.raw.hang_of(top) else {
                return;
            };
            node = parent;
            diff = -side.tilt();
        }
    }

    /// Rotates at `pivot`, whose balance factor is `±2`, and sets the balance factors of the
    /// nodes that moved.
    ///
    /// With `child` the root of the taller subtree and `s` the sign of `pivot`'s balance factor:
    ///
    /// - `child` leaning the same way as `pivot`, or not at all: single rotation raising `child`.
    ///   If `child` was level the subtree keeps its height and the pair ends at `s`/`-s`,
    ///   otherwise both end at `0`.
    /// - `child` leaning the other way: double rotation raising `child`'s inner child `middle`.
    ///   `middle` ends at `0`; `pivot` ends at `-s` if `middle` leaned like `pivot`, `child` ends
    ///   at `s` if `middle` leaned like `child`.
    fn rotate_overweight(&mut self, pivot: NodeId) -> Rotated {
        let heavy = if self.raw.node(pivot).balance < 0 {
            Side::Left
        } else {
            Side::Right
        };
        let s = heavy.tilt();
        let child = self
            .raw
            .node(pivot)
            .child(heavy)
            .expect("Overweight node => child on the heavy side");
        let child_balance = self.raw.node(child).balance;

        let rotated = if child_balance != -s {
            self.raise(pivot, heavy);
            let (pivot_balance, child_balance, shrunk) = if child_balance == 0 {
                (s, -s, false)
            } else {
                (0, 0, true)
            };
            self.raw.node_mut(pivot).balance = pivot_balance;
            self.raw.node_mut(child).balance = child_balance;
            tracing::trace!(pivot, child, shrunk, "single rotation");

            Rotated { top: child, shrunk }
        } else {
            let middle = self
                .raw
                .node(child)
                .child(heavy.opposite())
                .expect("Child leaning inwards => inner grandchild");
            let middle_balance = self.raw.node(middle).balance;

            self.raise(child, heavy.opposite());
            self.raise(pivot, heavy);

            let (pivot_balance, child_balance) = match middle_balance {
                b if b == s => (-s, 0),
                b if b == -s => (0, s),
                _ => (0, 0),
            };
            self.raw.node_mut(pivot).balance = pivot_balance;
            self.raw.node_mut(child).balance = child_balance;
            self.raw.node_mut(middle).balance = 0;
            tracing::trace!(pivot, child, middle, "double rotation");

            Rotated {
                top: middle,
                shrunk: true,
            }
        };

        if cfg!(debug_assertions) {
            for id in [pivot, child, rotated.top] {
                assert!((-1..=1).contains(&self.raw.node(id).balance));
            }
        }
        rotated
    }

    /// Raises the child of `x` on `side` into `x`'s position.
    fn raise(&mut self, x: NodeId, side: Side) {
        match side {
            Side::Left => self.rotate_right(x),
            Side::Right => self.rotate_left(x),
        }
    }

    /// Rotate `x` to the left. This moves the right child up vertically and `x` down vertically.
    /// Balance factors are left for the caller to fix.
    ///
    /// ## Panics
    ///
    /// When called on a node without a right child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///   Option<parent>            Option<parent>
    ///     /                          /
    ///    x                          y
    ///   / \                        / \
    ///  a   y        rotate ->     x   c
    ///     / \                    / \
    ///  beta  c                  a  beta
    /// ```
    fn rotate_left(&mut self, x: NodeId) {
        let y = self.raw.node(x).right.expect("Rotate left => right child");
        let beta = self.raw.node(y).left;

        self.raw.replace(x, Some(y));
        self.raw.set_child(x, Side::Right, beta);
        self.raw.set_child(y, Side::Left, Some(x));
    }

    /// Rotate `x` to the right. The mirror image of [`Self::rotate_left`].
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    fn rotate_right(&mut self, x: NodeId) {
        let y = self.raw.node(x).left.expect("Rotate right => left child");
        let beta = self.raw.node(y).right;

        self.raw.replace(x, Some(y));
        self.raw.set_child(x, Side::Left, beta);
        self.raw.set_child(y, Side::Right, Some(x));
    }
}

impl<K, V> Index<&K> for Tree<K, V>
where
    K: Ord,
{
    type Output = V;

    /// Returns a reference to the value stored at `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a Tree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Extend<(K, V)> for Tree<K, V>
where
    K: Ord,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Tree<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
impl<K, V> Tree<K, V>
where
    K: Ord + fmt::Debug,
{
    /// Checks every invariant from scratch: links agree in both directions, keys are ordered,
    /// and every stored balance factor is in `-1..=1` and matches the real subtree heights.
    fn assert_valid(&self) {
        let raw = &self.raw;
        let heights = raw.subtree_heights();
        let height = |id: Option<NodeId>| id.map_or(0, |id| heights[id]);

        if let Some(root) = raw.root() {
            assert_eq!(raw.node(root).parent, None);
        }

        let mut count = 0;
        let mut stack: Vec<NodeId> = raw.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            count += 1;
            let node = raw.node(id);
            for side in [Side::Left, Side::Right] {
                if let Some(child) = node.child(side) {
                    assert_eq!(raw.node(child).parent, Some(id));
                    stack.push(child);
                }
            }

            let real = height(node.right) as isize - height(node.left) as isize;
            assert_eq!(node.balance as isize, real, "balance of {:?}", node.key);
            assert!(
                (-1..=1).contains(&node.balance),
                "{:?} is overweight",
                node.key
            );
        }
        assert_eq!(count, self.len());

        let keys: Vec<_> = self.keys().collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// `(key, balance, parent key)` for every node, in ascending key order.
    fn shape(&self) -> Vec<(&K, i8, Option<&K>)> {
        let raw = &self.raw;
        let mut shape = Vec::new();
        let mut cursor = raw.first();
        while let Some(id) = cursor {
            let node = raw.node(id);
            shape.push((
                &node.key,
                node.balance,
                node.parent.map(|parent| &raw.node(parent).key),
            ));
            cursor = raw.successor(id);
        }
        shape
    }

    fn root_key(&self) -> Option<&K> {
        self.raw.root().map(|root| &self.raw.node(root).key)
    }
}
