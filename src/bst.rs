//! A plain, unbalanced BST and the node arena every tree in this crate is built on.
//!
//! Nodes live in a slot table owned by the tree and refer to each other by index. `left` and
//! `right` are the downward links, `parent` is only used to walk back up (for fix-ups and
//! iteration). A node's slot is freed exactly when the node is unlinked from its parent.
//!
//! The [`Tree`] in this module never rebalances, so inserting ascending keys degrades it into a
//! linked list. See [`crate::avl::Tree`] for the self-balancing version.
//!
//! # Examples
//!
//! ```
//! use avlbst::bst::Tree;
//!
//! let mut tree = Tree::new();
//! for key in 0..10 {
//!     tree.insert(key, key * 2);
//! }
//!
//! // Every insert went right.
//! assert_eq!(tree.height(), 10);
//! assert!(!tree.is_balanced());
//!
//! assert_eq!(tree.remove(&3), Some(6));
//! assert_eq!(tree.get(&3), None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;

use crate::iter::Iter;
use crate::KeyError;

/// Index of a node's slot in [`RawTree`].
pub(crate) type NodeId = usize;

/// Which child link of a node we're talking about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The change in a parent's balance factor when the subtree on this side grows by one level.
    pub(crate) fn tilt(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,

    /// Height of the right subtree minus height of the left subtree. Only the AVL tree keeps this
    /// up to date; it stays `0` in the plain tree.
    pub(crate) balance: i8,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            balance: 0,
        }
    }

    pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Where a node hangs: its parent and the side of the parent, or `None` for the root position.
pub(crate) type Hang = Option<(NodeId, Side)>;

/// Where a descent for a key ended up.
pub(crate) enum Search {
    /// A node already holds the key.
    Found(NodeId),
    /// The key belongs under this parent on this side, or at the root if the tree is empty.
    Vacant(Hang),
}

/// The structural machinery shared by the plain and the AVL tree: descent, attaching and
/// splicing nodes, neighbour lookup and the content swap used by two-child deletion. None of it
/// rebalances.
#[derive(Clone)]
pub(crate) struct RawTree<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V> RawTree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id]
            .as_ref()
            .expect("Link points at a freed slot")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id]
            .as_mut()
            .expect("Link points at a freed slot")
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        self.len += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id].take().expect("Released slot twice");
        self.free.push(id);
        self.len -= 1;
        node
    }

    pub(crate) fn search(&self, key: &K) -> Search
    where
        K: Ord,
    {
        let mut hang = None;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = self.node(id);
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Equal => return Search::Found(id),
                Ordering::Greater => Side::Right,
            };
            hang = Some((id, side));
            cursor = node.child(side);
        }
        Search::Vacant(hang)
    }

    pub(crate) fn find(&self, key: &K) -> Option<NodeId>
    where
        K: Ord,
    {
        match self.search(key) {
            Search::Found(id) => Some(id),
            Search::Vacant(_) => None,
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V>
    where
        K: Ord,
    {
        self.find(key).map(|id| &self.node(id).value)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V>
    where
        K: Ord,
    {
        let id = self.find(key)?;
        Some(&mut self.node_mut(id).value)
    }

    /// Overwrites the value of an existing key, or returns the vacant position where the key
    /// belongs along with the key and value to put there.
    pub(crate) fn upsert(&mut self, key: K, value: V) -> Result<(), (Hang, K, V)>
    where
        K: Ord,
    {
        match self.search(&key) {
            Search::Found(id) => {
                self.node_mut(id).value = value;
                Ok(())
            }
            Search::Vacant(hang) => Err((hang, key, value)),
        }
    }

    /// Places a new node with balance `0` in a vacant position returned by [`Self::search`].
    pub(crate) fn attach(&mut self, hang: Hang, key: K, value: V) -> NodeId {
        let id = self.alloc(Node::new(key, value, hang.map(|(parent, _)| parent)));
        match hang {
            Some((parent, side)) => *self.node_mut(parent).child_mut(side) = Some(id),
            None => self.root = Some(id),
        }
        id
    }

    /// The parent of `id` and the side of the parent `id` hangs from. `None` for the root.
    pub(crate) fn hang_of(&self, id: NodeId) -> Hang {
        let parent = self.node(id).parent?;
        let side = if self.node(parent).left == Some(id) {
            Side::Left
        } else {
            Side::Right
        };
        Some((parent, side))
    }

    /// Puts `new` in the position `old` occupies, under `old`'s parent or as the root. `old`'s own
    /// links are left untouched.
    pub(crate) fn replace(&mut self, old: NodeId, new: Option<NodeId>) {
        let hang = self.hang_of(old);
        if let Some(new) = new {
            self.node_mut(new).parent = hang.map(|(parent, _)| parent);
        }
        match hang {
            Some((parent, side)) => *self.node_mut(parent).child_mut(side) = new,
            None => self.root = new,
        }
    }

    /// Links `child` below `id` on `side`, fixing the child's parent link too.
    pub(crate) fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) {
        *self.node_mut(id).child_mut(side) = child;
        if let Some(child) = child {
            self.node_mut(child).parent = Some(id);
        }
    }

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.node(id).right {
            id = right;
        }
        id
    }

    pub(crate) fn first(&self) -> Option<NodeId> {
        self.root().map(|root| self.leftmost(root))
    }

    pub(crate) fn last(&self) -> Option<NodeId> {
        self.root().map(|root| self.rightmost(root))
    }

    /// The node holding the smallest key greater than `id`'s key.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.leftmost(right));
        }
        let mut child = id;
        while let Some((parent, side)) = self.hang_of(child) {
            if side == Side::Left {
                return Some(parent);
            }
            child = parent;
        }
        None
    }

    /// The node holding the largest key smaller than `id`'s key.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.node(id).left {
            return Some(self.rightmost(left));
        }
        let mut child = id;
        while let Some((parent, side)) = self.hang_of(child) {
            if side == Side::Right {
                return Some(parent);
            }
            child = parent;
        }
        None
    }

    /// Exchanges the keys and values stored at `a` and `b`. Links and balance factors describe
    /// positions in the tree, not entries, so they stay where they are. This is also why `a` and
    /// `b` being parent and child needs no special handling.
    pub(crate) fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].as_mut().expect("Link points at a freed slot");
        let second = tail[0].as_mut().expect("Link points at a freed slot");
        mem::swap(&mut first.key, &mut second.key);
        mem::swap(&mut first.value, &mut second.value);
    }

    /// Unlinks the entry stored at `id` and frees one slot.
    ///
    /// If `id` has two children its entry is first swapped with its in-order predecessor, which
    /// has no right child, and the predecessor's slot is the one spliced out. Returns the removed
    /// node (its links are stale) and where the spliced slot used to hang, which is where any
    /// rebalancing has to start.
    pub(crate) fn remove(&mut self, id: NodeId) -> (Node<K, V>, Hang) {
        let doomed = match (self.node(id).left, self.node(id).right) {
            (Some(left), Some(_)) => {
                let predecessor = self.rightmost(left);
                tracing::trace!(node = id, predecessor, "swapping entry with predecessor");
                self.swap_entries(id, predecessor);
                predecessor
            }
            _ => id,
        };

        let node = self.node(doomed);
        debug_assert!(node.left.is_none() || node.right.is_none());
        let child = node.left.or(node.right);
        let hang = self.hang_of(doomed);
        self.replace(doomed, child);

        (self.release(doomed), hang)
    }

    /// Heights of every subtree, indexed by the id of its root. Computed from scratch without
    /// recursion so it also works on degenerate trees.
    pub(crate) fn subtree_heights(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = self.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = self.node(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }

        // Children come after their parents in `order`.
        let mut heights = vec![0; self.slots.len()];
        for &id in order.iter().rev() {
            let node = self.node(id);
            let left = node.left.map_or(0, |left| heights[left]);
            let right = node.right.map_or(0, |right| heights[right]);
            heights[id] = left.max(right) + 1;
        }
        heights
    }

    pub(crate) fn height(&self) -> usize {
        self.root().map_or(0, |root| self.subtree_heights()[root])
    }

    pub(crate) fn is_balanced(&self) -> bool {
        let heights = self.subtree_heights();
        self.slots.iter().flatten().all(|node| {
            let left = node.left.map_or(0, |left| heights[left]);
            let right = node.right.map_or(0, |right| heights[right]);
            left.abs_diff(right) <= 1
        })
    }
}

/// An unbalanced Binary Search Tree. Keys are kept in sorted order and are unique; the shape of
/// the tree depends entirely on the order of insertions.
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

    /// Inserts the given value into the tree stored at the given key. Inserting a new value for an
    /// existing key overwrites its value and leaves the shape of the tree alone.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        if let Err((hang, key, value)) = self.raw.upsert(key, value) {
            self.raw.attach(hang, key, value);
        }
    }

    /// Deletes the node containing the given key from the tree and returns its value. If the tree
    /// does not contain a node with the key, nothing happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use avlbst::bst::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2, "two");
    /// tree.insert(1, "one");
    /// tree.insert(3, "three");
    ///
    /// // Two children: the entry is swapped with its predecessor first.
    /// assert_eq!(tree.remove(&2), Some("two"));
    /// assert_eq!(tree.remove(&2), None);
    /// assert_eq!(tree.iter().collect::<Vec<_>>(), [(&1, &"one"), (&3, &"three")]);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V>
    where
        K: Ord,
    {
        let id = self.raw.find(key)?;
        let (removed, _) = self.raw.remove(id);
        Some(removed.value)
    }

    /// Finds the value associated with the given key, or [`KeyError`] if no node has it.
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

    /// Whether some node holds `key`.
    pub fn contains_key(&self, key: &K) -> bool
    where
        K: Ord,
    {
        self.raw.find(key).is_some()
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has height
    /// `0`.
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Whether, for every node, the heights of its two subtrees differ by at most one.
    pub fn is_balanced(&self) -> bool {
        self.raw.is_balanced()
    }

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }
}

impl<'a, K, V> IntoIterator for &'a Tree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Tree<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        for (key, value) in iter {
            tree.insert(key, value);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns `(key, parent key)` for every node, in ascending key order.
    fn parents(tree: &Tree<i32, i32>) -> Vec<(i32, Option<i32>)> {
        let raw = &tree.raw;
        let mut cursor = raw.first();
        let mut out = Vec::new();
        while let Some(id) = cursor {
            let node = raw.node(id);
            out.push((node.key, node.parent.map(|parent| raw.node(parent).key)));
            cursor = raw.successor(id);
        }
        out
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut tree = Tree::new();
        tree.insert(1, 2);
        tree.insert(1, 3);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.find(&1), Ok(&3));
    }

    #[test]
    fn find_missing_key_is_an_error() {
        let mut tree = Tree::new();
        assert_eq!(tree.find(&1), Err(KeyError));

        tree.insert(1, 1);
        assert_eq!(tree.find(&2), Err(KeyError));
    }

    #[test]
    fn ascending_inserts_degenerate() {
        let tree: Tree<_, _> = (0..100).map(|x| (x, x)).collect();

        assert_eq!(tree.height(), 100);
        assert!(!tree.is_balanced());
        assert!(tree.iter().map(|(k, _)| *k).eq(0..100));
    }

    #[test]
    fn delete_with_no_children() {
        let mut tree: Tree<_, _> = [(5, 5), (3, 3), (7, 7)].into_iter().collect();

        assert_eq!(tree.remove(&7), Some(7));
        assert_eq!(parents(&tree), [(3, Some(5)), (5, None)]);
    }

    #[test]
    fn delete_with_one_child_fixes_parent_link() {
        let mut tree: Tree<_, _> = [(5, 5), (3, 3), (7, 7), (9, 9)].into_iter().collect();

        assert_eq!(tree.remove(&7), Some(7));
        assert_eq!(parents(&tree), [(3, Some(5)), (5, None), (9, Some(5))]);
    }

    #[test]
    fn delete_root_with_one_child() {
        let mut tree: Tree<_, _> = [(5, 5), (7, 7)].into_iter().collect();

        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(parents(&tree), [(7, None)]);
    }

    #[test]
    fn delete_with_two_children_uses_predecessor() {
        let mut tree: Tree<_, _> = [(5, 5), (3, 3), (8, 8), (2, 2), (4, 4), (9, 9)]
            .into_iter()
            .collect();

        assert_eq!(tree.remove(&5), Some(5));
        // 4 took over the root's position.
        assert_eq!(
            parents(&tree),
            [
                (2, Some(3)),
                (3, Some(4)),
                (4, None),
                (8, Some(4)),
                (9, Some(8))
            ]
        );
    }

    #[test]
    fn delete_with_adjacent_predecessor() {
        // The predecessor of 5 is its own left child.
        let mut tree: Tree<_, _> = [(5, 5), (3, 3), (8, 8), (1, 1)].into_iter().collect();

        assert_eq!(tree.remove(&5), Some(5));
        assert_eq!(parents(&tree), [(1, Some(3)), (3, None), (8, Some(3))]);
    }

    #[test]
    fn swap_entries_between_parent_and_child() {
        let mut tree: Tree<_, _> = [(2, 20), (1, 10)].into_iter().collect();
        let root = tree.raw.root().unwrap();
        let child = tree.raw.node(root).left.unwrap();

        tree.raw.swap_entries(root, child);

        let root_node = tree.raw.node(root);
        assert_eq!((root_node.key, root_node.value), (1, 10));
        assert_eq!(root_node.left, Some(child));
        assert_eq!(tree.raw.node(child).parent, Some(root));
        assert_eq!(
            (tree.raw.node(child).key, tree.raw.node(child).value),
            (2, 20)
        );
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut tree = Tree::new();
        for x in 0..10 {
            tree.insert(x, x);
        }
        for x in 0..5 {
            tree.remove(&x);
        }
        for x in 10..15 {
            tree.insert(x, x);
        }

        assert_eq!(tree.len(), 10);
        assert_eq!(tree.raw.slots.len(), 10);
    }

    #[test]
    fn neighbours() {
        let tree: Tree<_, _> = [4, 2, 6, 1, 3, 5, 7].into_iter().map(|x| (x, x)).collect();
        let raw = &tree.raw;
        let key = |id: Option<NodeId>| id.map(|id| raw.node(id).key);

        let four = raw.root().unwrap();
        assert_eq!(key(raw.successor(four)), Some(5));
        assert_eq!(key(raw.predecessor(four)), Some(3));

        let three = raw.find(&3).unwrap();
        assert_eq!(key(raw.successor(three)), Some(4));
        assert_eq!(key(raw.first()), Some(1));
        assert_eq!(key(raw.last()), Some(7));
        assert_eq!(key(raw.predecessor(raw.first().unwrap())), None);
    }
}
