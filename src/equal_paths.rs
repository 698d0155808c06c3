//! A plain binary tree with no ordering or balancing, and a check that all of its leaves sit at
//! the same depth.
//!
//! # Examples
//!
//! ```
//! use avlbst::equal_paths::{equal_paths, Tree};
//!
//! //     1
//! //    / \
//! //   2   3
//! //        \
//! //         4
//! let tree = Tree::node(1, Tree::leaf(2), Tree::node(3, Tree::Empty, Tree::leaf(4)));
//! assert!(!equal_paths(&tree));
//!
//! let tree = Tree::node(1, Tree::leaf(2), Tree::leaf(3));
//! assert!(equal_paths(&tree));
//!
//! assert!(equal_paths(&Tree::<()>::Empty));
//! ```

/// A binary tree holding a `T` in every node. Children are owned through `Box`es.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Tree<T> {
    /// A marker for the empty pointer at the bottom of a subtree.
    #[default]
    Empty,
    /// A `Node` with a value and two children (which are both `Tree`s).
    Node(Node<T>),
}

/// A value with a left and a right subtree, either of which may be [`Tree::Empty`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node<T> {
    /// The value stored at this node.
    pub value: T,
    /// The left subtree.
    pub left: Box<Tree<T>>,
    /// The right subtree.
    pub right: Box<Tree<T>>,
}

impl<T> Tree<T> {
    /// A node with the given children.
    pub fn node(value: T, left: Tree<T>, right: Tree<T>) -> Self {
        Self::Node(Node {
            value,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// A node with no children.
    pub fn leaf(value: T) -> Self {
        Self::node(value, Self::Empty, Self::Empty)
    }

    /// Whether every leaf of this tree is at the same depth. See [`equal_paths`].
    pub fn has_equal_paths(&self) -> bool {
        equal_paths(self)
    }
}

/// Whether every leaf (a node with no children) occurs at the same depth from the root. An empty
/// tree trivially satisfies this.
///
/// A node with only one child is not a leaf, so the missing side doesn't count as a path.
pub fn equal_paths<T>(tree: &Tree<T>) -> bool {
    leaf_depth(tree).is_some()
}

/// The depth shared by every leaf below `tree` (`0` for an empty tree, `1` for a single leaf), or
/// `None` if two leaves disagree.
fn leaf_depth<T>(tree: &Tree<T>) -> Option<usize> {
    let Tree::Node(node) = tree else {
        return Some(0);
    };
    let left = leaf_depth(&node.left)?;
    let right = leaf_depth(&node.right)?;

    match (left, right) {
        (0, depth) | (depth, 0) => Some(depth + 1),
        (left, right) if left == right => Some(left + 1),
        _ => None,
    }
}
