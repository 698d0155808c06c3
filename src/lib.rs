//! This crate exposes an ordered map backed by a self-balancing Binary Search Tree (an AVL tree),
//! along with the plain BST it is built on.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key and a value
//! and will sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for a key takes `O(height)` (where `height` is defined as the longest path from the
//! root `Node` to a leaf `Node`). A plain BST ([`bst::Tree`]) gets no guarantee on its height:
//! inserting keys in ascending order turns it into a linked list.
//!
//! ## AVL tree
//!
//! [`avl::Tree`] additionally keeps, for every `Node`, the height of its right subtree minus the
//! height of its left subtree within `-1..=1`. Inserts and removes restore this after each change
//! with rotations, so the height stays below `1.45 * lg(N + 2)`.
//!
//! ```
//! use avlbst::avl::Tree;
//!
//! let mut tree = Tree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key, key.to_string());
//! }
//!
//! // 20 was rotated up to the root.
//! assert_eq!(tree.height(), 2);
//! assert_eq!(tree.find(&20).map(String::as_str), Ok("20"));
//! assert!(tree.find(&40).is_err());
//!
//! let keys: Vec<_> = tree.keys().copied().collect();
//! assert_eq!(keys, [10, 20, 30]);
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize` and `Deserialize` for [`avl::Tree`], as a map.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod bst;
pub mod equal_paths;
mod error;
pub mod iter;
#[cfg(feature = "serde")]
mod serde_impls;

pub use error::KeyError;
