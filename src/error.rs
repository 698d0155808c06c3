//! Errors surfaced by the trees in this crate.

use thiserror::Error;

/// Returned by [`find`](crate::avl::Tree::find) when no node in the tree holds the requested key.
///
/// This is the only recoverable failure in the crate: insertion and removal never fail for keys
/// implementing [`Ord`], and a broken structural invariant is a bug that panics instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("key not found")]
pub struct KeyError;
