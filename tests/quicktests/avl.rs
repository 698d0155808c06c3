use avlbst::avl::Tree;
use avlbst::KeyError;

use std::collections::{BTreeMap, HashSet};

use crate::{init_tracing, Op};

/// Applies a set of operations to a tree and a `BTreeMap`.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same entries in both, in the same order.
fn do_ops<K, V>(ops: &[Op<K, V>], tree: &mut Tree<K, V>, map: &mut BTreeMap<K, V>) -> bool
where
    K: Clone + Ord,
    V: Clone + PartialEq,
{
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                tree.insert(k.clone(), v.clone());
                map.insert(k.clone(), v.clone());
            }
            Op::Remove(k) => {
                if tree.remove(k) != map.remove(k) {
                    return false;
                }
            }
        }
        if !tree.is_balanced() {
            return false;
        }
    }

    tree.len() == map.len() && tree.iter().eq(map.iter())
}

/// The worst case height of an AVL tree with `len` nodes.
fn height_bound(len: usize) -> f64 {
    1.45 * ((len + 2) as f64).log2()
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
    init_tracing();
    let mut tree = Tree::new();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut tree, &mut map)
}

#[quickcheck]
fn fuzz_multiple_operations_i16(ops: Vec<Op<i16, u8>>) -> bool {
    let mut tree = Tree::new();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut tree, &mut map)
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: Tree<_, _> = xs.iter().map(|x| (*x, *x)).collect();

    xs.iter().all(|x| tree.find(x) == Ok(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<_, _> = xs.iter().map(|x| (*x, *x)).collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.find(x) == Err(KeyError))
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<_, _> = xs.iter().map(|x| (*x, *x)).collect();
    for delete in &deletes {
        tree.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| tree.get(x).is_none())
        && still_present.iter().all(|x| tree.get(x).is_some())
}

#[quickcheck]
fn height_stays_logarithmic(xs: Vec<u16>) -> bool {
    let mut tree = Tree::new();
    xs.into_iter().all(|x| {
        tree.insert(x, ());
        tree.height() as f64 <= height_bound(tree.len())
    })
}

#[quickcheck]
fn iteration_is_strictly_ascending(ops: Vec<Op<i8, ()>>) -> bool {
    let mut tree = Tree::new();
    for op in ops {
        match op {
            Op::Insert(k, v) => tree.insert(k, v),
            Op::Remove(k) => {
                tree.remove(&k);
            }
        }
    }

    let keys: Vec<_> = tree.keys().collect();
    keys.windows(2).all(|pair| pair[0] < pair[1]) && keys.len() == tree.len()
}

#[quickcheck]
fn insert_then_remove_everything(xs: Vec<i16>) -> bool {
    let mut tree: Tree<_, _> = xs.iter().map(|x| (*x, *x)).collect();

    // Remove in insertion order, which is unrelated to the tree's shape.
    for x in &xs {
        tree.remove(x);
        if !tree.is_balanced() {
            return false;
        }
    }
    tree.is_empty() && tree.iter().next().is_none()
}

#[test]
fn ascending_inserts_stay_balanced() {
    init_tracing();
    let mut tree = Tree::new();
    for x in 0..(1 << 12) {
        tree.insert(x, x);
    }

    // 4095 nodes fit in 12 levels; 4096 need at least 13.
    assert!(tree.height() >= 13);
    assert!(tree.height() as f64 <= height_bound(tree.len()));
    assert!(tree.is_balanced());
}
