use avlbst::bst::Tree;

use std::collections::BTreeMap;

use crate::Op;

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
    let mut tree = Tree::new();
    let mut map = BTreeMap::new();

    for op in &ops {
        match *op {
            Op::Insert(k, v) => {
                tree.insert(k, v);
                map.insert(k, v);
            }
            Op::Remove(k) => {
                if tree.remove(&k) != map.remove(&k) {
                    return false;
                }
            }
        }
    }

    tree.len() == map.len() && tree.iter().eq(map.iter())
}

#[quickcheck]
fn same_entries_as_avl_tree(xs: Vec<(i8, i8)>, deletes: Vec<i8>) -> bool {
    let mut plain: Tree<_, _> = xs.iter().copied().collect();
    let mut balanced: avlbst::avl::Tree<_, _> = xs.iter().copied().collect();
    for delete in &deletes {
        if plain.remove(delete) != balanced.remove(delete) {
            return false;
        }
    }

    plain.iter().eq(balanced.iter())
}
