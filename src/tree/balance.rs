use std::cmp::Ordering;
use std::ptr::NonNull;

use log::trace;

use super::RbTree;
use super::node::{Color, Link, Node, Side, color_of, side_of, uncle_of};

/// The ways a freshly inserted (or freshly promoted) red node can break the
/// red-black invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corruption {
    /// The node has no parent: it must become the (black) root.
    RootDeclaration,
    /// Black parent: a red child under a black parent breaks nothing.
    NoViolation,
    /// Red parent, red uncle: recolor and push the red up to the grandparent.
    RedParentRedUncle,
    /// Red parent, black (or absent) uncle: one restructuring rotation fixes
    /// the subtree locally.
    RedParentBlackUncle,
}

/// Classifies the violation introduced by `node`, which must currently be
/// red. A null uncle counts as black.
///
/// SAFETY: `node` must be a live node and `uncle` must be its uncle link
/// (as computed by [`uncle_of`]).
unsafe fn classify<T>(node: NonNull<Node<T>>, uncle: Link<T>) -> Corruption {
    unsafe {
        match (*node.as_ptr()).parent {
            None => Corruption::RootDeclaration,
            Some(parent) if (*parent.as_ptr()).color == Color::Black => Corruption::NoViolation,
            Some(_) => match color_of(uncle) {
                Color::Red => Corruption::RedParentRedUncle,
                Color::Black => Corruption::RedParentBlackUncle,
            },
        }
    }
}

impl<T, C, D> RbTree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    /// Restores the red-black invariants after `node` was linked in red.
    ///
    /// Only the red-uncle case propagates; it is a loop walking toward the
    /// root rather than a recursion, so adversarial insertion orders cannot
    /// blow the stack. The rotation case is terminal because it restores the
    /// black height of the rotated subtree locally.
    ///
    /// SAFETY: `node` must be a live red node of this tree.
    pub(super) unsafe fn rebalance(&mut self, mut node: NonNull<Node<T>>) {
        loop {
            // SAFETY: `node` stays a live node of this tree across iterations.
            let uncle = unsafe { uncle_of(node) };
            match unsafe { classify(node, uncle) } {
                Corruption::NoViolation => return,
                Corruption::RootDeclaration => {
                    unsafe { (*node.as_ptr()).color = Color::Black };
                    return;
                }
                Corruption::RedParentRedUncle => {
                    // SAFETY: a red parent is never the root, so the
                    // grandparent exists, and a red uncle is a real node.
                    unsafe {
                        let parent = (*node.as_ptr()).parent.unwrap_unchecked();
                        let grandparent = (*parent.as_ptr()).parent.unwrap_unchecked();
                        (*parent.as_ptr()).color = Color::Black;
                        (*uncle.unwrap_unchecked().as_ptr()).color = Color::Black;
                        (*grandparent.as_ptr()).color = Color::Red;
                        trace!("red uncle: recolored, pushing the red up");
                        node = grandparent;
                    }
                }
                Corruption::RedParentBlackUncle => {
                    // SAFETY: same as above for parent and grandparent.
                    unsafe { self.restructure(node) };
                    return;
                }
            }
        }
    }

    /// One restructuring step around `node`'s grandparent, covering all four
    /// shapes: an inner grandchild (zig-zag) takes a double rotation that
    /// lifts `node` itself to the top of the subtree, an outer grandchild
    /// (straight line) takes a single rotation that lifts the parent. Either
    /// way the new subtree root turns black and the displaced grandparent
    /// turns red, which keeps the black height of the subtree unchanged.
    ///
    /// SAFETY: `node` must be red with a red parent and a black (or absent)
    /// uncle, so the grandparent exists and is black.
    unsafe fn restructure(&mut self, node: NonNull<Node<T>>) {
        unsafe {
            let parent = (*node.as_ptr()).parent.unwrap_unchecked();
            let grandparent = (*parent.as_ptr()).parent.unwrap_unchecked();
            let node_side = side_of(node, parent);
            let parent_side = side_of(parent, grandparent);

            let top = if node_side == parent_side {
                trace!("black uncle: single rotation ({node_side:?}-{parent_side:?})");
                self.rotate(grandparent, parent_side.opposite())
            } else {
                trace!("black uncle: double rotation ({parent_side:?}-{node_side:?})");
                self.rotate(parent, parent_side);
                self.rotate(grandparent, parent_side.opposite())
            };
            (*top.as_ptr()).color = Color::Black;
            (*grandparent.as_ptr()).color = Color::Red;
        }
    }

    /// Rotates the subtree rooted at `root` toward `dir`, lifting the child
    /// on the opposite side into `root`'s place, and returns the new subtree
    /// root. Rewires every affected parent back-reference, including
    /// `self.root` when `root` was the whole tree. O(1).
    ///
    /// SAFETY: `root` must be a live node of this tree whose child opposite
    /// `dir` is non-null.
    unsafe fn rotate(&mut self, root: NonNull<Node<T>>, dir: Side) -> NonNull<Node<T>> {
        unsafe {
            let parent = (*root.as_ptr()).parent;
            // SAFETY: guaranteed non-null by the caller.
            let pivot = (*root.as_ptr()).child(dir.opposite()).unwrap_unchecked();
            let middle = (*pivot.as_ptr()).child(dir);

            // the pivot's displaced child moves under the old subtree root
            *(*root.as_ptr()).child_mut(dir.opposite()) = middle;
            if let Some(middle) = middle {
                (*middle.as_ptr()).parent = Some(root);
            }

            // the old root becomes the pivot's `dir` child
            *(*pivot.as_ptr()).child_mut(dir) = Some(root);
            (*root.as_ptr()).parent = Some(pivot);

            // hook the pivot into the external tree
            (*pivot.as_ptr()).parent = parent;
            match parent {
                Some(parent) => *(*parent.as_ptr()).child_mut(side_of(root, parent)) = Some(pivot),
                None => self.root = Some(pivot),
            }
            pivot
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::RbTree;

    fn tree_of(values: &[i32]) -> RbTree<i32, impl Fn(&i32, &i32) -> std::cmp::Ordering, fn(i32)> {
        let mut tree = RbTree::new(|a: &i32, b: &i32| a.cmp(b), drop as fn(i32));
        for &v in values {
            assert!(tree.insert(v));
        }
        tree
    }

    fn in_order(tree: &RbTree<i32, impl Fn(&i32, &i32) -> std::cmp::Ordering, fn(i32)>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    // one insertion order per rotation shape; each triggers exactly one
    // restructuring and must end up with the middle value on top
    #[test]
    fn left_left_shape() {
        let tree = tree_of(&[30, 20, 10]);
        assert_eq!(in_order(&tree), [10, 20, 30]);
        assert_eq!(tree.first(), Some(&10));
    }

    #[test]
    fn right_right_shape() {
        let tree = tree_of(&[10, 20, 30]);
        assert_eq!(in_order(&tree), [10, 20, 30]);
        assert_eq!(tree.last(), Some(&30));
    }

    #[test]
    fn left_right_shape() {
        let tree = tree_of(&[30, 10, 20]);
        assert_eq!(in_order(&tree), [10, 20, 30]);
    }

    #[test]
    fn right_left_shape() {
        let tree = tree_of(&[10, 30, 20]);
        assert_eq!(in_order(&tree), [10, 20, 30]);
    }
}
