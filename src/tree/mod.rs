use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ptr::NonNull;

use log::debug;

mod balance;
mod node;

use node::{Link, Node, Side, max_node, min_node, successor};

/// A self-balancing ordered set (red-black tree).
///
/// Both capabilities the container needs from its payload are supplied at
/// construction time and monomorphized in: `cmp` is a total order that must
/// stay consistent for the tree's whole lifetime, and `dtor` is invoked
/// exactly once per stored value (receiving it by value) when the tree is
/// torn down. The tree never inspects payloads itself.
///
/// Deletion of individual elements is not supported. The container is not
/// internally synchronized; callers that share it across threads must
/// serialize access themselves.
pub struct RbTree<T, C, D = fn(T)>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    root: Link<T>,
    cmp: C,
    dtor: D,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the tree exclusively owns its node graph, so sending the tree just
// sends the payloads and the two callables along with it.
unsafe impl<T, C, D> Send for RbTree<T, C, D>
where
    T: Send,
    C: Fn(&T, &T) -> Ordering + Send,
    D: FnMut(T) + Send,
{
}

// SAFETY: the shared-reference surface (`contains`, `traverse`, `iter`) only
// hands out `&T` and never mutates the node graph.
unsafe impl<T, C, D> Sync for RbTree<T, C, D>
where
    T: Sync,
    C: Fn(&T, &T) -> Ordering + Sync,
    D: FnMut(T) + Sync,
{
}

impl<T, C, D> RbTree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    /// Creates an empty tree. Allocates nothing; nodes are allocated one by
    /// one as values are inserted.
    pub fn new(cmp: C, dtor: D) -> Self {
        Self { root: None, cmp, dtor, len: 0, _marker: PhantomData }
    }

    /// The number of stored elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `data`, rebalancing as needed. Returns `false` (and leaves
    /// the tree completely untouched) if an element comparing equal is
    /// already present; a rejected value is dropped normally, the tree's
    /// destructor only ever sees stored values.
    ///
    /// Complexity: O(log n), with at most one restructuring rotation.
    pub fn insert(&mut self, data: T) -> bool {
        // one descent does both the duplicate check and the slot search, so
        // a rejected insert happens before any allocation or mutation
        let slot = match self.root {
            None => None,
            Some(mut cur) => loop {
                // SAFETY: `cur` is a live node of this tree.
                let node = unsafe { &*cur.as_ptr() };
                let side = match (self.cmp)(&data, &node.data) {
                    Ordering::Equal => return false,
                    Ordering::Less => Side::Left,
                    Ordering::Greater => Side::Right,
                };
                match node.child(side) {
                    Some(child) => cur = child,
                    None => break Some((cur, side)),
                }
            },
        };

        let node = Node::new_red(data);
        match slot {
            None => self.root = Some(node),
            // SAFETY: `parent`'s `side` child was observed null just above.
            Some((parent, side)) => unsafe {
                (*node.as_ptr()).parent = Some(parent);
                *(*parent.as_ptr()).child_mut(side) = Some(node);
            },
        }
        // SAFETY: `node` was just linked into this tree, red.
        unsafe { self.rebalance(node) };
        self.len += 1;
        true
    }

    /// Whether an element comparing equal to `data` is stored. O(height).
    pub fn contains(&self, data: &T) -> bool {
        let mut cur = self.root;
        while let Some(ptr) = cur {
            // SAFETY: `ptr` is a live node of this tree.
            let node = unsafe { &*ptr.as_ptr() };
            cur = match (self.cmp)(data, &node.data) {
                Ordering::Equal => return true,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        false
    }

    /// Visits every element in ascending order. The callback returning
    /// `false` aborts the walk immediately and makes the whole call return
    /// `false`; reaching the end returns `true`. An empty tree returns
    /// `true` without invoking the callback.
    pub fn traverse(&self, mut f: impl FnMut(&T) -> bool) -> bool {
        for data in self.iter() {
            if !f(data) {
                return false;
            }
        }
        true
    }

    /// An ascending iterator over the stored elements.
    ///
    /// The walk uses the parent back-references (successor chasing) instead
    /// of an auxiliary stack, so the iterator itself is two words.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            // SAFETY: the root, if any, is a live node of this tree.
            next: self.root.map(|root| unsafe { min_node(root) }),
            remaining: self.len,
            _marker: PhantomData,
        }
    }

    /// The minimum element, or `None` on an empty tree.
    pub fn first(&self) -> Option<&T> {
        // SAFETY: the root is a live node; the returned reference borrows `self`.
        self.root.map(|root| unsafe { &(*min_node(root).as_ptr()).data })
    }

    /// The maximum element, or `None` on an empty tree.
    pub fn last(&self) -> Option<&T> {
        // SAFETY: as in `first`.
        self.root.map(|root| unsafe { &(*max_node(root).as_ptr()).data })
    }

    /// Tears the tree down to empty: every payload is handed to the
    /// destructor exactly once and every node is freed. No-op when already
    /// empty. The tree stays usable afterwards.
    pub fn clear(&mut self) {
        let root = match self.root.take() {
            Some(root) => root,
            None => return,
        };
        debug!("tearing down {} nodes", self.len);
        // SAFETY: `root` was detached above, so this subtree is unreachable
        // from anywhere else and owned uniquely by us.
        unsafe { self.drop_subtree(root) };
        self.len = 0;
    }

    /// Postorder teardown: right subtree, then left subtree, then this
    /// node's payload goes to the destructor, then the node itself is freed.
    /// Recursion depth is the tree height, which the invariants bound by
    /// 2*log₂(n+1).
    ///
    /// SAFETY: `node` must be uniquely owned and no longer reachable from
    /// the tree.
    unsafe fn drop_subtree(&mut self, node: NonNull<Node<T>>) {
        // SAFETY: every node was allocated via `Box` in `Node::new_red`.
        let Node { data, left, right, .. } = *unsafe { Box::from_raw(node.as_ptr()) };
        if let Some(right) = right {
            // SAFETY: children of a uniquely owned node are uniquely owned.
            unsafe { self.drop_subtree(right) };
        }
        if let Some(left) = left {
            // SAFETY: as above.
            unsafe { self.drop_subtree(left) };
        }
        (self.dtor)(data);
    }
}

impl<T, C, D> Drop for RbTree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    fn drop(&mut self) {
        self.clear();
    }
}

/// Ascending in-order iterator over an [`RbTree`], returned by
/// [`RbTree::iter`].
pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.next?;
        // SAFETY: the borrow on the tree keeps every node alive for 'a, and
        // nobody can mutate the structure while we hold it.
        unsafe {
            self.next = successor(node);
            self.remaining -= 1;
            Some(&(*node.as_ptr()).data)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> std::iter::FusedIterator for Iter<'_, T> {}
