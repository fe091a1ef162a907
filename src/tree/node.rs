use std::ptr::NonNull;

// PROVE: any node with height `h` has black height at least `h/2`
// PROVE: the subtree located at any node `x` contains at least `2^bh(x) - 1` nodes (use induction)
// LEMMA: a red-black tree with `n` internal nodes has height at most `2*log₂(n+1)`

pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A single tree element.
///
/// `left` and `right` are the owning links (every node is backed by a `Box`
/// allocation that the tree structurally owns through its root), while
/// `parent` is a plain non-owning back-reference that rotations keep in sync.
pub(crate) struct Node<T> {
    pub(crate) color: Color,
    pub(crate) data: T,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
    pub(crate) parent: Link<T>,
}

impl<T> Node<T> {
    /// Allocates a fresh leaf. Every node starts out red with null links;
    /// the rebalancer recolors it afterwards if that breaks anything.
    pub(crate) fn new_red(data: T) -> NonNull<Node<T>> {
        NonNull::from(Box::leak(Box::new(Node {
            color: Color::Red,
            data,
            left: None,
            right: None,
            parent: None,
        })))
    }

    pub(crate) fn child(&self, side: Side) -> Link<T> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link<T> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// The color of a link, with null links counting as black.
///
/// SAFETY: `link`, if non-null, must point to a live node.
pub(crate) unsafe fn color_of<T>(link: Link<T>) -> Color {
    link.map_or(Color::Black, |node| unsafe { (*node.as_ptr()).color })
}

/// Which side of `parent` the child `node` hangs off of.
///
/// SAFETY: both pointers must be live nodes, and `node` must actually be a
/// child of `parent`.
pub(crate) unsafe fn side_of<T>(node: NonNull<Node<T>>, parent: NonNull<Node<T>>) -> Side {
    if unsafe { (*parent.as_ptr()).left } == Some(node) {
        Side::Left
    } else {
        Side::Right
    }
}

/// The sibling of `node`'s parent, or `None` if there is no grandparent or
/// the grandparent has no other child.
///
/// SAFETY: `node` must be a live node of a well-formed tree.
pub(crate) unsafe fn uncle_of<T>(node: NonNull<Node<T>>) -> Link<T> {
    unsafe {
        let parent = (*node.as_ptr()).parent?;
        let grandparent = (*parent.as_ptr()).parent?;
        (*grandparent.as_ptr()).child(side_of(parent, grandparent).opposite())
    }
}

/// The leftmost node of the subtree rooted at `node`.
///
/// SAFETY: `node` must be a live node of a well-formed tree.
pub(crate) unsafe fn min_node<T>(mut node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    unsafe {
        while let Some(left) = (*node.as_ptr()).left {
            node = left;
        }
    }
    node
}

/// The rightmost node of the subtree rooted at `node`.
///
/// SAFETY: `node` must be a live node of a well-formed tree.
pub(crate) unsafe fn max_node<T>(mut node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    unsafe {
        while let Some(right) = (*node.as_ptr()).right {
            node = right;
        }
    }
    node
}

/// The next node in ascending order, or `None` if `node` is the maximum.
///
/// The walk needs no auxiliary stack: either the successor is the minimum of
/// the right subtree, or it is the first ancestor we reach from a left child.
///
/// SAFETY: `node` must be a live node of a well-formed tree.
pub(crate) unsafe fn successor<T>(node: NonNull<Node<T>>) -> Link<T> {
    unsafe {
        if let Some(right) = (*node.as_ptr()).right {
            return Some(min_node(right));
        }
        let mut child = node;
        let mut parent = (*node.as_ptr()).parent;
        while let Some(p) = parent {
            if (*p.as_ptr()).left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = (*p.as_ptr()).parent;
        }
        None
    }
}
