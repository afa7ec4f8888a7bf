//! A mutable, ordered n-ary tree for representing parsed syntax.
//!
//! Every node carries a name, a map of uniquely named string attributes and
//! an insertion-ordered set of membership tags, and owns an ordered sequence
//! of child nodes. All nodes of a tree live in a slab arena owned by a
//! [`Tree`] value and are addressed by copyable [`NodeId`] handles; the
//! parent reference of a node is a plain back-link, never a second owner.
//!
//! The structure is built for parsers: a builder creates nodes with
//! [`Tree::add_node`], links them with [`Tree::add_branch`] and annotates
//! them through [`Node`], while a consumer walks the finished tree with
//! [`Tree::enumerate`], [`Tree::find`] or [`Tree::count`]. The post-order
//! snapshot returned by `enumerate` stays safe to use for teardown even
//! while nodes are being destroyed.
//!
//! A [`Tree`] deliberately does not implement `Clone`: deep-copying a
//! structure with back-references and exclusive subtree ownership has never
//! been supported, and the missing impl turns accidental copies into
//! compile errors.
//!
//! # Example
//!
//! ```
//! use parsetree::Tree;
//!
//! let mut tree = Tree::new();
//! let root = tree.add_node("root");
//! let noun = tree.add_node("noun");
//! let verb = tree.add_node("verb");
//! tree.add_branch(root, noun).unwrap();
//! tree.add_branch(root, verb).unwrap();
//!
//! tree[noun].set_attribute("raw", "shore");
//! tree[noun].tag("WORD");
//!
//! assert_eq!(tree.count(root), 3);
//! assert_eq!(tree.find(root, "root/noun"), Some(noun));
//! assert_eq!(tree.enumerate(root), [noun, verb]);
//! ```

mod attr;
mod dump;
mod slab;
mod tree;

pub use attr::IntoAttribute;
pub use dump::Dump;
pub use tree::{Ancestors, AttachError, Node, Nodes, Tree};

/// Index of a node within a [`Tree`]'s arena.
///
/// Ids are plain slab slot references: they are only meaningful for the
/// tree that issued them, and the slot of a destroyed node may be reused
/// by a later insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    pub(crate) fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "node index overflow");
        NodeId(index as u32)
    }

    /// Returns the underlying slab slot index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
