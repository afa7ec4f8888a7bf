use std::collections::BTreeMap;
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use thiserror::Error;
use tracing::instrument;

use crate::attr::IntoAttribute;
use crate::slab::{self, Slab};
use crate::NodeId;

/// A node of a [`Tree`].
///
/// Nodes carry a name that is fixed at creation time, together with named
/// string attributes and a list of tags. The links to the parent and the
/// children are managed by the tree and can not be changed through the node
/// alone.
#[derive(Debug)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    tags: Vec<String>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    /// Returns the node's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the node's parent or `None` if it is a root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the node's children in attachment order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Sets a named attribute, replacing any previous value.
    ///
    /// Attribute values are stored as strings. Numeric values are converted
    /// on the way in, see [`IntoAttribute`].
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let word = tree.add_node("word");
    ///
    /// tree[word].set_attribute("raw", "import");
    /// tree[word].set_attribute("priority", 2.5);
    ///
    /// assert_eq!(tree[word].attribute("raw"), "import");
    /// assert_eq!(tree[word].attribute("priority"), "2.5");
    /// assert_eq!(tree[word].attribute("missing"), "");
    /// ```
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl IntoAttribute) {
        self.attributes.insert(name.into(), value.into_attribute());
    }

    /// Returns the value of a named attribute.
    ///
    /// Returns the empty string when the attribute is not set. The node is
    /// not modified by the lookup.
    pub fn attribute(&self, name: &str) -> &str {
        self.attributes.get(name).map_or("", String::as_str)
    }

    /// Check whether the node has an attribute with a given name.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Removes a named attribute, returning its former value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Iterates over the node's attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Adds a tag to the node.
    ///
    /// Adding a tag the node already carries has no effect.
    pub fn tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();

        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Check whether the node carries a given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Returns the node's tags in the order they were added.
    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A mutable ordered tree of named nodes.
///
/// Nodes are created detached and assembled into a tree with
/// [`Tree::add_branch`]. Every node is addressed by the [`NodeId`] returned
/// at creation, which stays valid until the node is removed. Detaching a
/// node keeps it and its subtree in the tree as a root, so partially built
/// or dismantled trees are always in a usable state.
///
/// The tree is deliberately not cloneable.
#[derive(Debug)]
pub struct Tree {
    nodes: Slab<Node>,
}

impl Tree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { nodes: Slab::new() }
    }

    /// Creates an empty tree with preallocated space for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
        }
    }

    /// Returns the total number of nodes in the tree, attached or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether the tree has a node with a given id.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// Returns a reference to a node, or `None` if the id is not in use.
    #[inline]
    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    /// Returns a mutable reference to a node, or `None` if the id is not in
    /// use.
    #[inline]
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node)
    }

    /// Creates a new detached node with a name.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let node = tree.add_node("root");
    /// assert!(tree.contains(node));
    /// ```
    #[instrument(level = "trace", skip(self, name))]
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(Node::new(name.into()))
    }

    /// Attaches a detached node as the last child of a parent node.
    ///
    /// Returns the child's id again, so that construction code can pass the
    /// result along.
    ///
    /// # Errors
    ///
    ///  - When the parent or the child is not in the tree.
    ///  - When the child is already attached to a parent.
    ///  - When the attachment would introduce a cycle.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let word = tree.add_node("word");
    ///
    /// tree.add_branch(root, word).unwrap();
    ///
    /// assert_eq!(tree[word].parent(), Some(root));
    /// assert_eq!(tree[root].children(), &[word]);
    /// ```
    #[instrument(level = "trace", skip(self))]
    pub fn add_branch(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, AttachError> {
        if !self.nodes.contains(parent) {
            return Err(AttachError::UnknownNode);
        }

        let Some(child_data) = self.nodes.get(child) else {
            return Err(AttachError::UnknownNode);
        };

        if child_data.parent.is_some() {
            return Err(AttachError::AlreadyAttached);
        } else if !self.cycle_check(child, parent) {
            return Err(AttachError::Cycle);
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);

        Ok(child)
    }

    /// Detaches a child from a parent node, returning the child's id.
    ///
    /// The child and its subtree stay in the tree as a detached root. Does
    /// nothing and returns `None` when `child` is not currently a child of
    /// `parent`.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_branch(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        if self.nodes.get(child)?.parent != Some(parent) {
            return None;
        }

        let children = &mut self.nodes[parent].children;
        let slot = children.iter().position(|&candidate| candidate == child)?;
        children.remove(slot);

        self.nodes[child].parent = None;

        Some(child)
    }

    /// Replaces a child of a parent node with a detached node, keeping the
    /// child's position among its siblings.
    ///
    /// The replaced child and its subtree stay in the tree as a detached
    /// root. Does nothing and returns `Ok(None)` when `old` is not currently
    /// a child of `parent`, or when `old` and `new` are the same node.
    ///
    /// # Errors
    ///
    ///  - When the replacement node is not in the tree.
    ///  - When the replacement node is already attached to a parent.
    ///  - When the replacement would introduce a cycle.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let draft = tree.add_node("draft");
    /// let fixed = tree.add_node("fixed");
    ///
    /// tree.add_branch(root, draft).unwrap();
    /// tree.replace_branch(root, draft, fixed).unwrap();
    ///
    /// assert_eq!(tree[root].children(), &[fixed]);
    /// assert_eq!(tree[draft].parent(), None);
    /// ```
    #[instrument(level = "trace", skip(self))]
    pub fn replace_branch(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<Option<NodeId>, AttachError> {
        let Some(parent_data) = self.nodes.get(parent) else {
            return Ok(None);
        };

        let Some(slot) = parent_data.children.iter().position(|&c| c == old) else {
            return Ok(None);
        };

        if old == new {
            return Ok(None);
        }

        let Some(new_data) = self.nodes.get(new) else {
            return Err(AttachError::UnknownNode);
        };

        if new_data.parent.is_some() {
            return Err(AttachError::AlreadyAttached);
        } else if !self.cycle_check(new, parent) {
            return Err(AttachError::Cycle);
        }

        self.nodes[parent].children[slot] = new;
        self.nodes[old].parent = None;
        self.nodes[new].parent = Some(parent);

        Ok(Some(old))
    }

    /// Removes a node and all of its descendants from the tree.
    ///
    /// The node is detached from its parent first, so the rest of the tree
    /// stays intact. Returns the number of removed nodes, which is zero when
    /// the node is not in the tree.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let noun = tree.add_node("noun");
    /// let word = tree.add_node("word");
    ///
    /// tree.add_branch(root, noun).unwrap();
    /// tree.add_branch(noun, word).unwrap();
    ///
    /// assert_eq!(tree.remove_subtree(noun), 2);
    /// assert_eq!(tree.remove_subtree(noun), 0);
    /// assert!(tree[root].children().is_empty());
    /// ```
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, node: NodeId) -> usize {
        let Some(data) = self.nodes.get(node) else {
            return 0;
        };
        let parent = data.parent;

        if let Some(parent) = parent {
            let children = &mut self.nodes[parent].children;

            if let Some(slot) = children.iter().position(|&candidate| candidate == node) {
                children.remove(slot);
            }
        }

        let mut removed = 0;
        let mut stack = vec![node];

        while let Some(next) = stack.pop() {
            let Some(data) = self.nodes.remove(next) else {
                continue;
            };

            stack.extend(data.children);
            removed += 1;
        }

        removed
    }

    /// Removes all nodes from the tree.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Collects the ids of all descendants of a node, ordered so that every
    /// node appears after all of its descendants. The node itself is not
    /// included.
    ///
    /// The returned ids are a snapshot, not a live view. Removing listed
    /// nodes while walking the snapshot is safe: a removal only takes out
    /// nodes that were already visited, never ones still ahead in the list.
    /// Inserting nodes during the walk is not, since a new node may reuse
    /// the slot of a removed one.
    ///
    /// Returns an empty collection when the node is not in the tree.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let noun = tree.add_node("noun");
    /// let word = tree.add_node("word");
    /// let verb = tree.add_node("verb");
    ///
    /// tree.add_branch(root, noun).unwrap();
    /// tree.add_branch(noun, word).unwrap();
    /// tree.add_branch(root, verb).unwrap();
    ///
    /// assert_eq!(tree.enumerate(root), [word, noun, verb]);
    /// ```
    #[instrument(level = "debug", skip(self))]
    pub fn enumerate(&self, node: NodeId) -> Vec<NodeId> {
        let Some(data) = self.nodes.get(node) else {
            return Vec::new();
        };

        let mut order = Vec::new();
        let mut stack: Vec<(NodeId, bool)> = Vec::with_capacity(data.children.len());
        stack.extend(data.children.iter().rev().map(|&child| (child, false)));

        while let Some((current, visited)) = stack.pop() {
            if visited {
                order.push(current);
                continue;
            }

            stack.push((current, true));
            let children = &self.nodes[current].children;
            stack.extend(children.iter().rev().map(|&child| (child, false)));
        }

        order
    }

    /// Returns the number of nodes in the subtree rooted at a node, the node
    /// itself included.
    ///
    /// Returns zero when the node is not in the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn count(&self, node: NodeId) -> usize {
        if !self.nodes.contains(node) {
            return 0;
        }

        let mut total = 0;
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            total += 1;
            stack.extend(self.nodes[current].children.iter().copied());
        }

        total
    }

    /// Resolves a `/` separated path of node names, starting at a node.
    ///
    /// The first path segment must match the name of the starting node
    /// itself. Every further segment selects the first child with a matching
    /// name, in attachment order. Returns `None` when any segment does not
    /// match.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let noun = tree.add_node("noun");
    /// tree.add_branch(root, noun).unwrap();
    ///
    /// assert_eq!(tree.find(root, "root/noun"), Some(noun));
    /// assert_eq!(tree.find(root, "root/verb"), None);
    /// ```
    #[instrument(level = "debug", skip(self))]
    pub fn find(&self, node: NodeId, path: &str) -> Option<NodeId> {
        let data = self.nodes.get(node)?;
        let mut segments = path.split('/');

        if segments.next() != Some(data.name()) {
            return None;
        }

        let mut cursor = node;

        for segment in segments {
            let children = &self.nodes[cursor].children;
            cursor = children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].name == segment)?;
        }

        Some(cursor)
    }

    /// Iterates over the ancestors of a node, starting with its parent.
    ///
    /// The iterator is empty when the node is a root or not in the tree.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.nodes.get(node).and_then(|data| data.parent),
        }
    }

    /// Iterates over all nodes in the tree together with their ids.
    ///
    /// Detached subtrees are included. Nodes are yielded in increasing id
    /// order, which is unrelated to the tree structure.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes(self.nodes.iter())
    }

    /// Compacts the node storage so that the ids of the stored nodes form a
    /// contiguous range, preserving the tree structure.
    ///
    /// Returns a map with an entry for every node whose id changed, from the
    /// previous id to the new one. Ids held outside the tree have to be
    /// translated through the map.
    ///
    /// This method does not release the spare capacity of the storage, since
    /// it might be needed again for new insertions; call
    /// [`Tree::shrink_to_fit`] afterwards to do that.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// # use std::collections::BTreeMap;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let noun = tree.add_node("noun");
    /// let verb = tree.add_node("verb");
    ///
    /// tree.add_branch(root, noun).unwrap();
    /// tree.add_branch(root, verb).unwrap();
    ///
    /// tree.remove_subtree(noun);
    /// let moved = tree.compact();
    ///
    /// assert_eq!(moved, BTreeMap::from_iter([(verb, noun)]));
    /// assert_eq!(tree[root].children(), &[noun]);
    /// ```
    #[instrument(level = "debug", skip(self))]
    pub fn compact(&mut self) -> BTreeMap<NodeId, NodeId> {
        let mut moved = BTreeMap::new();

        self.nodes.compact(|_, old, new| {
            if old != new {
                moved.insert(old, new);
            }
        });

        for (_, data) in self.nodes.iter_mut() {
            if let Some(parent) = &mut data.parent {
                if let Some(&new) = moved.get(parent) {
                    *parent = new;
                }
            }

            for child in &mut data.children {
                if let Some(&new) = moved.get(child) {
                    *child = new;
                }
            }
        }

        moved
    }

    /// Shrinks the tree's storage to fit the stored nodes.
    ///
    /// Use [`Tree::compact`] first to close the gaps left behind by node
    /// removals.
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Ensures that making `child` a child of `parent` would not introduce a
    /// cycle.
    fn cycle_check(&self, child: NodeId, mut parent: NodeId) -> bool {
        loop {
            if parent == child {
                return false;
            } else if let Some(next) = self.nodes[parent].parent {
                parent = next;
            } else {
                return true;
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, node: NodeId) -> &Self::Output {
        self.node(node).expect("invalid node id")
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, node: NodeId) -> &mut Self::Output {
        self.node_mut(node).expect("invalid node id")
    }
}

/// Iterator created by [`Tree::ancestors`].
#[derive(Clone)]
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.nodes[current].parent;
        Some(current)
    }
}

impl<'a> FusedIterator for Ancestors<'a> {}

/// Iterator created by [`Tree::nodes`].
#[derive(Clone)]
pub struct Nodes<'a>(slab::Iter<'a, Node>);

impl<'a> Iterator for Nodes<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> ExactSizeIterator for Nodes<'a> {}
impl<'a> FusedIterator for Nodes<'a> {}

/// Error returned by [`Tree::add_branch`] and similar methods.
#[derive(Debug, Clone, Error)]
pub enum AttachError {
    #[error("unknown node")]
    UnknownNode,
    #[error("the node is already attached")]
    AlreadyAttached,
    #[error("attaching the node would introduce a cycle")]
    Cycle,
}
