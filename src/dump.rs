use std::fmt::{self, Display, Formatter};

use crate::tree::Tree;
use crate::NodeId;

/// Renders a subtree as indented text for debugging.
///
/// Created by [`Tree::dump`]. Each node is printed on its own line with two
/// spaces of indentation per level, followed by its attributes as
/// `name='value'` pairs and its tags.
///
/// The output is a diagnostic aid, not a stable format.
pub struct Dump<'a> {
    tree: &'a Tree,
    root: NodeId,
}

impl Tree {
    /// Renders the subtree rooted at a node as indented text for debugging.
    ///
    /// # Example
    ///
    /// ```
    /// # use parsetree::Tree;
    /// let mut tree = Tree::new();
    /// let root = tree.add_node("root");
    /// let word = tree.add_node("word");
    /// tree.add_branch(root, word).unwrap();
    /// tree[word].tag("NOUN");
    ///
    /// let text = tree.dump(root).to_string();
    /// assert_eq!(text, "Tree (2 nodes)\n  root\n    word NOUN\n");
    /// ```
    pub fn dump(&self, root: NodeId) -> Dump<'_> {
        Dump { tree: self, root }
    }
}

impl Display for Dump<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree ({} nodes)", self.tree.count(self.root))?;
        self.node(f, self.root, 1)
    }
}

impl Dump<'_> {
    fn node(&self, f: &mut Formatter<'_>, node: NodeId, depth: usize) -> fmt::Result {
        let Some(data) = self.tree.node(node) else {
            return Ok(());
        };

        for _ in 0..depth {
            f.write_str("  ")?;
        }

        f.write_str(data.name())?;

        for (name, value) in data.attributes() {
            write!(f, " {name}='{value}'")?;
        }

        for tag in data.tags() {
            write!(f, " {tag}")?;
        }

        f.write_str("\n")?;

        for &child in data.children() {
            self.node(f, child, depth + 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::Tree;

    #[test]
    fn dump_renders_the_subtree() {
        let mut tree = Tree::new();
        let root = tree.add_node("root");
        let noun = tree.add_node("noun");
        let word = tree.add_node("word");
        let verb = tree.add_node("verb");

        tree.add_branch(root, noun).unwrap();
        tree.add_branch(noun, word).unwrap();
        tree.add_branch(root, verb).unwrap();

        tree[word].set_attribute("raw", "import");
        tree[word].set_attribute("priority", 2);
        tree[word].tag("NOUN");
        tree[word].tag("WORD");

        let expected = "\
Tree (4 nodes)
  root
    noun
      word priority='2' raw='import' NOUN WORD
    verb
";
        assert_eq!(tree.dump(root).to_string(), expected);
    }

    #[test]
    fn dump_starts_at_the_given_node() {
        let mut tree = Tree::new();
        let root = tree.add_node("root");
        let noun = tree.add_node("noun");
        let word = tree.add_node("word");

        tree.add_branch(root, noun).unwrap();
        tree.add_branch(noun, word).unwrap();

        let expected = "Tree (2 nodes)\n  noun\n    word\n";
        assert_eq!(tree.dump(noun).to_string(), expected);
    }

    #[test]
    fn dump_of_a_removed_node_is_only_the_header() {
        let mut tree = Tree::new();
        let node = tree.add_node("gone");
        tree.remove_subtree(node);

        assert_eq!(tree.dump(node).to_string(), "Tree (0 nodes)\n");
    }
}
