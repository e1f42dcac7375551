//! The node hierarchy.

use glam::Mat4;

use crate::label::Label;

/// A node of the transform tree. Children are owned, so the tree can have
/// neither shared nodes nor cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Label,
    /// Transform relative to the parent node.
    pub transformation: Mat4,
    pub children: Vec<Node>,
    /// Indices into the scene's mesh list.
    pub meshes: Vec<u32>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: Label::default(),
            transformation: Mat4::IDENTITY,
            children: Vec::new(),
            meshes: Vec::new(),
        }
    }
}

impl Node {
    pub fn new(name: impl Into<Label>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the local transform.
    pub fn transformed(mut self, transformation: Mat4) -> Self {
        self.transformation = transformation;
        self
    }

    /// Attach mesh references.
    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = u32>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    /// Append a child and return it for further building.
    pub fn add_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Total number of nodes in this subtree.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order iteration over this subtree.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// Apply `f` to every node of this subtree, parents before children.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// Pre-order iterator over a node subtree.
pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        let mut root = Node::new("root");
        let child1 = root.add_child(Node::new("child1"));
        child1.add_child(Node::new("grandchild"));
        root.add_child(Node::new("child2"));
        root
    }

    #[test]
    fn test_preorder() {
        let root = tree();
        let names: Vec<String> = root.iter().map(|n| n.name.to_string_lossy()).collect();
        assert_eq!(names, vec!["root", "child1", "grandchild", "child2"]);
    }

    #[test]
    fn test_count() {
        assert_eq!(tree().count(), 4);
    }

    #[test]
    fn test_visit_mut_reaches_every_node() {
        let mut root = tree();
        root.visit_mut(&mut |node| node.meshes.push(7));
        assert!(root.iter().all(|node| node.meshes == [7]));
    }
}
