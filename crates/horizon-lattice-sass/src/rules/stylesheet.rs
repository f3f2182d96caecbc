//! Stylesheet node collection.

use crate::rules::{Declaration, VariableDeclaration};
use crate::Result;

/// A stylesheet node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A property declaration.
    Declaration(Declaration),
    /// A variable declaration.
    Variable(VariableDeclaration),
}

impl From<Declaration> for Node {
    fn from(declaration: Declaration) -> Self {
        Node::Declaration(declaration)
    }
}

impl From<VariableDeclaration> for Node {
    fn from(variable: VariableDeclaration) -> Self {
        Node::Variable(variable)
    }
}

/// A parsed stylesheet: declarations and variable declarations in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    /// The nodes in source order.
    pub nodes: Vec<Node>,
}

impl Stylesheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a stylesheet from SCSS text.
    pub fn from_scss(scss: &str) -> Result<Self> {
        crate::parser::parse_stylesheet(scss)
    }

    /// Add a node at the end.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the stylesheet is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterate over property declarations.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            Node::Variable(_) => None,
        })
    }

    /// Iterate mutably over property declarations.
    pub fn declarations_mut(&mut self) -> impl Iterator<Item = &mut Declaration> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Declaration(decl) => Some(decl),
            Node::Variable(_) => None,
        })
    }

    /// Iterate over variable declarations.
    pub fn variables(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Variable(var) => Some(var),
            Node::Declaration(_) => None,
        })
    }

    /// Clear all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl FromIterator<Node> for Stylesheet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
