//! Parent-aware navigation over a green tree.
//!
//! A [`SyntaxNode`] pairs a green node with the navigation node of its parent
//! and its slot in that parent. Navigation nodes are created on demand while
//! walking down from a root and are dropped with the traversal; the green
//! tree never learns about them.

use crate::syntax::green::{GreenElement, GreenNode};
use crate::syntax::kind::SyntaxKind;
use crate::syntax::token::SyntaxToken;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct SyntaxNode(Rc<NodeData>);

struct NodeData {
    green: GreenNode,
    parent: Option<SyntaxNode>,
    slot: usize,
}

/// A child seen through the navigation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxNode {
    pub fn new_root(green: GreenNode) -> Self {
        Self(Rc::new(NodeData {
            green,
            parent: None,
            slot: 0,
        }))
    }

    fn new_child(green: GreenNode, parent: SyntaxNode, slot: usize) -> Self {
        Self(Rc::new(NodeData {
            green,
            parent: Some(parent),
            slot,
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.green.kind()
    }

    pub fn green(&self) -> &GreenNode {
        &self.0.green
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.0.parent.as_ref()
    }

    pub fn has_parent(&self) -> bool {
        self.0.parent.is_some()
    }

    /// Position in the parent's children; 0 for a root.
    pub fn slot(&self) -> usize {
        self.0.slot
    }

    /// Children in order. Node children are wrapped as they are yielded.
    pub fn children(&self) -> impl Iterator<Item = SyntaxElement> + '_ {
        self.green()
            .children()
            .iter()
            .enumerate()
            .map(move |(slot, child)| match child {
                GreenElement::Node(node) => {
                    SyntaxElement::Node(SyntaxNode::new_child(node.clone(), self.clone(), slot))
                }
                GreenElement::Token(token) => SyntaxElement::Token(token.clone()),
            })
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.children().filter_map(SyntaxElement::into_node)
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.children().filter_map(SyntaxElement::into_token)
    }

    /// The child at `slot`, if there is one.
    pub fn child(&self, slot: usize) -> Option<SyntaxElement> {
        self.green().child(slot).map(|child| match child {
            GreenElement::Node(node) => {
                SyntaxElement::Node(SyntaxNode::new_child(node.clone(), self.clone(), slot))
            }
            GreenElement::Token(token) => SyntaxElement::Token(token.clone()),
        })
    }

    /// First child node of the given kind.
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.child_nodes().find(|child| child.kind() == kind)
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        std::iter::successors(self.parent().cloned(), |node| node.parent().cloned())
    }

    /// Exact source text of this subtree.
    pub fn render(&self) -> String {
        self.green().render()
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.green().ptr_eq(other.green())
            && self.slot() == other.slot()
            && self.parent() == other.parent()
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("kind", &self.kind())
            .field("slot", &self.slot())
            .field("text_len", &self.green().text_len())
            .finish()
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.green(), f)
    }
}

impl SyntaxElement {
    pub fn into_node(self) -> Option<SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::factory;
    use crate::syntax::kind::TokenKind;

    fn ident(text: &str) -> SyntaxToken {
        factory::identifier(text, vec![], vec![]).unwrap()
    }

    fn sample() -> GreenNode {
        let shared = factory::simple_identifier(ident("x")).unwrap();
        factory::syntax_list([
            GreenElement::from(shared.clone()),
            factory::keyword(TokenKind::Comma).unwrap().into(),
            shared.into(),
        ])
    }

    #[test]
    fn children_carry_parent_and_slot() {
        let root = SyntaxNode::new_root(sample());
        assert!(!root.has_parent());

        let nodes: Vec<_> = root.child_nodes().collect();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].slot(), 0);
        assert_eq!(nodes[1].slot(), 2);
        assert_eq!(nodes[1].parent(), Some(&root));
        assert_eq!(nodes[0].ancestors().count(), 1);
    }

    #[test]
    fn shared_green_at_different_slots_is_distinct() {
        let root = SyntaxNode::new_root(sample());
        let nodes: Vec<_> = root.child_nodes().collect();
        assert!(nodes[0].green().ptr_eq(nodes[1].green()));
        assert_ne!(nodes[0], nodes[1]);
    }

    #[test]
    fn rematerialized_children_are_equivalent() {
        let root = SyntaxNode::new_root(sample());
        let first = root.child_nodes().next().unwrap();
        let again = root.child(0).and_then(SyntaxElement::into_node).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn token_children_are_yielded_in_place() {
        let root = SyntaxNode::new_root(sample());
        let kinds: Vec<_> = root
            .children()
            .map(|child| child.as_token().map(SyntaxToken::kind))
            .collect();
        assert_eq!(kinds, [None, Some(TokenKind::Comma), None]);
        assert_eq!(root.render(), "x,x");
    }
}
