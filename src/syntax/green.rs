//! The immutable ("green") tree.
//!
//! Green nodes know their kind and their ordered children, nothing else. They
//! hold no parent pointer, so any subtree can be shared between trees or
//! reused at several positions of one tree. Rendering a node concatenates the
//! renderings of its children; that is the only text a node has.

use crate::syntax::kind::{SyntaxKind, TokenKind};
use crate::syntax::token::SyntaxToken;
use std::fmt;
use std::sync::Arc;

/// Composite node in the immutable tree.
///
/// Equality is structural. Two nodes built separately from the same pieces
/// compare equal; [`GreenNode::ptr_eq`] answers the identity question.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode(Arc<GreenNodeData>);

#[derive(PartialEq, Eq, Hash)]
struct GreenNodeData {
    kind: SyntaxKind,
    text_len: usize,
    children: Box<[GreenElement]>,
}

/// A child of a green node: another node or a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GreenElement {
    Node(GreenNode),
    Token(SyntaxToken),
}

impl GreenNode {
    /// Only the factory and tree-editing helpers construct nodes.
    pub(crate) fn new(kind: SyntaxKind, children: Vec<GreenElement>) -> Self {
        let text_len = children.iter().map(GreenElement::text_len).sum();
        Self(Arc::new(GreenNodeData {
            kind,
            text_len,
            children: children.into_boxed_slice(),
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    /// Byte length of the rendered subtree.
    pub fn text_len(&self) -> usize {
        self.0.text_len
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.0.children
    }

    pub fn child(&self, slot: usize) -> Option<&GreenElement> {
        self.0.children.get(slot)
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &GreenNode> {
        self.children().iter().filter_map(GreenElement::as_node)
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = &SyntaxToken> {
        self.children().iter().filter_map(GreenElement::as_token)
    }

    /// Whether two handles refer to the same node instance.
    pub fn ptr_eq(&self, other: &GreenNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// All tokens of the subtree in document order.
    pub fn tokens(&self) -> Vec<SyntaxToken> {
        let mut tokens = Vec::new();
        collect_tokens(self, &mut tokens);
        tokens
    }

    pub fn first_token(&self) -> Option<&SyntaxToken> {
        self.children().iter().find_map(|child| match child {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(node) => node.first_token(),
        })
    }

    /// Append the rendered subtree to `out`.
    pub fn write_to(&self, out: &mut String) {
        for child in self.children() {
            child.write_to(out);
        }
    }

    /// The exact text of this subtree.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text_len());
        self.write_to(&mut out);
        out
    }
}

fn collect_tokens(node: &GreenNode, tokens: &mut Vec<SyntaxToken>) {
    for child in node.children() {
        match child {
            GreenElement::Token(token) => tokens.push(token.clone()),
            GreenElement::Node(node) => collect_tokens(node, tokens),
        }
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.children())
            .finish()
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl GreenElement {
    pub fn text_len(&self) -> usize {
        match self {
            GreenElement::Node(node) => node.text_len(),
            GreenElement::Token(token) => token.text_len(),
        }
    }

    pub fn as_node(&self) -> Option<&GreenNode> {
        match self {
            GreenElement::Node(node) => Some(node),
            GreenElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(_) => None,
        }
    }

    pub fn node_kind(&self) -> Option<SyntaxKind> {
        self.as_node().map(GreenNode::kind)
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.as_token().map(SyntaxToken::kind)
    }

    pub fn write_to(&self, out: &mut String) {
        match self {
            GreenElement::Node(node) => node.write_to(out),
            GreenElement::Token(token) => token.write_to(out),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text_len());
        self.write_to(&mut out);
        out
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(node)
    }
}

impl From<SyntaxToken> for GreenElement {
    fn from(token: SyntaxToken) -> Self {
        GreenElement::Token(token)
    }
}

/// A parsed or synthesized tree, rooted at a translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: GreenNode,
}

impl SyntaxTree {
    pub fn new(root: GreenNode) -> Self {
        Self { root }
    }

    pub fn green(&self) -> &GreenNode {
        &self.root
    }

    /// A fresh navigation root over this tree.
    pub fn root(&self) -> crate::syntax::red::SyntaxNode {
        crate::syntax::red::SyntaxNode::new_root(self.root.clone())
    }

    pub fn render(&self) -> String {
        self.root.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::token::Trivia;

    fn ident(text: &str, leading: &str) -> SyntaxToken {
        let leading = if leading.is_empty() {
            vec![]
        } else {
            vec![Trivia::new(leading)]
        };
        SyntaxToken::new(TokenKind::Identifier, text, leading, vec![])
    }

    #[test]
    fn render_concatenates_children_in_order() {
        let inner = GreenNode::new(
            SyntaxKind::SyntaxList,
            vec![ident("b", " ").into(), ident("c", "  ").into()],
        );
        let outer = GreenNode::new(
            SyntaxKind::SyntaxList,
            vec![ident("a", "").into(), inner.into(), ident("d", "\n").into()],
        );
        assert_eq!(outer.render(), "a b  c\nd");
        assert_eq!(outer.text_len(), outer.render().len());
    }

    #[test]
    fn structural_equality_and_sharing() {
        let shared = GreenNode::new(SyntaxKind::SyntaxList, vec![ident("x", "").into()]);
        let rebuilt = GreenNode::new(SyntaxKind::SyntaxList, vec![ident("x", "").into()]);
        assert_eq!(shared, rebuilt);
        assert!(!shared.ptr_eq(&rebuilt));

        // The same subtree may appear at two positions.
        let parent = GreenNode::new(
            SyntaxKind::SyntaxList,
            vec![shared.clone().into(), shared.clone().into()],
        );
        assert_eq!(parent.render(), "xx");
        assert!(parent.child_nodes().all(|child| child.ptr_eq(&shared)));
    }

    #[test]
    fn kind_participates_in_equality() {
        let list = GreenNode::new(SyntaxKind::SyntaxList, vec![]);
        let separated = GreenNode::new(SyntaxKind::SeparatedList, vec![]);
        assert_ne!(list, separated);
    }

    #[test]
    fn tokens_and_first_token() {
        let inner = GreenNode::new(SyntaxKind::SyntaxList, vec![ident("b", "").into()]);
        let outer = GreenNode::new(
            SyntaxKind::SyntaxList,
            vec![inner.into(), ident("c", "").into()],
        );
        let texts: Vec<_> = outer.tokens().iter().map(|t| t.text().to_string()).collect();
        assert_eq!(texts, ["b", "c"]);
        assert_eq!(outer.first_token().map(SyntaxToken::text), Some("b"));
    }
}
