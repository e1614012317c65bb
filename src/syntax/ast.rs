//! Typed views over navigation nodes.
//!
//! A view is a [`SyntaxNode`] whose kind has been checked once, exposing
//! accessors for the children that kind is known to carry. The child layouts
//! read here are the ones [`crate::syntax::factory`] enforces.

use crate::syntax::errors::SyntaxError;
use crate::syntax::kind::{SyntaxKind, TokenKind};
use crate::syntax::red::{SyntaxElement, SyntaxNode};
use crate::syntax::token::SyntaxToken;

/// A capability cast from an untyped navigation node.
pub trait AstNode: Sized {
    const KIND: SyntaxKind;
    const NAME: &'static str;

    fn from_node_unchecked(node: SyntaxNode) -> Self;

    fn syntax(&self) -> &SyntaxNode;

    fn can_cast(kind: SyntaxKind) -> bool {
        kind == Self::KIND
    }

    /// `Some` when the node has this view's kind.
    fn cast(node: SyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self::from_node_unchecked(node))
        } else {
            None
        }
    }

    /// Like [`AstNode::cast`], reporting the kind that was found.
    fn try_cast(node: SyntaxNode) -> Result<Self, SyntaxError> {
        let found = node.kind();
        Self::cast(node).ok_or(SyntaxError::WrongKind {
            expected: Self::NAME,
            found,
        })
    }

    fn render(&self) -> String {
        self.syntax().render()
    }
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            const KIND: SyntaxKind = SyntaxKind::$name;
            const NAME: &'static str = stringify!($name);

            fn from_node_unchecked(node: SyntaxNode) -> Self {
                Self(node)
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(TranslationUnit);
ast_node!(NamespaceDefinition);
ast_node!(ClassSpecifier);
ast_node!(
    /// A function definition with a body, possibly carrying attributes.
    FunctionDefinition
);
ast_node!(AttributeSpecifierSequence);
ast_node!(
    /// One `[[ ... ]]` group.
    AttributeSpecifier
);
ast_node!(Attribute);
ast_node!(ArgumentClause);
ast_node!(IdentifierExpression);
ast_node!(SimpleIdentifier);
ast_node!(SimpleTemplateIdentifier);
ast_node!(NestedNameSpecifier);
ast_node!(CompoundStatement);

fn first_child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
    node.child_nodes().find_map(N::cast)
}

fn first_token(node: &SyntaxNode, kind: TokenKind) -> Option<SyntaxToken> {
    node.child_tokens().find(|token| token.kind() == kind)
}

/// Items of a separated list child, skipping the separators.
fn separated_items(list: &SyntaxNode) -> impl Iterator<Item = SyntaxElement> + '_ {
    list.children().step_by(2)
}

impl TranslationUnit {
    pub fn declarations(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .child_of_kind(SyntaxKind::SyntaxList)
            .into_iter()
            .flat_map(|list| list.child_nodes().collect::<Vec<_>>())
    }
}

impl NamespaceDefinition {
    /// The namespace's name components, `A::B` giving `A` then `B`.
    /// Empty for an anonymous namespace.
    pub fn name_identifiers(&self) -> Vec<SyntaxToken> {
        self.0
            .child_of_kind(SyntaxKind::SeparatedList)
            .map(|list| {
                separated_items(&list)
                    .filter_map(SyntaxElement::into_token)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.name_identifiers().is_empty()
    }
}

impl ClassSpecifier {
    pub fn class_key(&self) -> Option<SyntaxToken> {
        self.0
            .child_tokens()
            .find(|token| token.kind().is_class_key())
    }

    /// `None` for an unnamed class.
    pub fn identifier_token(&self) -> Option<SyntaxToken> {
        first_token(&self.0, TokenKind::Identifier)
    }

    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .child_of_kind(SyntaxKind::SyntaxList)
            .into_iter()
            .flat_map(|list| list.child_nodes().collect::<Vec<_>>())
    }
}

impl FunctionDefinition {
    pub fn attributes(&self) -> Option<AttributeSpecifierSequence> {
        first_child(&self.0)
    }

    /// The declarator naming the function.
    pub fn name(&self) -> Option<IdentifierExpression> {
        first_child(&self.0)
    }

    pub fn body(&self) -> Option<CompoundStatement> {
        self.0
            .child_of_kind(SyntaxKind::RegularFunctionBody)
            .and_then(|body| first_child(&body))
    }
}

impl AttributeSpecifierSequence {
    pub fn specifiers(&self) -> impl Iterator<Item = AttributeSpecifier> + '_ {
        self.0.child_nodes().filter_map(AttributeSpecifier::cast)
    }
}

impl AttributeSpecifier {
    pub fn attributes(&self) -> Vec<Attribute> {
        self.0
            .child_of_kind(SyntaxKind::SeparatedList)
            .map(|list| {
                separated_items(&list)
                    .filter_map(SyntaxElement::into_node)
                    .filter_map(Attribute::cast)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The attribute when this group holds exactly one.
    pub fn single_attribute(&self) -> Option<Attribute> {
        let mut attributes = self.attributes();
        if attributes.len() == 1 {
            attributes.pop()
        } else {
            None
        }
    }
}

impl Attribute {
    pub fn namespace(&self) -> Option<NestedNameSpecifier> {
        first_child(&self.0)
    }

    pub fn identifier_token(&self) -> Option<SyntaxToken> {
        first_token(&self.0, TokenKind::Identifier)
    }

    /// The bare attribute name; `xunit::Fact` is named `Fact`.
    pub fn name(&self) -> Option<String> {
        self.identifier_token().map(|token| token.text().to_string())
    }

    pub fn argument_clause(&self) -> Option<ArgumentClause> {
        first_child(&self.0)
    }
}

impl ArgumentClause {
    /// Tokens between the parentheses.
    pub fn tokens(&self) -> Vec<SyntaxToken> {
        self.0
            .child_of_kind(SyntaxKind::SyntaxList)
            .map(|list| list.green().tokens())
            .unwrap_or_default()
    }

    /// Exact source text between the parentheses.
    ///
    /// The parentheses' own trivia is left out; trivia between argument
    /// tokens is kept.
    pub fn render_arguments(&self) -> String {
        self.0
            .child_of_kind(SyntaxKind::SyntaxList)
            .map(|list| list.render())
            .unwrap_or_default()
    }
}

/// The unqualified part of a name.
#[derive(Debug, Clone, PartialEq)]
pub enum UnqualifiedIdentifier {
    Simple(SimpleIdentifier),
    Template(SimpleTemplateIdentifier),
}

impl UnqualifiedIdentifier {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::SimpleIdentifier => SimpleIdentifier::cast(node).map(Self::Simple),
            SyntaxKind::SimpleTemplateIdentifier => {
                SimpleTemplateIdentifier::cast(node).map(Self::Template)
            }
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Simple(identifier) => identifier.syntax(),
            Self::Template(identifier) => identifier.syntax(),
        }
    }
}

impl IdentifierExpression {
    pub fn qualifier(&self) -> Option<NestedNameSpecifier> {
        first_child(&self.0)
    }

    pub fn unqualified(&self) -> Option<UnqualifiedIdentifier> {
        self.0.child_nodes().find_map(UnqualifiedIdentifier::cast)
    }

    /// The simple name, when there is no qualifier and no template arguments.
    pub fn as_simple(&self) -> Option<SimpleIdentifier> {
        if self.qualifier().is_some() {
            return None;
        }
        match self.unqualified()? {
            UnqualifiedIdentifier::Simple(identifier) if !identifier.is_destructor() => {
                Some(identifier)
            }
            _ => None,
        }
    }
}

impl SimpleIdentifier {
    pub fn identifier_token(&self) -> Option<SyntaxToken> {
        first_token(&self.0, TokenKind::Identifier)
    }

    pub fn text(&self) -> String {
        self.identifier_token()
            .map(|token| token.text().to_string())
            .unwrap_or_default()
    }

    pub fn is_destructor(&self) -> bool {
        first_token(&self.0, TokenKind::Tilde).is_some()
    }
}

impl SimpleTemplateIdentifier {
    pub fn identifier_token(&self) -> Option<SyntaxToken> {
        first_token(&self.0, TokenKind::Identifier)
    }
}

impl NestedNameSpecifier {
    pub fn is_global(&self) -> bool {
        first_token(&self.0, TokenKind::DoubleColon).is_some()
    }

    pub fn names(&self) -> Vec<UnqualifiedIdentifier> {
        self.0
            .child_of_kind(SyntaxKind::SeparatedList)
            .map(|list| {
                separated_items(&list)
                    .filter_map(SyntaxElement::into_node)
                    .filter_map(UnqualifiedIdentifier::cast)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl CompoundStatement {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.0
            .child_of_kind(SyntaxKind::SyntaxList)
            .into_iter()
            .flat_map(|list| list.child_nodes().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::parse;

    fn find<N: AstNode>(root: &SyntaxNode) -> Vec<N> {
        let mut found = Vec::new();
        let mut stack = vec![root.clone()];
        while let Some(node) = stack.pop() {
            let children: Vec<_> = node.child_nodes().collect();
            stack.extend(children.into_iter().rev());
            if let Some(view) = N::cast(node) {
                found.push(view);
            }
        }
        found
    }

    #[test]
    fn cast_checks_kind() {
        let tree = parse("int x;").unwrap();
        let root = tree.root();
        assert!(TranslationUnit::cast(root.clone()).is_some());
        assert!(ClassSpecifier::cast(root.clone()).is_none());
        assert_eq!(
            ClassSpecifier::try_cast(root).unwrap_err(),
            SyntaxError::WrongKind {
                expected: "ClassSpecifier",
                found: SyntaxKind::TranslationUnit,
            }
        );
    }

    #[test]
    fn namespace_names_are_split() {
        let tree = parse("namespace Sample::UnitTests { }\nnamespace { }\n").unwrap();
        let namespaces: Vec<NamespaceDefinition> = find(&tree.root());
        assert_eq!(namespaces.len(), 2);
        let names: Vec<_> = namespaces[0]
            .name_identifiers()
            .iter()
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(names, ["Sample", "UnitTests"]);
        assert!(namespaces[1].is_anonymous());
    }

    #[test]
    fn attribute_views() {
        let source = "class C {\n  [[Theory]]\n  [[InlineData(1, \"a\")]]\n  void M(int x, const char* s) {}\n};\n";
        let tree = parse(source).unwrap();
        let functions: Vec<FunctionDefinition> = find(&tree.root());
        assert_eq!(functions.len(), 1);

        let specifiers: Vec<_> = functions[0].attributes().unwrap().specifiers().collect();
        assert_eq!(specifiers.len(), 2);
        let inline = specifiers[1].single_attribute().unwrap();
        assert_eq!(inline.name().as_deref(), Some("InlineData"));
        assert_eq!(
            inline.argument_clause().unwrap().render_arguments(),
            "1, \"a\""
        );
        assert_eq!(
            functions[0].name().and_then(|n| n.as_simple()).map(|s| s.text()),
            Some("M".to_string())
        );
    }

    #[test]
    fn class_name_is_optional() {
        let tree = parse("struct { int x; } value;\nclass Named {};\n").unwrap();
        let classes: Vec<ClassSpecifier> = find(&tree.root());
        assert_eq!(classes.len(), 2);
        assert!(classes[0].identifier_token().is_none());
        assert_eq!(classes[1].identifier_token().unwrap().text(), "Named");
    }
}
