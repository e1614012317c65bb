//! Construction surface for green nodes.
//!
//! Every node in the crate, parsed or synthesized, is built by one of these
//! functions. Each constructor checks the kinds of the pieces it is handed and
//! the separator arithmetic of separated lists, so a tree that exists is a
//! tree that satisfies its shape invariants.
//!
//! There is no formatter behind this module. Every space and newline of a
//! synthesized tree is trivia the caller passed in explicitly.
//!
//! # Example
//!
//! ```
//! use hdr_testgen::syntax::factory::{self, SeparatorPolicy};
//! use hdr_testgen::syntax::TokenKind;
//!
//! # fn main() -> Result<(), hdr_testgen::syntax::SyntaxError> {
//! let names = factory::separated_list(
//!     vec![
//!         factory::simple_identifier(factory::identifier("std", vec![], vec![])?)?.into(),
//!     ],
//!     vec![factory::keyword(TokenKind::DoubleColon)?],
//!     SeparatorPolicy::Terminated,
//! )?;
//! let qualifier = factory::nested_name_specifier(None, names)?;
//! assert_eq!(qualifier.render(), "std::");
//! # Ok(())
//! # }
//! ```

use crate::syntax::errors::SyntaxError;
use crate::syntax::green::{GreenElement, GreenNode};
use crate::syntax::kind::{SyntaxKind, TokenKind};
use crate::syntax::token::{SyntaxToken, Trivia};

type Result<T> = std::result::Result<T, SyntaxError>;

/// How many separators a separated list carries for a given item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorPolicy {
    /// Separators only between items: `a, b, c`.
    Interleaved,
    /// Every item is followed by a separator: `a::b::`.
    Terminated,
}

impl SeparatorPolicy {
    pub fn expected_separators(self, items: usize) -> usize {
        match self {
            SeparatorPolicy::Interleaved => items.saturating_sub(1),
            SeparatorPolicy::Terminated => items,
        }
    }
}

/// Operators the synthesizer can place in a binary expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Addition,
    AdditionAssignment,
    Assignment,
    Equals,
    LessThan,
    LogicalAnd,
    LogicalOr,
    MemberOfObject,
    MemberOfPointer,
    NotEquals,
    Subtraction,
    SubtractionAssignment,
}

impl BinaryOperator {
    pub fn token_kind(self) -> TokenKind {
        match self {
            BinaryOperator::Addition => TokenKind::Plus,
            BinaryOperator::AdditionAssignment => TokenKind::PlusEqual,
            BinaryOperator::Assignment => TokenKind::Equal,
            BinaryOperator::Equals => TokenKind::DoubleEqual,
            BinaryOperator::LessThan => TokenKind::LessThan,
            BinaryOperator::LogicalAnd => TokenKind::DoubleAmpersand,
            BinaryOperator::LogicalOr => TokenKind::DoublePipe,
            BinaryOperator::MemberOfObject => TokenKind::Dot,
            BinaryOperator::MemberOfPointer => TokenKind::Arrow,
            BinaryOperator::NotEquals => TokenKind::ExclamationEqual,
            BinaryOperator::Subtraction => TokenKind::Minus,
            BinaryOperator::SubtractionAssignment => TokenKind::MinusEqual,
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn expect_token(token: &SyntaxToken, kind: TokenKind, context: &'static str) -> Result<()> {
    if token.kind() == kind {
        Ok(())
    } else {
        Err(SyntaxError::UnexpectedToken {
            context,
            expected: kind.to_string(),
            found: token.kind(),
        })
    }
}

fn expect_token_where(
    token: &SyntaxToken,
    accept: impl Fn(TokenKind) -> bool,
    expected: &str,
    context: &'static str,
) -> Result<()> {
    if accept(token.kind()) {
        Ok(())
    } else {
        Err(SyntaxError::UnexpectedToken {
            context,
            expected: expected.to_string(),
            found: token.kind(),
        })
    }
}

fn expect_node(node: &GreenNode, kind: SyntaxKind, context: &'static str) -> Result<()> {
    expect_node_where(node, |found| found == kind, &kind.to_string(), context)
}

fn expect_node_where(
    node: &GreenNode,
    accept: impl Fn(SyntaxKind) -> bool,
    expected: &str,
    context: &'static str,
) -> Result<()> {
    if accept(node.kind()) {
        Ok(())
    } else {
        Err(SyntaxError::UnexpectedNode {
            context,
            expected: expected.to_string(),
            found: node.kind(),
        })
    }
}

/// Check a separated list's items and separators.
fn expect_separated(
    list: &GreenNode,
    context: &'static str,
    accept_item: impl Fn(&GreenElement) -> bool,
    item_description: &str,
    separator: TokenKind,
    policy: SeparatorPolicy,
) -> Result<()> {
    expect_node(list, SyntaxKind::SeparatedList, context)?;
    let children = list.children();
    let items = children.len().div_ceil(2);
    let separators = children.len() / 2;
    if policy.expected_separators(items) != separators {
        return Err(SyntaxError::SeparatorMismatch {
            items,
            separators,
            policy,
        });
    }
    for (slot, child) in children.iter().enumerate() {
        if slot % 2 == 0 {
            if !accept_item(child) {
                return Err(match child {
                    GreenElement::Node(node) => SyntaxError::UnexpectedNode {
                        context,
                        expected: item_description.to_string(),
                        found: node.kind(),
                    },
                    GreenElement::Token(token) => SyntaxError::UnexpectedToken {
                        context,
                        expected: item_description.to_string(),
                        found: token.kind(),
                    },
                });
            }
        } else {
            match child {
                GreenElement::Token(token) => expect_token(token, separator, context)?,
                GreenElement::Node(node) => {
                    return Err(SyntaxError::ExpectedToken {
                        context,
                        found: node.kind(),
                    })
                }
            }
        }
    }
    Ok(())
}

fn is_node_of(element: &GreenElement, accept: impl Fn(SyntaxKind) -> bool) -> bool {
    element.node_kind().is_some_and(accept)
}

fn expect_nonempty_tokens(tokens: &[SyntaxToken], context: &'static str) -> Result<()> {
    if tokens.is_empty() {
        Err(SyntaxError::Empty { context })
    } else {
        Ok(())
    }
}

fn tokens_to_children(tokens: Vec<SyntaxToken>) -> Vec<GreenElement> {
    tokens.into_iter().map(GreenElement::Token).collect()
}

// ---------------------------------------------------------------------------
// Trivia and tokens
// ---------------------------------------------------------------------------

pub fn trivia(text: impl Into<String>) -> Trivia {
    Trivia::new(text.into())
}

/// Build a token with explicit text and trivia.
///
/// Kinds with a fixed spelling only accept that spelling; identifiers and
/// literals must not be empty.
pub fn token(
    kind: TokenKind,
    text: impl Into<String>,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
) -> Result<SyntaxToken> {
    let text = text.into();
    let valid = match kind.fixed_text() {
        Some(fixed) => fixed == text,
        None => !text.is_empty(),
    };
    if !valid {
        return Err(SyntaxError::InvalidTokenText { kind, text });
    }
    Ok(SyntaxToken::new(kind, text, leading, trailing))
}

pub fn identifier(
    text: impl Into<String>,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
) -> Result<SyntaxToken> {
    token(TokenKind::Identifier, text, leading, trailing)
}

/// A keyword or punctuation token spelled from its kind, without trivia.
pub fn keyword(kind: TokenKind) -> Result<SyntaxToken> {
    keyword_with_trivia(kind, Vec::new(), Vec::new())
}

pub fn keyword_with_trivia(
    kind: TokenKind,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
) -> Result<SyntaxToken> {
    let text = kind.fixed_text().ok_or(SyntaxError::NoFixedText(kind))?;
    Ok(SyntaxToken::new(kind, text, leading, trailing))
}

pub fn end_of_file(leading: Vec<Trivia>) -> SyntaxToken {
    SyntaxToken::new(TokenKind::EndOfFile, "", leading, Vec::new())
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// A plain list: ordered children, no separators.
pub fn syntax_list<I, E>(children: I) -> GreenNode
where
    I: IntoIterator<Item = E>,
    E: Into<GreenElement>,
{
    GreenNode::new(
        SyntaxKind::SyntaxList,
        children.into_iter().map(Into::into).collect(),
    )
}

/// A separated list; items land at even slots, separators at odd slots.
pub fn separated_list(
    items: Vec<GreenElement>,
    separators: Vec<SyntaxToken>,
    policy: SeparatorPolicy,
) -> Result<GreenNode> {
    if policy.expected_separators(items.len()) != separators.len() {
        return Err(SyntaxError::SeparatorMismatch {
            items: items.len(),
            separators: separators.len(),
            policy,
        });
    }

    let mut children = Vec::with_capacity(items.len() + separators.len());
    let mut separators = separators.into_iter();
    for item in items {
        children.push(item);
        if let Some(separator) = separators.next() {
            children.push(GreenElement::Token(separator));
        }
    }
    Ok(GreenNode::new(SyntaxKind::SeparatedList, children))
}

/// An empty separated list.
pub fn empty_separated_list() -> GreenNode {
    GreenNode::new(SyntaxKind::SeparatedList, Vec::new())
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

fn expect_declarations(list: &GreenNode, context: &'static str) -> Result<()> {
    expect_node(list, SyntaxKind::SyntaxList, context)?;
    for child in list.children() {
        match child {
            GreenElement::Node(node) => {
                expect_node_where(node, SyntaxKind::is_declaration, "declaration", context)?
            }
            GreenElement::Token(token) => {
                return Err(SyntaxError::ExpectedNode {
                    context,
                    found: token.kind(),
                })
            }
        }
    }
    Ok(())
}

pub fn translation_unit(declarations: GreenNode, end_of_file: SyntaxToken) -> Result<GreenNode> {
    const CONTEXT: &str = "translation unit";
    expect_declarations(&declarations, CONTEXT)?;
    expect_token(&end_of_file, TokenKind::EndOfFile, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::TranslationUnit,
        vec![declarations.into(), end_of_file.into()],
    ))
}

/// `namespace A::B { ... }`; an empty name list is an anonymous namespace.
pub fn namespace_definition(
    inline_keyword: Option<SyntaxToken>,
    namespace_keyword: SyntaxToken,
    names: GreenNode,
    open_brace: SyntaxToken,
    declarations: GreenNode,
    close_brace: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "namespace definition";
    if let Some(inline_keyword) = &inline_keyword {
        expect_token(inline_keyword, TokenKind::Inline, CONTEXT)?;
    }
    expect_token(&namespace_keyword, TokenKind::Namespace, CONTEXT)?;
    expect_separated(
        &names,
        CONTEXT,
        |item| item.token_kind() == Some(TokenKind::Identifier),
        "identifier",
        TokenKind::DoubleColon,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&open_brace, TokenKind::OpenBrace, CONTEXT)?;
    expect_declarations(&declarations, CONTEXT)?;
    expect_token(&close_brace, TokenKind::CloseBrace, CONTEXT)?;
    let mut children: Vec<GreenElement> = inline_keyword.into_iter().map(Into::into).collect();
    children.extend([
        namespace_keyword.into(),
        names.into(),
        open_brace.into(),
        declarations.into(),
        close_brace.into(),
    ]);
    Ok(GreenNode::new(SyntaxKind::NamespaceDefinition, children))
}

pub fn simple_declaration(
    specifiers: GreenNode,
    declarators: GreenNode,
    semicolon: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "simple declaration";
    expect_node(&specifiers, SyntaxKind::DeclarationSpecifierSequence, CONTEXT)?;
    expect_node(&declarators, SyntaxKind::InitializerDeclaratorList, CONTEXT)?;
    expect_token(&semicolon, TokenKind::Semicolon, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::SimpleDeclaration,
        vec![specifiers.into(), declarators.into(), semicolon.into()],
    ))
}

/// A function with a body.
///
/// `trailing` is a plain list of the tokens between the parameter list and
/// the body (`const`, `override`, constructor initializers).
pub fn function_definition(
    attributes: GreenNode,
    specifiers: GreenNode,
    declarator: GreenNode,
    parameters: GreenNode,
    trailing: GreenNode,
    body: GreenNode,
) -> Result<GreenNode> {
    const CONTEXT: &str = "function definition";
    expect_node(&attributes, SyntaxKind::AttributeSpecifierSequence, CONTEXT)?;
    expect_node(&specifiers, SyntaxKind::DeclarationSpecifierSequence, CONTEXT)?;
    expect_node(&declarator, SyntaxKind::IdentifierExpression, CONTEXT)?;
    expect_node(&parameters, SyntaxKind::ParameterList, CONTEXT)?;
    expect_node(&trailing, SyntaxKind::SyntaxList, CONTEXT)?;
    if let Some(node) = trailing.child_nodes().next() {
        return Err(SyntaxError::ExpectedToken {
            context: CONTEXT,
            found: node.kind(),
        });
    }
    expect_node(&body, SyntaxKind::RegularFunctionBody, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::FunctionDefinition,
        vec![
            attributes.into(),
            specifiers.into(),
            declarator.into(),
            parameters.into(),
            trailing.into(),
            body.into(),
        ],
    ))
}

pub fn access_specifier(keyword: SyntaxToken, colon: SyntaxToken) -> Result<GreenNode> {
    const CONTEXT: &str = "access specifier";
    expect_token_where(
        &keyword,
        TokenKind::is_access_keyword,
        "access keyword",
        CONTEXT,
    )?;
    expect_token(&colon, TokenKind::Colon, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::AccessSpecifier,
        vec![keyword.into(), colon.into()],
    ))
}

/// A declaration kept as raw tokens.
pub fn opaque_declaration(tokens: Vec<SyntaxToken>) -> Result<GreenNode> {
    expect_nonempty_tokens(&tokens, "opaque declaration")?;
    Ok(GreenNode::new(
        SyntaxKind::OpaqueDeclaration,
        tokens_to_children(tokens),
    ))
}

// ---------------------------------------------------------------------------
// Specifiers
// ---------------------------------------------------------------------------

fn is_specifier_node(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PrimitiveDataTypeSpecifier
            | SyntaxKind::IdentifierType
            | SyntaxKind::ClassSpecifier
    )
}

fn is_specifier_token(kind: TokenKind) -> bool {
    kind.is_specifier_keyword()
        || matches!(
            kind,
            TokenKind::Asterisk
                | TokenKind::Ampersand
                | TokenKind::DoubleAmpersand
                | TokenKind::Typename
        )
}

pub fn declaration_specifier_sequence(specifiers: Vec<GreenElement>) -> Result<GreenNode> {
    const CONTEXT: &str = "declaration specifier sequence";
    for specifier in &specifiers {
        match specifier {
            GreenElement::Node(node) => {
                expect_node_where(node, is_specifier_node, "type specifier", CONTEXT)?
            }
            GreenElement::Token(token) => {
                expect_token_where(token, is_specifier_token, "specifier keyword", CONTEXT)?
            }
        }
    }
    Ok(GreenNode::new(
        SyntaxKind::DeclarationSpecifierSequence,
        specifiers,
    ))
}

pub fn primitive_data_type_specifier(keyword: SyntaxToken) -> Result<GreenNode> {
    expect_token_where(
        &keyword,
        TokenKind::is_primitive_type,
        "primitive type keyword",
        "primitive data type specifier",
    )?;
    Ok(GreenNode::new(
        SyntaxKind::PrimitiveDataTypeSpecifier,
        vec![keyword.into()],
    ))
}

pub fn identifier_type(qualifier: Option<GreenNode>, name: GreenNode) -> Result<GreenNode> {
    qualified_name(SyntaxKind::IdentifierType, "identifier type", qualifier, name)
}

fn qualified_name(
    kind: SyntaxKind,
    context: &'static str,
    qualifier: Option<GreenNode>,
    name: GreenNode,
) -> Result<GreenNode> {
    let mut children = Vec::with_capacity(2);
    if let Some(qualifier) = qualifier {
        expect_node(&qualifier, SyntaxKind::NestedNameSpecifier, context)?;
        children.push(qualifier.into());
    }
    expect_node_where(
        &name,
        SyntaxKind::is_unqualified_identifier,
        "unqualified identifier",
        context,
    )?;
    children.push(name.into());
    Ok(GreenNode::new(kind, children))
}

/// `class Name : bases { members }`; the name and base clause are optional.
/// `class [[attributes]] Name final : bases { members }`. The attribute
/// sequence and `final` are only kept when present.
#[allow(clippy::too_many_arguments)]
pub fn class_specifier(
    class_key: SyntaxToken,
    attributes: Option<GreenNode>,
    name: Option<SyntaxToken>,
    final_specifier: Option<SyntaxToken>,
    base_clause: Option<GreenNode>,
    open_brace: SyntaxToken,
    members: GreenNode,
    close_brace: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "class specifier";
    expect_token_where(&class_key, TokenKind::is_class_key, "class key", CONTEXT)?;
    let mut children = vec![class_key.into()];
    if let Some(attributes) = attributes {
        expect_node(&attributes, SyntaxKind::AttributeSpecifierSequence, CONTEXT)?;
        children.push(attributes.into());
    }
    let named = name.is_some();
    if let Some(name) = name {
        expect_token(&name, TokenKind::Identifier, CONTEXT)?;
        children.push(name.into());
    }
    if let Some(final_specifier) = final_specifier {
        expect_token(&final_specifier, TokenKind::Identifier, CONTEXT)?;
        if final_specifier.text() != "final" {
            return Err(SyntaxError::InvalidTokenText {
                kind: TokenKind::Identifier,
                text: final_specifier.text().to_string(),
            });
        }
        if !named {
            return Err(SyntaxError::UnexpectedToken {
                context: CONTEXT,
                expected: "class name before final".to_string(),
                found: TokenKind::Identifier,
            });
        }
        children.push(final_specifier.into());
    }
    if let Some(base_clause) = base_clause {
        expect_node(&base_clause, SyntaxKind::BaseClause, CONTEXT)?;
        children.push(base_clause.into());
    }
    expect_token(&open_brace, TokenKind::OpenBrace, CONTEXT)?;
    expect_declarations(&members, CONTEXT)?;
    expect_token(&close_brace, TokenKind::CloseBrace, CONTEXT)?;
    children.extend([open_brace.into(), members.into(), close_brace.into()]);
    Ok(GreenNode::new(SyntaxKind::ClassSpecifier, children))
}

pub fn base_clause(colon: SyntaxToken, tokens: Vec<SyntaxToken>) -> Result<GreenNode> {
    const CONTEXT: &str = "base clause";
    expect_token(&colon, TokenKind::Colon, CONTEXT)?;
    expect_nonempty_tokens(&tokens, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::BaseClause,
        vec![colon.into(), syntax_list(tokens).into()],
    ))
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

pub fn attribute_specifier_sequence(specifiers: Vec<GreenNode>) -> Result<GreenNode> {
    for specifier in &specifiers {
        expect_node(
            specifier,
            SyntaxKind::AttributeSpecifier,
            "attribute specifier sequence",
        )?;
    }
    Ok(GreenNode::new(
        SyntaxKind::AttributeSpecifierSequence,
        specifiers.into_iter().map(GreenElement::Node).collect(),
    ))
}

/// `[[ attributes ]]`
pub fn attribute_specifier(
    open_outer: SyntaxToken,
    open_inner: SyntaxToken,
    attributes: GreenNode,
    close_inner: SyntaxToken,
    close_outer: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "attribute specifier";
    expect_token(&open_outer, TokenKind::OpenBracket, CONTEXT)?;
    expect_token(&open_inner, TokenKind::OpenBracket, CONTEXT)?;
    expect_separated(
        &attributes,
        CONTEXT,
        |item| is_node_of(item, |kind| kind == SyntaxKind::Attribute),
        "attribute",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&close_inner, TokenKind::CloseBracket, CONTEXT)?;
    expect_token(&close_outer, TokenKind::CloseBracket, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::AttributeSpecifier,
        vec![
            open_outer.into(),
            open_inner.into(),
            attributes.into(),
            close_inner.into(),
            close_outer.into(),
        ],
    ))
}

/// `ns::Name(arguments)`; namespace and argument clause are optional.
pub fn attribute(
    qualifier: Option<GreenNode>,
    name: SyntaxToken,
    arguments: Option<GreenNode>,
) -> Result<GreenNode> {
    const CONTEXT: &str = "attribute";
    let mut children = Vec::with_capacity(3);
    if let Some(qualifier) = qualifier {
        expect_node(&qualifier, SyntaxKind::NestedNameSpecifier, CONTEXT)?;
        children.push(qualifier.into());
    }
    expect_token(&name, TokenKind::Identifier, CONTEXT)?;
    children.push(name.into());
    if let Some(arguments) = arguments {
        expect_node(&arguments, SyntaxKind::ArgumentClause, CONTEXT)?;
        children.push(arguments.into());
    }
    Ok(GreenNode::new(SyntaxKind::Attribute, children))
}

/// `( tokens )`; the tokens are kept unparsed.
pub fn argument_clause(
    open_paren: SyntaxToken,
    tokens: Vec<SyntaxToken>,
    close_paren: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "argument clause";
    expect_token(&open_paren, TokenKind::OpenParenthesis, CONTEXT)?;
    expect_token(&close_paren, TokenKind::CloseParenthesis, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::ArgumentClause,
        vec![
            open_paren.into(),
            syntax_list(tokens).into(),
            close_paren.into(),
        ],
    ))
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

pub fn simple_identifier(name: SyntaxToken) -> Result<GreenNode> {
    expect_token(&name, TokenKind::Identifier, "simple identifier")?;
    Ok(GreenNode::new(SyntaxKind::SimpleIdentifier, vec![name.into()]))
}

/// `~Name`, the declarator of a destructor.
pub fn destructor_identifier(tilde: SyntaxToken, name: SyntaxToken) -> Result<GreenNode> {
    const CONTEXT: &str = "destructor identifier";
    expect_token(&tilde, TokenKind::Tilde, CONTEXT)?;
    expect_token(&name, TokenKind::Identifier, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::SimpleIdentifier,
        vec![tilde.into(), name.into()],
    ))
}

/// `Name<arguments>`; each argument is any node.
pub fn simple_template_identifier(
    name: SyntaxToken,
    less_than: SyntaxToken,
    arguments: GreenNode,
    greater_than: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "template identifier";
    expect_token(&name, TokenKind::Identifier, CONTEXT)?;
    expect_token(&less_than, TokenKind::LessThan, CONTEXT)?;
    expect_separated(
        &arguments,
        CONTEXT,
        |item| item.as_node().is_some(),
        "template argument",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&greater_than, TokenKind::GreaterThan, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::SimpleTemplateIdentifier,
        vec![
            name.into(),
            less_than.into(),
            arguments.into(),
            greater_than.into(),
        ],
    ))
}

/// `A::B::`: every name is followed by `::`. A leading `::` marks the
/// global namespace.
pub fn nested_name_specifier(global: Option<SyntaxToken>, names: GreenNode) -> Result<GreenNode> {
    const CONTEXT: &str = "nested name specifier";
    let mut children = Vec::with_capacity(2);
    if let Some(global) = global {
        expect_token(&global, TokenKind::DoubleColon, CONTEXT)?;
        children.push(global.into());
    }
    expect_separated(
        &names,
        CONTEXT,
        |item| is_node_of(item, SyntaxKind::is_unqualified_identifier),
        "unqualified identifier",
        TokenKind::DoubleColon,
        SeparatorPolicy::Terminated,
    )?;
    children.push(names.into());
    Ok(GreenNode::new(SyntaxKind::NestedNameSpecifier, children))
}

// ---------------------------------------------------------------------------
// Declarators
// ---------------------------------------------------------------------------

pub fn parameter_list(
    open_paren: SyntaxToken,
    parameters: GreenNode,
    close_paren: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "parameter list";
    expect_token(&open_paren, TokenKind::OpenParenthesis, CONTEXT)?;
    expect_separated(
        &parameters,
        CONTEXT,
        |item| is_node_of(item, |kind| kind == SyntaxKind::Parameter),
        "parameter",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&close_paren, TokenKind::CloseParenthesis, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::ParameterList,
        vec![open_paren.into(), parameters.into(), close_paren.into()],
    ))
}

/// A parameter kept as raw tokens.
pub fn parameter(tokens: Vec<SyntaxToken>) -> Result<GreenNode> {
    expect_nonempty_tokens(&tokens, "parameter")?;
    Ok(GreenNode::new(
        SyntaxKind::Parameter,
        tokens_to_children(tokens),
    ))
}

pub fn initializer_declarator_list(declarators: GreenNode) -> Result<GreenNode> {
    const CONTEXT: &str = "initializer declarator list";
    expect_separated(
        &declarators,
        CONTEXT,
        |item| is_node_of(item, |kind| kind == SyntaxKind::InitializerDeclarator),
        "initializer declarator",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    Ok(GreenNode::new(
        SyntaxKind::InitializerDeclaratorList,
        vec![declarators.into()],
    ))
}

pub fn initializer_declarator(
    declarator: GreenNode,
    initializer: Option<GreenNode>,
) -> Result<GreenNode> {
    const CONTEXT: &str = "initializer declarator";
    expect_node(&declarator, SyntaxKind::SimpleIdentifier, CONTEXT)?;
    let mut children = vec![declarator.into()];
    if let Some(initializer) = initializer {
        expect_node(&initializer, SyntaxKind::ValueEqualInitializer, CONTEXT)?;
        children.push(initializer.into());
    }
    Ok(GreenNode::new(SyntaxKind::InitializerDeclarator, children))
}

pub fn value_equal_initializer(equal: SyntaxToken, value: GreenNode) -> Result<GreenNode> {
    const CONTEXT: &str = "value initializer";
    expect_token(&equal, TokenKind::Equal, CONTEXT)?;
    expect_node_where(&value, SyntaxKind::is_expression, "expression", CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::ValueEqualInitializer,
        vec![equal.into(), value.into()],
    ))
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

pub fn regular_function_body(body: GreenNode) -> Result<GreenNode> {
    expect_node(&body, SyntaxKind::CompoundStatement, "function body")?;
    Ok(GreenNode::new(
        SyntaxKind::RegularFunctionBody,
        vec![body.into()],
    ))
}

pub fn compound_statement(
    open_brace: SyntaxToken,
    statements: GreenNode,
    close_brace: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "compound statement";
    expect_token(&open_brace, TokenKind::OpenBrace, CONTEXT)?;
    expect_node(&statements, SyntaxKind::SyntaxList, CONTEXT)?;
    for child in statements.children() {
        match child {
            GreenElement::Node(node) => {
                expect_node_where(node, SyntaxKind::is_statement, "statement", CONTEXT)?
            }
            GreenElement::Token(token) => {
                return Err(SyntaxError::ExpectedNode {
                    context: CONTEXT,
                    found: token.kind(),
                })
            }
        }
    }
    expect_token(&close_brace, TokenKind::CloseBrace, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::CompoundStatement,
        vec![open_brace.into(), statements.into(), close_brace.into()],
    ))
}

pub fn declaration_statement(declaration: GreenNode) -> Result<GreenNode> {
    expect_node(
        &declaration,
        SyntaxKind::SimpleDeclaration,
        "declaration statement",
    )?;
    Ok(GreenNode::new(
        SyntaxKind::DeclarationStatement,
        vec![declaration.into()],
    ))
}

pub fn expression_statement(expression: GreenNode, semicolon: SyntaxToken) -> Result<GreenNode> {
    const CONTEXT: &str = "expression statement";
    expect_node_where(&expression, SyntaxKind::is_expression, "expression", CONTEXT)?;
    expect_token(&semicolon, TokenKind::Semicolon, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::ExpressionStatement,
        vec![expression.into(), semicolon.into()],
    ))
}

pub fn return_statement(
    return_keyword: SyntaxToken,
    expression: Option<GreenNode>,
    semicolon: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "return statement";
    expect_token(&return_keyword, TokenKind::Return, CONTEXT)?;
    let mut children = vec![return_keyword.into()];
    if let Some(expression) = expression {
        expect_node_where(&expression, SyntaxKind::is_expression, "expression", CONTEXT)?;
        children.push(expression.into());
    }
    expect_token(&semicolon, TokenKind::Semicolon, CONTEXT)?;
    children.push(semicolon.into());
    Ok(GreenNode::new(SyntaxKind::ReturnStatement, children))
}

/// A statement kept as raw tokens.
pub fn opaque_statement(tokens: Vec<SyntaxToken>) -> Result<GreenNode> {
    expect_nonempty_tokens(&tokens, "opaque statement")?;
    Ok(GreenNode::new(
        SyntaxKind::OpaqueStatement,
        tokens_to_children(tokens),
    ))
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

pub fn literal_expression(literal: SyntaxToken) -> Result<GreenNode> {
    expect_token_where(
        &literal,
        TokenKind::is_literal,
        "literal",
        "literal expression",
    )?;
    Ok(GreenNode::new(
        SyntaxKind::LiteralExpression,
        vec![literal.into()],
    ))
}

pub fn identifier_expression(qualifier: Option<GreenNode>, name: GreenNode) -> Result<GreenNode> {
    qualified_name(
        SyntaxKind::IdentifierExpression,
        "identifier expression",
        qualifier,
        name,
    )
}

pub fn invocation_expression(
    callee: GreenNode,
    open_paren: SyntaxToken,
    arguments: GreenNode,
    close_paren: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "invocation expression";
    expect_node_where(&callee, SyntaxKind::is_expression, "expression", CONTEXT)?;
    expect_token(&open_paren, TokenKind::OpenParenthesis, CONTEXT)?;
    expect_separated(
        &arguments,
        CONTEXT,
        |item| is_node_of(item, SyntaxKind::is_expression),
        "expression",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&close_paren, TokenKind::CloseParenthesis, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::InvocationExpression,
        vec![
            callee.into(),
            open_paren.into(),
            arguments.into(),
            close_paren.into(),
        ],
    ))
}

pub fn binary_expression(
    operator: BinaryOperator,
    left: GreenNode,
    operator_token: SyntaxToken,
    right: GreenNode,
) -> Result<GreenNode> {
    const CONTEXT: &str = "binary expression";
    expect_node_where(&left, SyntaxKind::is_expression, "expression", CONTEXT)?;
    expect_token(&operator_token, operator.token_kind(), CONTEXT)?;
    expect_node_where(&right, SyntaxKind::is_expression, "expression", CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::BinaryExpression,
        vec![left.into(), operator_token.into(), right.into()],
    ))
}

/// `[captures](parameters) { body }`
pub fn lambda_expression(
    open_bracket: SyntaxToken,
    captures: GreenNode,
    close_bracket: SyntaxToken,
    parameters: GreenNode,
    body: GreenNode,
) -> Result<GreenNode> {
    const CONTEXT: &str = "lambda expression";
    expect_token(&open_bracket, TokenKind::OpenBracket, CONTEXT)?;
    expect_separated(
        &captures,
        CONTEXT,
        |item| is_node_of(item, |kind| kind == SyntaxKind::LambdaCaptureClause),
        "capture",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&close_bracket, TokenKind::CloseBracket, CONTEXT)?;
    expect_node(&parameters, SyntaxKind::ParameterList, CONTEXT)?;
    expect_node(&body, SyntaxKind::CompoundStatement, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::LambdaExpression,
        vec![
            open_bracket.into(),
            captures.into(),
            close_bracket.into(),
            parameters.into(),
            body.into(),
        ],
    ))
}

/// `&name` captures by reference, `name` by value.
pub fn lambda_capture_clause(
    ampersand: Option<SyntaxToken>,
    name: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "lambda capture";
    let mut children = Vec::with_capacity(2);
    if let Some(ampersand) = ampersand {
        expect_token(&ampersand, TokenKind::Ampersand, CONTEXT)?;
        children.push(ampersand.into());
    }
    expect_token(&name, TokenKind::Identifier, CONTEXT)?;
    children.push(name.into());
    Ok(GreenNode::new(SyntaxKind::LambdaCaptureClause, children))
}

/// `{ a, b }`
pub fn initializer_list(
    open_brace: SyntaxToken,
    values: GreenNode,
    close_brace: SyntaxToken,
) -> Result<GreenNode> {
    const CONTEXT: &str = "initializer list";
    expect_token(&open_brace, TokenKind::OpenBrace, CONTEXT)?;
    expect_separated(
        &values,
        CONTEXT,
        |item| is_node_of(item, SyntaxKind::is_expression),
        "expression",
        TokenKind::Comma,
        SeparatorPolicy::Interleaved,
    )?;
    expect_token(&close_brace, TokenKind::CloseBrace, CONTEXT)?;
    Ok(GreenNode::new(
        SyntaxKind::InitializerList,
        vec![open_brace.into(), values.into(), close_brace.into()],
    ))
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// A copy of `node` with the child at `slot` replaced.
///
/// All other children are shared with the original. The replacement must
/// have the same kind as the element it replaces, which keeps every
/// constructor invariant intact.
pub fn replace_child(
    node: &GreenNode,
    slot: usize,
    replacement: GreenElement,
) -> Result<GreenNode> {
    const CONTEXT: &str = "child replacement";
    let current = node.child(slot).ok_or(SyntaxError::SlotOutOfRange {
        kind: node.kind(),
        slot,
        len: node.children().len(),
    })?;
    match (current, &replacement) {
        (GreenElement::Node(old), GreenElement::Node(new)) => {
            expect_node(new, old.kind(), CONTEXT)?
        }
        (GreenElement::Token(old), GreenElement::Token(new)) => {
            expect_token(new, old.kind(), CONTEXT)?
        }
        (GreenElement::Node(_), GreenElement::Token(token)) => {
            return Err(SyntaxError::ExpectedNode {
                context: CONTEXT,
                found: token.kind(),
            })
        }
        (GreenElement::Token(_), GreenElement::Node(node)) => {
            return Err(SyntaxError::ExpectedToken {
                context: CONTEXT,
                found: node.kind(),
            })
        }
    }

    let mut children = node.children().to_vec();
    children[slot] = replacement;
    Ok(GreenNode::new(node.kind(), children))
}
