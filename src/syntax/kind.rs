//! Token and node kinds for the header syntax tree.

use std::fmt;

/// Kind of a leaf token.
///
/// Keyword and punctuation kinds have a fixed spelling available through
/// [`TokenKind::fixed_text`]; identifier, literal and verbatim kinds carry
/// their text on the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Variable text
    Identifier,
    IntegerLiteral,
    FloatingLiteral,
    StringLiteral,
    CharacterLiteral,
    /// Pre-rendered source text spliced in as a single token.
    Verbatim,
    /// A character the lexer does not recognise.
    Unknown,
    EndOfFile,

    // Keywords
    Auto,
    Bool,
    Char,
    Class,
    Const,
    Constexpr,
    Default,
    Delete,
    Double,
    Enum,
    Explicit,
    Float,
    Friend,
    Inline,
    Int,
    Long,
    Namespace,
    Noexcept,
    Operator,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Signed,
    Static,
    Struct,
    Template,
    Typedef,
    Typename,
    Union,
    Unsigned,
    Using,
    Virtual,
    Void,
    Volatile,

    // Punctuation
    Ampersand,
    AmpersandEqual,
    Arrow,
    Asterisk,
    AsteriskEqual,
    Caret,
    CaretEqual,
    CloseBrace,
    CloseBracket,
    CloseParenthesis,
    Colon,
    Comma,
    Dot,
    DoubleAmpersand,
    DoubleColon,
    DoubleEqual,
    DoubleLessThan,
    DoubleMinus,
    DoublePipe,
    DoublePlus,
    Ellipsis,
    Equal,
    Exclamation,
    ExclamationEqual,
    GreaterThan,
    GreaterThanEqual,
    Hash,
    LessThan,
    LessThanEqual,
    Minus,
    MinusEqual,
    OpenBrace,
    OpenBracket,
    OpenParenthesis,
    Percent,
    PercentEqual,
    Pipe,
    PipeEqual,
    Plus,
    PlusEqual,
    Question,
    Semicolon,
    Slash,
    SlashEqual,
    Tilde,
}

impl TokenKind {
    /// The fixed spelling of keyword and punctuation kinds.
    pub fn fixed_text(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Identifier | IntegerLiteral | FloatingLiteral | StringLiteral | CharacterLiteral
            | Verbatim | Unknown => return None,
            EndOfFile => "",

            Auto => "auto",
            Bool => "bool",
            Char => "char",
            Class => "class",
            Const => "const",
            Constexpr => "constexpr",
            Default => "default",
            Delete => "delete",
            Double => "double",
            Enum => "enum",
            Explicit => "explicit",
            Float => "float",
            Friend => "friend",
            Inline => "inline",
            Int => "int",
            Long => "long",
            Namespace => "namespace",
            Noexcept => "noexcept",
            Operator => "operator",
            Private => "private",
            Protected => "protected",
            Public => "public",
            Return => "return",
            Short => "short",
            Signed => "signed",
            Static => "static",
            Struct => "struct",
            Template => "template",
            Typedef => "typedef",
            Typename => "typename",
            Union => "union",
            Unsigned => "unsigned",
            Using => "using",
            Virtual => "virtual",
            Void => "void",
            Volatile => "volatile",

            Ampersand => "&",
            AmpersandEqual => "&=",
            Arrow => "->",
            Asterisk => "*",
            AsteriskEqual => "*=",
            Caret => "^",
            CaretEqual => "^=",
            CloseBrace => "}",
            CloseBracket => "]",
            CloseParenthesis => ")",
            Colon => ":",
            Comma => ",",
            Dot => ".",
            DoubleAmpersand => "&&",
            DoubleColon => "::",
            DoubleEqual => "==",
            DoubleLessThan => "<<",
            DoubleMinus => "--",
            DoublePipe => "||",
            DoublePlus => "++",
            Ellipsis => "...",
            Equal => "=",
            Exclamation => "!",
            ExclamationEqual => "!=",
            GreaterThan => ">",
            GreaterThanEqual => ">=",
            Hash => "#",
            LessThan => "<",
            LessThanEqual => "<=",
            Minus => "-",
            MinusEqual => "-=",
            OpenBrace => "{",
            OpenBracket => "[",
            OpenParenthesis => "(",
            Percent => "%",
            PercentEqual => "%=",
            Pipe => "|",
            PipeEqual => "|=",
            Plus => "+",
            PlusEqual => "+=",
            Question => "?",
            Semicolon => ";",
            Slash => "/",
            SlashEqual => "/=",
            Tilde => "~",
        };
        Some(text)
    }

    /// Look up the keyword kind for an identifier-shaped word.
    pub fn keyword(word: &str) -> Option<Self> {
        use TokenKind::*;
        let kind = match word {
            "auto" => Auto,
            "bool" => Bool,
            "char" => Char,
            "class" => Class,
            "const" => Const,
            "constexpr" => Constexpr,
            "default" => Default,
            "delete" => Delete,
            "double" => Double,
            "enum" => Enum,
            "explicit" => Explicit,
            "float" => Float,
            "friend" => Friend,
            "inline" => Inline,
            "int" => Int,
            "long" => Long,
            "namespace" => Namespace,
            "noexcept" => Noexcept,
            "operator" => Operator,
            "private" => Private,
            "protected" => Protected,
            "public" => Public,
            "return" => Return,
            "short" => Short,
            "signed" => Signed,
            "static" => Static,
            "struct" => Struct,
            "template" => Template,
            "typedef" => Typedef,
            "typename" => Typename,
            "union" => Union,
            "unsigned" => Unsigned,
            "using" => Using,
            "virtual" => Virtual,
            "void" => Void,
            "volatile" => Volatile,
            _ => return None,
        };
        Some(kind)
    }

    /// Built-in type keywords, usable as a primitive data type specifier.
    pub fn is_primitive_type(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Auto | Bool | Char | Double | Float | Int | Long | Short | Signed | Unsigned | Void
        )
    }

    /// Keywords that may appear among declaration specifiers without naming a type.
    pub fn is_specifier_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Const | Constexpr | Explicit | Friend | Inline | Static | Virtual | Volatile
        )
    }

    pub fn is_class_key(self) -> bool {
        matches!(self, TokenKind::Class | TokenKind::Struct | TokenKind::Union)
    }

    pub fn is_access_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Public | TokenKind::Private | TokenKind::Protected
        )
    }

    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IntegerLiteral | FloatingLiteral | StringLiteral | CharacterLiteral | Verbatim
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_text() {
            Some(text) if !text.is_empty() => write!(f, "'{text}'"),
            _ => write!(f, "{self:?}"),
        }
    }
}

/// Kind of a composite node in the green tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntaxKind {
    // Lists
    /// Ordered children without separators.
    SyntaxList,
    /// Items at even slots, separator tokens at odd slots.
    SeparatedList,

    // Declarations
    TranslationUnit,
    NamespaceDefinition,
    SimpleDeclaration,
    FunctionDefinition,
    AccessSpecifier,
    /// Declaration the grammar does not model, kept as raw tokens.
    OpaqueDeclaration,

    // Specifiers
    DeclarationSpecifierSequence,
    PrimitiveDataTypeSpecifier,
    IdentifierType,
    ClassSpecifier,
    BaseClause,

    // Attributes
    AttributeSpecifierSequence,
    AttributeSpecifier,
    Attribute,
    ArgumentClause,

    // Identifiers
    SimpleIdentifier,
    SimpleTemplateIdentifier,
    NestedNameSpecifier,

    // Declarators
    ParameterList,
    Parameter,
    InitializerDeclaratorList,
    InitializerDeclarator,
    ValueEqualInitializer,

    // Statements
    RegularFunctionBody,
    CompoundStatement,
    DeclarationStatement,
    ExpressionStatement,
    ReturnStatement,
    /// Statement the grammar does not model, kept as raw tokens.
    OpaqueStatement,

    // Expressions
    LiteralExpression,
    IdentifierExpression,
    InvocationExpression,
    BinaryExpression,
    LambdaExpression,
    LambdaCaptureClause,
    InitializerList,
}

impl SyntaxKind {
    pub fn is_expression(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            LiteralExpression
                | IdentifierExpression
                | InvocationExpression
                | BinaryExpression
                | LambdaExpression
                | InitializerList
        )
    }

    pub fn is_statement(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            CompoundStatement
                | DeclarationStatement
                | ExpressionStatement
                | ReturnStatement
                | OpaqueStatement
        )
    }

    pub fn is_declaration(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            NamespaceDefinition
                | SimpleDeclaration
                | FunctionDefinition
                | AccessSpecifier
                | OpaqueDeclaration
        )
    }

    pub fn is_unqualified_identifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::SimpleIdentifier | SyntaxKind::SimpleTemplateIdentifier
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_matches_fixed_text() {
        for word in ["namespace", "class", "struct", "auto", "return", "virtual"] {
            let kind = TokenKind::keyword(word).unwrap();
            assert_eq!(kind.fixed_text(), Some(word));
        }
        assert_eq!(TokenKind::keyword("Fact"), None);
    }

    #[test]
    fn variable_kinds_have_no_fixed_text() {
        assert_eq!(TokenKind::Identifier.fixed_text(), None);
        assert_eq!(TokenKind::Verbatim.fixed_text(), None);
        assert_eq!(TokenKind::EndOfFile.fixed_text(), Some(""));
    }

    #[test]
    fn display_uses_spelling_when_available() {
        assert_eq!(TokenKind::DoubleColon.to_string(), "'::'");
        assert_eq!(TokenKind::Identifier.to_string(), "Identifier");
        assert_eq!(TokenKind::EndOfFile.to_string(), "EndOfFile");
    }
}
