//! Recursive-descent parser for the header subset the generator reads.
//!
//! The grammar covers namespaces, classes, access specifiers, function
//! definitions with attribute sequences, simple declarations and the
//! statement and expression forms test bodies commonly use. Anything else is
//! kept as an opaque declaration or statement, so every input parses and
//! renders back byte for byte.
//!
//! Each structured form is attempted speculatively; a failed attempt rewinds
//! to where it started and the next alternative runs. Class and block bodies
//! are memoized by start position so rewinding never re-parses them.

use crate::syntax::errors::SyntaxError;
use crate::syntax::factory::{self, BinaryOperator, SeparatorPolicy};
use crate::syntax::green::{GreenElement, GreenNode, SyntaxTree};
use crate::syntax::kind::TokenKind;
use crate::syntax::lexer::tokenize;
use crate::syntax::token::SyntaxToken;
use std::collections::HashMap;

/// Parse a header into a syntax tree.
///
/// Unrecognised text never fails; it becomes opaque nodes. An error means a
/// tree construction invariant was violated.
pub fn parse(source: &str) -> Result<SyntaxTree, SyntaxError> {
    let mut parser = Parser::new(tokenize(source));
    let root = parser.translation_unit()?;
    Ok(SyntaxTree::new(root))
}

type Memo = HashMap<usize, Option<(GreenNode, usize)>>;

/// Deepest nesting of bodies and expressions parsed structurally. Anything
/// deeper is kept as opaque tokens.
const MAX_NESTING: usize = 100;

struct Parser {
    tokens: Vec<SyntaxToken>,
    pos: usize,
    depth: usize,
    classes: Memo,
    blocks: Memo,
}

type Attempt = fn(&mut Parser) -> Option<GreenNode>;

impl Parser {
    fn new(tokens: Vec<SyntaxToken>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            classes: HashMap::new(),
            blocks: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::EndOfFile, SyntaxToken::kind)
    }

    fn peek(&self) -> TokenKind {
        self.nth(0)
    }

    /// Take the current token. The end-of-file token is never stepped past.
    fn bump(&mut self) -> SyntaxToken {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        let token = self.tokens[index].clone();
        if token.kind() != TokenKind::EndOfFile {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<SyntaxToken> {
        (self.peek() == kind).then(|| self.bump())
    }

    /// An identifier with special meaning in this position, such as `final`.
    fn at_contextual(&self, text: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.kind() == TokenKind::Identifier && token.text() == text)
    }

    /// Run `parse`, rewinding if it does not match.
    fn attempt<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let start = self.pos;
        let result = parse(self);
        if result.is_none() {
            self.pos = start;
        }
        result
    }

    /// Run `parse` one nesting level deeper, failing past `MAX_NESTING`.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn memoized(
        &mut self,
        select: fn(&mut Self) -> &mut Memo,
        parse: Attempt,
    ) -> Option<GreenNode> {
        let start = self.pos;
        let cached = select(self).get(&start).cloned();
        if let Some(cached) = cached {
            if let Some((_, end)) = &cached {
                self.pos = *end;
            }
            return cached.map(|(node, _)| node);
        }
        let result = self.attempt(parse);
        let entry = result.clone().map(|node| (node, self.pos));
        select(self).insert(start, entry);
        result
    }

    /// Items separated by `separator`, up to but not including `end`.
    fn separated_until(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Option<GreenElement>,
        separator: TokenKind,
        end: TokenKind,
    ) -> Option<GreenNode> {
        let mut items = Vec::new();
        let mut separators = Vec::new();
        if self.peek() != end {
            loop {
                items.push(item(self)?);
                match self.eat(separator) {
                    Some(token) => separators.push(token),
                    None => break,
                }
            }
        }
        factory::separated_list(items, separators, SeparatorPolicy::Interleaved).ok()
    }

    /// Append a bracketed group, nested groups included.
    fn balanced_group(
        &mut self,
        tokens: &mut Vec<SyntaxToken>,
        open: TokenKind,
        close: TokenKind,
    ) -> Option<()> {
        let mut depth = 0usize;
        loop {
            let kind = self.peek();
            if kind == TokenKind::EndOfFile {
                return None;
            }
            tokens.push(self.bump());
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some(());
                }
            }
        }
    }

    /// Tokens of a construct the grammar does not model: up to a `;`, or
    /// through a braced block, never past the brace closing the enclosing
    /// scope. Always takes at least one token unless at end of input.
    fn opaque_tokens(&mut self) -> Vec<SyntaxToken> {
        let mut tokens = Vec::new();
        let mut braces = 0usize;
        let mut parens = 0usize;
        loop {
            let kind = self.peek();
            match kind {
                TokenKind::EndOfFile => break,
                TokenKind::CloseBrace if braces == 0 && !tokens.is_empty() => break,
                _ => {}
            }
            tokens.push(self.bump());
            match kind {
                TokenKind::OpenParenthesis | TokenKind::OpenBracket => parens += 1,
                TokenKind::CloseParenthesis | TokenKind::CloseBracket => {
                    parens = parens.saturating_sub(1)
                }
                TokenKind::OpenBrace => braces += 1,
                TokenKind::CloseBrace => {
                    if braces == 0 {
                        break;
                    }
                    braces -= 1;
                    if braces == 0 && parens == 0 {
                        if let Some(semicolon) = self.eat(TokenKind::Semicolon) {
                            tokens.push(semicolon);
                        }
                        break;
                    }
                }
                TokenKind::Semicolon if braces == 0 && parens == 0 => break,
                _ => {}
            }
        }
        tokens
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    fn translation_unit(&mut self) -> Result<GreenNode, SyntaxError> {
        let declarations = self.declarations(false)?;
        let end_of_file = self.bump();
        factory::translation_unit(factory::syntax_list(declarations), end_of_file)
    }

    /// Declarations up to end of input, or up to the closing brace of a
    /// namespace or class body when `nested`.
    fn declarations(&mut self, nested: bool) -> Result<Vec<GreenNode>, SyntaxError> {
        let mut declarations = Vec::new();
        loop {
            match self.peek() {
                TokenKind::EndOfFile => break,
                TokenKind::CloseBrace if nested => break,
                _ => declarations.push(self.declaration()?),
            }
        }
        Ok(declarations)
    }

    fn declaration(&mut self) -> Result<GreenNode, SyntaxError> {
        let alternatives: [Attempt; 4] = [
            Self::namespace_definition,
            Self::access_specifier,
            Self::function_definition,
            Self::simple_declaration,
        ];
        for parse in alternatives {
            if let Some(node) = self.attempt(parse) {
                return Ok(node);
            }
        }
        let tokens = self.opaque_tokens();
        factory::opaque_declaration(tokens)
    }

    fn namespace_definition(&mut self) -> Option<GreenNode> {
        let inline_keyword = self.eat(TokenKind::Inline);
        let keyword = self.eat(TokenKind::Namespace)?;
        let mut names = Vec::new();
        let mut separators = Vec::new();
        if let Some(first) = self.eat(TokenKind::Identifier) {
            names.push(first.into());
            while self.peek() == TokenKind::DoubleColon && self.nth(1) == TokenKind::Identifier {
                separators.push(self.bump());
                names.push(self.bump().into());
            }
        }
        let names = factory::separated_list(names, separators, SeparatorPolicy::Interleaved).ok()?;
        let open = self.eat(TokenKind::OpenBrace)?;
        let body = self.nested(|parser| parser.declarations(true).ok())?;
        let close = self.eat(TokenKind::CloseBrace)?;
        factory::namespace_definition(
            inline_keyword,
            keyword,
            names,
            open,
            factory::syntax_list(body),
            close,
        )
        .ok()
    }

    fn access_specifier(&mut self) -> Option<GreenNode> {
        if !self.peek().is_access_keyword() {
            return None;
        }
        let keyword = self.bump();
        let colon = self.eat(TokenKind::Colon)?;
        factory::access_specifier(keyword, colon).ok()
    }

    fn function_definition(&mut self) -> Option<GreenNode> {
        let attributes = self.attribute_specifier_sequence()?;
        let specifiers = self.declaration_specifiers()?;
        let (qualifier, name) = self.qualified_name()?;
        let declarator = factory::identifier_expression(qualifier, name).ok()?;
        if self.peek() != TokenKind::OpenParenthesis {
            return None;
        }
        let parameters = self.parameter_list()?;
        let trailing = self.function_trailing()?;
        let body = factory::regular_function_body(self.compound_statement()?).ok()?;
        factory::function_definition(
            attributes,
            specifiers,
            declarator,
            parameters,
            factory::syntax_list(trailing),
            body,
        )
        .ok()
    }

    /// Qualifiers, `override`, constructor initializers: everything between
    /// the parameter list and the body.
    fn function_trailing(&mut self) -> Option<Vec<SyntaxToken>> {
        let mut tokens: Vec<SyntaxToken> = Vec::new();
        let mut in_initializers = false;
        loop {
            match self.peek() {
                TokenKind::OpenBrace => {
                    let braced_initializer = in_initializers
                        && matches!(
                            tokens.last().map(SyntaxToken::kind),
                            Some(TokenKind::Identifier | TokenKind::GreaterThan)
                        );
                    if !braced_initializer {
                        return Some(tokens);
                    }
                    self.balanced_group(&mut tokens, TokenKind::OpenBrace, TokenKind::CloseBrace)?;
                }
                TokenKind::OpenParenthesis => self.balanced_group(
                    &mut tokens,
                    TokenKind::OpenParenthesis,
                    TokenKind::CloseParenthesis,
                )?,
                TokenKind::Colon => {
                    in_initializers = true;
                    tokens.push(self.bump());
                }
                TokenKind::EndOfFile
                | TokenKind::Semicolon
                | TokenKind::CloseBrace
                | TokenKind::Equal => return None,
                _ => tokens.push(self.bump()),
            }
        }
    }

    fn simple_declaration(&mut self) -> Option<GreenNode> {
        let specifiers = self.declaration_specifiers()?;
        if specifiers.children().is_empty() {
            return None;
        }
        let declarators = self.separated_until(
            Self::initializer_declarator,
            TokenKind::Comma,
            TokenKind::Semicolon,
        )?;
        let semicolon = self.eat(TokenKind::Semicolon)?;
        let declarators = factory::initializer_declarator_list(declarators).ok()?;
        factory::simple_declaration(specifiers, declarators, semicolon).ok()
    }

    fn initializer_declarator(&mut self) -> Option<GreenElement> {
        let name = factory::simple_identifier(self.eat(TokenKind::Identifier)?).ok()?;
        let initializer = match self.eat(TokenKind::Equal) {
            Some(equal) => Some(factory::value_equal_initializer(equal, self.expression()?).ok()?),
            None => None,
        };
        factory::initializer_declarator(name, initializer)
            .ok()
            .map(Into::into)
    }

    // -----------------------------------------------------------------------
    // Specifiers
    // -----------------------------------------------------------------------

    fn declaration_specifiers(&mut self) -> Option<GreenNode> {
        let mut specifiers: Vec<GreenElement> = Vec::new();
        let mut has_type = false;
        loop {
            let kind = self.peek();
            if kind.is_specifier_keyword() || kind == TokenKind::Typename {
                specifiers.push(self.bump().into());
            } else if has_type
                && matches!(
                    kind,
                    TokenKind::Asterisk | TokenKind::Ampersand | TokenKind::DoubleAmpersand
                )
            {
                specifiers.push(self.bump().into());
            } else if kind.is_primitive_type() {
                let primitive = factory::primitive_data_type_specifier(self.bump()).ok()?;
                specifiers.push(primitive.into());
                has_type = true;
            } else if kind.is_class_key() && !has_type {
                match self.memoized(|parser| &mut parser.classes, Self::class_specifier) {
                    Some(class) => {
                        specifiers.push(class.into());
                        has_type = true;
                    }
                    None => break,
                }
            } else if !has_type && matches!(kind, TokenKind::Identifier | TokenKind::DoubleColon) {
                // A name directly followed by `(` is the declarator, not a type.
                let start = self.pos;
                match self.identifier_type() {
                    Some(ty) if self.peek() != TokenKind::OpenParenthesis => {
                        specifiers.push(ty.into());
                        has_type = true;
                    }
                    _ => {
                        self.pos = start;
                        break;
                    }
                }
            } else {
                break;
            }
        }
        factory::declaration_specifier_sequence(specifiers).ok()
    }

    fn identifier_type(&mut self) -> Option<GreenNode> {
        let (qualifier, name) = self.qualified_name()?;
        factory::identifier_type(qualifier, name).ok()
    }

    fn class_specifier(&mut self) -> Option<GreenNode> {
        if !self.peek().is_class_key() {
            return None;
        }
        let class_key = self.bump();
        let attributes = self.attribute_specifier_sequence()?;
        let attributes = (!attributes.children().is_empty()).then_some(attributes);
        let name = self.eat(TokenKind::Identifier);
        let final_specifier =
            (name.is_some() && self.at_contextual("final")).then(|| self.bump());
        let base_clause = match self.eat(TokenKind::Colon) {
            Some(colon) => {
                let mut tokens = Vec::new();
                loop {
                    match self.peek() {
                        TokenKind::OpenBrace => break,
                        TokenKind::EndOfFile | TokenKind::Semicolon | TokenKind::CloseBrace => {
                            return None
                        }
                        _ => tokens.push(self.bump()),
                    }
                }
                Some(factory::base_clause(colon, tokens).ok()?)
            }
            None => None,
        };
        let open = self.eat(TokenKind::OpenBrace)?;
        let members = self.nested(|parser| parser.declarations(true).ok())?;
        let close = self.eat(TokenKind::CloseBrace)?;
        factory::class_specifier(
            class_key,
            attributes,
            name,
            final_specifier,
            base_clause,
            open,
            factory::syntax_list(members),
            close,
        )
        .ok()
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    fn attribute_specifier_sequence(&mut self) -> Option<GreenNode> {
        let mut specifiers = Vec::new();
        while self.peek() == TokenKind::OpenBracket && self.nth(1) == TokenKind::OpenBracket {
            specifiers.push(self.attribute_specifier()?);
        }
        factory::attribute_specifier_sequence(specifiers).ok()
    }

    fn attribute_specifier(&mut self) -> Option<GreenNode> {
        let open_outer = self.eat(TokenKind::OpenBracket)?;
        let open_inner = self.eat(TokenKind::OpenBracket)?;
        let attributes =
            self.separated_until(Self::attribute, TokenKind::Comma, TokenKind::CloseBracket)?;
        let close_inner = self.eat(TokenKind::CloseBracket)?;
        let close_outer = self.eat(TokenKind::CloseBracket)?;
        factory::attribute_specifier(open_outer, open_inner, attributes, close_inner, close_outer)
            .ok()
    }

    fn attribute(&mut self) -> Option<GreenElement> {
        let mut names = Vec::new();
        let mut separators = Vec::new();
        while self.peek() == TokenKind::Identifier && self.nth(1) == TokenKind::DoubleColon {
            names.push(factory::simple_identifier(self.bump()).ok()?.into());
            separators.push(self.bump());
        }
        let qualifier = if names.is_empty() {
            None
        } else {
            let names =
                factory::separated_list(names, separators, SeparatorPolicy::Terminated).ok()?;
            Some(factory::nested_name_specifier(None, names).ok()?)
        };
        let name = self.eat(TokenKind::Identifier)?;
        let arguments = match self.eat(TokenKind::OpenParenthesis) {
            Some(open) => {
                let mut tokens = Vec::new();
                let mut depth = 0usize;
                loop {
                    match self.peek() {
                        TokenKind::EndOfFile => return None,
                        TokenKind::OpenParenthesis => depth += 1,
                        TokenKind::CloseParenthesis if depth == 0 => break,
                        TokenKind::CloseParenthesis => depth -= 1,
                        _ => {}
                    }
                    tokens.push(self.bump());
                }
                let close = self.bump();
                Some(factory::argument_clause(open, tokens, close).ok()?)
            }
            None => None,
        };
        factory::attribute(qualifier, name, arguments)
            .ok()
            .map(Into::into)
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    /// `::A::B<C>::name`, split into the qualifier and the final name.
    fn qualified_name(&mut self) -> Option<(Option<GreenNode>, GreenNode)> {
        let global = self.eat(TokenKind::DoubleColon);
        let mut names = Vec::new();
        let mut separators = Vec::new();
        loop {
            let name = self.unqualified_name()?;
            if self.peek() == TokenKind::DoubleColon
                && matches!(self.nth(1), TokenKind::Identifier | TokenKind::Tilde)
            {
                names.push(name.into());
                separators.push(self.bump());
                continue;
            }
            let qualifier = if global.is_some() || !names.is_empty() {
                let names =
                    factory::separated_list(names, separators, SeparatorPolicy::Terminated).ok()?;
                Some(factory::nested_name_specifier(global, names).ok()?)
            } else {
                None
            };
            return Some((qualifier, name));
        }
    }

    fn unqualified_name(&mut self) -> Option<GreenNode> {
        match self.peek() {
            TokenKind::Tilde if self.nth(1) == TokenKind::Identifier => {
                let tilde = self.bump();
                let name = self.bump();
                factory::destructor_identifier(tilde, name).ok()
            }
            TokenKind::Identifier => {
                let name = self.bump();
                if self.peek() == TokenKind::LessThan {
                    let template = self.attempt(|parser| {
                        parser.nested(|parser| parser.template_arguments(name.clone()))
                    });
                    if template.is_some() {
                        return template;
                    }
                }
                factory::simple_identifier(name).ok()
            }
            _ => None,
        }
    }

    fn template_arguments(&mut self, name: SyntaxToken) -> Option<GreenNode> {
        let less_than = self.eat(TokenKind::LessThan)?;
        let arguments = self.separated_until(
            Self::template_argument,
            TokenKind::Comma,
            TokenKind::GreaterThan,
        )?;
        let greater_than = self.eat(TokenKind::GreaterThan)?;
        factory::simple_template_identifier(name, less_than, arguments, greater_than).ok()
    }

    fn template_argument(&mut self) -> Option<GreenElement> {
        if self.peek().is_literal() {
            return factory::literal_expression(self.bump()).ok().map(Into::into);
        }
        let specifiers = self.declaration_specifiers()?;
        if specifiers.children().is_empty() {
            return None;
        }
        Some(specifiers.into())
    }

    fn parameter_list(&mut self) -> Option<GreenNode> {
        let open = self.eat(TokenKind::OpenParenthesis)?;
        let parameters = self.separated_until(
            Self::parameter,
            TokenKind::Comma,
            TokenKind::CloseParenthesis,
        )?;
        let close = self.eat(TokenKind::CloseParenthesis)?;
        factory::parameter_list(open, parameters, close).ok()
    }

    fn parameter(&mut self) -> Option<GreenElement> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        let mut angles = 0usize;
        loop {
            match self.peek() {
                TokenKind::EndOfFile | TokenKind::Semicolon => return None,
                TokenKind::CloseParenthesis if depth == 0 => break,
                TokenKind::Comma if depth == 0 && angles == 0 => break,
                TokenKind::OpenParenthesis | TokenKind::OpenBracket | TokenKind::OpenBrace => {
                    depth += 1
                }
                TokenKind::CloseParenthesis | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                    depth = depth.checked_sub(1)?
                }
                TokenKind::LessThan => angles += 1,
                TokenKind::GreaterThan => angles = angles.saturating_sub(1),
                _ => {}
            }
            tokens.push(self.bump());
        }
        factory::parameter(tokens).ok().map(Into::into)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn compound_statement(&mut self) -> Option<GreenNode> {
        self.nested(|parser| parser.memoized(|parser| &mut parser.blocks, Self::block))
    }

    fn block(&mut self) -> Option<GreenNode> {
        let open = self.eat(TokenKind::OpenBrace)?;
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                TokenKind::CloseBrace => break,
                TokenKind::EndOfFile => return None,
                _ => statements.push(self.statement()?),
            }
        }
        let close = self.bump();
        factory::compound_statement(open, factory::syntax_list(statements), close).ok()
    }

    fn statement(&mut self) -> Option<GreenNode> {
        let alternatives: [Attempt; 4] = [
            Self::compound_statement,
            Self::return_statement,
            Self::declaration_statement,
            Self::expression_statement,
        ];
        for parse in alternatives {
            if let Some(node) = self.attempt(parse) {
                return Some(node);
            }
        }
        let tokens = self.opaque_tokens();
        factory::opaque_statement(tokens).ok()
    }

    fn return_statement(&mut self) -> Option<GreenNode> {
        let keyword = self.eat(TokenKind::Return)?;
        let expression = if self.peek() == TokenKind::Semicolon {
            None
        } else {
            Some(self.expression()?)
        };
        let semicolon = self.eat(TokenKind::Semicolon)?;
        factory::return_statement(keyword, expression, semicolon).ok()
    }

    fn declaration_statement(&mut self) -> Option<GreenNode> {
        let declaration = self.simple_declaration()?;
        factory::declaration_statement(declaration).ok()
    }

    fn expression_statement(&mut self) -> Option<GreenNode> {
        let expression = self.expression()?;
        let semicolon = self.eat(TokenKind::Semicolon)?;
        factory::expression_statement(expression, semicolon).ok()
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn expression(&mut self) -> Option<GreenNode> {
        self.nested(|parser| parser.binary(0))
    }

    /// Precedence climbing over the binary operators the tree models.
    fn binary(&mut self, min_precedence: u8) -> Option<GreenNode> {
        let mut left = self.postfix()?;
        while let Some((operator, precedence, right_associative)) = binary_operator(self.peek()) {
            if precedence < min_precedence {
                break;
            }
            let token = self.bump();
            let next = if right_associative {
                precedence
            } else {
                precedence + 1
            };
            let right = self.nested(|parser| parser.binary(next))?;
            left = factory::binary_expression(operator, left, token, right).ok()?;
        }
        Some(left)
    }

    fn postfix(&mut self) -> Option<GreenNode> {
        let mut expression = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::OpenParenthesis => {
                    let open = self.bump();
                    let arguments = self.separated_until(
                        |parser| parser.expression().map(Into::into),
                        TokenKind::Comma,
                        TokenKind::CloseParenthesis,
                    )?;
                    let close = self.eat(TokenKind::CloseParenthesis)?;
                    expression =
                        factory::invocation_expression(expression, open, arguments, close).ok()?;
                }
                TokenKind::Arrow | TokenKind::Dot => {
                    let operator = if self.peek() == TokenKind::Arrow {
                        BinaryOperator::MemberOfPointer
                    } else {
                        BinaryOperator::MemberOfObject
                    };
                    let token = self.bump();
                    let (qualifier, name) = self.qualified_name()?;
                    let member = factory::identifier_expression(qualifier, name).ok()?;
                    expression =
                        factory::binary_expression(operator, expression, token, member).ok()?;
                }
                _ => return Some(expression),
            }
        }
    }

    fn primary(&mut self) -> Option<GreenNode> {
        match self.peek() {
            kind if kind.is_literal() => factory::literal_expression(self.bump()).ok(),
            TokenKind::Identifier | TokenKind::DoubleColon | TokenKind::Tilde => {
                let (qualifier, name) = self.qualified_name()?;
                factory::identifier_expression(qualifier, name).ok()
            }
            TokenKind::OpenBracket => self.lambda_expression(),
            TokenKind::OpenBrace => self.initializer_list(),
            _ => None,
        }
    }

    fn lambda_expression(&mut self) -> Option<GreenNode> {
        let open = self.eat(TokenKind::OpenBracket)?;
        let captures = self.separated_until(
            Self::lambda_capture,
            TokenKind::Comma,
            TokenKind::CloseBracket,
        )?;
        let close = self.eat(TokenKind::CloseBracket)?;
        let parameters = self.parameter_list()?;
        let body = self.compound_statement()?;
        factory::lambda_expression(open, captures, close, parameters, body).ok()
    }

    fn lambda_capture(&mut self) -> Option<GreenElement> {
        let ampersand = self.eat(TokenKind::Ampersand);
        let name = self.eat(TokenKind::Identifier)?;
        factory::lambda_capture_clause(ampersand, name)
            .ok()
            .map(Into::into)
    }

    fn initializer_list(&mut self) -> Option<GreenNode> {
        let open = self.eat(TokenKind::OpenBrace)?;
        let values = self.separated_until(
            |parser| parser.expression().map(Into::into),
            TokenKind::Comma,
            TokenKind::CloseBrace,
        )?;
        let close = self.eat(TokenKind::CloseBrace)?;
        factory::initializer_list(open, values, close).ok()
    }
}

/// Operator, precedence and associativity for a binary operator token.
fn binary_operator(kind: TokenKind) -> Option<(BinaryOperator, u8, bool)> {
    let entry = match kind {
        TokenKind::Equal => (BinaryOperator::Assignment, 1, true),
        TokenKind::PlusEqual => (BinaryOperator::AdditionAssignment, 1, true),
        TokenKind::MinusEqual => (BinaryOperator::SubtractionAssignment, 1, true),
        TokenKind::DoublePipe => (BinaryOperator::LogicalOr, 2, false),
        TokenKind::DoubleAmpersand => (BinaryOperator::LogicalAnd, 3, false),
        TokenKind::DoubleEqual => (BinaryOperator::Equals, 4, false),
        TokenKind::ExclamationEqual => (BinaryOperator::NotEquals, 4, false),
        TokenKind::LessThan => (BinaryOperator::LessThan, 5, false),
        TokenKind::Plus => (BinaryOperator::Addition, 6, false),
        TokenKind::Minus => (BinaryOperator::Subtraction, 6, false),
        _ => return None,
    };
    Some(entry)
}
