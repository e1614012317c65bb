//! Lossless tokenizer for C++ headers.
//!
//! Every byte of the input ends up either in a token's text or in a trivia
//! fragment. Trivia before a token is leading; whitespace and comments after
//! a token up to and including the end of its line are trailing. Preprocessor
//! lines are leading trivia of the next token. Whatever trivia follows the
//! last token is carried by the end-of-file token.
//!
//! `>>` is always lexed as two `>` tokens so nested template argument lists
//! close correctly; the parser never needs a shift operator.

use crate::syntax::kind::TokenKind;
use crate::syntax::token::{SyntaxToken, Trivia};

/// Split `source` into tokens. The result always ends with an end-of-file
/// token.
pub fn tokenize(source: &str) -> Vec<SyntaxToken> {
    Lexer::new(source).run()
}

/// Punctuation, longest spellings first.
const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("...", TokenKind::Ellipsis),
    ("->", TokenKind::Arrow),
    ("::", TokenKind::DoubleColon),
    ("<<", TokenKind::DoubleLessThan),
    ("<=", TokenKind::LessThanEqual),
    (">=", TokenKind::GreaterThanEqual),
    ("==", TokenKind::DoubleEqual),
    ("!=", TokenKind::ExclamationEqual),
    ("&&", TokenKind::DoubleAmpersand),
    ("||", TokenKind::DoublePipe),
    ("++", TokenKind::DoublePlus),
    ("--", TokenKind::DoubleMinus),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinusEqual),
    ("*=", TokenKind::AsteriskEqual),
    ("/=", TokenKind::SlashEqual),
    ("%=", TokenKind::PercentEqual),
    ("&=", TokenKind::AmpersandEqual),
    ("|=", TokenKind::PipeEqual),
    ("^=", TokenKind::CaretEqual),
    ("&", TokenKind::Ampersand),
    ("*", TokenKind::Asterisk),
    ("^", TokenKind::Caret),
    ("}", TokenKind::CloseBrace),
    ("]", TokenKind::CloseBracket),
    (")", TokenKind::CloseParenthesis),
    (":", TokenKind::Colon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("=", TokenKind::Equal),
    ("!", TokenKind::Exclamation),
    (">", TokenKind::GreaterThan),
    ("#", TokenKind::Hash),
    ("<", TokenKind::LessThan),
    ("-", TokenKind::Minus),
    ("{", TokenKind::OpenBrace),
    ("[", TokenKind::OpenBracket),
    ("(", TokenKind::OpenParenthesis),
    ("%", TokenKind::Percent),
    ("|", TokenKind::Pipe),
    ("+", TokenKind::Plus),
    ("?", TokenKind::Question),
    (";", TokenKind::Semicolon),
    ("/", TokenKind::Slash),
    ("~", TokenKind::Tilde),
];

/// Identifier spellings that prefix a string or character literal.
const ENCODING_PREFIXES: &[&str] = &["L", "u", "U", "u8"];
const RAW_PREFIXES: &[&str] = &["R", "LR", "uR", "UR", "u8R"];

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            at_line_start: true,
        }
    }

    fn run(mut self) -> Vec<SyntaxToken> {
        let mut tokens = Vec::new();
        loop {
            let leading = self.leading_trivia();
            if self.is_at_end() {
                tokens.push(SyntaxToken::new(TokenKind::EndOfFile, "", leading, Vec::new()));
                return tokens;
            }
            let (kind, text) = self.next_token();
            self.at_line_start = false;
            let trailing = self.trailing_trivia();
            tokens.push(SyntaxToken::new(kind, text, leading, trailing));
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.pos]
    }

    // -----------------------------------------------------------------------
    // Trivia
    // -----------------------------------------------------------------------

    fn leading_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            let start = self.pos;
            match self.peek() {
                Some(' ' | '\t' | '\x0b' | '\x0c') => self.take_while(is_horizontal_space),
                Some('\r' | '\n') => {
                    self.newline();
                    self.at_line_start = true;
                }
                Some('/') if self.rest().starts_with("//") => self.line_comment(),
                Some('/') if self.rest().starts_with("/*") => {
                    self.block_comment();
                    self.at_line_start = false;
                }
                Some('#') if self.at_line_start => self.directive(),
                _ => return trivia,
            }
            trivia.push(Trivia::new(self.slice_from(start)));
        }
    }

    /// Same-line whitespace and comments, then at most one newline.
    fn trailing_trivia(&mut self) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        loop {
            let start = self.pos;
            match self.peek() {
                Some(' ' | '\t' | '\x0b' | '\x0c') => self.take_while(is_horizontal_space),
                Some('/') if self.rest().starts_with("//") => self.line_comment(),
                Some('/') if self.rest().starts_with("/*") => self.block_comment(),
                Some('\r' | '\n') => {
                    self.newline();
                    self.at_line_start = true;
                    trivia.push(Trivia::new(self.slice_from(start)));
                    return trivia;
                }
                _ => return trivia,
            }
            trivia.push(Trivia::new(self.slice_from(start)));
        }
    }

    fn newline(&mut self) {
        if self.rest().starts_with("\r\n") {
            self.pos += 2;
        } else {
            self.pos += 1;
        }
    }

    /// Up to, not including, the line break.
    fn line_comment(&mut self) {
        self.take_while(|c| c != '\n' && c != '\r');
    }

    /// An unterminated comment runs to the end of input.
    fn block_comment(&mut self) {
        match self.rest()[2..].find("*/") {
            Some(end) => self.pos += 2 + end + 2,
            None => self.pos = self.source.len(),
        }
    }

    /// A preprocessor line, including backslash continuations.
    fn directive(&mut self) {
        loop {
            self.take_while(|c| c != '\n' && c != '\r' && c != '\\');
            match self.peek() {
                Some('\\') => {
                    self.pos += 1;
                    if matches!(self.peek(), Some('\r' | '\n')) {
                        self.newline();
                    }
                }
                _ => return,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tokens
    // -----------------------------------------------------------------------

    fn next_token(&mut self) -> (TokenKind, &'a str) {
        let start = self.pos;
        let kind = match self.peek() {
            Some(c) if is_identifier_start(c) => self.word(start),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('.') if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
            Some('"') => {
                self.quoted('"');
                TokenKind::StringLiteral
            }
            Some('\'') => {
                self.quoted('\'');
                TokenKind::CharacterLiteral
            }
            _ => self.punctuation(),
        };
        (kind, self.slice_from(start))
    }

    fn word(&mut self, start: usize) -> TokenKind {
        self.take_while(is_identifier_continue);
        let word = self.slice_from(start);
        match self.peek() {
            Some('"') if RAW_PREFIXES.contains(&word) => {
                self.raw_string();
                TokenKind::StringLiteral
            }
            Some('"') if ENCODING_PREFIXES.contains(&word) => {
                self.quoted('"');
                TokenKind::StringLiteral
            }
            Some('\'') if ENCODING_PREFIXES.contains(&word) => {
                self.quoted('\'');
                TokenKind::CharacterLiteral
            }
            _ => TokenKind::keyword(word).unwrap_or(TokenKind::Identifier),
        }
    }

    fn number(&mut self) -> TokenKind {
        let start = self.pos;
        let mut previous = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-') && matches!(previous, 'e' | 'E' | 'p' | 'P');
            if !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '\'' || exponent_sign) {
                break;
            }
            self.pos += 1;
            previous = c;
        }

        let text = self.slice_from(start);
        let hex = text.starts_with("0x") || text.starts_with("0X");
        let floating = text.contains('.')
            || (hex && text.contains(['p', 'P']))
            || (!hex && text.contains(['e', 'E']));
        if floating {
            TokenKind::FloatingLiteral
        } else {
            TokenKind::IntegerLiteral
        }
    }

    /// A quoted literal. An unterminated literal stops at the end of its line.
    fn quoted(&mut self, quote: char) {
        self.pos += 1;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.pos += 1;
                    match self.peek() {
                        Some('\r' | '\n') => self.newline(),
                        Some(_) => {
                            self.bump();
                        }
                        None => return,
                    }
                }
                '\r' | '\n' => return,
                c if c == quote => {
                    self.pos += 1;
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// `R"delim( ... )delim"`; an unterminated raw string runs to the end of input.
    fn raw_string(&mut self) {
        self.pos += 1;
        let Some(open) = self.rest().find(['(', '\n']) else {
            self.pos = self.source.len();
            return;
        };
        if !self.rest()[open..].starts_with('(') {
            self.line_comment();
            return;
        }
        let terminator = format!("){}\"", &self.rest()[..open]);
        self.pos += open + 1;
        match self.rest().find(&terminator) {
            Some(end) => self.pos += end + terminator.len(),
            None => self.pos = self.source.len(),
        }
    }

    fn punctuation(&mut self) -> TokenKind {
        let rest = self.rest();
        for (text, kind) in PUNCTUATION {
            if rest.starts_with(text) {
                self.pos += text.len();
                return *kind;
            }
        }
        self.bump();
        TokenKind::Unknown
    }
}

fn is_horizontal_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0b' | '\x0c')
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(SyntaxToken::kind).collect()
    }

    fn render(tokens: &[SyntaxToken]) -> String {
        tokens.iter().map(SyntaxToken::render).collect()
    }

    #[test]
    fn keywords_identifiers_and_punctuation() {
        assert_eq!(
            kinds("namespace A::B { class C; }"),
            [
                TokenKind::Namespace,
                TokenKind::Identifier,
                TokenKind::DoubleColon,
                TokenKind::Identifier,
                TokenKind::OpenBrace,
                TokenKind::Class,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::CloseBrace,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn trailing_trivia_ends_at_newline() {
        let tokens = tokenize("a; // note\n  b");
        assert_eq!(tokens[1].text(), ";");
        let trailing: Vec<_> = tokens[1].trailing_trivia().iter().map(Trivia::text).collect();
        assert_eq!(trailing, [" ", "// note", "\n"]);
        let leading: Vec<_> = tokens[2].leading_trivia().iter().map(Trivia::text).collect();
        assert_eq!(leading, ["  "]);
    }

    #[test]
    fn directives_are_leading_trivia() {
        let source = "#pragma once\n#define X(a) \\\n  a\nint x;\n";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind(), TokenKind::Int);
        let leading: Vec<_> = tokens[0].leading_trivia().iter().map(Trivia::text).collect();
        assert_eq!(leading, ["#pragma once", "\n", "#define X(a) \\\n  a", "\n"]);
        assert_eq!(render(&tokens), source);
    }

    #[test]
    fn hash_inside_a_line_is_a_token() {
        assert_eq!(
            kinds("a # b"),
            [
                TokenKind::Identifier,
                TokenKind::Hash,
                TokenKind::Identifier,
                TokenKind::EndOfFile
            ]
        );
    }

    #[test]
    fn closing_angles_are_split() {
        assert_eq!(
            kinds("A<B<C>>"),
            [
                TokenKind::Identifier,
                TokenKind::LessThan,
                TokenKind::Identifier,
                TokenKind::LessThan,
                TokenKind::Identifier,
                TokenKind::GreaterThan,
                TokenKind::GreaterThan,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn literals() {
        let tokens = tokenize(r#"1 0x1F 1.5e-3 'c' "a\"b" u8"x" R"(raw " text)""#);
        let kinds: Vec<_> = tokens.iter().map(SyntaxToken::kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::IntegerLiteral,
                TokenKind::IntegerLiteral,
                TokenKind::FloatingLiteral,
                TokenKind::CharacterLiteral,
                TokenKind::StringLiteral,
                TokenKind::StringLiteral,
                TokenKind::StringLiteral,
                TokenKind::EndOfFile,
            ]
        );
        assert_eq!(tokens[4].text(), r#""a\"b""#);
        assert_eq!(tokens[6].text(), r#"R"(raw " text)""#);
    }

    #[test]
    fn unterminated_constructs_stay_lossless() {
        for source in ["\"open string\nnext", "/* open comment", "'x", "R\"d(never", "a\\"] {
            assert_eq!(render(&tokenize(source)), source, "{source:?}");
        }
        let tokens = tokenize("\"open\nx");
        assert_eq!(tokens[0].text(), "\"open");
        assert_eq!(tokens[1].text(), "x");
    }

    #[test]
    fn end_of_file_carries_remaining_trivia() {
        let tokens = tokenize("x;\n\n// trailing comment\n");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind(), TokenKind::EndOfFile);
        assert_eq!(eof.render(), "\n// trailing comment\n");
    }

    #[test]
    fn unknown_characters_become_tokens() {
        let tokens = tokenize("a @ `");
        assert_eq!(tokens[1].kind(), TokenKind::Unknown);
        assert_eq!(tokens[1].text(), "@");
        assert_eq!(tokens[2].text(), "`");
    }

    #[test]
    fn empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind(), TokenKind::EndOfFile);
    }

    #[test]
    fn crlf_line_endings() {
        let source = "a;\r\nb;\r\n";
        let tokens = tokenize(source);
        let trailing: Vec<_> = tokens[1].trailing_trivia().iter().map(Trivia::text).collect();
        assert_eq!(trailing, ["\r\n"]);
        assert_eq!(render(&tokens), source);
    }
}
