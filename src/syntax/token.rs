//! Leaf text units: trivia and tokens.
//!
//! Trivia is opaque text (whitespace, comments, preprocessor lines) attached
//! to a token. Nothing at this layer interprets it; it only has to be carried
//! so that rendering reproduces the input exactly.

use crate::syntax::kind::TokenKind;
use std::fmt;
use std::sync::Arc;

/// A fragment of non-semantic text attached before or after a token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Trivia(Arc<str>);

impl Trivia {
    pub(crate) fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trivia({:?})", self.text())
    }
}

/// An immutable token with its leading and trailing trivia.
///
/// Cloning is cheap; the data is shared behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken(Arc<TokenData>);

#[derive(PartialEq, Eq, Hash)]
struct TokenData {
    kind: TokenKind,
    text: Box<str>,
    leading: Box<[Trivia]>,
    trailing: Box<[Trivia]>,
}

impl SyntaxToken {
    pub(crate) fn new(
        kind: TokenKind,
        text: impl Into<Box<str>>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> Self {
        Self(Arc::new(TokenData {
            kind,
            text: text.into(),
            leading: leading.into_boxed_slice(),
            trailing: trailing.into_boxed_slice(),
        }))
    }

    pub fn kind(&self) -> TokenKind {
        self.0.kind
    }

    /// The significant text, without trivia.
    pub fn text(&self) -> &str {
        &self.0.text
    }

    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.0.leading
    }

    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.0.trailing
    }

    /// Byte length of the rendered token, trivia included.
    pub fn text_len(&self) -> usize {
        let leading: usize = self.0.leading.iter().map(Trivia::len).sum();
        let trailing: usize = self.0.trailing.iter().map(Trivia::len).sum();
        leading + self.0.text.len() + trailing
    }

    /// Whether two handles point at the same token instance.
    pub fn ptr_eq(&self, other: &SyntaxToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Append the rendered token to `out`.
    pub fn write_to(&self, out: &mut String) {
        for trivia in self.leading_trivia() {
            out.push_str(trivia.text());
        }
        out.push_str(self.text());
        for trivia in self.trailing_trivia() {
            out.push_str(trivia.text());
        }
    }

    /// Leading trivia, text, then trailing trivia.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.text_len());
        self.write_to(&mut out);
        out
    }

    /// Copy of this token with different leading trivia.
    pub fn with_leading_trivia(&self, leading: Vec<Trivia>) -> SyntaxToken {
        SyntaxToken::new(
            self.kind(),
            self.text(),
            leading,
            self.trailing_trivia().to_vec(),
        )
    }

    /// Copy of this token with different trailing trivia.
    pub fn with_trailing_trivia(&self, trailing: Vec<Trivia>) -> SyntaxToken {
        SyntaxToken::new(
            self.kind(),
            self.text(),
            self.leading_trivia().to_vec(),
            trailing,
        )
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text())
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for trivia in self.leading_trivia() {
            f.write_str(trivia.text())?;
        }
        f.write_str(self.text())?;
        for trivia in self.trailing_trivia() {
            f.write_str(trivia.text())?;
        }
        Ok(())
    }
}
