use crate::syntax::factory::SeparatorPolicy;
use crate::syntax::kind::{SyntaxKind, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("separated list with {items} items cannot have {separators} separators ({policy:?})")]
    SeparatorMismatch {
        items: usize,
        separators: usize,
        policy: SeparatorPolicy,
    },

    #[error("token kind {0} has no fixed spelling")]
    NoFixedText(TokenKind),

    #[error("token text {text:?} is not valid for {kind}")]
    InvalidTokenText { kind: TokenKind, text: String },

    #[error("{context}: expected token {expected}, found {found}")]
    UnexpectedToken {
        context: &'static str,
        expected: String,
        found: TokenKind,
    },

    #[error("{context}: expected {expected} node, found {found}")]
    UnexpectedNode {
        context: &'static str,
        expected: String,
        found: SyntaxKind,
    },

    #[error("{context}: expected a node, found token {found}")]
    ExpectedNode {
        context: &'static str,
        found: TokenKind,
    },

    #[error("{context}: expected a token, found {found} node")]
    ExpectedToken {
        context: &'static str,
        found: SyntaxKind,
    },

    #[error("{context} must not be empty")]
    Empty { context: &'static str },

    #[error("slot {slot} is out of range for {kind} with {len} children")]
    SlotOutOfRange {
        kind: SyntaxKind,
        slot: usize,
        len: usize,
    },

    #[error("not a {expected} node: found {found}")]
    WrongKind {
        expected: &'static str,
        found: SyntaxKind,
    },
}
