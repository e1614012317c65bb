//! Lossless syntax trees for C++ headers.
//!
//! The tree has two layers. The green layer ([`GreenNode`], [`SyntaxToken`])
//! is immutable, shareable across threads and holds every byte of the
//! source, whitespace and comments included, as token trivia. The red layer
//! ([`SyntaxNode`]) is built on demand during traversal and adds parent
//! links and slot positions.
//!
//! Nodes are only ever built through [`factory`], which checks the kinds of
//! every child it is given. The [`parser`] uses the same factory, so parsed
//! and synthesized trees obey the same invariants.
//!
//! ```
//! use hdr_testgen::syntax::parse;
//!
//! let source = "namespace A {\n  class B {};\n}\n";
//! let tree = parse(source).unwrap();
//! assert_eq!(tree.render(), source);
//! ```

pub mod ast;
pub mod errors;
pub mod factory;
pub mod green;
pub mod kind;
pub mod lexer;
pub mod parser;
pub mod red;
pub mod token;
pub mod walker;

pub use errors::SyntaxError;
pub use green::{GreenElement, GreenNode, SyntaxTree};
pub use kind::{SyntaxKind, TokenKind};
pub use parser::parse;
pub use red::{SyntaxElement, SyntaxNode};
pub use token::{SyntaxToken, Trivia};
pub use walker::{SyntaxWalker, WalkControl};
