//! Depth-first traversal with per-kind hooks.
//!
//! [`SyntaxWalker::walk`] visits a node, then its children left to right.
//! Every hook says explicitly whether the walk descends into the node's
//! children, so an override cannot silently cut off traversal by forgetting
//! to call a default.

use crate::syntax::ast::{
    AstNode, AttributeSpecifier, ClassSpecifier, CompoundStatement, FunctionDefinition,
    NamespaceDefinition,
};
use crate::syntax::kind::SyntaxKind;
use crate::syntax::red::{SyntaxElement, SyntaxNode};
use crate::syntax::token::SyntaxToken;

/// What the walk does after a hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    SkipChildren,
}

pub trait SyntaxWalker {
    type Error;

    fn visit_namespace_definition(
        &mut self,
        _node: &NamespaceDefinition,
    ) -> Result<WalkControl, Self::Error> {
        Ok(WalkControl::Continue)
    }

    fn visit_class_specifier(
        &mut self,
        _node: &ClassSpecifier,
    ) -> Result<WalkControl, Self::Error> {
        Ok(WalkControl::Continue)
    }

    fn visit_function_definition(
        &mut self,
        _node: &FunctionDefinition,
    ) -> Result<WalkControl, Self::Error> {
        Ok(WalkControl::Continue)
    }

    fn visit_attribute_specifier(
        &mut self,
        _node: &AttributeSpecifier,
    ) -> Result<WalkControl, Self::Error> {
        Ok(WalkControl::Continue)
    }

    fn visit_compound_statement(
        &mut self,
        _node: &CompoundStatement,
    ) -> Result<WalkControl, Self::Error> {
        Ok(WalkControl::Continue)
    }

    /// Called for nodes without a dedicated hook.
    fn visit_node(&mut self, _node: &SyntaxNode) -> Result<WalkControl, Self::Error> {
        Ok(WalkControl::Continue)
    }

    fn visit_token(&mut self, _token: &SyntaxToken) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Walk `node` and its subtree in document order.
    fn walk(&mut self, node: &SyntaxNode) -> Result<(), Self::Error>
    where
        Self: Sized,
    {
        if dispatch(self, node)? == WalkControl::SkipChildren {
            return Ok(());
        }
        for child in node.children() {
            match child {
                SyntaxElement::Node(child) => self.walk(&child)?,
                SyntaxElement::Token(token) => self.visit_token(&token)?,
            }
        }
        Ok(())
    }
}

fn dispatch<W: SyntaxWalker>(walker: &mut W, node: &SyntaxNode) -> Result<WalkControl, W::Error> {
    let node = node.clone();
    match node.kind() {
        SyntaxKind::NamespaceDefinition => match NamespaceDefinition::cast(node) {
            Some(view) => walker.visit_namespace_definition(&view),
            None => Ok(WalkControl::Continue),
        },
        SyntaxKind::ClassSpecifier => match ClassSpecifier::cast(node) {
            Some(view) => walker.visit_class_specifier(&view),
            None => Ok(WalkControl::Continue),
        },
        SyntaxKind::FunctionDefinition => match FunctionDefinition::cast(node) {
            Some(view) => walker.visit_function_definition(&view),
            None => Ok(WalkControl::Continue),
        },
        SyntaxKind::AttributeSpecifier => match AttributeSpecifier::cast(node) {
            Some(view) => walker.visit_attribute_specifier(&view),
            None => Ok(WalkControl::Continue),
        },
        SyntaxKind::CompoundStatement => match CompoundStatement::cast(node) {
            Some(view) => walker.visit_compound_statement(&view),
            None => Ok(WalkControl::Continue),
        },
        _ => walker.visit_node(&node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parser::parse;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip_classes: bool,
    }

    impl SyntaxWalker for Recorder {
        type Error = Infallible;

        fn visit_namespace_definition(
            &mut self,
            node: &NamespaceDefinition,
        ) -> Result<WalkControl, Infallible> {
            let names: Vec<_> = node
                .name_identifiers()
                .iter()
                .map(|t| t.text().to_string())
                .collect();
            self.events.push(format!("namespace {}", names.join("::")));
            Ok(WalkControl::Continue)
        }

        fn visit_class_specifier(
            &mut self,
            node: &ClassSpecifier,
        ) -> Result<WalkControl, Infallible> {
            let name = node
                .identifier_token()
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            self.events.push(format!("class {name}"));
            Ok(if self.skip_classes {
                WalkControl::SkipChildren
            } else {
                WalkControl::Continue
            })
        }

        fn visit_function_definition(
            &mut self,
            node: &FunctionDefinition,
        ) -> Result<WalkControl, Infallible> {
            let name = node
                .name()
                .and_then(|n| n.as_simple())
                .map(|s| s.text())
                .unwrap_or_default();
            self.events.push(format!("function {name}"));
            Ok(WalkControl::Continue)
        }
    }

    const SOURCE: &str = "namespace A {\nclass First {\npublic:\n  void One() {}\n  void Two() {}\n};\n}\nnamespace B::C {\nclass Second {\n  void Three() {}\n};\n}\n";

    #[test]
    fn walks_in_document_order() {
        let tree = parse(SOURCE).unwrap();
        let mut recorder = Recorder::default();
        recorder.walk(&tree.root()).unwrap();
        assert_eq!(
            recorder.events,
            [
                "namespace A",
                "class First",
                "function One",
                "function Two",
                "namespace B::C",
                "class Second",
                "function Three",
            ]
        );
    }

    #[test]
    fn skip_children_prunes_subtree() {
        let tree = parse(SOURCE).unwrap();
        let mut recorder = Recorder {
            skip_classes: true,
            ..Default::default()
        };
        recorder.walk(&tree.root()).unwrap();
        assert_eq!(
            recorder.events,
            ["namespace A", "class First", "namespace B::C", "class Second"]
        );
    }

    #[test]
    fn visits_every_token() {
        struct Counter(String);
        impl SyntaxWalker for Counter {
            type Error = Infallible;
            fn visit_token(&mut self, token: &SyntaxToken) -> Result<(), Infallible> {
                token.write_to(&mut self.0);
                Ok(())
            }
        }

        let tree = parse(SOURCE).unwrap();
        let mut counter = Counter(String::new());
        counter.walk(&tree.root()).unwrap();
        assert_eq!(counter.0, SOURCE);
    }

    #[test]
    fn hook_errors_abort_the_walk() {
        struct FailOnClass(usize);
        impl SyntaxWalker for FailOnClass {
            type Error = String;
            fn visit_class_specifier(
                &mut self,
                _node: &ClassSpecifier,
            ) -> Result<WalkControl, String> {
                Err("class".to_string())
            }
            fn visit_function_definition(
                &mut self,
                _node: &FunctionDefinition,
            ) -> Result<WalkControl, String> {
                self.0 += 1;
                Ok(WalkControl::Continue)
            }
        }

        let tree = parse(SOURCE).unwrap();
        let mut walker = FailOnClass(0);
        assert_eq!(walker.walk(&tree.root()), Err("class".to_string()));
        assert_eq!(walker.0, 0);
    }
}
