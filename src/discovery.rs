//! Attribute-driven test discovery.
//!
//! A function definition is a test when one of its `[[...]]` groups holds a
//! single attribute named `Fact` or `Theory`. Tests are grouped by the simple
//! name of their enclosing class, in document order. Each `[[InlineData(...)]]`
//! group on a theory contributes one argument list, kept as source text.

use crate::syntax::ast::{AstNode, ClassSpecifier, FunctionDefinition, NamespaceDefinition};
use crate::syntax::walker::{SyntaxWalker, WalkControl};
use crate::syntax::SyntaxTree;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

const FACT: &str = "Fact";
const THEORY: &str = "Theory";
const INLINE_DATA: &str = "InlineData";

/// A test method and, for theories, the argument lists it runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMethod {
    pub name: String,
    pub is_theory: bool,
    pub theories: Vec<String>,
}

/// A class holding at least one test method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestClass {
    pub name: String,
    /// Enclosing namespace names, outermost first.
    pub qualifiers: Vec<String>,
    pub methods: Vec<TestMethod>,
}

impl TestClass {
    /// `Outer::Inner::Name`
    pub fn qualified_name(&self) -> String {
        self.qualifiers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join("::")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("test method '{method}' is declared in an unnamed class")]
    MissingClassName { method: String },

    #[error("test method '{method}' is not declared inside a class")]
    NoEnclosingClass { method: String },

    #[error("test method name '{name}' is not a simple identifier")]
    UnsupportedMethodName { name: String },
}

/// A problem that skips one theory case but not the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryWarning {
    MissingInlineDataArguments { class: String, method: String },
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryWarning::MissingInlineDataArguments { class, method } => write!(
                f,
                "{class}::{method}: InlineData must have arguments, entry skipped"
            ),
        }
    }
}

/// What discovery found in one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub classes: Vec<TestClass>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl DiscoveryReport {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn test_count(&self) -> usize {
        self.classes
            .iter()
            .flat_map(|class| &class.methods)
            .map(|method| {
                if method.is_theory {
                    method.theories.len()
                } else {
                    1
                }
            })
            .sum()
    }
}

/// Discover the tests in a parsed header.
pub fn discover(tree: &SyntaxTree) -> Result<DiscoveryReport, DiscoveryError> {
    let mut discovery = TestDiscovery::default();
    discovery.walk(&tree.root())?;
    Ok(discovery.into_report())
}

/// Walker that collects test classes as it meets their methods.
#[derive(Debug, Default)]
pub struct TestDiscovery {
    classes: IndexMap<String, TestClass>,
    warnings: Vec<DiscoveryWarning>,
}

impl TestDiscovery {
    pub fn classes(&self) -> impl Iterator<Item = &TestClass> {
        self.classes.values()
    }

    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    pub fn into_report(self) -> DiscoveryReport {
        DiscoveryReport {
            classes: self.classes.into_values().collect(),
            warnings: self.warnings,
        }
    }

    fn add_test_method(
        &mut self,
        function: &FunctionDefinition,
        is_theory: bool,
    ) -> Result<(), DiscoveryError> {
        let declarator = function
            .name()
            .map(|name| name.render().trim().to_string())
            .unwrap_or_default();

        let class = function
            .syntax()
            .ancestors()
            .find_map(ClassSpecifier::cast)
            .ok_or_else(|| DiscoveryError::NoEnclosingClass {
                method: declarator.clone(),
            })?;
        let class_name = class
            .identifier_token()
            .map(|token| token.text().to_string())
            .ok_or_else(|| DiscoveryError::MissingClassName {
                method: declarator.clone(),
            })?;

        let method_name = function
            .name()
            .and_then(|name| name.as_simple())
            .map(|name| name.text())
            .ok_or(DiscoveryError::UnsupportedMethodName { name: declarator })?;

        let theories = if is_theory {
            self.theories(function, &class_name, &method_name)
        } else {
            Vec::new()
        };

        debug!(
            class = %class_name,
            method = %method_name,
            is_theory,
            cases = theories.len(),
            "discovered test"
        );

        let entry = self
            .classes
            .entry(class_name.clone())
            .or_insert_with(|| TestClass {
                name: class_name,
                qualifiers: containing_qualifiers(&class),
                methods: Vec::new(),
            });
        entry.methods.push(TestMethod {
            name: method_name,
            is_theory,
            theories,
        });
        Ok(())
    }

    fn theories(
        &mut self,
        function: &FunctionDefinition,
        class_name: &str,
        method_name: &str,
    ) -> Vec<String> {
        let mut theories = Vec::new();
        let Some(attributes) = function.attributes() else {
            return theories;
        };
        for specifier in attributes.specifiers() {
            let Some(attribute) = specifier.single_attribute() else {
                continue;
            };
            if attribute.name().as_deref() != Some(INLINE_DATA) {
                continue;
            }
            match attribute.argument_clause() {
                Some(arguments) => theories.push(arguments.render_arguments()),
                None => {
                    warn!(
                        class = %class_name,
                        method = %method_name,
                        "InlineData without arguments, skipping entry"
                    );
                    self.warnings
                        .push(DiscoveryWarning::MissingInlineDataArguments {
                            class: class_name.to_string(),
                            method: method_name.to_string(),
                        });
                }
            }
        }
        theories
    }
}

impl SyntaxWalker for TestDiscovery {
    type Error = DiscoveryError;

    fn visit_function_definition(
        &mut self,
        node: &FunctionDefinition,
    ) -> Result<WalkControl, DiscoveryError> {
        if has_marker(node, FACT) {
            self.add_test_method(node, false)?;
        } else if has_marker(node, THEORY) {
            self.add_test_method(node, true)?;
        }
        Ok(WalkControl::Continue)
    }
}

/// Whether some attribute group holds exactly one attribute, named `marker`.
fn has_marker(function: &FunctionDefinition, marker: &str) -> bool {
    function.attributes().is_some_and(|attributes| {
        attributes.specifiers().any(|specifier| {
            specifier
                .single_attribute()
                .and_then(|attribute| attribute.name())
                .is_some_and(|name| name == marker)
        })
    })
}

/// Names of the namespaces around `class`, outermost first.
///
/// Collected innermost first while walking up, then reversed group by group
/// so `namespace A::B { namespace C {` yields `A, B, C`.
fn containing_qualifiers(class: &ClassSpecifier) -> Vec<String> {
    let mut groups: Vec<Vec<String>> = class
        .syntax()
        .ancestors()
        .filter_map(NamespaceDefinition::cast)
        .map(|namespace| {
            namespace
                .name_identifiers()
                .iter()
                .map(|token| token.text().to_string())
                .collect()
        })
        .collect();
    groups.reverse();
    groups.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn run(source: &str) -> Result<DiscoveryReport, DiscoveryError> {
        discover(&parse(source).unwrap())
    }

    #[test]
    fn test_finds_facts_with_qualifiers() {
        let report = run(
            "namespace Sample::UnitTests\n{\n\tclass MyClassUnitTests\n\t{\n\tpublic:\n\t\t[[Fact]]\n\t\tvoid DoWork_Success()\n\t\t{\n\t\t}\n\n\t\tvoid Helper() {}\n\t};\n}\n",
        )
        .unwrap();
        assert_eq!(
            report.classes,
            [TestClass {
                name: "MyClassUnitTests".to_string(),
                qualifiers: vec!["Sample".to_string(), "UnitTests".to_string()],
                methods: vec![TestMethod {
                    name: "DoWork_Success".to_string(),
                    is_theory: false,
                    theories: vec![],
                }],
            }]
        );
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_nested_namespaces_are_outer_to_inner() {
        let report =
            run("namespace A::B { namespace C { class T { [[Fact]] void M() {} }; } }").unwrap();
        assert_eq!(report.classes[0].qualifiers, ["A", "B", "C"]);
        assert_eq!(report.classes[0].qualified_name(), "A::B::C::T");
    }

    fn test_names(report: &DiscoveryReport) -> Vec<String> {
        report
            .classes
            .iter()
            .flat_map(|class| {
                class
                    .methods
                    .iter()
                    .map(move |method| format!("{}::{}", class.qualified_name(), method.name))
            })
            .collect()
    }

    #[test]
    fn test_final_class() {
        let report = run("class X final { public: [[Fact]] void A() {} };").unwrap();
        assert_eq!(test_names(&report), ["X::A"]);

        let report =
            run("class Y final : public Base<int> { public: [[Fact]] void B() {} };").unwrap();
        assert_eq!(test_names(&report), ["Y::B"]);
    }

    #[test]
    fn test_attributed_class() {
        let report = run("class [[nodiscard]] X { public: [[Fact]] void A() {} };").unwrap();
        assert_eq!(test_names(&report), ["X::A"]);

        let report = run("struct [[deprecated(\"old\")]] Z final { [[Fact]] void C() {} };")
            .unwrap();
        assert_eq!(test_names(&report), ["Z::C"]);
    }

    #[test]
    fn test_inline_namespace() {
        let report =
            run("namespace N { inline namespace V { class X { [[Fact]] void A() {} }; } }")
                .unwrap();
        assert_eq!(test_names(&report), ["N::V::X::A"]);
    }

    #[test]
    fn test_theory_cases_in_order() {
        let report = run(
            "class T {\n  [[Theory]]\n  [[InlineData(1, \"a\")]]\n  [[InlineData(2, \"b\")]]\n  void Check(int x, const char* s) {}\n};\n",
        )
        .unwrap();
        let method = &report.classes[0].methods[0];
        assert!(method.is_theory);
        assert_eq!(method.theories, ["1, \"a\"", "2, \"b\""]);
        assert_eq!(report.test_count(), 2);
    }

    #[test]
    fn test_missing_inline_data_arguments_is_skipped() {
        let report = run(
            "class T {\n  [[Theory]]\n  [[InlineData]]\n  [[InlineData(3)]]\n  void Check(int x) {}\n};\n",
        )
        .unwrap();
        assert_eq!(report.classes[0].methods[0].theories, ["3"]);
        assert_eq!(
            report.warnings,
            [DiscoveryWarning::MissingInlineDataArguments {
                class: "T".to_string(),
                method: "Check".to_string(),
            }]
        );
    }

    #[test]
    fn test_only_single_attribute_groups_count() {
        let report = run(
            "class T {\n  [[Fact, Other]] void A() {}\n  [[Other]] [[Fact]] void B() {}\n  [[xunit::Fact]] void C() {}\n};\n",
        )
        .unwrap();
        let names: Vec<_> = report.classes[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["B", "C"]);
    }

    #[test]
    fn test_fact_wins_over_theory() {
        let report = run("class T { [[Theory]] [[Fact]] [[InlineData(1)]] void A() {} };").unwrap();
        let method = &report.classes[0].methods[0];
        assert!(!method.is_theory);
        assert!(method.theories.is_empty());
    }

    #[test]
    fn test_classes_in_document_order_and_merged_by_name() {
        let report = run(
            "class Zeta { [[Fact]] void One() {} };\nclass Alpha { [[Fact]] void Two() {} };\nclass Zeta { [[Fact]] void Three() {} };\n",
        )
        .unwrap();
        let classes: Vec<_> = report.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, ["Zeta", "Alpha"]);
        let zeta: Vec<_> = report.classes[0]
            .methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(zeta, ["One", "Three"]);
    }

    #[test]
    fn test_unnamed_class_is_fatal() {
        let err = run("struct { [[Fact]] void A() {} } value;").unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::MissingClassName {
                method: "A".to_string()
            }
        );
    }

    #[test]
    fn test_free_function_is_fatal() {
        let err = run("[[Fact]] void Free() {}").unwrap_err();
        assert!(matches!(err, DiscoveryError::NoEnclosingClass { .. }));
    }

    #[test]
    fn test_qualified_method_name_is_fatal() {
        let err = run("class T { [[Fact]] void Other::Name() {} };").unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::UnsupportedMethodName {
                name: "Other::Name".to_string()
            }
        );
    }

    #[test]
    fn test_no_tests_gives_empty_report() {
        let report = run("#pragma once\nclass Plain { void A() {} };\n").unwrap();
        assert!(report.is_empty());
        assert_eq!(report.test_count(), 0);
    }
}
