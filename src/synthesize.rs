//! Builds the runner header for discovered test classes.
//!
//! The output is a syntax tree assembled through the factory, one
//! `TestState Run<Class>()` function per class. All layout is explicit
//! trivia; the include preamble rides on the first token of the file.
//!
//! For a class `Sample::UnitTests::MyClassUnitTests` with one fact the
//! rendered output is:
//!
//! ```text
//! #pragma once
//! #include "Sample/MyClass.UnitTests.h"
//!
//! TestState RunMyClassUnitTests()
//! {
//! 	auto className = "MyClassUnitTests";
//! 	auto testClass = std::make_shared<Sample::UnitTests::MyClassUnitTests>();
//! 	TestState state = { 0, 0 };
//! 	state += SoupTest::RunTest(className, "DoWork_Success", [&testClass]() { testClass->DoWork_Success(); });
//!
//! 	return state;
//! }
//! ```

use crate::config::RunnerConfig;
use crate::discovery::{TestClass, TestMethod};
use crate::syntax::factory::{self, BinaryOperator, SeparatorPolicy};
use crate::syntax::{
    GreenElement, GreenNode, SyntaxError, SyntaxToken, SyntaxTree, TokenKind, Trivia,
};

type Result<T> = std::result::Result<T, SyntaxError>;

const TEST_STATE: &str = "TestState";
const RUN_TEST: &str = "RunTest";
const CLASS_NAME: &str = "className";
const TEST_CLASS: &str = "testClass";
const STATE: &str = "state";

/// Escape `"` for embedding in a string literal.
///
/// A quote is prefixed with `\` unless the character before it in `text` is
/// already a `\`.
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        if c == '"' && previous != Some('\\') {
            escaped.push('\\');
        }
        escaped.push(c);
        previous = Some(c);
    }
    escaped
}

/// Build the runner file for `classes`, including `include_path`.
pub fn build_test_runner(
    include_path: &str,
    classes: &[TestClass],
    config: &RunnerConfig,
) -> Result<SyntaxTree> {
    let builder = RunnerBuilder { config };
    let mut preamble = Some(vec![
        factory::trivia("#pragma once"),
        factory::trivia("\n"),
        factory::trivia(format!("#include \"{include_path}\"")),
        factory::trivia("\n"),
        factory::trivia("\n"),
    ]);

    let mut functions = Vec::with_capacity(classes.len());
    for class in classes {
        let leading = preamble.take().unwrap_or_else(|| vec![factory::trivia("\n")]);
        functions.push(builder.runner_function(class, leading)?);
    }

    let end_of_file = factory::end_of_file(preamble.unwrap_or_default());
    let root = factory::translation_unit(factory::syntax_list(functions), end_of_file)?;
    Ok(SyntaxTree::new(root))
}

struct RunnerBuilder<'a> {
    config: &'a RunnerConfig,
}

impl RunnerBuilder<'_> {
    /// `TestState Run<Class>() { ... }`
    fn runner_function(&self, class: &TestClass, leading: Vec<Trivia>) -> Result<GreenNode> {
        let return_type = factory::identifier_type(
            None,
            factory::simple_identifier(factory::identifier(
                TEST_STATE,
                leading,
                space(),
            )?)?,
        )?;
        let specifiers = factory::declaration_specifier_sequence(vec![return_type.into()])?;
        let name = name_expression(&format!("Run{}", class.name), vec![], vec![])?;
        let parameters = factory::parameter_list(
            factory::keyword(TokenKind::OpenParenthesis)?,
            factory::empty_separated_list(),
            punct(TokenKind::CloseParenthesis, vec![], newline())?,
        )?;

        let mut statements = vec![
            self.class_name_statement(class)?,
            self.test_class_statement(class)?,
            self.state_statement()?,
        ];
        for method in &class.methods {
            statements.extend(self.run_test_statements(method)?);
        }
        statements.push(self.return_statement()?);

        let body = factory::compound_statement(
            punct(TokenKind::OpenBrace, vec![], newline())?,
            factory::syntax_list(statements),
            punct(TokenKind::CloseBrace, vec![], newline())?,
        )?;

        factory::function_definition(
            factory::attribute_specifier_sequence(vec![])?,
            specifiers,
            name,
            parameters,
            factory::syntax_list(Vec::<GreenElement>::new()),
            factory::regular_function_body(body)?,
        )
    }

    fn indent(&self) -> Vec<Trivia> {
        trivia(&self.config.indent)
    }

    /// `auto className = "Class";`
    fn class_name_statement(&self, class: &TestClass) -> Result<GreenNode> {
        let value = factory::literal_expression(factory::token(
            TokenKind::StringLiteral,
            format!("\"{}\"", class.name),
            vec![],
            vec![],
        )?)?;
        self.auto_declaration(CLASS_NAME, value)
    }

    /// `auto testClass = std::make_shared<Qualified::Class>();`
    fn test_class_statement(&self, class: &TestClass) -> Result<GreenNode> {
        let class_type = factory::identifier_type(
            nested_name(&class.qualifiers)?,
            factory::simple_identifier(factory::identifier(&class.name, vec![], vec![])?)?,
        )?;
        let argument = factory::declaration_specifier_sequence(vec![class_type.into()])?;

        let (qualifier, function) = split_qualified(&self.config.instance_factory);
        let template = factory::simple_template_identifier(
            factory::identifier(function, vec![], vec![])?,
            factory::keyword(TokenKind::LessThan)?,
            factory::separated_list(vec![argument.into()], vec![], SeparatorPolicy::Interleaved)?,
            factory::keyword(TokenKind::GreaterThan)?,
        )?;
        let callee = factory::identifier_expression(nested_name(&qualifier)?, template)?;
        let value = factory::invocation_expression(
            callee,
            factory::keyword(TokenKind::OpenParenthesis)?,
            factory::empty_separated_list(),
            factory::keyword(TokenKind::CloseParenthesis)?,
        )?;
        self.auto_declaration(TEST_CLASS, value)
    }

    /// `auto <name> = <value>;`
    fn auto_declaration(&self, name: &str, value: GreenNode) -> Result<GreenNode> {
        let auto = factory::primitive_data_type_specifier(factory::keyword_with_trivia(
            TokenKind::Auto,
            self.indent(),
            space(),
        )?)?;
        self.declaration_statement(auto, name, value)
    }

    fn declaration_statement(
        &self,
        specifier: GreenNode,
        name: &str,
        value: GreenNode,
    ) -> Result<GreenNode> {
        let declarator = factory::initializer_declarator(
            factory::simple_identifier(factory::identifier(name, vec![], space())?)?,
            Some(factory::value_equal_initializer(
                punct(TokenKind::Equal, vec![], space())?,
                value,
            )?),
        )?;
        let declarators = factory::initializer_declarator_list(factory::separated_list(
            vec![declarator.into()],
            vec![],
            SeparatorPolicy::Interleaved,
        )?)?;
        let declaration = factory::simple_declaration(
            factory::declaration_specifier_sequence(vec![specifier.into()])?,
            declarators,
            punct(TokenKind::Semicolon, vec![], newline())?,
        )?;
        factory::declaration_statement(declaration)
    }

    /// `TestState state = { 0, 0 };`
    fn state_statement(&self) -> Result<GreenNode> {
        let state_type = factory::identifier_type(
            None,
            factory::simple_identifier(factory::identifier(TEST_STATE, self.indent(), space())?)?,
        )?;
        let zero = |trailing: Vec<Trivia>| {
            factory::literal_expression(factory::token(
                TokenKind::IntegerLiteral,
                "0",
                vec![],
                trailing,
            )?)
        };
        let value = factory::initializer_list(
            punct(TokenKind::OpenBrace, vec![], space())?,
            factory::separated_list(
                vec![zero(vec![])?.into(), zero(space())?.into()],
                vec![punct(TokenKind::Comma, vec![], space())?],
                SeparatorPolicy::Interleaved,
            )?,
            factory::keyword(TokenKind::CloseBrace)?,
        )?;
        self.declaration_statement(state_type, STATE, value)
    }

    /// One `state += RunTest(...)` line per fact, or per theory case.
    fn run_test_statements(&self, method: &TestMethod) -> Result<Vec<GreenNode>> {
        if !method.is_theory {
            let test_name = format!("\"{}\"", method.name);
            return Ok(vec![self.run_test_statement(&method.name, test_name, None)?]);
        }
        method
            .theories
            .iter()
            .map(|arguments| {
                let test_name = format!("\"{}({})\"", method.name, escape_string(arguments));
                self.run_test_statement(&method.name, test_name, Some(arguments))
            })
            .collect()
    }

    /// `state += <ns>::RunTest(className, "<test>", [&testClass]() { testClass-><method>(<args>); });`
    fn run_test_statement(
        &self,
        method: &str,
        test_name: String,
        arguments: Option<&str>,
    ) -> Result<GreenNode> {
        let namespace = split_path(&self.config.runtime_namespace);
        let run_test = factory::identifier_expression(
            nested_name(&namespace)?,
            factory::simple_identifier(factory::identifier(RUN_TEST, vec![], vec![])?)?,
        )?;

        let call_arguments = factory::separated_list(
            vec![
                name_expression(CLASS_NAME, vec![], vec![])?.into(),
                factory::literal_expression(factory::token(
                    TokenKind::StringLiteral,
                    test_name,
                    vec![],
                    vec![],
                )?)?
                .into(),
                self.test_lambda(method, arguments)?.into(),
            ],
            vec![
                punct(TokenKind::Comma, vec![], space())?,
                punct(TokenKind::Comma, vec![], space())?,
            ],
            SeparatorPolicy::Interleaved,
        )?;
        let call = factory::invocation_expression(
            run_test,
            factory::keyword(TokenKind::OpenParenthesis)?,
            call_arguments,
            factory::keyword(TokenKind::CloseParenthesis)?,
        )?;

        let accumulate = factory::binary_expression(
            BinaryOperator::AdditionAssignment,
            name_expression(STATE, self.indent(), space())?,
            punct(TokenKind::PlusEqual, vec![], space())?,
            call,
        )?;
        factory::expression_statement(accumulate, punct(TokenKind::Semicolon, vec![], newline())?)
    }

    /// `[&testClass]() { testClass-><method>(<args>); }`
    fn test_lambda(&self, method: &str, arguments: Option<&str>) -> Result<GreenNode> {
        let capture = factory::lambda_capture_clause(
            Some(factory::keyword(TokenKind::Ampersand)?),
            factory::identifier(TEST_CLASS, vec![], vec![])?,
        )?;
        let parameters = factory::parameter_list(
            factory::keyword(TokenKind::OpenParenthesis)?,
            factory::empty_separated_list(),
            punct(TokenKind::CloseParenthesis, vec![], space())?,
        )?;

        let member = factory::binary_expression(
            BinaryOperator::MemberOfPointer,
            name_expression(TEST_CLASS, vec![], vec![])?,
            factory::keyword(TokenKind::Arrow)?,
            name_expression(method, vec![], vec![])?,
        )?;
        let call_arguments = match arguments.filter(|text| !text.is_empty()) {
            Some(text) => factory::separated_list(
                vec![factory::literal_expression(factory::token(
                    TokenKind::Verbatim,
                    text,
                    vec![],
                    vec![],
                )?)?
                .into()],
                vec![],
                SeparatorPolicy::Interleaved,
            )?,
            None => factory::empty_separated_list(),
        };
        let call = factory::invocation_expression(
            member,
            factory::keyword(TokenKind::OpenParenthesis)?,
            call_arguments,
            factory::keyword(TokenKind::CloseParenthesis)?,
        )?;
        let body = factory::compound_statement(
            punct(TokenKind::OpenBrace, vec![], space())?,
            factory::syntax_list([factory::expression_statement(
                call,
                punct(TokenKind::Semicolon, vec![], space())?,
            )?]),
            factory::keyword(TokenKind::CloseBrace)?,
        )?;

        factory::lambda_expression(
            factory::keyword(TokenKind::OpenBracket)?,
            factory::separated_list(vec![capture.into()], vec![], SeparatorPolicy::Interleaved)?,
            factory::keyword(TokenKind::CloseBracket)?,
            parameters,
            body,
        )
    }

    /// Blank line, then `return state;`
    fn return_statement(&self) -> Result<GreenNode> {
        let mut leading = vec![factory::trivia("\n")];
        leading.extend(self.indent());
        factory::return_statement(
            factory::keyword_with_trivia(TokenKind::Return, leading, space())?,
            Some(name_expression(STATE, vec![], vec![])?),
            punct(TokenKind::Semicolon, vec![], newline())?,
        )
    }
}

fn trivia(text: &str) -> Vec<Trivia> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![factory::trivia(text)]
    }
}

fn space() -> Vec<Trivia> {
    trivia(" ")
}

fn newline() -> Vec<Trivia> {
    trivia("\n")
}

fn punct(kind: TokenKind, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> Result<SyntaxToken> {
    factory::keyword_with_trivia(kind, leading, trailing)
}

/// An unqualified identifier expression.
fn name_expression(name: &str, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> Result<GreenNode> {
    factory::identifier_expression(
        None,
        factory::simple_identifier(factory::identifier(name, leading, trailing)?)?,
    )
}

/// `A::B::` for `["A", "B"]`; `None` when there are no names.
fn nested_name<S: AsRef<str>>(names: &[S]) -> Result<Option<GreenNode>> {
    if names.is_empty() {
        return Ok(None);
    }
    let mut items = Vec::with_capacity(names.len());
    let mut separators = Vec::with_capacity(names.len());
    for name in names {
        let identifier = factory::identifier(name.as_ref(), vec![], vec![])?;
        items.push(factory::simple_identifier(identifier)?.into());
        separators.push(factory::keyword(TokenKind::DoubleColon)?);
    }
    let list = factory::separated_list(items, separators, SeparatorPolicy::Terminated)?;
    factory::nested_name_specifier(None, list).map(Some)
}

fn split_path(path: &str) -> Vec<&str> {
    path.split("::").filter(|part| !part.is_empty()).collect()
}

/// `std::make_shared` into `(["std"], "make_shared")`.
fn split_qualified(path: &str) -> (Vec<&str>, &str) {
    let mut parts = split_path(path);
    let last = parts.pop().unwrap_or(path);
    (parts, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover;
    use crate::syntax::parse;

    fn fact(name: &str) -> TestMethod {
        TestMethod {
            name: name.to_string(),
            is_theory: false,
            theories: vec![],
        }
    }

    fn sample_class() -> TestClass {
        TestClass {
            name: "MyClassUnitTests".to_string(),
            qualifiers: vec!["Sample".to_string(), "UnitTests".to_string()],
            methods: vec![fact("DoWork_Success")],
        }
    }

    #[test]
    fn test_single_fact_output() {
        let tree = build_test_runner(
            "Sample/MyClass.UnitTests.h",
            &[sample_class()],
            &RunnerConfig::default(),
        )
        .unwrap();
        let expected = "#pragma once\n#include \"Sample/MyClass.UnitTests.h\"\n\nTestState RunMyClassUnitTests()\n{\n\tauto className = \"MyClassUnitTests\";\n\tauto testClass = std::make_shared<Sample::UnitTests::MyClassUnitTests>();\n\tTestState state = { 0, 0 };\n\tstate += SoupTest::RunTest(className, \"DoWork_Success\", [&testClass]() { testClass->DoWork_Success(); });\n\n\treturn state;\n}\n";
        assert_eq!(tree.render(), expected);
    }

    #[test]
    fn test_theory_cases_expand_and_escape() {
        let class = TestClass {
            name: "T".to_string(),
            qualifiers: vec![],
            methods: vec![TestMethod {
                name: "Check".to_string(),
                is_theory: true,
                theories: vec!["1, \"a\\\"b\"".to_string(), "2".to_string()],
            }],
        };
        let output = build_test_runner("T.h", &[class], &RunnerConfig::default())
            .unwrap()
            .render();
        assert!(output.contains("auto testClass = std::make_shared<T>();\n"));
        assert!(output.contains(
            "\tstate += SoupTest::RunTest(className, \"Check(1, \\\"a\\\"b\\\")\", [&testClass]() { testClass->Check(1, \"a\\\"b\"); });\n"
        ));
        assert!(output.contains(
            "\tstate += SoupTest::RunTest(className, \"Check(2)\", [&testClass]() { testClass->Check(2); });\n"
        ));
    }

    #[test]
    fn test_functions_are_separated_by_blank_line() {
        let first = sample_class();
        let second = TestClass {
            name: "Other".to_string(),
            qualifiers: vec![],
            methods: vec![fact("A"), fact("B")],
        };
        let output = build_test_runner("x.h", &[first, second], &RunnerConfig::default())
            .unwrap()
            .render();
        assert!(output.contains("\treturn state;\n}\n\nTestState RunOther()\n{\n"));
        assert!(output.ends_with("\treturn state;\n}\n"));
        let a = output.find("\"A\"").unwrap();
        let b = output.find("\"B\"").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_runner_config_shapes_output() {
        let config = RunnerConfig {
            runtime_namespace: String::new(),
            instance_factory: "make_unique".to_string(),
            indent: "    ".to_string(),
        };
        let output = build_test_runner("x.h", &[sample_class()], &config)
            .unwrap()
            .render();
        assert!(output.contains(
            "    auto testClass = make_unique<Sample::UnitTests::MyClassUnitTests>();\n"
        ));
        assert!(output.contains("    state += RunTest(className, \"DoWork_Success\""));
        assert!(output.contains("\n    return state;\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = || {
            build_test_runner("x.h", &[sample_class()], &RunnerConfig::default())
                .unwrap()
        };
        assert_eq!(build(), build());
        assert_eq!(build().render(), build().render());
    }

    #[test]
    fn test_output_parses_back() {
        let tree = build_test_runner("x.h", &[sample_class()], &RunnerConfig::default()).unwrap();
        let rendered = tree.render();
        let reparsed = parse(&rendered).unwrap();
        assert_eq!(reparsed.render(), rendered);
        // Generated runners are free functions without test attributes.
        assert!(discover(&reparsed).unwrap().is_empty());
    }

    #[test]
    fn test_no_classes_keeps_preamble() {
        let tree = build_test_runner("x.h", &[], &RunnerConfig::default()).unwrap();
        assert_eq!(tree.render(), "#pragma once\n#include \"x.h\"\n\n");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a\"b"), "a\\\"b");
        assert_eq!(escape_string("a\\\"b"), "a\\\"b");
        assert_eq!(escape_string("\"\""), "\\\"\\\"");
        assert_eq!(escape_string("plain"), "plain");
        assert_eq!(escape_string(""), "");
    }
}
