use serde::Deserialize;
use std::fmt;

/// Default name of the config file looked up at the scanned root.
pub const CONFIG_FILE_NAME: &str = "testgen.toml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Which files are read and where generated files go.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Header extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Output directory, relative to the scanned root. Never scanned itself.
    pub gen_dir: String,
    /// Extension given to generated files, replacing the header's own.
    pub generated_extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["h".to_string()],
            gen_dir: "gen".to_string(),
            generated_extension: "gen.h".to_string(),
        }
    }
}

/// Shape of the synthesized runner functions.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Namespace of `RunTest`; empty calls it unqualified.
    pub runtime_namespace: String,
    /// Callable that creates the test class instance.
    pub instance_factory: String,
    /// One level of indentation in the generated body.
    pub indent: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            runtime_namespace: "SoupTest".to_string(),
            instance_factory: "std::make_shared".to_string(),
            indent: "\t".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.scan.extensions.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "scan.extensions",
            });
        }
        for extension in &self.scan.extensions {
            if extension.trim().is_empty() || extension.starts_with('.') {
                issues.push(ValidationIssue::InvalidValue {
                    field: "scan.extensions",
                    message: format!("'{extension}' must be a bare extension such as 'h'"),
                });
            }
        }

        let gen_dir = self.scan.gen_dir.trim();
        if gen_dir.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "scan.gen_dir",
            });
        } else if gen_dir.starts_with('/') || gen_dir.split(['/', '\\']).any(|part| part == "..") {
            issues.push(ValidationIssue::InvalidValue {
                field: "scan.gen_dir",
                message: format!("'{gen_dir}' must be a relative path inside the root"),
            });
        }

        if self.scan.generated_extension.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "scan.generated_extension",
            });
        } else if self
            .scan
            .extensions
            .iter()
            .any(|extension| *extension == self.scan.generated_extension)
        {
            issues.push(ValidationIssue::InvalidValue {
                field: "scan.generated_extension",
                message: "generated files would be scanned as headers".to_string(),
            });
        }

        if !is_qualified_identifier(&self.runner.runtime_namespace, true) {
            issues.push(ValidationIssue::InvalidValue {
                field: "runner.runtime_namespace",
                message: format!(
                    "'{}' is not a namespace name",
                    self.runner.runtime_namespace
                ),
            });
        }
        if !is_qualified_identifier(&self.runner.instance_factory, false) {
            issues.push(ValidationIssue::InvalidValue {
                field: "runner.instance_factory",
                message: format!(
                    "'{}' is not a qualified function name",
                    self.runner.instance_factory
                ),
            });
        }
        if self.runner.indent.chars().any(|c| c != ' ' && c != '\t') {
            issues.push(ValidationIssue::InvalidValue {
                field: "runner.indent",
                message: "indent may only contain spaces and tabs".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// `a::b::c` with identifier components. Empty is accepted only when
/// `allow_empty` is set.
fn is_qualified_identifier(text: &str, allow_empty: bool) -> bool {
    if text.is_empty() {
        return allow_empty;
    }
    text.split("::").all(|part| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
            && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
    })
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl ValidationError {
    /// Config tables with at least one issue, in first-seen order.
    pub fn tables(&self) -> Vec<&'static str> {
        let mut tables = Vec::new();
        for issue in &self.issues {
            let table = issue.table();
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        tables
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl ValidationIssue {
    /// Dotted key of the offending setting, such as `scan.gen_dir`.
    pub fn field(&self) -> &'static str {
        match *self {
            ValidationIssue::MissingField { field }
            | ValidationIssue::InvalidValue { field, .. } => field,
        }
    }

    /// The table holding the setting.
    pub fn table(&self) -> &'static str {
        let field = self.field();
        field.split_once('.').map_or(field, |(table, _)| table)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.extensions, ["h"]);
        assert_eq!(config.runner.runtime_namespace, "SoupTest");
    }

    #[test]
    fn test_collects_every_issue() {
        let mut config = GeneratorConfig::default();
        config.scan.extensions = vec![".h".to_string()];
        config.scan.gen_dir = "../out".to_string();
        config.runner.instance_factory = "make shared".to_string();

        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 3);
        let message = err.to_string();
        assert!(message.contains("scan.extensions"));
        assert!(message.contains("scan.gen_dir"));
        assert!(message.contains("runner.instance_factory"));
        assert_eq!(err.tables(), ["scan", "runner"]);
        assert_eq!(err.issues[1].field(), "scan.gen_dir");
    }

    #[test]
    fn test_empty_runtime_namespace_is_allowed() {
        let mut config = GeneratorConfig::default();
        config.runner.runtime_namespace.clear();
        assert!(config.validate().is_ok());

        config.runner.instance_factory.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generated_extension_must_differ_from_sources() {
        let mut config = GeneratorConfig::default();
        config.scan.generated_extension = "h".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.issues[0],
            ValidationIssue::InvalidValue {
                field: "scan.generated_extension",
                ..
            }
        ));
    }
}
