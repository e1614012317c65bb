use crate::config::schema::{GeneratorConfig, ValidationError, CONFIG_FILE_NAME};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Failure to produce a `GeneratorConfig`.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The text is not TOML, or has keys outside `[scan]` and `[runner]`.
    Parse {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    /// The tables parsed but hold values the generator cannot use.
    Invalid {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    /// Record the file the text came from.
    fn in_file(mut self, file: &Path) -> Self {
        if let ConfigError::Parse { path, .. } | ConfigError::Invalid { path, .. } = &mut self {
            path.get_or_insert_with(|| file.to_path_buf());
        }
        self
    }

    fn location(&self) -> String {
        match self {
            ConfigError::Read { path, .. } => path.display().to_string(),
            ConfigError::Parse { path, .. } | ConfigError::Invalid { path, .. } => path
                .as_ref()
                .map_or_else(|| "inline config".to_string(), |path| path.display().to_string()),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self.location();
        match self {
            ConfigError::Read { source, .. } => {
                write!(f, "cannot read testgen config {location}: {source}")
            }
            ConfigError::Parse { source, .. } => write!(
                f,
                "{location} is not a testgen config (expected [scan] and [runner] tables): {source}"
            ),
            ConfigError::Invalid { source, .. } => {
                let tables: Vec<String> = source
                    .tables()
                    .into_iter()
                    .map(|table| format!("[{table}]"))
                    .collect();
                write!(f, "{location}: invalid {} settings: {source}", tables.join(" and "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid { source, .. } => Some(source),
        }
    }
}

/// Parse and validate config text.
pub fn load_from_str(input: &str) -> Result<GeneratorConfig, ConfigError> {
    let config: GeneratorConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Parse { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Invalid { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<GeneratorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.in_file(path))
}

/// Load the config for a run.
///
/// An explicit path must exist. Otherwise `testgen.toml` at the root is used
/// when present, and the defaults when it is not.
pub fn resolve(root: &Path, explicit: Option<&Path>) -> Result<GeneratorConfig, ConfigError> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return load_from_path(path);
    }
    let default_path = root.join(CONFIG_FILE_NAME);
    if default_path.is_file() {
        debug!(path = %default_path.display(), "loading config");
        load_from_path(&default_path)
    } else {
        debug!("no config file, using defaults");
        Ok(GeneratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_load_from_str_overrides_defaults() {
        let config = load_from_str(
            r#"
[scan]
extensions = ["h", "hpp"]
gen_dir = "out/generated"

[runner]
runtime_namespace = ""
indent = "    "
"#,
        )
        .unwrap();
        assert_eq!(config.scan.extensions, ["h", "hpp"]);
        assert_eq!(config.scan.gen_dir, "out/generated");
        assert_eq!(config.scan.generated_extension, "gen.h");
        assert_eq!(config.runner.runtime_namespace, "");
        assert_eq!(config.runner.instance_factory, "std::make_shared");
        assert_eq!(config.runner.indent, "    ");
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        assert_eq!(load_from_str("").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = load_from_str("[scan]\nextension = [\"h\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
        assert!(err.to_string().starts_with("inline config is not a testgen config"));
    }

    #[test]
    fn test_invalid_settings_name_their_tables() {
        let err = load_from_str("[runner]\nindent = \"x\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "inline config: invalid [runner] settings: \
             invalid value for 'runner.indent': indent may only contain spaces and tabs"
        );

        let err = load_from_str("[scan]\ngen_dir = \"\"\n[runner]\nindent = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid [scan] and [runner] settings"));
    }

    #[test]
    fn test_validation_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[scan]\ngen_dir = \"\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        match &err {
            ConfigError::Invalid { path: Some(p), .. } => assert_eq!(p, &path),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("bad.toml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_resolve_prefers_explicit_then_root_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve(dir.path(), None).unwrap(),
            GeneratorConfig::default()
        );

        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[scan]\ngen_dir = \"from_root\"\n",
        )
        .unwrap();
        assert_eq!(resolve(dir.path(), None).unwrap().scan.gen_dir, "from_root");

        let explicit = dir.path().join("other.toml");
        fs::write(&explicit, "[scan]\ngen_dir = \"explicit\"\n").unwrap();
        assert_eq!(
            resolve(dir.path(), Some(&explicit)).unwrap().scan.gen_dir,
            "explicit"
        );

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            resolve(dir.path(), Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
