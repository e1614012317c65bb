//! Driver: scan a source tree and generate one runner per test header.
//!
//! Each header goes through parse, fidelity check, discovery and synthesis.
//! Files are independent units of work: a failing file is recorded and the
//! run moves on, unless fail-fast is requested.

use crate::config::{GeneratorConfig, RunnerConfig};
use crate::discovery::{discover, DiscoveryError, DiscoveryReport, DiscoveryWarning};
use crate::output::{GeneratedFile, OutputError, WriteResult};
use crate::synthesize::build_test_runner;
use crate::syntax::{parse, SyntaxError};
use crate::verify::{verify, FidelityError};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("root {} is not a directory", path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("failed to scan source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to build syntax tree for {}: {source}", path.display())]
    Syntax { path: PathBuf, source: SyntaxError },

    #[error(transparent)]
    Fidelity(#[from] FidelityError),

    #[error("{}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        source: DiscoveryError,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl GenerateError {
    /// The file the error belongs to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            GenerateError::RootNotDirectory { path }
            | GenerateError::Read { path, .. }
            | GenerateError::Syntax { path, .. }
            | GenerateError::Discovery { path, .. }
            | GenerateError::Fidelity(FidelityError::Mismatch { path, .. })
            | GenerateError::Output(OutputError::CreateDir { path, .. })
            | GenerateError::Output(OutputError::Write { path, .. }) => Some(path.as_path()),
            GenerateError::Walk(error) => error.path(),
        }
    }
}

/// What happened to one source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Written,
    Unchanged,
    /// Dry run; the file would have been written.
    WouldWrite,
    /// No tests, nothing generated.
    NoTests,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FileStatus::Written => "written",
            FileStatus::Unchanged => "unchanged",
            FileStatus::WouldWrite => "would write",
            FileStatus::NoTests => "no tests",
        };
        f.write_str(text)
    }
}

impl From<WriteResult> for FileStatus {
    fn from(result: WriteResult) -> Self {
        match result {
            WriteResult::Written => FileStatus::Written,
            WriteResult::Unchanged => FileStatus::Unchanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub classes: usize,
    pub tests: usize,
    pub warnings: Vec<DiscoveryWarning>,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub fail_fast: bool,
    pub dry_run: bool,
}

/// Results of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub files: Vec<FileReport>,
    pub failures: Vec<GenerateError>,
    /// Set when fail-fast stopped the run before every file was processed.
    pub aborted: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|file| file.status == status).count()
    }

    pub fn test_count(&self) -> usize {
        self.files.iter().map(|file| file.tests).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|file| file.warnings.len()).sum()
    }
}

/// Runner text for one header, plus what discovery found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRunner {
    pub report: DiscoveryReport,
    /// `None` when the header has no tests.
    pub content: Option<String>,
}

/// Parse, verify, discover and synthesize a single header held in memory.
///
/// `path` is only used for error reporting.
pub fn generate_runner(
    path: &Path,
    source: &str,
    include_path: &str,
    config: &RunnerConfig,
) -> Result<GeneratedRunner, GenerateError> {
    let syntax_error = |source: SyntaxError| GenerateError::Syntax {
        path: path.to_path_buf(),
        source,
    };

    let tree = parse(source).map_err(syntax_error)?;
    verify(&tree, source, path)?;

    let report = discover(&tree).map_err(|source| GenerateError::Discovery {
        path: path.to_path_buf(),
        source,
    })?;
    if report.is_empty() {
        return Ok(GeneratedRunner {
            report,
            content: None,
        });
    }

    let runner = build_test_runner(include_path, &report.classes, config).map_err(syntax_error)?;
    Ok(GeneratedRunner {
        report,
        content: Some(runner.render()),
    })
}

pub struct Generator {
    root: PathBuf,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(root: impl Into<PathBuf>, config: GeneratorConfig) -> Result<Self, GenerateError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(GenerateError::RootNotDirectory { path: root });
        }
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn gen_dir(&self) -> PathBuf {
        self.root.join(&self.config.scan.gen_dir)
    }

    /// Source headers under the root, sorted, excluding the output directory.
    pub fn scan(&self) -> Result<Vec<PathBuf>, GenerateError> {
        let gen_dir = self.gen_dir();
        let generated_suffix = format!(".{}", self.config.scan.generated_extension);
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.path() != gen_dir.as_path());
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(&generated_suffix) {
                debug!(path = %path.display(), "skipping generated file");
                continue;
            }
            if self.is_source_header(path) {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    fn is_source_header(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                self.config
                    .scan
                    .extensions
                    .iter()
                    .any(|wanted| wanted == extension)
            })
    }

    fn relative<'a>(&self, source: &'a Path) -> &'a Path {
        source.strip_prefix(&self.root).unwrap_or(source)
    }

    /// Include path of `source`: relative to the root, `/`-separated.
    pub fn include_path(&self, source: &Path) -> String {
        self.relative(source)
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// `<gen_dir>/<relative dir>/<stem>.<generated extension>`
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let relative = self.relative(source);
        let stem = relative
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{stem}.{}", self.config.scan.generated_extension);
        match relative.parent() {
            Some(parent) => self.gen_dir().join(parent).join(file_name),
            None => self.gen_dir().join(file_name),
        }
    }

    /// Generate the runner for one header.
    pub fn process_file(&self, source: &Path, dry_run: bool) -> Result<FileReport, GenerateError> {
        let text = fs::read_to_string(source).map_err(|error| GenerateError::Read {
            path: source.to_path_buf(),
            source: error,
        })?;
        let output = self.output_path(source);
        let generated = generate_runner(
            source,
            &text,
            &self.include_path(source),
            &self.config.runner,
        )?;

        let report = generated.report;
        let status = match generated.content {
            None => {
                debug!(path = %source.display(), "no tests");
                FileStatus::NoTests
            }
            Some(content) => {
                let file = GeneratedFile::new(&output, content);
                if dry_run {
                    if file.is_current() {
                        FileStatus::Unchanged
                    } else {
                        FileStatus::WouldWrite
                    }
                } else {
                    file.write()?.into()
                }
            }
        };
        info!(
            path = %source.display(),
            classes = report.classes.len(),
            tests = report.test_count(),
            %status,
            "processed"
        );

        Ok(FileReport {
            source: source.to_path_buf(),
            output,
            classes: report.classes.len(),
            tests: report.test_count(),
            warnings: report.warnings,
            status,
        })
    }

    /// Process every header under the root.
    ///
    /// Only a failure to scan the tree is returned as `Err`; per-file failures
    /// are collected in the summary.
    pub fn run(&self, options: RunOptions) -> Result<RunSummary, GenerateError> {
        let files = self.scan()?;
        info!(root = %self.root.display(), files = files.len(), "scanning complete");

        let mut summary = RunSummary::default();
        for (index, source) in files.iter().enumerate() {
            match self.process_file(source, options.dry_run) {
                Ok(report) => summary.files.push(report),
                Err(error) => {
                    summary.failures.push(error);
                    if options.fail_fast {
                        summary.aborted = index + 1 < files.len();
                        break;
                    }
                }
            }
        }
        Ok(summary)
    }
}
