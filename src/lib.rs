//! hdr-testgen: test-runner generation for C++ headers
//!
//! Scans a source tree for headers whose member functions carry `[[Fact]]`
//! or `[[Theory]]` attributes, and writes a runner header per file that
//! instantiates each test class and invokes every test through the runtime's
//! `RunTest` entry point.
//!
//! # Architecture
//!
//! Everything is built on a lossless syntax tree ([`syntax`]): rendering a
//! parsed tree reproduces its source byte for byte, and generated runners are
//! trees assembled through the same validated [`syntax::factory`].
//!
//! - [`syntax`]: lexer, parser, green/red trees, typed views, walker
//! - [`discovery`]: attribute-driven test discovery
//! - [`synthesize`]: runner construction
//! - [`verify`]: round-trip fidelity check
//! - [`generate`]: per-file driver over a source tree
//! - [`runtime`]: host-side `RunTest` counterpart
//!
//! # Example
//!
//! ```
//! use hdr_testgen::config::RunnerConfig;
//! use hdr_testgen::generate_runner;
//! use std::path::Path;
//!
//! let header = "namespace Sample { class T { public: [[Fact]] void Works() {} }; }\n";
//! let generated = generate_runner(Path::new("T.h"), header, "T.h", &RunnerConfig::default())?;
//! let runner = generated.content.expect("header has tests");
//! assert!(runner.contains("TestState RunT()"));
//! assert!(runner.contains("SoupTest::RunTest(className, \"Works\""));
//! # Ok::<(), hdr_testgen::GenerateError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod generate;
pub mod output;
pub mod runtime;
pub mod synthesize;
pub mod syntax;
pub mod verify;

// Re-exports
pub use config::{resolve, ConfigError, GeneratorConfig, RunnerConfig, ScanConfig};
pub use discovery::{discover, DiscoveryError, DiscoveryReport, TestClass, TestMethod};
pub use generate::{
    generate_runner, FileReport, FileStatus, GenerateError, Generator, RunOptions, RunSummary,
};
pub use output::{GeneratedFile, OutputError, WriteResult};
pub use runtime::{run_test, TestState};
pub use synthesize::{build_test_runner, escape_string};
pub use syntax::{parse, SyntaxError, SyntaxTree};
pub use verify::{verify, FidelityError};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at info, or debug when
/// `verbose` is set.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose {
        "hdr_testgen=debug"
    } else {
        "hdr_testgen=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
