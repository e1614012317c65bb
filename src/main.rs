use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use hdr_testgen::{
    init_tracing, resolve, FidelityError, FileReport, FileStatus, GenerateError, Generator,
    RunOptions, RunSummary,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hdr-testgen")]
#[command(about = "Generate test runners for attribute-annotated C++ headers", long_about = None)]
#[command(version)]
struct Cli {
    /// Root of the source tree to scan
    root: PathBuf,

    /// Config file (defaults to testgen.toml in the root, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop at the first file that fails
    #[arg(long)]
    fail_fast: bool,

    /// Report what would be generated without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !cli.root.is_dir() {
        anyhow::bail!("root directory not found: {}", cli.root.display());
    }

    let config = resolve(&cli.root, cli.config.as_deref())
        .with_context(|| format!("failed to load config for {}", cli.root.display()))?;
    let generator = Generator::new(&cli.root, config)?;

    println!(
        "{}",
        format!("Scanning {}", generator.root().display()).bold()
    );
    if cli.dry_run {
        println!("{}", "  [DRY RUN - nothing will be written]".cyan());
    }

    let summary = generator.run(RunOptions {
        fail_fast: cli.fail_fast,
        dry_run: cli.dry_run,
    })?;

    for report in &summary.files {
        print_report(generator.root(), report);
    }
    for failure in &summary.failures {
        print_failure(failure);
    }
    if summary.aborted {
        eprintln!("{}", "Stopped at first failure (--fail-fast)".yellow());
    }

    println!();
    print_summary(&summary);

    if !summary.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn display_relative<'a>(root: &Path, path: &'a Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

fn print_report(root: &Path, report: &FileReport) {
    let source = display_relative(root, &report.source);
    let output = display_relative(root, &report.output);
    match report.status {
        FileStatus::Written => println!(
            "{} {}: {} tests -> {}",
            "✓".green(),
            source,
            report.tests,
            output
        ),
        FileStatus::WouldWrite => println!(
            "{} {}: {} tests, would write {}",
            "✓".green(),
            source,
            report.tests,
            output
        ),
        FileStatus::Unchanged => println!(
            "{} {}: {} tests, {} up to date",
            "⊙".yellow(),
            source,
            report.tests,
            output
        ),
        FileStatus::NoTests => println!("{} {}: no tests", "⊘".cyan(), source),
    }
    for warning in &report.warnings {
        eprintln!("  {} {}", "warning:".yellow(), warning);
    }
}

fn print_failure(error: &GenerateError) {
    eprintln!("{} {}", "✗".red(), error);
    if let GenerateError::Fidelity(FidelityError::Mismatch { diff, .. }) = error {
        eprintln!("  {}", "Rendered tree does not match the source:".red());
        for line in diff.lines() {
            let line = if line.starts_with("+++") || line.starts_with("---") {
                line.dimmed()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else {
                line.normal()
            };
            eprintln!("  {line}");
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!("{}", "Summary:".bold());
    println!(
        "  {} generated",
        format!(
            "{}",
            summary.count(FileStatus::Written) + summary.count(FileStatus::WouldWrite)
        )
        .green()
    );
    println!(
        "  {} unchanged",
        format!("{}", summary.count(FileStatus::Unchanged)).yellow()
    );
    println!(
        "  {} without tests",
        format!("{}", summary.count(FileStatus::NoTests)).cyan()
    );
    println!("  {} tests", summary.test_count());
    if summary.warning_count() > 0 {
        println!(
            "  {} warnings",
            format!("{}", summary.warning_count()).yellow()
        );
    }
    println!("  {} failed", format!("{}", summary.failures.len()).red());
}
