//! stylepath CLI (made by FontLab https://www.fontlab.com/)

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use stylepath_core::output::{write_json_pretty, write_ndjson};
use stylepath_core::prefix::SOURCE_ROOT_MARKER;
use stylepath_core::rewrite::{rewrite_tree, RewriteEvent, RewriteOptions, RewriteReport};

const DEFAULT_ROOT: &str = "src";
const DEFAULT_BUILD_COMMAND: &str = "npm run build";

/// CLI entrypoint for stylepath.
#[derive(Debug, Parser)]
#[command(
    name = "stylepath",
    about = "Point every shared styles import at components/styles/ (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Source directory to rewrite
    #[arg(default_value = DEFAULT_ROOT, value_hint = ValueHint::DirPath)]
    root: PathBuf,

    /// Directory name that anchors each file's depth
    #[arg(long = "marker", default_value = SOURCE_ROOT_MARKER)]
    marker: String,

    /// Report what would change without writing any file
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,

    /// Follow symlinks while walking the tree
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Do not run the build command afterwards
    #[arg(long = "skip-build", action = ArgAction::SetTrue)]
    skip_build: bool,

    /// Program and arguments to run once rewriting is done
    #[arg(long = "build-command", default_value = DEFAULT_BUILD_COMMAND)]
    build_command: String,

    /// Emit the report as a single JSON object
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit one JSON object per file event
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn machine_readable(&self) -> bool {
        self.json || self.ndjson
    }

    fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            marker: self.marker.clone(),
            follow_symlinks: self.follow_symlinks,
            dry_run: self.dry_run,
            ..RewriteOptions::default()
        }
    }
}

/// External program run after rewriting; its exit status is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: String,
    args: Vec<String>,
}

impl BuildCommand {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("build command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn run(&self, stdout_to_stderr: bool) {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if stdout_to_stderr {
            command.stdout(io::stderr());
        }

        match command.status() {
            Ok(status) => tracing::debug!(program = %self.program, %status, "build command finished"),
            Err(err) => {
                tracing::warn!(program = %self.program, error = %err, "could not start build command")
            }
        }
    }
}

/// Parse CLI args and execute the rewrite followed by the build.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    execute(&cli, &mut handle)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the transcript or JSON; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let build = if cli.skip_build {
        None
    } else {
        Some(BuildCommand::parse(&cli.build_command)?)
    };
    let machine = cli.machine_readable();

    if !machine {
        writeln!(out, "Fixing all CSS imports...")?;
    }

    let report = rewrite_or_report(&cli.root, &cli.rewrite_options());

    if cli.ndjson {
        write_ndjson(&report.events, &mut *out)?;
    } else if cli.json {
        write_json_pretty(&report, &mut *out)?;
    } else {
        write_transcript(&report, cli.dry_run, &mut *out)?;
    }

    if let Some(build) = build {
        if !machine {
            writeln!(out, "Running build...")?;
        }
        out.flush()?;
        build.run(machine);
    }

    Ok(())
}

/// A root that cannot be walked becomes a failure entry, so the build still runs.
fn rewrite_or_report(root: &Path, options: &RewriteOptions) -> RewriteReport {
    match rewrite_tree(root, options) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(root = %root.display(), error = %format!("{err:#}"), "rewrite pass did not start");
            let mut report = RewriteReport::default();
            report.record(RewriteEvent::Failed {
                path: Some(root.to_path_buf()),
                message: format!("{err:#}"),
            });
            report
        }
    }
}

fn write_transcript(report: &RewriteReport, dry_run: bool, mut w: impl Write) -> Result<()> {
    let verb = if dry_run { "Would fix" } else { "Fixed" };

    for event in &report.events {
        match event {
            RewriteEvent::Rewritten { path, .. } => {
                writeln!(w, "{verb}: {}", path.display())?;
            }
            RewriteEvent::Failed { path, message } => {
                let shown = path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown entry>".to_string());
                writeln!(w, "Error processing {shown}: {message}")?;
            }
            RewriteEvent::Unchanged { .. } | RewriteEvent::OutsideSourceRoot { .. } => {}
        }
    }

    writeln!(w)?;
    writeln!(w, "{verb} {} files", report.modified)?;
    Ok(())
}

#[cfg(test)]
mod tests;
