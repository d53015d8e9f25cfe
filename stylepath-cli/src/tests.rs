use super::*;
use clap::CommandFactory;
use std::fs;
use std::io::Cursor;
use stylepath_core::prefix::TargetPrefix;
use tempfile::tempdir;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["stylepath"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("parse cli")
}

fn run_to_string(cli: &Cli) -> String {
    let mut buf = Cursor::new(Vec::new());
    execute(cli, &mut buf).expect("execute");
    String::from_utf8(buf.into_inner()).expect("utf8")
}

fn sample_tree() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempdir().expect("tempdir");
    let src = tmp.path().join("src");
    fs::create_dir_all(src.join("pages")).expect("mkdir");
    fs::write(src.join("pages/Home.jsx"), "import './styles/button.css';\n").expect("write");
    fs::write(src.join("App.jsx"), "import React from 'react';\n").expect("write");
    (tmp, src)
}

#[test]
fn defaults_match_fixed_layout() {
    let cli = parse(&[]);

    assert_eq!(cli.root, PathBuf::from("src"));
    assert_eq!(cli.marker, "src");
    assert_eq!(cli.build_command, "npm run build");
    assert!(!cli.dry_run);
    assert!(!cli.skip_build);
    assert_eq!(cli.rewrite_options(), RewriteOptions::default());
}

#[test]
fn json_and_ndjson_conflict() {
    let parse = Cli::try_parse_from(["stylepath", "--json", "--ndjson"]);
    assert!(parse.is_err());
}

#[test]
fn verbose_flag_counts() {
    let cli = parse(&["-vv", "web/src"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.root, PathBuf::from("web/src"));
}

#[test]
fn build_command_splits_on_whitespace() {
    let cmd = BuildCommand::parse("  npm   run build ").expect("parse");
    assert_eq!(
        cmd,
        BuildCommand {
            program: "npm".to_string(),
            args: vec!["run".to_string(), "build".to_string()],
        }
    );
}

#[test]
fn empty_build_command_is_rejected() {
    assert!(BuildCommand::parse("   ").is_err());

    let (_tmp, src) = sample_tree();
    let cli = parse(&["--build-command", "", src.to_str().expect("utf8 path")]);
    let mut buf = Cursor::new(Vec::new());
    assert!(execute(&cli, &mut buf).is_err());
}

#[test]
fn transcript_lists_fixed_files_and_count() {
    let (_tmp, src) = sample_tree();
    let cli = parse(&["--skip-build", src.to_str().expect("utf8 path")]);

    let output = run_to_string(&cli);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "Fixing all CSS imports...");
    assert!(lines[1].starts_with("Fixed: "));
    assert!(lines[1].ends_with("Home.jsx"));
    assert_eq!(lines[2], "");
    assert_eq!(lines[3], "Fixed 1 files");
    assert!(!output.contains("Running build..."));
    assert_eq!(
        fs::read_to_string(src.join("pages/Home.jsx")).expect("read"),
        "import '../components/styles/button.css';\n"
    );
}

#[test]
fn dry_run_transcript_uses_conditional_verb() {
    let (_tmp, src) = sample_tree();
    let cli = parse(&["--skip-build", "--dry-run", src.to_str().expect("utf8 path")]);

    let output = run_to_string(&cli);

    assert!(output.contains("Would fix 1 files"));
    assert_eq!(
        fs::read_to_string(src.join("pages/Home.jsx")).expect("read"),
        "import './styles/button.css';\n"
    );
}

#[test]
fn missing_root_is_reported_not_fatal() {
    let tmp = tempdir().expect("tempdir");
    let missing = tmp.path().join("src");
    let cli = parse(&["--skip-build", missing.to_str().expect("utf8 path")]);

    let output = run_to_string(&cli);

    assert!(output.contains("Error processing"));
    assert!(output.contains("root path does not exist"));
    assert!(output.contains("Fixed 0 files"));
}

#[test]
fn ndjson_output_has_no_transcript() {
    let (_tmp, src) = sample_tree();
    let cli = parse(&["--skip-build", "--ndjson", src.to_str().expect("utf8 path")]);

    let output = run_to_string(&cli);

    assert!(!output.contains("Fixing all CSS imports"));
    let events: Vec<RewriteEvent> = output
        .lines()
        .map(|l| serde_json::from_str(l).expect("event json"))
        .collect();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| matches!(
        e,
        RewriteEvent::Rewritten { prefix, .. } if *prefix == TargetPrefix::at_depth(1)
    )));
}

#[test]
fn transcript_reports_failures() {
    let mut report = RewriteReport::default();
    report.record(RewriteEvent::Failed {
        path: Some(PathBuf::from("src/bad.js")),
        message: "reading src/bad.js: stream did not contain valid UTF-8".to_string(),
    });
    report.record(RewriteEvent::Failed {
        path: None,
        message: "permission denied".to_string(),
    });

    let mut buf = Cursor::new(Vec::new());
    write_transcript(&report, false, &mut buf).expect("write");

    let output = String::from_utf8(buf.into_inner()).expect("utf8");
    assert!(output.contains("Error processing src/bad.js: reading src/bad.js"));
    assert!(output.contains("Error processing <unknown entry>: permission denied"));
    assert!(output.ends_with("Fixed 0 files\n"));
}

#[cfg(unix)]
#[test]
fn build_runs_after_rewrite() {
    let (tmp, src) = sample_tree();
    let marker = tmp.path().join("built");
    let command = format!("touch {}", marker.display());
    let cli = parse(&["--build-command", &command, src.to_str().expect("utf8 path")]);

    let output = run_to_string(&cli);

    assert!(output.trim_end().ends_with("Running build..."));
    assert!(marker.exists());
}

#[cfg(unix)]
#[test]
fn failing_build_does_not_fail_the_run() {
    let (_tmp, src) = sample_tree();
    let cli = parse(&["--build-command", "false", src.to_str().expect("utf8 path")]);

    let mut buf = Cursor::new(Vec::new());
    assert!(execute(&cli, &mut buf).is_ok());

    let missing = parse(&[
        "--build-command",
        "stylepath-no-such-build-tool",
        src.to_str().expect("utf8 path"),
    ]);
    assert!(execute(&missing, &mut buf).is_ok());
}

#[test]
fn help_lists_build_flags() {
    let help = Cli::command().render_long_help().to_string();
    assert!(help.contains("--skip-build"));
    assert!(help.contains("--build-command <BUILD_COMMAND>"));
    assert!(help.contains("--dry-run"));
}
