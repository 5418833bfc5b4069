mod logging;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use markdown_rewrite_config::{ConfigError, LoadOptions};
use markdown_rewrite_core::{
    run_command, Command, CommandOutcome, Config, ExitCode, FileDocument,
    MemoryDocument, Navigator, RecordingNavigator, RewriteError, TransformOutcome, WriteOptions,
};
use serde_json::json;

const STDIN_NAME: &str = "<stdin>";

#[derive(Parser, Debug)]
#[command(author, version, about = "Markdown note normalizer and daily-note navigator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CommandArg,

    /// Configuration file overriding discovered .markdown-rewrite.toml files
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Print diff without writing changes
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,

    /// Disable backup creation
    #[arg(long = "no-backup", global = true)]
    no_backup: bool,

    /// Suppress informational output (diffs, success messages)
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    /// Print a JSON summary of the outcome
    #[arg(long = "json", global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum CommandArg {
    /// Promote section labels, insert the TOC marker, normalize images and number headings
    #[command(name = "modify")]
    Modify(Target),

    /// Turn `## 三、Title` headings back into `## 3 Title`
    #[command(name = "delete-level-2-header", alias = "del-2-header")]
    DeleteLevel2Header(Target),

    /// Resolve the daily note after FILE
    #[command(name = "open-next-day", alias = "next-day")]
    OpenNextDay(Target),

    /// Resolve the daily note before FILE
    #[command(name = "open-previous-day", alias = "previous-day")]
    OpenPreviousDay(Target),
}

#[derive(Args, Debug)]
struct Target {
    /// Path to markdown file ('-' reads stdin for modify and delete-level-2-header)
    #[arg(value_name = "FILE", allow_hyphen_values = true)]
    file: PathBuf,
}

impl CommandArg {
    fn command(&self) -> Command {
        match self {
            CommandArg::Modify(_) => Command::Modify,
            CommandArg::DeleteLevel2Header(_) => Command::DeleteLevel2Header,
            CommandArg::OpenNextDay(_) => Command::OpenNextDay,
            CommandArg::OpenPreviousDay(_) => Command::OpenPreviousDay,
        }
    }

    fn file(&self) -> &Path {
        match self {
            CommandArg::Modify(target)
            | CommandArg::DeleteLevel2Header(target)
            | CommandArg::OpenNextDay(target)
            | CommandArg::OpenPreviousDay(target) => &target.file,
        }
    }
}

/// Navigator for a terminal: resolves the target next to the current file.
struct SiblingNavigator {
    dir: PathBuf,
    opened: Option<PathBuf>,
}

impl SiblingNavigator {
    fn beside(file: &Path) -> Self {
        Self {
            dir: file.parent().map(Path::to_path_buf).unwrap_or_default(),
            opened: None,
        }
    }
}

impl Navigator for SiblingNavigator {
    fn navigate_to(&mut self, file_name: &str) {
        let target = self.dir.join(file_name);
        if !target.exists() {
            tracing::warn!(path = %target.display(), "{file_name} not found");
        }
        self.opened = Some(target);
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let exit = match run(&cli) {
        Ok(exit) => exit,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code_for(&err)
        }
    };
    logging::flush();
    std::process::ExitCode::from(exit as u8)
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    logging::init(&config.logging, cli.quiet)?;
    tracing::debug!(sources = %config.sources.describe(), "configuration loaded");

    let command = cli.command.command();
    let file = cli.command.file();

    if file == Path::new("-") {
        return run_stdin(cli, command, &config);
    }

    let options = WriteOptions {
        dry_run: cli.dry_run,
        backup: !cli.no_backup,
    };
    let mut document = FileDocument::new(file, options);
    let mut navigator = SiblingNavigator::beside(file);

    let outcome = run_command(command, &mut document, &mut navigator, &config)
        .with_context(|| format!("{command} failed for {}", file.display()))?;

    if cli.json {
        let summary = summarize(command, file, &outcome, navigator.opened.as_deref(), cli);
        print_stdout(&format!("{summary}\n"))?;
    } else if !cli.quiet {
        report(cli, command, file, &outcome, navigator.opened.as_deref())?;
    }

    Ok(outcome.exit_code())
}

fn run_stdin(cli: &Cli, command: Command, config: &Config) -> Result<ExitCode> {
    if matches!(command, Command::OpenNextDay | Command::OpenPreviousDay) {
        return Err(RewriteError::InvalidArguments(format!(
            "{command} needs a file name, not stdin"
        ))
        .into());
    }

    let mut text = String::new();
    io::stdin()
        .lock()
        .read_to_string(&mut text)
        .map_err(RewriteError::Io)
        .context("failed to read stdin")?;

    let mut document = MemoryDocument::new(STDIN_NAME, text);
    let mut navigator = RecordingNavigator::default();
    let outcome = run_command(command, &mut document, &mut navigator, config)?;
    let text = document.into_text();

    if cli.json {
        let mut summary = summarize(command, Path::new("-"), &outcome, None, cli);
        summary["text"] = json!(text);
        return print_stdout(&format!("{summary}\n")).map(|()| outcome.exit_code());
    }

    if cli.dry_run {
        if let CommandOutcome::Transformed {
            diff: Some(diff), ..
        } = &outcome
        {
            print_stdout(diff)?;
        }
    } else {
        print_stdout(&text)?;
    }

    Ok(outcome.exit_code())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    Config::load(options)
        .map_err(RewriteError::from)
        .context("failed to load configuration")
}

fn report(
    cli: &Cli,
    command: Command,
    file: &Path,
    outcome: &CommandOutcome,
    opened: Option<&Path>,
) -> Result<()> {
    match outcome {
        CommandOutcome::Transformed { outcome, diff } => {
            if let Some(diff) = diff {
                print_stdout(diff)?;
            }
            let message = if !outcome.changed {
                "No changes needed.".to_string()
            } else if cli.dry_run {
                "No changes written (dry run).".to_string()
            } else {
                format!(
                    "{}: updated {} ({} rewrites)",
                    command.display_name(),
                    file.display(),
                    outcome.report.total_rewrites()
                )
            };
            print_stdout(&format!("{message}\n"))
        }
        CommandOutcome::Navigated { to, .. } => {
            let path = opened.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(to));
            print_stdout(&format!("{}\n", path.display()))
        }
        CommandOutcome::NotApplicable { name } => {
            eprintln!("'{name}' is not a daily note (expected YYYY-MM-DD)");
            Ok(())
        }
    }
}

fn summarize(
    command: Command,
    file: &Path,
    outcome: &CommandOutcome,
    opened: Option<&Path>,
    cli: &Cli,
) -> serde_json::Value {
    match outcome {
        CommandOutcome::Transformed { outcome, diff } => json!({
            "command": command.id(),
            "title": command.display_name(),
            "file": file.display().to_string(),
            "status": "transformed",
            "changed": outcome.changed,
            "dry_run": cli.dry_run,
            "rewrites": rewrites_json(outcome),
            "diagnostics": outcome
                .report
                .diagnostics
                .iter()
                .map(|d| json!({ "line": d.line, "message": d.message }))
                .collect::<Vec<_>>(),
            "diff": diff,
        }),
        CommandOutcome::Navigated { from, to } => json!({
            "command": command.id(),
            "title": command.display_name(),
            "file": file.display().to_string(),
            "status": "navigated",
            "from": from,
            "to": to,
            "path": opened.map(|path| path.display().to_string()),
            "exists": opened.is_some_and(Path::exists),
        }),
        CommandOutcome::NotApplicable { name } => json!({
            "command": command.id(),
            "title": command.display_name(),
            "file": file.display().to_string(),
            "status": "not-applicable",
            "name": name,
        }),
    }
}

fn rewrites_json(outcome: &TransformOutcome) -> serde_json::Value {
    let report = &outcome.report;
    json!({
        "labels_promoted": report.labels_promoted,
        "toc_inserted": report.toc_inserted,
        "embeds": report.embeds_rewritten,
        "images": report.images_rewritten,
        "headings": report.headings_rewritten,
        "total": report.total_rewrites(),
    })
}

fn print_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match handle.write_all(text.as_bytes()).and_then(|()| handle.flush()) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(RewriteError::Io(err)).context("failed to write stdout"),
    }
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if let Some(err) = err.downcast_ref::<RewriteError>() {
        return err.exit_code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return ExitCode::Config;
    }
    ExitCode::Io
}
