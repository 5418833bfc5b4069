use std::fmt;
use std::str::FromStr;

use markdown_rewrite_config::Config;

use crate::daily::{resolve_with, Direction};
use crate::diff::build_unified_diff;
use crate::error::{ExitCode, RewriteResult};
use crate::host::{Document, Navigator};
use crate::pipeline::{apply_transform, Transform, TransformOutcome};

/// The four user-facing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Modify,
    DeleteLevel2Header,
    OpenNextDay,
    OpenPreviousDay,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Modify,
        Command::DeleteLevel2Header,
        Command::OpenNextDay,
        Command::OpenPreviousDay,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Command::Modify => "modify",
            Command::DeleteLevel2Header => "delete-level-2-header",
            Command::OpenNextDay => "open-next-day",
            Command::OpenPreviousDay => "open-previous-day",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Command::Modify => "Modify",
            Command::DeleteLevel2Header => "Delete level-2 header numbering",
            Command::OpenNextDay => "Open next day",
            Command::OpenPreviousDay => "Open previous day",
        }
    }

    fn action(self) -> Action {
        match self {
            Command::Modify => Action::Transform(Transform::Modify),
            Command::DeleteLevel2Header => Action::Transform(Transform::DeleteLevel2Header),
            Command::OpenNextDay => Action::Navigate(Direction::Next),
            Command::OpenPreviousDay => Action::Navigate(Direction::Previous),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.id() == value)
            .ok_or_else(|| format!("unknown command '{value}'"))
    }
}

enum Action {
    Transform(Transform),
    Navigate(Direction),
}

#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// The document text was replaced with the transform result.
    Transformed {
        outcome: TransformOutcome,
        diff: Option<String>,
    },
    /// The navigator was sent to `to`.
    Navigated { from: String, to: String },
    /// The active document is not a daily note; nothing happened.
    NotApplicable { name: String },
}

impl CommandOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CommandOutcome::Transformed { .. } | CommandOutcome::Navigated { .. } => {
                ExitCode::Success
            }
            CommandOutcome::NotApplicable { .. } => ExitCode::NotApplicable,
        }
    }
}

/// Run `command` against the active document.
///
/// Transforms read the document once and replace it once. Navigation commands
/// only call the navigator when the document name is a date key.
pub fn run_command<D, N>(
    command: Command,
    document: &mut D,
    navigator: &mut N,
    config: &Config,
) -> RewriteResult<CommandOutcome>
where
    D: Document + ?Sized,
    N: Navigator + ?Sized,
{
    let _span = tracing::debug_span!("command", id = command.id()).entered();

    match command.action() {
        Action::Transform(transform) => {
            let original = document.text()?;
            let outcome = apply_transform(transform, &original, &config.modify);

            for diagnostic in &outcome.report.diagnostics {
                tracing::warn!(document = %document.name(), "{diagnostic}");
            }

            let diff = build_unified_diff(&original, &outcome.text, &document.name());
            document.replace_text(outcome.text.clone())?;
            Ok(CommandOutcome::Transformed { outcome, diff })
        }
        Action::Navigate(direction) => {
            let name = document.name();
            match resolve_with(&name, direction, &config.daily) {
                Some(target) => {
                    tracing::debug!(from = %name, to = %target, "navigating");
                    navigator.navigate_to(&target);
                    Ok(CommandOutcome::Navigated {
                        from: name,
                        to: target,
                    })
                }
                None => {
                    tracing::info!(document = %name, "{direction} day not found: not a daily note");
                    Ok(CommandOutcome::NotApplicable { name })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryDocument, RecordingNavigator};

    #[test]
    fn ids_parse_back_to_commands() {
        for command in Command::ALL {
            assert_eq!(command.id().parse::<Command>(), Ok(command));
        }
        assert!("open-tomorrow".parse::<Command>().is_err());
    }

    #[test]
    fn display_names_are_distinct() {
        assert_eq!(Command::Modify.display_name(), "Modify");
        let mut names: Vec<_> = Command::ALL.iter().map(|c| c.display_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Command::ALL.len());
    }

    #[test]
    fn transform_replaces_text_exactly_once() {
        let mut doc = MemoryDocument::new("intro.md", "## 1 Intro\n");
        let mut nav = RecordingNavigator::default();

        let outcome =
            run_command(Command::Modify, &mut doc, &mut nav, &Config::default()).unwrap();

        assert_eq!(doc.contents(), "## 一、Intro\n");
        assert_eq!(doc.writes(), 1);
        assert!(nav.visited.is_empty());
        match outcome {
            CommandOutcome::Transformed { outcome, diff } => {
                assert!(outcome.changed);
                assert!(diff.unwrap().contains("+## 一、Intro"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn unchanged_transform_still_writes_back() {
        let mut doc = MemoryDocument::new("plain.md", "nothing to do\n");
        let mut nav = RecordingNavigator::default();

        let outcome = run_command(
            Command::DeleteLevel2Header,
            &mut doc,
            &mut nav,
            &Config::default(),
        )
        .unwrap();

        assert_eq!(doc.writes(), 1);
        assert!(matches!(
            outcome,
            CommandOutcome::Transformed { diff: None, .. }
        ));
    }

    #[test]
    fn navigation_targets_adjacent_day() {
        let mut doc = MemoryDocument::new("2024-12-31.md", "");
        let mut nav = RecordingNavigator::default();

        let outcome =
            run_command(Command::OpenNextDay, &mut doc, &mut nav, &Config::default()).unwrap();

        assert_eq!(nav.visited, vec!["2025-01-01.md".to_string()]);
        assert_eq!(outcome.exit_code(), ExitCode::Success);
        assert_eq!(doc.writes(), 0);
    }

    #[test]
    fn navigation_on_regular_note_is_not_applicable() {
        let mut doc = MemoryDocument::new("notes.md", "");
        let mut nav = RecordingNavigator::default();

        let outcome = run_command(
            Command::OpenPreviousDay,
            &mut doc,
            &mut nav,
            &Config::default(),
        )
        .unwrap();

        assert!(nav.visited.is_empty());
        assert_eq!(outcome.exit_code(), ExitCode::NotApplicable);
    }
}
