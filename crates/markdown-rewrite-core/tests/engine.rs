use std::fs;

use markdown_rewrite_core::fs::backup_path;
use markdown_rewrite_core::{
    apply_transform, resolve, run_command, Command, CommandOutcome, Config, Direction,
    FileDocument, ModifySettings, RecordingNavigator, Transform, WriteOptions,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn write_fixture(name: &str, initial: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, initial).unwrap();
    (dir, path)
}

fn modify(text: &str) -> String {
    apply_transform(Transform::Modify, text, &ModifySettings::default()).text
}

fn delete_numbering(text: &str) -> String {
    apply_transform(
        Transform::DeleteLevel2Header,
        text,
        &ModifySettings::default(),
    )
    .text
}

#[test]
fn modify_rewrites_file_in_place() {
    let (dir, path) = write_fixture(
        "design.md",
        "# Design\r\n\r\n**修订记录**\r\n\r\n## 1 Scope\r\n\r\n![[shot 1.png]]\r\n",
    );

    let mut doc = FileDocument::new(&path, WriteOptions::default());
    let mut nav = RecordingNavigator::default();
    let outcome = run_command(Command::Modify, &mut doc, &mut nav, &Config::default()).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# Design\r\n\r\n[[_TOC_]]\n\n## 修订记录\r\n\r\n## 一、Scope\r\n\r\n![](resource/img/shot%201.png)\r\n"
    );
    assert!(backup_path(&path).exists());
    assert!(matches!(outcome, CommandOutcome::Transformed { .. }));
    drop(dir);
}

#[test]
fn dry_run_leaves_file_untouched_but_reports_diff() {
    let (dir, path) = write_fixture("doc.md", "## 2 Goals\n");

    let mut doc = FileDocument::new(
        &path,
        WriteOptions {
            dry_run: true,
            backup: true,
        },
    );
    let mut nav = RecordingNavigator::default();
    let outcome = run_command(Command::Modify, &mut doc, &mut nav, &Config::default()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "## 2 Goals\n");
    let CommandOutcome::Transformed { diff, outcome } = outcome else {
        panic!("expected a transform outcome");
    };
    assert!(outcome.changed);
    let diff = diff.expect("diff for changed document");
    assert!(diff.contains("-## 2 Goals"));
    assert!(diff.contains("+## 二、Goals"));
    drop(dir);
}

#[test]
fn heading_round_trip_restores_numbers() {
    let original = "## 3 Overview\n\ntext\n\n## 4 Details\n";
    let enumerated = modify(original);
    assert_eq!(enumerated, "## 三、Overview\n\ntext\n\n## 四、Details\n");
    assert_eq!(delete_numbering(&enumerated), original);
}

#[test]
fn toc_marker_is_inserted_at_most_once() {
    let mut text = "intro\n\n**修订记录**\n\nrows\n\n**修订记录**\n".to_string();
    for _ in 0..3 {
        text = modify(&text);
    }
    assert_eq!(text.matches("[[_TOC_]]").count(), 1);
    assert!(text.starts_with("intro\n\n[[_TOC_]]\n\n## 修订记录\n"));
}

#[test]
fn images_normalize_to_canonical_form() {
    assert_eq!(modify("![[a b.png]]"), "![](resource/img/a%20b.png)");
    assert_eq!(
        modify("![x](../assets/a b.png)"),
        "![](resource/img/a%20b.png)"
    );
    assert_eq!(
        modify("![](resource/img/a%20b.png)"),
        "![](resource/img/a%20b.png)"
    );
}

#[test]
fn cjk_image_names_keep_their_characters() {
    let input = "## 1 架构\n\n![[架构 图.png]]\n![流程](../资源/流程 图.png)\n";
    let outcome = apply_transform(Transform::Modify, input, &ModifySettings::default());

    assert_eq!(
        outcome.text,
        "## 一、架构\n\n![](resource/img/架构%20图.png)\n![](resource/img/流程%20图.png)\n"
    );
    assert_eq!(outcome.report.embeds_rewritten, 1);
    assert_eq!(outcome.report.images_rewritten, 1);
    assert_eq!(modify(&outcome.text), outcome.text);
}

#[test]
fn out_of_range_headings_survive_with_diagnostic() {
    let outcome = apply_transform(
        Transform::Modify,
        "## 9 Last\n## 10 Beyond\n",
        &ModifySettings::default(),
    );
    assert_eq!(outcome.text, "## 九、Last\n## 10 Beyond\n");
    assert_eq!(outcome.report.diagnostics.len(), 1);
    assert_eq!(outcome.report.diagnostics[0].line, 2);
}

#[test]
fn adjacent_dates_follow_gregorian_calendar() {
    assert_eq!(
        resolve("2024-02-28.md", Direction::Next).as_deref(),
        Some("2024-02-29.md")
    );
    assert_eq!(
        resolve("2024-12-31.md", Direction::Next).as_deref(),
        Some("2025-01-01.md")
    );
    assert_eq!(resolve("notes.md", Direction::Next), None);
    assert_eq!(
        resolve("2024-03-01.md", Direction::Previous).as_deref(),
        Some("2024-02-29.md")
    );
}

#[test]
fn navigation_uses_file_name_not_full_path() {
    let (dir, path) = write_fixture("2024-02-29.md", "");
    let mut doc = FileDocument::new(&path, WriteOptions::default());
    let mut nav = RecordingNavigator::default();

    run_command(
        Command::OpenPreviousDay,
        &mut doc,
        &mut nav,
        &Config::default(),
    )
    .unwrap();

    assert_eq!(nav.visited, vec!["2024-02-28.md".to_string()]);
    drop(dir);
}
