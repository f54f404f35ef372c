use forkline::commands::path::PathCommand;
use forkline_core::export::ConversationFile;
use forkline_core::{Message, Preferences};
use rstest::rstest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BARE_EXPORT: &str = r#"[
  {"id": "u1", "role": "user", "content": "Plan a trip", "childrenIds": ["a1", "a2"]},
  {"id": "a1", "role": "assistant", "content": "Go to the coast", "parentId": "u1",
   "createdAt": "2025-03-01T10:00:00Z"},
  {"id": "a2", "role": "assistant", "content": "Go to the mountains", "parentId": "u1",
   "childrenIds": ["u2"]},
  {"id": "u2", "role": "user", "content": "Which ones?", "parentId": "a2", "childrenIds": ["a3"]},
  {"id": "a3", "role": "assistant", "content": "The Alps", "parentId": "u2",
   "createdAt": "2025-03-01T10:05:00Z"}
]"#;

fn write_export(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("conversation.json");
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(file: &Path, leaf: Option<&str>, json: bool) -> String {
    let command = PathCommand {
        file: file.to_path_buf(),
        leaf: leaf.map(str::to_string),
        json,
        preferences: Preferences::default(),
    };
    let mut out = Vec::new();
    command.write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn prints_the_latest_branch_by_default() {
    let dir = TempDir::new().unwrap();
    let file = write_export(&dir, BARE_EXPORT);

    assert_eq!(
        run(&file, None, false),
        "[1/1] user: Plan a trip\n\
         [2/2] assistant: Go to the mountains\n\
         [1/1] user: Which ones?\n\
         [1/1] assistant: The Alps\n"
    );
}

#[rstest]
#[case::explicit_leaf("a1", &["u1", "a1"])]
#[case::inner_node_resolves_down("a2", &["u1", "a2", "u2", "a3"])]
fn leaf_option_selects_the_path(#[case] leaf: &str, #[case] expected: &[&str]) {
    let dir = TempDir::new().unwrap();
    let file = write_export(&dir, BARE_EXPORT);

    let output = run(&file, Some(leaf), true);
    let path: Vec<Message> = parse_path(&output);
    let ids: Vec<&str> = path.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn stored_active_leaf_is_honoured() {
    let dir = TempDir::new().unwrap();
    let mut file = ConversationFile::parse(BARE_EXPORT).unwrap();
    file.active_leaf_id = Some("a1".into());
    let path = dir.path().join("wrapped.json");
    file.save(&path).unwrap();

    assert_eq!(
        run(&path, None, false),
        "[1/1] user: Plan a trip\n[1/2] assistant: Go to the coast\n"
    );
}

#[test]
fn unknown_leaf_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = write_export(&dir, BARE_EXPORT);
    let command = PathCommand {
        file,
        leaf: Some("nope".into()),
        json: false,
        preferences: Preferences::default(),
    };

    let mut out = Vec::new();
    let err = command.write_to(&mut out).unwrap_err();
    assert!(err.to_string().contains("nope"));
    assert!(out.is_empty());
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let command = PathCommand {
        file: dir.path().join("absent.json"),
        leaf: None,
        json: false,
        preferences: Preferences::default(),
    };

    assert!(command.write_to(&mut Vec::new()).is_err());
}

fn parse_path(output: &str) -> Vec<Message> {
    ConversationFile::parse(output).unwrap().messages
}
