//! Integration tests for the `words` subcommand.

mod common;

use common::{cmd, text_page, write_dump};
use predicates::prelude::*;

#[test]
fn words_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path(), vec![text_page(&["Hello world"])]);

    cmd()
        .args(["words", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "page\tcolumns\tx0\ttop\tx1\tbottom\ttext\n",
        ))
        .stdout(predicate::str::contains(
            "1\tone\t72.00\t100.00\t126.00\t110.00\tHello world",
        ));
}

#[test]
fn words_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(
        dir.path(),
        vec![text_page(&["first page"]), text_page(&["Hello", "world"])],
    );

    let output = cmd()
        .args(["words", dump.to_str().unwrap(), "--pages", "2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pages = json.as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["page"], 2);
    assert_eq!(pages[0]["column_mode"], "one");
    let lines = pages[0]["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["text"], "Hello");
    assert_eq!(lines[1]["top"], 114.0);
}

#[test]
fn words_empty_page() {
    let dir = tempfile::tempdir().unwrap();
    let dump = write_dump(dir.path(), vec![text_page(&[])]);

    cmd()
        .args(["words", dump.to_str().unwrap()])
        .assert()
        .success()
        .stdout("page\tcolumns\tx0\ttop\tx1\tbottom\ttext\n");
}
