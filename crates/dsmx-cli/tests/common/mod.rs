//! Word dump fixtures for the CLI tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{Value, json};

pub fn cmd() -> Command {
    Command::cargo_bin("dsmx").unwrap()
}

/// Words of `text` on one baseline: 5pt per character, 4pt gaps, 10pt tall.
pub fn line_words(text: &str, x0: f64, top: f64) -> Vec<Value> {
    let mut x = x0;
    text.split_whitespace()
        .map(|word| {
            let width = word.chars().count() as f64 * 5.0;
            let value = json!({
                "text": word,
                "x0": x,
                "x1": x + width,
                "top": top,
                "bottom": top + 10.0,
            });
            x += width + 4.0;
            value
        })
        .collect()
}

/// A US Letter page whose lines start at x=72, 14pt apart from top=100.
pub fn text_page(lines: &[&str]) -> Value {
    let words: Vec<Value> = lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| line_words(line, 72.0, 100.0 + 14.0 * i as f64))
        .collect();
    json!({"width": 612.0, "height": 792.0, "words": words})
}

/// A book page with a running header, one body line and a page number.
pub fn book_page(number: usize) -> Value {
    let mut words = line_words("Depressive Disorders", 72.0, 30.0);
    words.extend(line_words(&format!("Body text of page {number}"), 72.0, 300.0));
    words.extend(line_words(&number.to_string(), 300.0, 760.0));
    json!({"page_number": number, "width": 612.0, "height": 792.0, "words": words})
}

/// Write `{"pages": pages}` to `dir/words.json`.
pub fn write_dump(dir: &Path, pages: Vec<Value>) -> PathBuf {
    let path = dir.join("words.json");
    std::fs::write(&path, json!({ "pages": pages }).to_string()).unwrap();
    path
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

pub const LISTING: [&str; 10] = [
    "DSM-5 Classification",
    "Depressive Disorders (155)",
    "296.99 (F34.8) Disruptive Mood Dysregulation Disorder (156)",
    "296.21 (F32.0) Major Depressive Disorder (160)",
    "Specify: With anxious distress",
    "Anxiety Disorders (189)",
    "309.21 (F93.0) Separation Anxiety Disorder (190)",
    "Panic Disorders and Attacks (208)",
    "300.01 (F41.0) Panic Disorder (208)",
    "300.22 (F40.00) Agoraphobia (217)",
];

pub const CRITERIA_PAGE: [&str; 4] = [
    "Major depression is common. The following criteria must be met:",
    "A. Five symptoms present.",
    "B. Clinically significant distress.",
    "Specify current severity.",
];
