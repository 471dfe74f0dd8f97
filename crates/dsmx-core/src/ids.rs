//! Deterministic identifier generation.

use std::collections::HashSet;

/// Uppercase ASCII alphanumeric runs of `text`, joined by `_`.
///
/// Returns `"ITEM"` when the text has no alphanumeric characters.
pub fn slugify_id(text: &str) -> String {
    let upper = text.to_uppercase();
    let tokens: Vec<&str> = upper
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        "ITEM".to_string()
    } else {
        tokens.join("_")
    }
}

/// Hands out unique identifiers within one namespace.
///
/// The first claim of a base gets the base itself; later claims get `_2`,
/// `_3`, ... in claim order.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an identifier derived from `base`.
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "ITEM" } else { base };
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}_{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
