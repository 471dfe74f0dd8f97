//! Line reconstruction from positioned tokens.
//!
//! Tokens are grouped into visual lines by vertical proximity, sorted
//! left-to-right, and letter-spaced runs ("D I A G N O S T I C") are
//! merged back into words before the line text is rendered.

use std::sync::LazyLock;

use regex::Regex;

use crate::geometry::BBox;
use crate::token::Token;

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").expect("valid punctuation regex"));
static SPACE_AFTER_OPEN_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s+").expect("valid open paren regex"));
static SPACE_BEFORE_CLOSE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\)").expect("valid close paren regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Policy for merging letter-spaced tokens back into words.
///
/// A line qualifies when it has at least `min_tokens` tokens and the share
/// of single-letter tokens reaches `min_single_letter_ratio`. Adjacent tokens
/// are then merged while their horizontal gap stays within the threshold
/// computed by [`SpacedLetterPolicy::gap_threshold`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpacedLetterPolicy {
    /// Minimum number of tokens on the line. Default: 6.
    pub min_tokens: usize,
    /// Minimum fraction of single-letter tokens. Default: 0.6.
    pub min_single_letter_ratio: f64,
    /// Multiplier applied to the median gap. Default: 1.5.
    pub median_factor: f64,
    /// Absolute floor for the merge threshold. Default: 1.0.
    pub min_threshold: f64,
}

impl Default for SpacedLetterPolicy {
    fn default() -> Self {
        Self {
            min_tokens: 6,
            min_single_letter_ratio: 0.6,
            median_factor: 1.5,
            min_threshold: 1.0,
        }
    }
}

impl SpacedLetterPolicy {
    /// Whether a left-to-right sorted line looks letter-spaced.
    pub fn applies_to(&self, tokens: &[Token]) -> bool {
        if tokens.is_empty() || tokens.len() < self.min_tokens {
            return false;
        }
        let singles = tokens.iter().filter(|t| t.is_single_letter()).count();
        singles as f64 / tokens.len() as f64 >= self.min_single_letter_ratio
    }

    /// Merge threshold for a set of inter-token gaps.
    ///
    /// `max(median_factor * p50, (p50 + p90) / 2, min_threshold)` where
    /// p50 is the upper median and p90 the value at `floor(0.9 * n) - 1`.
    /// Returns `None` when there are no gaps.
    pub fn gap_threshold(&self, gaps: &[f64]) -> Option<f64> {
        if gaps.is_empty() {
            return None;
        }
        let mut sorted = gaps.to_vec();
        sorted.sort_by(f64::total_cmp);
        let p50 = sorted[sorted.len() / 2];
        let p90_index = ((sorted.len() as f64 * 0.9) as usize).saturating_sub(1);
        let p90 = sorted[p90_index];
        Some(
            (self.median_factor * p50)
                .max((p50 + p90) / 2.0)
                .max(self.min_threshold),
        )
    }
}

/// Options for clustering tokens into lines.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineOptions {
    /// Maximum distance between a token's top and the line's reference top. Default: 3.0.
    pub y_tolerance: f64,
    /// Letter-spacing repair policy.
    pub spaced_letters: SpacedLetterPolicy,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            y_tolerance: 3.0,
            spaced_letters: SpacedLetterPolicy::default(),
        }
    }
}

/// A reconstructed visual line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextLine {
    /// Tokens in left-to-right order, after letter-spacing repair.
    pub tokens: Vec<Token>,
    /// Union of all token boxes.
    pub bbox: BBox,
    /// Rendered line text.
    pub text: String,
}

impl TextLine {
    fn from_tokens(tokens: Vec<Token>) -> Option<Self> {
        let first = tokens.first()?;
        let bbox = tokens
            .iter()
            .skip(1)
            .fold(first.bbox, |acc, t| acc.union(&t.bbox));
        let text = line_text(&tokens);
        Some(Self { tokens, bbox, text })
    }
}

/// Cluster tokens into visual lines.
///
/// Tokens are sorted by `(top, x0)` and a token joins the current line when
/// its top is within `y_tolerance` of the line's first token. Ties on both
/// keys fall back to the token text so the result never depends on input order.
pub fn cluster_tokens_into_lines(tokens: &[Token], options: &LineOptions) -> Vec<TextLine> {
    let mut sorted: Vec<&Token> = tokens
        .iter()
        .filter(|t| !t.text.trim().is_empty())
        .collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
            .then_with(|| a.text.cmp(&b.text))
    });

    let mut groups: Vec<Vec<Token>> = Vec::new();
    let mut reference_top = 0.0;
    for token in sorted {
        match groups.last_mut() {
            Some(current) if (token.bbox.top - reference_top).abs() <= options.y_tolerance => {
                current.push(token.clone());
            }
            _ => {
                reference_top = token.bbox.top;
                groups.push(vec![token.clone()]);
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            group.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            TextLine::from_tokens(merge_spaced_letters(group, &options.spaced_letters))
        })
        .collect()
}

/// Merge letter-spaced tokens of a single line.
///
/// `tokens` must already be sorted left-to-right. Lines the policy does not
/// apply to are returned unchanged.
pub fn merge_spaced_letters(tokens: Vec<Token>, policy: &SpacedLetterPolicy) -> Vec<Token> {
    if !policy.applies_to(&tokens) {
        return tokens;
    }
    let gaps: Vec<f64> = tokens
        .windows(2)
        .map(|pair| (pair[1].bbox.x0 - pair[0].bbox.x1).max(0.0))
        .collect();
    let Some(threshold) = policy.gap_threshold(&gaps) else {
        return tokens;
    };

    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        match merged.last_mut() {
            Some(prev) if (token.bbox.x0 - prev.bbox.x1).max(0.0) <= threshold => {
                prev.text.push_str(&token.text);
                prev.bbox = prev.bbox.union(&token.bbox);
            }
            _ => merged.push(token),
        }
    }
    merged
}

/// Render tokens as line text.
///
/// Tokens are joined with single spaces, then spaces before `, . ; : ! ?`,
/// after `(` and before `)` are removed and whitespace runs collapsed.
pub fn line_text(tokens: &[Token]) -> String {
    let joined = tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&joined, "$1");
    let text = SPACE_AFTER_OPEN_PAREN.replace_all(&text, "(");
    let text = SPACE_BEFORE_CLOSE_PAREN.replace_all(&text, ")");
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(text: &str, x0: f64, top: f64, x1: f64, bottom: f64) -> Token {
        Token::new(text, x0, top, x1, bottom)
    }

    /// Single letters of `word`, each 5pt wide with a 1pt gap, starting at `x`.
    fn spaced_word(word: &str, x: f64, top: f64) -> Vec<Token> {
        word.chars()
            .enumerate()
            .map(|(i, c)| {
                let x0 = x + i as f64 * 6.0;
                make_token(&c.to_string(), x0, top, x0 + 5.0, top + 10.0)
            })
            .collect()
    }

    // --- clustering ---

    #[test]
    fn test_cluster_groups_by_reference_top() {
        let tokens = vec![
            make_token("world", 60.0, 101.5, 90.0, 111.5),
            make_token("Hello", 10.0, 100.0, 50.0, 110.0),
            make_token("Next", 10.0, 120.0, 40.0, 130.0),
        ];
        let lines = cluster_tokens_into_lines(&tokens, &LineOptions::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[1].text, "Next");
        assert_eq!(lines[0].bbox, BBox::new(10.0, 100.0, 90.0, 111.5));
    }

    #[test]
    fn test_cluster_reference_is_first_token_not_running_top() {
        // 100 -> 102.5 -> 105: the third token is 5pt from the line's first token.
        let tokens = vec![
            make_token("a", 10.0, 100.0, 15.0, 110.0),
            make_token("b", 20.0, 102.5, 25.0, 112.5),
            make_token("c", 30.0, 105.0, 35.0, 115.0),
        ];
        let lines = cluster_tokens_into_lines(&tokens, &LineOptions::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "a b");
        assert_eq!(lines[1].text, "c");
    }

    #[test]
    fn test_cluster_is_independent_of_input_order() {
        let tokens = vec![
            make_token("Diagnostic", 10.0, 100.0, 60.0, 110.0),
            make_token("Criteria", 65.0, 100.0, 100.0, 110.0),
            make_token("A.", 10.0, 130.0, 20.0, 140.0),
            make_token("Five", 25.0, 131.0, 45.0, 141.0),
        ];
        let mut reversed = tokens.clone();
        reversed.reverse();
        let a = cluster_tokens_into_lines(&tokens, &LineOptions::default());
        let b = cluster_tokens_into_lines(&reversed, &LineOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_reclustering_line_tokens_gives_same_lines() {
        let mut tokens = spaced_word("Criteria", 10.0, 100.0);
        tokens.extend([
            make_token("Major", 10.0, 120.0, 40.0, 130.0),
            make_token("Depressive", 44.0, 121.0, 100.0, 131.0),
            make_token("Disorder", 104.0, 120.5, 150.0, 130.5),
            make_token("A.", 10.0, 140.0, 20.0, 150.0),
            make_token("Five", 25.0, 139.0, 45.0, 149.0),
        ]);
        let options = LineOptions::default();
        let first = cluster_tokens_into_lines(&tokens, &options);
        let flattened: Vec<Token> = first.iter().flat_map(|l| l.tokens.clone()).collect();
        let second = cluster_tokens_into_lines(&flattened, &options);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].text, "Criteria");
        assert_eq!(second, first);
    }

    #[test]
    fn test_cluster_skips_blank_tokens() {
        let tokens = vec![
            make_token("  ", 10.0, 100.0, 15.0, 110.0),
            make_token("Text", 20.0, 100.0, 40.0, 110.0),
        ];
        let lines = cluster_tokens_into_lines(&tokens, &LineOptions::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].tokens.len(), 1);
    }

    #[test]
    fn test_cluster_empty_input() {
        assert!(cluster_tokens_into_lines(&[], &LineOptions::default()).is_empty());
    }

    // --- spaced letters ---

    #[test]
    fn test_spaced_letters_merge_into_words() {
        let mut tokens = spaced_word("Diagnostic", 10.0, 100.0);
        // Last letter ends at 10 + 9*6 + 5 = 69; a 6pt word gap follows.
        tokens.push(make_token("Criteria", 75.0, 100.0, 115.0, 110.0));
        let lines = cluster_tokens_into_lines(&tokens, &LineOptions::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Diagnostic Criteria");
        assert_eq!(lines[0].tokens[0].bbox, BBox::new(10.0, 100.0, 69.0, 110.0));
    }

    #[test]
    fn test_spaced_letters_require_min_tokens() {
        let tokens = spaced_word("DSM", 10.0, 100.0);
        let merged = merge_spaced_letters(tokens.clone(), &SpacedLetterPolicy::default());
        assert_eq!(merged, tokens);
    }

    #[test]
    fn test_spaced_letters_require_single_letter_ratio() {
        let tokens = vec![
            make_token("The", 0.0, 0.0, 15.0, 10.0),
            make_token("a", 16.0, 0.0, 20.0, 10.0),
            make_token("cat", 21.0, 0.0, 35.0, 10.0),
            make_token("sat", 36.0, 0.0, 50.0, 10.0),
            make_token("on", 51.0, 0.0, 60.0, 10.0),
            make_token("a", 61.0, 0.0, 65.0, 10.0),
        ];
        let merged = merge_spaced_letters(tokens.clone(), &SpacedLetterPolicy::default());
        assert_eq!(merged, tokens);
    }

    #[test]
    fn test_gap_threshold_percentiles() {
        let policy = SpacedLetterPolicy::default();
        // sorted: [1,1,1,1,2,2,2,2,10,10]; p50 = 2, p90 = sorted[8] = 10
        let gaps = [1.0, 10.0, 1.0, 2.0, 1.0, 2.0, 10.0, 2.0, 1.0, 2.0];
        assert_eq!(policy.gap_threshold(&gaps), Some(6.0));
        assert_eq!(policy.gap_threshold(&[0.0]), Some(1.0));
        assert_eq!(policy.gap_threshold(&[]), None);
    }

    // --- line text ---

    #[test]
    fn test_line_text_tightens_punctuation() {
        let tokens = vec![
            make_token("Depressive", 0.0, 0.0, 40.0, 10.0),
            make_token("Disorder", 45.0, 0.0, 80.0, 10.0),
            make_token(",", 81.0, 0.0, 83.0, 10.0),
            make_token("(", 85.0, 0.0, 87.0, 10.0),
            make_token("F32.0", 88.0, 0.0, 110.0, 10.0),
            make_token(")", 111.0, 0.0, 113.0, 10.0),
            make_token(":", 114.0, 0.0, 116.0, 10.0),
        ];
        assert_eq!(line_text(&tokens), "Depressive Disorder, (F32.0):");
    }
}
