//! Two-column page detection and reading-order sorting.

use crate::lines::TextLine;

/// Column layout of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColumnMode {
    /// Single text flow, ordered top to bottom.
    #[default]
    One,
    /// Left column followed by right column.
    Two,
}

impl ColumnMode {
    /// Lowercase name used in diagnostics (`"one"` / `"two"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnMode::One => "one",
            ColumnMode::Two => "two",
        }
    }
}

/// Options for two-column detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnOptions {
    /// Lines with this many characters or fewer are ignored as noise. Default: 3.
    pub noise_max_chars: usize,
    /// Dead band around the page midpoint, in points. Default: 20.0.
    pub mid_margin: f64,
    /// Lines needed on each side of the midpoint to call a page two-column. Default: 10.
    pub min_lines_per_column: usize,
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            noise_max_chars: 3,
            mid_margin: 20.0,
            min_lines_per_column: 10,
        }
    }
}

/// Decide whether a page is laid out in one or two columns.
///
/// Counts line starts clearly left of `width / 2 - mid_margin` and clearly
/// right of `width / 2 + mid_margin`; the page is two-column only when both
/// counts reach `min_lines_per_column`.
pub fn detect_column_mode(lines: &[TextLine], page_width: f64, options: &ColumnOptions) -> ColumnMode {
    let mid = page_width / 2.0;
    let (mut left, mut right) = (0usize, 0usize);
    for line in lines
        .iter()
        .filter(|l| l.text.chars().count() > options.noise_max_chars)
    {
        if line.bbox.x0 < mid - options.mid_margin {
            left += 1;
        } else if line.bbox.x0 > mid + options.mid_margin {
            right += 1;
        }
    }
    if left >= options.min_lines_per_column && right >= options.min_lines_per_column {
        ColumnMode::Two
    } else {
        ColumnMode::One
    }
}

/// Sort lines into reading order.
///
/// One-column pages are ordered by top. Two-column pages split at the page
/// midpoint (`x0 < mid` is left) and emit the left column before the right,
/// each ordered by top. The sort is stable.
pub fn order_lines(mut lines: Vec<TextLine>, mode: ColumnMode, page_width: f64) -> Vec<TextLine> {
    match mode {
        ColumnMode::One => {
            lines.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));
            lines
        }
        ColumnMode::Two => {
            let mid = page_width / 2.0;
            let (mut left, mut right): (Vec<TextLine>, Vec<TextLine>) =
                lines.into_iter().partition(|l| l.bbox.x0 < mid);
            left.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));
            right.sort_by(|a, b| a.bbox.top.total_cmp(&b.bbox.top));
            left.extend(right);
            left
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{LineOptions, cluster_tokens_into_lines};
    use crate::token::Token;

    fn make_line(text: &str, x0: f64, top: f64) -> TextLine {
        let tokens = vec![Token::new(text, x0, top, x0 + 100.0, top + 10.0)];
        cluster_tokens_into_lines(&tokens, &LineOptions::default())
            .pop()
            .expect("one line")
    }

    fn two_column_page() -> Vec<TextLine> {
        column_page(12)
    }

    fn column_page(per_side: usize) -> Vec<TextLine> {
        let mut lines = Vec::new();
        for i in 0..per_side {
            let top = 100.0 + i as f64 * 20.0;
            lines.push(make_line(&format!("left line {i}"), 50.0, top));
            lines.push(make_line(&format!("right line {i}"), 320.0, top));
        }
        lines
    }

    #[test]
    fn test_detects_two_columns() {
        let mode = detect_column_mode(&two_column_page(), 612.0, &ColumnOptions::default());
        assert_eq!(mode, ColumnMode::Two);
    }

    #[test]
    fn test_nine_lines_per_side_stays_one_column() {
        let lines: Vec<TextLine> = two_column_page()
            .into_iter()
            .filter(|l| !l.text.ends_with(" 9") && !l.text.ends_with("10") && !l.text.ends_with("11"))
            .collect();
        assert_eq!(lines.len(), 18);
        let mode = detect_column_mode(&lines, 612.0, &ColumnOptions::default());
        assert_eq!(mode, ColumnMode::One);
    }

    #[test]
    fn test_exactly_ten_lines_per_side_is_two_columns() {
        let lines = column_page(10);
        assert_eq!(lines.len(), 20);
        let mode = detect_column_mode(&lines, 612.0, &ColumnOptions::default());
        assert_eq!(mode, ColumnMode::Two);
    }

    #[test]
    fn test_five_lines_per_side_is_one_column() {
        let mode = detect_column_mode(&column_page(5), 612.0, &ColumnOptions::default());
        assert_eq!(mode, ColumnMode::One);
    }

    #[test]
    fn test_ten_left_and_nine_right_is_one_column() {
        let lines: Vec<TextLine> = column_page(10)
            .into_iter()
            .filter(|l| l.text != "right line 9")
            .collect();
        let mode = detect_column_mode(&lines, 612.0, &ColumnOptions::default());
        assert_eq!(mode, ColumnMode::One);
    }

    #[test]
    fn test_dead_band_and_short_lines_ignored() {
        let mut lines = Vec::new();
        for i in 0..12 {
            let top = 100.0 + i as f64 * 20.0;
            lines.push(make_line("left text", 50.0, top));
            // Inside the dead band around 306.
            lines.push(make_line("middle text", 300.0, top));
            // Right side but too short to count.
            lines.push(make_line("12", 400.0, top));
        }
        let mode = detect_column_mode(&lines, 612.0, &ColumnOptions::default());
        assert_eq!(mode, ColumnMode::One);
    }

    #[test]
    fn test_two_column_order_is_left_then_right() {
        let ordered = order_lines(two_column_page(), ColumnMode::Two, 612.0);
        assert_eq!(ordered[0].text, "left line 0");
        assert_eq!(ordered[11].text, "left line 11");
        assert_eq!(ordered[12].text, "right line 0");
        assert_eq!(ordered[23].text, "right line 11");
    }

    #[test]
    fn test_one_column_order_is_top_down() {
        let lines = vec![
            make_line("second", 50.0, 200.0),
            make_line("first", 320.0, 100.0),
        ];
        let ordered = order_lines(lines, ColumnMode::One, 612.0);
        assert_eq!(ordered[0].text, "first");
        assert_eq!(ordered[1].text, "second");
    }

    #[test]
    fn test_column_mode_names() {
        assert_eq!(ColumnMode::One.as_str(), "one");
        assert_eq!(ColumnMode::Two.as_str(), "two");
    }
}
