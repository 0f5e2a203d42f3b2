//! Greedy word-wrap and line placement for text fields.
//!
//! The measurement function is injected so the same algorithm serves real
//! glyph metrics and the fallback table, and so tests can use fixed widths.

use crate::model::TextAlign;

/// Wrap `text` into lines that fit `max_width_px`.
///
/// Words are whitespace-delimited. Each word is tentatively appended to the
/// current line with a single space; if the measured result no longer fits,
/// the line is flushed and the word starts a new one. A single word wider
/// than the box is placed on its own line, never split. Empty or
/// whitespace-only input yields no lines.
pub fn wrap_text(text: &str, max_width_px: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width_px {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// How many of `line_count` stacked lines are visible in a box of
/// `box_height_px`, line `i` sitting at top offset `i * line_height_px`.
/// Lines whose top offset falls outside the box are dropped silently.
pub fn visible_line_count(line_count: usize, line_height_px: f32, box_height_px: f32) -> usize {
    if line_height_px <= 0.0 {
        return line_count;
    }
    let max = (box_height_px / line_height_px).ceil().max(0.0) as usize;
    line_count.min(max)
}

/// Horizontal pen position for one line within the box.
pub fn aligned_x(align: TextAlign, box_x: f32, box_width: f32, line_width: f32) -> f32 {
    match align {
        TextAlign::Left => box_x,
        TextAlign::Center => box_x + (box_width - line_width) / 2.0,
        TextAlign::Right => box_x + box_width - line_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ten pixels per character, spaces included.
    fn measure(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("John Doe", 200.0, measure);
        assert_eq!(lines, vec!["John Doe"]);
    }

    #[test]
    fn wraps_greedily_at_the_box_width() {
        // 12 chars max per line.
        let lines = wrap_text("one two three four", 120.0, measure);
        assert_eq!(lines, vec!["one two", "three four"]);
    }

    #[test]
    fn no_line_exceeds_the_box_except_lone_wide_words() {
        let text = "a few words and an extraordinarily long identifier here";
        let lines = wrap_text(text, 100.0, measure);
        for line in &lines {
            let fits = measure(line) <= 100.0;
            let lone_word = !line.contains(' ');
            assert!(fits || lone_word, "line {line:?} breaks the invariant");
        }
        // The oversized word ends up alone.
        assert!(lines.contains(&"extraordinarily".to_string()));
    }

    #[test]
    fn oversized_word_is_never_split() {
        let lines = wrap_text("incomprehensibilities", 50.0, measure);
        assert_eq!(lines, vec!["incomprehensibilities"]);
    }

    #[test]
    fn whitespace_only_input_yields_no_lines() {
        assert!(wrap_text("", 100.0, measure).is_empty());
        assert!(wrap_text("   \t \n ", 100.0, measure).is_empty());
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        let lines = wrap_text("a   b\t c", 200.0, measure);
        assert_eq!(lines, vec!["a b c"]);
    }

    #[test]
    fn lines_below_the_box_are_dropped() {
        // Box fits exactly three line tops: offsets 0, 12, 24 < 36.
        assert_eq!(visible_line_count(5, 12.0, 36.0), 3);
        assert_eq!(visible_line_count(2, 12.0, 36.0), 2);
        // A line whose top lands exactly on the bottom edge is dropped.
        assert_eq!(visible_line_count(4, 12.0, 36.0), 3);
        assert_eq!(visible_line_count(5, 12.0, 30.0), 3);
    }

    #[test]
    fn alignment_anchors() {
        assert_eq!(aligned_x(TextAlign::Left, 10.0, 100.0, 40.0), 10.0);
        assert_eq!(aligned_x(TextAlign::Center, 10.0, 100.0, 40.0), 40.0);
        assert_eq!(aligned_x(TextAlign::Right, 10.0, 100.0, 40.0), 70.0);
    }

    #[test]
    fn centered_lines_of_a_wrapped_field_center_independently() {
        let lines = wrap_text("first second", 70.0, measure);
        assert_eq!(lines.len(), 2);
        let x0 = aligned_x(TextAlign::Center, 0.0, 70.0, measure(&lines[0]));
        let x1 = aligned_x(TextAlign::Center, 0.0, 70.0, measure(&lines[1]));
        assert!((x0 - (70.0 - 50.0) / 2.0).abs() < 1e-4);
        assert!((x1 - (70.0 - 60.0) / 2.0).abs() < 1e-4);
    }
}
