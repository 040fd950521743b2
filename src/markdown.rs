//! Line classification for the markdown subset writ documents use.
//!
//! This is the first of two parsing passes: raw text is turned into a flat
//! stream of classified lines (headings, list items, blanks, plain text)
//! with 1-based line numbers. The second pass in [`crate::document`] folds
//! the stream into the section/requirement/scenario tree. Keeping the
//! passes separate lets each be tested in isolation.
//!
//! Only the conventions this document format relies on are recognized:
//! ATX headings, `-`/`*` list items, and fenced code blocks (whose interior
//! lines are always plain text). Full CommonMark is out of scope.

/// One classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// An ATX heading: `## Purpose` has depth 2 and text `Purpose`.
    Heading { depth: usize, text: String },
    /// A list item: `- **auth:** Add requirement` with the marker stripped.
    ListItem { indent: usize, text: String },
    /// A line that is empty or whitespace-only.
    Blank,
    /// Anything else, including every line inside a code fence.
    Text,
}

/// A classified line with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number in the original text.
    pub number: usize,
    /// The raw line, unmodified.
    pub raw: String,
    pub kind: LineKind,
}

/// Classify every line of `text`.
///
/// Code fences toggle on lines starting with ``` and everything between
/// the delimiters is classified as plain [`LineKind::Text`], so a `## `
/// inside an example block never opens a section.
pub fn classify_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut in_fence = false;

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_start();

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            lines.push(Line {
                number: idx + 1,
                raw: raw.to_string(),
                kind: LineKind::Text,
            });
            continue;
        }

        let kind = if in_fence {
            LineKind::Text
        } else {
            classify(raw)
        };

        lines.push(Line {
            number: idx + 1,
            raw: raw.to_string(),
            kind,
        });
    }

    lines
}

fn classify(raw: &str) -> LineKind {
    if raw.trim().is_empty() {
        return LineKind::Blank;
    }

    let trimmed = raw.trim_start();
    let indent = raw.len() - trimmed.len();

    if let Some(depth) = heading_depth(trimmed) {
        // Headings in this format are never indented list content.
        if indent == 0 {
            let text = trimmed[depth..].trim().to_string();
            return LineKind::Heading { depth, text };
        }
    }

    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        return LineKind::ListItem {
            indent,
            text: rest.trim_end().to_string(),
        };
    }

    LineKind::Text
}

/// Return the heading depth if the line is an ATX heading (`#` runs of
/// 1 to 6 followed by a space), else `None`.
fn heading_depth(trimmed: &str) -> Option<usize> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    match trimmed.as_bytes().get(hashes) {
        Some(b' ') => Some(hashes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_headings_at_depth() {
        let lines = classify_lines("# Title\n## Purpose\n### Requirement: X");
        assert_eq!(
            lines[0].kind,
            LineKind::Heading {
                depth: 1,
                text: "Title".to_string()
            }
        );
        assert_eq!(
            lines[1].kind,
            LineKind::Heading {
                depth: 2,
                text: "Purpose".to_string()
            }
        );
        assert_eq!(
            lines[2].kind,
            LineKind::Heading {
                depth: 3,
                text: "Requirement: X".to_string()
            }
        );
    }

    #[test]
    fn test_hash_run_without_space_is_text() {
        let lines = classify_lines("##NoSpace\n####### seven");
        assert_eq!(lines[0].kind, LineKind::Text);
        assert_eq!(lines[1].kind, LineKind::Text);
    }

    #[test]
    fn test_classifies_list_items_with_indent() {
        let lines = classify_lines("- top\n  - nested\n* star");
        assert_eq!(
            lines[0].kind,
            LineKind::ListItem {
                indent: 0,
                text: "top".to_string()
            }
        );
        assert_eq!(
            lines[1].kind,
            LineKind::ListItem {
                indent: 2,
                text: "nested".to_string()
            }
        );
        assert_eq!(
            lines[2].kind,
            LineKind::ListItem {
                indent: 0,
                text: "star".to_string()
            }
        );
    }

    #[test]
    fn test_code_fence_contents_are_text() {
        let text = "## Real\n```\n## Not a heading\n- not a bullet\n```\n## Also real";
        let lines = classify_lines(text);
        assert!(matches!(lines[0].kind, LineKind::Heading { depth: 2, .. }));
        assert_eq!(lines[2].kind, LineKind::Text);
        assert_eq!(lines[3].kind, LineKind::Text);
        assert!(matches!(lines[5].kind, LineKind::Heading { depth: 2, .. }));
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let lines = classify_lines("a\nb\nc");
        let numbers: Vec<usize> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_blank_lines() {
        let lines = classify_lines("a\n\n   \nb");
        assert_eq!(lines[1].kind, LineKind::Blank);
        assert_eq!(lines[2].kind, LineKind::Blank);
    }
}
