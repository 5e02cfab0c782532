//! Removal of the Project Gutenberg header and footer by literal marker lines.

/// Lines before this index are never treated as the end of the text.
pub const DEFAULT_END_MARKER_GUARD: usize = 100;

const START_MARKERS: &[&str] = &[
    "*** START OF THIS PROJECT GUTENBERG EBOOK",
    "*** START OF THE PROJECT GUTENBERG EBOOK",
    "*** START OF THE PROJECT GUTENBERG ETEXT",
    "*END*THE SMALL PRINT",
    "***START OF THE PROJECT GUTENBERG",
];

const END_MARKERS: &[&str] = &[
    "End of the Project Gutenberg EBook",
    "End of Project Gutenberg's",
    "*** END OF THIS PROJECT GUTENBERG EBOOK",
    "*** END OF THE PROJECT GUTENBERG EBOOK",
    "End of this Project Gutenberg",
    "*** END OF THE PROJECT GUTENBERG",
];

/// Return the part of `text` between the start-of-text marker line and the
/// end-of-text marker line, both exclusive.
///
/// Without a start marker the text starts at line 0. The end marker is only
/// searched from line `end_marker_guard` onwards (or from the start line, if
/// that is later); without one the text runs to the end of the document.
pub fn strip_boilerplate(text: &str, end_marker_guard: usize) -> &str {
    let lines: Vec<(usize, &str)> = line_spans(text).collect();

    let start = lines
        .iter()
        .position(|(_, line)| contains_marker(line, START_MARKERS))
        .map_or(0, |i| i + 1);

    let end = lines
        .iter()
        .enumerate()
        .skip(end_marker_guard.max(start))
        .find(|(_, (_, line))| contains_marker(line, END_MARKERS))
        .map_or(lines.len(), |(i, _)| i);

    if start >= end {
        return "";
    }

    let from = lines[start].0;
    let (last_offset, last_line) = lines[end - 1];
    &text[from..last_offset + last_line.len()]
}

/// Iterate `(byte offset, line)` pairs, splitting on `\n` only.
fn line_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len() + 1;
        Some((start, line))
    })
}

fn contains_marker(line: &str, markers: &[&str]) -> bool {
    let upper = line.to_ascii_uppercase();
    markers
        .iter()
        .any(|marker| upper.contains(&marker.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(n: usize) -> String {
        (0..n).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_no_markers_returns_input() {
        let text = "<p>one</p>\n<p>two</p>\n";
        assert_eq!(strip_boilerplate(text, DEFAULT_END_MARKER_GUARD), text);
        assert_eq!(strip_boilerplate("", DEFAULT_END_MARKER_GUARD), "");
    }

    #[test]
    fn test_start_marker_line_is_excluded() {
        let text = "header\n*** start of the project gutenberg ebook moby dick ***\nCall me Ishmael.";
        assert_eq!(strip_boilerplate(text, DEFAULT_END_MARKER_GUARD), "Call me Ishmael.");
    }

    #[test]
    fn test_end_marker_before_guard_is_ignored() {
        let text = "*** START OF THE PROJECT GUTENBERG EBOOK X\nbody\nEnd of this Project Gutenberg text\nmore";
        assert_eq!(
            strip_boilerplate(text, DEFAULT_END_MARKER_GUARD),
            "body\nEnd of this Project Gutenberg text\nmore"
        );
    }

    #[test]
    fn test_end_marker_after_guard_is_excluded() {
        let body = filler(120);
        let text = format!(
            "*** START OF THE PROJECT GUTENBERG EBOOK X\n{body}*** END OF THE PROJECT GUTENBERG EBOOK X\nlicense"
        );
        let stripped = strip_boilerplate(&text, DEFAULT_END_MARKER_GUARD);
        assert!(stripped.starts_with("line 0\n"));
        assert!(stripped.ends_with("line 119"));
        assert!(!stripped.contains("license"));
    }

    #[test]
    fn test_guard_is_configurable() {
        let text = "intro\nEnd of Project Gutenberg's Book\nfooter";
        assert_eq!(strip_boilerplate(text, 0), "intro");
        assert_eq!(strip_boilerplate(text, 2), text);
    }

    #[test]
    fn test_never_longer_than_input() {
        let samples = [
            "",
            "\n",
            "*END*THE SMALL PRINT",
            "a\n*END*THE SMALL PRINT\n",
            "*** END OF THE PROJECT GUTENBERG EBOOK\n",
        ];
        for sample in samples {
            for guard in [0, 1, 100] {
                assert!(strip_boilerplate(sample, guard).len() <= sample.len());
            }
        }
    }
}
