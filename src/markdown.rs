pub const EMPHASIS: &str = "*";
pub const STRONG: &str = "**";
pub const LINE_BREAK: &str = "  \n";
pub const LIST_BULLET: &str = "- ";
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Heading line for an HTML heading level; levels 3 and 4 share `###`.
pub fn heading_line(level: u8, text: &str) -> String {
    let marks = "#".repeat(level.clamp(1, 3) as usize);
    format!("{marks} {text}\n\n")
}

pub fn image_embed(alt: &str, src: &str) -> String {
    format!("\n![{alt}]({src})\n")
}

pub fn rule() -> &'static str {
    "\n---\n"
}

/// Prefix every non-empty line with a quote marker.
pub fn quote_block(text: &str) -> String {
    let quoted = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    quoted + PARAGRAPH_BREAK
}

/// Tidy converted Markdown before it is written out.
pub fn clean_markdown(md: &str) -> String {
    let mut result = md.to_string();

    // Collapse 3+ consecutive blank lines to 2
    while result.contains("\n\n\n") {
        result = result.replace("\n\n\n", "\n\n");
    }

    // Trim trailing whitespace per line, keeping hard line breaks
    result = result
        .lines()
        .map(|line| {
            let trimmed = line.trim_end();
            if !trimmed.is_empty() && line.ends_with(LINE_BREAK.trim_end_matches('\n')) {
                format!("{trimmed}  ")
            } else {
                trimmed.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    // Ensure single trailing newline
    let trimmed = result.trim_end().to_string();
    if trimmed.is_empty() {
        String::new()
    } else {
        trimmed + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels_collapse_at_three() {
        assert_eq!(heading_line(1, "Title"), "# Title\n\n");
        assert_eq!(heading_line(2, "Chapter I"), "## Chapter I\n\n");
        assert_eq!(heading_line(3, "A"), "### A\n\n");
        assert_eq!(heading_line(4, "B"), "### B\n\n");
    }

    #[test]
    fn test_quote_block_marks_non_empty_lines() {
        assert_eq!(quote_block("first\n\n  second  "), "> first\n> second\n\n");
    }

    #[test]
    fn test_clean_markdown_collapses_blank_lines() {
        assert_eq!(clean_markdown("# A\n\n\n\n\nText   \n\n"), "# A\n\nText\n");
        assert_eq!(clean_markdown("  \n\n"), "");
    }

    #[test]
    fn test_clean_markdown_keeps_hard_breaks() {
        assert_eq!(clean_markdown("line one  \nline two"), "line one  \nline two\n");
    }
}
