use std::sync::OnceLock;

use regex::Regex;

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap())
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").unwrap())
}

// Underscore italics are left alone so snake_case identifiers in stage
// output survive intact.
fn emphasis_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").unwrap())
}

fn inline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap())
}

fn table_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\|?[\s:|-]+\|?\s*$").unwrap())
}

/// Convert a markdown stage report to plain text for terminal display.
/// Handles headers, emphasis, inline code, links, tables, and code fences.
pub fn markdown_to_plain(markdown: &str) -> String {
    let mut out: Vec<String> = Vec::new();

    for line in markdown.lines() {
        let trimmed = line.trim_end();

        // Fence markers are dropped; fenced content passes through verbatim
        // on its own lines.
        if trimmed.trim_start().starts_with("```") {
            continue;
        }

        if is_table_row(trimmed) {
            if table_separator_re().is_match(trimmed) {
                continue;
            }
            out.push(render_table_row(trimmed));
            continue;
        }

        let mut text = trimmed.to_string();

        // Headers become bare lines.
        if let Some(stripped) = strip_header(&text) {
            text = stripped;
        }

        // Blockquotes lose the marker.
        if let Some(rest) = text.trim_start().strip_prefix("> ") {
            text = rest.to_string();
        }

        text = render_inline(&text);
        out.push(text);
    }

    let mut joined = out.join("\n");
    while joined.contains("\n\n\n") {
        joined = joined.replace("\n\n\n", "\n\n");
    }
    joined.trim().to_string()
}

fn is_table_row(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with('|') && t.contains('|')
}

fn render_table_row(line: &str) -> String {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| render_inline(cell.trim()))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn strip_header(line: &str) -> Option<String> {
    let t = line.trim_start();
    let hashes = t.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &t[hashes..];
    rest.strip_prefix(' ').map(|r| r.to_string())
}

fn render_inline(text: &str) -> String {
    let text = link_re().replace_all(text, "$1");
    let text = bold_re().replace_all(&text, "$1$2");
    let text = emphasis_re().replace_all(&text, "$1");
    let text = inline_code_re().replace_all(&text, "$1");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_stripped() {
        assert_eq!(markdown_to_plain("# Itinerary\nDay 1"), "Itinerary\nDay 1");
        assert_eq!(markdown_to_plain("### Day 2"), "Day 2");
    }

    #[test]
    fn test_emphasis_and_code() {
        assert_eq!(
            markdown_to_plain("**Tokyo** is *great*, book via `app`"),
            "Tokyo is great, book via app"
        );
        assert_eq!(markdown_to_plain("__bold__ stays bold"), "bold stays bold");
        // snake_case identifiers are not treated as emphasis
        assert_eq!(markdown_to_plain("set start_or_dates"), "set start_or_dates");
    }

    #[test]
    fn test_links_keep_text() {
        assert_eq!(
            markdown_to_plain("see [Google Flights](https://example.com) now"),
            "see Google Flights now"
        );
    }

    #[test]
    fn test_table_rendering() {
        let md = "| Day | Plan |\n|-----|------|\n| 1 | Senso-ji |";
        let plain = markdown_to_plain(md);
        assert_eq!(plain, "Day  Plan\n1  Senso-ji");
    }

    #[test]
    fn test_code_fence_markers_dropped() {
        let md = "before\n```json\n{\"a\": 1}\n```\nafter";
        assert_eq!(markdown_to_plain(md), "before\n{\"a\": 1}\nafter");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(markdown_to_plain("just words"), "just words");
    }
}
