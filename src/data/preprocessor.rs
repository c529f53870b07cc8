// ============================================================
// Layer 4 — Review Text Preprocessor
// ============================================================
// Cleans raw review text before tokenisation.
//
// Reviews scraped from the web often contain:
//   - HTML line breaks ("<br />") between paragraphs
//   - Non-breaking spaces (U+00A0) and zero-width spaces (U+200B)
//   - Tabs, carriage returns and other control characters
//   - Multiple consecutive spaces
//
// Cleaning steps (applied in order):
//   1. Replace HTML line breaks with a space
//   2. Replace Unicode whitespace variants and control
//      characters with a plain space
//   3. Collapse runs of spaces into one
//   4. Trim leading/trailing whitespace
//
// A review is treated as one flat passage: paragraph breaks
// carry no sentiment, so newlines are folded into spaces too.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

/// HTML break variants found in the review corpus, matched
/// case-insensitively
const LINE_BREAK_TAGS: [&str; 3] = ["<br />", "<br/>", "<br>"];

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw review string for downstream tokenisation.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: Strip HTML line breaks ────────────────────────────────────
        let step1 = strip_line_breaks(text);

        // ── Step 2: Normalise individual characters ───────────────────────────
        let step2 = step1.chars().map(|c| match c {
            '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
            c if c.is_whitespace() => ' ',
            c if c.is_control() => ' ',
            c => c,
        });

        // ── Step 3: Collapse repeated spaces ──────────────────────────────────
        let mut out        = String::with_capacity(text.len());
        let mut last_space = false;
        for c in step2 {
            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // ── Step 4: Trim ──────────────────────────────────────────────────────
        out.trim().to_string()
    }
}

/// Replace every `<br>`, `<br/>` or `<br />` (any letter case) with a space
fn strip_line_breaks(text: &str) -> String {
    let mut out  = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let tag  = LINE_BREAK_TAGS.iter().find(|tag| {
            tail.get(..tag.len()).is_some_and(|head| head.eq_ignore_ascii_case(tag))
        });
        match tag {
            Some(tag) => {
                out.push(' ');
                rest = &tail[tag.len()..];
            }
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("great   film"), "great film");
    }

    #[test]
    fn test_replaces_html_breaks() {
        let p = Preprocessor::new();
        assert_eq!(
            p.clean("Loved it.<br /><br />Would watch again."),
            "Loved it. Would watch again."
        );
        assert_eq!(p.clean("a<br/>b<br>c"), "a b c");
    }

    #[test]
    fn test_html_breaks_match_any_case() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("a<BR />b<BR/>c<BR>d<Br>e"), "a b c d e");
        // Other tags and bare angle brackets are left alone
        assert_eq!(p.clean("<b>3 < 5</b>"), "<b>3 < 5</b>");
    }

    #[test]
    fn test_removes_control_chars_and_newlines() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("bad\x01movie\r\nreally"), "bad movie really");
    }

    #[test]
    fn test_unicode_spaces_become_plain_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("so\u{00A0}good\u{200B}!"), "so good !");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
        assert_eq!(p.clean("  <br />  "), "");
    }
}
