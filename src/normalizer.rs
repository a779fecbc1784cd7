use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// UTF-8 text that was decoded as Windows-1252 somewhere upstream
const MOJIBAKE: &[(&str, &str)] = &[
    ("\u{e2}\u{20ac}\u{2122}", "'"),
    ("\u{e2}\u{20ac}\u{153}", "\""),
    ("\u{e2}\u{20ac}\u{9d}", "\""),
    ("\u{e2}\u{20ac}\u{201c}", "-"),
    ("\u{e2}\u{20ac}\u{201d}", "-"),
    ("\u{e2}\u{20ac}\u{a6}", "..."),
    ("\u{c2}\u{a0}", " "),
];

const BULLETS: &[char] = &[
    '\u{2022}', '\u{b7}', '\u{25cf}', '\u{25cb}', '\u{25aa}', '\u{25ab}', '\u{25e6}', '\u{2023}',
    '\u{2043}',
];

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid space pattern"));

static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline pattern"));

/// Cleans extracted text so the chunker sees consistent input.
///
/// Steps run in order: NFC, mojibake repair, typographic replacements,
/// control-character removal, bullet standardization, whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = normalize_unicode(text);
        let text = fix_encoding_issues(&text);
        let text = replace_special_chars(&text);
        let text = remove_control_characters(&text);
        let text = standardize_bullets(&text);
        normalize_whitespace(&text)
    }
}

pub fn normalize_unicode(text: &str) -> String {
    text.nfc().collect()
}

pub fn fix_encoding_issues(text: &str) -> String {
    MOJIBAKE
        .iter()
        .fold(text.to_string(), |acc, (wrong, right)| acc.replace(wrong, right))
}

/// Straight quotes, ASCII dashes and ellipsis; invisible characters dropped
pub fn replace_special_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201c}' | '\u{201d}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{a0}' => out.push(' '),
            '\u{200b}' | '\u{feff}' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Drop control characters other than newline and tab
pub fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

pub fn standardize_bullets(text: &str) -> String {
    text.chars()
        .map(|c| if BULLETS.contains(&c) { '-' } else { c })
        .collect()
}

/// Tabs to spaces, LF line endings, single spaces, at most one blank line,
/// every line trimmed
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace('\t', " ").replace("\r\n", "\n").replace('\r', "\n");
    let text = SPACE_RUN.replace_all(&text, " ");
    let text = NEWLINE_RUN.replace_all(&text, "\n\n");

    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(TextNormalizer::new().normalize(""), "");
    }

    #[test]
    fn test_nfc_composes_accents() {
        assert_eq!(normalize_unicode("cafe\u{301}"), "caf\u{e9}");
    }

    #[test]
    fn test_typographic_replacements() {
        let text = "\u{201c}Don\u{2019}t\u{201d} \u{2013} wait\u{2026}\u{a0}now\u{200b}\u{feff}";
        assert_eq!(replace_special_chars(text), "\"Don't\" - wait... now");
    }

    #[test]
    fn test_mojibake_repaired() {
        assert_eq!(fix_encoding_issues("it\u{e2}\u{20ac}\u{2122}s"), "it's");
        assert_eq!(fix_encoding_issues("wait\u{e2}\u{20ac}\u{a6}"), "wait...");
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(
            remove_control_characters("a\u{0}b\u{7}c\n\td\r"),
            "abc\n\td"
        );
    }

    #[test]
    fn test_bullets_standardized() {
        assert_eq!(standardize_bullets("\u{2022} one\n\u{25e6} two"), "- one\n- two");
    }

    #[test]
    fn test_whitespace_normalized() {
        let text = "  Title\t\tline  \r\n\r\n\r\n\r\nBody   text  \n  next ";
        assert_eq!(normalize_whitespace(text), "Title line\n\nBody text\nnext");
    }

    #[test]
    fn test_full_pipeline() {
        let text = "\u{feff}# Module\u{a0}Guide\r\n\r\n\r\n\u{2022}\tRead the \u{201c}handbook\u{201d}\u{2026}";
        assert_eq!(
            TextNormalizer::new().normalize(text),
            "# Module Guide\n\n- Read the \"handbook\"..."
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let once = normalizer.normalize("  Mixed\u{2014}content \u{2022} here\n\n\n\nend ");
        assert_eq!(normalizer.normalize(&once), once);
    }
}
