use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Folds raw review text into canonical ASCII-safe form.
///
/// The steps run in a fixed order because each one feeds the next: NFKD
/// decomposition first (so accented letters fold toward their base letter and
/// compatibility forms of quotes and digits fold toward plain ASCII), then
/// removal of everything outside 7-bit ASCII (emoji, CJK, and the combining
/// marks NFKD separated out), then removal of remaining punctuation, then the
/// stray-apostrophe pass, then whitespace collapsing. Reordering changes the
/// result for inputs like `"café"` or `"'quoted'"`.
///
/// Output always matches `[A-Za-z0-9' ]*` with no leading/trailing/repeated
/// whitespace and no apostrophe outside a word, which also makes the
/// transformation idempotent.
pub struct TextNormalizer {
    non_ascii: Regex,
    disallowed: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            non_ascii: Regex::new(r"[^\x00-\x7F]+").expect("hard-coded pattern"),
            disallowed: Regex::new(r"[^A-Za-z0-9' ]+").expect("hard-coded pattern"),
            whitespace: Regex::new(r"\s+").expect("hard-coded pattern"),
        }
    }

    /// Normalize a possibly-absent text value. Absent input yields an empty
    /// string rather than an error; this function never fails.
    pub fn normalize(&self, text: Option<&str>) -> String {
        let Some(raw) = text else {
            return String::new();
        };

        let decomposed: String = raw.nfkd().collect();
        let ascii_only = self.non_ascii.replace_all(&decomposed, " ");
        let kept = self.disallowed.replace_all(&ascii_only, " ");
        let destrayed = strip_stray_apostrophes(&kept);

        self.whitespace
            .replace_all(&destrayed, " ")
            .trim()
            .to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop apostrophes that are not flanked by a word character on both sides,
/// keeping contractions and possessives intact. The input is pure ASCII at
/// this point, so a byte walk is exact.
fn strip_stray_apostrophes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\'' {
            let word_before = i > 0 && bytes[i - 1].is_ascii_alphanumeric();
            let word_after = i + 1 < bytes.len() && bytes[i + 1].is_ascii_alphanumeric();
            if word_before && word_after {
                out.push('\'');
            }
        } else {
            out.push(b as char);
        }
    }

    out
}
