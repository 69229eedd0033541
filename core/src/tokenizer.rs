use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this are dropped.
pub const MIN_TOKEN_LEN: usize = 2;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[a-z]+").expect("valid regex");
}

/// Letters that survive canonical decomposition and need an explicit ASCII spelling.
fn fold_special(c: char) -> Option<&'static str> {
    let folded = match c {
        '\u{00DF}' => "ss",
        '\u{00C6}' => "AE",
        '\u{00E6}' => "ae",
        '\u{0152}' => "OE",
        '\u{0153}' => "oe",
        '\u{00D8}' => "O",
        '\u{00F8}' => "o",
        '\u{00D0}' => "D",
        '\u{00F0}' => "d",
        '\u{00DE}' => "TH",
        '\u{00FE}' => "th",
        _ => return None,
    };
    Some(folded)
}

/// Strip diacritics (NFD, then drop combining marks), fold ligatures and
/// lower-case the result.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match fold_special(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out.to_lowercase()
}

/// Split text into normalized word tokens: maximal runs of ASCII letters,
/// at least [`MIN_TOKEN_LEN`] long, in source order.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let normalized = normalize(text);
    WORD.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|tok| tok.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}
