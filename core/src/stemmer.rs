//! Rule-based suffix stripping in the Porter style.
//!
//! The word is passed through eight stages in a fixed order, each one working
//! on the output of the previous. Most rules are guarded by the *measure* of
//! the residual stem: the number of vowel-run to consonant-run transitions.
//! Only `a e i o u` count as vowels.
//!
//! Stemming is a pure function but is not idempotent: `stem(stem(w))` may
//! differ from `stem(w)`.

/// Step 2 rewrites, first matching suffix wins.
const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Reduce a lower-case token to its stem. Words of fewer than three
/// characters are returned unchanged.
pub fn stem(word: &str) -> String {
    if word.chars().count() < 3 {
        return word.to_string();
    }
    let mut s = word.to_string();
    step1a(&mut s);
    step1b(&mut s);
    step1c(&mut s);
    replace_by_table(&mut s, STEP2_RULES);
    replace_by_table(&mut s, STEP3_RULES);
    step4(&mut s);
    step5a(&mut s);
    step5b(&mut s);
    s
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn has_vowel(s: &str) -> bool {
    s.bytes().any(is_vowel)
}

/// Number of vowel-run to consonant-run transitions.
pub fn measure(s: &str) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for b in s.bytes() {
        let v = is_vowel(b);
        if prev_vowel && !v {
            m += 1;
        }
        prev_vowel = v;
    }
    m
}

/// consonant-vowel-consonant ending, the last consonant not w, x or y.
fn ends_cvc(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 3 {
        return false;
    }
    let (c1, v, c2) = (b[b.len() - 3], b[b.len() - 2], b[b.len() - 1]);
    !is_vowel(c1) && is_vowel(v) && !is_vowel(c2) && !matches!(c2, b'w' | b'x' | b'y')
}

fn ends_double_consonant(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[b.len() - 1] == b[b.len() - 2] && !is_vowel(b[b.len() - 1])
}

/// The part of `s` before `suffix`. Callers check `ends_with` first; an ASCII
/// suffix always starts on a char boundary.
fn without<'a>(s: &'a str, suffix: &str) -> &'a str {
    &s[..s.len() - suffix.len()]
}

fn step1a(s: &mut String) {
    if s.ends_with("sses") || s.ends_with("ies") {
        s.truncate(s.len() - 2);
    } else if s.ends_with('s') && !s.ends_with("ss") {
        s.pop();
    }
}

fn step1b(s: &mut String) {
    if s.ends_with("eed") {
        if measure(without(s, "eed")) > 0 {
            s.pop();
        }
        return;
    }
    let stripped = ["ed", "ing"]
        .iter()
        .find(|suffix| s.ends_with(*suffix) && has_vowel(without(s, suffix)))
        .map(|suffix| suffix.len());
    let Some(len) = stripped else { return };
    s.truncate(s.len() - len);

    if s.ends_with("at") || s.ends_with("bl") || s.ends_with("iz") {
        s.push('e');
    } else if ends_double_consonant(s) {
        s.pop();
    } else if measure(s) == 1 && ends_cvc(s) {
        s.push('e');
    }
}

fn step1c(s: &mut String) {
    if s.ends_with('y') && has_vowel(without(s, "y")) {
        s.pop();
        s.push('i');
    }
}

/// Apply the first rule whose suffix matches, if the residual stem has
/// measure > 0. Later rules are not tried once a suffix matched.
fn replace_by_table(s: &mut String, rules: &[(&str, &str)]) {
    if let Some((suffix, replacement)) = rules.iter().find(|(suffix, _)| s.ends_with(suffix)) {
        if measure(without(s, suffix)) > 0 {
            s.truncate(s.len() - suffix.len());
            s.push_str(replacement);
        }
    }
}

fn step4(s: &mut String) {
    let Some(suffix) = STEP4_SUFFIXES.iter().find(|suffix| s.ends_with(*suffix)) else {
        return;
    };
    let residual = without(s, suffix);
    if measure(residual) <= 1 {
        return;
    }
    if *suffix == "ion" && !(residual.ends_with('s') || residual.ends_with('t')) {
        return;
    }
    let keep = residual.len();
    s.truncate(keep);
}

fn step5a(s: &mut String) {
    // "ee" is the product of the "eed" rule and is kept whole.
    if !s.ends_with('e') || s.ends_with("ee") {
        return;
    }
    let residual = without(s, "e");
    let m = measure(residual);
    if m > 1 || (m == 1 && !ends_cvc(residual)) {
        s.pop();
    }
}

fn step5b(s: &mut String) {
    if measure(s) > 1 && ends_double_consonant(s) && s.ends_with('l') {
        s.pop();
    }
}
