use ircore::stemmer::stem;
use ircore::tokenizer::tokenize;

#[test]
fn it_normalizes_and_lowercases() {
    let words = tokenize("Running Runners RUN! The café's menu.");
    assert_eq!(words, vec!["running", "runners", "run", "the", "cafe", "menu"]);
}

#[test]
fn it_strips_diacritics() {
    assert_eq!(tokenize("naïve façade Ångström"), vec!["naive", "facade", "angstrom"]);
}

#[test]
fn it_handles_blank_input() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   \n\t ").is_empty());
    assert!(tokenize("1 2 3 ! ?").is_empty());
}

#[test]
fn it_keeps_only_ascii_letters() {
    // Greek letters have no ASCII spelling and vanish
    assert_eq!(tokenize("alpha-βeta_gamma"), vec!["alpha", "eta", "gamma"]);
}

#[test]
fn it_is_deterministic() {
    let text = "Die Straße, l'œuvre, Þórr and Ægir.";
    assert_eq!(tokenize(text), tokenize(text));
    assert_eq!(tokenize(text), vec!["die", "strasse", "oeuvre", "thorr", "and", "aegir"]);
}

#[test]
fn stemmed_tokens_conflate() {
    let stems: Vec<String> = tokenize("Connected connecting connections").iter().map(|t| stem(t)).collect();
    assert_eq!(stems, vec!["connect", "connect", "connect"]);
}
