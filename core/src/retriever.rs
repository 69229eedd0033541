use crate::index::{DocId, DocTable, InvertedIndex};
use crate::posting::{Posting, PostingList};
use crate::stemmer::stem;
use crate::stopwords::StopWords;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How the terms of a query are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    #[default]
    And,
    Or,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(QueryMode::And),
            "or" => Ok(QueryMode::Or),
            other => Err(format!("unknown query mode '{other}', expected and|or")),
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryMode::And => "and",
            QueryMode::Or => "or",
        })
    }
}

/// Boolean query evaluation over a built or loaded index. Holds the index
/// read-only; every merge allocates a new list.
#[derive(Debug, Clone)]
pub struct Retriever {
    index: InvertedIndex,
    docs: DocTable,
    stop_words: StopWords,
}

impl Retriever {
    pub fn new(index: InvertedIndex, docs: DocTable, stop_words: StopWords) -> Self {
        Self { index, docs, stop_words }
    }

    /// Tokenize, stem and drop stop words.
    pub fn query_terms(&self, query: &str) -> BTreeSet<String> {
        tokenize(query)
            .iter()
            .map(|tok| stem(tok))
            .filter(|term| !self.stop_words.is_stop(term))
            .collect()
    }

    pub fn search(&self, query: &str, mode: QueryMode) -> Vec<DocId> {
        match mode {
            QueryMode::And => self.search_and(query),
            QueryMode::Or => self.search_or(query),
        }
    }

    /// Documents holding every query term, ascending. Empty as soon as one
    /// term is missing from the index.
    pub fn search_and(&self, query: &str) -> Vec<DocId> {
        let terms = self.query_terms(query);
        let mut lists = Vec::with_capacity(terms.len());
        for term in &terms {
            match self.index.get(term) {
                Some(list) => lists.push(list),
                None => {
                    tracing::debug!(term = %term, "term not indexed, AND is empty");
                    return Vec::new();
                }
            }
        }
        // shortest first keeps the accumulator small
        lists.sort_by_key(|list| list.df());

        let Some((&first, rest)) = lists.split_first() else {
            return Vec::new();
        };
        let mut acc: Option<PostingList> = None;
        for list in rest {
            let merged = intersect(acc.as_ref().unwrap_or(first), list);
            let empty = merged.is_empty();
            acc = Some(merged);
            if empty {
                break;
            }
        }
        acc.as_ref().unwrap_or(first).doc_ids()
    }

    /// Documents holding any query term, ascending and unique. Terms missing
    /// from the index contribute nothing.
    pub fn search_or(&self, query: &str) -> Vec<DocId> {
        let terms = self.query_terms(query);
        let lists: Vec<&PostingList> = terms.iter().filter_map(|t| self.index.get(t)).collect();

        let Some((&first, rest)) = lists.split_first() else {
            return Vec::new();
        };
        let mut acc: Option<PostingList> = None;
        for list in rest {
            acc = Some(union(acc.as_ref().unwrap_or(first), list));
        }
        acc.as_ref().unwrap_or(first).doc_ids()
    }

    /// Source path of a result.
    pub fn resolve(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(String::as_str)
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn docs(&self) -> &DocTable {
        &self.docs
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }
}

/// Two-pointer intersection. The side holding the smaller id follows its
/// skip pointer when the target does not pass the other side's id, otherwise
/// it steps by one.
pub fn intersect(a: &PostingList, b: &PostingList) -> PostingList {
    intersect_counting(a, b).0
}

/// `intersect`, also returning how many merge steps it took.
fn intersect_counting(a: &PostingList, b: &PostingList) -> (PostingList, usize) {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    let mut steps = 0;
    while i < a.len() && j < b.len() {
        steps += 1;
        let (da, db) = (a.doc_id_at(i), b.doc_id_at(j));
        if da == db {
            out.push(Posting::new(da));
            i += 1;
            j += 1;
        } else if da < db {
            i = advance(a, i, db);
        } else {
            j = advance(b, j, da);
        }
    }
    (PostingList::from_postings(out), steps)
}

fn advance(list: &PostingList, i: usize, bound: DocId) -> usize {
    match list.skip_from(i) {
        Some(target) if list.doc_id_at(target) <= bound => target,
        _ => i + 1,
    }
}

/// Linear merge of two lists, emitting each id once. Skips are of no use here.
pub fn union(a: &PostingList, b: &PostingList) -> PostingList {
    let mut out: Vec<Posting> = Vec::with_capacity(a.len() + b.len());
    let mut push = |doc_id: DocId| {
        if out.last().map_or(true, |p| p.doc_id != doc_id) {
            out.push(Posting::new(doc_id));
        }
    };
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        if j >= b.len() || (i < a.len() && a.doc_id_at(i) <= b.doc_id_at(j)) {
            push(a.doc_id_at(i));
            i += 1;
        } else {
            push(b.doc_id_at(j));
            j += 1;
        }
    }
    PostingList::from_postings(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn list_of(ids: impl IntoIterator<Item = DocId>) -> PostingList {
        PostingList::from_postings(ids.into_iter().map(|d| Posting::with_tf(d, 1)).collect())
    }

    fn retriever(terms: &[(&str, &[DocId])], stop: &[&str]) -> Retriever {
        let index = terms
            .iter()
            .map(|(t, ids)| (t.to_string(), list_of(ids.iter().copied())))
            .collect();
        let docs = (0..100).map(|d| (d, format!("doc{d}"))).collect();
        Retriever::new(index, docs, StopWords::from_words(stop))
    }

    #[test]
    fn intersect_uses_skips_without_missing_matches() {
        let a = list_of(0..100);
        let b = list_of([3, 17, 18, 64, 99, 150]);
        assert_eq!(intersect(&a, &b).doc_ids(), vec![3, 17, 18, 64, 99]);
        assert_eq!(intersect(&b, &a).doc_ids(), vec![3, 17, 18, 64, 99]);
    }

    #[test]
    fn intersect_follows_skip_pointers() {
        // span 10: 9 skips to reach 90, 9 single steps to 99, then the match
        let long = list_of(0..100);
        let (got, steps) = intersect_counting(&long, &list_of([99]));
        assert_eq!(got.doc_ids(), vec![99]);
        assert_eq!(steps, 19);
        let (_, steps) = intersect_counting(&list_of([99]), &long);
        assert_eq!(steps, 19);

        // a short list has no skips and is walked entry by entry
        let (_, steps) = intersect_counting(&list_of([0, 1, 2]), &list_of([2]));
        assert_eq!(steps, 3);
    }

    #[test]
    fn intersect_matches_set_semantics() {
        let a: Vec<DocId> = (0..200).filter(|d| d % 3 == 0).collect();
        let b: Vec<DocId> = (0..200).filter(|d| d % 5 == 0).collect();
        let expected: Vec<DocId> = (0..200).filter(|d| d % 15 == 0).collect();
        let got = intersect(&list_of(a), &list_of(b));
        assert_eq!(got.doc_ids(), expected);
        assert_eq!(got.skips().len(), 4);
    }

    #[test]
    fn intersect_disjoint() {
        assert!(intersect(&list_of([1, 3, 5, 7, 9]), &list_of([2, 4, 6, 8])).is_empty());
        assert!(intersect(&list_of([]), &list_of([1])).is_empty());
    }

    #[test]
    fn union_dedups() {
        let got = union(&list_of([1, 4, 9]), &list_of([1, 2, 9, 12]));
        assert_eq!(got.doc_ids(), vec![1, 2, 4, 9, 12]);
        assert_eq!(union(&list_of([]), &list_of([5])).doc_ids(), vec![5]);
    }

    #[test]
    fn and_requires_every_term() {
        let r = retriever(&[("cat", &[0, 2, 4]), ("dog", &[0, 1, 4])], &[]);
        assert_eq!(r.search_and("cat dog"), vec![0, 4]);
        assert!(r.search_and("cat unicorn").is_empty());
    }

    #[test]
    fn or_skips_missing_terms() {
        let r = retriever(&[("cat", &[0, 2, 4]), ("dog", &[0, 1, 4])], &[]);
        assert_eq!(r.search_or("cat dog unicorn"), vec![0, 1, 2, 4]);
        assert!(r.search_or("unicorn").is_empty());
    }

    #[test]
    fn single_term_returns_its_list() {
        let r = retriever(&[("cat", &[0, 2, 4])], &[]);
        assert_eq!(r.search_and("cats"), vec![0, 2, 4]);
        assert_eq!(r.search_or("cat"), vec![0, 2, 4]);
    }

    #[test]
    fn stop_words_and_blank_queries_are_empty() {
        let r = retriever(&[("cat", &[0]), ("the", &[0, 1])], &["the"]);
        assert!(r.search_and("").is_empty());
        assert!(r.search_or("   ").is_empty());
        assert!(r.search_and("the").is_empty());
        assert_eq!(r.search_and("the cat"), vec![0]);
    }

    #[test]
    fn and_short_circuits_on_empty_accumulator() {
        let r = retriever(&[("cat", &[1]), ("dog", &[2]), ("bird", &[1, 2])], &[]);
        assert!(r.search_and("cat dog bird").is_empty());
    }

    #[test]
    fn many_terms_match_set_algebra() {
        let sets: Vec<(&str, Vec<DocId>)> = vec![
            ("alpha", (0..90).filter(|d| d % 2 == 0).collect()),
            ("beta", (0..90).filter(|d| d % 3 == 0).collect()),
            ("gamma", (0..90).filter(|d| d % 7 != 1).collect()),
        ];
        let pairs: Vec<(&str, &[DocId])> = sets.iter().map(|(t, ids)| (*t, ids.as_slice())).collect();
        let r = retriever(&pairs, &[]);

        let as_set = |ids: &Vec<DocId>| ids.iter().copied().collect::<BTreeSet<_>>();
        let and: BTreeSet<DocId> = as_set(&sets[0].1)
            .intersection(&as_set(&sets[1].1))
            .copied()
            .collect::<BTreeSet<_>>()
            .intersection(&as_set(&sets[2].1))
            .copied()
            .collect();
        let or: BTreeSet<DocId> = sets.iter().flat_map(|(_, ids)| ids.iter().copied()).collect();

        assert_eq!(r.search_and("alpha beta gamma"), and.into_iter().collect::<Vec<_>>());
        assert_eq!(r.search_or("alpha beta gamma"), or.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn query_mode_parses() {
        assert_eq!("AND".parse::<QueryMode>(), Ok(QueryMode::And));
        assert_eq!("or".parse::<QueryMode>(), Ok(QueryMode::Or));
        assert!("xor".parse::<QueryMode>().is_err());
    }

    #[test]
    fn query_mode_serde_is_lowercase() {
        assert_eq!(serde_json::from_str::<QueryMode>(r#""or""#).unwrap(), QueryMode::Or);
        assert_eq!(serde_json::to_string(&QueryMode::And).unwrap(), r#""and""#);
        assert!(serde_json::from_str::<QueryMode>(r#""xor""#).is_err());
        assert_eq!(QueryMode::default(), QueryMode::And);
    }

    #[test]
    fn resolves_paths() {
        let r = retriever(&[], &[]);
        assert_eq!(r.resolve(3), Some("doc3"));
        assert_eq!(r.resolve(1000), None);
    }
}
