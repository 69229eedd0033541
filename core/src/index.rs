use crate::posting::PostingList;
use crate::stopwords::StopWords;
use std::collections::{BTreeMap, HashMap};

pub type DocId = u32;

/// term -> posting list
pub type InvertedIndex = HashMap<String, PostingList>;

/// doc id -> source path
pub type DocTable = BTreeMap<DocId, String>;

/// term -> total occurrences across the collection
pub type CollectionFrequencies = HashMap<String, u64>;

/// Everything a finished build hands back. Owned by the caller; nothing is
/// shared with the builder afterwards.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    pub docs: DocTable,
    pub collection_freq: CollectionFrequencies,
    pub stop_words: StopWords,
}

impl BuildOutput {
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.index.len()
    }
}
