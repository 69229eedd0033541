use crate::error::Result;
use crate::index::{BuildOutput, CollectionFrequencies, DocId, DocTable, InvertedIndex};
use crate::posting::Posting;
use crate::stemmer::stem;
use crate::stopwords::StopWords;
use crate::tokenizer::tokenize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default share of distinct terms turned into stop words by frequency.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 1.0;

/// A document as handed over by the caller: where it came from and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into() }
    }
}

/// A re-readable document collection. Every call to `documents` starts a
/// fresh enumeration in the same order; the build walks it twice.
pub trait DocumentSource {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<SourceDocument>> + '_>;
}

impl DocumentSource for [SourceDocument] {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<SourceDocument>> + '_> {
        Box::new(self.iter().cloned().map(Ok))
    }
}

impl DocumentSource for Vec<SourceDocument> {
    fn documents(&self) -> Box<dyn Iterator<Item = Result<SourceDocument>> + '_> {
        self.as_slice().documents()
    }
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Static stop list, one word per line.
    pub stoplist_path: Option<PathBuf>,
    /// Percentage of distinct terms, by collection frequency, treated as stop words.
    pub threshold_percent: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { stoplist_path: None, threshold_percent: DEFAULT_THRESHOLD_PERCENT }
    }
}

/// Two-pass index construction. Pass 1 gathers collection frequencies over
/// every stem so the frequency stop words are known; pass 2 re-reads the
/// documents and builds posting lists for the remaining stems.
pub struct IndexBuilder {
    stop_words: StopWords,
    threshold_percent: f64,
}

impl IndexBuilder {
    pub fn new(stop_words: StopWords, threshold_percent: f64) -> Self {
        Self { stop_words, threshold_percent }
    }

    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        let stop_words = match &config.stoplist_path {
            Some(path) => StopWords::from_stoplist_file(path)?,
            None => StopWords::new(),
        };
        Ok(Self::new(stop_words, config.threshold_percent))
    }

    pub fn build<S: DocumentSource + ?Sized>(mut self, source: &S) -> Result<BuildOutput> {
        let (collection_freq, pass1_docs) = collect_frequencies(source)?;
        tracing::info!(docs = pass1_docs, distinct_terms = collection_freq.len(), "pass 1 complete");

        self.stop_words.compute_by_frequency(&collection_freq, self.threshold_percent);

        let mut index = InvertedIndex::new();
        let mut docs = DocTable::new();
        let mut next_doc_id: DocId = 0;
        for doc in source.documents() {
            let doc = doc?;
            let doc_id = next_doc_id;
            next_doc_id += 1;

            // per-document accumulation, moved into the global lists afterwards
            let mut local: HashMap<String, Posting> = HashMap::new();
            for (pos, token) in tokenize(&doc.text).iter().enumerate() {
                let term = stem(token);
                if self.stop_words.is_stop(&term) {
                    continue;
                }
                local
                    .entry(term)
                    .or_insert_with(|| Posting::new(doc_id))
                    .add_occurrence(pos as u32);
            }
            for (term, posting) in local {
                index.entry(term).or_default().push(posting);
            }
            docs.insert(doc_id, doc.path);
        }

        if docs.len() != pass1_docs {
            tracing::warn!(pass1 = pass1_docs, pass2 = docs.len(), "document count changed between passes");
        }

        for list in index.values_mut() {
            list.finalize();
        }
        tracing::info!(docs = docs.len(), terms = index.len(), "pass 2 complete");

        Ok(BuildOutput { index, docs, collection_freq, stop_words: self.stop_words })
    }
}

/// Collection frequency of every stem, stop words included, and the number
/// of documents seen.
fn collect_frequencies<S: DocumentSource + ?Sized>(source: &S) -> Result<(CollectionFrequencies, usize)> {
    let mut cf = CollectionFrequencies::new();
    let mut count = 0;
    for doc in source.documents() {
        let doc = doc?;
        for token in tokenize(&doc.text) {
            *cf.entry(stem(&token)).or_insert(0) += 1;
        }
        count += 1;
    }
    Ok((cf, count))
}

/// Build an index over `source` with an optional static stop list and the
/// given frequency threshold.
pub fn build_index<S: DocumentSource + ?Sized>(
    source: &S,
    stoplist_path: Option<&Path>,
    threshold_percent: f64,
) -> Result<BuildOutput> {
    let config = BuildConfig {
        stoplist_path: stoplist_path.map(Path::to_path_buf),
        threshold_percent,
    };
    IndexBuilder::from_config(&config)?.build(source)
}
