//! Line-based text artifacts of an index directory.
//!
//! ```text
//! index.dict          term|df|doc:tf,doc:tf,...
//! docs.map            doc<TAB>path
//! collection.freq     term<TAB>count
//! stop_by_freq.cache  one stem per line
//! meta.json           build parameters
//! ```
//!
//! Keys are written in sorted order so the same build always produces the
//! same bytes. Blank lines are ignored on load; anything else that does not
//! parse is reported with its artifact and 1-based line number.

use crate::error::{Artifact, IndexError, Result};
use crate::index::{BuildOutput, CollectionFrequencies, DocId, DocTable, InvertedIndex};
use crate::posting::{Posting, PostingList};
use crate::retriever::Retriever;
use crate::stopwords::StopWords;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};

pub const META_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_docs: usize,
    pub num_terms: usize,
    pub threshold_percent: f64,
    pub created_at: String,
}

impl MetaFile {
    pub fn for_build(out: &BuildOutput, threshold_percent: f64, created_at: String) -> Self {
        Self {
            version: META_VERSION,
            num_docs: out.num_docs(),
            num_terms: out.num_terms(),
            threshold_percent,
            created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.dict") }
    pub fn docs(&self) -> PathBuf { self.root.join("docs.map") }
    pub fn collection_freq(&self) -> PathBuf { self.root.join("collection.freq") }
    pub fn stop_cache(&self) -> PathBuf { self.root.join("stop_by_freq.cache") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

// ---- index.dict ----

pub fn encode_index(index: &InvertedIndex) -> String {
    let mut terms: Vec<&String> = index.keys().collect();
    terms.sort();
    let mut out = String::new();
    for term in terms {
        let list = &index[term];
        out.push_str(term);
        out.push('|');
        out.push_str(&list.df().to_string());
        out.push('|');
        let pairs: Vec<String> = list.iter().map(|p| format!("{}:{}", p.doc_id, p.tf)).collect();
        out.push_str(&pairs.join(","));
        out.push('\n');
    }
    out
}

pub fn decode_index(text: &str) -> Result<InvertedIndex> {
    let mut index = InvertedIndex::new();
    for (line_no, line) in numbered_lines(text) {
        let err = |msg: String| IndexError::parse(Artifact::Index, line_no, msg);
        let fields: Vec<&str> = line.split('|').collect();
        let [term, df, postings] = fields[..] else {
            return Err(err(format!("expected 3 '|'-separated fields, found {}", fields.len())));
        };
        if term.is_empty() {
            return Err(err("empty term".into()));
        }
        let df: usize = df.trim().parse().map_err(|e| err(format!("bad document frequency '{df}': {e}")))?;

        let mut parsed = Vec::new();
        if !postings.trim().is_empty() {
            for pair in postings.split(',') {
                let (doc, tf) = pair
                    .split_once(':')
                    .ok_or_else(|| err(format!("posting '{pair}' is not doc:tf")))?;
                let doc: DocId = doc.trim().parse().map_err(|e| err(format!("bad doc id '{doc}': {e}")))?;
                let tf: u32 = tf.trim().parse().map_err(|e| err(format!("bad term frequency '{tf}': {e}")))?;
                parsed.push(Posting::with_tf(doc, tf));
            }
        }
        let list = PostingList::from_postings(parsed);
        if let Some(doc) = list.first_duplicate() {
            return Err(err(format!("document {doc} listed twice for '{term}'")));
        }
        if list.df() != df {
            return Err(err(format!("document frequency {df} but {} postings", list.df())));
        }
        if index.insert(term.to_string(), list).is_some() {
            return Err(err(format!("term '{term}' repeated")));
        }
    }
    Ok(index)
}

// ---- docs.map ----

/// Fails on a path holding a line break, which would not survive a load.
pub fn encode_docs(docs: &DocTable) -> Result<String> {
    let mut out = String::new();
    for (id, path) in docs {
        if path.contains(['\n', '\r']) {
            return Err(IndexError::Unencodable {
                artifact: Artifact::Documents,
                message: format!("path of doc {id} contains a line break: {path:?}"),
            });
        }
        out.push_str(&format!("{id}\t{path}\n"));
    }
    Ok(out)
}

pub fn decode_docs(text: &str) -> Result<DocTable> {
    let mut docs = DocTable::new();
    for (line_no, line) in numbered_lines(text) {
        let err = |msg: String| IndexError::parse(Artifact::Documents, line_no, msg);
        let (id, path) = line.split_once('\t').ok_or_else(|| err("missing tab".into()))?;
        let id: DocId = id.trim().parse().map_err(|e| err(format!("bad doc id '{id}': {e}")))?;
        if docs.insert(id, path.to_string()).is_some() {
            return Err(err(format!("doc id {id} repeated")));
        }
    }
    Ok(docs)
}

// ---- collection.freq ----

pub fn encode_collection_freq(cf: &CollectionFrequencies) -> String {
    let mut entries: Vec<(&String, &u64)> = cf.iter().collect();
    entries.sort();
    entries.into_iter().map(|(term, n)| format!("{term}\t{n}\n")).collect()
}

pub fn decode_collection_freq(text: &str) -> Result<CollectionFrequencies> {
    let mut cf = CollectionFrequencies::new();
    for (line_no, line) in numbered_lines(text) {
        let err = |msg: String| IndexError::parse(Artifact::CollectionFrequency, line_no, msg);
        let (term, count) = line.split_once('\t').ok_or_else(|| err("missing tab".into()))?;
        if term.is_empty() {
            return Err(err("empty term".into()));
        }
        let count: u64 = count.trim().parse().map_err(|e| err(format!("bad count '{count}': {e}")))?;
        if cf.insert(term.to_string(), count).is_some() {
            return Err(err(format!("term '{term}' repeated")));
        }
    }
    Ok(cf)
}

// ---- stop_by_freq.cache ----

pub fn encode_stop_words(terms: &HashSet<String>) -> String {
    let mut sorted: Vec<&String> = terms.iter().collect();
    sorted.sort();
    sorted.into_iter().map(|t| format!("{t}\n")).collect()
}

pub fn decode_stop_words(text: &str) -> HashSet<String> {
    numbered_lines(text).map(|(_, line)| line.trim().to_string()).collect()
}

fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty())
}

// ---- files ----

fn read_artifact(path: &Path, artifact: Artifact) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IndexError::MissingArtifact { artifact, path: path.to_path_buf() },
        _ => IndexError::io(path, e),
    })
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).map_err(|e| IndexError::io(dir, e))?;
    }
    fs::write(path, contents).map_err(|e| IndexError::io(path, e))
}

pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    write_artifact(path, &encode_index(index))
}

pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    decode_index(&read_artifact(path, Artifact::Index)?)
}

pub fn save_docs(path: &Path, docs: &DocTable) -> Result<()> {
    write_artifact(path, &encode_docs(docs)?)
}

pub fn load_docs(path: &Path) -> Result<DocTable> {
    decode_docs(&read_artifact(path, Artifact::Documents)?)
}

pub fn save_collection_freq(path: &Path, cf: &CollectionFrequencies) -> Result<()> {
    write_artifact(path, &encode_collection_freq(cf))
}

pub fn load_collection_freq(path: &Path) -> Result<CollectionFrequencies> {
    decode_collection_freq(&read_artifact(path, Artifact::CollectionFrequency)?)
}

pub fn save_stop_word_cache(path: &Path, terms: &HashSet<String>) -> Result<()> {
    write_artifact(path, &encode_stop_words(terms))
}

pub fn load_stop_word_cache(path: &Path) -> Result<HashSet<String>> {
    Ok(decode_stop_words(&read_artifact(path, Artifact::StopWordCache)?))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)
        .map_err(|e| IndexError::parse(Artifact::Meta, e.line(), e.to_string()))?;
    write_artifact(&paths.meta(), &json)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let text = read_artifact(&paths.meta(), Artifact::Meta)?;
    serde_json::from_str(&text).map_err(|e| IndexError::parse(Artifact::Meta, e.line(), e.to_string()))
}

/// Write the index, document table, collection frequencies and stop-word
/// cache of a build. Nothing is written if any of them cannot be encoded.
pub fn save_build(paths: &IndexPaths, out: &BuildOutput) -> Result<()> {
    let docs = encode_docs(&out.docs)?;
    save_index(&paths.index(), &out.index)?;
    write_artifact(&paths.docs(), &docs)?;
    save_collection_freq(&paths.collection_freq(), &out.collection_freq)?;
    save_stop_word_cache(&paths.stop_cache(), out.stop_words.by_frequency())?;
    tracing::info!(root = %paths.root.display(), terms = out.num_terms(), docs = out.num_docs(), "index saved");
    Ok(())
}

/// Index and document table, as needed to answer queries.
pub fn load_index_files(index_path: &Path, docs_path: &Path) -> Result<(InvertedIndex, DocTable)> {
    let index = load_index(index_path)?;
    let docs = load_docs(docs_path)?;
    tracing::info!(terms = index.len(), docs = docs.len(), "index loaded");
    Ok((index, docs))
}

pub fn load_stop_words(cf_path: &Path, stoplist_path: &Path, cache_path: &Path) -> Result<StopWords> {
    StopWords::load_precomputed(cf_path, stoplist_path, cache_path)
}

/// Everything a query front end needs, from one index directory.
pub fn open_retriever(paths: &IndexPaths, stoplist_path: &Path) -> Result<Retriever> {
    let (index, docs) = load_index_files(&paths.index(), &paths.docs())?;
    let stop_words = load_stop_words(&paths.collection_freq(), stoplist_path, &paths.stop_cache())?;
    Ok(Retriever::new(index, docs, stop_words))
}
