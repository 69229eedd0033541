use crate::DocId;
use std::collections::HashMap;

/// One term's occurrences in one document.
#[derive(Debug, Clone, Default)]
pub struct Posting {
    pub doc_id: DocId,
    /// Occurrences of the term in the document.
    pub tf: u32,
    /// Token offsets within the document. Kept for phrase queries; not
    /// persisted and not read by boolean retrieval.
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn new(doc_id: DocId) -> Self {
        Self { doc_id, tf: 0, positions: Vec::new() }
    }

    pub fn with_tf(doc_id: DocId, tf: u32) -> Self {
        Self { doc_id, tf, positions: Vec::new() }
    }

    /// Record one occurrence at `pos`.
    pub fn add_occurrence(&mut self, pos: u32) {
        self.tf += 1;
        self.positions.push(pos);
    }
}

/// Postings compare on document id and term frequency only.
impl PartialEq for Posting {
    fn eq(&self, other: &Self) -> bool {
        self.doc_id == other.doc_id && self.tf == other.tf
    }
}

impl Eq for Posting {}

/// Postings of a single term, ascending by document id, plus a skip table.
///
/// Lists are appended to while being built, then [`finalize`](Self::finalize)d
/// once. Merges produce new lists instead of mutating an operand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
    /// index -> index + span
    skips: HashMap<usize, usize>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a finalized list from postings in any order.
    pub fn from_postings(postings: Vec<Posting>) -> Self {
        let mut list = Self { postings, skips: HashMap::new() };
        list.finalize();
        list
    }

    pub fn push(&mut self, posting: Posting) {
        self.postings.push(posting);
    }

    pub fn sort_by_doc_id(&mut self) {
        self.postings.sort_by_key(|p| p.doc_id);
    }

    /// Sort and rebuild the skip table. Must run after the last insertion.
    pub fn finalize(&mut self) {
        self.sort_by_doc_id();
        self.compute_skips();
    }

    /// Distance between skip origins for a list of length `len`: floor(sqrt(len)),
    /// or `None` when the list is too short to carry skips.
    pub fn skip_span(len: usize) -> Option<usize> {
        if len < 4 {
            return None;
        }
        let mut span = (len as f64).sqrt() as usize;
        // guard against float rounding on perfect squares
        while span * span > len {
            span -= 1;
        }
        while (span + 1) * (span + 1) <= len {
            span += 1;
        }
        Some(span)
    }

    pub fn compute_skips(&mut self) {
        self.skips.clear();
        let len = self.postings.len();
        let Some(span) = Self::skip_span(len) else { return };
        let mut i = 0;
        while i + span < len {
            self.skips.insert(i, i + span);
            i += span;
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Document frequency: the number of documents holding the term.
    pub fn df(&self) -> usize {
        self.postings.len()
    }

    pub fn get(&self, i: usize) -> Option<&Posting> {
        self.postings.get(i)
    }

    pub fn doc_id_at(&self, i: usize) -> DocId {
        self.postings[i].doc_id
    }

    /// Forward skip target from index `i`, if one was computed.
    pub fn skip_from(&self, i: usize) -> Option<usize> {
        self.skips.get(&i).copied()
    }

    /// Skip entries sorted by origin.
    pub fn skips(&self) -> Vec<(usize, usize)> {
        let mut out: Vec<(usize, usize)> = self.skips.iter().map(|(&k, &v)| (k, v)).collect();
        out.sort_unstable();
        out
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    pub fn doc_ids(&self) -> Vec<DocId> {
        self.postings.iter().map(|p| p.doc_id).collect()
    }

    /// First document id that appears more than once, if any. Only meaningful
    /// on a sorted list.
    pub fn first_duplicate(&self) -> Option<DocId> {
        self.postings
            .windows(2)
            .find(|w| w[0].doc_id == w[1].doc_id)
            .map(|w| w[0].doc_id)
    }
}
