use crate::error::{Artifact, IndexError, Result};
use crate::index::CollectionFrequencies;
use crate::persist;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Terms excluded from indexing and querying: a static list supplied by the
/// user, plus the most frequent terms of the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    static_list: HashSet<String>,
    by_frequency: HashSet<String>,
}

impl StopWords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static list from raw words: trimmed, lower-cased, blanks ignored.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let static_list = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { static_list, by_frequency: HashSet::new() }
    }

    /// Load the static list, one word per line. A missing file yields an
    /// empty list.
    pub fn from_stoplist_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                let sw = Self::from_words(text.lines());
                tracing::debug!(path = %path.display(), words = sw.static_list.len(), "loaded stop list");
                Ok(sw)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "stop list not found, using an empty one");
                Ok(Self::new())
            }
            Err(e) => Err(IndexError::io(path, e)),
        }
    }

    /// Rebuild the query-time filter from a finished build: the static list
    /// plus the cached frequency-derived set. The collection-frequency table
    /// is not read, only required to exist alongside the cache.
    pub fn load_precomputed(cf_path: &Path, stoplist_path: &Path, cache_path: &Path) -> Result<Self> {
        if !cf_path.exists() {
            return Err(IndexError::MissingArtifact {
                artifact: Artifact::CollectionFrequency,
                path: cf_path.to_path_buf(),
            });
        }
        let mut sw = Self::from_stoplist_file(stoplist_path)?;
        sw.by_frequency = persist::load_stop_word_cache(cache_path)?;
        Ok(sw)
    }

    pub fn is_stop(&self, term: &str) -> bool {
        self.static_list.contains(term) || self.by_frequency.contains(term)
    }

    /// Replace the frequency-derived set with the top `percent` of distinct
    /// terms of `cf`. See [`select_by_frequency`](Self::select_by_frequency).
    pub fn compute_by_frequency(&mut self, cf: &CollectionFrequencies, percent: f64) {
        self.by_frequency = Self::select_by_frequency(cf, percent);
        tracing::info!(
            percent,
            distinct_terms = cf.len(),
            selected = self.by_frequency.len(),
            "computed frequency stop words"
        );
    }

    /// The `ceil(distinct * percent / 100)` most frequent terms. Equal
    /// frequencies are ordered by term, ascending, so the cut is deterministic.
    pub fn select_by_frequency(cf: &CollectionFrequencies, percent: f64) -> HashSet<String> {
        if cf.is_empty() || percent.is_nan() || percent <= 0.0 {
            return HashSet::new();
        }
        let k = ((cf.len() as f64) * (percent / 100.0)).ceil() as usize;
        let k = k.min(cf.len());

        let mut ranked: Vec<(&String, &u64)> = cf.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().take(k).map(|(term, _)| term.clone()).collect()
    }

    pub fn static_list(&self) -> &HashSet<String> {
        &self.static_list
    }

    pub fn by_frequency(&self) -> &HashSet<String> {
        &self.by_frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cf(pairs: &[(&str, u64)]) -> CollectionFrequencies {
        pairs.iter().map(|(t, n)| (t.to_string(), *n)).collect()
    }

    #[test]
    fn static_list_is_folded() {
        let sw = StopWords::from_words(["The", "  and ", "", "   "]);
        assert!(sw.is_stop("the"));
        assert!(sw.is_stop("and"));
        assert_eq!(sw.static_list().len(), 2);
    }

    #[test]
    fn top_percent_rounds_up() {
        let table = cf(&[("a", 10), ("b", 5), ("c", 3), ("d", 1)]);
        // ceil(4 * 0.1) = 1
        let set = StopWords::select_by_frequency(&table, 10.0);
        assert_eq!(set, HashSet::from(["a".to_string()]));
        // ceil(4 * 0.5) = 2
        let set = StopWords::select_by_frequency(&table, 50.0);
        assert_eq!(set.len(), 2);
        assert!(set.contains("b"));
    }

    #[test]
    fn zero_percent_selects_nothing() {
        let table = cf(&[("a", 10), ("b", 5)]);
        assert!(StopWords::select_by_frequency(&table, 0.0).is_empty());
        assert!(StopWords::select_by_frequency(&table, -3.0).is_empty());
        assert!(StopWords::select_by_frequency(&CollectionFrequencies::new(), 50.0).is_empty());
    }

    #[test]
    fn over_hundred_percent_takes_everything() {
        let table = cf(&[("a", 10), ("b", 5)]);
        assert_eq!(StopWords::select_by_frequency(&table, 250.0).len(), 2);
    }

    #[test]
    fn ties_break_lexicographically() {
        let table = cf(&[("zeta", 4), ("alpha", 4), ("mid", 4), ("low", 1)]);
        let set = StopWords::select_by_frequency(&table, 50.0);
        assert_eq!(set, HashSet::from(["alpha".to_string(), "mid".to_string()]));
    }

    #[test]
    fn raising_threshold_never_shrinks_set() {
        let table: CollectionFrequencies =
            (0..40u64).map(|i| (format!("t{i:02}"), (i * 7) % 11)).collect();
        let mut prev = HashSet::new();
        for pct in [0.0, 0.5, 1.0, 5.0, 12.5, 30.0, 60.0, 100.0] {
            let cur = StopWords::select_by_frequency(&table, pct);
            assert!(prev.is_subset(&cur), "shrank at {pct}");
            prev = cur;
        }
    }

    #[test]
    fn either_set_marks_stop() {
        let mut sw = StopWords::from_words(["the"]);
        sw.compute_by_frequency(&cf(&[("cat", 9), ("dog", 1)]), 50.0);
        assert!(sw.is_stop("the"));
        assert!(sw.is_stop("cat"));
        assert!(!sw.is_stop("dog"));
    }

    #[test]
    fn missing_stoplist_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sw = StopWords::from_stoplist_file(&dir.path().join("nope.txt")).unwrap();
        assert!(sw.static_list().is_empty());
    }
}
