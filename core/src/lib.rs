//! Boolean retrieval over an inverted index.
//!
//! Text is tokenized, stemmed and filtered against stop words, then indexed
//! into per-term posting lists with skip pointers. Queries combine the lists
//! of their terms with AND (skip-assisted intersection) or OR (linear union).

pub mod builder;
pub mod error;
pub mod index;
pub mod persist;
pub mod posting;
pub mod retriever;
pub mod stemmer;
pub mod stopwords;
pub mod tokenizer;

pub use builder::{build_index, BuildConfig, DocumentSource, IndexBuilder, SourceDocument};
pub use error::{Artifact, IndexError, Result};
pub use index::{BuildOutput, CollectionFrequencies, DocId, DocTable, InvertedIndex};
pub use posting::{Posting, PostingList};
pub use retriever::{QueryMode, Retriever};
pub use stopwords::StopWords;
