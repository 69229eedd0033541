use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The persisted artifacts an index directory is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Index,
    Documents,
    CollectionFrequency,
    StopWordCache,
    Meta,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::Index => "index dictionary",
            Artifact::Documents => "document table",
            Artifact::CollectionFrequency => "collection frequency table",
            Artifact::StopWordCache => "stop-word cache",
            Artifact::Meta => "index metadata",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A required artifact is not on disk.
    #[error("missing {artifact}: '{}'", path.display())]
    MissingArtifact { artifact: Artifact, path: PathBuf },
    /// A line of a persisted artifact could not be parsed. `line` is 1-based.
    #[error("malformed {artifact} at line {line}: {message}")]
    Parse {
        artifact: Artifact,
        line: usize,
        message: String,
    },
    /// A value cannot be written to a line-based artifact without changing
    /// what is read back.
    #[error("cannot write {artifact}: {message}")]
    Unencodable { artifact: Artifact, message: String },
    /// The document source failed while being enumerated.
    #[error("document source failed: {0}")]
    Source(String),
}

impl IndexError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        IndexError::Io { path: path.into(), source }
    }

    pub(crate) fn parse(artifact: Artifact, line: usize, message: impl Into<String>) -> Self {
        IndexError::Parse { artifact, line, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
