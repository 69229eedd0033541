use ircore::{DocumentSource, IndexError, SourceDocument};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every regular file under a directory, in path order. Files are read on
/// each enumeration, not kept in memory.
pub struct DirectorySource {
    files: Vec<PathBuf>,
}

impl DirectorySource {
    pub fn scan(root: &Path) -> Result<Self, IndexError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| IndexError::Source(e.to_string()))?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DocumentSource for DirectorySource {
    fn documents(&self) -> Box<dyn Iterator<Item = ircore::Result<SourceDocument>> + '_> {
        Box::new(self.files.iter().map(|path| -> ircore::Result<SourceDocument> {
            let bytes = fs::read(path).map_err(|e| IndexError::io(path, e))?;
            let text = String::from_utf8_lossy(&bytes).into_owned();
            Ok(SourceDocument::new(path.display().to_string(), text))
        }))
    }
}
