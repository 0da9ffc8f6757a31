//! The `source` module loads Rust source files and parses them into syntax trees.

use crate::error::{MutatrixError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One source file under mutation: its path, its original text, and the parsed tree.
///
/// The tree is parsed once; the walker clones it and mutates the clone, so `ast`
/// always reflects the file as it was read from disk.
pub struct SourceFile {
    /// Path of the file as given on the command line.
    pub path: PathBuf,

    /// The original file contents.
    pub code: String,

    /// The parsed syntax tree of `code`.
    pub ast: syn::File,
}

impl SourceFile {
    /// Read and parse one source file.
    ///
    /// A parse failure aborts the whole run: the mutant domain is undefined for a
    /// file we cannot read.
    ///
    /// # Arguments
    ///
    /// * `path` - The path of the file to load.
    pub fn load(path: &Path) -> Result<SourceFile> {
        let code = fs::read_to_string(path)?;
        let ast = syn::parse_file(&code).map_err(|e| MutatrixError::parse(path, e))?;

        Ok(SourceFile {
            path: path.to_path_buf(),
            code,
            ast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_source_load_parses_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "fn answer() -> i32 {{ 40 + 2 }}").unwrap();

        let source = SourceFile::load(file.path()).unwrap();
        assert_eq!(source.ast.items.len(), 1);
        assert!(source.code.contains("40 + 2"));
    }

    #[test]
    fn test_source_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "fn answer( {{").unwrap();

        match SourceFile::load(file.path()) {
            Err(MutatrixError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_source_load_missing_file_is_io_error() {
        let result = SourceFile::load(Path::new("/definitely/not/here.rs"));
        assert!(matches!(result, Err(MutatrixError::IO(_))));
    }
}
