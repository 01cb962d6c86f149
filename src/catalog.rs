//! Discovery of the ordered display asset catalog.
//!
//! Assets are image files in one directory whose names follow a fixed
//! pattern (`segment_000.png`, `segment_001.png`, ...). Lexicographic order
//! of the file names is the worst-to-healthiest order of the catalog.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name pattern that catalog entries must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPattern {
    pub prefix: String,
    /// Extension without the dot, compared case-insensitively
    pub extension: String,
}

impl Default for AssetPattern {
    fn default() -> Self {
        Self {
            prefix: "segment_".to_string(),
            extension: "png".to_string(),
        }
    }
}

impl AssetPattern {
    pub fn matches(&self, path: &Path) -> bool {
        let name_ok = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(&self.prefix))
            .unwrap_or(false);
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false);
        name_ok && ext_ok
    }
}

impl std::fmt::Display for AssetPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*.{}", self.prefix, self.extension)
    }
}

/// Catalog errors.
#[derive(Debug)]
pub enum CatalogError {
    IoError(String),
    /// No file matched the pattern
    Empty { dir: PathBuf, pattern: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::IoError(e) => write!(f, "IO error: {e}"),
            CatalogError::Empty { dir, pattern } => {
                write!(f, "No assets matching {pattern} found in {dir:?}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Ordered, non-empty list of asset paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCatalog {
    assets: Vec<PathBuf>,
}

impl AssetCatalog {
    /// Build a catalog from an explicit list, keeping its order.
    pub fn new(assets: Vec<PathBuf>) -> Result<Self, CatalogError> {
        if assets.is_empty() {
            return Err(CatalogError::Empty {
                dir: PathBuf::new(),
                pattern: String::new(),
            });
        }
        Ok(Self { assets })
    }

    /// Scan `dir` for files matching `pattern`, sorted by file name.
    pub fn discover(dir: &Path, pattern: &AssetPattern) -> Result<Self, CatalogError> {
        let mut assets: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| CatalogError::IoError(format!("{}: {e}", dir.display())))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && pattern.matches(p))
            .collect();

        if assets.is_empty() {
            return Err(CatalogError::Empty {
                dir: dir.to_path_buf(),
                pattern: pattern.to_string(),
            });
        }

        assets.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(Self { assets })
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.assets.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.assets.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bloom-catalog-{tag}-{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_pattern_matching() {
        let pattern = AssetPattern::default();
        assert!(pattern.matches(Path::new("/a/segment_001.png")));
        assert!(pattern.matches(Path::new("segment_x.PNG")));
        assert!(!pattern.matches(Path::new("segment_001.jpg")));
        assert!(!pattern.matches(Path::new("flower_001.png")));
        assert_eq!(pattern.to_string(), "segment_*.png");
    }

    #[test]
    fn test_discover_sorts_and_filters() {
        let dir = temp_dir("sort");
        for name in ["segment_002.png", "segment_000.png", "notes.txt", "segment_001.png"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let catalog = AssetCatalog::discover(&dir, &AssetPattern::default()).unwrap();
        let names: Vec<String> = catalog
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["segment_000.png", "segment_001.png", "segment_002.png"]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = temp_dir("empty");
        let result = AssetCatalog::discover(&dir, &AssetPattern::default());
        assert!(matches!(result, Err(CatalogError::Empty { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let result = AssetCatalog::discover(
            Path::new("/nonexistent/bloom/assets"),
            &AssetPattern::default(),
        );
        assert!(matches!(result, Err(CatalogError::IoError(_))));
    }

    #[test]
    fn test_explicit_catalog() {
        assert!(AssetCatalog::new(Vec::new()).is_err());
        let catalog = AssetCatalog::new(vec!["b.png".into(), "a.png".into()]).unwrap();
        assert_eq!(catalog.get(0), Some(Path::new("b.png")));
        assert_eq!(catalog.len(), 2);
    }
}
