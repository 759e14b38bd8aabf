//! On-disk rule catalog cache
//!
//! A pretty-printed JSON snapshot of the last successfully generated
//! catalog. It is only read when generation fails, so writing it is
//! best-effort.

use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::rules::Catalog;

/// Rule catalog snapshot at a fixed path
#[derive(Debug, Clone)]
pub struct RuleCache {
    path: PathBuf,
}

impl RuleCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Save the catalog, logging instead of failing
    pub fn save(&self, catalog: &Catalog) {
        match self.try_save(catalog) {
            Ok(()) => tracing::debug!(
                "Saved {} rules to cache: {}",
                catalog.len(),
                self.path.display()
            ),
            Err(e) => tracing::warn!("{e}. The rules will not be cached for future use."),
        }
    }

    /// Save the catalog, creating parent directories as needed
    pub fn try_save(&self, catalog: &Catalog) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(catalog)
            .map_err(|source| CacheError::Serialize { source })?;

        std::fs::write(&self.path, content).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Load the cached catalog
    ///
    /// A missing file is [`CacheError::NotFound`]; an empty array is a valid,
    /// empty catalog.
    pub fn load(&self) -> Result<Catalog, CacheError> {
        if !self.path.exists() {
            return Err(CacheError::NotFound {
                path: self.path.clone(),
            });
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| CacheError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| CacheError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Delete the snapshot; a missing file is fine
    pub fn clear(&self) -> Result<bool, CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleMetadata;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn make_rule(id: &str, description: &str) -> RuleMetadata {
        RuleMetadata {
            id: id.to_string(),
            name: format!("Rule {id}"),
            description: description.to_string(),
            rule_type: "BUG".to_string(),
            severity: "CRITICAL".to_string(),
            tags: vec!["ballerina".to_string(), "safety".to_string()],
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = RuleCache::new(temp_dir.path().join("nested/dir/rule-cache.json"));

        let catalog = Catalog::from(vec![
            make_rule("ballerina:1", "<p>Do X</p>\n"),
            make_rule("ballerina:2", ""),
        ]);
        cache.try_save(&catalog).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded, catalog);
        assert_eq!(
            loaded.ids().collect::<Vec<_>>(),
            vec!["ballerina:1", "ballerina:2"]
        );
    }

    #[test]
    fn test_file_is_pretty_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let cache = RuleCache::new(temp_dir.path().join("rule-cache.json"));
        cache.save(&Catalog::from(vec![make_rule("R1", "")]));

        let content = std::fs::read_to_string(cache.path()).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.contains("\"type\": \"BUG\""));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let cache = RuleCache::new(temp_dir.path().join("rule-cache.json"));

        assert!(!cache.exists());
        assert!(matches!(cache.load(), Err(CacheError::NotFound { .. })));
    }

    #[test]
    fn test_corrupted_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let cache = RuleCache::new(temp_dir.path().join("rule-cache.json"));
        std::fs::write(cache.path(), "{ not json").unwrap();

        assert!(matches!(cache.load(), Err(CacheError::Parse { .. })));
    }

    #[test]
    fn test_empty_array_is_valid_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let cache = RuleCache::new(temp_dir.path().join("rule-cache.json"));
        std::fs::write(cache.path(), "[]").unwrap();

        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let cache = RuleCache::new(blocker.join("rule-cache.json"));

        cache.save(&Catalog::from(vec![make_rule("R1", "")]));
        assert!(matches!(
            cache.try_save(&Catalog::new()),
            Err(CacheError::CreateDir { .. })
        ));
        assert!(!cache.exists());
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let cache = RuleCache::new(temp_dir.path().join("rule-cache.json"));

        assert!(!cache.clear().unwrap());
        cache.try_save(&Catalog::new()).unwrap();
        assert!(cache.clear().unwrap());
        assert!(!cache.exists());
    }
}
