//! The cached local badge list.
//!
//! One JSON file, a flat array of badge IDs:
//!
//! ```json
//! [
//!   "00220394",
//!   "20047935",
//!   "F39A370E"
//! ]
//! ```
//!
//! This file is the reader's entire OFFLINE authority, so its failure
//! rules are strict and deliberately one-sided:
//!
//! - Reading never fails the caller.  A missing file is an empty list
//!   (first boot before any push), and a corrupt file is an *entirely*
//!   empty list.  The reader fails closed on bad data; a half-parsed
//!   roster could admit someone a full parse would have rejected.
//! - Writing reports success or failure as a plain `bool` and the
//!   failure is logged, not propagated.  The in-memory roster the
//!   authority just pushed stays authoritative for this process either
//!   way; only persistence across a restart is at risk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use turnstile_core::BadgeId;

/// What went wrong reading or writing the cache file.
///
/// Internal to the store's own reporting; callers of [`LocalStore`] see
/// empty sets and `bool`s, never this type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error on badge cache: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON was malformed or contained an invalid badge entry.
    #[error("badge cache is not a valid badge list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The on-disk badge cache.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Creates a store over the given file path.  Nothing is read until
    /// [`LocalStore::load`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached list.
    ///
    /// Missing file, unreadable file, and corrupt content all come back
    /// as an empty set; the distinction only changes the log line.
    pub fn load(&self) -> HashSet<BadgeId> {
        match self.read_list() {
            Ok(Some(badges)) => {
                info!(
                    "loaded {} badge(s) from cache at {}",
                    badges.len(),
                    self.path.display()
                );
                badges
            }
            Ok(None) => {
                info!(
                    "no badge cache at {}; starting with an empty list",
                    self.path.display()
                );
                HashSet::new()
            }
            Err(e) => {
                warn!(
                    "badge cache at {} is unusable ({e}); treating as empty",
                    self.path.display()
                );
                HashSet::new()
            }
        }
    }

    /// Replaces the cached list wholesale.
    ///
    /// Returns whether the write succeeded.  The list is sorted before
    /// writing so two saves of the same roster produce identical files.
    pub fn save(&self, badges: &HashSet<BadgeId>) -> bool {
        match self.write_list(badges) {
            Ok(()) => {
                info!(
                    "saved {} badge(s) to cache at {}",
                    badges.len(),
                    self.path.display()
                );
                true
            }
            Err(e) => {
                warn!(
                    "could not save badge cache at {}: {e}; in-memory list still applies",
                    self.path.display()
                );
                false
            }
        }
    }

    /// `Ok(None)` means the file does not exist; all other failures are
    /// errors.
    fn read_list(&self) -> Result<Option<HashSet<BadgeId>>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let badges: Vec<BadgeId> = serde_json::from_str(&content)?;
        Ok(Some(badges.into_iter().collect()))
    }

    fn write_list(&self, badges: &HashSet<BadgeId>) -> Result<(), StoreError> {
        let mut sorted: Vec<&BadgeId> = badges.iter().collect();
        sorted.sort();
        let mut json = serde_json::to_string_pretty(&sorted)?;
        json.push('\n');
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(s: &str) -> BadgeId {
        BadgeId::new(s).unwrap()
    }

    fn temp_store(tag: &str) -> (LocalStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "turnstile_store_{tag}_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("local_badges.json");
        (LocalStore::new(&path), dir)
    }

    #[test]
    fn test_missing_file_loads_as_empty_set() {
        // Arrange – store pointed at a file that was never written
        let (store, dir) = temp_store("missing");

        // Act / Assert – empty, not an error
        assert!(store.load().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_then_load_round_trips() {
        // Arrange
        let (store, dir) = temp_store("roundtrip");
        let badges: HashSet<BadgeId> =
            [badge("F39A370E"), badge("20047935")].into_iter().collect();

        // Act
        assert!(store.save(&badges));
        let loaded = store.load();

        // Assert
        assert_eq!(loaded, badges);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_saved_file_is_sorted_json_array() {
        // Two saves of the same set must produce identical bytes, so the
        // array is written in sorted order regardless of hash order.
        let (store, dir) = temp_store("sorted");
        let badges: HashSet<BadgeId> = [
            badge("F39A370E"),
            badge("00220394"),
            badge("72349395"),
        ]
        .into_iter()
        .collect();

        assert!(store.save(&badges));
        let content = std::fs::read_to_string(store.path()).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&content).unwrap();

        assert_eq!(parsed, vec!["00220394", "72349395", "F39A370E"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_json_loads_as_empty_set() {
        // Arrange – not JSON at all
        let (store, dir) = temp_store("corrupt");
        std::fs::write(store.path(), "not json {{{").unwrap();

        // Act / Assert – deny-all, never a partial list
        assert!(store.load().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_one_invalid_entry_discards_the_whole_list() {
        // An empty string is not a valid badge ID.  The safe reading of
        // a damaged cache is no cache.
        let (store, dir) = temp_store("invalid_entry");
        std::fs::write(store.path(), r#"["F39A370E", ""]"#).unwrap();

        assert!(store.load().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_json_shape_loads_as_empty_set() {
        // A JSON object is valid JSON but not a badge list.
        let (store, dir) = temp_store("shape");
        std::fs::write(store.path(), r#"{"badges": ["F39A370E"]}"#).unwrap();

        assert!(store.load().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_replaces_previous_content_wholesale() {
        // Arrange – an existing cache with two entries
        let (store, dir) = temp_store("replace");
        let first: HashSet<BadgeId> =
            [badge("OLD00001"), badge("OLD00002")].into_iter().collect();
        assert!(store.save(&first));

        // Act – save a disjoint list
        let second: HashSet<BadgeId> = [badge("NEW00001")].into_iter().collect();
        assert!(store.save(&second));

        // Assert – old entries are gone
        assert_eq!(store.load(), second);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_to_unwritable_path_returns_false() {
        // Arrange – the parent directory does not exist and is never created
        let path = std::env::temp_dir()
            .join(format!("turnstile_store_absent_{}", uuid::Uuid::new_v4()))
            .join("deeper")
            .join("local_badges.json");
        let store = LocalStore::new(path);

        // Act / Assert – reported, not panicked or propagated
        assert!(!store.save(&HashSet::new()));
    }

    #[test]
    fn test_empty_set_saves_as_empty_array() {
        let (store, dir) = temp_store("empty");

        assert!(store.save(&HashSet::new()));
        let loaded = store.load();

        assert!(loaded.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
