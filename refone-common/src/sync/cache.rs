use super::{MatchSummary, Result};
use log::*;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// The wrist device's copy of the last match list it received
#[derive(Debug, Clone)]
pub struct MatchListCache {
    path: PathBuf,
}

impl MatchListCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the cached list. A missing or unreadable cache is treated as empty.
    pub fn load(&self) -> Vec<MatchSummary> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No match cache at {:?}", self.path);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read match cache {:?}: {e}", self.path);
                return Vec::new();
            }
        };

        serde_json::from_slice(&data).unwrap_or_else(|e| {
            warn!("Ignoring corrupt match cache {:?}: {e}", self.path);
            Vec::new()
        })
    }

    /// Replaces the cached list
    pub fn store(&self, matches: &[MatchSummary]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(matches)?)?;
        info!("Cached {} matches", matches.len());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::super::test::summary;
    use super::*;

    #[test]
    fn test_store_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MatchListCache::new(dir.path().join("nested").join("matches.json"));

        assert_eq!(cache.load(), vec![]);

        cache.store(&[summary(1), summary(2)]).unwrap();
        assert_eq!(cache.load(), vec![summary(1), summary(2)]);

        cache.store(&[summary(3)]).unwrap();
        assert_eq!(cache.load(), vec![summary(3)]);
    }

    #[test]
    fn test_corrupt_cache_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.json");
        fs::write(&path, b"[{\"id\": 12").unwrap();

        assert_eq!(MatchListCache::new(&path).load(), vec![]);
    }
}
