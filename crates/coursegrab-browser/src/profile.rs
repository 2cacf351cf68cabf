use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Lock Chrome keeps in a user-data directory while it runs
const SINGLETON_LOCK: &str = "SingletonLock";

enum ProfileDir {
    /// Removed when dropped
    Temporary(TempDir),
    Persistent(PathBuf),
}

/// The Chrome user-data directory of one session
pub struct ProfileManager {
    dir: ProfileDir,
}

impl ProfileManager {
    /// A fresh profile deleted when the manager is dropped
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("coursegrab-profile-")
            .tempdir()?;

        Ok(Self {
            dir: ProfileDir::Temporary(temp_dir),
        })
    }

    /// Create or reuse a profile at `path`, e.g. one already signed in to the course site
    pub fn persistent(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        Ok(Self {
            dir: ProfileDir::Persistent(path),
        })
    }

    /// Persistent profile `~/.coursegrab/profiles/<name>`
    pub fn named(name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }
        Self::persistent(Self::profiles_dir()?.join(name))
    }

    pub fn profiles_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))?;
        Ok(home.join(".coursegrab").join("profiles"))
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            ProfileDir::Temporary(temp_dir) => temp_dir.path(),
            ProfileDir::Persistent(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.dir, ProfileDir::Temporary(_))
    }

    /// Another Chrome appears to hold this profile
    pub fn is_in_use(&self) -> bool {
        // The lock is a dangling symlink on linux, so `exists()` would miss it
        self.path().join(SINGLETON_LOCK).symlink_metadata().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_profile_creates_and_cleans_up() {
        let profile = ProfileManager::temporary().unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.is_dir());
        assert!(profile.is_temporary());
        assert!(!profile.is_in_use());

        drop(profile);

        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_profile_is_created_and_kept() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("course-profile");

        let profile = ProfileManager::persistent(profile_path.clone()).unwrap();
        assert!(profile_path.is_dir());
        assert!(!profile.is_temporary());

        drop(profile);

        assert!(profile_path.exists());
    }

    #[test]
    fn test_locked_profile_is_in_use() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(SINGLETON_LOCK), "host-1234").unwrap();

        let profile = ProfileManager::persistent(temp_dir.path().to_path_buf()).unwrap();
        assert!(profile.is_in_use());
    }

    #[test]
    fn test_named_profile_rejects_path_separators() {
        assert!(ProfileManager::named("../escape").is_err());
        assert!(ProfileManager::named("a\\b").is_err());
        assert!(ProfileManager::named("").is_err());
    }
}
