//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find the config file by walking up from `start`.
///
/// An absolute `config_name` that exists is returned as-is.
///
/// ```text
/// /home/user/app/www/build-1.0.0/  ← start
/// /home/user/app/appbake.toml      ← found
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_parent() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("www/build-1.0.0");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("appbake.toml"), "").unwrap();

        let found = find_config_file(Path::new("appbake.toml"), &nested).unwrap();
        assert_eq!(found, tmp.path().join("appbake.toml"));
    }

    #[test]
    fn test_find_config_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(find_config_file(Path::new("no-such-appbake.toml"), tmp.path()).is_none());
    }

    #[test]
    fn test_find_config_absolute() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        assert!(find_config_file(&path, tmp.path()).is_none());
        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
