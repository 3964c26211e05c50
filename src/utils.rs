use log::{debug, warn};
use rand::Rng;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Locate `program` on the search path.
///
/// A name containing a path separator is checked directly; otherwise every
/// `PATH` entry is scanned in order and the first existing executable wins.
pub fn which(program: impl AsRef<Path>) -> Option<PathBuf> {
    which_in(program.as_ref(), env::var_os("PATH"))
}

fn which_in(program: &Path, search_path: Option<std::ffi::OsString>) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }

    for dir in env::split_paths(&search_path?) {
        let candidate = dir.join(program);
        if is_executable(&candidate) {
            debug!("resolved {:?} to {:?}", program, candidate);
            return Some(candidate);
        }
    }

    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Fresh path in the system temp directory with a random stem and the given
/// extension. The file itself is not created.
pub fn temp_file_path(extension: &str) -> PathBuf {
    let random: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();

    env::temp_dir().join(format!("screengif_{}.{}", random, extension))
}

/// Temp file path that removes the file on drop.
///
/// Removal is best-effort; a file that was never written or was already
/// cleaned up is not an error.
#[derive(Debug)]
pub struct TempPath(PathBuf);

impl TempPath {
    pub fn with_extension(extension: &str) -> Self {
        TempPath(temp_file_path(extension))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn as_os_str(&self) -> &OsStr {
        self.0.as_os_str()
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(e) = fs::remove_file(&self.0) {
                warn!("could not remove temp file {:?}: {}", self.0, e);
            }
        }
    }
}

impl AsRef<Path> for TempPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"#!/bin/sh\n").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn which_scans_search_path_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let expected = make_executable(second.path(), "fakebridge");

        let search = env::join_paths([first.path(), second.path()]).unwrap();
        let found = which_in(Path::new("fakebridge"), Some(search)).unwrap();
        assert_eq!(found, expected);
    }

    #[cfg(unix)]
    #[test]
    fn which_ignores_non_executable_files() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("plainfile")).unwrap();

        let search = env::join_paths([dir.path()]).unwrap();
        assert!(which_in(Path::new("plainfile"), Some(search)).is_none());
    }

    #[test]
    fn which_misses_cleanly() {
        assert!(which("definitely-not-a-real-tool-name").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn which_checks_explicit_paths_directly() {
        let dir = tempfile::tempdir().unwrap();
        let exe = make_executable(dir.path(), "tool");
        assert_eq!(which_in(&exe, None), Some(exe.clone()));

        let missing = dir.path().join("nothing-here");
        assert!(which_in(&missing, None).is_none());
    }

    #[test]
    fn temp_paths_carry_the_extension_and_differ() {
        let a = temp_file_path("png");
        let b = temp_file_path("png");
        assert_eq!(a.extension().unwrap(), "png");
        assert_ne!(a, b);
    }

    #[test]
    fn temp_path_removes_file_on_drop() {
        let guard = TempPath::with_extension("mp4");
        let path = guard.as_path().to_path_buf();
        File::create(&path).unwrap();
        assert!(path.exists());
        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn temp_path_drop_tolerates_missing_file() {
        let guard = TempPath::with_extension("gif");
        // never created on disk
        drop(guard);
    }
}
