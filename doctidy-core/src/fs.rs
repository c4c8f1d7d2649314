// Filesystem seam used by the planner and executor.
//
// Everything that touches source, destination or archive files goes through
// `FileSystem` so the disposition state machine can be driven against a
// filesystem that fails on demand.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    /// Copy `from` to `to`; `to` must not exist
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Move `from` to `to`; `to` must not exist
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn write_string(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Show `path` in the platform file browser
    fn open_in_file_browser(&self, path: &Path) -> io::Result<()>;
}

/// `FileSystem` backed by std::fs
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl StdFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        ensure_absent(to)?;
        fs::copy(from, to).map(|_| ())
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        ensure_absent(to)?;
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                // Different volumes cannot be renamed across
                debug!("rename failed ({rename_err}), trying copy + remove");
                copy_then_remove(from, to, |from, to| fs::copy(from, to).map(|_| ()))
            }
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn open_in_file_browser(&self, path: &Path) -> io::Result<()> {
        let program = if cfg!(target_os = "windows") {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Command::new(program).arg(path).spawn().map(|_| ())
    }
}

/// Second half of a move that could not be renamed. `to` was absent before,
/// so whatever a failed step leaves there is a partial copy and is removed.
fn copy_then_remove<F>(from: &Path, to: &Path, copy: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    if let Err(copy_err) = copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(copy_err);
    }
    if let Err(remove_err) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(remove_err);
    }
    Ok(())
}

fn ensure_absent(path: &Path) -> io::Result<()> {
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("'{}' already exists", path.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        let err = StdFileSystem::new().copy(&from, &to).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&to).unwrap(), b"old");
    }

    #[test]
    fn test_move_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        fs::write(&from, b"scan").unwrap();

        StdFileSystem::new().move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"scan");
    }

    #[test]
    fn test_copy_then_remove_moves_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        fs::write(&from, b"scan").unwrap();

        copy_then_remove(&from, &to, |from, to| fs::copy(from, to).map(|_| ())).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"scan");
    }

    #[test]
    fn test_failed_copy_leaves_no_partial_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.pdf");
        let to = dir.path().join("b.pdf");
        fs::write(&from, vec![7u8; 4096]).unwrap();

        // The target volume fills up after the first kilobyte
        let err = copy_then_remove(&from, &to, |_, to| {
            fs::write(to, vec![7u8; 1024])?;
            Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "no space left on device");
        assert!(!to.exists());
        assert_eq!(fs::read(&from).unwrap().len(), 4096);

        // A retry starts from a clean destination
        StdFileSystem::new().move_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap().len(), 4096);
    }

    #[test]
    fn test_move_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = StdFileSystem::new()
            .move_file(&dir.path().join("missing.pdf"), &dir.path().join("b.pdf"));
        assert!(result.is_err());
        assert!(!dir.path().join("b.pdf").exists());
    }
}
