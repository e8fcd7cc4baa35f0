use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot use state directory {}: {source}", path.display())]
    StateDir { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` when missing and checks that files can be created in it.
pub fn ensure_state_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |source| PersistError::StateDir {
        path: dir.to_path_buf(),
        source,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(unusable)?;
        }
        Err(err) => return Err(unusable(err)),
    }
    scratch_file(dir, "check").map_err(unusable)?;
    Ok(())
}

fn scratch_file(dir: &Path, stem: &str) -> io::Result<NamedTempFile> {
    Builder::new()
        .prefix(&format!(".{stem}."))
        .suffix(".tmp")
        .tempfile_in(dir)
}

/// Small text files kept in the state directory.
///
/// A write lands in a sibling scratch file first and is renamed over the
/// target, so readers never observe half of a file.
pub struct StateFiles {
    dir: PathBuf,
}

impl StateFiles {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `Ok(None)` until the file has been written once.
    pub fn read(&self, filename: &str) -> Result<Option<String>, PersistError> {
        fs::read_to_string(self.dir.join(filename))
            .map(Some)
            .or_else(|err| match err.kind() {
                io::ErrorKind::NotFound => Ok(None),
                _ => Err(err.into()),
            })
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_state_dir(&self.dir)?;

        let mut scratch = scratch_file(&self.dir, filename)?;
        scratch.write_all(content.as_bytes())?;
        scratch.as_file().sync_all()?;

        let target = self.dir.join(filename);
        scratch
            .persist(&target)
            .map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}
