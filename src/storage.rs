use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Terminal disposition for one image. Every image in a batch reaches
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ready,
    Failed,
}

impl Outcome {
    pub fn dir_name(self) -> &'static str {
        match self {
            Outcome::Ready => "ready",
            Outcome::Failed => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Moves `src` to `dst`, overwriting any existing destination. Rename is
/// tried first; when it fails, typically because `dst` sits on another
/// filesystem, the file is copied and the original removed.
fn move_file(src: &Path, dst: &Path) -> Result<(), StorageError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    std::fs::copy(src, dst).map_err(|e| StorageError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    std::fs::remove_file(src).map_err(|e| StorageError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Routes processed images into the `ready/` and `failed/` buckets under
/// the input folder.
pub struct OutcomeRouter {
    ready_dir: PathBuf,
    failed_dir: PathBuf,
}

impl OutcomeRouter {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        let input = input_directory.as_ref();
        Self {
            ready_dir: input.join(Outcome::Ready.dir_name()),
            failed_dir: input.join(Outcome::Failed.dir_name()),
        }
    }

    /// Creates both destination directories. Idempotent; a failure here is
    /// batch-fatal and must be surfaced before any image is processed.
    pub fn prepare(&self) -> Result<(), StorageError> {
        ensure_directory(&self.ready_dir)?;
        ensure_directory(&self.failed_dir)
    }

    /// Moves the file into the bucket for `outcome`, overwriting any
    /// same-named file already there (rename semantics). Returns the
    /// destination path.
    pub fn route(
        &self,
        source: &Path,
        filename: &str,
        outcome: Outcome,
    ) -> Result<PathBuf, StorageError> {
        let destination = self.bucket(outcome).join(filename);
        move_file(source, &destination)?;
        Ok(destination)
    }

    fn bucket(&self, outcome: Outcome) -> &Path {
        match outcome {
            Outcome::Ready => &self.ready_dir,
            Outcome::Failed => &self.failed_dir,
        }
    }
}

fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
