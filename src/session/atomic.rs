//! Durable single-file writes
//!
//! Every authoritative file is written to a temporary sibling, flushed,
//! fsynced and renamed over the target. A crash at any point leaves either the
//! previous file or the new one, never a partial write. Orphaned temporaries
//! carry a `.tmp` suffix and are ignored by readers.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use image::{RgbImage, RgbaImage};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::io::error::{GrowError, Result, persistence_error};
use crate::io::image::{encode_png, encode_rgba_png};

/// A fully written and fsynced temporary file that has not replaced its
/// target yet
///
/// Dropping it deletes the temporary and leaves the target untouched.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    /// Atomically rename the staged file over the target
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the rename fails
    pub fn commit(self) -> Result<()> {
        let Self { temp, target } = self;
        temp.persist(&target)
            .map_err(|err| GrowError::Persistence {
                path: target.clone(),
                operation: "rename",
                source: err.error,
            })?;
        sync_parent(&target);
        Ok(())
    }

    /// Leave the temporary on disk without renaming it, as a crash between
    /// fsync and rename would
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the temporary cannot be kept
    pub fn abandon(self) -> Result<PathBuf> {
        let path = self.temp.path().to_path_buf();
        self.temp
            .into_temp_path()
            .keep()
            .map_err(|err| GrowError::Persistence {
                path,
                operation: "keep temporary",
                source: err.error,
            })
    }
}

/// Write and fsync a temporary sibling of `path` without replacing it
///
/// # Errors
///
/// Returns a persistence error if the directory, temporary file, write or
/// fsync fails
pub fn stage_durably<F>(path: &Path, write: F) -> Result<StagedWrite>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    fs::create_dir_all(&parent).map_err(persistence_error(&parent, "create directory"))?;

    let prefix = format!(
        ".{}.",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(persistence_error(&parent, "create temporary"))?;

    write(temp.as_file_mut()).map_err(persistence_error(temp.path(), "write temporary"))?;
    temp.as_file_mut()
        .flush()
        .map_err(persistence_error(temp.path(), "flush temporary"))?;
    temp.as_file()
        .sync_all()
        .map_err(persistence_error(temp.path(), "fsync temporary"))?;

    Ok(StagedWrite {
        temp,
        target: path.to_path_buf(),
    })
}

/// Replace `path` durably with whatever `write` produces
///
/// # Errors
///
/// Returns a persistence error if any step of the write fails; the previous
/// contents of `path` are then untouched
pub fn write_durably<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    stage_durably(path, write)?.commit()
}

/// Durably write raw bytes
///
/// # Errors
///
/// See [`write_durably`]
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    write_durably(path, |file| file.write_all(bytes))
}

/// Durably write UTF-8 text
///
/// # Errors
///
/// See [`write_durably`]
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    write_bytes(path, text.as_bytes())
}

/// Durably write pretty-printed JSON
///
/// # Errors
///
/// Returns a serialization error if `value` cannot be encoded, otherwise see
/// [`write_durably`]
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes =
        serde_json::to_vec_pretty(value).map_err(|source| GrowError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
    bytes.push(b'\n');
    write_bytes(path, &bytes)
}

/// Durably write an RGB image as PNG
///
/// # Errors
///
/// Returns an encode error or see [`write_durably`]
pub fn write_png(path: &Path, image: &RgbImage) -> Result<()> {
    let bytes = encode_png(image, &path.display().to_string())?;
    write_bytes(path, &bytes)
}

/// Durably write an RGBA image as PNG
///
/// # Errors
///
/// Returns an encode error or see [`write_durably`]
pub fn write_rgba_png(path: &Path, image: &RgbaImage) -> Result<()> {
    let bytes = encode_rgba_png(image, &path.display().to_string())?;
    write_bytes(path, &bytes)
}

/// Best-effort fsync of the directory holding `path` so the rename is durable
fn sync_parent(path: &Path) {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };
    if let Err(err) = File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::debug!(path = %parent.display(), %err, "Directory fsync unavailable");
    }
}
