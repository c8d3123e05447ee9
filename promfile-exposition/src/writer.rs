//! Output file writing.
//!
//! The file is written atomically: first to a `.tmp` sibling, then renamed
//! over the final path, so the textfile collector never scrapes a half
//! written file. Concurrent runs against the same path are last-rename-wins.

use promfile_core::ExporterError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Replace `path` with `contents`. The parent directory must already exist.
pub fn write_textfile(path: &Path, contents: &str) -> Result<(), ExporterError> {
    let tmp = tmp_path(path);
    std::fs::write(&tmp, contents).map_err(write_err(&tmp))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(path)(e));
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "textfile written");
    Ok(())
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExporterError {
    let path = path.to_path_buf();
    move |source| ExporterError::Write { path, source }
}

/// `speedtest.prom` → `speedtest.prom.tmp`. The collector only reads `*.prom`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
