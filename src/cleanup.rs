use crate::constants::{LAST_CHECK_FILE, SCREENSHOT_FILE};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether a file name is one of the artifacts the monitor leaves behind.
/// Rolled log files carry a date suffix after `.log`.
pub fn is_artifact(file_name: &str) -> bool {
    file_name.ends_with(".log")
        || file_name.contains(".log.")
        || file_name.ends_with(".html")
        || file_name == SCREENSHOT_FILE
        || file_name == LAST_CHECK_FILE
}

/// Artifact files directly inside `dir`, sorted. A missing directory has none.
pub fn list_artifacts(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_artifact) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Delete every path, continuing past failures. Returns the ones that failed.
pub fn remove_artifacts(files: &[PathBuf]) -> Vec<(PathBuf, io::Error)> {
    files
        .iter()
        .filter_map(|path| fs::remove_file(path).err().map(|e| (path.clone(), e)))
        .collect()
}
