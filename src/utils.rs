use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Checks if a directory entry is hidden (starts with '.').
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

/// Case-insensitive extension check. `extensions` are given without the leading dot.
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
}

/// Recursively lists all files under `dir`.
///
/// Unlike a plain `collect::<Result<_, _>>()`, an unreadable entry does not abort the walk:
/// it is returned separately so the caller can log it and carry on.
pub fn list_files_walkdir_filtered(
    dir: &Path,
    include_hidden: bool,
) -> (Vec<PathBuf>, Vec<walkdir::Error>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    let entries = WalkDir::new(dir)
        .into_iter()
        // The root itself is never treated as hidden, `.` would otherwise be filtered out.
        .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e));
    for entry in entries {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }
    (files, errors)
}
