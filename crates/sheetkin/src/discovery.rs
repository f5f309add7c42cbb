//! Locate `.feature` files and read them into sheets.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::api::{ApiSheet, api_feature_rows};
use crate::error::SheetError;
use crate::model::{ParsedFeature, Scenario};
use crate::parser::parse_feature;
use crate::rows::feature_rows;
use crate::sheet::{Sheet, SheetNamer};

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Spreadsheet lock files such as `~$report.csv` are never inputs.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}

fn matching_path(entry: DirEntry, extension: &str) -> Option<PathBuf> {
    if !entry.file_type().is_file() {
        return None;
    }
    let path = entry.into_path();
    (has_extension(&path, extension) && !is_lock_file(&path)).then_some(path)
}

fn convert_walkdir_error(base: &Path, err: walkdir::Error) -> Option<SheetError> {
    if err.loop_ancestor().is_some() {
        return None;
    }
    let path = err.path().map_or_else(|| base.to_path_buf(), Path::to_path_buf);
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    Some(SheetError::io(path, source))
}

/// Collect the feature files under `input`.
///
/// A file path is returned as is, whatever its extension. A directory is
/// walked recursively without following symlinks, and every file with a
/// `.feature` extension (any case) is returned in sorted order.
///
/// # Errors
///
/// Returns [`SheetError::Io`] when `input` cannot be inspected or a
/// directory cannot be read.
pub fn collect_feature_files(input: &Path) -> Result<Vec<PathBuf>, SheetError> {
    let metadata = std::fs::metadata(input).map_err(|source| SheetError::io(input, source))?;
    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    collect_files(input, "feature", true)
}

/// Collect the files in `dir` whose extension is `extension` (any case).
///
/// Only the directory itself is listed unless `recursive` is set. Symlinks
/// are not followed, lock files starting with `~$` are skipped and the
/// result is sorted.
///
/// # Errors
///
/// Returns [`SheetError::Io`] when `dir` cannot be read.
pub fn collect_files(
    dir: &Path,
    extension: &str,
    recursive: bool,
) -> Result<Vec<PathBuf>, SheetError> {
    let mut walker = WalkDir::new(dir).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }
    let mut files = Vec::new();
    for next in walker {
        match next {
            Ok(entry) => files.extend(matching_path(entry, extension)),
            Err(err) => {
                if let Some(err) = convert_walkdir_error(dir, err) {
                    return Err(err);
                }
            }
        }
    }
    files.sort();
    debug!(count = files.len(), dir = %dir.display(), extension, "discovered files");
    Ok(files)
}

/// Read and parse one feature file.
///
/// # Errors
///
/// Returns [`SheetError::Io`] when the file cannot be read as UTF-8 text.
pub fn read_feature(path: &Path) -> Result<ParsedFeature, SheetError> {
    let source = std::fs::read_to_string(path).map_err(|source| SheetError::io(path, source))?;
    let parsed = parse_feature(&source).with_file(path);
    for diagnostic in &parsed.diagnostics {
        debug!(file = %path.display(), %diagnostic, "parse diagnostic");
    }
    Ok(parsed)
}

/// Build one sheet per feature file, named after the file stem.
///
/// # Errors
///
/// Returns [`SheetError::Io`] when a file cannot be read.
pub fn build_sheets(files: &[PathBuf]) -> Result<Vec<Sheet>, SheetError> {
    named_rows(files, feature_rows)
        .map(|sheets| {
            sheets
                .into_iter()
                .map(|(name, rows)| Sheet { name, rows })
                .collect()
        })
}

/// Build one API sheet per feature file, named like [`build_sheets`] does.
///
/// # Errors
///
/// Returns [`SheetError::Io`] when a file cannot be read.
pub fn build_api_sheets(files: &[PathBuf]) -> Result<Vec<ApiSheet>, SheetError> {
    named_rows(files, api_feature_rows)
        .map(|sheets| {
            sheets
                .into_iter()
                .map(|(name, rows)| ApiSheet { name, rows })
                .collect()
        })
}

fn named_rows<T>(
    files: &[PathBuf],
    rows_of: fn(&[Scenario]) -> Vec<T>,
) -> Result<Vec<(String, Vec<T>)>, SheetError> {
    let mut namer = SheetNamer::new();
    files
        .iter()
        .map(|path| {
            let parsed = read_feature(path)?;
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let name = namer.assign(&stem);
            let rows = rows_of(&parsed.scenarios);
            info!(
                file = %path.display(),
                sheet = %name,
                rows = rows.len(),
                "built sheet"
            );
            Ok((name, rows))
        })
        .collect()
}
