//! Source file discovery and output naming

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Output file name used when none is given
pub const DEFAULT_OUTPUT_NAME: &str = "merged_pdfs.pdf";

/// List the PDF files directly inside `dir`, sorted by file name
///
/// Matching on the `.pdf` extension is case-insensitive. Earlier merge outputs
/// (the `output_name` family and the default `merged_pdfs*` family) are left
/// out so a re-run never merges its own previous result.
pub fn find_pdfs(dir: &Path, output_name: &str) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join("*.pdf");
    let pattern = pattern.to_string_lossy();

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut paths = Vec::new();
    for entry in glob_with(&pattern, options).map_err(|e| Error::InvalidGlob(e.to_string()))? {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                if is_previous_output(&name, output_name) {
                    debug!(file = %name, "skipping previous merge output");
                    continue;
                }
                paths.push(path);
            }
            Err(e) => warn!("cannot read directory entry: {}", e),
        }
    }

    // Byte-wise file name order keeps runs reproducible across platforms
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths)
}

/// Whether `file_name` looks like an output of an earlier merge
///
/// Names are compared with ASCII case folded, matching the case-insensitive
/// `*.pdf` discovery.
pub fn is_previous_output(file_name: &str, output_name: &str) -> bool {
    let file_name = file_name.to_ascii_lowercase();
    let default_stem = file_stem(DEFAULT_OUTPUT_NAME);
    if file_name.starts_with(&default_stem) {
        return true;
    }

    let output_name = ensure_pdf_extension(output_name).to_ascii_lowercase();
    let output_file = Path::new(&output_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(output_name.clone());
    if file_name == output_file {
        return true;
    }

    // "<stem>_<n>.pdf", as produced by unique_output_path
    let stem = file_stem(&output_file);
    let candidate = file_stem(&file_name);
    candidate
        .strip_prefix(&stem)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn file_stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Append `.pdf` unless the name already ends with it (in any case)
pub fn ensure_pdf_extension(name: &str) -> String {
    let has_pdf = Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if has_pdf {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// Pick an output path inside `dir` that does not exist yet
///
/// `report.pdf` becomes `report_1.pdf`, `report_2.pdf`, ... when taken.
pub fn unique_output_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    let parent = candidate.parent().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());

    let mut counter = 1;
    loop {
        let next = parent.join(format!("{}_{}{}", stem, counter, ext));
        if !next.exists() {
            return next;
        }
        counter += 1;
    }
}

/// TOC title for a source file: its name without the extension
pub fn display_title(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    if stem.is_empty() {
        path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    } else {
        stem
    }
}

/// Make display titles unique by numbering repeats: "notes", "notes (2)", ...
pub fn dedupe_titles(titles: &mut [String]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for title in titles.iter_mut() {
        let count = seen.entry(title.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            *title = format!("{} ({})", title, count);
        }
    }
}
