use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::{combination::Combination, Result};

/// One raw result file of a (dataset, combination) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFile {
    pub split: u32,
    pub path: PathBuf,
}

/// Finds `<dataset>_<split>_<token>.csv` files directly under `dir`, ordered by split.
pub fn find_split_files(
    dir: &Path,
    dataset: &str,
    combination: &Combination,
) -> Result<Vec<SplitFile>> {
    let prefix = format!("{dataset}_");
    let suffix = format!("_{}.csv", combination.token());
    let pattern = format!(
        "{}/{}*{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(&prefix),
        Pattern::escape(&suffix),
    );

    let mut files = Vec::new();
    for path in glob(&pattern)? {
        let path = path?;
        if !path.is_file() {
            continue;
        }
        let split = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| extract_split(name, &prefix, &suffix));
        if let Some(split) = split {
            files.push(SplitFile { split, path });
        }
    }
    files.sort_by_key(|f| f.split);
    Ok(files)
}

fn extract_split(filename: &str, prefix: &str, suffix: &str) -> Option<u32> {
    let split = filename.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if split.is_empty() || !split.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    split.parse::<u32>().ok()
}
