use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::MOVIE_EXTENSIONS;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot open movie path {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Names of the playable movies in `dir`, sorted by name.
///
/// A name qualifies when it has a non-empty stem and ends in one of
/// [`MOVIE_EXTENSIONS`]. Directories and names that are not valid UTF-8
/// are ignored.
pub fn scan(dir: &Path) -> Result<Vec<String>, CatalogError> {
    let read_dir = fs::read_dir(dir).map_err(|e| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut names: Vec<String> = read_dir
        .flatten()
        .filter(|entry| entry.file_type().map_or(false, |t| !t.is_dir()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| is_movie(name))
        .collect();
    names.sort();
    Ok(names)
}

fn is_movie(name: &str) -> bool {
    MOVIE_EXTENSIONS.iter().any(|ext| {
        name.strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(|stem| !stem.is_empty())
    })
}
