//! Map files stored in a single directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use open_world_core::GridMap;
use rand::{seq::SliceRandom, Rng};

use crate::{parse::parse_map, LevelError, ResourceFault};

/// Directory holding text maps that share a file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDirectory {
    directory: PathBuf,
    extension: String,
}

impl MapDirectory {
    /// Creates a directory source; `extension` is matched without its dot.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            directory: directory.into(),
            extension: extension.trim_start_matches('.').to_owned(),
        }
    }

    /// Directory that is scanned for maps.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Extension a file needs to be considered a map.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Lists every candidate map file in a stable sorted order.
    pub fn candidates(&self) -> Result<Vec<PathBuf>, LevelError> {
        let entries = fs::read_dir(&self.directory).map_err(|source| self.not_found(Some(source)))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| self.not_found(Some(source)))?;
            let path = entry.path();
            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension == self.extension.as_str())
            {
                candidates.push(path);
            }
        }

        if candidates.is_empty() {
            return Err(self.not_found(None));
        }
        candidates.sort();
        Ok(candidates)
    }

    /// Picks one candidate uniformly with `rng` and parses it.
    pub fn load_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GridMap, LevelError> {
        let candidates = self.candidates()?;
        let path = candidates
            .choose(rng)
            .ok_or_else(|| self.not_found(None))?;
        tracing::info!(path = %path.display(), candidates = candidates.len(), "loading map file");
        load_map(path)
    }

    fn not_found(&self, source: Option<std::io::Error>) -> LevelError {
        LevelError::ResourceNotFound {
            directory: self.directory.clone(),
            extension: self.extension.clone(),
            source,
        }
    }
}

/// Reads and parses a single map file.
pub fn load_map(path: &Path) -> Result<GridMap, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::ResourceParseError {
        path: path.to_owned(),
        source: ResourceFault::Read(source),
    })?;
    parse_map(&text).map_err(|source| LevelError::ResourceParseError {
        path: path.to_owned(),
        source: ResourceFault::Malformed(source),
    })
}
