#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level provisioning: map files, procedural grids and the boundary trigger
//! that asks for a fresh level.

pub mod directory;
pub mod parse;
pub mod procedural;

use std::{io, path::PathBuf};

use open_world_core::{Collidable, Footprint, GridMap, GridMapError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use directory::{load_map, MapDirectory};
pub use parse::{parse_map, MapParseError};
pub use procedural::ProceduralGenerator;

/// Failures raised while providing a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The map directory is missing, unreadable or holds no candidates.
    #[error("no `.{extension}` maps available in {}", directory.display())]
    ResourceNotFound {
        /// Directory that was scanned.
        directory: PathBuf,
        /// Extension that candidates must carry.
        extension: String,
        /// Underlying I/O failure, if any.
        #[source]
        source: Option<io::Error>,
    },
    /// A chosen map file could not be read or parsed.
    #[error("map file {} is unusable", path.display())]
    ResourceParseError {
        /// File that was chosen.
        path: PathBuf,
        /// Why it was rejected.
        #[source]
        source: ResourceFault,
    },
    /// Procedural generation parameters can never yield a valid map.
    #[error("procedural generation cannot succeed: {reason}")]
    UnsatisfiableGeneration {
        /// Human readable explanation.
        reason: String,
    },
    /// A generated grid failed structural validation.
    #[error(transparent)]
    InvalidMap(#[from] GridMapError),
}

/// Cause of a [`LevelError::ResourceParseError`].
#[derive(Debug, Error)]
pub enum ResourceFault {
    /// Reading the file failed.
    #[error("could not read file")]
    Read(#[source] io::Error),
    /// The file content is not a valid map.
    #[error(transparent)]
    Malformed(#[from] MapParseError),
}

/// Where new levels come from.
#[derive(Clone, Debug)]
pub enum LevelSource {
    /// Random choice among files in a directory.
    Directory(MapDirectory),
    /// Freshly generated grids.
    Procedural(ProceduralGenerator),
}

/// Level source paired with the random generator that drives it.
#[derive(Debug)]
pub struct Levels {
    source: LevelSource,
    rng: ChaCha8Rng,
}

impl Levels {
    /// Creates a provider; without a seed one is drawn from the thread RNG.
    #[must_use]
    pub fn new(source: LevelSource, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        tracing::debug!(seed, "seeding level provider");
        Self {
            source,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Source that new levels are drawn from.
    #[must_use]
    pub fn source(&self) -> &LevelSource {
        &self.source
    }

    /// Produces the next map.
    pub fn next_map(&mut self) -> Result<GridMap, LevelError> {
        match &self.source {
            LevelSource::Directory(directory) => directory.load_random(&mut self.rng),
            LevelSource::Procedural(generator) => generator.generate(&mut self.rng),
        }
    }
}

/// Returns `true` once the player's footprint is no longer fully inside
/// the level bounds. Touching the boundary edge does not count.
pub fn crossed_boundary<P: Collidable + ?Sized>(player: &P, bounds: &Footprint) -> bool {
    !bounds.contains(&player.footprint())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use open_world_core::TileCoord;

    #[test]
    fn footprint_on_the_edge_stays_inside() {
        let bounds = Footprint::new(Vec2::ZERO, Vec2::new(96.0, 64.0));

        assert!(!crossed_boundary(
            &Footprint::tile(Vec2::new(64.0, 32.0), 32.0),
            &bounds
        ));
        assert!(crossed_boundary(
            &Footprint::tile(Vec2::new(64.5, 32.0), 32.0),
            &bounds
        ));
        assert!(crossed_boundary(
            &Footprint::tile(Vec2::new(0.0, -0.5), 32.0),
            &bounds
        ));
    }

    #[test]
    fn seeded_levels_are_reproducible() {
        let source = LevelSource::Procedural(
            ProceduralGenerator::new(TileCoord::new(8), TileCoord::new(6), 0.2, 5)
                .expect("satisfiable"),
        );
        let mut first = Levels::new(source.clone(), Some(7));
        let mut second = Levels::new(source, Some(7));

        for _ in 0..5 {
            assert_eq!(
                first.next_map().expect("map"),
                second.next_map().expect("map")
            );
        }
    }
}
