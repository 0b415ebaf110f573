use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use macroquad::{
    color::WHITE,
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, FilterMode, Texture2D},
};
use open_world_core::Footprint;
use open_world_rendering::SpriteKey;
use serde::Deserialize;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Textures named by the sprite manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    player: Texture2D,
}

impl SpriteAtlas {
    /// Reads the manifest at `manifest_path` and loads every sprite it names.
    pub(crate) fn load(manifest_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
        let paths = parse_manifest(&contents, base)?;

        Ok(Self {
            player: load_texture(&paths.player)?,
        })
    }

    /// Stretches the requested sprite over `footprint`.
    pub(crate) fn draw(&self, key: SpriteKey, footprint: Footprint) {
        let texture = match key {
            SpriteKey::Player => self.player,
        };
        let origin = footprint.origin();
        let size = footprint.size();

        texture::draw_texture_ex(
            texture,
            origin.x,
            origin.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(MacroquadVec2::new(size.x, size.y)),
                ..DrawTextureParams::default()
            },
        );
    }
}

fn load_texture(path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let texture = Texture2D::from_file_with_format(&bytes, None);
    texture.set_filter(FilterMode::Nearest);
    tracing::debug!(path = %path.display(), "loaded sprite");
    Ok(texture)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    sprites: SpritePaths,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpritePaths {
    player: PathBuf,
}

/// Resolves sprite paths against `base`, the manifest's directory.
fn parse_manifest(contents: &str, base: &Path) -> Result<SpritePaths> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }
    Ok(SpritePaths {
        player: base.join(manifest.sprites.player),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_resolves_player_relative_to_base_directory() {
        let manifest = r#"
            version = 1

            [sprites]
            player = "ethan.png"
        "#;

        let parsed = parse_manifest(manifest, Path::new("assets")).expect("manifest should parse");

        assert_eq!(
            parsed,
            SpritePaths {
                player: PathBuf::from("assets/ethan.png")
            }
        );
    }

    #[test]
    fn manifest_requires_player_entry() {
        let manifest = r#"
            version = 1

            [sprites]
        "#;

        assert!(parse_manifest(manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_rejects_unknown_keys_and_versions() {
        let unknown = r#"
            version = 1

            [sprites]
            player = "ethan.png"
            enemy = "enemy.png"
        "#;
        let future = r#"
            version = 2

            [sprites]
            player = "ethan.png"
        "#;

        assert!(parse_manifest(unknown, Path::new(".")).is_err());
        let error = parse_manifest(future, Path::new(".")).expect_err("version 2");
        assert!(error.to_string().contains("unsupported sprite manifest version 2"));
    }

    #[test]
    fn missing_manifest_reports_path() {
        let error =
            SpriteAtlas::load(Path::new("does/not/exist.toml")).expect_err("manifest is absent");

        assert!(error.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn missing_sprite_asset_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = dir.path().join("sprites.toml");
        fs::write(&manifest, "version = 1\n[sprites]\nplayer = \"absent.png\"\n")
            .expect("write manifest");

        let error = SpriteAtlas::load(&manifest).expect_err("asset is absent");

        assert!(error.to_string().contains("absent.png"));
    }
}
