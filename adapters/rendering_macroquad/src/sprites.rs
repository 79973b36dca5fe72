use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use crossroads_rendering::SpriteKey;
use glam::Vec2;
use log::warn;
use macroquad::{
    color::WHITE,
    math::Vec2 as MacroquadVec2,
    texture::{self, DrawTextureParams, Texture2D},
};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Cache of textures loaded from the sprite manifest.
#[derive(Debug)]
pub struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    ///
    /// Manifest problems are errors. An individual image that fails to load
    /// is logged and left out, so only that sprite falls back to a rectangle.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Draws the sprite stretched over the given rectangle.
    ///
    /// Returns `false` without drawing when the atlas has no texture for `key`.
    #[must_use]
    pub fn draw(&self, key: SpriteKey, origin: Vec2, size: Vec2) -> bool {
        let Some(texture) = self.texture(key) else {
            return false;
        };

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
        true
    }

    /// Returns whether the atlas contains the provided key.
    #[must_use]
    pub fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    /// Returns the number of textures stored in the atlas.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Retrieves the texture associated with the provided key.
    #[must_use]
    pub fn texture(&self, key: SpriteKey) -> Option<Texture2D> {
        self.textures.get(&key).copied()
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Ok(Self::from_entries(entries, &mut loader))
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Self {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            match loader(key, &path) {
                Ok(texture) => {
                    let _ = textures.insert(key, texture);
                }
                Err(error) => {
                    warn!(
                        "sprite {key} unavailable, drawing a rectangle instead: {error:#} ({})",
                        path.display()
                    );
                }
            }
        }
        Self { textures }
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let image = decode_image(path)?;
    Ok(Texture2D::from_rgba8(image.width, image.height, &image.rgba))
}

#[derive(Debug)]
struct DecodedImage {
    width: u16,
    height: u16,
    rgba: Vec<u8>,
}

/// Decodes an image file without touching the GPU.
///
/// Undecodable bytes are an error here, unlike in
/// `Texture2D::from_file_with_format`, which panics on them.
fn decode_image(path: &Path) -> Result<DecodedImage> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    let rgba = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode sprite asset at {}", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let (Ok(width), Ok(height)) = (u16::try_from(width), u16::try_from(height)) else {
        bail!(
            "sprite asset at {} is {width}x{height}, larger than a texture allows",
            path.display()
        );
    };
    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key: SpriteKey = name
            .parse()
            .with_context(|| format!("invalid entry `{name}` in sprite manifest"))?;
        let path = base_path.join(relative_path);
        if resolved.insert(key, path).is_some() {
            bail!("sprite manifest contains duplicate entry for {key}");
        }
    }

    let mut ordered = Vec::with_capacity(SpriteKey::ALL.len());
    for key in SpriteKey::ALL {
        let Some(path) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for {key}");
        };
        ordered.push((key, path));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const FULL_MANIFEST: &str = r#"
        version = 1

        [sprites]
        Background = "round1bg.png"
        AiDown = "aicardown.png"
        AiUp = "aicarup.png"
        AiRight = "aicarright.png"
        AiLeft = "aicarleft.png"
        PlayerDown = "cardown.png"
        PlayerUp = "carup.png"
        PlayerRight = "carright.png"
        PlayerLeft = "carleft.png"
    "#;

    #[test]
    fn parse_manifest_requires_all_known_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            PlayerLeft = "carleft.png"
            Background = "round1bg.png"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "manifest missing car sprites should fail");
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = FULL_MANIFEST.replace("[sprites]", "[sprites]\nTruck = \"truck.png\"");

        let result = parse_manifest(&manifest, Path::new("assets"));
        assert!(result.is_err(), "unknown keys must be rejected");
    }

    #[test]
    fn manifest_rejects_unsupported_version() {
        let manifest = FULL_MANIFEST.replace("version = 1", "version = 2");

        assert!(parse_manifest(&manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let parsed =
            parse_manifest(FULL_MANIFEST, Path::new("root")).expect("manifest should parse");

        assert_eq!(parsed.len(), SpriteKey::ALL.len());
        assert_eq!(
            parsed[0],
            (SpriteKey::PlayerLeft, PathBuf::from("root/carleft.png"))
        );
        assert_eq!(
            parsed[8],
            (SpriteKey::Background, PathBuf::from("root/round1bg.png"))
        );
    }

    #[test]
    fn atlas_loads_textures_using_deterministic_order() {
        let entries = parse_manifest(FULL_MANIFEST, Path::new("assets"))
            .expect("manifest should parse into canonical order");
        let load_order = RefCell::new(Vec::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |key, _| {
            load_order.borrow_mut().push(key);
            Ok(Texture2D::empty())
        });

        assert_eq!(load_order.borrow().as_slice(), &SpriteKey::ALL);
        assert_eq!(atlas.texture_count(), SpriteKey::ALL.len());
    }

    #[test]
    fn failed_texture_is_skipped_without_dropping_the_rest() {
        let entries =
            parse_manifest(FULL_MANIFEST, Path::new("assets")).expect("valid manifest");
        let load_counts = RefCell::new(HashMap::new());
        let atlas = SpriteAtlas::from_entries(entries, &mut |key, _| {
            *load_counts.borrow_mut().entry(key).or_insert(0) += 1;
            if key == SpriteKey::AiUp {
                bail!("corrupt image");
            }
            Ok(Texture2D::empty())
        });

        assert!(!atlas.contains(SpriteKey::AiUp));
        assert!(atlas.texture(SpriteKey::AiUp).is_none());
        assert_eq!(atlas.texture_count(), SpriteKey::ALL.len() - 1);
        for key in SpriteKey::ALL {
            assert_eq!(
                load_counts.borrow().get(&key),
                Some(&1),
                "loader should be invoked exactly once per key"
            );
        }
    }

    #[test]
    fn shipped_manifest_is_complete() {
        let shipped = include_str!("../../../assets/manifest.toml");

        let parsed =
            parse_manifest(shipped, Path::new("assets")).expect("shipped manifest parses");
        assert_eq!(parsed.len(), SpriteKey::ALL.len());
    }

    #[test]
    fn undecodable_sprite_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sprite = dir.path().join("carleft.png");
        fs::write(&sprite, b"not really a png").expect("write sprite");

        let result = default_loader(SpriteKey::PlayerLeft, &sprite);

        let error = result.expect_err("corrupt sprite must not load");
        assert!(format!("{error:#}").contains("failed to decode sprite asset"));
    }

    #[test]
    fn missing_sprite_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");

        assert!(decode_image(&dir.path().join("carup.png")).is_err());
    }

    #[test]
    fn valid_png_decodes_to_rgba_pixels() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sprite = dir.path().join("aicarup.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .save(&sprite)
            .expect("write png");

        let decoded = decode_image(&sprite).expect("png decodes");

        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let result = SpriteAtlas::from_manifest_with_loader(
            "does/not/exist/manifest.toml",
            |_, _| Ok(Texture2D::empty()),
        );

        assert!(result.is_err());
    }
}
