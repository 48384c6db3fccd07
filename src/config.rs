//! Viewer configuration.
//!
//! Defaults describe the stock scene. [`ViewerConfig::from_env`] lets the asset
//! directory and the window size be overridden without recompiling:
//!
//! - `PICK_VIEWER_ASSETS=<dir>`
//! - `PICK_VIEWER_SIZE=<width>x<height>`

use std::path::PathBuf;

use anyhow::{Context as _, bail};

pub const ASSETS_ENV: &str = "PICK_VIEWER_ASSETS";
pub const SIZE_ENV: &str = "PICK_VIEWER_SIZE";

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub assets: PathBuf,
    pub earth_texture: String,
    pub box_texture: String,
    /// Right, left, top, bottom, front, back.
    pub skybox_faces: [String; 6],
    pub sphere_radius: f32,
    pub sphere_pick: [u8; 3],
    pub box_size: f32,
    pub box_pick: [u8; 3],
    pub skybox_size: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let face = |name: &str| format!("textures/LancellottiChapel/{name}.jpg");
        Self {
            title: "Pick Viewer".to_string(),
            width: 1920,
            height: 1080,
            assets: PathBuf::from("assets"),
            earth_texture: "textures/map.jpg".to_string(),
            box_texture: "textures/box.jpg".to_string(),
            skybox_faces: [
                face("right"),
                face("left"),
                face("top"),
                face("bottom"),
                face("front"),
                face("back"),
            ],
            sphere_radius: 1.0,
            sphere_pick: [255, 0, 0],
            box_size: 1.5,
            box_pick: [0, 255, 0],
            skybox_size: 20.0,
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ASSETS_ENV) {
            config.assets = PathBuf::from(dir);
        }
        if let Some(size) = lookup(SIZE_ENV) {
            let (width, height) =
                parse_size(&size).with_context(|| format!("invalid {SIZE_ENV}"))?;
            config.width = width;
            config.height = height;
        }
        Ok(config)
    }
}

/// Parse `<width>x<height>`, both positive.
pub fn parse_size(value: &str) -> anyhow::Result<(u32, u32)> {
    let Some((width, height)) = value.trim().split_once(['x', 'X']) else {
        bail!("expected <width>x<height>, got `{value}`");
    };
    let width: u32 = width.trim().parse().with_context(|| format!("bad width `{width}`"))?;
    let height: u32 = height
        .trim()
        .parse()
        .with_context(|| format!("bad height `{height}`"))?;
    if width == 0 || height == 0 {
        bail!("window size must be positive, got {width}x{height}");
    }
    Ok((width, height))
}
