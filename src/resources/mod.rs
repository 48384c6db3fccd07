//! Loading textures and the skybox cubemap from the asset directory.
//!
//! Assets are optional. A file that is missing or cannot be decoded is logged
//! and replaced by a solid colour so the viewer still starts.

pub mod texture;

use std::path::Path;

use anyhow::Context as _;

use crate::data_structures::texture::Texture;

/// Used for textures that could not be loaded.
pub const FALLBACK_COLOUR: [u8; 4] = [200, 200, 200, 255];
/// Used for cubemap faces that could not be loaded.
pub const FALLBACK_SKY: [u8; 4] = [40, 48, 64, 255];

pub async fn load_binary(assets: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = assets.join(file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}

pub async fn load_image(assets: &Path, file_name: &str) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(assets, file_name).await?;
    image::load_from_memory(&data).with_context(|| format!("cannot decode {file_name}"))
}

/// Load a 2D colour texture, falling back to a solid colour on failure.
pub async fn load_texture(
    assets: &Path,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    match load_image(assets, file_name).await {
        Ok(img) => Texture::from_image(device, queue, &img, file_name),
        Err(e) => {
            log::warn!("{e:#}; using a plain texture instead");
            Texture::solid_colour(device, queue, FALLBACK_COLOUR, file_name)
        }
    }
}

/// Load the six skybox faces (right, left, top, bottom, front, back) concurrently.
///
/// Any unreadable face, or faces of different sizes, give a plain sky.
pub async fn load_cubemap(
    assets: &Path,
    faces: &[String; 6],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let loaded =
        futures::future::try_join_all(faces.iter().map(|face| load_image(assets, face))).await;
    let cube = loaded.and_then(|images| {
        let images: [image::DynamicImage; 6] = images
            .try_into()
            .map_err(|_| anyhow::anyhow!("a cubemap needs exactly six faces"))?;
        Texture::cube_from_images(device, queue, &images, "skybox")
    });
    match cube {
        Ok(cube) => Ok(cube),
        Err(e) => {
            log::warn!("{e:#}; using a plain sky instead");
            let plain = plain_faces(FALLBACK_SKY);
            Texture::cube_from_images(device, queue, &plain, "skybox")
        }
    }
}

fn plain_faces(rgba: [u8; 4]) -> [image::DynamicImage; 6] {
    std::array::from_fn(|_| {
        image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba)))
    })
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;

    #[tokio::test]
    async fn missing_assets_are_reported_with_their_path() {
        let err = load_binary(Path::new("/nonexistent-assets"), "textures/map.jpg")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("textures/map.jpg"));
    }

    #[tokio::test]
    async fn undecodable_images_are_errors() {
        let dir = std::env::temp_dir().join("pick-viewer-resources-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("broken.png"), b"not a png").await.unwrap();
        assert!(load_image(&dir, "broken.png").await.is_err());
    }

    #[test]
    fn plain_faces_are_equal_single_texels() {
        let faces = plain_faces(FALLBACK_SKY);
        assert!(faces.iter().all(|face| face.dimensions() == (1, 1)));
    }
}
