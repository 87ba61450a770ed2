use std::path::Path;

use df_core::ClientError;
use df_render::{ImageId, TextureRegistry};

/// Handles to every image the game draws. Built once before the world starts.
#[derive(Debug, Clone, Copy)]
pub struct GameAssets {
    pub player_sprite: ImageId,
}

/// Decodes an image file into an egui-ready RGBA image.
pub fn load_color_image(path: &Path) -> Result<egui::ColorImage, ClientError> {
    let asset_error = |reason: String| ClientError::AssetLoad {
        path: path.display().to_string(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| asset_error(e.to_string()))?;
    let decoded = image::load_from_memory(&bytes).map_err(|e| asset_error(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

pub fn load_game_assets(
    ctx: &egui::Context,
    textures: &mut TextureRegistry,
    player_sprite: &str,
) -> Result<GameAssets, ClientError> {
    let image = load_color_image(Path::new(player_sprite))?;
    log::info!(
        "Loaded '{}' ({}x{})",
        player_sprite,
        image.size[0],
        image.size[1]
    );
    let player_sprite = textures.register(ctx, player_sprite, image);
    Ok(GameAssets { player_sprite })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_png_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "df_assets_test_{}_{}_{}.png",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn missing_file_is_an_asset_error_naming_the_path() {
        let err = load_color_image(Path::new("assets/does/not/exist.png"))
            .expect_err("missing file should fail");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("assets/does/not/exist.png"));
    }

    #[test]
    fn png_decodes_to_its_dimensions() {
        let path = temp_png_path("decode");
        let img = image::RgbaImage::from_pixel(4, 6, image::Rgba([10, 20, 30, 255]));
        img.save(&path).expect("failed to write temp png");

        let decoded = load_color_image(&path).expect("png should decode");
        assert_eq!(decoded.size, [4, 6]);
        assert_eq!(decoded.pixels[0], egui::Color32::from_rgb(10, 20, 30));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let path = temp_png_path("garbage");
        std::fs::write(&path, b"not a png").expect("failed to write temp file");
        let err = load_color_image(&path).expect_err("garbage should fail");
        assert!(matches!(err, ClientError::AssetLoad { .. }));
        let _ = std::fs::remove_file(path);
    }
}
