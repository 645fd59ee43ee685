//! Inline image painting via the iTerm2 escape protocol, plus path display.

use crate::error::Result;
use crate::layout::ImageDimensions;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::GenericImageView;
use std::io::{Cursor, Write};
use std::path::Path;

/// Images with a side above this are re-encoded smaller before transmission
/// to keep the escape payload reasonable. Layout scaling is never applied
/// here; the terminal scales to the requested column width.
const MAX_ENCODE_DIM: u32 = 4000;

/// Reads an image's native pixel dimensions from its header without
/// decoding the pixel data. Done once per image per session.
pub fn read_dimensions(path: &Path) -> Result<ImageDimensions> {
    let (pixel_width, pixel_height) = image::image_dimensions(path)?;
    Ok(ImageDimensions {
        pixel_width,
        pixel_height,
    })
}

/// Paints `path` inline at `width_cols` character columns.
///
/// The image is PNG-encoded and base64-wrapped into an iTerm2
/// `OSC 1337 File` sequence with `width=<N>c`; the terminal performs the
/// final scaling while preserving aspect ratio, so the geometry computed by
/// the layout engine is applied exactly once.
pub fn display_inline(out: &mut impl Write, path: &Path, width_cols: u16) -> Result<()> {
    let img = image::open(path)?;
    let (w, h) = img.dimensions();

    let img = if w > MAX_ENCODE_DIM || h > MAX_ENCODE_DIM {
        let scale = MAX_ENCODE_DIM as f32 / w.max(h) as f32;
        img.resize_exact(
            (w as f32 * scale) as u32,
            (h as f32 * scale) as u32,
            image::imageops::FilterType::Lanczos3,
        )
    } else {
        img
    };

    let mut png_data = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)?;
    let encoded = STANDARD.encode(&png_data);

    writeln!(
        out,
        "\x1b]1337;File=name=image.png;size={};inline=1;width={}c;base64:{}\x07",
        encoded.len(),
        width_cols,
        encoded
    )?;
    Ok(())
}

/// Shortens a path for display, ellipsizing the middle when it does not fit.
/// Widths are measured in characters, so multibyte path names are cut on
/// character boundaries.
pub fn abbreviate_path(path: &Path, max_width: usize) -> String {
    let path_str = path.to_string_lossy();
    let chars: Vec<char> = path_str.chars().collect();
    if chars.len() <= max_width {
        return path_str.into_owned();
    }

    let ellipsis = "...";
    let avail = max_width.saturating_sub(ellipsis.len());
    let start_len = (avail + 1) / 2;
    let end_len = avail / 2;

    let start: String = chars[..start_len].iter().collect();
    let end: String = chars[chars.len() - end_len..].iter().collect();

    format!("{}{}{}", start, ellipsis, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_test_png(dir: &TempDir, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.path().join(name);
        let img = image::RgbImage::from_pixel(w, h, image::Rgb([120, 90, 200]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = write_test_png(&dir, "small.png", 12, 7);

        let dims = read_dimensions(&path).unwrap();
        assert_eq!(dims.pixel_width, 12);
        assert_eq!(dims.pixel_height, 7);
    }

    #[test]
    fn test_read_dimensions_missing_file() {
        assert!(read_dimensions(Path::new("/nonexistent.png")).is_err());
    }

    #[test]
    fn test_display_inline_emits_escape_with_width() {
        let dir = TempDir::new().unwrap();
        let path = write_test_png(&dir, "tiny.png", 4, 4);

        let mut buf = Vec::new();
        display_inline(&mut buf, &path, 37).unwrap();

        let text = String::from_utf8_lossy(&buf);
        assert!(text.starts_with("\x1b]1337;File="));
        assert!(text.contains("inline=1"));
        assert!(text.contains("width=37c"));
        assert!(text.contains("base64:"));
        assert!(text.contains('\x07'));
    }

    #[test]
    fn test_abbreviate_short_path_unchanged() {
        let p = Path::new("/pics/cat.png");
        assert_eq!(abbreviate_path(p, 40), "/pics/cat.png");
    }

    #[test]
    fn test_abbreviate_multibyte_path() {
        let p = Path::new("/ффффффффф.png");
        let abbrev = abbreviate_path(p, 11);

        assert_eq!(abbrev.chars().count(), 11);
        assert!(abbrev.contains("..."));
        assert!(abbrev.starts_with("/ффф"));
        assert!(abbrev.ends_with(".png"));
    }

    #[test]
    fn test_abbreviate_cjk_path_does_not_split_characters() {
        let p = Path::new("/写真/家族旅行/夏休みの思い出/浜辺.png");
        let abbrev = abbreviate_path(p, 12);

        assert_eq!(abbrev.chars().count(), 12);
        assert!(abbrev.contains("..."));
    }

    #[test]
    fn test_abbreviate_long_path_ellipsized() {
        let p = Path::new("/very/long/directory/structure/holding/holiday-photos/beach.png");
        let abbrev = abbreviate_path(p, 30);

        assert!(abbrev.len() <= 30);
        assert!(abbrev.contains("..."));
        assert!(abbrev.starts_with("/very"));
        assert!(abbrev.ends_with("beach.png"));
    }
}
