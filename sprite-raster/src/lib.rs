//! Sprite re-rasterization for the card export.
//!
//! Remote sprites are fetched as raw bytes, redrawn onto a square pixmap at
//! the export size and re-encoded as PNG so the rasterizer only ever sees
//! same-origin `data:` URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use png::{BitDepth, ColorType, Encoder};
use thiserror::Error;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("decode: {0}")]
    Decode(String),
    #[error("target size must be positive")]
    EmptyTarget,
    #[error("pixmap alloc failed ({0}x{1})")]
    Alloc(u32, u32),
    #[error("encode: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Resampling used when scaling a sprite up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScaleFilter {
    /// Hard pixel edges, for pixel-art sprites.
    #[default]
    Nearest,
    /// Bicubic, for painted artwork.
    Smooth,
}

impl ScaleFilter {
    fn quality(self) -> FilterQuality {
        match self {
            ScaleFilter::Nearest => FilterQuality::Nearest,
            ScaleFilter::Smooth => FilterQuality::Bicubic,
        }
    }
}

pub fn decode(bytes: &[u8]) -> Result<Pixmap, RasterError> {
    Pixmap::decode_png(bytes).map_err(|e| RasterError::Decode(e.to_string()))
}

/// Draw `src` centered on a `target`x`target` transparent square, scaled to
/// fit without changing its aspect ratio.
pub fn scale_to_square(
    src: &Pixmap,
    target: u32,
    filter: ScaleFilter,
) -> Result<Pixmap, RasterError> {
    if target == 0 {
        return Err(RasterError::EmptyTarget);
    }
    let mut dst = Pixmap::new(target, target).ok_or(RasterError::Alloc(target, target))?;
    let (w, h) = (src.width() as f32, src.height() as f32);
    let side = target as f32;
    let scale = (side / w).min(side / h);
    let dx = (side - w * scale) / 2.0;
    let dy = (side - h * scale) / 2.0;
    let paint = PixmapPaint {
        quality: filter.quality(),
        ..PixmapPaint::default()
    };
    let ts = Transform::from_scale(scale, scale).post_translate(dx, dy);
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, ts, None);
    Ok(dst)
}

// RGBA -> PNG bytes, deterministic for the same input
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RasterError> {
    // pixmap storage is premultiplied, PNG wants straight alpha
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, pixmap.width(), pixmap.height());
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        let mut writer = enc.write_header()?;
        writer.write_image_data(&rgba)?;
    }
    Ok(buf)
}

/// Decode a sprite, redraw it at `target` px and return PNG bytes.
pub fn upscale_sprite(
    bytes: &[u8],
    target: u32,
    filter: ScaleFilter,
) -> Result<Vec<u8>, RasterError> {
    let src = decode(bytes)?;
    debug!(
        "sprite-raster: {}x{} -> {target}x{target} ({filter:?})",
        src.width(),
        src.height()
    );
    let scaled = scale_to_square(&src, target, filter)?;
    encode_png(&scaled)
}

/// Decode and re-encode at natural size.
pub fn reencode(bytes: &[u8]) -> Result<Vec<u8>, RasterError> {
    encode_png(&decode(bytes)?)
}

pub fn png_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(png))
}

/// Payload of a base64 PNG data URL; `None` for anything else.
pub fn decode_png_data_url(url: &str) -> Option<Vec<u8>> {
    let payload = url.strip_prefix(PNG_DATA_URL_PREFIX)?;
    BASE64.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn checker_2x2() -> Pixmap {
        let mut pm = Pixmap::new(2, 2).unwrap();
        pm.fill(Color::from_rgba8(255, 0, 0, 255));
        let blue = Color::from_rgba8(0, 0, 255, 255).premultiply().to_color_u8();
        pm.pixels_mut()[1] = blue;
        pm.pixels_mut()[2] = blue;
        pm
    }

    fn rgba_at(pm: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pm.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn png_round_trip_keeps_pixels() {
        let png = encode_png(&checker_2x2()).unwrap();
        let back = decode(&png).unwrap();
        assert_eq!((back.width(), back.height()), (2, 2));
        assert_eq!(rgba_at(&back, 0, 0), RED);
        assert_eq!(rgba_at(&back, 1, 0), BLUE);
    }

    #[test]
    fn nearest_upscale_keeps_hard_edges() {
        let png = encode_png(&checker_2x2()).unwrap();
        let out = decode(&upscale_sprite(&png, 8, ScaleFilter::Nearest).unwrap()).unwrap();
        assert_eq!((out.width(), out.height()), (8, 8));
        assert_eq!(rgba_at(&out, 0, 0), RED);
        assert_eq!(rgba_at(&out, 2, 1), RED);
        assert_eq!(rgba_at(&out, 6, 1), BLUE);
        assert_eq!(rgba_at(&out, 1, 6), BLUE);
        assert_eq!(rgba_at(&out, 7, 7), RED);
    }

    #[test]
    fn smooth_upscale_produces_target_size() {
        let png = encode_png(&checker_2x2()).unwrap();
        let out = decode(&upscale_sprite(&png, 16, ScaleFilter::Smooth).unwrap()).unwrap();
        assert_eq!((out.width(), out.height()), (16, 16));
    }

    #[test]
    fn wide_sprite_is_letterboxed() {
        let mut wide = Pixmap::new(2, 1).unwrap();
        wide.fill(Color::from_rgba8(255, 0, 0, 255));
        let out = scale_to_square(&wide, 4, ScaleFilter::Nearest).unwrap();
        assert_eq!(rgba_at(&out, 0, 0)[3], 0);
        assert_eq!(rgba_at(&out, 1, 1), RED);
        assert_eq!(rgba_at(&out, 2, 2), RED);
        assert_eq!(rgba_at(&out, 3, 3)[3], 0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let png = encode_png(&checker_2x2()).unwrap();
        let a = upscale_sprite(&png, 12, ScaleFilter::Nearest).unwrap();
        let b = upscale_sprite(&png, 12, ScaleFilter::Nearest).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(
            upscale_sprite(b"<html>", 10, ScaleFilter::Nearest),
            Err(RasterError::Decode(_))
        ));
        let png = encode_png(&checker_2x2()).unwrap();
        assert!(matches!(
            upscale_sprite(&png, 0, ScaleFilter::Smooth),
            Err(RasterError::EmptyTarget)
        ));
    }

    #[test]
    fn data_url_round_trip() {
        let png = reencode(&encode_png(&checker_2x2()).unwrap()).unwrap();
        let url = png_data_url(&png);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_png_data_url(&url), Some(png));
        assert_eq!(decode_png_data_url("https://img/1.png"), None);
    }
}
