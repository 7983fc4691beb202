//! Render the gateway's QR login image as terminal text.
//!
//! The PNG is scaled to 40×40 with nearest-neighbour sampling, the one-pixel
//! quiet border is cropped off (38×38 left), and each pixel becomes two
//! characters: `██` for dark, two spaces for light. A pixel is dark when
//! R+G+B < 384, i.e. its average channel value is below 128.

use crate::error::{NcmApiError, Result};
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use image::RgbaImage;
use image::imageops::{self, FilterType};

const SCALED: u32 = 40;
const BORDER: u32 = 1;
const SIDE: u32 = SCALED - 2 * BORDER;
const DARK: &str = "██";
const LIGHT: &str = "  ";

/// Render a `data:image/png;base64,...` URL. A bare base64 string (no
/// comma) is accepted as well.
pub fn render_data_url(data_url: &str) -> Result<String> {
    let payload = data_url.split_once(',').map_or(data_url, |(_, b64)| b64);
    let bytes = B64.decode(payload.trim())?;
    render_png(&bytes)
}

/// Render encoded image bytes (any format the `png` decoder accepts).
pub fn render_png(bytes: &[u8]) -> Result<String> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(NcmApiError::QrImage("empty image".into()));
    }
    Ok(render_rgba(&img))
}

fn render_rgba(img: &RgbaImage) -> String {
    let scaled = imageops::resize(img, SCALED, SCALED, FilterType::Nearest);
    let inner = imageops::crop_imm(&scaled, BORDER, BORDER, SIDE, SIDE).to_image();

    let mut out = String::new();
    for y in 0..SIDE {
        for x in 0..SIDE {
            let [r, g, b, _] = inner.get_pixel(x, y).0;
            let sum = u32::from(r) + u32::from(g) + u32::from(b);
            out.push_str(if sum < 384 { DARK } else { LIGHT });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    // Left half black, right half white, 80x80.
    fn half_and_half() -> RgbaImage {
        RgbaImage::from_fn(80, 80, |x, _| {
            if x < 40 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn renders_38_rows_of_38_cells() {
        let art = render_png(&png_bytes(&half_and_half())).unwrap();
        let rows: Vec<&str> = art.lines().collect();
        assert_eq!(rows.len(), 38);
        for row in rows {
            assert_eq!(row.chars().count(), 76);
        }
    }

    #[test]
    fn dark_left_light_right() {
        let art = render_png(&png_bytes(&half_and_half())).unwrap();
        let first = art.lines().next().unwrap();
        assert!(first.starts_with(DARK));
        assert!(first.ends_with(LIGHT));
    }

    #[test]
    fn border_pixel_is_cropped() {
        // Already 40x40, so scaling is the identity: only column 0 is dark.
        let img = RgbaImage::from_fn(40, 40, |x, _| {
            if x == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let art = render_png(&png_bytes(&img)).unwrap();
        assert!(!art.contains('█'));
    }

    #[test]
    fn threshold_is_channel_sum_384() {
        let dark = RgbaImage::from_pixel(40, 40, Rgba([127, 128, 128, 255]));
        let light = RgbaImage::from_pixel(40, 40, Rgba([128, 128, 128, 255]));
        assert!(render_rgba(&dark).lines().all(|l| l == DARK.repeat(38)));
        assert!(render_rgba(&light).lines().all(|l| l == LIGHT.repeat(38)));
    }

    #[test]
    fn accepts_data_url() {
        let url = format!("data:image/png;base64,{}", B64.encode(png_bytes(&half_and_half())));
        let from_url = render_data_url(&url).unwrap();
        let from_bytes = render_png(&png_bytes(&half_and_half())).unwrap();
        assert_eq!(from_url, from_bytes);
    }

    #[test]
    fn garbage_is_qr_image_error() {
        assert!(matches!(render_data_url("data:image/png;base64,!!!"), Err(NcmApiError::QrImage(_))));
        let not_png = B64.encode(b"not an image");
        assert!(matches!(render_data_url(&not_png), Err(NcmApiError::QrImage(_))));
    }
}
