//! Decode, nearest-neighbor resample and re-encode of texture pixels.

use std::ffi::OsStr;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageResult, RgbaImage};

use crate::error::Error;

/// Encoders available for compressed output, chosen by source extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Tga,
    /// OpenEXR, written as 32-bit float RGBA.
    Exr,
}

impl OutputFormat {
    /// Resolve the encoder for `path` from its lower-cased extension.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for any extension without an encoder.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "tga" => Ok(Self::Tga),
            "exr" => Ok(Self::Exr),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// The container the `image` crate writes for this output.
    #[must_use]
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Tga => ImageFormat::Tga,
            Self::Exr => ImageFormat::OpenExr,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tga => "tga",
            Self::Exr => "exr",
        })
    }
}

/// Decode any supported container into an RGBA8 buffer.
///
/// The container is sniffed from the bytes first; `hint` (usually taken from
/// the file extension) covers formats without magic bytes such as TGA.
/// HDR sources are quantized to 8 bits here; values above 1.0 clamp.
pub fn decode(bytes: &[u8], hint: Option<ImageFormat>) -> ImageResult<RgbaImage> {
    let image = match (image::guess_format(bytes), hint) {
        (Ok(format), _) | (Err(_), Some(format)) => {
            image::load_from_memory_with_format(bytes, format)?
        }
        (Err(err), None) => return Err(err),
    };
    Ok(image.to_rgba8())
}

/// Only images larger than `target` on both axes get resampled.
#[must_use]
pub const fn should_resample(width: u32, height: u32, target: u32) -> bool {
    width > target && height > target
}

/// Nearest-neighbor resample to exactly `target_w` x `target_h`.
///
/// Destination pixel `(x0, y0)` copies source pixel
/// `(floor(x0 / target_w * W), floor(y0 / target_h * H))`.
#[must_use]
pub fn resample_nearest(src: &RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    let (src_w, src_h) = src.dimensions();
    RgbaImage::from_fn(target_w, target_h, |x0, y0| {
        let x1 = nearest_index(x0, target_w, src_w);
        let y1 = nearest_index(y0, target_h, src_h);
        *src.get_pixel(x1, y1)
    })
}

fn nearest_index(dst: u32, dst_len: u32, src_len: u32) -> u32 {
    let normalized = dst as f32 / dst_len as f32;
    // clamp guards f32 rounding at the far edge
    ((normalized * src_len as f32) as u32).min(src_len.saturating_sub(1))
}

/// Encode `image` for `format`. JPEG drops alpha; EXR is widened to f32 from
/// the 8-bit buffer, so it carries no range beyond 0.0..=1.0.
pub fn encode(image: &RgbaImage, format: OutputFormat, jpeg_quality: u8) -> ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, jpeg_quality).encode_image(&rgb)?;
        }
        OutputFormat::Png | OutputFormat::Tga => {
            image.write_to(&mut Cursor::new(&mut out), format.image_format())?;
        }
        OutputFormat::Exr => {
            let hdr = DynamicImage::ImageRgba8(image.clone()).to_rgba32f();
            hdr.write_to(&mut Cursor::new(&mut out), format.image_format())?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256) * 16 + y / 256) as u8, 255])
        })
    }

    #[test]
    fn nearest_neighbor_picks_floor_of_scaled_coordinate() {
        let src = gradient(1000, 700);
        let dst = resample_nearest(&src, 512, 512);
        assert_eq!(dst.dimensions(), (512, 512));
        for y0 in 0..512u32 {
            for x0 in 0..512u32 {
                let x1 = x0 * 1000 / 512;
                let y1 = y0 * 700 / 512;
                assert_eq!(dst.get_pixel(x0, y0), src.get_pixel(x1, y1), "at ({x0}, {y0})");
            }
        }
    }

    #[test]
    fn exact_halving_takes_even_samples() {
        let src = gradient(1024, 1024);
        let dst = resample_nearest(&src, 512, 512);
        assert_eq!(dst.get_pixel(0, 0), src.get_pixel(0, 0));
        assert_eq!(dst.get_pixel(1, 3), src.get_pixel(2, 6));
        assert_eq!(dst.get_pixel(511, 511), src.get_pixel(1022, 1022));
    }

    #[test]
    fn threshold_requires_both_axes_larger() {
        assert!(should_resample(1024, 1024, 512));
        assert!(should_resample(513, 513, 512));
        assert!(!should_resample(512, 512, 512));
        assert!(!should_resample(2048, 512, 512));
        assert!(!should_resample(64, 4096, 512));
    }

    #[test]
    fn format_follows_lowercased_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a.JPG")).unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.jpeg")).unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path(Path::new("a.Png")).unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path(Path::new("a.tga")).unwrap(), OutputFormat::Tga);
        assert_eq!(OutputFormat::from_path(Path::new("a.exr")).unwrap(), OutputFormat::Exr);
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        for name in ["a.bmp", "a.webp", "noext"] {
            match OutputFormat::from_path(Path::new(name)) {
                Err(Error::UnsupportedFormat { extension, .. }) => {
                    assert_eq!(extension, name.rsplit_once('.').map_or("", |(_, e)| e));
                }
                other => panic!("expected unsupported format for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn encoded_outputs_decode_back_to_target_size() {
        let img = gradient(32, 16);
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Tga, OutputFormat::Exr] {
            let bytes = encode(&img, format, 80).unwrap();
            // TGA has no magic bytes, so decode with an explicit format
            let decoded = image::load_from_memory_with_format(&bytes, format.image_format())
                .unwrap_or_else(|e| panic!("{format} output failed to decode: {e}"));
            assert_eq!((decoded.width(), decoded.height()), (32, 16), "{format}");
        }
    }

    #[test]
    fn png_is_lossless() {
        let img = gradient(20, 10);
        let bytes = encode(&img, OutputFormat::Png, 75).unwrap();
        assert_eq!(decode(&bytes, None).unwrap(), img);
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode(b"definitely not an image", None).is_err());
        assert!(decode(b"definitely not an image", Some(ImageFormat::Png)).is_err());
    }

    #[test]
    fn extension_hint_decodes_tga() {
        let img = gradient(8, 4);
        let bytes = encode(&img, OutputFormat::Tga, 75).unwrap();
        assert_eq!(decode(&bytes, Some(ImageFormat::Tga)).unwrap().dimensions(), (8, 4));
    }
}
