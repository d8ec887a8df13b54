//! Decode → resize → encode.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use tracing::debug;

use super::error::TransformError;
use super::params::TransformRequest;

/// Content type of every served image.
pub const OUTPUT_CONTENT_TYPE: &str = "image/png";

/// JPEG quality used when recompressing uploads.
const RECOMPRESS_JPEG_QUALITY: u8 = 85;

/// Decode `data`, apply `request`, and encode as PNG.
///
/// # Errors
///
/// Returns [`TransformError::Decode`] if `data` is not a supported image.
pub fn transform(data: &[u8], request: &TransformRequest) -> Result<Vec<u8>, TransformError> {
    let (img, _) = decode(data)?;
    let img = resize(img, request);

    let mut output = Cursor::new(Vec::new());
    img.write_to(&mut output, ImageFormat::Png)
        .map_err(|e| TransformError::encode_failed("png", e.to_string()))?;

    Ok(output.into_inner())
}

/// Decode `data` and re-encode it in its own format with stronger compression.
///
/// JPEG is written at quality 85, PNG at best compression. The original bytes
/// are kept when the re-encoded output is not smaller, or when the format can
/// be decoded but not encoded.
///
/// # Errors
///
/// Returns [`TransformError::Decode`] if `data` is not a supported image.
pub fn recompress(data: &[u8]) -> Result<Vec<u8>, TransformError> {
    let (img, format) = decode(data)?;

    let mut output = Vec::new();
    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(
            JpegEncoder::new_with_quality(&mut output, RECOMPRESS_JPEG_QUALITY),
        ),
        ImageFormat::Png => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut output,
            CompressionType::Best,
            PngFilter::Adaptive,
        )),
        other => img.write_to(&mut Cursor::new(&mut output), other),
    };

    match result {
        Ok(()) if output.len() < data.len() => Ok(output),
        Ok(()) => {
            debug!(
                format = format_name(format),
                original_size = data.len(),
                recompressed_size = output.len(),
                "Recompression did not shrink, keeping original bytes"
            );
            Ok(data.to_vec())
        }
        Err(ImageError::Unsupported(e)) => {
            debug!(format = format_name(format), reason = %e, "Keeping original bytes");
            Ok(data.to_vec())
        }
        Err(e) => Err(TransformError::encode_failed(
            format_name(format),
            e.to_string(),
        )),
    }
}

fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat), TransformError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::decode_failed(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| TransformError::decode_failed("unrecognized image format"))?;

    let img = reader
        .decode()
        .map_err(|e| TransformError::decode_failed(e.to_string()))?;

    Ok((img, format))
}

fn resize(img: DynamicImage, request: &TransformRequest) -> DynamicImage {
    let source = (img.width(), img.height());
    let (width, height) = request.target_size(source);

    if (width, height) == source {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    }
}

fn format_name(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("image")
}
