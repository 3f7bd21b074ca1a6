use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{codecs::jpeg::JpegEncoder, RgbImage};

/// 0.6 on the 0..1 quality scale.
pub const JPEG_QUALITY: u8 = 60;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        encoder
            .encode_image(frame)
            .context("jpeg encoding failed")?;
    }
    Ok(buffer)
}

pub fn encode_frame_data_uri(frame: &RgbImage) -> Result<String> {
    let jpeg = encode_jpeg(frame, JPEG_QUALITY)?;
    Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(jpeg)))
}

/// Inverse of [`encode_frame_data_uri`]; `None` for anything that is not a JPEG data URI.
pub fn decode_frame_data_uri(data_uri: &str) -> Option<Vec<u8>> {
    let encoded = data_uri.strip_prefix(DATA_URI_PREFIX)?;
    STANDARD.decode(encoded).ok()
}
