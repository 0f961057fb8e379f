//! Hand-drawn signature images submitted by the browser canvas.
//!
//! The canvas posts a `data:image/png;base64,...` URL. We decode it and read
//! the PNG header before anything is written to disk.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::CoreError;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Upper bound on a decoded signature, in bytes.
pub const MAX_SIGNATURE_BYTES: usize = 2 * 1024 * 1024;

/// A decoded, verified signature image.
#[derive(Debug)]
pub struct Signature {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode and verify a PNG data URL.
///
/// Bare base64 (without the `data:` prefix) is accepted too.
pub fn decode_signature(data_url: &str) -> Result<Signature, CoreError> {
    let payload = data_url
        .trim()
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .unwrap_or(data_url.trim());

    if payload.starts_with("data:") {
        return Err(CoreError::Validation(
            "Signature must be a PNG data URL".into(),
        ));
    }

    let png = BASE64
        .decode(payload)
        .map_err(|e| CoreError::Validation(format!("Signature is not valid base64: {e}")))?;

    if png.len() > MAX_SIGNATURE_BYTES {
        return Err(CoreError::Validation(format!(
            "Signature exceeds {MAX_SIGNATURE_BYTES} bytes"
        )));
    }

    let reader =
        image::ImageReader::with_format(std::io::Cursor::new(&png), image::ImageFormat::Png);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Signature is not a PNG image: {e}")))?;

    if width == 0 || height == 0 {
        return Err(CoreError::Validation("Signature image is empty".into()));
    }

    Ok(Signature { png, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// A 1x1 transparent PNG.
    const ONE_PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn decodes_png_data_url() {
        let sig = decode_signature(&format!("{PNG_DATA_URL_PREFIX}{ONE_PIXEL_PNG}")).unwrap();
        assert_eq!((sig.width, sig.height), (1, 1));
        assert!(sig.png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn accepts_bare_base64() {
        assert!(decode_signature(ONE_PIXEL_PNG).is_ok());
    }

    #[test]
    fn rejects_other_mime_types() {
        let result = decode_signature("data:image/jpeg;base64,AAAA");
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_non_png_bytes() {
        let not_png = BASE64.encode(b"definitely not an image");
        assert_matches!(decode_signature(&not_png), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(decode_signature("%%%"), Err(CoreError::Validation(_)));
    }
}
