//! Prescription image payload.

use base64::Engine as _;

/// Raw image bytes plus the MIME type sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl PrescriptionImage {
    /// Wrap image bytes, sniffing the MIME type from the file signature.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = detect_mime_type(&bytes).to_string();
        Self { bytes, mime_type }
    }

    /// Wrap image bytes with an explicit MIME type.
    pub fn with_mime_type(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 encoding of the image bytes.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Detect an image MIME type from magic bytes. Unknown input is treated as JPEG.
pub fn detect_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        let bytes = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(detect_mime_type(&bytes), "image/png");
    }

    #[test]
    fn test_detect_webp() {
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(b"WEBPVP8 ");
        assert_eq!(detect_mime_type(&bytes), "image/webp");
    }

    #[test]
    fn test_unknown_defaults_to_jpeg() {
        assert_eq!(detect_mime_type(b"not an image"), "image/jpeg");
        assert_eq!(detect_mime_type(&[]), "image/jpeg");
    }

    #[test]
    fn test_base64() {
        let image = PrescriptionImage::with_mime_type(b"abc".to_vec(), "image/png");
        assert_eq!(image.to_base64(), "YWJj");
        assert!(!image.is_empty());
    }
}
