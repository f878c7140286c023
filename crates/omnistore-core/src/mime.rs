//! Content-type detection.
//!
//! Runs only when [`AdapterConfig::detect_content_type`](crate::AdapterConfig)
//! is enabled: a magic-number sniff over the content bytes, then an
//! extension-based guess on the key, then the octet-stream fallback.

const OCTET_STREAM: &str = "application/octet-stream";

/// Best-guess content type for an object.
pub(crate) fn detect_content_type(key: &str, content: &[u8]) -> String {
    if let Some(sniffed) = sniff_magic(content) {
        return sniffed.to_string();
    }
    if let Some(guessed) = mime_guess::from_path(key).first() {
        return guessed.to_string();
    }
    OCTET_STREAM.to_string()
}

/// Match well-known magic numbers at the start of the content.
fn sniff_magic(content: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"<?xml", "application/xml"),
    ];

    SIGNATURES
        .iter()
        .find(|(magic, _)| content.starts_with(magic))
        .map(|(_, mime)| *mime)
}
