use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// MIME type required for attachments
pub const PDF_MIME: &str = "application/pdf";

/// A parsed `data:` URL. Borrowed from the attachment string.
///
/// `data:[<mime>][;param=value]*[;base64],<payload>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Declared MIME type, if the header carries one
    pub mime: Option<&'a str>,
    pub base64: bool,
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Parse a data URL. Returns `None` if `s` is not one.
    pub fn parse(s: &'a str) -> Option<DataUrl<'a>> {
        let rest = s.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mut parts = header.split(';');
        let mime = parts.next().map(str::trim).filter(|m| !m.is_empty());
        let base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));
        Some(DataUrl {
            mime,
            base64,
            payload,
        })
    }

    /// Build a base64 data URL from raw bytes
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
    }

    /// Read a file and encode it as a data URL, inferring the MIME type
    /// from its extension.
    pub fn from_file(path: &Path) -> std::io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(DataUrl::encode(mime_for_path(path), &bytes))
    }
}

/// Declared MIME type of an attachment string, if it is a data URL with one
pub fn declared_mime(attachment: &str) -> Option<&str> {
    DataUrl::parse(attachment).and_then(|d| d.mime)
}

/// MIME type for a file name, by extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => PDF_MIME,
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
