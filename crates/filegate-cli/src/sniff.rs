//! Content-type detection from file bytes

use mime::Mime;

/// Bytes inspected when deciding whether content is text
const TEXT_SAMPLE_LEN: usize = 8192;

/// Reported for zero-length objects, as libmagic does
const EMPTY: &str = "application/x-empty";

/// Magic numbers checked in order; `offset` is where `magic` must appear
struct Signature {
    offset: usize,
    magic: &'static [u8],
    mime: &'static str,
}

const SIGNATURES: &[Signature] = &[
    Signature { offset: 0, magic: b"\x89PNG\r\n\x1a\n", mime: "image/png" },
    Signature { offset: 0, magic: b"\xff\xd8\xff", mime: "image/jpeg" },
    Signature { offset: 0, magic: b"GIF87a", mime: "image/gif" },
    Signature { offset: 0, magic: b"GIF89a", mime: "image/gif" },
    Signature { offset: 0, magic: b"II*\x00", mime: "image/tiff" },
    Signature { offset: 0, magic: b"MM\x00*", mime: "image/tiff" },
    Signature { offset: 0, magic: b"\x00\x00\x01\x00", mime: "image/vnd.microsoft.icon" },
    Signature { offset: 0, magic: b"%PDF-", mime: "application/pdf" },
    Signature { offset: 0, magic: b"PK\x03\x04", mime: "application/zip" },
    Signature { offset: 0, magic: b"\x1f\x8b", mime: "application/gzip" },
    Signature { offset: 0, magic: b"ID3", mime: "audio/mpeg" },
    Signature { offset: 0, magic: b"OggS", mime: "audio/ogg" },
    Signature { offset: 4, magic: b"ftyp", mime: "video/mp4" },
];

/// Detect the MIME type of file contents by inspecting the bytes themselves
pub fn detect(data: &[u8]) -> Mime {
    essence(data)
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

fn essence(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return EMPTY;
    }

    if let Some(sig) = SIGNATURES
        .iter()
        .find(|sig| data.get(sig.offset..sig.offset + sig.magic.len()) == Some(sig.magic))
    {
        return sig.mime;
    }

    if data.len() >= 12 && data.starts_with(b"RIFF") {
        match &data[8..12] {
            b"WEBP" => return "image/webp",
            b"WAVE" => return "audio/x-wav",
            b"AVI " => return "video/x-msvideo",
            _ => {}
        }
    }

    // BMP header: "BM", then two reserved u16 fields that are zero
    if data.len() >= 14 && data.starts_with(b"BM") && data[6..10] == [0, 0, 0, 0] {
        return "image/bmp";
    }

    match text_sample(data) {
        Some(text) => markup(text).unwrap_or("text/plain"),
        None => "application/octet-stream",
    }
}

/// Leading text of `data`, or `None` if it looks binary
fn text_sample(data: &[u8]) -> Option<&str> {
    let sample = &data[..data.len().min(TEXT_SAMPLE_LEN)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // A multi-byte character cut off by the sample boundary is still text
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&sample[..e.valid_up_to()]).ok()?
        }
        Err(_) => return None,
    };

    let binary = text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0c' | '\x1b'));
    (!binary).then_some(text)
}

fn markup(text: &str) -> Option<&'static str> {
    let head: String = text
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(256)
        .collect::<String>()
        .to_ascii_lowercase();

    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        Some("image/svg+xml")
    } else if head.starts_with("<?xml") {
        Some("text/xml")
    } else if head.starts_with("<!doctype html") || head.starts_with("<html") {
        Some("text/html")
    } else {
        None
    }
}
