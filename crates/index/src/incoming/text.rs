use std::borrow::Cow;

/// Decodes text as UTF-8, falling back to ISO-8859-1 (which maps every byte
/// to the code point of the same value). The flag reports whether the
/// fallback was used.
pub(crate) fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => (Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()), true),
    }
}

/// UCS-2 little-endian with a byte order mark, as written by UT2004's
/// localisation tools.
pub(crate) fn decode_utf16le(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(b"\xFF\xFE")?;
    let units = body.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]]));
    Some(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        let (text, fallback) = decode_text("Café".as_bytes());
        assert_eq!(text, "Café");
        assert!(!fallback);
    }

    #[test]
    fn test_latin1_fallback() {
        let (text, fallback) = decode_text(b"Caf\xE9");
        assert_eq!(text, "Café");
        assert!(fallback);
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhi").0, "hi");
    }

    #[test]
    fn test_utf16le() {
        assert_eq!(decode_utf16le(b"\xFF\xFEh\x00i\x00").as_deref(), Some("hi"));
        assert_eq!(decode_utf16le(b"hi"), None);
    }
}
