//! Upload decoding.

const UTF8_BOM: &str = "\u{feff}";

/// Text encoding a CSV upload was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Latin1,
}

/// Decode an uploaded file as UTF-8 (dropping a leading byte-order mark),
/// falling back to Latin-1 when the bytes are not valid UTF-8.
///
/// Latin-1 maps every byte to the code point with the same value, so the
/// fallback cannot fail.
pub fn decode_upload(bytes: &[u8]) -> (String, SourceEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (
            text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string(),
            SourceEncoding::Utf8,
        ),
        Err(err) => {
            log::debug!("upload is not valid UTF-8 ({err}), decoding as Latin-1");
            let text = bytes.iter().map(|&byte| char::from(byte)).collect();
            (text, SourceEncoding::Latin1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_byte_order_mark() {
        let (text, encoding) = decode_upload(b"\xEF\xBB\xBFname,email,phone\n");
        assert_eq!(text, "name,email,phone\n");
        assert_eq!(encoding, SourceEncoding::Utf8);
    }

    #[test]
    fn keeps_plain_utf8() {
        let (text, encoding) = decode_upload("José,jose@x.com\n".as_bytes());
        assert_eq!(text, "José,jose@x.com\n");
        assert_eq!(encoding, SourceEncoding::Utf8);
    }

    #[test]
    fn falls_back_to_latin1() {
        // "Jos\xE9" is "José" in Latin-1 and invalid as UTF-8.
        let (text, encoding) = decode_upload(b"Jos\xE9,Espa\xF1a\n");
        assert_eq!(text, "José,España\n");
        assert_eq!(encoding, SourceEncoding::Latin1);
    }

    #[test]
    fn only_a_leading_bom_is_removed() {
        let (text, _) = decode_upload("a\u{feff}b".as_bytes());
        assert_eq!(text, "a\u{feff}b");
    }
}
