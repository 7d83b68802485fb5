use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// The encoding that produced a decoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
    Utf8Lossy,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::Utf8Lossy => "utf-8 (lossy)",
        })
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes 0x80..=0x9F in Windows-1252. `None` marks the five undefined slots.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Decode text through UTF-8, ISO-8859-1, Windows-1252, then lossy UTF-8.
///
/// Never fails: the last step replaces invalid sequences.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, TextEncoding) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (Cow::Borrowed(text), TextEncoding::Utf8);
    }
    if let Some(text) = decode_latin1(bytes) {
        return (Cow::Owned(text), TextEncoding::Latin1);
    }
    if let Some(text) = decode_cp1252(bytes) {
        return (Cow::Owned(text), TextEncoding::Windows1252);
    }
    (String::from_utf8_lossy(bytes), TextEncoding::Utf8Lossy)
}

/// ISO-8859-1 maps every byte, so reject buffers carrying C1 controls,
/// which real text in that encoding does not contain.
fn decode_latin1(bytes: &[u8]) -> Option<String> {
    if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        return None;
    }
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

fn decode_cp1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
            _ => Some(char::from(b)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_borrowed_and_bom_stripped() {
        let (text, enc) = decode_text("\u{FEFF}Date,₹ Amount".as_bytes());
        assert_eq!(enc, TextEncoding::Utf8);
        assert_eq!(text, "Date,₹ Amount");
        assert!(matches!(text, Cow::Borrowed(_)));
    }

    #[test]
    fn latin1_when_not_utf8() {
        // "Café" with é as 0xE9
        let (text, enc) = decode_text(b"Caf\xE9");
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "Café");
    }

    #[test]
    fn cp1252_for_c1_range_bytes() {
        // 0x80 is the euro sign, 0x93/0x94 are curly quotes.
        let (text, enc) = decode_text(b"\x80 100 \x93paid\x94");
        assert_eq!(enc, TextEncoding::Windows1252);
        assert_eq!(text, "€ 100 \u{201C}paid\u{201D}");
    }

    #[test]
    fn undefined_cp1252_bytes_fall_through_to_lossy() {
        let (text, enc) = decode_text(b"ab\x81cd");
        assert_eq!(enc, TextEncoding::Utf8Lossy);
        assert_eq!(text, "ab\u{FFFD}cd");
    }
}
