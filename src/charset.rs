/*!
 * Character set detection for subtitle files.
 *
 * Subtitle files arrive in whatever encoding the authoring tool used
 * (Windows-1252, UTF-16 with a BOM, Shift_JIS, ...). Detection runs a BOM
 * check first and then the `chardetng` frequency heuristics; anything that
 * cannot be identified is treated as UTF-8.
 */

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

/// Detect the encoding of a raw subtitle blob. Never fails.
pub fn detect_encoding(data: &[u8]) -> &'static Encoding {
    if data.is_empty() {
        return UTF_8;
    }

    if let Some((encoding, _bom_len)) = Encoding::for_bom(data) {
        return encoding;
    }

    // Valid UTF-8 is taken at face value; chardetng prefers legacy encodings for pure ASCII
    if std::str::from_utf8(data).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    let encoding = detector.guess(None, true);
    debug!("Detected charset {}", encoding.name());
    encoding
}

/// Name of the detected charset, e.g. `UTF-8` or `windows-1252`
pub fn detect_charset(data: &[u8]) -> &'static str {
    detect_encoding(data).name()
}

/// Decode a blob using its detected encoding, stripping any BOM
pub fn decode(data: &[u8]) -> String {
    let encoding = detect_encoding(data);
    let (text, _had_errors) = encoding.decode_with_bom_removal(data);
    text.into_owned()
}
