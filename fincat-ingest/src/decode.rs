//! Statement bytes → text.
//!
//! Exports from UK online banking are usually UTF-8, sometimes with a BOM
//! when saved through Excel, and occasionally Windows-1252 (the `£` sign as
//! a single 0xA3 byte). Decoding never fails. Without a BOM, lines that are
//! not valid UTF-8 are read as Windows-1252 and the rest stay UTF-8.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

#[derive(Debug)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
}

pub fn decode_statement(bytes: &[u8]) -> Decoded<'_> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Decoded { text, encoding };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Decoded {
            text: Cow::Borrowed(text),
            encoding: UTF_8,
        };
    }

    // Decided per line: a UTF-8 file with one row edited in a legacy
    // editor keeps its valid rows intact.
    let mut text = String::with_capacity(bytes.len());
    for line in bytes.split_inclusive(|&b| b == b'\n') {
        match std::str::from_utf8(line) {
            Ok(valid) => text.push_str(valid),
            Err(_) => text.push_str(&WINDOWS_1252.decode_without_bom_handling(line).0),
        }
    }
    Decoded {
        text: Cow::Owned(text),
        encoding: WINDOWS_1252,
    }
}
