//! UTF-16LE string extraction.
//!
//! Names in a change journal come from untrusted, often damaged, media. An
//! isolated surrogate is replaced with U+FFFD instead of failing the record;
//! only structural problems (odd length, out of bounds) are errors.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::{UsnResult, cursor::ByteCursor, errors::UsnError};

/// A string decoded from UTF-16LE code units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DecodedString {
    text: String,
    substitutions: usize,
}

impl DecodedString {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of unpaired surrogates that were replaced with U+FFFD.
    pub fn substitutions(&self) -> usize {
        self.substitutions
    }

    pub fn is_lossy(&self) -> bool {
        self.substitutions > 0
    }
}

impl fmt::Display for DecodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for DecodedString {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Decodes a whole byte run as UTF-16LE.
///
/// Errors report offsets relative to `bytes`.
pub fn decode_utf16le(bytes: &[u8]) -> UsnResult<DecodedString> {
    if bytes.len() % 2 != 0 {
        return Err(UsnError::InvalidStringLength {
            offset: 0,
            length: bytes.len(),
        });
    }

    let units = bytes.chunks_exact(2).map(LittleEndian::read_u16);
    let mut text = String::with_capacity(bytes.len() / 2);
    let mut substitutions = 0;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => text.push(c),
            Err(err) => {
                trace!("Unpaired surrogate 0x{:04x} replaced", err.unpaired_surrogate());
                substitutions += 1;
                text.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }

    Ok(DecodedString {
        text,
        substitutions,
    })
}

/// Decodes `length` bytes of UTF-16LE starting at `offset` within `buf`.
///
/// Errors report offsets relative to `buf`.
pub fn decode_utf16le_at(buf: &[u8], offset: usize, length: usize) -> UsnResult<DecodedString> {
    let mut cursor = ByteCursor::new(buf);
    cursor.seek(offset)?;
    if length % 2 != 0 {
        return Err(UsnError::InvalidStringLength { offset, length });
    }
    let bytes = cursor.read_bytes(length)?;
    decode_utf16le(bytes).map_err(|err| err.rebase(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(units: &[u16]) -> Vec<u8> {
        units.iter().flat_map(|unit| unit.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_bmp_text() -> UsnResult<()> {
        let bytes: Vec<u8> = "report.docx"
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        let decoded = decode_utf16le(&bytes)?;
        assert_eq!(decoded.as_str(), "report.docx");
        assert!(!decoded.is_lossy());
        Ok(())
    }

    #[test]
    fn surrogate_pair_collapses_to_one_scalar() -> UsnResult<()> {
        // U+1F600 followed by 'a'.
        let bytes = utf16le(&[0xd83d, 0xde00, 0x0061]);
        let decoded = decode_utf16le(&bytes)?;
        assert_eq!(decoded.as_str(), "\u{1f600}a");
        assert_eq!(decoded.as_str().chars().count(), 2);
        Ok(())
    }

    #[test]
    fn isolated_high_surrogate_is_replaced() -> UsnResult<()> {
        let bytes = utf16le(&[0x0061, 0xd800, 0x0062]);
        let decoded = decode_utf16le(&bytes)?;
        assert_eq!(decoded.as_str(), "a\u{fffd}b");
        assert_eq!(decoded.substitutions(), 1);
        Ok(())
    }

    #[test]
    fn isolated_low_surrogate_is_replaced() -> UsnResult<()> {
        let bytes = utf16le(&[0xdc00, 0xd800]);
        let decoded = decode_utf16le(&bytes)?;
        assert_eq!(decoded.as_str(), "\u{fffd}\u{fffd}");
        assert_eq!(decoded.substitutions(), 2);
        Ok(())
    }

    #[test]
    fn scalar_count_never_exceeds_unit_count() -> UsnResult<()> {
        let samples: [&[u16]; 4] = [
            &[],
            &[0xd83d, 0xde00, 0xd83d, 0xde00],
            &[0xd800, 0xd800, 0xdc00],
            &[0x0041, 0xdfff, 0x0042],
        ];
        for units in samples {
            let decoded = decode_utf16le(&utf16le(units))?;
            assert!(decoded.as_str().chars().count() <= units.len());
        }
        Ok(())
    }

    #[test]
    fn odd_length_is_rejected() {
        let err = decode_utf16le(&[0x61, 0x00, 0x62]).unwrap_err();
        assert_eq!(
            err,
            UsnError::InvalidStringLength {
                offset: 0,
                length: 3
            }
        );
    }

    #[test]
    fn decode_at_checks_bounds_and_length() {
        let buf = utf16le(&[0x0061, 0x0062, 0x0063]);

        assert_eq!(decode_utf16le_at(&buf, 2, 4).unwrap().as_str(), "bc");
        assert_eq!(decode_utf16le_at(&buf, 6, 0).unwrap().as_str(), "");
        assert_eq!(
            decode_utf16le_at(&buf, 2, 3).unwrap_err(),
            UsnError::InvalidStringLength {
                offset: 2,
                length: 3
            }
        );
        assert_eq!(
            decode_utf16le_at(&buf, 4, 4).unwrap_err(),
            UsnError::OutOfBounds {
                offset: 4,
                needed: 4,
                available: 2
            }
        );
        assert!(matches!(
            decode_utf16le_at(&buf, 7, 0),
            Err(UsnError::OutOfBounds { offset: 7, .. })
        ));
    }
}
