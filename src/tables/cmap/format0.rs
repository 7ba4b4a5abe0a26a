//! [Format 0: Byte encoding table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-0-byte-encoding-table).

use crate::parser::Stream;
use crate::ParseError;

/// A Byte encoding table.
#[derive(Clone)]
pub struct Subtable {
    /// Language field. Relevant for Macintosh platform subtables only.
    pub language: u16,
    glyph_ids: Vec<u8>,
}

impl Subtable {
    /// Parses a subtable from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        s.skip::<u16>(); // format
        s.skip::<u16>(); // length
        let language: u16 = s.read()?;
        let glyph_ids = s.read_bytes(256)?.to_vec();
        Ok(Subtable { language, glyph_ids })
    }

    /// Maps a character to a glyph index.
    pub fn glyph_index(&self, code_point: u32) -> Option<u16> {
        let glyph_id = *self.glyph_ids.get(usize::try_from(code_point).ok()?)?;
        // The array always has 256 entries, but some codepoints
        // may be mapped to zero, which means a missing glyph.
        if glyph_id != 0 {
            Some(u16::from(glyph_id))
        } else {
            None
        }
    }
}

impl core::fmt::Debug for Subtable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Subtable {{ language: {} }}", self.language)
    }
}
