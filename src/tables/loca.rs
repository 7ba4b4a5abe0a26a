//! An [Index to Location Table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/loca) implementation.

use core::ops::Range;

use crate::parser::Stream;
use crate::tables::head::IndexToLocationFormat;
use crate::{GlyphId, ParseError, Tag};

/// An [Index to Location Table](https://docs.microsoft.com/en-us/typography/opentype/spec/loca).
///
/// Holds `numGlyphs + 1` offsets into the `glyf` table; the extra sentinel
/// entry lets the length of the last glyph be computed the same way as any
/// other. This table's raw form is its decoded form, so the offsets are kept
/// as read.
#[derive(Clone, Debug)]
pub enum Table {
    /// Offsets stored divided by 2.
    Short(Vec<u16>),
    /// Offsets stored as-is.
    Long(Vec<u32>),
}

impl Table {
    /// The `loca` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"loca");

    /// Parses a table from raw data.
    ///
    /// `number_of_glyphs` comes from `maxp`, `format` from `head`.
    pub fn parse(
        data: &[u8],
        number_of_glyphs: u16,
        format: IndexToLocationFormat,
    ) -> Result<Self, ParseError> {
        let total = usize::from(number_of_glyphs) + 1;

        let mut s = Stream::new(data);
        let table = match format {
            IndexToLocationFormat::Short => Table::Short(s.read_vec::<u16>(total)?),
            IndexToLocationFormat::Long => Table::Long(s.read_vec::<u32>(total)?),
        };

        // 'The offsets must be in ascending order.'
        let monotonic = match &table {
            Table::Short(offsets) => offsets.windows(2).all(|pair| pair[0] <= pair[1]),
            Table::Long(offsets) => offsets.windows(2).all(|pair| pair[0] <= pair[1]),
        };
        if !monotonic {
            return Err(ParseError::NonMonotonicLocaOffsets);
        }

        Ok(table)
    }

    /// The number of offsets, `numGlyphs + 1`.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Table::Short(offsets) => offsets.len(),
            Table::Long(offsets) => offsets.len(),
        }
    }

    /// Checks that the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `glyf` byte offset stored at `index`.
    #[inline]
    pub fn offset(&self, index: usize) -> Option<u32> {
        match self {
            // 'The actual local offset divided by 2 is stored.'
            Table::Short(offsets) => offsets.get(index).map(|n| u32::from(*n) * 2),
            Table::Long(offsets) => offsets.get(index).copied(),
        }
    }

    /// Returns the byte range of a glyph description inside `glyf`.
    ///
    /// `None` for out-of-range ids and for glyphs without an outline
    /// (`loca[n] == loca[n + 1]`, e.g. the space glyph).
    pub fn glyph_range(&self, glyph_id: GlyphId) -> Option<Range<usize>> {
        let index = usize::from(glyph_id.0);
        let start = self.offset(index)?;
        let end = self.offset(index + 1)?;
        if start == end {
            None
        } else {
            Some(start as usize..end as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_offsets_are_doubled() {
        let data = &[
            0x00, 0x00, // offset [0]: 0
            0x00, 0x05, // offset [1]: 5 -> 10
            0x00, 0x05, // offset [2]: 5 -> 10
            0x00, 0x08, // offset [3]: 8 -> 16
        ];
        let table = Table::parse(data, 3, IndexToLocationFormat::Short).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.offset(1), Some(10));
        assert_eq!(table.offset(3), Some(16));
        assert_eq!(table.offset(4), None);
        assert_eq!(table.glyph_range(GlyphId(0)), Some(0..10));
        assert_eq!(table.glyph_range(GlyphId(1)), None); // no outline
        assert_eq!(table.glyph_range(GlyphId(2)), Some(10..16));
        assert_eq!(table.glyph_range(GlyphId(3)), None); // out of range
    }

    #[test]
    fn long_offsets() {
        let data = &[
            0x00, 0x00, 0x00, 0x00, // offset [0]: 0
            0x00, 0x00, 0x00, 0x0A, // offset [1]: 10
        ];
        let table = Table::parse(data, 1, IndexToLocationFormat::Long).unwrap();
        assert_eq!(table.offset(1), Some(10));
        assert_eq!(table.glyph_range(GlyphId(0)), Some(0..10));
    }

    #[test]
    fn not_monotonic() {
        let data = &[
            0x00, 0x00, // offset [0]: 0
            0x00, 0x0A, // offset [1]: 10
            0x00, 0x0A, // offset [2]: 10
            0x00, 0x05, // offset [3]: 5
        ];
        assert!(matches!(
            Table::parse(data, 3, IndexToLocationFormat::Short),
            Err(ParseError::NonMonotonicLocaOffsets)
        ));
    }

    #[test]
    fn too_short_for_sentinel() {
        let data = &[
            0x00, 0x00, // offset [0]: 0
            0x00, 0x05, // offset [1]: 10
        ];
        assert!(matches!(
            Table::parse(data, 2, IndexToLocationFormat::Short),
            Err(ParseError::UnexpectedEof)
        ));
    }
}
