//! A [character to glyph index mapping](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/cmap)
//! table implementation.
//!
//! Subtable formats 0, 4 and 12 are decoded. The remaining formats are
//! recognized, skipped with a warning and never map anything.

use log::warn;

use crate::parser::{FromData, Stream};
use crate::{GlyphId, ParseError, Tag};

pub mod format0;
pub mod format12;
pub mod format4;

/// A [cmap encoding record](
/// https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#encoding-records-and-encodings).
#[derive(Clone, Copy, Debug)]
pub struct EncodingRecord {
    /// Platform identifier. 0 Unicode, 1 Macintosh, 3 Windows.
    pub platform_id: u16,
    /// Platform-specific encoding identifier.
    pub encoding_id: u16,
    /// Subtable offset from the start of the `cmap` table.
    pub offset: u32,
}

impl FromData for EncodingRecord {
    const SIZE: usize = 8;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        EncodingRecord {
            platform_id: u16::parse(&data[0..2]),
            encoding_id: u16::parse(&data[2..4]),
            offset: u32::parse(&data[4..8]),
        }
    }
}

/// A decoded character encoding subtable.
#[derive(Clone, Debug)]
pub enum Subtable {
    /// Format 0: Byte encoding table.
    ByteEncoding(format0::Subtable),
    /// Format 4: Segment mapping to delta values.
    SegmentMapping(format4::Subtable),
    /// Format 12: Segmented coverage.
    SegmentedCoverage(format12::Subtable),
    /// A recognized but undecoded format. Never maps anything.
    Unsupported {
        /// The subtable format number.
        format: u16,
    },
}

impl Subtable {
    /// Maps a character to a glyph index.
    pub fn glyph_index(&self, code_point: u32) -> Option<u16> {
        match self {
            Subtable::ByteEncoding(subtable) => subtable.glyph_index(code_point),
            Subtable::SegmentMapping(subtable) => subtable.glyph_index(code_point),
            Subtable::SegmentedCoverage(subtable) => subtable.glyph_index(code_point),
            Subtable::Unsupported { .. } => None,
        }
    }

    /// Checks that the subtable was decoded.
    #[inline]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Subtable::Unsupported { .. })
    }
}

/// A [Character to Glyph Index Mapping Table](
/// https://docs.microsoft.com/en-us/typography/opentype/spec/cmap).
#[derive(Clone, Debug)]
pub struct Table {
    /// Table version.
    pub version: u16,
    records: Vec<EncodingRecord>,
    subtables: Vec<Subtable>,
}

impl Table {
    /// The `cmap` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"cmap");

    /// Parses a table from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        let version: u16 = s.read()?;
        let count: u16 = s.read()?;
        if count == 0 {
            return Err(ParseError::MalformedTable(Self::TAG));
        }

        let records: Vec<EncodingRecord> = s.read_vec(usize::from(count))?;

        let mut subtables = Vec::with_capacity(records.len());
        for record in &records {
            let subtable_data = data
                .get(record.offset as usize..)
                .ok_or(ParseError::UnexpectedEof)?;
            let format: u16 = Stream::read_at(subtable_data, 0)?;
            let subtable = match format {
                0 => Subtable::ByteEncoding(format0::Subtable::parse(subtable_data)?),
                4 => Subtable::SegmentMapping(format4::Subtable::parse(subtable_data)?),
                12 => Subtable::SegmentedCoverage(format12::Subtable::parse(subtable_data)?),
                _ => {
                    warn!("cmap subtable format {} is not supported, skipping", format);
                    Subtable::Unsupported { format }
                }
            };
            subtables.push(subtable);
        }

        Ok(Table { version, records, subtables })
    }

    /// The encoding records, in file order.
    #[inline]
    pub fn records(&self) -> &[EncodingRecord] {
        &self.records
    }

    /// The decoded subtables, parallel to [`records`](Self::records).
    #[inline]
    pub fn subtables(&self) -> &[Subtable] {
        &self.subtables
    }

    /// Maps a character to a glyph index.
    ///
    /// Consults the first supported subtable only.
    pub fn map(&self, code_point: u32) -> Option<GlyphId> {
        self.subtables
            .iter()
            .find(|subtable| subtable.is_supported())?
            .glyph_index(code_point)
            .map(GlyphId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_encoding_records() {
        let data = &[
            0x00, 0x00, // version: 0
            0x00, 0x00, // numTables: 0
        ];
        assert!(matches!(
            Table::parse(data),
            Err(ParseError::MalformedTable(_))
        ));
    }

    #[test]
    fn unsupported_format_is_skipped() {
        let data = &[
            0x00, 0x00, // version: 0
            0x00, 0x02, // numTables: 2
            // Encoding record [0]
            0x00, 0x01, // platform ID: 1
            0x00, 0x00, // encoding ID: 0
            0x00, 0x00, 0x00, 0x14, // offset: 20
            // Encoding record [1]
            0x00, 0x00, // platform ID: 0
            0x00, 0x03, // encoding ID: 3
            0x00, 0x00, 0x00, 0x1A, // offset: 26
            // Subtable [0], format 6 (unsupported)
            0x00, 0x06, // format: 6
            0x00, 0x00, // length
            0x00, 0x00, // language
            // Subtable [1], format 0
            0x00, 0x00, // format: 0
            0x01, 0x06, // length: 262
            0x00, 0x00, // language: 0
        ];
        let mut data = data.to_vec();
        data.extend(core::iter::repeat(0).take(256));
        data[26 + 6 + 0x41] = 17; // map 'A' to 17

        let table = Table::parse(&data).unwrap();
        assert!(!table.subtables()[0].is_supported());
        assert!(table.subtables()[1].is_supported());
        // The unsupported subtable is skipped, the format 0 one answers.
        assert_eq!(table.map(0x41), Some(GlyphId(17)));
        assert_eq!(table.map(0x42), None);
    }

    #[test]
    fn only_unsupported_subtables() {
        let data = &[
            0x00, 0x00, // version: 0
            0x00, 0x01, // numTables: 1
            // Encoding record [0]
            0x00, 0x00, // platform ID: 0
            0x00, 0x05, // encoding ID: 5
            0x00, 0x00, 0x00, 0x0C, // offset: 12
            // Subtable [0], format 14 (unsupported)
            0x00, 0x0E, // format: 14
            0x00, 0x00, 0x00, 0x0A, // length
            0x00, 0x00, 0x00, 0x00, // numVarSelectorRecords
        ];
        let table = Table::parse(data).unwrap();
        assert_eq!(table.map(0x41), None);
    }

    #[test]
    fn subtable_offset_out_of_bounds() {
        let data = &[
            0x00, 0x00, // version: 0
            0x00, 0x01, // numTables: 1
            // Encoding record [0]
            0x00, 0x00, // platform ID: 0
            0x00, 0x03, // encoding ID: 3
            0x00, 0x00, 0xFF, 0x00, // offset: 65280
        ];
        assert!(matches!(Table::parse(data), Err(ParseError::UnexpectedEof)));
    }
}
