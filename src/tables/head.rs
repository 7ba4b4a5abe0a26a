//! A [Font Header Table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/head) implementation.

use crate::parser::{Fixed, Stream};
use crate::{ParseError, Rect, Tag};

const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// An index format used by the [Index to Location Table](
/// https://docs.microsoft.com/en-us/typography/opentype/spec/loca).
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndexToLocationFormat {
    Short,
    Long,
}

/// A [Font Header Table](https://docs.microsoft.com/en-us/typography/opentype/spec/head).
///
/// All fields are retained for introspection, even the ones nothing in this
/// crate consumes.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    /// Major table version. Only 1 has ever been defined.
    pub major_version: u16,
    /// Minor table version.
    pub minor_version: u16,
    /// Font revision, as set by the font manufacturer.
    pub font_revision: Fixed,
    /// Whole-file checksum adjustment. Not verified by this crate.
    pub checksum_adjustment: u32,
    /// Layout flags.
    pub flags: u16,
    /// Units per EM.
    ///
    /// Guaranteed to be in a 1..=16384 range.
    pub units_per_em: u16,
    /// Creation time, seconds since 1904-01-01.
    pub created: i64,
    /// Modification time, seconds since 1904-01-01.
    pub modified: i64,
    /// A bounding box large enough to enclose any glyph of the font.
    pub global_bbox: Rect,
    /// Mac style bits.
    pub mac_style: u16,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    /// Deprecated direction hint.
    pub font_direction_hint: i16,
    /// Offset width of the Index to Location Table.
    pub index_to_location_format: IndexToLocationFormat,
    /// Glyph data format. 0 for current use.
    pub glyph_data_format: i16,
}

impl Table {
    /// The `head` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"head");

    /// Parses a table from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        let major_version: u16 = s.read()?;
        let minor_version: u16 = s.read()?;
        let font_revision: Fixed = s.read()?;
        let checksum_adjustment: u32 = s.read()?;

        let magic_number: u32 = s.read()?;
        if magic_number != MAGIC_NUMBER {
            return Err(ParseError::BadHeadMagic(magic_number));
        }

        let flags: u16 = s.read()?;
        let units_per_em: u16 = s.read()?;
        if units_per_em == 0 || units_per_em > 16384 {
            return Err(ParseError::InvalidUnitsPerEm(units_per_em));
        }

        let created: i64 = s.read()?;
        let modified: i64 = s.read()?;
        let x_min: i16 = s.read()?;
        let y_min: i16 = s.read()?;
        let x_max: i16 = s.read()?;
        let y_max: i16 = s.read()?;
        let mac_style: u16 = s.read()?;
        let lowest_rec_ppem: u16 = s.read()?;
        let font_direction_hint: i16 = s.read()?;

        let index_to_location_format = match s.read::<i16>()? {
            0 => IndexToLocationFormat::Short,
            1 => IndexToLocationFormat::Long,
            n => return Err(ParseError::InvalidIndexToLocationFormat(n)),
        };

        let glyph_data_format: i16 = s.read()?;

        Ok(Table {
            major_version,
            minor_version,
            font_revision,
            checksum_adjustment,
            flags,
            units_per_em,
            created,
            modified,
            global_bbox: Rect { x_min, y_min, x_max, y_max },
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_location_format,
            glyph_data_format,
        })
    }
}
