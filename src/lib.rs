/*!
A TrueType/OpenType font file reader.

`sfnt-reader` decodes the sfnt container and the glyph-geometry tables into
an owned, queryable model:

- The table directory, with per-table checksum validation.
- `head`, `maxp`, `hhea`, `hmtx`, `loca`, `glyf` and `cmap`
  (subtable formats 0, 4 and 12).
- Glyph contours with implied on/off-curve midpoints resolved and composite
  glyphs flattened, ready for rasterization or GPU consumption.

All values are converted to host order during parsing; after construction a
[`Font`] never touches the raw file again and can be shared freely between
threads.

Malformed fonts are rejected with a [`ParseError`] describing the defect.
Individually broken glyphs degrade to empty slots instead of failing the
whole font; such degradations and skipped `cmap` subtables are reported
through the [`log`](https://docs.rs/log) crate.

## Example

```rust
let font = sfnt_reader::Font::open("font.ttf")?;
let glyph_id = font.map(u32::from('A'));
if let Some(glyph) = font.glyph(glyph_id) {
    for contour in glyph.contours {
        // Scale by 1.0 / units_per_em to get em-normalized coordinates.
        let _ = contour;
    }
}
# Ok::<(), sfnt_reader::ParseError>(())
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use core::fmt;

mod directory;
mod parser;
pub mod tables;

pub use directory::{TableDirectory, TableRecord};
pub use parser::{Fixed, F2DOT14};
pub use tables::glyf::{Contour, GlyphView, Point};
pub use tables::head::IndexToLocationFormat;
pub use tables::hmtx::Metrics;

use parser::{FromData, Stream};
use tables::{cmap, glyf, head, hhea, hmtx, loca, maxp};

/// A 4-byte table tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub u32);

impl Tag {
    /// Creates a tag from its byte representation.
    #[inline]
    pub const fn from_bytes(bytes: &[u8; 4]) -> Self {
        Tag(u32::from_be_bytes(*bytes))
    }

    /// The byte representation of the tag.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl FromData for Tag {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        Tag(u32::parse(data))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.to_bytes() {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "?")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// A type-safe wrapper for glyph ID.
///
/// `0` is the `.notdef` glyph.
#[repr(transparent)]
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug)]
pub struct GlyphId(pub u16);

impl FromData for GlyphId {
    const SIZE: usize = 2;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        GlyphId(u16::parse(data))
    }
}

/// A rect, in font-design units.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

/// A font parsing error.
#[derive(Debug)]
pub enum ParseError {
    /// The file could not be opened or read.
    Io(std::io::Error),
    /// The file is smaller than the table directory it claims to contain.
    FileTooSmall,
    /// The sfnt version is neither TrueType nor OpenType.
    UnknownMagic(u32),
    /// The collection has no font at the requested index.
    FaceIndexOutOfBounds,
    /// A read ran past the end of its region.
    UnexpectedEof,
    /// A table (or a glyph region) reaches outside its container.
    TableOutOfBounds(Tag),
    /// The table directory names the same tag twice.
    DuplicateTable(Tag),
    /// A stored table checksum does not match the table contents.
    ChecksumMismatch(Tag),
    /// A required table is missing.
    MissingTable(Tag),
    /// The `head` table magic number is wrong.
    BadHeadMagic(u32),
    /// `unitsPerEm` is outside the 1..=16384 range.
    InvalidUnitsPerEm(u16),
    /// `indexToLocFormat` is neither 0 nor 1.
    InvalidIndexToLocationFormat(i16),
    /// A table version this crate does not understand.
    UnsupportedTableVersion(Tag, u32),
    /// A structurally invalid table.
    MalformedTable(Tag),
    /// The `loca` offsets are not monotonically non-decreasing.
    NonMonotonicLocaOffsets,
    /// The composite glyph graph re-enters the referenced glyph.
    CyclicComponentGraph(GlyphId),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Io(error) => write!(f, "failed to read the font file: {}", error),
            ParseError::FileTooSmall => write!(f, "file is too small to contain a font"),
            ParseError::UnknownMagic(magic) => write!(f, "unknown magic {:#010X}", magic),
            ParseError::FaceIndexOutOfBounds => write!(f, "font index is out of bounds"),
            ParseError::UnexpectedEof => write!(f, "unexpected end of data"),
            ParseError::TableOutOfBounds(tag) => {
                write!(f, "a region of the '{}' table is out of bounds", tag)
            }
            ParseError::DuplicateTable(tag) => write!(f, "duplicated '{}' table", tag),
            ParseError::ChecksumMismatch(tag) => {
                write!(f, "'{}' table checksum does not match its contents", tag)
            }
            ParseError::MissingTable(tag) => write!(f, "font doesn't have a '{}' table", tag),
            ParseError::BadHeadMagic(magic) => {
                write!(f, "invalid 'head' table magic {:#010X}", magic)
            }
            ParseError::InvalidUnitsPerEm(units) => {
                write!(f, "invalid units per em: {}", units)
            }
            ParseError::InvalidIndexToLocationFormat(format) => {
                write!(f, "invalid index to location format: {}", format)
            }
            ParseError::UnsupportedTableVersion(tag, version) => {
                write!(f, "'{}' table version {:#010X} is not supported", tag, version)
            }
            ParseError::MalformedTable(tag) => write!(f, "malformed '{}' table", tag),
            ParseError::NonMonotonicLocaOffsets => {
                write!(f, "'loca' offsets are not in ascending order")
            }
            ParseError::CyclicComponentGraph(glyph_id) => {
                write!(f, "components of glyph {} form a cycle", glyph_id.0)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(error: std::io::Error) -> Self {
        ParseError::Io(error)
    }
}

/// Returns the number of fonts stored in a TrueType font collection.
///
/// Returns `None` if the data is not a font collection.
pub fn fonts_in_collection(data: &[u8]) -> Option<u32> {
    let tag: Tag = Stream::read_at(data, 0).ok()?;
    if tag != Tag::from_bytes(b"ttcf") {
        return None;
    }

    // https://docs.microsoft.com/en-us/typography/opentype/spec/otff#ttc-header
    Stream::read_at::<u32>(data, 8).ok()
}

/// A decoded font.
///
/// Construction parses and validates everything up front; a `Font` value is
/// immutable and every query is answered from the decoded model.
#[derive(Clone, Debug)]
pub struct Font {
    directory: TableDirectory,
    head: head::Table,
    maxp: maxp::Table,
    hhea: hhea::Table,
    cmap: cmap::Table,
    loca: loca::Table,
    glyf: glyf::Table,
    hmtx: hmtx::Table,
}

impl Font {
    /// Reads a font file and decodes it.
    ///
    /// For font collections, the first font is used.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ParseError> {
        let data = std::fs::read(path)?;
        Self::from_data(&data, 0)
    }

    /// Decodes a font from raw data.
    ///
    /// `index` selects a font inside a TrueType font collection; for plain
    /// font files it is ignored.
    ///
    /// The raw data is not retained: every table is decoded into host-order
    /// form before this returns.
    pub fn from_data(data: &[u8], index: u32) -> Result<Self, ParseError> {
        let directory_offset = if let Some(count) = fonts_in_collection(data) {
            if index >= count {
                return Err(ParseError::FaceIndexOutOfBounds);
            }

            // The collection header is followed by one directory offset
            // per font.
            let position = 12usize + 4 * index as usize;
            let offset: u32 = Stream::read_at(data, position)?;
            offset as usize
        } else {
            0
        };

        let directory = TableDirectory::parse(data, directory_offset)?;

        // The required tables, decoded leaves first so that every dependent
        // table has its parameters at hand.
        let head = head::Table::parse(table_slice(&directory, data, head::Table::TAG)?)?;
        let maxp = maxp::Table::parse(table_slice(&directory, data, maxp::Table::TAG)?)?;
        let hhea = hhea::Table::parse(table_slice(&directory, data, hhea::Table::TAG)?)?;
        let cmap = cmap::Table::parse(table_slice(&directory, data, cmap::Table::TAG)?)?;
        let loca = loca::Table::parse(
            table_slice(&directory, data, loca::Table::TAG)?,
            maxp.number_of_glyphs,
            head.index_to_location_format,
        )?;
        let glyf = glyf::Table::parse(table_slice(&directory, data, glyf::Table::TAG)?, &loca)?;
        let hmtx = hmtx::Table::parse(
            table_slice(&directory, data, hmtx::Table::TAG)?,
            hhea.number_of_h_metrics,
            maxp.number_of_glyphs,
        )?;

        Ok(Font {
            directory,
            head,
            maxp,
            hhea,
            cmap,
            loca,
            glyf,
            hmtx,
        })
    }

    /// The table directory.
    #[inline]
    pub fn directory(&self) -> &TableDirectory {
        &self.directory
    }

    /// Returns a decoded table by its type.
    pub fn table<T: FontTable>(&self) -> Option<&T> {
        T::from_font(self)
    }

    /// The number of glyphs in the font.
    #[inline]
    pub fn number_of_glyphs(&self) -> u16 {
        self.maxp.number_of_glyphs
    }

    /// Units per EM. Scale contour coordinates by the reciprocal to get
    /// em-normalized values.
    #[inline]
    pub fn units_per_em(&self) -> u16 {
        self.head.units_per_em
    }

    /// A bounding box that encloses any glyph of the font.
    #[inline]
    pub fn global_bbox(&self) -> Rect {
        self.head.global_bbox
    }

    /// The typographic ascender.
    #[inline]
    pub fn ascender(&self) -> i16 {
        self.hhea.ascender
    }

    /// The typographic descender.
    #[inline]
    pub fn descender(&self) -> i16 {
        self.hhea.descender
    }

    /// The typographic line gap.
    #[inline]
    pub fn line_gap(&self) -> i16 {
        self.hhea.line_gap
    }

    /// Returns the header and contour list of a glyph.
    ///
    /// Glyphs without an outline yield an empty view; ids past the glyph
    /// count yield `None`.
    #[inline]
    pub fn glyph(&self, glyph_id: GlyphId) -> Option<GlyphView> {
        self.glyf.get(glyph_id)
    }

    /// Maps a character to its glyph.
    ///
    /// Returns the `.notdef` glyph (`0`) when the font has no mapping for it.
    #[inline]
    pub fn map(&self, code_point: u32) -> GlyphId {
        self.cmap.map(code_point).unwrap_or(GlyphId(0))
    }

    /// Returns the advance width and left side bearing of a glyph.
    #[inline]
    pub fn advance_width(&self, glyph_id: GlyphId) -> Option<(u16, i16)> {
        let metrics = self.hmtx.metrics(glyph_id)?;
        Some((metrics.advance_width, metrics.lsb))
    }
}

fn table_slice<'a>(
    directory: &TableDirectory,
    data: &'a [u8],
    tag: Tag,
) -> Result<&'a [u8], ParseError> {
    let record = directory.get(tag).ok_or(ParseError::MissingTable(tag))?;
    let start = record.offset as usize;
    let end = start + record.length as usize;
    data.get(start..end).ok_or(ParseError::UnexpectedEof)
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::tables::head::Table {}
    impl Sealed for crate::tables::maxp::Table {}
    impl Sealed for crate::tables::hhea::Table {}
    impl Sealed for crate::tables::cmap::Table {}
    impl Sealed for crate::tables::loca::Table {}
    impl Sealed for crate::tables::glyf::Table {}
    impl Sealed for crate::tables::hmtx::Table {}
}

/// A table that can be looked up on a [`Font`] by type.
///
/// Implemented by the decoded table types of this crate; it cannot be
/// implemented outside of it.
pub trait FontTable: sealed::Sealed {
    /// The table tag.
    const TAG: Tag;

    /// Fetches the decoded table out of a font.
    fn from_font(font: &Font) -> Option<&Self>;
}

macro_rules! impl_font_table {
    ($table:ty, $field:ident) => {
        impl FontTable for $table {
            const TAG: Tag = <$table>::TAG;

            #[inline]
            fn from_font(font: &Font) -> Option<&Self> {
                Some(&font.$field)
            }
        }
    };
}

impl_font_table!(head::Table, head);
impl_font_table!(maxp::Table, maxp);
impl_font_table!(hhea::Table, hhea);
impl_font_table!(cmap::Table, cmap);
impl_font_table!(loca::Table, loca);
impl_font_table!(glyf::Table, glyf);
impl_font_table!(hmtx::Table, hmtx);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_display() {
        assert_eq!(Tag::from_bytes(b"glyf").to_string(), "glyf");
        assert_eq!(Tag::from_bytes(b"OS/2").to_string(), "OS/2");
        assert_eq!(Tag(0x00010000).to_string(), "????");
    }

    #[test]
    fn tag_round_trip() {
        let tag = Tag::from_bytes(b"loca");
        assert_eq!(tag.0, 0x6C6F6361);
        assert_eq!(&tag.to_bytes(), b"loca");
    }

    #[test]
    fn not_a_collection() {
        assert_eq!(fonts_in_collection(&[]), None);
        assert_eq!(fonts_in_collection(&[0x00, 0x01, 0x00, 0x00]), None);
    }

    #[test]
    fn collection_header() {
        let data = &[
            0x74, 0x74, 0x63, 0x66, // magic: 'ttcf'
            0x00, 0x01, // majorVersion: 1
            0x00, 0x00, // minorVersion: 0
            0x00, 0x00, 0x00, 0x02, // numFonts: 2
        ];
        assert_eq!(fonts_in_collection(data), Some(2));
    }
}
