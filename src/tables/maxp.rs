//! A [Maximum Profile Table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) implementation.

use crate::parser::Stream;
use crate::{ParseError, Tag};

const VERSION_0_5: u32 = 0x00005000;
const VERSION_1_0: u32 = 0x00010000;

/// The version 1.0 maxima. Absent for version 0.5 tables.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug)]
pub struct Maxima {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

/// A [Maximum Profile Table](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp).
#[derive(Clone, Copy, Debug)]
pub struct Table {
    /// Table version. 0x00005000 or 0x00010000; anything else is rejected.
    pub version: u32,
    /// The number of glyphs in the font.
    pub number_of_glyphs: u16,
    /// Version 1.0 maxima.
    pub maxima: Option<Maxima>,
}

impl Table {
    /// The `maxp` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"maxp");

    /// Parses a table from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        let version: u32 = s.read()?;
        if version != VERSION_0_5 && version != VERSION_1_0 {
            return Err(ParseError::UnsupportedTableVersion(Self::TAG, version));
        }

        let number_of_glyphs: u16 = s.read()?;

        // Version 0.5 ends after numGlyphs.
        let maxima = if version == VERSION_1_0 {
            Some(Maxima {
                max_points: s.read()?,
                max_contours: s.read()?,
                max_composite_points: s.read()?,
                max_composite_contours: s.read()?,
                max_zones: s.read()?,
                max_twilight_points: s.read()?,
                max_storage: s.read()?,
                max_function_defs: s.read()?,
                max_instruction_defs: s.read()?,
                max_stack_elements: s.read()?,
                max_size_of_instructions: s.read()?,
                max_component_elements: s.read()?,
                max_component_depth: s.read()?,
            })
        } else {
            None
        };

        Ok(Table { version, number_of_glyphs, maxima })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_0_5() {
        let data = &[
            0x00, 0x00, 0x50, 0x00, // version: 0.5
            0x00, 0x07, // numGlyphs: 7
        ];
        let table = Table::parse(data).unwrap();
        assert_eq!(table.number_of_glyphs, 7);
        assert!(table.maxima.is_none());
    }

    #[test]
    fn version_1_0() {
        let mut data = vec![
            0x00, 0x01, 0x00, 0x00, // version: 1.0
            0x01, 0x00, // numGlyphs: 256
        ];
        for n in 1u16..=13 {
            data.extend_from_slice(&n.to_be_bytes());
        }
        let table = Table::parse(&data).unwrap();
        assert_eq!(table.number_of_glyphs, 256);
        let maxima = table.maxima.unwrap();
        assert_eq!(maxima.max_points, 1);
        assert_eq!(maxima.max_component_depth, 13);
    }

    #[test]
    fn version_1_0_truncated_maxima() {
        let data = &[
            0x00, 0x01, 0x00, 0x00, // version: 1.0
            0x00, 0x07, // numGlyphs: 7
            0x00, 0x01, // maxPoints: 1, the rest is missing
        ];
        assert!(matches!(Table::parse(data), Err(ParseError::UnexpectedEof)));
    }

    #[test]
    fn unknown_version() {
        let data = &[
            0x00, 0x02, 0x00, 0x00, // version: 2.0
            0x00, 0x07, // numGlyphs: 7
        ];
        assert!(matches!(
            Table::parse(data),
            Err(ParseError::UnsupportedTableVersion(_, 0x00020000))
        ));
    }
}
