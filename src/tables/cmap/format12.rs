//! [Format 12: Segmented coverage](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-12-segmented-coverage).

use crate::parser::{FromData, Stream};
use crate::ParseError;

/// A range of sequential character codes mapped to sequential glyph ids.
#[derive(Clone, Copy, Debug)]
pub struct SequentialMapGroup {
    /// First character code of the group.
    pub start_char_code: u32,
    /// Last character code of the group, inclusive.
    pub end_char_code: u32,
    /// Glyph index of `start_char_code`.
    pub start_glyph_id: u32,
}

impl FromData for SequentialMapGroup {
    const SIZE: usize = 12;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        SequentialMapGroup {
            start_char_code: u32::parse(&data[0..4]),
            end_char_code: u32::parse(&data[4..8]),
            start_glyph_id: u32::parse(&data[8..12]),
        }
    }
}

/// A Segmented coverage table.
#[derive(Clone, Debug)]
pub struct Subtable {
    /// Language field. Relevant for Macintosh platform subtables only.
    pub language: u32,
    groups: Vec<SequentialMapGroup>,
}

impl Subtable {
    /// Parses a subtable from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        s.skip::<u16>(); // format
        s.skip::<u16>(); // reserved
        s.skip::<u32>(); // length
        let language: u32 = s.read()?;
        let count: u32 = s.read()?;
        let groups = s.read_vec::<SequentialMapGroup>(count as usize)?;
        Ok(Subtable { language, groups })
    }

    /// Maps a character to a glyph index.
    ///
    /// The groups are sorted by character code, so a binary search is used.
    pub fn glyph_index(&self, code_point: u32) -> Option<u16> {
        let index = self
            .groups
            .partition_point(|group| group.end_char_code < code_point);
        let group = self.groups.get(index)?;
        if group.start_char_code > code_point {
            return None;
        }

        let glyph_id = group
            .start_glyph_id
            .checked_add(code_point - group.start_char_code)?;
        u16::try_from(glyph_id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtable(groups: &[(u32, u32, u32)]) -> Subtable {
        let mut data = vec![
            0x00, 0x0C, // format: 12
            0x00, 0x00, // reserved
        ];
        data.extend_from_slice(&(16 + 12 * groups.len() as u32).to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes()); // language
        data.extend_from_slice(&(groups.len() as u32).to_be_bytes());
        for (start, end, glyph) in groups {
            data.extend_from_slice(&start.to_be_bytes());
            data.extend_from_slice(&end.to_be_bytes());
            data.extend_from_slice(&glyph.to_be_bytes());
        }
        Subtable::parse(&data).unwrap()
    }

    #[test]
    fn single_group() {
        let subtable = subtable(&[(0x41, 0x45, 10)]);
        assert_eq!(subtable.glyph_index(0x40), None);
        assert_eq!(subtable.glyph_index(0x41), Some(10));
        assert_eq!(subtable.glyph_index(0x45), Some(14));
        assert_eq!(subtable.glyph_index(0x46), None);
    }

    #[test]
    fn group_round_trip() {
        let groups = [(0x20u32, 0x7Eu32, 1u32), (0x410, 0x44F, 100), (0x1F600, 0x1F64F, 200)];
        let subtable = subtable(&groups);
        for (start, end, glyph) in groups {
            for code_point in start..=end {
                assert_eq!(
                    subtable.glyph_index(code_point),
                    Some((glyph + (code_point - start)) as u16)
                );
            }
        }
    }

    #[test]
    fn between_groups() {
        let subtable = subtable(&[(0x41, 0x45, 10), (0x50, 0x55, 20)]);
        assert_eq!(subtable.glyph_index(0x46), None);
        assert_eq!(subtable.glyph_index(0x4F), None);
        assert_eq!(subtable.glyph_index(0x50), Some(20));
    }

    #[test]
    fn no_groups() {
        let subtable = subtable(&[]);
        assert_eq!(subtable.glyph_index(0x41), None);
    }

    #[test]
    fn glyph_id_overflow() {
        // The resulting glyph id must fit u16.
        let subtable = subtable(&[(0x41, 0x45, 0xFFFF)]);
        assert_eq!(subtable.glyph_index(0x41), Some(0xFFFF));
        assert_eq!(subtable.glyph_index(0x42), None);
    }

    #[test]
    fn truncated_groups() {
        let data = &[
            0x00, 0x0C, // format: 12
            0x00, 0x00, // reserved
            0x00, 0x00, 0x00, 0x1C, // length: 28
            0x00, 0x00, 0x00, 0x00, // language
            0x00, 0x00, 0x00, 0x01, // numGroups: 1
            0x00, 0x00, 0x00, 0x41, // startCharCode: 65, the rest is missing
        ];
        assert!(matches!(
            Subtable::parse(data),
            Err(ParseError::UnexpectedEof)
        ));
    }
}
