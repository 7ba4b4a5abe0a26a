//! [Format 4: Segment mapping to delta values](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values).

use log::warn;

use crate::parser::Stream;
use crate::ParseError;

/// A Segment mapping to delta values table.
///
/// The four segment arrays are parallel; the glyph index array holds
/// whatever bytes remain of the subtable after them.
#[derive(Clone, Debug)]
pub struct Subtable {
    /// Language field. Relevant for Macintosh platform subtables only.
    pub language: u16,
    end_codes: Vec<u16>,
    start_codes: Vec<u16>,
    id_deltas: Vec<i16>,
    id_range_offsets: Vec<u16>,
    glyph_ids: Vec<u16>,
}

impl Subtable {
    /// Parses a subtable from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        s.skip::<u16>(); // format
        let length: u16 = s.read()?;
        let language: u16 = s.read()?;
        let seg_count_x2: u16 = s.read()?;
        if seg_count_x2 < 2 {
            return Err(ParseError::MalformedTable(super::Table::TAG));
        }

        let seg_count = usize::from(seg_count_x2 / 2);
        s.advance(6); // searchRange + entrySelector + rangeShift

        let end_codes = s.read_vec::<u16>(seg_count)?;
        s.skip::<u16>(); // reservedPad
        let start_codes = s.read_vec::<u16>(seg_count)?;
        let id_deltas = s.read_vec::<i16>(seg_count)?;
        let id_range_offsets = s.read_vec::<u16>(seg_count)?;

        // Whatever remains of the subtable is the glyph index array.
        let remaining = usize::from(length)
            .checked_sub(s.offset())
            .ok_or(ParseError::MalformedTable(super::Table::TAG))?;
        if remaining % 2 != 0 {
            return Err(ParseError::MalformedTable(super::Table::TAG));
        }
        let glyph_ids = s.read_vec::<u16>(remaining / 2)?;

        Ok(Subtable {
            language,
            end_codes,
            start_codes,
            id_deltas,
            id_range_offsets,
            glyph_ids,
        })
    }

    /// Maps a character to a glyph index.
    pub fn glyph_index(&self, code_point: u32) -> Option<u16> {
        // This subtable supports code points only in a u16 range.
        let code_point = u16::try_from(code_point).ok()?;

        // Binary search for the first segment with endCode >= c.
        let index = self.end_codes.partition_point(|&end| end < code_point);
        let start = *self.start_codes.get(index)?;
        if start > code_point {
            return None;
        }

        let id_delta = *self.id_deltas.get(index)?;
        let id_range_offset = *self.id_range_offsets.get(index)?;
        if id_range_offset == 0 {
            // The delta arithmetic is modulo 65536.
            return Some(code_point.wrapping_add(id_delta as u16));
        }

        // The spec phrases the lookup as pointer arithmetic relative to the
        // idRangeOffset slot; with the arrays unpacked it becomes an index
        // into the glyph array:
        //     idRangeOffset / 2 + (c - startCode) + (segment - segCount)
        let relative = i64::from(id_range_offset / 2) + i64::from(code_point - start)
            + index as i64
            - self.end_codes.len() as i64;
        let glyph_id = match usize::try_from(relative).ok().and_then(|i| self.glyph_ids.get(i)) {
            Some(id) => *id,
            None => {
                warn!(
                    "cmap format 4 glyph array access out of bounds \
                     (code point {:#06X}, index {})",
                    code_point, relative
                );
                return None;
            }
        };

        // 0 indicates a missing glyph.
        if glyph_id == 0 {
            return None;
        }

        Some(glyph_id.wrapping_add(id_delta as u16))
    }
}
