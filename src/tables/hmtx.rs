//! A [Horizontal Metrics Table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) implementation.

use crate::parser::{FromData, Stream};
use crate::{GlyphId, ParseError, Tag};

/// A full horizontal metrics record.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Metrics {
    /// Distance from the glyph origin to the next glyph origin.
    pub advance_width: u16,
    /// Left side bearing.
    pub lsb: i16,
}

impl FromData for Metrics {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        Metrics {
            advance_width: u16::parse(&data[0..2]),
            lsb: i16::parse(&data[2..4]),
        }
    }
}

/// A [Horizontal Metrics Table](
/// https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx).
#[derive(Clone, Debug)]
pub struct Table {
    metrics: Vec<Metrics>,
    bearings: Vec<i16>,
}

impl Table {
    /// The `hmtx` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"hmtx");

    /// Parses a table from raw data.
    ///
    /// `number_of_h_metrics` comes from `hhea`, `number_of_glyphs` from `maxp`.
    pub fn parse(
        data: &[u8],
        number_of_h_metrics: u16,
        number_of_glyphs: u16,
    ) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        let metrics = s.read_vec::<Metrics>(usize::from(number_of_h_metrics))?;

        // 'If the number of hMetrics is less than the total number of glyphs,
        // then that array is followed by an array for the left side bearing
        // values of the remaining glyphs.'
        //
        // The count saturates: a font claiming more hMetrics than glyphs
        // simply has no bearing tail.
        let tail = number_of_glyphs.saturating_sub(number_of_h_metrics);
        let bearings = s.read_vec::<i16>(usize::from(tail))?;

        Ok(Table { metrics, bearings })
    }

    /// Returns the metrics for a glyph.
    ///
    /// Glyphs past `numberOfHMetrics` share the advance width of the last
    /// full record and carry only a bearing of their own.
    pub fn metrics(&self, glyph_id: GlyphId) -> Option<Metrics> {
        let index = usize::from(glyph_id.0);
        if let Some(metrics) = self.metrics.get(index) {
            return Some(*metrics);
        }

        let lsb = *self.bearings.get(index.checked_sub(self.metrics.len())?)?;
        // 'As an optimization, the number of records can be less than the
        // number of glyphs, in which case the advance width value of the last
        // record applies to all remaining glyph IDs.'
        let advance_width = self.metrics.last()?.advance_width;
        Some(Metrics { advance_width, lsb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_case() {
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
        ];
        let table = Table::parse(data, 1, 1).unwrap();
        assert_eq!(table.metrics(GlyphId(0)), Some(Metrics { advance_width: 1, lsb: 2 }));
    }

    #[test]
    fn empty() {
        assert!(Table::parse(&[], 1, 1).is_err());
    }

    #[test]
    fn zero_metrics_parse() {
        // Degenerate but within bounds: nothing to read, nothing to answer.
        let table = Table::parse(&[], 0, 0).unwrap();
        assert_eq!(table.metrics(GlyphId(0)), None);
    }

    #[test]
    fn smaller_than_glyphs_count() {
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
            0x00, 0x03, // side bearing [1]: 3
        ];
        let table = Table::parse(data, 1, 2).unwrap();
        assert_eq!(table.metrics(GlyphId(0)), Some(Metrics { advance_width: 1, lsb: 2 }));
        assert_eq!(table.metrics(GlyphId(1)), Some(Metrics { advance_width: 1, lsb: 3 }));
    }

    #[test]
    fn metrics_count_larger_than_glyphs_count() {
        // The bearing tail length must saturate at zero, not underflow.
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
            0x00, 0x03, // advance width [1]: 3
            0x00, 0x04, // side bearing [1]: 4
        ];
        let table = Table::parse(data, 2, 1).unwrap();
        assert_eq!(table.metrics(GlyphId(0)), Some(Metrics { advance_width: 1, lsb: 2 }));
        assert_eq!(table.metrics(GlyphId(1)), Some(Metrics { advance_width: 3, lsb: 4 }));
        assert_eq!(table.metrics(GlyphId(2)), None);
    }

    #[test]
    fn glyph_out_of_bounds_0() {
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
        ];
        let table = Table::parse(data, 1, 1).unwrap();
        assert_eq!(table.metrics(GlyphId(0)), Some(Metrics { advance_width: 1, lsb: 2 }));
        assert_eq!(table.metrics(GlyphId(1)), None);
    }

    #[test]
    fn glyph_out_of_bounds_1() {
        let data = &[
            0x00, 0x01, // advance width [0]: 1
            0x00, 0x02, // side bearing [0]: 2
            0x00, 0x03, // side bearing [1]: 3
        ];
        let table = Table::parse(data, 1, 2).unwrap();
        assert_eq!(table.metrics(GlyphId(1)), Some(Metrics { advance_width: 1, lsb: 3 }));
        assert_eq!(table.metrics(GlyphId(2)), None);
    }
}
