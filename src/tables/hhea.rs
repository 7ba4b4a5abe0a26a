//! A [Horizontal Header Table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) implementation.

use crate::parser::Stream;
use crate::{ParseError, Tag};

/// A [Horizontal Header Table](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea).
#[derive(Clone, Copy, Debug)]
pub struct Table {
    /// Major table version.
    pub major_version: u16,
    /// Minor table version.
    pub minor_version: u16,
    /// Typographic ascent.
    pub ascender: i16,
    /// Typographic descent.
    pub descender: i16,
    /// Typographic line gap.
    pub line_gap: i16,
    /// Maximum advance width in `hmtx`.
    pub advance_width_max: u16,
    /// Minimum left side bearing in `hmtx`.
    pub min_left_side_bearing: i16,
    /// Minimum right side bearing.
    pub min_right_side_bearing: i16,
    /// `max(lsb + (xMax - xMin))` over all glyphs.
    pub x_max_extent: i16,
    /// Caret slope rise. 1 for vertical carets.
    pub caret_slope_rise: i16,
    /// Caret slope run. 0 for vertical carets.
    pub caret_slope_run: i16,
    /// Caret offset for slanted fonts.
    pub caret_offset: i16,
    /// Metric data format. 0 for current use.
    pub metric_data_format: i16,
    /// The number of full records in `hmtx`.
    pub number_of_h_metrics: u16,
}

impl Table {
    /// The `hhea` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"hhea");

    /// Parses a table from raw data.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut s = Stream::new(data);
        let major_version: u16 = s.read()?;
        let minor_version: u16 = s.read()?;
        let ascender: i16 = s.read()?;
        let descender: i16 = s.read()?;
        let line_gap: i16 = s.read()?;
        let advance_width_max: u16 = s.read()?;
        let min_left_side_bearing: i16 = s.read()?;
        let min_right_side_bearing: i16 = s.read()?;
        let x_max_extent: i16 = s.read()?;
        let caret_slope_rise: i16 = s.read()?;
        let caret_slope_run: i16 = s.read()?;
        let caret_offset: i16 = s.read()?;
        s.advance(8); // reserved
        let metric_data_format: i16 = s.read()?;
        let number_of_h_metrics: u16 = s.read()?;

        Ok(Table {
            major_version,
            minor_version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format,
            number_of_h_metrics,
        })
    }
}
