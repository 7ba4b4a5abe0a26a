//! A [Glyph Data Table](
//! https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) implementation.

use log::warn;

use crate::parser::{Stream, F2DOT14};
use crate::tables::loca;
use crate::{GlyphId, ParseError, Rect, Tag};

// Not defined by the spec; far beyond anything real fonts nest.
const MAX_COMPONENT_DEPTH: u8 = 32;

/// A contour point in font-design units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i16,
    /// Vertical coordinate.
    pub y: i16,
}

/// A closed contour. After decoding, on- and off-curve points strictly
/// alternate and the first point is on-curve.
pub type Contour = Vec<Point>;

/// The per-glyph header: contour count and bounding box.
#[derive(Clone, Copy, Debug)]
pub struct GlyphHeader {
    /// Non-negative for simple glyphs, negative for composite ones.
    pub number_of_contours: i16,
    /// The glyph bounding box.
    pub bbox: Rect,
}

// https://docs.microsoft.com/en-us/typography/opentype/spec/glyf#simple-glyph-description
#[derive(Clone, Copy)]
struct SimpleGlyphFlags(u8);

#[rustfmt::skip]
impl SimpleGlyphFlags {
    #[inline] fn on_curve_point(self) -> bool { self.0 & 0x01 != 0 }
    #[inline] fn x_short(self) -> bool { self.0 & 0x02 != 0 }
    #[inline] fn y_short(self) -> bool { self.0 & 0x04 != 0 }
    #[inline] fn repeat_flag(self) -> bool { self.0 & 0x08 != 0 }
    #[inline] fn x_is_same_or_positive_short(self) -> bool { self.0 & 0x10 != 0 }
    #[inline] fn y_is_same_or_positive_short(self) -> bool { self.0 & 0x20 != 0 }
}

// https://docs.microsoft.com/en-us/typography/opentype/spec/glyf#composite-glyph-description
/// Composite component flags.
#[derive(Clone, Copy, Debug)]
pub struct ComponentFlags(pub u16);

#[rustfmt::skip]
#[allow(missing_docs)]
impl ComponentFlags {
    #[inline] pub fn arg_1_and_2_are_words(self) -> bool { self.0 & 0x0001 != 0 }
    #[inline] pub fn args_are_xy_values(self) -> bool { self.0 & 0x0002 != 0 }
    #[inline] pub fn we_have_a_scale(self) -> bool { self.0 & 0x0008 != 0 }
    #[inline] pub fn more_components(self) -> bool { self.0 & 0x0020 != 0 }
    #[inline] pub fn we_have_an_x_and_y_scale(self) -> bool { self.0 & 0x0040 != 0 }
    #[inline] pub fn we_have_a_two_by_two(self) -> bool { self.0 & 0x0080 != 0 }
}

/// A simple glyph description with its contours resolved.
#[derive(Clone, Debug)]
pub struct SimpleGlyph {
    /// The glyph header.
    pub header: GlyphHeader,
    /// Hinting byte code. Retained, never executed.
    pub instructions: Vec<u8>,
    /// The resolved contours.
    pub contours: Vec<Contour>,
}

/// A reference to a child glyph with an affine transform.
#[derive(Clone, Copy, Debug)]
pub struct Component {
    /// The child glyph index.
    pub glyph_id: GlyphId,
    /// The raw component flags.
    pub flags: ComponentFlags,
    /// Horizontal translation.
    pub dx: i16,
    /// Vertical translation.
    pub dy: i16,
    /// The 2x2 transform, stored exactly as read.
    pub x_scale: F2DOT14,
    /// See [`x_scale`](Self::x_scale).
    pub scale01: F2DOT14,
    /// See [`x_scale`](Self::x_scale).
    pub scale10: F2DOT14,
    /// See [`x_scale`](Self::x_scale).
    pub y_scale: F2DOT14,
}

impl Component {
    /// Applies the component transform to a child point.
    ///
    /// The scaled value is truncated back to font units before the
    /// translation is added.
    fn transform_point(&self, point: Point) -> Point {
        let x = f32::from(point.x);
        let y = f32::from(point.y);
        let scaled_x = self.x_scale.to_f32() * x + self.scale10.to_f32() * y;
        let scaled_y = self.scale01.to_f32() * x + self.y_scale.to_f32() * y;
        Point {
            x: (scaled_x as i16).wrapping_add(self.dx),
            y: (scaled_y as i16).wrapping_add(self.dy),
        }
    }
}

/// A composite glyph description.
#[derive(Clone, Debug)]
pub struct CompositeGlyph {
    /// The glyph header.
    pub header: GlyphHeader,
    /// The component records, in file order.
    pub components: Vec<Component>,
    /// The flattened contours, filled in after every slot has been parsed.
    pub contours: Vec<Contour>,
}

/// A single glyph slot.
#[derive(Clone, Debug)]
pub enum Glyph {
    /// A glyph without an outline, e.g. the space glyph.
    Empty,
    /// A simple glyph.
    Simple(SimpleGlyph),
    /// A composite glyph.
    Composite(CompositeGlyph),
}

impl Glyph {
    /// The glyph header. Empty slots have none.
    pub fn header(&self) -> Option<&GlyphHeader> {
        match self {
            Glyph::Empty => None,
            Glyph::Simple(glyph) => Some(&glyph.header),
            Glyph::Composite(glyph) => Some(&glyph.header),
        }
    }

    /// The resolved contours. Empty slots have none.
    pub fn contours(&self) -> &[Contour] {
        match self {
            Glyph::Empty => &[],
            Glyph::Simple(glyph) => &glyph.contours,
            Glyph::Composite(glyph) => &glyph.contours,
        }
    }
}

/// A borrowed view over one glyph slot.
#[derive(Clone, Copy, Debug)]
pub struct GlyphView<'a> {
    /// The glyph header, if the slot has an outline description.
    pub header: Option<&'a GlyphHeader>,
    /// The resolved contour list.
    pub contours: &'a [Contour],
}

/// A [Glyph Data Table](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf).
///
/// Every slot is decoded up front and composite glyphs are flattened before
/// the table is handed out, so lookups never touch the raw file.
#[derive(Clone, Debug)]
pub struct Table {
    glyphs: Vec<Glyph>,
}

impl Table {
    /// The `glyf` table tag.
    pub const TAG: Tag = Tag::from_bytes(b"glyf");

    /// Parses a table from raw data.
    ///
    /// A glyph whose description is malformed degrades to an empty slot with
    /// a warning; the rest of the table stays usable. A glyph region
    /// reaching outside the table and a cyclic component graph are fatal.
    pub fn parse(data: &[u8], loca: &loca::Table) -> Result<Self, ParseError> {
        let count = loca.len().saturating_sub(1);
        let mut glyphs = Vec::with_capacity(count);
        for id in 0..count {
            // 'If a glyph has no outline, then loca[n] = loca[n+1].'
            let glyph = match loca.glyph_range(GlyphId(id as u16)) {
                Some(range) => {
                    let glyph_data = data
                        .get(range)
                        .ok_or(ParseError::TableOutOfBounds(Self::TAG))?;
                    match parse_glyph(id, glyph_data) {
                        Ok(glyph) => glyph,
                        Err(error) => {
                            warn!("glyph {} is malformed ({}), degraded to empty", id, error);
                            Glyph::Empty
                        }
                    }
                }
                None => Glyph::Empty,
            };
            glyphs.push(glyph);
        }

        let mut table = Table { glyphs };
        table.flatten_composites()?;
        Ok(table)
    }

    /// The number of glyph slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Checks that the table has no glyphs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Returns the slot for `glyph_id`.
    pub fn get(&self, glyph_id: GlyphId) -> Option<GlyphView> {
        let glyph = self.glyphs.get(usize::from(glyph_id.0))?;
        Some(GlyphView {
            header: glyph.header(),
            contours: glyph.contours(),
        })
    }

    /// Flattens every composite glyph into plain contours.
    ///
    /// Children are resolved first, then each child contour is transformed
    /// and appended. Re-entering a glyph that is still being flattened means
    /// the component graph has a cycle, which is a malformed font.
    fn flatten_composites(&mut self) -> Result<(), ParseError> {
        let mut done = vec![false; self.glyphs.len()];
        let mut visiting = vec![false; self.glyphs.len()];
        for id in 0..self.glyphs.len() {
            self.flatten(id, 0, &mut done, &mut visiting)?;
        }
        Ok(())
    }

    fn flatten(
        &mut self,
        id: usize,
        depth: u8,
        done: &mut [bool],
        visiting: &mut [bool],
    ) -> Result<(), ParseError> {
        if done[id] {
            return Ok(());
        }

        let components = match &self.glyphs[id] {
            Glyph::Composite(glyph) => glyph.components.clone(),
            _ => {
                done[id] = true;
                return Ok(());
            }
        };

        if depth >= MAX_COMPONENT_DEPTH {
            warn!("glyph {} nests deeper than {} components, degraded to empty", id, MAX_COMPONENT_DEPTH);
            self.glyphs[id] = Glyph::Empty;
            done[id] = true;
            return Ok(());
        }

        visiting[id] = true;
        let mut contours = Vec::new();
        let mut valid = true;
        for component in &components {
            let child = usize::from(component.glyph_id.0);
            if child >= self.glyphs.len() {
                warn!("glyph {} references nonexistent glyph {}, degraded to empty", id, child);
                valid = false;
                break;
            }
            if visiting[child] {
                return Err(ParseError::CyclicComponentGraph(component.glyph_id));
            }

            self.flatten(child, depth + 1, done, visiting)?;
            for contour in self.glyphs[child].contours() {
                contours.push(
                    contour
                        .iter()
                        .map(|&point| component.transform_point(point))
                        .collect(),
                );
            }
        }
        visiting[id] = false;
        done[id] = true;

        if valid {
            if let Glyph::Composite(glyph) = &mut self.glyphs[id] {
                glyph.contours = contours;
            }
        } else {
            self.glyphs[id] = Glyph::Empty;
        }

        Ok(())
    }
}

fn parse_glyph(id: usize, data: &[u8]) -> Result<Glyph, ParseError> {
    let mut s = Stream::new(data);
    let number_of_contours: i16 = s.read()?;
    let x_min: i16 = s.read()?;
    let y_min: i16 = s.read()?;
    let x_max: i16 = s.read()?;
    let y_max: i16 = s.read()?;
    let header = GlyphHeader {
        number_of_contours,
        bbox: Rect { x_min, y_min, x_max, y_max },
    };

    if number_of_contours >= 0 {
        parse_simple_glyph(header, &mut s)
    } else {
        parse_composite_glyph(id, header, &mut s)
    }
}

fn parse_simple_glyph(header: GlyphHeader, s: &mut Stream) -> Result<Glyph, ParseError> {
    // 'If a glyph has zero contours, no additional glyph data is required.'
    if header.number_of_contours == 0 {
        return Ok(Glyph::Simple(SimpleGlyph {
            header,
            instructions: Vec::new(),
            contours: Vec::new(),
        }));
    }

    let contour_ends = s.read_vec::<u16>(header.number_of_contours as usize)?;
    if !contour_ends.windows(2).all(|pair| pair[0] <= pair[1]) {
        return Err(ParseError::MalformedTable(Table::TAG));
    }

    // 'The number of points is determined by the last entry in the
    // endPtsOfContours array.'
    let last = contour_ends.last().copied().unwrap_or(0);
    let total_points = usize::from(last) + 1;

    let instructions_len: u16 = s.read()?;
    let instructions = s.read_bytes(usize::from(instructions_len))?.to_vec();

    let mut flags = Vec::with_capacity(total_points);
    while flags.len() < total_points {
        let flag = SimpleGlyphFlags(s.read::<u8>()?);
        flags.push(flag);
        if flag.repeat_flag() {
            let repeats: u8 = s.read()?;
            for _ in 0..repeats {
                flags.push(flag);
            }
        }
    }
    if flags.len() > total_points {
        return Err(ParseError::MalformedTable(Table::TAG));
    }

    let xs = read_coordinates(s, &flags, |flag| {
        (flag.x_short(), flag.x_is_same_or_positive_short())
    })?;
    let ys = read_coordinates(s, &flags, |flag| {
        (flag.y_short(), flag.y_is_same_or_positive_short())
    })?;

    let points: Vec<(Point, bool)> = (0..total_points)
        .map(|i| (Point { x: xs[i], y: ys[i] }, flags[i].on_curve_point()))
        .collect();

    let mut contours = Vec::with_capacity(contour_ends.len());
    let mut start = 0;
    for &end in &contour_ends {
        let end = usize::from(end);
        contours.push(insert_midpoints(&points[start..=end]));
        start = end + 1;
    }

    Ok(Glyph::Simple(SimpleGlyph { header, instructions, contours }))
}

/// Decodes one delta-compressed coordinate stream.
///
/// The flag projection returns the (short vector, same-or-positive) pair for
/// the axis being decoded. The decoded coordinate is the running sum of
/// deltas, starting at 0.
fn read_coordinates(
    s: &mut Stream,
    flags: &[SimpleGlyphFlags],
    projection: impl Fn(SimpleGlyphFlags) -> (bool, bool),
) -> Result<Vec<i16>, ParseError> {
    let mut coordinate = 0i16;
    let mut coordinates = Vec::with_capacity(flags.len());
    for &flag in flags {
        let delta = match projection(flag) {
            (true, true) => i16::from(s.read::<u8>()?),
            (true, false) => -i16::from(s.read::<u8>()?),
            // Keep the previous coordinate.
            (false, true) => 0,
            (false, false) => s.read::<i16>()?,
        };
        coordinate = coordinate.wrapping_add(delta);
        coordinates.push(coordinate);
    }
    Ok(coordinates)
}

/// Resolves the implied control points of one contour.
///
/// Repeated on- or off-curve characteristics imply a point with the opposite
/// characteristic at the midpoint, so after insertion the classifications
/// strictly alternate. The contour is rotated once if needed so that it
/// starts with an on-curve point.
fn insert_midpoints(ring: &[(Point, bool)]) -> Contour {
    let mut contour = Vec::with_capacity(ring.len() * 2);
    let mut rotate = false;
    for (i, &(point, on_curve)) in ring.iter().enumerate() {
        let previous_index = if i == 0 { ring.len() - 1 } else { i - 1 };
        let (previous, previous_on_curve) = ring[previous_index];

        if on_curve == previous_on_curve {
            if contour.is_empty() {
                // The midpoint has the opposite classification.
                rotate = on_curve;
            }
            contour.push(midpoint(previous, point));
        }
        if contour.is_empty() {
            rotate = !on_curve;
        }
        contour.push(point);
    }

    if rotate {
        contour.rotate_left(1);
    }
    contour
}

#[inline]
fn midpoint(a: Point, b: Point) -> Point {
    // Truncating integer arithmetic.
    Point {
        x: ((i32::from(a.x) + i32::from(b.x)) / 2) as i16,
        y: ((i32::from(a.y) + i32::from(b.y)) / 2) as i16,
    }
}

fn parse_composite_glyph(
    id: usize,
    header: GlyphHeader,
    s: &mut Stream,
) -> Result<Glyph, ParseError> {
    let mut components = Vec::new();
    loop {
        let flags = ComponentFlags(s.read::<u16>()?);
        let glyph_id: GlyphId = s.read()?;

        if !flags.args_are_xy_values() {
            // The arguments are point-alignment indices, which cannot be
            // honored once the child contours have been resolved.
            warn!("glyph {} anchors a component by point alignment, which is not supported", id);
            return Ok(Glyph::Empty);
        }

        let (dx, dy) = if flags.arg_1_and_2_are_words() {
            (s.read::<i16>()?, s.read::<i16>()?)
        } else {
            let args: u16 = s.read()?;
            (i16::from((args >> 8) as i8), i16::from(args as i8))
        };

        let mut x_scale = F2DOT14(0x4000); // 1.0
        let mut y_scale = F2DOT14(0x4000);
        let mut scale01 = F2DOT14(0);
        let mut scale10 = F2DOT14(0);
        if flags.we_have_a_scale() {
            let scale: F2DOT14 = s.read()?;
            x_scale = scale;
            y_scale = scale;
        } else if flags.we_have_an_x_and_y_scale() {
            x_scale = s.read()?;
            y_scale = s.read()?;
        } else if flags.we_have_a_two_by_two() {
            x_scale = s.read()?;
            scale01 = s.read()?;
            scale10 = s.read()?;
            y_scale = s.read()?;
        }

        components.push(Component {
            glyph_id,
            flags,
            dx,
            dy,
            x_scale,
            scale01,
            scale10,
            y_scale,
        });

        if !flags.more_components() {
            break;
        }
    }

    Ok(Glyph::Composite(CompositeGlyph {
        header,
        components,
        contours: Vec::new(),
    }))
}
