//! Parsing and writing of the `glyf` table.
//!
//! > This table contains information that describes the glyphs in the font in the TrueType outline
//! > format.
//!
//! — <https://docs.microsoft.com/en-us/typography/opentype/spec/glyf>

use std::convert::TryFrom;
use std::iter;

use bitflags::bitflags;
use itertools::Itertools;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadFrom};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext};
use crate::binary::{long_align, I16Be, U16Be, I8, U8};
use crate::error::{ParseError, WriteError};
use crate::tables::loca::{owned, LocaTable};
use crate::tables::F2Dot14;

bitflags! {
    #[rustfmt::skip]
    pub struct SimpleGlyphFlag: u8 {
        const ON_CURVE_POINT                       = 0b0000_0001;
        const X_SHORT_VECTOR                       = 0b0000_0010;
        const Y_SHORT_VECTOR                       = 0b0000_0100;
        const REPEAT_FLAG                          = 0b0000_1000;
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0b0001_0000;
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0b0010_0000;
        const OVERLAP_SIMPLE                       = 0b0100_0000;
    }
}

bitflags! {
    pub struct CompositeGlyphFlag: u16 {
        /// Bit 0: If this is set, the arguments are 16-bit (uint16 or int16); otherwise, they are
        /// bytes (uint8 or int8).
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// Bit 1: If this is set, the arguments are signed xy values; otherwise, they are unsigned
        /// point numbers.
        const ARGS_ARE_XY_VALUES = 0x0002;
        /// Bit 2: For the xy values if the preceding is true.
        const ROUND_XY_TO_GRID = 0x0004;
        /// Bit 3: This indicates that there is a simple scale for the component. Otherwise, scale = 1.0.
        const WE_HAVE_A_SCALE = 0x0008;
        /// Bit 5: Indicates at least one more glyph after this one.
        const MORE_COMPONENTS = 0x0020;
        /// Bit 6: The x direction will use a different scale from the y direction.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// Bit 7: There is a 2 by 2 transformation that will be used to scale the component.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Bit 8: Following the last component are instructions for the composite character.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        /// Bit 9: If set, this forces the aw and lsb (and rsb) for the composite to be equal to
        /// those from this original glyph.
        const USE_MY_METRICS = 0x0200;
        /// Bit 10: If set, the components of the compound glyph overlap.
        const OVERLAP_COMPOUND = 0x0400;
        /// Bit 11: The composite is designed to have the component offset scaled.
        const SCALED_COMPONENT_OFFSET = 0x0800;
        /// Bit 12: The composite is designed not to have the component offset scaled.
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
        // Bits 4, 13, 14 and 15 are reserved: set to 0.
    }
}

/// `glyf` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/glyf>
#[derive(Debug, PartialEq)]
pub struct GlyfTable<'a> {
    pub records: Vec<GlyfRecord<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum GlyfRecord<'a> {
    Empty,
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

#[derive(Debug, PartialEq, Clone)]
pub struct SimpleGlyph<'a> {
    pub bounding_box: BoundingBox,
    pub end_pts_of_contours: Vec<u16>,
    pub instructions: &'a [u8],
    /// Flags and absolute coordinates, one entry per outline point.
    pub coordinates: Vec<(SimpleGlyphFlag, Point)>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CompositeGlyph<'a> {
    pub bounding_box: BoundingBox,
    pub glyphs: Vec<CompositeGlyphComponent>,
    pub instructions: &'a [u8],
}

#[derive(Debug, PartialEq, Clone)]
pub struct CompositeGlyphComponent {
    pub flags: CompositeGlyphFlag,
    pub glyph_index: u16,
    pub argument1: CompositeGlyphArgument,
    pub argument2: CompositeGlyphArgument,
    pub scale: Option<CompositeGlyphScale>,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum CompositeGlyphArgument {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum CompositeGlyphScale {
    Scale(F2Dot14),
    XY { x_scale: F2Dot14, y_scale: F2Dot14 },
    Matrix([[F2Dot14; 2]; 2]),
}

/// The component records of a composite glyph, without its bounding box or instructions.
pub struct CompositeGlyphs {
    pub glyphs: Vec<CompositeGlyphComponent>,
    pub have_instructions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point(pub i16, pub i16);

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct BoundingBox {
    pub x_min: i16,
    pub x_max: i16,
    pub y_min: i16,
    pub y_max: i16,
}

impl<'a> ReadBinaryDep<'a> for GlyfTable<'a> {
    type Args = &'a LocaTable<'a>;
    type HostType = GlyfTable<'a>;

    fn read_dep(ctxt: &mut ReadCtxt<'a>, loca: Self::Args) -> Result<Self::HostType, ParseError> {
        if loca.offsets.len() < 2 {
            return Err(ParseError::BadIndex);
        }

        let records = loca
            .offsets
            .iter()
            .tuple_windows()
            .map(|(start, end)| match end.checked_sub(start) {
                Some(0) => Ok(GlyfRecord::Empty),
                Some(length) => {
                    let offset = usize::try_from(start)?;
                    let scope = ctxt
                        .scope()
                        .offset_length(offset, usize::try_from(length)?)?;
                    scope.read::<GlyfRecord<'_>>()
                }
                None => Err(ParseError::BadOffset),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GlyfTable { records })
    }
}

impl<'a> WriteBinaryDep<Self> for GlyfTable<'a> {
    type Output = owned::LocaTable;
    type Args = ();

    /// Write this glyf table into `ctxt`.
    ///
    /// Each glyph is written 32-bit aligned; the returned loca offsets record the
    /// pre-padding positions, so the short loca format is always usable when the
    /// offsets fit.
    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        table: GlyfTable<'a>,
        (): (),
    ) -> Result<Self::Output, WriteError> {
        let mut offsets: Vec<u32> = Vec::with_capacity(table.records.len() + 1);

        let start = ctxt.bytes_written();
        for record in table.records {
            offsets.push(u32::try_from(ctxt.bytes_written() - start)?);
            GlyfRecord::write(ctxt, record)?;

            let length = ctxt.bytes_written() - start;
            ctxt.write_zeros(long_align(length) - length)?;
        }

        // Add the final loca entry
        offsets.push(u32::try_from(ctxt.bytes_written() - start)?);

        Ok(owned::LocaTable { offsets })
    }
}

impl<'a> ReadBinary<'a> for GlyfRecord<'a> {
    type HostType = GlyfRecord<'a>;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType, ParseError> {
        let number_of_contours = ctxt.read_i16be()?;

        if number_of_contours >= 0 {
            // Cast is safe as we've checked the value is positive above
            let glyph = ctxt.read_dep::<SimpleGlyph<'_>>(number_of_contours as u16)?;
            Ok(GlyfRecord::Simple(glyph))
        } else {
            let glyph = ctxt.read::<CompositeGlyph<'_>>()?;
            Ok(GlyfRecord::Composite(glyph))
        }
    }
}

impl<'a> WriteBinary for GlyfRecord<'a> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, record: GlyfRecord<'a>) -> Result<(), WriteError> {
        match record {
            GlyfRecord::Empty => Ok(()),
            GlyfRecord::Simple(glyph) => SimpleGlyph::write(ctxt, glyph),
            GlyfRecord::Composite(glyph) => CompositeGlyph::write(ctxt, glyph),
        }
    }
}

impl<'a> SimpleGlyph<'a> {
    pub fn number_of_contours(&self) -> i16 {
        self.end_pts_of_contours.len() as i16
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.coordinates.iter().map(|(_flag, point)| *point))
    }
}

impl<'a> ReadBinaryDep<'a> for SimpleGlyph<'a> {
    type Args = u16;
    type HostType = SimpleGlyph<'a>;

    fn read_dep(
        ctxt: &mut ReadCtxt<'a>,
        number_of_contours: u16,
    ) -> Result<Self::HostType, ParseError> {
        let number_of_contours = usize::from(number_of_contours);
        let bounding_box = ctxt.read::<BoundingBox>()?;
        let end_pts_of_contours = ctxt.read_array::<U16Be>(number_of_contours)?.to_vec();
        let instruction_length = ctxt.read::<U16Be>()?;
        let instructions = ctxt.read_slice(usize::from(instruction_length))?;
        // end_pts_of_contours stores the index of the end points.
        // Therefore the number of coordinates is the last index + 1
        let number_of_coordinates = end_pts_of_contours
            .last()
            .map_or(0, |&last| usize::from(last) + 1);

        // Read all the flags
        let mut coordinates = Vec::with_capacity(number_of_coordinates);
        while coordinates.len() < number_of_coordinates {
            let flag = ctxt.read::<SimpleGlyphFlag>()?;
            if flag.is_repeated() {
                let count = usize::from(ctxt.read::<U8>()?) + 1; // + 1 to include the current entry
                let repeat = iter::repeat((flag, Point::zero())).take(count);
                coordinates.extend(repeat)
            } else {
                coordinates.push((flag, Point::zero()));
            }
        }
        coordinates.truncate(number_of_coordinates);

        // Read the x coordinates as deltas
        for (flag, Point(x, _y)) in coordinates.iter_mut() {
            *x = if flag.x_is_short() {
                ctxt.read::<U8>()
                    .map(|val| i16::from(val) * flag.x_short_sign())?
            } else if flag.x_is_same_or_positive() {
                0
            } else {
                ctxt.read::<I16Be>()?
            }
        }

        // Read y coordinate deltas, resolving the deltas into absolute values in
        // `coordinates` as we go. The first delta is implicitly against (0, 0).
        let mut prev_point = Point::zero();
        for (flag, point) in coordinates.iter_mut() {
            let y = if flag.y_is_short() {
                ctxt.read::<U8>()
                    .map(|val| i16::from(val) * flag.y_short_sign())?
            } else if flag.y_is_same_or_positive() {
                0
            } else {
                ctxt.read::<I16Be>()?
            };

            prev_point = Point(
                prev_point.0.wrapping_add(point.0),
                prev_point.1.wrapping_add(y),
            );
            *point = prev_point
        }

        Ok(SimpleGlyph {
            bounding_box,
            end_pts_of_contours,
            instructions,
            coordinates,
        })
    }
}

impl<'a> WriteBinary for SimpleGlyph<'a> {
    type Output = ();

    /// Writes the glyph in the canonical compact form: flags are recomputed from the
    /// deltas (short vectors, same/positive elision) and run-length compressed with
    /// the repeat flag.
    fn write<C: WriteContext>(ctxt: &mut C, glyph: SimpleGlyph<'_>) -> Result<(), WriteError> {
        I16Be::write(ctxt, glyph.number_of_contours())?;
        BoundingBox::write(ctxt, glyph.bounding_box)?;
        ctxt.write_vec::<U16Be, _>(glyph.end_pts_of_contours)?;
        U16Be::write(ctxt, u16::try_from(glyph.instructions.len())?)?;
        ctxt.write_bytes(glyph.instructions)?;

        let mut flags = Vec::with_capacity(glyph.coordinates.len());
        let mut x_coords = Vec::new();
        let mut y_coords = Vec::new();

        let mut prev = Point::zero();
        for (in_flag, point) in &glyph.coordinates {
            let dx = point.0.wrapping_sub(prev.0);
            let dy = point.1.wrapping_sub(prev.1);
            prev = *point;

            // ON_CURVE_POINT and OVERLAP_SIMPLE are the only input flags that carry
            // through, the rest are derived from the deltas.
            let mut flag = *in_flag
                & (SimpleGlyphFlag::ON_CURVE_POINT | SimpleGlyphFlag::OVERLAP_SIMPLE);

            if dx == 0 {
                flag |= SimpleGlyphFlag::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR;
            } else if dx.unsigned_abs() <= 255 {
                flag |= SimpleGlyphFlag::X_SHORT_VECTOR;
                if dx > 0 {
                    flag |= SimpleGlyphFlag::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR;
                }
                x_coords.push(dx.unsigned_abs() as u8);
            } else {
                x_coords.extend_from_slice(&dx.to_be_bytes());
            }

            if dy == 0 {
                flag |= SimpleGlyphFlag::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR;
            } else if dy.unsigned_abs() <= 255 {
                flag |= SimpleGlyphFlag::Y_SHORT_VECTOR;
                if dy > 0 {
                    flag |= SimpleGlyphFlag::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR;
                }
                y_coords.push(dy.unsigned_abs() as u8);
            } else {
                y_coords.extend_from_slice(&dy.to_be_bytes());
            }

            flags.push(flag.bits());
        }

        // Run-length compress the flags with REPEAT_FLAG. A count byte holds the
        // number of additional repetitions, so a run covers at most 256 points.
        let mut index = 0;
        while index < flags.len() {
            let flag = flags[index];
            let mut run = 1;
            while run < 256 && index + run < flags.len() && flags[index + run] == flag {
                run += 1;
            }
            if run > 1 {
                U8::write(ctxt, flag | SimpleGlyphFlag::REPEAT_FLAG.bits())?;
                U8::write(ctxt, (run - 1) as u8)?;
            } else {
                U8::write(ctxt, flag)?;
            }
            index += run;
        }

        ctxt.write_bytes(&x_coords)?;
        ctxt.write_bytes(&y_coords)?;

        Ok(())
    }
}

impl<'a> ReadFrom<'a> for SimpleGlyphFlag {
    type ReadType = U8;

    fn from(flag: u8) -> Self {
        SimpleGlyphFlag::from_bits_truncate(flag)
    }
}

impl<'a> ReadBinary<'a> for CompositeGlyphs {
    type HostType = Self;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let mut have_instructions = false;
        let mut glyphs = Vec::new();
        loop {
            let flags = ctxt.read::<CompositeGlyphFlag>()?;
            let data = ctxt.read_dep::<CompositeGlyphComponent>(flags)?;

            if flags.we_have_instructions() {
                have_instructions = true;
            }

            glyphs.push(data);

            if !flags.more_components() {
                break;
            }
        }

        Ok(CompositeGlyphs {
            glyphs,
            have_instructions,
        })
    }
}

impl<'a> ReadBinary<'a> for CompositeGlyph<'a> {
    type HostType = CompositeGlyph<'a>;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType, ParseError> {
        let bounding_box = ctxt.read::<BoundingBox>()?;
        let glyphs = ctxt.read::<CompositeGlyphs>()?;

        let instruction_length = if glyphs.have_instructions {
            usize::from(ctxt.read::<U16Be>()?)
        } else {
            0
        };
        let instructions = ctxt.read_slice(instruction_length)?;

        Ok(CompositeGlyph {
            bounding_box,
            glyphs: glyphs.glyphs,
            instructions,
        })
    }
}

impl<'a> WriteBinary for CompositeGlyph<'a> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, composite: Self) -> Result<Self::Output, WriteError> {
        I16Be::write(ctxt, -1_i16)?; // number_of_contours
        BoundingBox::write(ctxt, composite.bounding_box)?;
        let mut has_instructions = false;
        for glyph in composite.glyphs {
            has_instructions |= glyph.flags.we_have_instructions();
            CompositeGlyphComponent::write(ctxt, glyph)?;
        }
        if has_instructions {
            U16Be::write(ctxt, u16::try_from(composite.instructions.len())?)?;
            ctxt.write_bytes(composite.instructions)?;
        }
        Ok(())
    }
}

impl SimpleGlyphFlag {
    pub fn is_on_curve(self) -> bool {
        self & Self::ON_CURVE_POINT == Self::ON_CURVE_POINT
    }

    pub fn x_is_short(self) -> bool {
        self & Self::X_SHORT_VECTOR == Self::X_SHORT_VECTOR
    }

    pub fn y_is_short(self) -> bool {
        self & Self::Y_SHORT_VECTOR == Self::Y_SHORT_VECTOR
    }

    pub fn is_repeated(self) -> bool {
        self & Self::REPEAT_FLAG == Self::REPEAT_FLAG
    }

    pub fn x_short_sign(self) -> i16 {
        if self.x_is_same_or_positive() {
            1
        } else {
            -1
        }
    }

    pub fn y_short_sign(self) -> i16 {
        if self.y_is_same_or_positive() {
            1
        } else {
            -1
        }
    }

    pub fn x_is_same_or_positive(self) -> bool {
        self & Self::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR
            == Self::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR
    }

    pub fn y_is_same_or_positive(self) -> bool {
        self & Self::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR
            == Self::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR
    }
}

impl<'a> ReadFrom<'a> for CompositeGlyphFlag {
    type ReadType = U16Be;

    fn from(flag: u16) -> Self {
        CompositeGlyphFlag::from_bits_truncate(flag)
    }
}

impl<'a> ReadBinaryDep<'a> for CompositeGlyphArgument {
    type Args = CompositeGlyphFlag;
    type HostType = Self;

    fn read_dep(ctxt: &mut ReadCtxt<'a>, flags: Self::Args) -> Result<Self, ParseError> {
        let arg = match (flags.arg_1_and_2_are_words(), flags.args_are_xy_values()) {
            (true, true) => CompositeGlyphArgument::I16(ctxt.read_i16be()?),
            (true, false) => CompositeGlyphArgument::U16(ctxt.read_u16be()?),
            (false, true) => CompositeGlyphArgument::I8(ctxt.read_i8()?),
            (false, false) => CompositeGlyphArgument::U8(ctxt.read_u8()?),
        };

        Ok(arg)
    }
}

impl WriteBinary for CompositeGlyphArgument {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, arg: CompositeGlyphArgument) -> Result<(), WriteError> {
        match arg {
            CompositeGlyphArgument::U8(val) => U8::write(ctxt, val),
            CompositeGlyphArgument::I8(val) => I8::write(ctxt, val),
            CompositeGlyphArgument::U16(val) => U16Be::write(ctxt, val),
            CompositeGlyphArgument::I16(val) => I16Be::write(ctxt, val),
        }
    }
}

impl<'a> ReadBinaryDep<'a> for CompositeGlyphComponent {
    type Args = CompositeGlyphFlag;
    type HostType = Self;

    fn read_dep(ctxt: &mut ReadCtxt<'a>, flags: Self::Args) -> Result<Self, ParseError> {
        let glyph_index = ctxt.read_u16be()?;
        let argument1 = ctxt.read_dep::<CompositeGlyphArgument>(flags)?;
        let argument2 = ctxt.read_dep::<CompositeGlyphArgument>(flags)?;

        let scale = if flags.we_have_a_scale() {
            Some(CompositeGlyphScale::Scale(ctxt.read::<F2Dot14>()?))
        } else if flags.we_have_an_x_and_y_scale() {
            Some(CompositeGlyphScale::XY {
                x_scale: ctxt.read::<F2Dot14>()?,
                y_scale: ctxt.read::<F2Dot14>()?,
            })
        } else if flags.we_have_a_two_by_two() {
            Some(CompositeGlyphScale::Matrix([
                [ctxt.read::<F2Dot14>()?, ctxt.read::<F2Dot14>()?],
                [ctxt.read::<F2Dot14>()?, ctxt.read::<F2Dot14>()?],
            ]))
        } else {
            None
        };

        Ok(CompositeGlyphComponent {
            flags,
            glyph_index,
            argument1,
            argument2,
            scale,
        })
    }
}

impl WriteBinary for CompositeGlyphComponent {
    type Output = ();

    fn write<C: WriteContext>(
        ctxt: &mut C,
        glyph: CompositeGlyphComponent,
    ) -> Result<(), WriteError> {
        U16Be::write(ctxt, glyph.flags.bits())?;
        U16Be::write(ctxt, glyph.glyph_index)?;
        CompositeGlyphArgument::write(ctxt, glyph.argument1)?;
        CompositeGlyphArgument::write(ctxt, glyph.argument2)?;
        if let Some(scale) = glyph.scale {
            CompositeGlyphScale::write(ctxt, scale)?;
        }
        Ok(())
    }
}

impl WriteBinary for CompositeGlyphScale {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, scale: CompositeGlyphScale) -> Result<(), WriteError> {
        match scale {
            CompositeGlyphScale::Scale(scale) => F2Dot14::write(ctxt, scale)?,
            CompositeGlyphScale::XY { x_scale, y_scale } => {
                F2Dot14::write(ctxt, x_scale)?;
                F2Dot14::write(ctxt, y_scale)?;
            }
            CompositeGlyphScale::Matrix(matrix) => {
                F2Dot14::write(ctxt, matrix[0][0])?;
                F2Dot14::write(ctxt, matrix[0][1])?;
                F2Dot14::write(ctxt, matrix[1][0])?;
                F2Dot14::write(ctxt, matrix[1][1])?;
            }
        }

        Ok(())
    }
}

impl<'a> ReadFrom<'a> for BoundingBox {
    type ReadType = ((I16Be, I16Be), (I16Be, I16Be));

    fn from(((x_min, y_min), (x_max, y_max)): ((i16, i16), (i16, i16))) -> Self {
        BoundingBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

impl WriteBinary for BoundingBox {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, bbox: BoundingBox) -> Result<(), WriteError> {
        I16Be::write(ctxt, bbox.x_min)?;
        I16Be::write(ctxt, bbox.y_min)?;
        I16Be::write(ctxt, bbox.x_max)?;
        I16Be::write(ctxt, bbox.y_max)?;
        Ok(())
    }
}

impl<'a> GlyfTable<'a> {
    pub fn new(records: Vec<GlyfRecord<'a>>) -> Result<Self, ParseError> {
        if records.len() > usize::from(u16::MAX) {
            return Err(ParseError::LimitExceeded);
        }
        Ok(GlyfTable { records })
    }

    /// Returns the number of glyphs in this `glyf` table.
    pub fn num_glyphs(&self) -> u16 {
        // NOTE(cast): Safe as we check records length in `new`
        self.records.len() as u16
    }
}

impl<'a> GlyfRecord<'a> {
    pub fn number_of_contours(&self) -> i16 {
        match self {
            GlyfRecord::Empty => 0,
            GlyfRecord::Simple(glyph) => glyph.number_of_contours(),
            GlyfRecord::Composite(_) => -1,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, GlyfRecord::Composite(_))
    }

    /// Returns the bounding box of the glyph, `None` for an empty glyph.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            GlyfRecord::Empty => None,
            GlyfRecord::Simple(glyph) => Some(glyph.bounding_box),
            GlyfRecord::Composite(glyph) => Some(glyph.bounding_box),
        }
    }

    /// The glyph's `xMin`, with empty glyphs contributing zero.
    ///
    /// This value mirrors the left side bearing of a glyph that follows the
    /// TrueType design recommendations.
    pub fn x_min(&self) -> i16 {
        self.bounding_box().map_or(0, |bbox| bbox.x_min)
    }
}

impl CompositeGlyphFlag {
    pub fn arg_1_and_2_are_words(self) -> bool {
        self & Self::ARG_1_AND_2_ARE_WORDS == Self::ARG_1_AND_2_ARE_WORDS
    }

    pub fn args_are_xy_values(self) -> bool {
        self & Self::ARGS_ARE_XY_VALUES == Self::ARGS_ARE_XY_VALUES
    }

    pub fn we_have_a_scale(self) -> bool {
        self & Self::WE_HAVE_A_SCALE == Self::WE_HAVE_A_SCALE
    }

    pub fn we_have_an_x_and_y_scale(self) -> bool {
        self & Self::WE_HAVE_AN_X_AND_Y_SCALE == Self::WE_HAVE_AN_X_AND_Y_SCALE
    }

    pub fn we_have_a_two_by_two(self) -> bool {
        self & Self::WE_HAVE_A_TWO_BY_TWO == Self::WE_HAVE_A_TWO_BY_TWO
    }

    pub fn more_components(self) -> bool {
        self & Self::MORE_COMPONENTS == Self::MORE_COMPONENTS
    }

    pub fn we_have_instructions(self) -> bool {
        self & Self::WE_HAVE_INSTRUCTIONS == Self::WE_HAVE_INSTRUCTIONS
    }
}

impl Point {
    pub fn zero() -> Self {
        Point(0, 0)
    }
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox {
            x_min: 0,
            x_max: 0,
            y_min: 0,
            y_max: 0,
        }
    }

    /// Calculate xMin, xMax and yMin, yMax from a collection of `Points`
    ///
    /// Returns an empty bounding box if `points` yields nothing.
    pub fn from_points(points: impl Iterator<Item = Point>) -> Self {
        let mut points = points.peekable();

        let initial = match points.peek() {
            Some(&Point(x, y)) => BoundingBox {
                x_min: x,
                x_max: x,
                y_min: y,
                y_max: y,
            },
            None => return BoundingBox::empty(),
        };

        points.fold(initial, |mut bounding_box, Point(x, y)| {
            bounding_box.x_min = i16::min(x, bounding_box.x_min);
            bounding_box.x_max = i16::max(x, bounding_box.x_max);
            bounding_box.y_min = i16::min(y, bounding_box.y_min);
            bounding_box.y_max = i16::max(y, bounding_box.y_max);
            bounding_box
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::binary::write::WriteBuffer;
    use crate::tables::IndexToLocFormat;

    pub(crate) fn simple_glyph_fixture() -> SimpleGlyph<'static> {
        let on = SimpleGlyphFlag::ON_CURVE_POINT;
        let off = SimpleGlyphFlag::empty();
        SimpleGlyph {
            bounding_box: BoundingBox {
                x_min: 60,
                x_max: 915,
                y_min: -105,
                y_max: 702,
            },
            end_pts_of_contours: vec![4],
            instructions: &[1, 2, 3],
            coordinates: vec![
                (on, Point(433, 77)),
                (off, Point(499, 30)),
                (on, Point(625, 2)),
                (off, Point(756, -27)),
                (on, Point(60, 702)),
            ],
        }
    }

    pub(crate) fn composite_glyph_fixture(instructions: &'static [u8]) -> CompositeGlyph<'static> {
        CompositeGlyph {
            bounding_box: BoundingBox {
                x_min: 205,
                x_max: 4514,
                y_min: 0,
                y_max: 1434,
            },
            glyphs: vec![
                CompositeGlyphComponent {
                    flags: CompositeGlyphFlag::ARG_1_AND_2_ARE_WORDS
                        | CompositeGlyphFlag::ARGS_ARE_XY_VALUES
                        | CompositeGlyphFlag::ROUND_XY_TO_GRID
                        | CompositeGlyphFlag::MORE_COMPONENTS
                        | CompositeGlyphFlag::UNSCALED_COMPONENT_OFFSET,
                    glyph_index: 2,
                    argument1: CompositeGlyphArgument::I16(3453),
                    argument2: CompositeGlyphArgument::I16(0),
                    scale: None,
                },
                CompositeGlyphComponent {
                    flags: CompositeGlyphFlag::ARGS_ARE_XY_VALUES
                        | CompositeGlyphFlag::ROUND_XY_TO_GRID
                        | CompositeGlyphFlag::UNSCALED_COMPONENT_OFFSET
                        | CompositeGlyphFlag::WE_HAVE_INSTRUCTIONS,
                    glyph_index: 1,
                    argument1: CompositeGlyphArgument::I8(25),
                    argument2: CompositeGlyphArgument::I8(0),
                    scale: None,
                },
            ],
            instructions,
        }
    }

    #[test]
    fn test_point_bounding_box() {
        let points = [Point(1761, 565), Point(2007, 565), Point(1884, 1032)];

        let expected = BoundingBox {
            x_min: 1761,
            y_min: 565,
            x_max: 2007,
            y_max: 1032,
        };

        assert_eq!(BoundingBox::from_points(points.iter().copied()), expected);
    }

    // The compact writer derives the short/same packing bits, so flags are compared
    // through the on-curve bit that survives a round trip.
    fn outline(glyph: &SimpleGlyph<'_>) -> Vec<(bool, Point)> {
        glyph
            .coordinates
            .iter()
            .map(|(flag, point)| (flag.is_on_curve(), *point))
            .collect()
    }

    #[test]
    fn test_simple_glyph_compact_round_trip() {
        let glyph = simple_glyph_fixture();
        let expected = glyph.clone();

        let mut buffer = WriteBuffer::new();
        SimpleGlyph::write(&mut buffer, glyph).unwrap();

        match ReadScope::new(buffer.bytes()).read::<GlyfRecord<'_>>() {
            Ok(GlyfRecord::Simple(read_back)) => {
                assert_eq!(read_back.bounding_box, expected.bounding_box);
                assert_eq!(read_back.end_pts_of_contours, expected.end_pts_of_contours);
                assert_eq!(read_back.instructions, expected.instructions);
                assert_eq!(outline(&read_back), outline(&expected));
            }
            _ => panic!("did not read back a simple glyph"),
        }
    }

    #[test]
    fn test_simple_glyph_flag_repeat_compression() {
        // Five points at even spacing produce identical flag bytes that should be
        // collapsed into a single flag with a repeat count.
        let glyph = SimpleGlyph {
            bounding_box: BoundingBox {
                x_min: 0,
                x_max: 50,
                y_min: 0,
                y_max: 0,
            },
            end_pts_of_contours: vec![4],
            instructions: &[],
            coordinates: (1i16..=5)
                .map(|i| (SimpleGlyphFlag::ON_CURVE_POINT, Point(10 * i, 0)))
                .collect(),
        };

        let mut buffer = WriteBuffer::new();
        SimpleGlyph::write(&mut buffer, glyph).unwrap();

        // header (10) + endpts (2) + instruction length (2) + flags (2) + x deltas (5)
        assert_eq!(buffer.len(), 10 + 2 + 2 + 2 + 5);
    }

    #[test]
    fn test_simple_glyph_with_zero_contours() {
        let glyph_data = &[
            0, 0, // number of contours
            0, 0, 0, 0, 0, 0, 0, 0, // bounding box
            0, 0, // instruction length
        ];
        let expected = SimpleGlyph {
            bounding_box: BoundingBox::empty(),
            end_pts_of_contours: vec![],
            instructions: &[],
            coordinates: vec![],
        };

        match ReadScope::new(glyph_data).read::<GlyfRecord<'_>>() {
            Ok(GlyfRecord::Simple(glyph)) => assert_eq!(glyph, expected),
            _ => panic!("did not read back a simple glyph"),
        }
    }

    #[test]
    fn test_composite_glyph_round_trip() {
        let glyph = composite_glyph_fixture(&[1, 2, 3, 4]);
        let expected = glyph.clone();

        let mut buffer = WriteBuffer::new();
        CompositeGlyph::write(&mut buffer, glyph).unwrap();

        match ReadScope::new(buffer.bytes()).read::<GlyfRecord<'_>>() {
            Ok(GlyfRecord::Composite(read_back)) => assert_eq!(read_back, expected),
            _ => panic!("did not read back a composite glyph"),
        }
    }

    // A composite glyph read with the instructions flag set but instruction length 0
    // must still be written with an instruction length field.
    #[test]
    fn test_composite_glyph_with_empty_instructions() {
        let glyph = composite_glyph_fixture(&[]);

        let mut buffer = WriteBuffer::new();
        CompositeGlyph::write(&mut buffer, glyph).unwrap();

        match ReadScope::new(buffer.bytes()).read::<GlyfRecord<'_>>() {
            Ok(GlyfRecord::Composite(CompositeGlyph { instructions, .. })) => {
                assert_eq!(instructions, &[])
            }
            _ => panic!("unable to read back glyph"),
        }
    }

    #[test]
    fn test_write_glyf_table_offsets_are_aligned() {
        let glyf = GlyfTable {
            records: vec![
                GlyfRecord::Empty,
                GlyfRecord::Simple(simple_glyph_fixture()),
                GlyfRecord::Composite(composite_glyph_fixture(&[])),
            ],
        };
        let mut buffer = WriteBuffer::new();
        let loca = GlyfTable::write_dep(&mut buffer, glyf, ()).unwrap();

        assert_eq!(loca.offsets.len(), 4);
        assert!(loca.offsets.iter().all(|offset| offset % 4 == 0));
        assert_eq!(*loca.offsets.last().unwrap() as usize, buffer.len());
    }

    #[test]
    fn test_glyf_table_round_trip_through_loca() {
        let glyf = GlyfTable {
            records: vec![GlyfRecord::Empty, GlyfRecord::Simple(simple_glyph_fixture())],
        };
        let num_glyphs = glyf.records.len();

        let mut buffer = WriteBuffer::new();
        let loca = GlyfTable::write_dep(&mut buffer, glyf, ()).unwrap();
        let glyf_data = buffer.into_inner();

        let mut loca_buffer = WriteBuffer::new();
        owned::LocaTable::write_dep(&mut loca_buffer, loca, IndexToLocFormat::Long).unwrap();
        let loca_data = loca_buffer.into_inner();

        let loca = ReadScope::new(&loca_data)
            .read_dep::<LocaTable<'_>>((num_glyphs, IndexToLocFormat::Long))
            .unwrap();
        let glyf = ReadScope::new(&glyf_data)
            .read_dep::<GlyfTable<'_>>(&loca)
            .unwrap();

        assert_eq!(glyf.records.len(), 2);
        assert_eq!(glyf.records[0], GlyfRecord::Empty);
        match &glyf.records[1] {
            GlyfRecord::Simple(glyph) => {
                assert_eq!(outline(glyph), outline(&simple_glyph_fixture()))
            }
            _ => panic!("expected a simple glyph"),
        }
    }
}
