//! The WOFF2 glyf/loca table transform, in both directions.
//!
//! A transformed `glyf` table holds seven substreams that together describe every
//! glyph: contour counts, point counts, per-point flags, packed coordinate deltas,
//! raw composite records, bounding boxes, and hinting instructions. The `loca`
//! table carries no data of its own; it is regenerated while the glyphs are laid
//! back out.
//!
//! <https://www.w3.org/TR/WOFF2/#glyf_table_format>

use std::convert::TryFrom;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteBuffer, WriteContext};
use crate::binary::{I16Be, U16Be, U32Be, U8};
use crate::error::{ParseError, WriteError};
use crate::tables::glyf::{
    BoundingBox, CompositeGlyph, CompositeGlyphComponent, CompositeGlyphs, GlyfRecord, GlyfTable,
    Point, SimpleGlyph, SimpleGlyphFlag,
};
use crate::tables::loca::LocaTable;
use crate::tables::IndexToLocFormat;
use crate::woff2::lut::{pack_triplet, XYTriplet, COORD_LUT};
use crate::woff2::{BitSlice, PackedU16, TableDirectoryEntry};

/// Bit 0 of the transform header option flags: an overlap-simple bitmap is present.
const OPTION_OVERLAP_SIMPLE_BITMAP: u16 = 0x0001;

/// Marker type for reading and writing a `glyf` table in its WOFF2 transformed form.
pub enum Woff2GlyfTable {}

/// Marker type for reading a `loca` table from a WOFF2 file.
pub enum Woff2LocaTable {}

#[derive(Clone, Copy)]
struct WoffFlag(u8);

struct TransformedGlyphTable<'a> {
    /// Number of glyphs
    num_glyphs: u16,
    /// Offset format for the regenerated loca table, which must agree with
    /// indexToLocFormat in the font's head table
    index_format: IndexToLocFormat,
    /// Stream of i16 values representing the number of contours of each glyph record
    n_contour_scope: ReadScope<'a>,
    /// Stream of per-contour outline point counts
    n_points_scope: ReadScope<'a>,
    /// Stream of u8 flag values for each outline point
    flag_scope: ReadScope<'a>,
    /// Stream of variable-length point coordinates and instruction lengths
    glyph_scope: ReadScope<'a>,
    /// Stream of component flag values and associated composite glyph data
    composite_scope: ReadScope<'a>,
    /// Bitmap (a numGlyphs-long bit array) indicating explicit bounding boxes
    bbox_bitmap_scope: ReadScope<'a>,
    /// Stream of i16 values representing explicit glyph bounding boxes
    bbox_scope: ReadScope<'a>,
    /// Stream of instructions for each glyph that carries any
    instruction_scope: ReadScope<'a>,
    /// Bitmap of glyphs whose first point carries the overlap-simple flag
    overlap_scope: Option<ReadScope<'a>>,
}

impl<'a> ReadBinary<'a> for TransformedGlyphTable<'a> {
    type HostType = Self;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let _reserved = ctxt.read_u16be()?;
        let option_flags = ctxt.read_u16be()?;
        let num_glyphs = ctxt.read_u16be()?;
        let index_format = match ctxt.read_u16be()? {
            0 => IndexToLocFormat::Short,
            1 => IndexToLocFormat::Long,
            _ => return Err(ParseError::BadTransform),
        };

        let n_contour_stream_size = usize::try_from(ctxt.read_u32be()?)?;
        let n_points_stream_size = usize::try_from(ctxt.read_u32be()?)?;
        let flag_stream_size = usize::try_from(ctxt.read_u32be()?)?;
        let glyph_stream_size = usize::try_from(ctxt.read_u32be()?)?;
        let composite_stream_size = usize::try_from(ctxt.read_u32be()?)?;
        let bbox_stream_size = usize::try_from(ctxt.read_u32be()?)?;
        let instruction_stream_size = usize::try_from(ctxt.read_u32be()?)?;

        // Build sub scopes for each of the streams, then iterate a glyph at a time
        // pulling from those scopes as needed
        let n_contour_scope = ReadScope::new(ctxt.read_slice(n_contour_stream_size)?);
        let n_points_scope = ReadScope::new(ctxt.read_slice(n_points_stream_size)?);
        let flag_scope = ReadScope::new(ctxt.read_slice(flag_stream_size)?);
        let glyph_scope = ReadScope::new(ctxt.read_slice(glyph_stream_size)?);
        let composite_scope = ReadScope::new(ctxt.read_slice(composite_stream_size)?);
        // The bounding box stream leads with the bitmap. Its length is
        // 4 * floor((numGlyphs + 31) / 32) bytes, with glyph 0 at the most
        // significant bit of the first byte.
        let bbox_bitmap_length = bbox_bitmap_size(usize::from(num_glyphs));
        let explicit_bbox_length = bbox_stream_size
            .checked_sub(bbox_bitmap_length)
            .ok_or(ParseError::BadTransform)?;
        let bbox_bitmap_scope = ReadScope::new(ctxt.read_slice(bbox_bitmap_length)?);
        let bbox_scope = ReadScope::new(ctxt.read_slice(explicit_bbox_length)?);
        let instruction_scope = ReadScope::new(ctxt.read_slice(instruction_stream_size)?);

        let overlap_scope = if option_flags & OPTION_OVERLAP_SIMPLE_BITMAP != 0 {
            let length = overlap_bitmap_size(usize::from(num_glyphs));
            Some(ReadScope::new(ctxt.read_slice(length)?))
        } else {
            None
        };

        Ok(TransformedGlyphTable {
            num_glyphs,
            index_format,
            n_contour_scope,
            n_points_scope,
            flag_scope,
            glyph_scope,
            composite_scope,
            bbox_bitmap_scope,
            bbox_scope,
            instruction_scope,
            overlap_scope,
        })
    }
}

impl<'a> ReadBinaryDep<'a> for Woff2GlyfTable {
    type Args = (&'a TableDirectoryEntry, &'a LocaTable<'a>, usize, IndexToLocFormat);
    type HostType = GlyfTable<'a>;

    fn read_dep(
        ctxt: &mut ReadCtxt<'a>,
        (entry, loca, num_glyphs, index_to_loc_format): Self::Args,
    ) -> Result<Self::HostType, ParseError> {
        if entry.transformed() {
            let table = ctxt.read::<TransformedGlyphTable<'_>>()?;
            if usize::from(table.num_glyphs) != num_glyphs {
                return Err(ParseError::BadTransform);
            }
            if table.index_format != index_to_loc_format {
                return Err(ParseError::BadTransform);
            }
            Self::reconstruct(&table)
        } else {
            // glyf table has not been transformed
            ctxt.read_dep::<GlyfTable<'_>>(loca)
        }
    }
}

impl Woff2GlyfTable {
    fn reconstruct<'a>(table: &TransformedGlyphTable<'a>) -> Result<GlyfTable<'a>, ParseError> {
        let num_glyphs = usize::from(table.num_glyphs);
        let mut n_contour_ctxt = table.n_contour_scope.ctxt();
        let mut n_points_ctxt = table.n_points_scope.ctxt();
        let mut flags_ctxt = table.flag_scope.ctxt();
        let mut glyphs_ctxt = table.glyph_scope.ctxt();
        let mut instructions_ctxt = table.instruction_scope.ctxt();
        let mut composite_ctxt = table.composite_scope.ctxt();
        let bbox_bitmap = BitSlice::new(table.bbox_bitmap_scope.data());
        let mut bbox_ctxt = table.bbox_scope.ctxt();
        let overlap_bitmap = table
            .overlap_scope
            .as_ref()
            .map(|scope| BitSlice::new(scope.data()));

        let mut records = Vec::with_capacity(num_glyphs);
        for i in 0..num_glyphs {
            let number_of_contours = n_contour_ctxt.read_i16be()?;
            let has_bbox = bbox_bitmap.get(i).ok_or(ParseError::BadTransform)?;

            let record = match number_of_contours {
                0 => {
                    // An empty glyph MUST NOT have an explicitly supplied bounding box
                    if has_bbox {
                        return Err(ParseError::BadTransform);
                    }
                    GlyfRecord::Empty
                }
                -1 => {
                    // A composite glyph MUST have an explicitly supplied bounding box
                    if !has_bbox {
                        return Err(ParseError::BadTransform);
                    }
                    let glyphs = composite_ctxt.read::<CompositeGlyphs>()?;

                    let instruction_length = if glyphs.have_instructions {
                        usize::from(glyphs_ctxt.read::<PackedU16>()?)
                    } else {
                        0
                    };
                    let instructions = instructions_ctxt.read_slice(instruction_length)?;
                    let bounding_box = bbox_ctxt.read::<BoundingBox>()?;

                    GlyfRecord::Composite(CompositeGlyph {
                        bounding_box,
                        glyphs: glyphs.glyphs,
                        instructions,
                    })
                }
                num if num > 0 => {
                    let mut glyph = Self::decode_simple_glyph(
                        &mut n_points_ctxt,
                        &mut flags_ctxt,
                        &mut glyphs_ctxt,
                        &mut instructions_ctxt,
                        number_of_contours,
                    )?;

                    glyph.bounding_box = if has_bbox {
                        bbox_ctxt.read::<BoundingBox>()?
                    } else {
                        glyph.bounding_box()
                    };

                    if let Some(overlap) = &overlap_bitmap {
                        if overlap.get(i) == Some(true) {
                            if let Some((flag, _point)) = glyph.coordinates.first_mut() {
                                *flag |= SimpleGlyphFlag::OVERLAP_SIMPLE;
                            }
                        }
                    }

                    GlyfRecord::Simple(glyph)
                }
                _ => return Err(ParseError::BadTransform),
            };

            records.push(record);
        }

        Ok(GlyfTable { records })
    }

    fn compute_end_pts_of_contours(
        n_points_ctxt: &mut ReadCtxt<'_>,
        number_of_contours: i16,
    ) -> Result<(Vec<u16>, usize), ParseError> {
        // Read numberOfContours point counts from the nPoints stream. Convert
        // these into the endPtsOfContours array by computing the cumulative sum,
        // then subtracting one. The sum of all the values is the total number of
        // points in the glyph.
        let mut n_points = 0u32;
        let end_pts_of_contours = (0..number_of_contours)
            .map(|_i| {
                let count = n_points_ctxt.read::<PackedU16>()?;
                n_points += u32::from(count);
                if n_points == 0 || n_points > u32::from(u16::MAX) + 1 {
                    return Err(ParseError::BadTransform);
                }
                Ok((n_points - 1) as u16)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((end_pts_of_contours, n_points as usize))
    }

    fn decode_coordinates(flag: WoffFlag, ctxt: &mut ReadCtxt<'_>) -> Result<Point, ParseError> {
        let xy_triplet = flag.xy_triplet();

        let data = ctxt
            .read_slice(usize::from(xy_triplet.byte_count))?
            .iter()
            .fold(0u32, |data, &byte| (data << 8) | u32::from(byte));

        Ok(Point(xy_triplet.dx(data), xy_triplet.dy(data)))
    }

    fn decode_simple_glyph<'a>(
        n_points_ctxt: &mut ReadCtxt<'_>,
        flags_ctxt: &mut ReadCtxt<'_>,
        glyphs_ctxt: &mut ReadCtxt<'_>,
        instructions_ctxt: &mut ReadCtxt<'a>,
        number_of_contours: i16,
    ) -> Result<SimpleGlyph<'a>, ParseError> {
        let (end_pts_of_contours, n_points) =
            Self::compute_end_pts_of_contours(n_points_ctxt, number_of_contours)?;

        let mut coordinates = Vec::with_capacity(n_points);
        let mut prev_point = Point::zero();
        for _ in 0..n_points {
            let flag = flags_ctxt.read::<WoffFlag>()?;
            let point = Self::decode_coordinates(flag, glyphs_ctxt)?;

            // The coordinates are deltas against the previous point, the first
            // being implicitly against (0, 0). Resolve them into absolute values.
            prev_point = Point(
                prev_point.0.wrapping_add(point.0),
                prev_point.1.wrapping_add(point.1),
            );
            coordinates.push((<SimpleGlyphFlag as From<WoffFlag>>::from(flag), prev_point));
        }

        let instruction_length = usize::from(glyphs_ctxt.read::<PackedU16>()?);
        let instructions = instructions_ctxt.read_slice(instruction_length)?;

        Ok(SimpleGlyph {
            bounding_box: BoundingBox::empty(),
            end_pts_of_contours,
            instructions,
            coordinates,
        })
    }
}

impl<'a> ReadBinaryDep<'a> for Woff2LocaTable {
    type Args = (&'a TableDirectoryEntry, usize, IndexToLocFormat);
    type HostType = LocaTable<'a>;

    fn read_dep(
        ctxt: &mut ReadCtxt<'a>,
        (loca_entry, num_glyphs, index_to_loc_format): Self::Args,
    ) -> Result<Self::HostType, ParseError> {
        if loca_entry.transformed() {
            // The table is regenerated from glyf, there is nothing to read
            Ok(LocaTable::empty())
        } else {
            ctxt.read_dep::<LocaTable<'_>>((num_glyphs, index_to_loc_format))
        }
    }
}

impl<'a> WriteBinaryDep<&GlyfTable<'a>> for Woff2GlyfTable {
    type Args = IndexToLocFormat;
    type Output = ();

    /// Apply the glyf transform, emitting the seven substreams behind the
    /// transformed table header.
    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        glyf: &GlyfTable<'a>,
        index_format: IndexToLocFormat,
    ) -> Result<(), WriteError> {
        let num_glyphs = glyf.records.len();
        let mut n_contour_stream = WriteBuffer::new();
        let mut n_points_stream = WriteBuffer::new();
        let mut flag_stream = WriteBuffer::new();
        let mut glyph_stream = WriteBuffer::new();
        let mut composite_stream = WriteBuffer::new();
        let mut bbox_bitmap = vec![0u8; bbox_bitmap_size(num_glyphs)];
        let mut bbox_stream = WriteBuffer::new();
        let mut instruction_stream = WriteBuffer::new();
        let mut overlap_bitmap = vec![0u8; overlap_bitmap_size(num_glyphs)];
        let mut any_overlap = false;

        for (index, record) in glyf.records.iter().enumerate() {
            match record {
                GlyfRecord::Empty => {
                    I16Be::write(&mut n_contour_stream, 0i16)?;
                }
                GlyfRecord::Composite(glyph) => {
                    I16Be::write(&mut n_contour_stream, -1i16)?;
                    bbox_bitmap[index >> 3] |= 0x80 >> (index & 7);
                    BoundingBox::write(&mut bbox_stream, glyph.bounding_box)?;

                    let mut have_instructions = false;
                    for component in &glyph.glyphs {
                        have_instructions |= component.flags.we_have_instructions();
                        CompositeGlyphComponent::write(&mut composite_stream, component.clone())?;
                    }
                    if have_instructions {
                        PackedU16::write(
                            &mut glyph_stream,
                            u16::try_from(glyph.instructions.len())?,
                        )?;
                        instruction_stream.write_bytes(glyph.instructions)?;
                    }
                }
                GlyfRecord::Simple(glyph) if glyph.end_pts_of_contours.is_empty() => {
                    // A zero-contour glyph is stored as an empty glyph, which may
                    // not carry a bounding box
                    I16Be::write(&mut n_contour_stream, 0i16)?;
                }
                GlyfRecord::Simple(glyph) => {
                    Self::encode_simple_glyph(
                        glyph,
                        &mut n_contour_stream,
                        &mut n_points_stream,
                        &mut flag_stream,
                        &mut glyph_stream,
                        &mut instruction_stream,
                    )?;

                    // The bounding box is elided when it matches the one computed
                    // from the points
                    if glyph.bounding_box != glyph.bounding_box() {
                        bbox_bitmap[index >> 3] |= 0x80 >> (index & 7);
                        BoundingBox::write(&mut bbox_stream, glyph.bounding_box)?;
                    }

                    if let Some((flag, _point)) = glyph.coordinates.first() {
                        if flag.contains(SimpleGlyphFlag::OVERLAP_SIMPLE) {
                            overlap_bitmap[index >> 3] |= 0x80 >> (index & 7);
                            any_overlap = true;
                        }
                    }
                }
            }
        }

        U16Be::write(ctxt, 0u16)?; // reserved
        let option_flags = if any_overlap {
            OPTION_OVERLAP_SIMPLE_BITMAP
        } else {
            0
        };
        U16Be::write(ctxt, option_flags)?;
        U16Be::write(ctxt, u16::try_from(num_glyphs)?)?;
        match index_format {
            IndexToLocFormat::Short => U16Be::write(ctxt, 0u16)?,
            IndexToLocFormat::Long => U16Be::write(ctxt, 1u16)?,
        }
        U32Be::write(ctxt, u32::try_from(n_contour_stream.len())?)?;
        U32Be::write(ctxt, u32::try_from(n_points_stream.len())?)?;
        U32Be::write(ctxt, u32::try_from(flag_stream.len())?)?;
        U32Be::write(ctxt, u32::try_from(glyph_stream.len())?)?;
        U32Be::write(ctxt, u32::try_from(composite_stream.len())?)?;
        U32Be::write(
            ctxt,
            u32::try_from(bbox_bitmap.len() + bbox_stream.len())?,
        )?;
        U32Be::write(ctxt, u32::try_from(instruction_stream.len())?)?;

        ctxt.write_bytes(n_contour_stream.bytes())?;
        ctxt.write_bytes(n_points_stream.bytes())?;
        ctxt.write_bytes(flag_stream.bytes())?;
        ctxt.write_bytes(glyph_stream.bytes())?;
        ctxt.write_bytes(composite_stream.bytes())?;
        ctxt.write_bytes(&bbox_bitmap)?;
        ctxt.write_bytes(bbox_stream.bytes())?;
        ctxt.write_bytes(instruction_stream.bytes())?;
        if any_overlap {
            ctxt.write_bytes(&overlap_bitmap)?;
        }

        Ok(())
    }
}

impl Woff2GlyfTable {
    fn encode_simple_glyph(
        glyph: &SimpleGlyph<'_>,
        n_contour_stream: &mut WriteBuffer,
        n_points_stream: &mut WriteBuffer,
        flag_stream: &mut WriteBuffer,
        glyph_stream: &mut WriteBuffer,
        instruction_stream: &mut WriteBuffer,
    ) -> Result<(), WriteError> {
        I16Be::write(n_contour_stream, glyph.number_of_contours())?;

        // Per-contour point counts are the differences of the cumulative
        // endPtsOfContours values
        let mut prev_end: Option<u16> = None;
        for &end in &glyph.end_pts_of_contours {
            let count = match prev_end {
                None => end.checked_add(1).map(u32::from),
                Some(prev) => end.checked_sub(prev).map(u32::from),
            }
            .ok_or(WriteError::BadValue)?;
            PackedU16::write(n_points_stream, u16::try_from(count)?)?;
            prev_end = Some(end);
        }

        let mut prev = Point::zero();
        for (flag, point) in &glyph.coordinates {
            let dx = point.0.wrapping_sub(prev.0);
            let dy = point.1.wrapping_sub(prev.1);
            prev = *point;

            let packed = pack_triplet(dx, dy);
            // The most significant bit of the flag is clear for an on-curve point
            let on_curve_bit = if flag.is_on_curve() { 0 } else { 0x80 };
            U8::write(flag_stream, packed.flag_low | on_curve_bit)?;
            glyph_stream.write_bytes(&packed.data[..packed.len])?;
        }

        PackedU16::write(glyph_stream, u16::try_from(glyph.instructions.len())?)?;
        instruction_stream.write_bytes(glyph.instructions)?;

        Ok(())
    }
}

impl<'a> ReadFrom<'a> for WoffFlag {
    type ReadType = U8;

    fn from(flag: u8) -> Self {
        WoffFlag::new(flag)
    }
}

impl WoffFlag {
    fn new(flag: u8) -> Self {
        WoffFlag(flag)
    }

    fn is_on_curve_point(&self) -> bool {
        // The most significant bit of a flag indicates whether the point is on- or
        // off-curve, with the bit clear meaning on-curve. This is the opposite
        // polarity to the equivalent OpenType simple glyph flag.
        self.0 & 0x80 == 0
    }

    fn xy_triplet(&self) -> &'static XYTriplet {
        &COORD_LUT[usize::from(self.0 & 0x7F)]
    }
}

impl From<WoffFlag> for SimpleGlyphFlag {
    fn from(woff_flag: WoffFlag) -> Self {
        if woff_flag.is_on_curve_point() {
            SimpleGlyphFlag::ON_CURVE_POINT
        } else {
            SimpleGlyphFlag::empty()
        }
    }
}

/// The bounding box bitmap is zero padded to a whole number of 32-bit words.
pub(crate) fn bbox_bitmap_size(num_glyphs: usize) -> usize {
    4 * ((num_glyphs + 31) / 32)
}

pub(crate) fn overlap_bitmap_size(num_glyphs: usize) -> usize {
    (num_glyphs + 7) / 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::glyf::tests::{composite_glyph_fixture, simple_glyph_fixture};

    fn transform(glyf: &GlyfTable<'_>) -> Vec<u8> {
        let mut buffer = WriteBuffer::new();
        Woff2GlyfTable::write_dep(&mut buffer, glyf, IndexToLocFormat::Short).unwrap();
        buffer.into_inner()
    }

    fn reconstruct<'a>(data: &'a [u8]) -> GlyfTable<'a> {
        let table = ReadScope::new(data)
            .read::<TransformedGlyphTable<'_>>()
            .expect("unable to read transformed table");
        Woff2GlyfTable::reconstruct(&table).expect("unable to reconstruct glyf")
    }

    #[test]
    fn test_transform_round_trip() {
        let mut simple = simple_glyph_fixture();
        simple.bounding_box = simple.bounding_box();
        let glyf = GlyfTable {
            records: vec![
                GlyfRecord::Empty,
                GlyfRecord::Simple(simple),
                GlyfRecord::Composite(composite_glyph_fixture(&[7, 7])),
            ],
        };

        let data = transform(&glyf);
        let read_back = reconstruct(&data);

        assert_eq!(read_back, glyf);
    }

    #[test]
    fn test_transform_keeps_explicit_bbox() {
        // The fixture's stored bounding box does not match the computed one, so the
        // transform must carry it explicitly.
        let glyf = GlyfTable {
            records: vec![GlyfRecord::Simple(simple_glyph_fixture())],
        };

        let data = transform(&glyf);
        let read_back = reconstruct(&data);

        match &read_back.records[0] {
            GlyfRecord::Simple(glyph) => {
                assert_eq!(glyph.bounding_box, simple_glyph_fixture().bounding_box)
            }
            _ => panic!("expected simple glyph"),
        }
    }

    #[test]
    fn test_transform_overlap_bitmap() {
        let mut simple = simple_glyph_fixture();
        simple.bounding_box = simple.bounding_box();
        simple.coordinates[0].0 |= SimpleGlyphFlag::OVERLAP_SIMPLE;
        let glyf = GlyfTable {
            records: vec![GlyfRecord::Simple(simple.clone())],
        };

        let data = transform(&glyf);
        let read_back = reconstruct(&data);

        match &read_back.records[0] {
            GlyfRecord::Simple(glyph) => {
                assert!(glyph.coordinates[0]
                    .0
                    .contains(SimpleGlyphFlag::OVERLAP_SIMPLE));
            }
            _ => panic!("expected simple glyph"),
        }
    }

    #[test]
    fn test_empty_glyph_with_bbox_bit_is_rejected() {
        let glyf = GlyfTable {
            records: vec![GlyfRecord::Empty],
        };
        let mut data = transform(&glyf);
        // Set the bbox bit for glyph 0. The bitmap follows the 36-byte header and
        // the two-byte contour stream.
        data[38] |= 0x80;

        let table = ReadScope::new(&data)
            .read::<TransformedGlyphTable<'_>>()
            .unwrap();
        assert_eq!(
            Woff2GlyfTable::reconstruct(&table),
            Err(ParseError::BadTransform)
        );
    }

    #[test]
    fn test_compute_end_pts_of_contours() {
        let data = [2u8, 4];
        let mut ctxt = ReadScope::new(&data).ctxt();
        let (end_pts_of_contours, n_points) =
            Woff2GlyfTable::compute_end_pts_of_contours(&mut ctxt, data.len() as i16)
                .expect("unable to decode point counts");
        assert_eq!(end_pts_of_contours, vec![1, 5]);
        assert_eq!(n_points, 6);
    }

    #[test]
    fn test_xy_triplet_dx_dy() {
        let triplet = XYTriplet {
            byte_count: 2,
            x_bits: 8,
            y_bits: 8,
            delta_x: 1,
            delta_y: 257,
            x_is_negative: true,
            y_is_negative: false,
        };
        let data = 0x7AD2;

        assert_eq!(triplet.dx(data), -(0x7A + 1));
        assert_eq!(triplet.dy(data), 0xD2 + 257);
    }
}
