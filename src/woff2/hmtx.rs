//! The WOFF2 hmtx table transform.
//!
//! The transform exploits the redundancy of TrueType glyphs designed to the
//! recommendations: their left side bearings equal the xMin of the glyph
//! bounding box, so matching bearing arrays can be dropped and rebuilt from the
//! reconstructed `glyf` table.

use bitflags::bitflags;

use crate::binary::read::{ReadArrayCow, ReadBinaryDep, ReadCtxt};
use crate::binary::write::{WriteBinary, WriteBuffer};
use crate::binary::{I16Be, U16Be, U8};
use crate::error::{ParseError, WriteError};
use crate::tables::glyf::GlyfTable;
use crate::tables::{HmtxTable, LongHorMetric};
use crate::woff2::TableDirectoryEntry;

/// Marker type for reading and writing an `hmtx` table in its WOFF2 transformed form.
pub enum Woff2HmtxTable {}

bitflags! {
    pub struct HmtxTableFlag: u8 {
        const LSB_ABSENT = 0b01;
        const LEFT_SIDE_BEARING_ABSENT = 0b10;
    }
}

impl<'a> ReadBinaryDep<'a> for Woff2HmtxTable {
    type Args = (&'a TableDirectoryEntry, &'a GlyfTable<'a>, usize, usize);
    type HostType = HmtxTable<'a>;

    /// Read an hmtx table from a WOFF2 file.
    ///
    /// `num_h_metrics` comes from the `hhea` table; elided bearing arrays are
    /// rebuilt from the glyph bounding boxes.
    fn read_dep(
        ctxt: &mut ReadCtxt<'a>,
        (hmtx_entry, glyf, num_glyphs, num_h_metrics): Self::Args,
    ) -> Result<Self::HostType, ParseError> {
        if !hmtx_entry.transformed() {
            return ctxt.read_dep::<HmtxTable<'_>>((num_glyphs, num_h_metrics));
        }

        let flags = ctxt.read_u8()?;
        // Bits 2..=7 of the flag byte are reserved
        if flags & 0xFC != 0 {
            return Err(ParseError::BadTransform);
        }
        let flags = HmtxTableFlag::from_bits_truncate(flags);

        if glyf.records.len() != num_glyphs || num_h_metrics > num_glyphs {
            return Err(ParseError::BadIndex);
        }

        let advance_widths = ctxt.read_array::<U16Be>(num_h_metrics)?;

        let lsbs = if flags.lsb_is_present() {
            ReadArrayCow::Borrowed(ctxt.read_array::<I16Be>(num_h_metrics)?)
        } else {
            ReadArrayCow::Owned(
                glyf.records[..num_h_metrics]
                    .iter()
                    .map(|record| record.x_min())
                    .collect(),
            )
        };

        let left_side_bearings = if flags.left_side_bearing_is_present() {
            ReadArrayCow::Borrowed(ctxt.read_array::<I16Be>(num_glyphs - num_h_metrics)?)
        } else {
            ReadArrayCow::Owned(
                glyf.records[num_h_metrics..]
                    .iter()
                    .map(|record| record.x_min())
                    .collect(),
            )
        };

        let h_metrics = lsbs
            .iter()
            .zip(advance_widths.iter())
            .map(|(lsb, advance_width)| LongHorMetric { advance_width, lsb })
            .collect();

        Ok(HmtxTable {
            h_metrics: ReadArrayCow::Owned(h_metrics),
            left_side_bearings,
        })
    }
}

impl Woff2HmtxTable {
    /// Apply the hmtx transform if it is both applicable and profitable.
    ///
    /// Returns `None` when a bearing differs from its glyph's xMin or when the
    /// transformed table would not be smaller, in which case the table must be
    /// stored untransformed.
    pub fn transform(
        hmtx: &HmtxTable<'_>,
        glyf: &GlyfTable<'_>,
        num_glyphs: usize,
        num_h_metrics: usize,
    ) -> Result<Option<Vec<u8>>, WriteError> {
        if glyf.records.len() != num_glyphs
            || num_h_metrics > num_glyphs
            || hmtx.h_metrics.len() != num_h_metrics
            || hmtx.left_side_bearings.len() != num_glyphs - num_h_metrics
        {
            return Err(WriteError::BadValue);
        }

        // An empty glyph reconstructs with a bearing of zero, so its stored
        // bearing must be zero for the elision to round-trip.
        let mut flags = HmtxTableFlag::empty();
        let lsb_elidable = hmtx
            .h_metrics
            .iter()
            .zip(glyf.records[..num_h_metrics].iter())
            .all(|(metric, record)| metric.lsb == record.x_min());
        if lsb_elidable {
            flags |= HmtxTableFlag::LSB_ABSENT;
        }
        let bearings_elidable = hmtx
            .left_side_bearings
            .iter()
            .zip(glyf.records[num_h_metrics..].iter())
            .all(|(lsb, record)| lsb == record.x_min());
        if bearings_elidable {
            flags |= HmtxTableFlag::LEFT_SIDE_BEARING_ABSENT;
        }

        if flags.is_empty() {
            return Ok(None);
        }

        let untransformed_size = 4 * num_h_metrics + 2 * (num_glyphs - num_h_metrics);
        let mut transformed_size = 1 + 2 * num_h_metrics;
        if !lsb_elidable {
            transformed_size += 2 * num_h_metrics;
        }
        if !bearings_elidable {
            transformed_size += 2 * (num_glyphs - num_h_metrics);
        }
        if transformed_size >= untransformed_size {
            return Ok(None);
        }

        let mut buffer = WriteBuffer::new();
        U8::write(&mut buffer, flags.bits())?;
        write_metrics(&mut buffer, hmtx, flags)?;

        Ok(Some(buffer.into_inner()))
    }
}

fn write_metrics(
    buffer: &mut WriteBuffer,
    hmtx: &HmtxTable<'_>,
    flags: HmtxTableFlag,
) -> Result<(), WriteError> {
    for metric in hmtx.h_metrics.iter() {
        U16Be::write(buffer, metric.advance_width)?;
    }
    if flags.lsb_is_present() {
        for metric in hmtx.h_metrics.iter() {
            I16Be::write(buffer, metric.lsb)?;
        }
    }
    if flags.left_side_bearing_is_present() {
        for lsb in hmtx.left_side_bearings.iter() {
            I16Be::write(buffer, lsb)?;
        }
    }
    Ok(())
}

impl HmtxTableFlag {
    pub fn lsb_is_present(self) -> bool {
        self & Self::LSB_ABSENT == Self::empty()
    }

    pub fn left_side_bearing_is_present(self) -> bool {
        self & Self::LEFT_SIDE_BEARING_ABSENT == Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::tables::glyf::{BoundingBox, GlyfRecord, Point, SimpleGlyph, SimpleGlyphFlag};

    fn glyph_with_x_min(x_min: i16) -> GlyfRecord<'static> {
        GlyfRecord::Simple(SimpleGlyph {
            bounding_box: BoundingBox {
                x_min,
                x_max: x_min + 100,
                y_min: 0,
                y_max: 100,
            },
            end_pts_of_contours: vec![0],
            instructions: &[],
            coordinates: vec![(SimpleGlyphFlag::ON_CURVE_POINT, Point(x_min, 0))],
        })
    }

    fn hmtx_fixture(lsbs: &[i16], bearings: &[i16]) -> HmtxTable<'static> {
        HmtxTable {
            h_metrics: ReadArrayCow::Owned(
                lsbs.iter()
                    .map(|&lsb| LongHorMetric {
                        advance_width: 500,
                        lsb,
                    })
                    .collect(),
            ),
            left_side_bearings: ReadArrayCow::Owned(bearings.to_vec()),
        }
    }

    fn transformed_entry() -> TableDirectoryEntry {
        TableDirectoryEntry {
            tag: crate::tag::HMTX,
            transform_version: 1,
            offset: 0,
            orig_length: 0,
            transform_length: Some(0),
        }
    }

    #[test]
    fn test_transform_elides_matching_bearings() {
        let glyf = GlyfTable {
            records: vec![GlyfRecord::Empty, glyph_with_x_min(12), glyph_with_x_min(-3)],
        };
        let hmtx = hmtx_fixture(&[0, 12], &[-3]);

        let transformed = Woff2HmtxTable::transform(&hmtx, &glyf, 3, 2)
            .unwrap()
            .expect("transform should apply");
        // flag byte + two advance widths
        assert_eq!(transformed, vec![0b11, 1, 244, 1, 244]);

        // Read it back
        let entry = transformed_entry();
        let read_back = ReadScope::new(&transformed)
            .read_dep::<Woff2HmtxTable>((&entry, &glyf, 3, 2))
            .unwrap();
        let metrics: Vec<_> = read_back.h_metrics.iter().collect();
        assert_eq!(
            metrics,
            vec![
                LongHorMetric {
                    advance_width: 500,
                    lsb: 0
                },
                LongHorMetric {
                    advance_width: 500,
                    lsb: 12
                },
            ]
        );
        let bearings: Vec<_> = read_back.left_side_bearings.iter().collect();
        assert_eq!(bearings, vec![-3]);
    }

    #[test]
    fn test_transform_skipped_when_bearings_differ() {
        let glyf = GlyfTable {
            records: vec![glyph_with_x_min(12), glyph_with_x_min(4)],
        };
        // Neither half matches the glyph xMin values
        let hmtx = hmtx_fixture(&[11], &[5]);

        assert_eq!(Woff2HmtxTable::transform(&hmtx, &glyf, 2, 1).unwrap(), None);
    }

    #[test]
    fn test_transform_skipped_for_nonzero_empty_glyph_bearing() {
        let glyf = GlyfTable {
            records: vec![GlyfRecord::Empty],
        };
        let hmtx = hmtx_fixture(&[7], &[]);

        assert_eq!(Woff2HmtxTable::transform(&hmtx, &glyf, 1, 1).unwrap(), None);
    }

    #[test]
    fn test_partial_elision_keeps_other_array() {
        let glyf = GlyfTable {
            records: vec![glyph_with_x_min(12), glyph_with_x_min(4)],
        };
        // The proportional bearing matches, the trailing one does not
        let hmtx = hmtx_fixture(&[12], &[5]);

        let transformed = Woff2HmtxTable::transform(&hmtx, &glyf, 2, 1)
            .unwrap()
            .expect("transform should apply");
        assert_eq!(transformed[0], HmtxTableFlag::LSB_ABSENT.bits());

        let entry = transformed_entry();
        let read_back = ReadScope::new(&transformed)
            .read_dep::<Woff2HmtxTable>((&entry, &glyf, 2, 1))
            .unwrap();
        let bearings: Vec<_> = read_back.left_side_bearings.iter().collect();
        assert_eq!(bearings, vec![5]);
    }

    #[test]
    fn test_reserved_flag_bits_rejected() {
        let glyf = GlyfTable {
            records: vec![glyph_with_x_min(0)],
        };
        let entry = transformed_entry();
        let data = [0b100u8, 0, 100];
        assert!(matches!(
            ReadScope::new(&data).read_dep::<Woff2HmtxTable>((&entry, &glyf, 1, 1)),
            Err(ParseError::BadTransform)
        ));
    }
}
