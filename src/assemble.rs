//! Building complete SFNT files out of their tables.
//!
//! [`FontBuilder`] lays out a single font: offset table, tag-sorted directory
//! with per-table checksums, 32-bit padded table bodies, and the
//! `head.checkSumAdjustment` fixup. [`CollectionBuilder`] does the same for a
//! TrueType Collection, sharing tables between member fonts.

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::num::Wrapping;

use itertools::Itertools;

use crate::binary::write::{
    Placeholder, WriteBinary, WriteBinaryDep, WriteBuffer, WriteContext,
};
use crate::binary::{long_align, U16Be, U32Be};
use crate::checksum;
use crate::error::{ReadWriteError, WriteError};
use crate::tables::glyf::GlyfTable;
use crate::tables::loca::owned;
use crate::tables::{HeadTable, TableRecord};
use crate::tag;

/// The value `head.checkSumAdjustment` balances the whole-file checksum against.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

pub struct FontBuilder {
    sfnt_version: u32,
    tables: BTreeMap<u32, WriteBuffer>,
}

/// A [`FontBuilder`] that has its `head` table, and with it the placeholder for
/// the checksum adjustment.
pub struct FontBuilderWithHead {
    inner: FontBuilder,
    check_sum_adjustment: Placeholder<U32Be, u32>,
    index_to_loc_format: crate::tables::IndexToLocFormat,
}

/// A builder for 'ttcf' collection files with shared tables.
pub struct CollectionBuilder {
    version: u32,
    fonts: Vec<CollectionFont>,
    tables: Vec<(u32, Vec<u8>)>,
}

struct CollectionFont {
    flavor: u32,
    table_ids: Vec<usize>,
}

struct TaggedBuffer {
    tag: u32,
    buffer: WriteBuffer,
}

struct OrderedTables {
    tables: Vec<TaggedBuffer>,
    checksum: Wrapping<u32>,
}

impl FontBuilder {
    pub fn new(sfnt_version: u32) -> Self {
        FontBuilder {
            sfnt_version,
            tables: BTreeMap::new(),
        }
    }

    /// Serialize `table` and add it to the font.
    pub fn add_table<HostType, T: WriteBinaryDep<HostType>>(
        &mut self,
        tag: u32,
        table: HostType,
        args: T::Args,
    ) -> Result<T::Output, ReadWriteError> {
        assert_ne!(tag, tag::HEAD, "head table must use add_head_table");

        self.add_table_inner::<HostType, T>(tag, table, args)
    }

    /// Add an already serialized table to the font.
    pub fn add_table_bytes(&mut self, tag: u32, data: &[u8]) -> Result<(), ReadWriteError> {
        assert_ne!(tag, tag::HEAD, "head table must use add_head_table");

        let mut buffer = WriteBuffer::new();
        buffer.write_bytes(data)?;
        self.tables.insert(tag, buffer);
        Ok(())
    }

    fn add_table_inner<HostType, T: WriteBinaryDep<HostType>>(
        &mut self,
        tag: u32,
        table: HostType,
        args: T::Args,
    ) -> Result<T::Output, ReadWriteError> {
        let mut buffer = WriteBuffer::new();
        let output = T::write_dep(&mut buffer, table, args)?;
        self.tables.insert(tag, buffer);

        Ok(output)
    }

    pub fn add_head_table(
        mut self,
        table: &HeadTable,
    ) -> Result<FontBuilderWithHead, ReadWriteError> {
        let placeholder = self.add_table_inner::<_, HeadTable>(tag::HEAD, table, ())?;

        Ok(FontBuilderWithHead {
            inner: self,
            check_sum_adjustment: placeholder,
            index_to_loc_format: table.index_to_loc_format,
        })
    }
}

impl FontBuilderWithHead {
    /// Add a `glyf` table, generating and adding the matching `loca` table.
    pub fn add_glyf_table(&mut self, table: GlyfTable<'_>) -> Result<(), ReadWriteError> {
        let loca = self
            .inner
            .add_table_inner::<_, GlyfTable<'_>>(tag::GLYF, table, ())?;
        self.inner.add_table_inner::<_, owned::LocaTable>(
            tag::LOCA,
            loca,
            self.index_to_loc_format,
        )?;

        Ok(())
    }

    /// Returns a `Vec<u8>` containing the built font
    pub fn data(mut self) -> Result<Vec<u8>, ReadWriteError> {
        let mut font = WriteBuffer::new();

        self.write_offset_table(&mut font)?;
        let table_offset =
            long_align(self.inner.tables.len() * TableRecord::SIZE + font.bytes_written());

        let mut ordered_tables = self.write_table_directory(&mut font)?;

        // pad
        let length = font.bytes_written();
        let padded_length = long_align(length);
        font.write_zeros(padded_length - length)?;
        debug_assert_eq!(padded_length, table_offset);

        // Fill in check_sum_adjustment in the head table
        let headers_checksum = checksum::table_checksum(font.bytes())?;
        let checksum = Wrapping(CHECKSUM_MAGIC) - (headers_checksum + ordered_tables.checksum);

        // Write out the font tables
        let mut placeholder = Some(self.check_sum_adjustment);
        for TaggedBuffer { tag, buffer } in ordered_tables.tables.iter_mut() {
            if *tag == tag::HEAD {
                buffer.write_placeholder(placeholder.take().unwrap(), checksum.0)?;
            }
            font.write_bytes(buffer.bytes())?;
        }

        Ok(font.into_inner())
    }

    fn write_offset_table(&self, font: &mut WriteBuffer) -> Result<(), WriteError> {
        let num_tables = u16::try_from(self.inner.tables.len())?;
        write_offset_table_header(font, self.inner.sfnt_version, num_tables)
    }

    fn write_table_directory(
        &mut self,
        font: &mut WriteBuffer,
    ) -> Result<OrderedTables, ReadWriteError> {
        let mut tables = Vec::with_capacity(self.inner.tables.len());
        let mut checksum = Wrapping(0);
        let mut table_offset =
            long_align(self.inner.tables.len() * TableRecord::SIZE + font.bytes_written());

        let tags = self.inner.tables.keys().cloned().collect_vec();
        for tag in tags {
            if let Some(mut table) = self.inner.tables.remove(&tag) {
                let length = table.len();
                let padded_length = long_align(length);
                table.write_zeros(padded_length - length)?;

                let table_checksum = checksum::table_checksum(table.bytes())?;
                checksum += table_checksum;

                let record = TableRecord {
                    table_tag: tag,
                    checksum: table_checksum.0,
                    offset: u32::try_from(table_offset).map_err(WriteError::from)?,
                    length: u32::try_from(length).map_err(WriteError::from)?,
                };

                table_offset += padded_length;
                TableRecord::write(font, &record)?;
                tables.push(TaggedBuffer { tag, buffer: table });
            }
        }

        Ok(OrderedTables { tables, checksum })
    }
}

impl CollectionBuilder {
    /// `version` is the TTC header version, `0x00010000` or `0x00020000`.
    pub fn new(version: u32) -> Self {
        CollectionBuilder {
            version,
            fonts: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Add a table to the shared pool, returning its id for use in
    /// [`add_font`](Self::add_font).
    pub fn add_table(&mut self, tag: u32, data: Vec<u8>) -> usize {
        self.tables.push((tag, data));
        self.tables.len() - 1
    }

    /// Add a member font referencing previously added tables.
    pub fn add_font(&mut self, flavor: u32, table_ids: Vec<usize>) -> Result<(), WriteError> {
        if table_ids.iter().any(|&id| id >= self.tables.len()) {
            return Err(WriteError::BadValue);
        }
        self.fonts.push(CollectionFont { flavor, table_ids });
        Ok(())
    }

    /// Returns a `Vec<u8>` containing the built collection
    pub fn data(mut self) -> Result<Vec<u8>, ReadWriteError> {
        // The checksum adjustment is recomputed per font, so zero the stored
        // values before any checksums are taken
        for (tag, data) in self.tables.iter_mut() {
            if *tag == tag::HEAD && data.len() >= HeadTable::CHECK_SUM_ADJUSTMENT_OFFSET + 4 {
                let offset = HeadTable::CHECK_SUM_ADJUSTMENT_OFFSET;
                data[offset..offset + 4].fill(0);
            }
        }

        let ttc_header_len = 12 + 4 * self.fonts.len() + if self.version == 0x00020000 { 12 } else { 0 };

        // Member font offset tables follow the TTC header, then the shared tables
        let mut font_offsets = Vec::with_capacity(self.fonts.len());
        let mut next_offset = ttc_header_len;
        for font in &self.fonts {
            font_offsets.push(next_offset);
            next_offset += 12 + font.table_ids.len() * TableRecord::SIZE;
        }

        let mut table_offsets = Vec::with_capacity(self.tables.len());
        for (_tag, data) in &self.tables {
            table_offsets.push(next_offset);
            next_offset += long_align(data.len());
        }

        let table_checksums = self
            .tables
            .iter()
            .map(|(_tag, data)| {
                let mut padded = data.clone();
                padded.resize(long_align(data.len()), 0);
                checksum::table_checksum(&padded)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Serialize each member font's offset table and directory
        let mut font_headers = Vec::with_capacity(self.fonts.len());
        for font in &self.fonts {
            let mut header = WriteBuffer::new();
            let num_tables = u16::try_from(font.table_ids.len()).map_err(WriteError::from)?;
            write_offset_table_header(&mut header, font.flavor, num_tables)?;

            let mut ids = font.table_ids.clone();
            ids.sort_by_key(|&id| self.tables[id].0);
            for id in ids {
                let record = TableRecord {
                    table_tag: self.tables[id].0,
                    checksum: table_checksums[id].0,
                    offset: u32::try_from(table_offsets[id]).map_err(WriteError::from)?,
                    length: u32::try_from(self.tables[id].1.len()).map_err(WriteError::from)?,
                };
                TableRecord::write(&mut header, &record)?;
            }
            font_headers.push(header);
        }

        // Each member font balances its own header, directory, and referenced
        // tables against the checksum magic
        for (font, header) in self.fonts.iter().zip(font_headers.iter()) {
            let mut sum = checksum::table_checksum(header.bytes())?;
            for &id in &font.table_ids {
                sum += table_checksums[id];
            }
            let adjustment = Wrapping(CHECKSUM_MAGIC) - sum;

            if let Some(&head_id) = font
                .table_ids
                .iter()
                .find(|&&id| self.tables[id].0 == tag::HEAD)
            {
                let offset = HeadTable::CHECK_SUM_ADJUSTMENT_OFFSET;
                let data = &mut self.tables[head_id].1;
                if data.len() >= offset + 4 {
                    data[offset..offset + 4].copy_from_slice(&adjustment.0.to_be_bytes());
                }
            }
        }

        // Assemble the file
        let mut file = WriteBuffer::new();
        U32Be::write(&mut file, tag::TTCF)?;
        U32Be::write(&mut file, self.version)?;
        U32Be::write(&mut file, u32::try_from(self.fonts.len()).map_err(WriteError::from)?)?;
        for offset in &font_offsets {
            U32Be::write(&mut file, u32::try_from(*offset).map_err(WriteError::from)?)?;
        }
        if self.version == 0x00020000 {
            // Digital signature fields, zeroed
            U32Be::write(&mut file, 0u32)?;
            U32Be::write(&mut file, 0u32)?;
            U32Be::write(&mut file, 0u32)?;
        }
        for header in &font_headers {
            file.write_bytes(header.bytes())?;
        }
        for (_tag, data) in &self.tables {
            file.write_bytes(data)?;
            file.write_zeros(long_align(data.len()) - data.len())?;
        }

        Ok(file.into_inner())
    }
}

fn write_offset_table_header(
    font: &mut WriteBuffer,
    sfnt_version: u32,
    num_tables: u16,
) -> Result<(), WriteError> {
    let n = max_power_of_2(num_tables);
    let search_range = (1 << n) * 16;
    let entry_selector = n;
    let range_shift = num_tables * 16 - search_range;

    U32Be::write(font, sfnt_version)?;
    U16Be::write(font, num_tables)?;
    U16Be::write(font, search_range)?;
    U16Be::write(font, entry_selector)?;
    U16Be::write(font, range_shift)?;

    Ok(())
}

/// Calculate the maximum power of 2 that is <= num
fn max_power_of_2(num: u16) -> u16 {
    15u16.saturating_sub(num.leading_zeros() as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::tables::OffsetTable;

    #[test]
    fn test_max_power_of_2() {
        assert_eq!(max_power_of_2(0), 0);
        assert_eq!(max_power_of_2(1), 0);
        assert_eq!(max_power_of_2(2), 1);
        assert_eq!(max_power_of_2(4), 2);
        assert_eq!(max_power_of_2(9), 3);
        assert_eq!(max_power_of_2(16), 4);
        assert_eq!(max_power_of_2(0xFFFF), 15);
    }

    #[test]
    fn test_font_builder_whole_file_checksum() {
        let head = crate::tables::tests::head_table_fixture();

        let mut builder = FontBuilder::new(crate::tables::TTF_MAGIC);
        builder.add_table_bytes(tag::MAXP, &[0, 0, 0x50, 0, 0, 3]).unwrap();
        let builder = builder.add_head_table(&head).unwrap();
        let data = builder.data().unwrap();

        // Summing the whole file should produce the checksum magic
        assert_eq!(
            checksum::table_checksum(&data).unwrap(),
            Wrapping(CHECKSUM_MAGIC)
        );

        // And the offset table should read back
        let offset_table = ReadScope::new(&data).read::<OffsetTable<'_>>().unwrap();
        assert_eq!(offset_table.table_records.len(), 2);
    }
}
