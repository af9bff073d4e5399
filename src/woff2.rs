//! Reading and writing of the WOFF2 font format.
//!
//! [`decode`] unpacks a WOFF2 file back into an SFNT font (or 'ttcf' collection),
//! undoing the glyf/loca and hmtx transforms and recomputing the font checksums.
//! [`encode`] packs a TrueType or CFF flavored SFNT into a WOFF2 file, applying
//! the transforms and compressing the table data with Brotli.

pub mod collection;
pub mod glyf;
pub mod hmtx;
mod lut;

use std::collections::HashMap;
use std::convert::TryFrom;
use std::io::{Cursor, Read};

use log::warn;

use self::glyf::{Woff2GlyfTable, Woff2LocaTable};
use self::hmtx::Woff2HmtxTable;
use self::lut::{known_tag_index, KNOWN_TABLE_TAGS};
use crate::assemble::{CollectionBuilder, FontBuilder};
use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadBuf, ReadCtxt, ReadScope};
use crate::binary::write::{self as write, WriteBinary, WriteBuffer, WriteContext};
use crate::binary::{long_align, U16Be, U32Be, U8};
use crate::error::{ParseError, ReadWriteError, WriteError};
use crate::tables::glyf::GlyfTable;
use crate::tables::{HeadTable, HheaTable, HmtxTable, MaxpTable, OffsetTable, TTCF_MAGIC};
use crate::tag;

/// The magic number identifying a WOFF2 file: 'wOF2'
pub const MAGIC: u32 = 0x774F4632;

// This is the default size of the buffer in the brotli crate.
// There's no guidance on how to choose this value.
const BROTLI_DECODER_BUFFER_SIZE: usize = 4096;
const BITS_0_TO_5: u8 = 0x3F;
const LOWEST_UCODE: u16 = 253;
/// Size of the fixed portion of the WOFF2 header
const HEADER_SIZE: usize = 48;

/// Options controlling [`encode`].
#[derive(Debug, Clone)]
pub struct Woff2EncodeOptions {
    /// Brotli quality, 0..=11
    pub brotli_quality: u32,
}

impl Default for Woff2EncodeOptions {
    fn default() -> Self {
        Woff2EncodeOptions { brotli_quality: 11 }
    }
}

/// UIntBase128, variable-length encoding of 32-bit unsigned integers.
#[derive(Copy, Clone)]
pub enum U32Base128 {}

/// 255UInt16, variable-length encoding of a 16-bit unsigned integer for optimized
/// intermediate font data storage.
#[derive(Copy, Clone)]
pub enum PackedU16 {}

pub struct Woff2Font<'a> {
    pub scope: ReadScope<'a>,
    pub woff_header: Woff2Header,
    pub table_directory: Vec<TableDirectoryEntry>,
    pub collection_directory: Option<collection::Directory>,
    /// The Brotli decompressed table data
    pub table_data_block: Vec<u8>,
}

#[derive(Debug)]
pub struct Woff2Header {
    pub flavor: u32,
    pub length: u32,
    pub num_tables: u16,
    pub total_sfnt_size: u32,
    pub total_compressed_size: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub meta_offset: u32,
    pub meta_length: u32,
    pub meta_orig_length: u32,
    pub priv_offset: u32,
    pub priv_length: u32,
}

#[derive(Debug, Clone)]
pub struct TableDirectoryEntry {
    pub tag: u32,
    /// Bits 6–7 of the entry flags byte
    pub transform_version: u8,
    /// Offset of this table's data within the decompressed data block
    pub offset: usize,
    pub orig_length: u32,
    pub transform_length: Option<u32>,
}

/// A borrowed bit array, most significant bit of the first byte first.
pub struct BitSlice<'a> {
    data: &'a [u8],
}

/// Decode a WOFF2 file into an SFNT font.
///
/// Multi-font inputs come back as a 'ttcf' collection, single fonts as a plain
/// SFNT with its tables sorted by tag and `head.checkSumAdjustment` recomputed.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, ReadWriteError> {
    let woff = ReadScope::new(data).read::<Woff2Font<'_>>()?;
    match &woff.collection_directory {
        Some(directory) => decode_collection(&woff, directory),
        None => decode_single(&woff),
    }
}

/// Encode a TrueType or CFF flavored SFNT font as WOFF2.
pub fn encode(data: &[u8], options: &Woff2EncodeOptions) -> Result<Vec<u8>, ReadWriteError> {
    let scope = ReadScope::new(data);
    let offset_table = scope
        .read::<OffsetTable<'_>>()
        .map_err(|_err| ParseError::SfntInvalid)?;

    // DSIG is invalidated by re-packing and never carried over. The sort fixes
    // both the WOFF2 directory order and the order of table data in the
    // compressed block.
    let mut records: Vec<_> = offset_table
        .table_records
        .iter()
        .filter(|record| record.table_tag != tag::DSIG)
        .collect();
    records.sort_by_key(|record| record.table_tag);

    let head_record = records
        .iter()
        .find(|record| record.table_tag == tag::HEAD)
        .copied();
    let head = head_record
        .map(|record| {
            record
                .read_table(&scope)
                .and_then(|table| table.read::<HeadTable>())
                .map_err(|_err| ParseError::SfntInvalid)
        })
        .transpose()?;

    let has_glyf = records.iter().any(|record| record.table_tag == tag::GLYF);
    let has_loca = records.iter().any(|record| record.table_tag == tag::LOCA);
    if has_glyf != has_loca {
        return Err(ReadWriteError::from(ParseError::SfntInvalid));
    }
    let is_truetype = has_glyf && has_loca;

    // Apply the table transforms
    let mut transformed: HashMap<u32, (u8, Vec<u8>)> = HashMap::new();
    if is_truetype {
        let head = head.clone().ok_or(ParseError::MissingTable(tag::HEAD))?;
        let maxp = read_encode_table::<MaxpTable>(&offset_table, &scope, tag::MAXP)?;
        let hhea = read_encode_table::<HheaTable>(&offset_table, &scope, tag::HHEA)?;
        let num_glyphs = usize::from(maxp.num_glyphs);

        let loca_data = offset_table
            .read_table(&scope, tag::LOCA)?
            .ok_or(ParseError::MissingTable(tag::LOCA))?;
        let loca = loca_data
            .read_dep::<crate::tables::loca::LocaTable<'_>>((
                num_glyphs,
                head.index_to_loc_format,
            ))
            .map_err(|_err| ParseError::SfntInvalid)?;
        let glyf_data = offset_table
            .read_table(&scope, tag::GLYF)?
            .ok_or(ParseError::MissingTable(tag::GLYF))?;
        let glyf = glyf_data
            .read_dep::<GlyfTable<'_>>(&loca)
            .map_err(|_err| ParseError::SfntInvalid)?;

        let ((), glyf_payload) =
            write::buffer::<_, Woff2GlyfTable>(&glyf, head.index_to_loc_format)?;
        transformed.insert(tag::GLYF, (0, glyf_payload.into_inner()));
        transformed.insert(tag::LOCA, (0, Vec::new()));

        if let Some(hmtx_data) = offset_table.read_table(&scope, tag::HMTX)? {
            let hmtx = hmtx_data
                .read_dep::<HmtxTable<'_>>((num_glyphs, usize::from(hhea.num_h_metrics)))
                .map_err(|_err| ParseError::SfntInvalid)?;
            if let Some(payload) = Woff2HmtxTable::transform(
                &hmtx,
                &glyf,
                num_glyphs,
                usize::from(hhea.num_h_metrics),
            )? {
                transformed.insert(tag::HMTX, (1, payload));
            }
        }
    }

    // Build the directory and concatenate the table data in directory order
    let mut directory = WriteBuffer::new();
    let mut data_block = Vec::new();
    let mut total_sfnt_size = 12 + records.len() * 16;
    for record in &records {
        let (transform_version, payload) = match transformed.remove(&record.table_tag) {
            Some((version, payload)) => (version, payload),
            None if record.table_tag == tag::HEAD => {
                // A WOFF2 derived font must have the lossless-compression bit set
                // in head.flags, applied here to a copy
                (0, head_with_lossless_flag(head.as_ref())?)
            }
            None => (0, record.read_table(&scope)?.data().to_vec()),
        };

        let orig_length = match record.table_tag {
            // Transformed tables keep their original lengths beside the
            // transformed data
            tag::GLYF | tag::LOCA | tag::HMTX => record.length,
            _ => u32::try_from(payload.len()).map_err(ParseError::from)?,
        };
        total_sfnt_size += long_align(usize::try_from(orig_length).map_err(ParseError::from)?);

        let known_index = known_tag_index(record.table_tag);
        let flags = known_index.unwrap_or(63) | (transform_version << 6);
        U8::write(&mut directory, flags)?;
        if known_index.is_none() {
            U32Be::write(&mut directory, record.table_tag)?;
        }
        U32Base128::write(&mut directory, orig_length)?;
        match (record.table_tag, transform_version) {
            (tag::GLYF, 0) | (tag::LOCA, 0) => {
                U32Base128::write(&mut directory, u32::try_from(payload.len()).map_err(ParseError::from)?)?
            }
            (_, 0) => {}
            _ => U32Base128::write(&mut directory, u32::try_from(payload.len()).map_err(ParseError::from)?)?,
        }

        data_block.extend_from_slice(&payload);
    }

    let compressed = brotli_compress(&data_block, options.brotli_quality)?;

    let length = HEADER_SIZE + directory.len() + compressed.len();
    let (major_version, minor_version) = match &head {
        Some(head) => {
            let revision = head.font_revision.raw_value();
            ((revision >> 16) as u16, revision as u16)
        }
        None => (0, 0),
    };

    let mut out = WriteBuffer::new();
    U32Be::write(&mut out, MAGIC)?;
    U32Be::write(&mut out, offset_table.sfnt_version)?;
    U32Be::write(&mut out, u32::try_from(length).map_err(ParseError::from)?)?;
    U16Be::write(&mut out, u16::try_from(records.len()).map_err(ParseError::from)?)?;
    U16Be::write(&mut out, 0u16)?; // reserved
    U32Be::write(&mut out, u32::try_from(total_sfnt_size).map_err(ParseError::from)?)?;
    U32Be::write(&mut out, u32::try_from(compressed.len()).map_err(ParseError::from)?)?;
    U16Be::write(&mut out, major_version)?;
    U16Be::write(&mut out, minor_version)?;
    U32Be::write(&mut out, 0u32)?; // meta offset
    U32Be::write(&mut out, 0u32)?; // meta length
    U32Be::write(&mut out, 0u32)?; // meta orig length
    U32Be::write(&mut out, 0u32)?; // priv offset
    U32Be::write(&mut out, 0u32)?; // priv length
    out.write_bytes(directory.bytes())?;
    out.write_bytes(&compressed)?;

    Ok(out.into_inner())
}

fn decode_single(woff: &Woff2Font<'_>) -> Result<Vec<u8>, ReadWriteError> {
    let entries: Vec<&TableDirectoryEntry> = woff.table_directory.iter().collect();
    let tables = reconstruct_font_tables(woff, &entries)?;
    build_font(woff.woff_header.flavor, tables)
}

fn decode_collection(
    woff: &Woff2Font<'_>,
    directory: &collection::Directory,
) -> Result<Vec<u8>, ReadWriteError> {
    let mut builder = CollectionBuilder::new(directory.version());
    // Tables shared between member fonts are stored once, keyed by their index
    // in the top-level table directory
    let mut shared: HashMap<usize, usize> = HashMap::new();

    for font in directory.fonts() {
        let entries: Vec<&TableDirectoryEntry> = font
            .table_indices()
            .iter()
            .map(|&index| &woff.table_directory[index])
            .collect();
        let tables = reconstruct_font_tables(woff, &entries)?;

        let mut table_ids = Vec::with_capacity(tables.len());
        for (&dir_index, (table_tag, data)) in font.table_indices().iter().zip(tables) {
            let id = *shared
                .entry(dir_index)
                .or_insert_with(|| builder.add_table(table_tag, data));
            table_ids.push(id);
        }
        builder.add_font(font.flavor(), table_ids)?;
    }

    builder.data()
}

/// Undo any table transforms, returning one `(tag, data)` pair per entry in
/// `entries` order.
fn reconstruct_font_tables(
    woff: &Woff2Font<'_>,
    entries: &[&TableDirectoryEntry],
) -> Result<Vec<(u32, Vec<u8>)>, ReadWriteError> {
    let block = woff.table_data_block_scope();
    let find = |tag: u32| entries.iter().copied().find(|entry| entry.tag == tag);

    let glyf_entry = find(tag::GLYF);
    let loca_entry = find(tag::LOCA);
    let hmtx_entry = find(tag::HMTX);
    let glyf_transformed = glyf_entry.map_or(false, |entry| entry.transformed());
    let loca_transformed = loca_entry.map_or(false, |entry| entry.transformed());
    // glyf and loca are a unit: the one transform covers both
    if glyf_transformed != loca_transformed {
        return Err(ReadWriteError::from(ParseError::BadTransform));
    }
    let hmtx_transformed = hmtx_entry.map_or(false, |entry| entry.transformed());

    let mut reconstructed: HashMap<u32, Vec<u8>> = HashMap::new();
    if glyf_transformed || hmtx_transformed {
        let glyf_entry = glyf_entry.ok_or(ParseError::MissingTable(tag::GLYF))?;
        let loca_entry = loca_entry.ok_or(ParseError::MissingTable(tag::LOCA))?;
        let head = read_woff2_table::<HeadTable>(entries, &block, tag::HEAD)?;
        let maxp = read_woff2_table::<MaxpTable>(entries, &block, tag::MAXP)?;
        let num_glyphs = usize::from(maxp.num_glyphs);

        let loca_data = loca_entry.read_table(&block)?;
        let loca = loca_data.scope().read_dep::<Woff2LocaTable>((
            loca_entry,
            num_glyphs,
            head.index_to_loc_format,
        ))?;
        let glyf_data = glyf_entry.read_table(&block)?;
        let glyf = glyf_data.scope().read_dep::<Woff2GlyfTable>((
            glyf_entry,
            &loca,
            num_glyphs,
            head.index_to_loc_format,
        ))?;

        if hmtx_transformed {
            let hmtx_entry = hmtx_entry.ok_or(ParseError::MissingTable(tag::HMTX))?;
            let hhea = read_woff2_table::<HheaTable>(entries, &block, tag::HHEA)?;
            let hmtx_data = hmtx_entry.read_table(&block)?;
            let hmtx = hmtx_data.scope().read_dep::<Woff2HmtxTable>((
                hmtx_entry,
                &glyf,
                num_glyphs,
                usize::from(hhea.num_h_metrics),
            ))?;
            let ((), data) = write::buffer::<_, HmtxTable<'_>>(&hmtx, ())?;
            reconstructed.insert(tag::HMTX, data.into_inner());
        }

        if glyf_transformed {
            // The regenerated loca must be the size the directory promised
            let loca_width = match head.index_to_loc_format {
                crate::tables::IndexToLocFormat::Short => 2,
                crate::tables::IndexToLocFormat::Long => 4,
            };
            let expected_loca_len = (num_glyphs + 1) * loca_width;
            if loca_entry.orig_length as usize != expected_loca_len {
                return Err(ReadWriteError::from(ParseError::BadTransform));
            }

            let (loca, data) = write::buffer::<_, GlyfTable<'_>>(glyf, ())?;
            reconstructed.insert(tag::GLYF, data.into_inner());
            let ((), data) =
                write::buffer::<_, crate::tables::loca::owned::LocaTable>(loca, head.index_to_loc_format)?;
            reconstructed.insert(tag::LOCA, data.into_inner());
        }
    }

    entries
        .iter()
        .map(|entry| {
            let data = match reconstructed.remove(&entry.tag) {
                Some(data) => data,
                None => entry.read_table(&block)?.scope().data().to_vec(),
            };
            Ok((entry.tag, data))
        })
        .collect::<Result<Vec<_>, ParseError>>()
        .map_err(ReadWriteError::from)
}

fn build_font(flavor: u32, tables: Vec<(u32, Vec<u8>)>) -> Result<Vec<u8>, ReadWriteError> {
    let mut head_data = None;
    let mut builder = FontBuilder::new(flavor);
    for (table_tag, data) in tables {
        if table_tag == tag::HEAD {
            head_data = Some(data);
        } else {
            builder.add_table_bytes(table_tag, &data)?;
        }
    }

    let head_data = head_data.ok_or(ParseError::MissingTable(tag::HEAD))?;
    let head = ReadScope::new(&head_data).read::<HeadTable>()?;
    builder.add_head_table(&head)?.data()
}

fn read_woff2_table<T>(
    entries: &[&TableDirectoryEntry],
    block: &ReadScope<'_>,
    table_tag: u32,
) -> Result<T, ParseError>
where
    T: for<'b> ReadBinaryDep<'b, Args = (), HostType = T>,
{
    let entry = entries
        .iter()
        .find(|entry| entry.tag == table_tag)
        .ok_or(ParseError::MissingTable(table_tag))?;
    entry.read_table(block)?.scope().read::<T>()
}

fn read_encode_table<T>(
    offset_table: &OffsetTable<'_>,
    scope: &ReadScope<'_>,
    table_tag: u32,
) -> Result<T, ParseError>
where
    T: for<'b> ReadBinaryDep<'b, Args = (), HostType = T>,
{
    offset_table
        .read_table(scope, table_tag)?
        .ok_or(ParseError::MissingTable(table_tag))?
        .read::<T>()
        .map_err(|_err| ParseError::SfntInvalid)
}

fn head_with_lossless_flag(head: Option<&HeadTable>) -> Result<Vec<u8>, ReadWriteError> {
    let head = head.ok_or(ParseError::MissingTable(tag::HEAD))?;
    let mut head = head.clone();
    head.flags |= HeadTable::FLAG_LOSSLESS;
    let (placeholder, mut buffer) = write::buffer::<_, HeadTable>(&head, ())?;
    buffer.write_placeholder(placeholder, head.check_sum_adjustment)?;
    Ok(buffer.into_inner())
}

fn brotli_compress(data: &[u8], quality: u32) -> Result<Vec<u8>, ParseError> {
    let mut params = brotli::enc::BrotliEncoderParams::default();
    params.quality = quality.min(11) as i32;
    params.mode = brotli::enc::backward_references::BrotliEncoderMode::BROTLI_MODE_FONT;
    params.size_hint = data.len();

    let mut input = data;
    let mut output = Vec::new();
    brotli::BrotliCompress(&mut input, &mut output, &params)
        .map_err(|_err| ParseError::CompressionError)?;
    Ok(output)
}

impl<'a> Woff2Font<'a> {
    /// The "sfnt version" of the input font
    pub fn flavor(&self) -> u32 {
        self.woff_header.flavor
    }

    /// Decompress and return the extended metadata XML if present
    pub fn extended_metadata(&self) -> Result<Option<String>, ParseError> {
        let offset = usize::try_from(self.woff_header.meta_offset)?;
        let length = usize::try_from(self.woff_header.meta_length)?;
        if offset == 0 || length == 0 {
            return Ok(None);
        }

        let compressed_metadata = self.scope.offset_length(offset, length)?;

        let mut input = brotli_decompressor::Decompressor::new(
            Cursor::new(compressed_metadata.data()),
            BROTLI_DECODER_BUFFER_SIZE,
        );
        let mut metadata = String::new();
        input
            .read_to_string(&mut metadata)
            .map_err(|_err| ParseError::CompressionError)?;

        Ok(Some(metadata))
    }

    pub fn table_data_block_scope(&'a self) -> ReadScope<'a> {
        ReadScope::new(&self.table_data_block)
    }

    fn read_table_directory(
        ctxt: &mut ReadCtxt<'_>,
        num_tables: usize,
    ) -> Result<Vec<TableDirectoryEntry>, ParseError> {
        let mut offset = 0;
        let mut table_directory = Vec::with_capacity(num_tables);
        for _i in 0..num_tables {
            let entry = ctxt.read_dep::<TableDirectoryEntry>(offset)?;
            offset += entry.length();
            table_directory.push(entry);
        }

        Ok(table_directory)
    }

    pub fn find_table_entry(&self, tag: u32, index: usize) -> Option<&TableDirectoryEntry> {
        if let Some(collection_directory) = &self.collection_directory {
            collection_directory
                .get(index)
                .and_then(|font| font.table_entries(self).find(|entry| entry.tag == tag))
        } else {
            self.table_directory.iter().find(|entry| entry.tag == tag)
        }
    }

    pub fn read_table(&self, tag: u32, index: usize) -> Result<Option<ReadBuf<'_>>, ParseError> {
        self.find_table_entry(tag, index)
            .map(|entry| entry.read_table(&self.table_data_block_scope()))
            .transpose()
    }
}

impl<'a> ReadBinary<'a> for Woff2Font<'a> {
    type HostType = Self;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let woff_header = ctxt.read::<Woff2Header>()?;

        if usize::try_from(woff_header.length)? != scope.data().len() {
            return Err(ParseError::BadDirectory);
        }
        if woff_header.num_tables == 0 {
            return Err(ParseError::BadDirectory);
        }
        check_block_bounds(&scope, woff_header.meta_offset, woff_header.meta_length)?;
        check_block_bounds(&scope, woff_header.priv_offset, woff_header.priv_length)?;

        let table_directory =
            Self::read_table_directory(ctxt, usize::from(woff_header.num_tables))?;

        let collection_directory = if woff_header.flavor == TTCF_MAGIC {
            Some(ctxt.read_dep::<collection::Directory>(table_directory.len())?)
        } else {
            None
        };

        // Read and decompress the font table data
        let compressed_data =
            ctxt.read_slice(usize::try_from(woff_header.total_compressed_size)?)?;
        let mut input = brotli_decompressor::Decompressor::new(
            Cursor::new(compressed_data),
            BROTLI_DECODER_BUFFER_SIZE,
        );
        let mut table_data_block = Vec::new();
        input
            .read_to_end(&mut table_data_block)
            .map_err(|_err| ParseError::CompressionError)?;

        // The decompressed block must hold exactly the tables the directory declares
        let expected: usize = table_directory.iter().map(TableDirectoryEntry::length).sum();
        if table_data_block.len() != expected {
            return Err(ParseError::CompressionError);
        }

        Ok(Woff2Font {
            scope,
            woff_header,
            table_directory,
            collection_directory,
            table_data_block,
        })
    }
}

fn check_block_bounds(scope: &ReadScope<'_>, offset: u32, length: u32) -> Result<(), ParseError> {
    if offset != 0 {
        let end = usize::try_from(offset)?
            .checked_add(usize::try_from(length)?)
            .ok_or(ParseError::BadEof)?;
        if end > scope.data().len() {
            return Err(ParseError::BadEof);
        }
    }
    Ok(())
}

impl<'a> ReadBinary<'a> for Woff2Header {
    type HostType = Self;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        // Even an input too short to hold the signature is a signature mismatch
        let signature = ctxt.read_u32be().map_err(|_err| ParseError::BadSignature)?;
        match signature {
            MAGIC => {
                let flavor = ctxt.read_u32be()?;
                let length = ctxt.read_u32be()?;
                let num_tables = ctxt.read_u16be()?;
                let reserved = ctxt.read_u16be()?;
                // The header includes a reserved field; this MUST be set to zero. If this field is
                // non-zero, a conforming user agent MUST reject the file as invalid.
                ctxt.check(reserved == 0)?;
                let total_sfnt_size = ctxt.read_u32be()?;
                let total_compressed_size = ctxt.read_u32be()?;
                // The WOFF majorVersion and minorVersion fields specify the version number for a
                // given WOFF file. They have no effect on font loading or usage behavior.
                let major_version = ctxt.read_u16be()?;
                let minor_version = ctxt.read_u16be()?;
                let meta_offset = ctxt.read_u32be()?;
                let meta_length = ctxt.read_u32be()?;
                let meta_orig_length = ctxt.read_u32be()?;
                let priv_offset = ctxt.read_u32be()?;
                let priv_length = ctxt.read_u32be()?;

                Ok(Woff2Header {
                    flavor,
                    length,
                    num_tables,
                    total_sfnt_size,
                    total_compressed_size,
                    major_version,
                    minor_version,
                    meta_offset,
                    meta_length,
                    meta_orig_length,
                    priv_offset,
                    priv_length,
                })
            }
            _ => Err(ParseError::BadSignature),
        }
    }
}

impl<'a> ReadBinaryDep<'a> for TableDirectoryEntry {
    type Args = usize;
    type HostType = Self;

    fn read_dep(ctxt: &mut ReadCtxt<'a>, offset: usize) -> Result<Self, ParseError> {
        let flags = ctxt.read_u8()?;
        let tag = if flags & BITS_0_TO_5 == 63 {
            // Tag is the following 4 bytes
            ctxt.read_u32be()
        } else {
            Ok(KNOWN_TABLE_TAGS[usize::from(flags & BITS_0_TO_5)])
        }?;
        let transform_version = flags >> 6;
        let orig_length = ctxt.read::<U32Base128>()?;

        // For glyf and loca version 0 means transformed and version 3 means
        // untransformed; for every other table version 0 is the null transform.
        // The transform length is present exactly when a transform applies.
        let transform_length = match (tag, transform_version) {
            (tag::GLYF, 0) | (tag::LOCA, 0) => Some(ctxt.read::<U32Base128>()?),
            (tag::GLYF, 3) | (tag::LOCA, 3) => {
                warn!("glyf/loca stored untransformed");
                None
            }
            (tag::GLYF, _) | (tag::LOCA, _) => return Err(ParseError::BadTransform),
            (tag::HMTX, 1) => Some(ctxt.read::<U32Base128>()?),
            (_, 0) => None,
            _ => return Err(ParseError::BadTransform),
        };

        // A transformed loca has no data of its own
        if tag == tag::LOCA && transform_length.map_or(false, |length| length != 0) {
            return Err(ParseError::BadDirectory);
        }

        Ok(TableDirectoryEntry {
            tag,
            transform_version,
            offset,
            orig_length,
            transform_length,
        })
    }
}

impl TableDirectoryEntry {
    /// Is a transform applied to this table?
    pub fn transformed(&self) -> bool {
        match self.tag {
            tag::GLYF | tag::LOCA => self.transform_version == 0,
            _ => self.transform_version != 0,
        }
    }

    /// The number of bytes this table occupies in the decompressed data block.
    fn length(&self) -> usize {
        if self.transformed() {
            self.transform_length.unwrap_or(0) as usize
        } else {
            self.orig_length as usize
        }
    }

    /// Read the contents of a table entry
    pub fn read_table<'a>(&self, scope: &ReadScope<'a>) -> Result<ReadBuf<'a>, ParseError> {
        let table_data = scope.offset_length(self.offset, self.length())?;

        Ok(ReadBuf::from(table_data.data()))
    }
}

// Parse "255UInt16" Data Type
// https://w3c.github.io/woff/woff2/#255UInt16-0
impl<'a> ReadBinary<'a> for PackedU16 {
    type HostType = u16;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<u16, ParseError> {
        match ctxt.read_u8()? {
            253 => ctxt.read_u16be(),
            254 => ctxt
                .read_u8()
                .map(|value| u16::from(value) + LOWEST_UCODE * 2),
            255 => ctxt.read_u8().map(|value| u16::from(value) + LOWEST_UCODE),
            code => Ok(u16::from(code)),
        }
        .map_err(ParseError::from)
    }
}

impl WriteBinary<u16> for PackedU16 {
    type Output = ();

    /// Writes the shortest form for the value.
    fn write<C: WriteContext>(ctxt: &mut C, value: u16) -> Result<(), WriteError> {
        match value {
            0..=252 => ctxt.write_bytes(&[value as u8]),
            253..=505 => ctxt.write_bytes(&[255, (value - LOWEST_UCODE) as u8]),
            506..=761 => ctxt.write_bytes(&[254, (value - LOWEST_UCODE * 2) as u8]),
            _ => {
                ctxt.write_bytes(&[253])?;
                ctxt.write_bytes(&value.to_be_bytes())
            }
        }
    }
}

// Parse "UIntBase128" Data Type
// https://w3c.github.io/woff/woff2/#UIntBase128-0
impl<'a> ReadBinary<'a> for U32Base128 {
    type HostType = u32;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<u32, ParseError> {
        let mut accum = 0u32;

        for i in 0..5 {
            let byte = ctxt.read_u8()?;

            // No leading 0's
            if i == 0 && byte == 0x80 {
                return Err(ParseError::BadDirectory);
            }

            // If any of the top 7 bits are set then << 7 would overflow
            if accum & 0xFE000000 != 0 {
                return Err(ParseError::BadDirectory);
            }

            // value = old value times 128 + (byte bitwise-and 127)
            accum = (accum << 7) | u32::from(byte & 0x7F);

            // Spin until most significant bit of data byte is false
            if byte & 0x80 == 0 {
                return Ok(accum);
            }
        }

        // UIntBase128 sequence exceeds 5 bytes
        Err(ParseError::BadDirectory)
    }
}

impl WriteBinary<u32> for U32Base128 {
    type Output = ();

    /// Writes the minimum number of 7-bit groups for the value.
    fn write<C: WriteContext>(ctxt: &mut C, value: u32) -> Result<(), WriteError> {
        let groups = (32 - value.leading_zeros()).div_ceil(7).max(1);
        for i in (0..groups).rev() {
            let mut byte = ((value >> (7 * i)) & 0x7F) as u8;
            if i > 0 {
                byte |= 0x80;
            }
            ctxt.write_bytes(&[byte])?;
        }
        Ok(())
    }
}

impl<'a> BitSlice<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitSlice { data }
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len() {
            return None;
        }

        // The bits are packed so that index 0 corresponds to the most significant
        // bit of the first byte, index 7 to the least significant bit of the first
        // byte, index 8 to the most significant bit of the second byte, and so on.
        let byte_index = index / 8;
        let shl = 8 - (index % 8) - 1;
        let mask = 1 << shl;

        Some(self.data[byte_index] & mask == mask)
    }

    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_slice_get() {
        let inner = vec![0b1111_1110, 0b0000_0001];
        let bits = BitSlice::new(&inner);

        assert_eq!(bits.len(), 16);
        assert_eq!(bits.get(0), Some(true));
        assert_eq!(bits.get(7), Some(false));
        assert_eq!(bits.get(8), Some(false));
        assert_eq!(bits.get(15), Some(true));
        assert_eq!(bits.get(16), None);
    }

    #[test]
    fn test_read_packed_u16() {
        assert_eq!(
            ReadScope::new(&[255, 253]).read::<PackedU16>().unwrap(),
            506
        );
        assert_eq!(ReadScope::new(&[254, 0]).read::<PackedU16>().unwrap(), 506);
        assert_eq!(
            ReadScope::new(&[253, 1, 250]).read::<PackedU16>().unwrap(),
            506
        );
        assert_eq!(ReadScope::new(&[5u8]).read::<PackedU16>().unwrap(), 5);
        assert!(ReadScope::new(&[254u8]).read::<PackedU16>().is_err());
    }

    #[test]
    fn test_write_packed_u16_round_trip_minimal() {
        for value in [0u16, 1, 252, 253, 505, 506, 761, 762, 0x1234, u16::MAX] {
            let mut buffer = WriteBuffer::new();
            PackedU16::write(&mut buffer, value).unwrap();

            let expected_len = match value {
                0..=252 => 1,
                253..=761 => 2,
                _ => 3,
            };
            assert_eq!(buffer.len(), expected_len, "value {}", value);
            assert_eq!(
                ReadScope::new(buffer.bytes()).read::<PackedU16>().unwrap(),
                value
            );
        }
    }

    #[test]
    fn test_read_u32base128() {
        assert_eq!(ReadScope::new(&[0x3F]).read::<U32Base128>().unwrap(), 63);
        assert_eq!(
            ReadScope::new(&[0x85, 0x07]).read::<U32Base128>().unwrap(),
            647
        );
        assert_eq!(
            ReadScope::new(&[0xFF, 0xFA, 0x00])
                .read::<U32Base128>()
                .unwrap(),
            2_096_384
        );
        assert_eq!(
            ReadScope::new(&[0x8F, 0xFF, 0xFF, 0xFF, 0x7F])
                .read::<U32Base128>()
                .unwrap(),
            0xFFFFFFFF
        );
    }

    #[test]
    fn test_read_u32base128_err() {
        // Leading zeros
        assert!(ReadScope::new(&[0x80, 0x01]).read::<U32Base128>().is_err());

        // Overflow
        assert!(ReadScope::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F])
            .read::<U32Base128>()
            .is_err());

        // More than 5 bytes
        assert!(ReadScope::new(&[0x8F, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F])
            .read::<U32Base128>()
            .is_err());
    }

    #[test]
    fn test_write_u32base128_round_trip_minimal() {
        for value in [0u32, 1, 127, 128, 647, 16_383, 16_384, 2_096_384, u32::MAX] {
            let mut buffer = WriteBuffer::new();
            U32Base128::write(&mut buffer, value).unwrap();

            let expected_len = match value {
                0..=0x7F => 1,
                0x80..=0x3FFF => 2,
                0x4000..=0x1F_FFFF => 3,
                0x20_0000..=0xFFF_FFFF => 4,
                _ => 5,
            };
            assert_eq!(buffer.len(), expected_len, "value {}", value);
            assert_eq!(
                ReadScope::new(buffer.bytes()).read::<U32Base128>().unwrap(),
                value
            );
        }
    }

    #[test]
    fn test_directory_entry_known_tag() {
        // Flags byte 0 is cmap, untransformed, followed by origLength 100
        let data = [0u8, 100];
        let entry = ReadScope::new(&data)
            .read_dep::<TableDirectoryEntry>(0)
            .unwrap();
        assert_eq!(entry.tag, tag::CMAP);
        assert_eq!(entry.orig_length, 100);
        assert_eq!(entry.transform_length, None);
        assert!(!entry.transformed());
    }

    #[test]
    fn test_directory_entry_arbitrary_tag() {
        let data = [63u8, b'x', b'y', b'z', b'w', 10];
        let entry = ReadScope::new(&data)
            .read_dep::<TableDirectoryEntry>(0)
            .unwrap();
        assert_eq!(entry.tag, tag!(b"xyzw"));
        assert_eq!(entry.orig_length, 10);
    }

    #[test]
    fn test_directory_entry_transformed_glyf() {
        // glyf is known tag 10; version 0 means transformed with a transform length
        let data = [10u8, 100, 60];
        let entry = ReadScope::new(&data)
            .read_dep::<TableDirectoryEntry>(0)
            .unwrap();
        assert!(entry.transformed());
        assert_eq!(entry.transform_length, Some(60));
        assert_eq!(entry.length(), 60);
    }

    #[test]
    fn test_directory_entry_untransformed_glyf() {
        // Version 3 on glyf means stored untransformed
        let data = [10u8 | 0xC0, 100];
        let entry = ReadScope::new(&data)
            .read_dep::<TableDirectoryEntry>(0)
            .unwrap();
        assert!(!entry.transformed());
        assert_eq!(entry.length(), 100);
    }

    #[test]
    fn test_directory_entry_reserved_glyf_version() {
        let data = [10u8 | 0x40, 100, 60];
        assert!(matches!(
            ReadScope::new(&data).read_dep::<TableDirectoryEntry>(0),
            Err(ParseError::BadTransform)
        ));
    }

    #[test]
    fn test_directory_entry_transformed_loca_must_be_empty() {
        // loca is known tag 11; version 0 transformed but with a nonzero length
        let data = [11u8, 40, 1];
        assert!(matches!(
            ReadScope::new(&data).read_dep::<TableDirectoryEntry>(0),
            Err(ParseError::BadDirectory)
        ));
    }

    #[test]
    fn test_decode_rejects_bad_signature() {
        assert!(matches!(
            decode(&[0x00]),
            Err(ReadWriteError::Read(ParseError::BadSignature))
        ));
        assert!(matches!(
            decode(b"wOFF\x00\x01\x00\x00"),
            Err(ReadWriteError::Read(ParseError::BadSignature))
        ));
    }

    // A minimal head table with the checksum adjustment zeroed and `filler`
    // sprinkled through so the two heads in the collection test differ.
    fn head_bytes(filler: u8) -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[1] = 1; // majorVersion
        head[4..8].copy_from_slice(&0x00010000u32.to_be_bytes()); // fontRevision
        head[12..16].copy_from_slice(&0x5F0F3CF5u32.to_be_bytes()); // magicNumber
        head[17] = 3; // flags
        head[19] = 250; // unitsPerEm
        head[32] = filler;
        head[53] = 0; // glyphDataFormat
        head
    }

    #[test]
    fn test_decode_collection_shares_tables() {
        use crate::assemble::CHECKSUM_MAGIC;
        use crate::checksum;
        use std::num::Wrapping;

        let head0 = head_bytes(0x11);
        let head1 = head_bytes(0x22);
        let maxp = vec![0x00, 0x00, 0x50, 0x00, 0x00, 0x02]; // version 0.5, 2 glyphs
        let cvt0 = vec![0, 10, 0, 20];
        let cvt1 = vec![0, 30, 0, 40, 0, 50];

        // Directory and data block order: head0, head1, maxp, cvt0, cvt1.
        // head is known tag 1, maxp 4, cvt 8; all untransformed.
        let tables: [(&[u8], u8); 5] = [
            (&head0, 1),
            (&head1, 1),
            (&maxp, 4),
            (&cvt0, 8),
            (&cvt1, 8),
        ];
        let mut directory = Vec::new();
        let mut data_block = Vec::new();
        for (data, known_tag) in tables {
            directory.push(known_tag);
            directory.push(data.len() as u8); // origLength, single base128 byte
            data_block.extend_from_slice(data);
        }

        // Two member fonts sharing maxp, with their own head and cvt
        #[rustfmt::skip]
        let collection = [
            0x00, 0x01, 0x00, 0x00, // version
            2, // numFonts
            3, 0x00, 0x01, 0x00, 0x00, 0, 2, 3, // font 0
            3, 0x00, 0x01, 0x00, 0x00, 1, 2, 4, // font 1
        ];

        let compressed = brotli_compress(&data_block, 9).unwrap();
        let length = HEADER_SIZE + directory.len() + collection.len() + compressed.len();

        let mut file = WriteBuffer::new();
        U32Be::write(&mut file, MAGIC).unwrap();
        U32Be::write(&mut file, TTCF_MAGIC).unwrap();
        U32Be::write(&mut file, length as u32).unwrap();
        U16Be::write(&mut file, 5u16).unwrap(); // numTables
        U16Be::write(&mut file, 0u16).unwrap(); // reserved
        U32Be::write(&mut file, 0u32).unwrap(); // totalSfntSize
        U32Be::write(&mut file, compressed.len() as u32).unwrap();
        file.write_zeros(4).unwrap(); // major/minor version
        file.write_zeros(20).unwrap(); // meta/priv fields
        file.write_bytes(&directory).unwrap();
        file.write_bytes(&collection).unwrap();
        file.write_bytes(&compressed).unwrap();

        let out = decode(file.bytes()).expect("unable to decode collection");

        // TTC header
        assert_eq!(&out[0..4], b"ttcf");
        assert_eq!(&out[4..8], &0x00010000u32.to_be_bytes());
        assert_eq!(&out[8..12], &2u32.to_be_bytes());

        let font_offsets: Vec<usize> = (0..2)
            .map(|i| {
                u32::from_be_bytes(out[12 + 4 * i..16 + 4 * i].try_into().unwrap()) as usize
            })
            .collect();

        // Each member font balances to the checksum magic, and the shared maxp
        // is stored once
        let mut maxp_offsets = Vec::new();
        for &font_offset in &font_offsets {
            let num_tables =
                u16::from_be_bytes(out[font_offset + 4..font_offset + 6].try_into().unwrap());
            assert_eq!(num_tables, 3);

            let mut sum = checksum::table_checksum(
                &out[font_offset..font_offset + 12 + 16 * usize::from(num_tables)],
            )
            .unwrap();
            for record in 0..usize::from(num_tables) {
                let entry = font_offset + 12 + 16 * record;
                let tag_value =
                    u32::from_be_bytes(out[entry..entry + 4].try_into().unwrap());
                let offset =
                    u32::from_be_bytes(out[entry + 8..entry + 12].try_into().unwrap()) as usize;
                let table_length =
                    u32::from_be_bytes(out[entry + 12..entry + 16].try_into().unwrap()) as usize;
                sum += checksum::table_checksum(&out[offset..offset + long_align(table_length)])
                    .unwrap();
                if tag_value == tag::MAXP {
                    maxp_offsets.push(offset);
                }
            }
            assert_eq!(sum, Wrapping(CHECKSUM_MAGIC));
        }
        assert_eq!(maxp_offsets.len(), 2);
        assert_eq!(maxp_offsets[0], maxp_offsets[1]);
    }
}
