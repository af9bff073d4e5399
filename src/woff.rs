//! Reading and writing of the WOFF font format.
//!
//! WOFF 1.0 is a thin wrapper around an SFNT font: each table is individually
//! zlib compressed and described by a fixed-size directory entry. Nothing in
//! the font itself is rewritten, so [`decode`] followed by [`encode`] (and vice
//! versa) reproduce their inputs byte for byte.

use std::convert::TryFrom;
use std::io::{Read, Write};

use flate2::bufread::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::binary::read::{
    ReadArray, ReadBinary, ReadBuf, ReadCtxt, ReadFrom, ReadScope,
};
use crate::binary::write::{WriteBinary, WriteBuffer, WriteContext};
use crate::binary::{long_align, U16Be, U32Be};
use crate::error::{ParseError, ReadWriteError, WriteError};
use crate::tables::{HeadTable, OffsetTable, TableRecord};
use crate::tag;

/// The magic number identifying a WOFF file: 'wOFF'
pub const MAGIC: u32 = 0x774F4646;

/// Size of the fixed portion of the WOFF header
const HEADER_SIZE: usize = 44;
/// Size of a WOFF table directory entry
const DIR_ENTRY_SIZE: usize = 20;

/// Options controlling [`encode`].
#[derive(Debug, Clone)]
pub struct WoffEncodeOptions {
    /// zlib compression level, 1..=9
    pub zlib_level: u32,
}

impl Default for WoffEncodeOptions {
    fn default() -> Self {
        WoffEncodeOptions { zlib_level: 9 }
    }
}

#[derive(Clone)]
pub struct WoffFont<'a> {
    pub scope: ReadScope<'a>,
    pub woff_header: WoffHeader,
    pub table_directory: ReadArray<'a, TableDirectoryEntry>,
}

#[derive(Clone, Debug)]
pub struct WoffHeader {
    pub flavor: u32,
    pub length: u32,
    pub num_tables: u16,
    pub total_sfnt_size: u32,
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
    pub offset: u32,
    pub comp_length: u32,
    pub orig_length: u32,
    pub orig_checksum: u32,
}

/// Decode a WOFF file back into an SFNT font.
///
/// Tables are inflated and laid out 32-bit padded in directory (tag) order; the
/// stored checksums are carried over untouched.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, ReadWriteError> {
    let woff = ReadScope::new(data).read::<WoffFont<'_>>()?;

    let mut entries: Vec<TableDirectoryEntry> = woff.table_directory.iter().collect();
    entries.sort_by_key(|entry| entry.tag);

    let mut font = WriteBuffer::new();
    write_offset_table_header(
        &mut font,
        woff.woff_header.flavor,
        u16::try_from(entries.len()).map_err(ParseError::from)?,
    )?;

    let mut table_offset = 12 + entries.len() * TableRecord::SIZE;
    let mut tables = Vec::with_capacity(entries.len());
    for entry in &entries {
        let table = entry.read_table(&woff.scope)?;
        let record = TableRecord {
            table_tag: entry.tag,
            checksum: entry.orig_checksum,
            offset: u32::try_from(table_offset).map_err(ParseError::from)?,
            length: entry.orig_length,
        };
        TableRecord::write(&mut font, &record)?;
        table_offset += long_align(usize::try_from(entry.orig_length).map_err(ParseError::from)?);
        tables.push(table);
    }

    for (entry, table) in entries.iter().zip(tables.iter()) {
        let data = table.scope().data();
        font.write_bytes(data)?;
        let padded = long_align(usize::try_from(entry.orig_length).map_err(ParseError::from)?);
        font.write_zeros(padded - data.len())?;
    }

    if font.len() != usize::try_from(woff.woff_header.total_sfnt_size).map_err(ParseError::from)? {
        return Err(ReadWriteError::from(ParseError::BadDirectory));
    }

    Ok(font.into_inner())
}

/// Encode an SFNT font as WOFF.
///
/// Each table is deflated at the configured level; the compressed form is only
/// kept when it is strictly smaller than the original.
pub fn encode(data: &[u8], options: &WoffEncodeOptions) -> Result<Vec<u8>, ReadWriteError> {
    let scope = ReadScope::new(data);
    let offset_table = scope
        .read::<OffsetTable<'_>>()
        .map_err(|_err| ParseError::SfntInvalid)?;

    let mut records: Vec<TableRecord> = offset_table.table_records.iter().collect();
    records.sort_by_key(|record| record.table_tag);

    let mut total_sfnt_size = 12 + records.len() * 16;
    let mut table_offset = HEADER_SIZE + records.len() * DIR_ENTRY_SIZE;
    let mut directory = WriteBuffer::new();
    let mut compressed_tables = Vec::with_capacity(records.len());
    for record in &records {
        let table = record.read_table(&scope)?.data();
        let compressed = deflate(table, options.zlib_level)?;
        let table = if compressed.len() < table.len() {
            compressed
        } else {
            table.to_vec()
        };

        U32Be::write(&mut directory, record.table_tag)?;
        U32Be::write(&mut directory, u32::try_from(table_offset).map_err(ParseError::from)?)?;
        U32Be::write(&mut directory, u32::try_from(table.len()).map_err(ParseError::from)?)?;
        U32Be::write(&mut directory, record.length)?;
        U32Be::write(&mut directory, record.checksum)?;

        table_offset += long_align(table.len());
        total_sfnt_size += long_align(usize::try_from(record.length).map_err(ParseError::from)?);
        compressed_tables.push(table);
    }

    let length = table_offset;
    let (major_version, minor_version) = font_version(&offset_table, &scope);

    let mut out = WriteBuffer::new();
    U32Be::write(&mut out, MAGIC)?;
    U32Be::write(&mut out, offset_table.sfnt_version)?;
    U32Be::write(&mut out, u32::try_from(length).map_err(ParseError::from)?)?;
    U16Be::write(&mut out, u16::try_from(records.len()).map_err(ParseError::from)?)?;
    U16Be::write(&mut out, 0u16)?; // reserved
    U32Be::write(&mut out, u32::try_from(total_sfnt_size).map_err(ParseError::from)?)?;
    U16Be::write(&mut out, major_version)?;
    U16Be::write(&mut out, minor_version)?;
    U32Be::write(&mut out, 0u32)?; // meta offset
    U32Be::write(&mut out, 0u32)?; // meta length
    U32Be::write(&mut out, 0u32)?; // meta orig length
    U32Be::write(&mut out, 0u32)?; // priv offset
    U32Be::write(&mut out, 0u32)?; // priv length
    out.write_bytes(directory.bytes())?;
    for table in &compressed_tables {
        out.write_bytes(table)?;
        out.write_zeros(long_align(table.len()) - table.len())?;
    }

    Ok(out.into_inner())
}

/// The WOFF major and minor version fields are reserved for the font's version,
/// taken from `head.fontRevision` when available.
fn font_version(offset_table: &OffsetTable<'_>, scope: &ReadScope<'_>) -> (u16, u16) {
    offset_table
        .read_table(scope, tag::HEAD)
        .ok()
        .flatten()
        .and_then(|head| head.read::<HeadTable>().ok())
        .map_or((0, 0), |head| {
            let revision = head.font_revision.raw_value();
            ((revision >> 16) as u16, revision as u16)
        })
}

fn deflate(data: &[u8], level: u32) -> Result<Vec<u8>, ParseError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.clamp(1, 9)));
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .map_err(|_err| ParseError::CompressionError)
}

fn write_offset_table_header(
    font: &mut WriteBuffer,
    sfnt_version: u32,
    num_tables: u16,
) -> Result<(), WriteError> {
    let n = 15u16.saturating_sub(num_tables.leading_zeros() as u16);
    let search_range = (1 << n) * 16;

    U32Be::write(font, sfnt_version)?;
    U16Be::write(font, num_tables)?;
    U16Be::write(font, search_range)?;
    U16Be::write(font, n)?;
    U16Be::write(font, num_tables * 16 - search_range)?;

    Ok(())
}

impl<'a> WoffFont<'a> {
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
        let mut z = ZlibDecoder::new(compressed_metadata.data());
        let mut metadata = String::new();
        z.read_to_string(&mut metadata)
            .map_err(|_err| ParseError::CompressionError)?;

        Ok(Some(metadata))
    }

    /// Find the table directory entry for the given `tag`
    pub fn find_table_directory_entry(&self, tag: u32) -> Option<TableDirectoryEntry> {
        self.table_directory
            .iter()
            .find(|table_entry| table_entry.tag == tag)
    }
}

impl<'a> ReadBinary<'a> for WoffFont<'a> {
    type HostType = Self;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let woff_header = ctxt.read::<WoffHeader>()?;
        if usize::try_from(woff_header.length)? != scope.data().len() {
            return Err(ParseError::BadDirectory);
        }
        let table_directory =
            ctxt.read_array::<TableDirectoryEntry>(usize::from(woff_header.num_tables))?;
        Ok(WoffFont {
            scope,
            woff_header,
            table_directory,
        })
    }
}

impl<'a> ReadBinary<'a> for WoffHeader {
    type HostType = Self;

    fn read(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
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
                let major_version = ctxt.read_u16be()?;
                let minor_version = ctxt.read_u16be()?;
                let meta_offset = ctxt.read_u32be()?;
                let meta_length = ctxt.read_u32be()?;
                let meta_orig_length = ctxt.read_u32be()?;
                let priv_offset = ctxt.read_u32be()?;
                let priv_length = ctxt.read_u32be()?;

                Ok(WoffHeader {
                    flavor,
                    length,
                    num_tables,
                    total_sfnt_size,
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

impl<'a> ReadFrom<'a> for TableDirectoryEntry {
    type ReadType = ((U32Be, U32Be, U32Be), (U32Be, U32Be));
    fn from(
        ((tag, offset, comp_length), (orig_length, orig_checksum)): ((u32, u32, u32), (u32, u32)),
    ) -> Self {
        TableDirectoryEntry {
            tag,
            offset,
            comp_length,
            orig_length,
            orig_checksum,
        }
    }
}

impl TableDirectoryEntry {
    fn is_compressed(&self) -> bool {
        self.comp_length != self.orig_length
    }

    /// Read and uncompress the contents of a table entry
    pub fn read_table<'a>(&self, scope: &ReadScope<'a>) -> Result<ReadBuf<'a>, ParseError> {
        let offset = usize::try_from(self.offset)?;
        let length = usize::try_from(self.comp_length)?;
        let table_data = scope.offset_length(offset, length)?;

        if self.is_compressed() {
            let mut z = ZlibDecoder::new(table_data.data());
            let mut uncompressed = Vec::new();
            z.read_to_end(&mut uncompressed)
                .map_err(|_err| ParseError::CompressionError)?;
            if uncompressed.len() != usize::try_from(self.orig_length)? {
                return Err(ParseError::CompressionError);
            }

            Ok(ReadBuf::from(uncompressed))
        } else {
            Ok(ReadBuf::from(table_data.data()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog and then does it again";
        let compressed = deflate(data, 9).unwrap();
        assert!(compressed.len() < data.len());

        let mut z = ZlibDecoder::new(compressed.as_slice());
        let mut inflated = Vec::new();
        z.read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn test_decode_rejects_bad_signature() {
        assert!(matches!(
            decode(&[0x00]),
            Err(ReadWriteError::Read(ParseError::BadSignature))
        ));
    }
}
