//! The WOFF2 collection directory, present when the flavor is 'ttcf'.

use crate::binary::read::{ReadBinaryDep, ReadCtxt};
use crate::error::ParseError;
use crate::woff2::{PackedU16, TableDirectoryEntry, Woff2Font};

/// The collection directory of a multi-font WOFF2 file.
#[derive(Debug)]
pub struct Directory {
    version: u32,
    entries: Vec<FontEntry>,
}

/// A single font within the collection: its flavor and the table directory
/// entries it references, by index.
#[derive(Debug)]
pub struct FontEntry {
    flavor: u32,
    table_indices: Vec<usize>,
}

impl<'a> ReadBinaryDep<'a> for FontEntry {
    type Args = usize;
    type HostType = Self;

    fn read_dep(ctxt: &mut ReadCtxt<'a>, num_tables: usize) -> Result<Self, ParseError> {
        let entry_count = ctxt.read::<PackedU16>()?;
        let flavor = ctxt.read_u32be()?;
        let table_indices = (0..entry_count)
            .map(|_i| {
                let index = usize::from(ctxt.read::<PackedU16>()?);
                if index < num_tables {
                    Ok(index)
                } else {
                    Err(ParseError::BadDirectory)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FontEntry {
            flavor,
            table_indices,
        })
    }
}

impl<'a> ReadBinaryDep<'a> for Directory {
    type Args = usize;
    type HostType = Self;

    fn read_dep(ctxt: &mut ReadCtxt<'a>, num_tables: usize) -> Result<Self, ParseError> {
        let version = ctxt.read_u32be()?;
        ctxt.check_version(version == 0x00010000 || version == 0x00020000)?;
        let num_fonts = ctxt.read::<PackedU16>()?;
        let entries = (0..num_fonts)
            .map(|_i| ctxt.read_dep::<FontEntry>(num_tables))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Directory { version, entries })
    }
}

impl Directory {
    /// The TTC header version, `0x00010000` or `0x00020000`.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fonts(&self) -> impl Iterator<Item = &FontEntry> + '_ {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FontEntry> {
        self.entries.get(index)
    }

    pub fn num_fonts(&self) -> usize {
        self.entries.len()
    }
}

impl FontEntry {
    /// The SFNT flavor of this member font.
    pub fn flavor(&self) -> u32 {
        self.flavor
    }

    /// Indices into the top-level table directory.
    pub fn table_indices(&self) -> &[usize] {
        &self.table_indices
    }

    pub fn table_entries<'a>(
        &'a self,
        file: &'a Woff2Font<'_>,
    ) -> impl Iterator<Item = &'a TableDirectoryEntry> + 'a {
        self.table_indices
            .iter()
            .flat_map(move |&index| file.table_directory.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;

    #[test]
    fn test_read_directory() {
        // version 1.0, two fonts sharing tables 0..3 and 0..2 plus 3
        #[rustfmt::skip]
        let data = [
            0x00, 0x01, 0x00, 0x00, // version
            2, // numFonts
            3, 0x00, 0x01, 0x00, 0x00, 0, 1, 2, // font 0
            3, 0x00, 0x01, 0x00, 0x00, 0, 1, 3, // font 1
        ];
        let directory = ReadScope::new(&data)
            .read_dep::<Directory>(4)
            .expect("unable to read collection directory");
        assert_eq!(directory.version(), 0x00010000);
        assert_eq!(directory.num_fonts(), 2);
        assert_eq!(directory.get(0).unwrap().table_indices(), &[0, 1, 2]);
        assert_eq!(directory.get(1).unwrap().table_indices(), &[0, 1, 3]);
    }

    #[test]
    fn test_read_directory_rejects_bad_version() {
        let data = [0x00, 0x03, 0x00, 0x00, 0];
        assert!(matches!(
            ReadScope::new(&data).read_dep::<Directory>(0),
            Err(ParseError::BadVersion)
        ));
    }

    #[test]
    fn test_read_directory_rejects_out_of_range_index() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x01, 0x00, 0x00, // version
            1, // numFonts
            1, 0x00, 0x01, 0x00, 0x00, 9, // font 0 references table 9
        ];
        assert!(matches!(
            ReadScope::new(&data).read_dep::<Directory>(4),
            Err(ParseError::BadDirectory)
        ));
    }
}
