// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font

use core::fmt;

use crate::parser::{FromData, Stream};
use crate::{ParseError, Tag};

const SFNT_VERSION_TRUE_TYPE: u32 = 0x00010000;
const SFNT_VERSION_OPEN_TYPE: u32 = 0x4F54544F; // 'OTTO'

/// A single entry of the table directory.
#[derive(Clone, Copy, Debug)]
pub struct TableRecord {
    /// Table tag.
    pub tag: Tag,
    /// Stored table checksum.
    pub checksum: u32,
    /// Absolute offset of the table in the file.
    pub offset: u32,
    /// Unpadded table length in bytes.
    pub length: u32,
}

impl TableRecord {
    /// Table length padded to the next 4-byte boundary.
    #[inline]
    pub fn padded_length(&self) -> u64 {
        (u64::from(self.length) + 3) & !3
    }
}

impl FromData for TableRecord {
    const SIZE: usize = 16;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        TableRecord {
            tag: Tag::parse(&data[0..4]),
            checksum: u32::parse(&data[4..8]),
            offset: u32::parse(&data[8..12]),
            length: u32::parse(&data[12..16]),
        }
    }
}

impl fmt::Display for TableRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} checksum: 0x{:08X} offset: {} length: {}",
            self.tag, self.checksum, self.offset, self.length
        )
    }
}

/// The sfnt table directory.
///
/// Records are validated on parse: every table region must lie inside the
/// file (padded to 4 bytes) and carry a matching checksum, and tags must be
/// unique. The `head` table is exempt from checksum verification because its
/// `checksumAdjustment` field participates in the whole-file checksum
/// instead.
#[derive(Clone, Debug)]
pub struct TableDirectory {
    /// 0x00010000 for TrueType outlines, 'OTTO' for CFF.
    pub sfnt_version: u32,
    /// Retained for introspection; not used by lookups.
    pub search_range: u16,
    /// Retained for introspection; not used by lookups.
    pub entry_selector: u16,
    /// Retained for introspection; not used by lookups.
    pub range_shift: u16,
    records: Vec<TableRecord>,
}

impl TableDirectory {
    /// Parses the directory located at `offset` in `data`.
    ///
    /// Record offsets are absolute, so bounds and checksums are always
    /// validated against the whole file, even for fonts inside a collection.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self, ParseError> {
        if data.len() < offset + 12 {
            return Err(ParseError::FileTooSmall);
        }

        let mut s = Stream::new_at(data, offset);
        let sfnt_version: u32 = s.read()?;
        if sfnt_version != SFNT_VERSION_TRUE_TYPE && sfnt_version != SFNT_VERSION_OPEN_TYPE {
            return Err(ParseError::UnknownMagic(sfnt_version));
        }

        let num_tables: u16 = s.read()?;
        let search_range: u16 = s.read()?;
        let entry_selector: u16 = s.read()?;
        let range_shift: u16 = s.read()?;
        let records: Vec<TableRecord> = s
            .read_vec(usize::from(num_tables))
            .map_err(|_| ParseError::FileTooSmall)?;

        for (i, record) in records.iter().enumerate() {
            let end = u64::from(record.offset) + record.padded_length();
            if end > data.len() as u64 {
                return Err(ParseError::TableOutOfBounds(record.tag));
            }

            if records[..i].iter().any(|other| other.tag == record.tag) {
                return Err(ParseError::DuplicateTable(record.tag));
            }

            if record.tag != crate::tables::head::Table::TAG {
                let start = record.offset as usize;
                let table = &data[start..start + record.padded_length() as usize];
                if checksum(table) != record.checksum {
                    return Err(ParseError::ChecksumMismatch(record.tag));
                }
            }
        }

        Ok(TableDirectory {
            sfnt_version,
            search_range,
            entry_selector,
            range_shift,
            records,
        })
    }

    /// Number of table records.
    #[inline]
    pub fn num_tables(&self) -> u16 {
        self.records.len() as u16
    }

    /// Returns the record for `tag`.
    #[inline]
    pub fn get(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|record| record.tag == tag)
    }

    /// All records, in file order.
    #[inline]
    pub fn records(&self) -> &[TableRecord] {
        &self.records
    }
}

impl fmt::Display for TableDirectory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "sfntVersion: 0x{:08X} numTables: {}",
            self.sfnt_version,
            self.records.len()
        )?;
        for record in &self.records {
            writeln!(f, "    {}", record)?;
        }
        Ok(())
    }
}

/// Sums the region as big-endian u32 words, modulo 2^32.
///
/// A trailing partial word is zero-padded.
pub(crate) fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
