//! PacBio BAM side-index (`.pbi`), basic-data section.
//!
//! The index is BGZF-compressed and little-endian. A fixed 32-byte header is
//! followed by column-major per-record arrays:
//!
//! | field        | type      |
//! |--------------|-----------|
//! | `rgId`       | `i32[n]`  |
//! | `qStart`     | `i32[n]`  |
//! | `qEnd`       | `i32[n]`  |
//! | `holeNumber` | `i32[n]`  |
//! | `readQual`   | `f32[n]`  |
//! | `ctxtFlag`   | `u8[n]`   |
//! | `fileOffset` | `i64[n]`  |
//!
//! Optional sections (mapped, barcode, reference) follow the basic data and
//! are ignored when reading.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use noodles::bgzf;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PBI_MAGIC: [u8; 4] = *b"PBI\x01";
pub const PBI_VERSION: u32 = 0x0003_0001;
pub const PBI_SUFFIX: &str = ".pbi";
const RESERVED_BYTES: usize = 18;
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 16;

#[derive(Error, Debug)]
pub enum PbiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a PacBio index (bad magic): {0}")]
    InvalidMagic(String),

    #[error("Too many records for a PacBio index: {0}")]
    TooManyRecords(usize),
}

/// One record's basic-data entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbiEntry {
    pub read_group: i32,
    pub query_start: i32,
    pub query_end: i32,
    pub hole_number: i32,
    pub read_quality: f32,
    pub context_flags: u8,
    pub file_offset: i64,
}

impl PbiEntry {
    /// Number of bases covered by the record
    #[must_use]
    pub fn length(&self) -> u64 {
        u64::try_from(i64::from(self.query_end) - i64::from(self.query_start)).unwrap_or(0)
    }
}

/// Basic data of a side-index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PbiIndex {
    pub version: u32,
    pub entries: Vec<PbiEntry>,
}

impl PbiIndex {
    #[must_use]
    pub fn new(entries: Vec<PbiEntry>) -> Self {
        Self {
            version: PBI_VERSION,
            entries,
        }
    }

    /// Number of records declared by the index
    #[must_use]
    pub fn num_reads(&self) -> usize {
        self.entries.len()
    }

    /// Sum of `qEnd - qStart` over all records
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.entries.iter().map(PbiEntry::length).sum()
    }

    /// Read an index from a file
    ///
    /// # Errors
    ///
    /// Returns `PbiError::Io` if the file cannot be read or is truncated, or
    /// `PbiError::InvalidMagic` if it is not a PacBio index.
    pub fn from_path(path: &Path) -> Result<Self, PbiError> {
        let reader = File::open(path).map(bgzf::Reader::new)?;
        Self::read_from(reader, &path.display().to_string())
    }

    fn read_from<R: Read>(mut reader: R, source: &str) -> Result<Self, PbiError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != PBI_MAGIC {
            return Err(PbiError::InvalidMagic(source.to_string()));
        }

        let version = reader.read_u32::<LittleEndian>()?;
        let _sections = reader.read_u16::<LittleEndian>()?;
        let n = reader.read_u32::<LittleEndian>()? as usize;
        let mut reserved = [0u8; RESERVED_BYTES];
        reader.read_exact(&mut reserved)?;

        let read_groups = read_column(&mut reader, n, |r| r.read_i32::<LittleEndian>())?;
        let query_starts = read_column(&mut reader, n, |r| r.read_i32::<LittleEndian>())?;
        let query_ends = read_column(&mut reader, n, |r| r.read_i32::<LittleEndian>())?;
        let hole_numbers = read_column(&mut reader, n, |r| r.read_i32::<LittleEndian>())?;
        let read_qualities = read_column(&mut reader, n, |r| r.read_f32::<LittleEndian>())?;
        let context_flags = read_column(&mut reader, n, |r| r.read_u8())?;
        let file_offsets = read_column(&mut reader, n, |r| r.read_i64::<LittleEndian>())?;

        let entries = (0..n)
            .map(|i| PbiEntry {
                read_group: read_groups[i],
                query_start: query_starts[i],
                query_end: query_ends[i],
                hole_number: hole_numbers[i],
                read_quality: read_qualities[i],
                context_flags: context_flags[i],
                file_offset: file_offsets[i],
            })
            .collect();

        Ok(Self { version, entries })
    }

    /// Write the index to a file
    ///
    /// # Errors
    ///
    /// Returns `PbiError::Io` if the file cannot be written, or
    /// `PbiError::TooManyRecords` if the count does not fit the header.
    pub fn write_to_path(&self, path: &Path) -> Result<(), PbiError> {
        let mut writer = File::create(path).map(bgzf::Writer::new)?;
        self.write_to(&mut writer)?;
        writer.finish()?;
        Ok(())
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), PbiError> {
        let n = u32::try_from(self.entries.len())
            .map_err(|_| PbiError::TooManyRecords(self.entries.len()))?;

        writer.write_all(&PBI_MAGIC)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(n)?;
        writer.write_all(&[0u8; RESERVED_BYTES])?;

        for e in &self.entries {
            writer.write_i32::<LittleEndian>(e.read_group)?;
        }
        for e in &self.entries {
            writer.write_i32::<LittleEndian>(e.query_start)?;
        }
        for e in &self.entries {
            writer.write_i32::<LittleEndian>(e.query_end)?;
        }
        for e in &self.entries {
            writer.write_i32::<LittleEndian>(e.hole_number)?;
        }
        for e in &self.entries {
            writer.write_f32::<LittleEndian>(e.read_quality)?;
        }
        for e in &self.entries {
            writer.write_u8(e.context_flags)?;
        }
        for e in &self.entries {
            writer.write_i64::<LittleEndian>(e.file_offset)?;
        }

        Ok(())
    }
}

/// Read one column of `n` values.
///
/// `n` comes from the file header, so capacity is capped and the column only
/// grows as values are actually read; a short file ends in `UnexpectedEof`.
fn read_column<R, T, F>(reader: &mut R, n: usize, mut read_value: F) -> std::io::Result<Vec<T>>
where
    R: Read,
    F: FnMut(&mut R) -> std::io::Result<T>,
{
    let mut values = Vec::with_capacity(n.min(MAX_PREALLOCATED_ENTRIES));
    for _ in 0..n {
        values.push(read_value(reader)?);
    }
    Ok(values)
}

/// Path of the side-index belonging to a BAM file
#[must_use]
pub fn index_path(bam_path: &Path) -> PathBuf {
    let mut path = bam_path.as_os_str().to_os_string();
    path.push(PBI_SUFFIX);
    PathBuf::from(path)
}
