//! Seam to the legacy HDF5 read containers.
//!
//! A `.bax.h5` partition holds one read per ZMW (hole) together with its
//! per-base quality and pulse channels and a region table marking adapters,
//! inserts and the high-quality region. A `.bas.h5` container only lists the
//! partitions belonging to a movie.
//!
//! Decoding HDF5 is delegated to a [`LegacyFormat`] implementation; the rest
//! of the crate only sees [`LegacyRead`] values coming out of a
//! [`PartitionReader`].

use std::path::Path;
use thiserror::Error;

pub mod chemistry;

pub use chemistry::Chemistry;

#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Malformed record in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("No HDF5 backend is available to read {0}")]
    BackendUnavailable(String),
}

/// Which base calls a reader should surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Raw polymerase base calls
    Polymerase,
    /// Circular consensus base calls
    Consensus,
}

/// Kind of a region table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Adapter,
    Insert,
    HqRegion,
}

/// Half-open interval `[start, end)` on a polymerase read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub start: usize,
    pub end: usize,
}

impl Region {
    #[must_use]
    pub fn new(kind: RegionKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Intersection with `[start, end)`, if non-empty
    #[must_use]
    pub fn clip(&self, start: usize, end: usize) -> Option<Region> {
        let s = self.start.max(start);
        let e = self.end.min(end);
        (s < e).then(|| Region::new(self.kind, s, e))
    }
}

/// Status the instrument assigned to a hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoleStatus {
    #[default]
    Sequencing,
    Antihole,
    Fiducial,
    Suspect,
    Antimirror,
    Fdzmw,
    Fbzmw,
    Antibeamlet,
    OutsideFov,
}

impl HoleStatus {
    /// Decode the numeric status stored in the container
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Sequencing,
            1 => Self::Antihole,
            2 => Self::Fiducial,
            3 => Self::Suspect,
            4 => Self::Antimirror,
            5 => Self::Fdzmw,
            6 => Self::Fbzmw,
            7 => Self::Antibeamlet,
            _ => Self::OutsideFov,
        }
    }

    /// ZMW type character written to the `sz` tag of scraps records
    #[must_use]
    pub fn zmw_type(self) -> u8 {
        match self {
            Self::Sequencing => b'N',
            Self::Antihole | Self::Fiducial => b'S',
            Self::Suspect => b'M',
            _ => b'C',
        }
    }
}

/// One ZMW worth of data from a legacy partition.
///
/// Per-base channels, when present, have the same length as `bases`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyRead {
    pub hole_number: u32,
    pub hole_status: HoleStatus,
    pub bases: Vec<u8>,
    pub qualities: Option<Vec<u8>>,
    pub deletion_qv: Option<Vec<u8>>,
    pub deletion_tag: Option<Vec<u8>>,
    pub insertion_qv: Option<Vec<u8>>,
    pub merge_qv: Option<Vec<u8>>,
    pub substitution_qv: Option<Vec<u8>>,
    pub substitution_tag: Option<Vec<u8>>,
    pub ipd: Option<Vec<u16>>,
    pub pulse_width: Option<Vec<u16>>,
    pub read_score: f32,
    /// Number of passes; only meaningful for consensus reads
    pub num_passes: u32,
    pub regions: Vec<Region>,
}

impl LegacyRead {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// The high-quality region, clipped to the read
    #[must_use]
    pub fn hq_region(&self) -> Option<Region> {
        self.regions
            .iter()
            .find(|r| r.kind == RegionKind::HqRegion)
            .and_then(|r| r.clip(0, self.len()))
    }

    /// Regions of one kind, clipped to `[start, end)` and sorted by start
    #[must_use]
    pub fn regions_within(&self, kind: RegionKind, start: usize, end: usize) -> Vec<Region> {
        let mut regions: Vec<Region> = self
            .regions
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.clip(start, end))
            .collect();
        regions.sort_by_key(|r| r.start);
        regions
    }
}

/// Sequential source of reads from one partition
pub trait PartitionReader {
    /// Movie the partition belongs to
    fn movie_name(&self) -> &str;

    /// Chemistry triple recorded in the partition
    fn chemistry(&self) -> &Chemistry;

    /// Acquisition frame rate, used in the read group description
    fn frame_rate(&self) -> f32;

    /// Next read, or `None` at the end of the partition
    ///
    /// # Errors
    ///
    /// Returns `LegacyError` if the underlying record cannot be decoded.
    fn next_read(&mut self) -> Result<Option<LegacyRead>, LegacyError>;

    /// Whether the read came from a ZMW that was actively sequencing
    fn is_sequencing(&self, read: &LegacyRead) -> bool {
        read.hole_status == HoleStatus::Sequencing
    }
}

/// Opens legacy partitions and containers
pub trait LegacyFormat {
    /// Open a `.bax.h5` partition
    ///
    /// # Errors
    ///
    /// Returns `LegacyError` if the file cannot be opened.
    fn open_partition(
        &self,
        path: &Path,
        source: ReadSource,
    ) -> Result<Box<dyn PartitionReader>, LegacyError>;

    /// List the partition filenames declared by a `.bas.h5` container
    ///
    /// # Errors
    ///
    /// Returns `LegacyError` if the container cannot be opened.
    fn container_parts(&self, path: &Path) -> Result<Vec<String>, LegacyError>;
}

/// Format used when the binary is built without an HDF5 decoder.
///
/// Containers cannot be expanded (so they are kept as-is) and every attempt
/// to open a partition fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackend;

impl LegacyFormat for NoBackend {
    fn open_partition(
        &self,
        path: &Path,
        _source: ReadSource,
    ) -> Result<Box<dyn PartitionReader>, LegacyError> {
        Err(LegacyError::BackendUnavailable(path.display().to_string()))
    }

    fn container_parts(&self, path: &Path) -> Result<Vec<String>, LegacyError> {
        Err(LegacyError::BackendUnavailable(path.display().to_string()))
    }
}
