//! Conversion of legacy partitions into BAM records.
//!
//! Each output mode is a [`ReadProjection`]: it turns one [`LegacyRead`] into
//! the primary and scraps records for that read. [`Converter`] is the closed
//! set of projections; [`run_conversion`] drives one over every partition of
//! a run and writes the records to BAM.
//!
//! | Projection   | Primary records             | Scraps                               |
//! |--------------|-----------------------------|--------------------------------------|
//! | subread      | inserts within the HQ region | adapters (`sc:A`), flanks (`sc:L`)  |
//! | hqregion     | the HQ region               | flanks (`sc:L`)                      |
//! | polymerase   | the whole read              |                                      |
//! | ccs          | the consensus read          | not supported                        |

pub mod ccs;
pub mod common;
pub mod hq_region;
pub mod polymerase;
pub mod subread;

use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bam::record::{make_read_group_id, OutputRecord, RecordSink};
use crate::bam::writer::{BamSink, ReadGroupInfo, WriteError};
use crate::core::profile::ModeProfile;
use crate::core::settings::Settings;
use crate::core::types::{FeatureSet, Mode};
use crate::legacy::{
    Chemistry, LegacyError, LegacyFormat, LegacyRead, PartitionReader, ReadSource,
};

pub use ccs::CcsProjection;
pub use common::ProjectionContext;
pub use hq_region::HqRegionProjection;
pub use polymerase::PolymeraseProjection;
pub use subread::SubreadProjection;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("no input partitions to convert")]
    NoPartitions,

    #[error("could not open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: LegacyError,
    },

    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: LegacyError,
    },

    #[error("could not write output: {0}")]
    Write(#[from] WriteError),

    #[error("{mode} output does not support a scraps file")]
    ScrapsUnsupported { mode: Mode },

    #[error("unsupported chemistry in {path} ({chemistry})")]
    UnsupportedChemistry { path: String, chemistry: Chemistry },

    #[error("{path} belongs to movie {found}, expected {expected}")]
    MovieMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

/// Records produced from one legacy read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub primary: Vec<OutputRecord>,
    pub scraps: Vec<OutputRecord>,
}

impl Projection {
    #[must_use]
    pub fn scraps_only(scraps: Vec<OutputRecord>) -> Self {
        Self {
            primary: Vec::new(),
            scraps,
        }
    }
}

/// An output mode's view of a legacy read
pub trait ReadProjection {
    /// Naming and dataset constants of the mode
    fn profile(&self) -> &'static ModeProfile;

    /// Feature channels copied into records
    fn features(&self) -> FeatureSet;

    /// Project one read into output records
    fn project(&self, read: &LegacyRead, ctx: &ProjectionContext<'_>) -> Projection;

    /// Which base calls the partition reader should surface
    fn read_source(&self) -> ReadSource {
        ReadSource::Polymerase
    }

    /// `READTYPE` of the primary BAM's read group
    fn read_type(&self) -> &'static str {
        self.profile().read_type
    }

    /// `READTYPE` of the scraps BAM's read group
    fn scraps_read_type(&self) -> &'static str {
        self.profile().scraps_read_type
    }

    fn output_suffix(&self) -> &'static str {
        self.profile().output_suffix
    }

    /// Suffix of the scraps BAM, `None` if the mode cannot write scraps
    fn scraps_suffix(&self) -> Option<&'static str> {
        self.profile().scraps_suffix
    }
}

/// The projection selected for a run
#[derive(Debug, Clone, Copy)]
pub enum Converter {
    Subread(SubreadProjection),
    HqRegion(HqRegionProjection),
    Polymerase(PolymeraseProjection),
    Ccs(CcsProjection),
}

impl Converter {
    #[must_use]
    pub fn new(mode: Mode, features: FeatureSet) -> Self {
        match mode {
            Mode::Subread => Self::Subread(SubreadProjection::new(features)),
            Mode::HqRegion => Self::HqRegion(HqRegionProjection::new(features)),
            Mode::Polymerase => Self::Polymerase(PolymeraseProjection::new(features)),
            Mode::Consensus => Self::Ccs(CcsProjection::new(features)),
        }
    }
}

impl ReadProjection for Converter {
    fn profile(&self) -> &'static ModeProfile {
        match self {
            Self::Subread(p) => p.profile(),
            Self::HqRegion(p) => p.profile(),
            Self::Polymerase(p) => p.profile(),
            Self::Ccs(p) => p.profile(),
        }
    }

    fn features(&self) -> FeatureSet {
        match self {
            Self::Subread(p) => p.features(),
            Self::HqRegion(p) => p.features(),
            Self::Polymerase(p) => p.features(),
            Self::Ccs(p) => p.features(),
        }
    }

    fn project(&self, read: &LegacyRead, ctx: &ProjectionContext<'_>) -> Projection {
        match self {
            Self::Subread(p) => p.project(read, ctx),
            Self::HqRegion(p) => p.project(read, ctx),
            Self::Polymerase(p) => p.project(read, ctx),
            Self::Ccs(p) => p.project(read, ctx),
        }
    }

    fn read_source(&self) -> ReadSource {
        match self {
            Self::Subread(p) => p.read_source(),
            Self::HqRegion(p) => p.read_source(),
            Self::Polymerase(p) => p.read_source(),
            Self::Ccs(p) => p.read_source(),
        }
    }
}

/// Record counts for a partition or a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub reads: usize,
    pub skipped: usize,
    pub primary_records: usize,
    pub scraps_records: usize,
}

impl AddAssign for ConvertStats {
    fn add_assign(&mut self, other: Self) {
        self.reads += other.reads;
        self.skipped += other.skipped;
        self.primary_records += other.primary_records;
        self.scraps_records += other.scraps_records;
    }
}

/// Where projected records go
pub struct Sinks<'a> {
    pub primary: &'a mut dyn RecordSink,
    pub scraps: Option<&'a mut dyn RecordSink>,
}

/// Options that change which reads are written
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionOptions {
    /// Write reads from non-sequencing ZMWs to the scraps sink
    pub internal: bool,
}

/// Project every read of one partition into the sinks.
///
/// Empty reads and reads the partition does not consider sequencing are
/// skipped (or, in internal mode, written whole to the scraps sink). The
/// first failure stops the partition.
///
/// # Errors
///
/// Returns `ConvertError::ScrapsUnsupported` if a scraps sink is given to a
/// projection without scraps, or the first read or write error.
pub fn convert_partition<P: ReadProjection + ?Sized>(
    projection: &P,
    reader: &mut dyn PartitionReader,
    path: &Path,
    ctx: &ProjectionContext<'_>,
    options: PartitionOptions,
    sinks: Sinks<'_>,
) -> Result<ConvertStats, ConvertError> {
    let Sinks {
        primary,
        mut scraps,
    } = sinks;

    if scraps.is_some() && projection.scraps_suffix().is_none() {
        return Err(ConvertError::ScrapsUnsupported {
            mode: projection.profile().mode,
        });
    }

    let mut stats = ConvertStats::default();
    while let Some(read) = reader.next_read().map_err(|source| ConvertError::Read {
        path: path.display().to_string(),
        source,
    })? {
        stats.reads += 1;

        if read.is_empty() {
            stats.skipped += 1;
            continue;
        }

        if !reader.is_sequencing(&read) {
            match scraps.as_deref_mut() {
                Some(sink) if options.internal => {
                    sink.write_record(&common::whole_read_scrap(&read, ctx, projection.features()))?;
                    stats.scraps_records += 1;
                }
                _ => stats.skipped += 1,
            }
            continue;
        }

        let projected = projection.project(&read, ctx);
        for record in &projected.primary {
            primary.write_record(record)?;
        }
        stats.primary_records += projected.primary.len();

        if let Some(sink) = scraps.as_deref_mut() {
            for record in &projected.scraps {
                sink.write_record(record)?;
            }
            stats.scraps_records += projected.scraps.len();
        }
    }

    Ok(stats)
}

/// Files written by a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub output_bam: PathBuf,
    pub scraps_bam: Option<PathBuf>,
    pub stats: ConvertStats,
}

fn open_partition(
    format: &dyn LegacyFormat,
    path: &Path,
    converter: &Converter,
    allow_unsupported_chemistry: bool,
) -> Result<Box<dyn PartitionReader>, ConvertError> {
    let reader = format
        .open_partition(path, converter.read_source())
        .map_err(|source| ConvertError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let chemistry = reader.chemistry();
    if !chemistry.is_supported() {
        if allow_unsupported_chemistry {
            warn!(path = %path.display(), %chemistry, "Unsupported chemistry, converting anyway");
        } else {
            return Err(ConvertError::UnsupportedChemistry {
                path: path.display().to_string(),
                chemistry: chemistry.clone(),
            });
        }
    }

    debug!(path = %path.display(), movie = reader.movie_name(), "Opened partition");
    Ok(reader)
}

/// Convert every partition of a run into the output BAM(s).
///
/// The BAM headers are built from the first partition; every later
/// partition must belong to the same movie. Both BAMs get a `.pbi` once all
/// partitions are converted.
///
/// This is the library entry point for callers that build [`Settings`]
/// themselves. It does not look at `settings.errors`; [`crate::runner::run`]
/// refuses to get this far when configuration failed.
///
/// # Errors
///
/// Returns `ConvertError::NoPartitions` if the settings name no partition,
/// otherwise the first `ConvertError` encountered; nothing after it runs.
pub fn run_conversion(
    settings: &Settings,
    format: &dyn LegacyFormat,
) -> Result<ConversionOutput, ConvertError> {
    let converter = Converter::new(settings.mode, settings.features);
    let mut paths = settings.partition_paths();
    let first_path = paths.next().ok_or(ConvertError::NoPartitions)?;

    let mut reader = open_partition(
        format,
        first_path,
        &converter,
        settings.allow_unsupported_chemistry,
    )?;
    let movie_name = reader.movie_name().to_string();
    let chemistry = reader.chemistry().clone();

    let read_group_id = make_read_group_id(&movie_name, converter.read_type());
    let scraps_read_group_id = make_read_group_id(&movie_name, converter.scraps_read_type());
    let info = ReadGroupInfo {
        read_group_id: &read_group_id,
        read_type: converter.read_type(),
        movie_name: &movie_name,
        chemistry: &chemistry,
        frame_rate: reader.frame_rate(),
        platform: settings.platform,
        frames: settings.frames,
        command_line: &settings.command_line,
    };

    let output_bam = settings.output_bam();
    let mut primary = BamSink::create(&output_bam, &info)?;
    let mut scraps = match settings.scraps_bam() {
        Some(path) => Some(BamSink::create(
            &path,
            &ReadGroupInfo {
                read_group_id: &scraps_read_group_id,
                read_type: converter.scraps_read_type(),
                ..info.clone()
            },
        )?),
        None => None,
    };

    let ctx = ProjectionContext {
        movie_name: &movie_name,
        read_group_id: &read_group_id,
        scraps_read_group_id: &scraps_read_group_id,
        frames: settings.frames,
    };
    let options = PartitionOptions {
        internal: settings.internal,
    };

    let mut totals = ConvertStats::default();
    let mut path = first_path;
    loop {
        let sinks = Sinks {
            primary: &mut primary,
            scraps: scraps.as_mut().map(|s| s as &mut dyn RecordSink),
        };
        let stats = convert_partition(&converter, reader.as_mut(), path, &ctx, options, sinks)?;
        info!(
            path = %path.display(),
            reads = stats.reads,
            records = stats.primary_records,
            scraps = stats.scraps_records,
            "Converted partition"
        );
        totals += stats;

        let Some(next) = paths.next() else { break };
        path = next;
        reader = open_partition(format, path, &converter, settings.allow_unsupported_chemistry)?;
        if reader.movie_name() != movie_name {
            return Err(ConvertError::MovieMismatch {
                path: path.display().to_string(),
                expected: movie_name,
                found: reader.movie_name().to_string(),
            });
        }
    }

    primary.finish()?;
    let scraps_bam = match scraps {
        Some(sink) => {
            let path = sink.path().to_path_buf();
            sink.finish()?;
            Some(path)
        }
        None => None,
    };

    Ok(ConversionOutput {
        output_bam,
        scraps_bam,
        stats: totals,
    })
}
