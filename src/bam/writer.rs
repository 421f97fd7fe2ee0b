//! BAM output with a PacBio side-index written alongside.

use noodles::bam;
use noodles::bgzf;
use noodles::sam;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::record_buf::data::field::value::Array;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::QualityScores;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::header::record::value::map::program::tag as pg_tag;
use noodles::sam::header::record::value::map::read_group::tag as rg_tag;
use noodles::sam::header::record::value::map::{Program, ReadGroup};
use noodles::sam::header::record::value::Map;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::bam::frames::FrameEncoding;
use crate::bam::pbi::{index_path, PbiEntry, PbiError, PbiIndex};
use crate::bam::record::{read_group_number, OutputRecord, RecordSink, TagValue};
use crate::core::types::Platform;
use crate::legacy::Chemistry;

pub const PROGRAM_NAME: &str = "bax2bam";

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid BAM header: {0}")]
    Header(String),

    #[error("Could not write record {name}: {reason}")]
    Record { name: String, reason: String },

    #[error("Could not write index: {0}")]
    Index(#[from] PbiError),
}

/// Everything needed to describe one output read group
#[derive(Debug, Clone)]
pub struct ReadGroupInfo<'a> {
    pub read_group_id: &'a str,
    pub read_type: &'a str,
    pub movie_name: &'a str,
    pub chemistry: &'a Chemistry,
    pub frame_rate: f32,
    pub platform: Platform,
    pub frames: FrameEncoding,
    pub command_line: &'a str,
}

impl ReadGroupInfo<'_> {
    /// The `DS` field of the read group
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "READTYPE={};BINDINGKIT={};SEQUENCINGKIT={};BASECALLERVERSION={};FRAMERATEHZ={};{}",
            self.read_type,
            self.chemistry.binding_kit,
            self.chemistry.sequencing_kit,
            self.chemistry.basecaller_version,
            self.frame_rate,
            self.frames.description(),
        )
    }
}

/// Build the SAM header for an unaligned PacBio BAM
///
/// # Errors
///
/// Returns `WriteError::Header` if a header record cannot be built.
pub fn build_header(info: &ReadGroupInfo<'_>) -> Result<sam::Header, WriteError> {
    let read_group = Map::<ReadGroup>::builder()
        .insert(rg_tag::PLATFORM, String::from("PACBIO"))
        .insert(rg_tag::PLATFORM_MODEL, info.platform.model().to_string())
        .insert(rg_tag::PLATFORM_UNIT, info.movie_name.to_string())
        .insert(rg_tag::DESCRIPTION, info.description())
        .build()
        .map_err(|e| WriteError::Header(e.to_string()))?;

    let mut program = Map::<Program>::builder()
        .insert(pg_tag::NAME, PROGRAM_NAME.to_string())
        .insert(pg_tag::VERSION, env!("CARGO_PKG_VERSION").to_string());
    // SAM forbids empty field values
    if !info.command_line.is_empty() {
        program = program.insert(pg_tag::COMMAND_LINE, info.command_line.to_string());
    }
    let program = program
        .build()
        .map_err(|e| WriteError::Header(e.to_string()))?;

    Ok(sam::Header::builder()
        .set_header(Map::default())
        .add_read_group(info.read_group_id, read_group)
        .add_program(PROGRAM_NAME, program)
        .build())
}

/// Writes unaligned records to a BAM file and collects side-index entries.
///
/// The `.pbi` is written by [`BamSink::finish`]; a sink dropped without
/// finishing leaves a BAM without an index.
pub struct BamSink {
    path: PathBuf,
    header: sam::Header,
    writer: bam::io::Writer<bgzf::Writer<File>>,
    entries: Vec<PbiEntry>,
}

impl BamSink {
    /// Create the BAM and write its header
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if the file cannot be created or the header
    /// cannot be written.
    pub fn create(path: &Path, info: &ReadGroupInfo<'_>) -> Result<Self, WriteError> {
        let header = build_header(info)?;
        let mut writer = File::create(path).map(bam::io::Writer::new)?;
        writer.write_header(&header)?;

        debug!(path = %path.display(), read_type = info.read_type, "Opened BAM output");

        Ok(Self {
            path: path.to_path_buf(),
            header,
            writer,
            entries: Vec::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flush the BAM and write the side-index next to it
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if either file cannot be completed.
    pub fn finish(self) -> Result<PathBuf, WriteError> {
        let Self {
            path,
            writer,
            entries,
            ..
        } = self;

        writer.into_inner().finish()?;

        let pbi_path = index_path(&path);
        let count = entries.len();
        PbiIndex::new(entries).write_to_path(&pbi_path)?;

        debug!(path = %path.display(), records = count, "Finished BAM output");
        Ok(pbi_path)
    }
}

impl RecordSink for BamSink {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), WriteError> {
        let file_offset = u64::from(self.writer.get_ref().virtual_position());
        let buf = to_record_buf(record)?;

        self.writer
            .write_alignment_record(&self.header, &buf)
            .map_err(|e| WriteError::Record {
                name: record.name.clone(),
                reason: e.to_string(),
            })?;

        self.entries.push(PbiEntry {
            read_group: read_group_number(&record.read_group_id),
            query_start: record.query_start,
            query_end: record.query_end,
            hole_number: i32::try_from(record.hole_number).unwrap_or(i32::MAX),
            read_quality: record.read_quality,
            context_flags: record.context_flags,
            file_offset: i64::try_from(file_offset).unwrap_or(i64::MAX),
        });

        Ok(())
    }
}

fn tag_value(value: &TagValue) -> Value {
    match value {
        TagValue::Int(v) => Value::Int32(*v),
        TagValue::Float(v) => Value::Float(*v),
        TagValue::Char(c) => Value::Character(*c),
        TagValue::Text(s) => Value::String(s.clone().into()),
        TagValue::UInt8Array(v) => Value::Array(Array::UInt8(v.clone())),
        TagValue::UInt16Array(v) => Value::Array(Array::UInt16(v.clone())),
    }
}

/// Convert an output record to an unmapped noodles record
fn to_record_buf(record: &OutputRecord) -> Result<RecordBuf, WriteError> {
    if let Some(qualities) = &record.qualities {
        if qualities.len() != record.bases.len() {
            return Err(WriteError::Record {
                name: record.name.clone(),
                reason: format!(
                    "{} qualities for {} bases",
                    qualities.len(),
                    record.bases.len()
                ),
            });
        }
    }

    let mut rec = RecordBuf::default();
    *rec.name_mut() = Some(record.name.as_bytes().to_vec().into());
    *rec.flags_mut() = Flags::UNMAPPED;
    *rec.sequence_mut() = record.bases.clone().into();
    if let Some(qualities) = &record.qualities {
        *rec.quality_scores_mut() = QualityScores::from(qualities.clone());
    }

    let data = rec.data_mut();
    data.insert(
        Tag::READ_GROUP,
        Value::String(record.read_group_id.clone().into()),
    );
    data.insert(
        Tag::from(*b"zm"),
        Value::Int32(i32::try_from(record.hole_number).unwrap_or(i32::MAX)),
    );
    data.insert(Tag::from(*b"qs"), Value::Int32(record.query_start));
    data.insert(Tag::from(*b"qe"), Value::Int32(record.query_end));
    data.insert(Tag::from(*b"rq"), Value::Float(record.read_quality));
    data.insert(Tag::from(*b"cx"), Value::UInt8(record.context_flags));
    for (tag, value) in &record.tags {
        data.insert(Tag::from(*tag), tag_value(value));
    }

    Ok(rec)
}
