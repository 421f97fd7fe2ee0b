//! Derive the output dataset from the input `HdfSubreadSet`.
//!
//! The input dataset is copied, retyped for the conversion mode, stripped of
//! its BAX resources and given the new BAM (plus scraps and indices) as
//! resources. Record count and total length are recomputed from the new
//! BAM's `.pbi`.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::bam::pbi::{index_path, PbiError, PbiIndex, PBI_SUFFIX};
use crate::core::profile::ModeProfile;
use crate::dataset::{
    DataSet, DataSetError, DataSetKind, ExternalResource, FileIndex, FILE_SCHEME,
};
use crate::utils::ambient::Ambient;
use crate::utils::text::contains_ignore_case;

/// Resource types containing this marker are legacy BAX files
pub const LEGACY_RESOURCE_MARKER: &str = "bax";

/// File index type of a `.pbi`
pub const PBI_META_TYPE: &str = "PacBio.Index.PacBioIndex";

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error(transparent)]
    DataSet(#[from] DataSetError),

    #[error("expected input dataset of type {expected}, found {found}")]
    UnexpectedType {
        expected: DataSetKind,
        found: DataSetKind,
    },

    #[error("could not read index {path}: {source}")]
    Index {
        path: String,
        #[source]
        source: PbiError,
    },
}

/// What was produced and where the dataset should go
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    /// Input `HdfSubreadSet`
    pub input: &'a Path,
    pub profile: &'static ModeProfile,
    /// Primary BAM, as configured (may be relative)
    pub output_bam: &'a Path,
    /// Scraps BAM, if one was produced
    pub scraps_bam: Option<&'a Path>,
    /// Where to save the output dataset
    pub destination: &'a Path,
}

/// ISO-8601 creation timestamp
#[must_use]
pub fn iso8601(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Compact timestamp used in generated dataset names, e.g. `150819_151159123`
#[must_use]
pub fn dataset_timestamp(time: DateTime<Utc>) -> String {
    format!(
        "{}{:03}",
        time.format("%y%m%d_%H%M%S"),
        time.timestamp_subsec_millis().min(999)
    )
}

/// Absolute `file://` URI for an output file.
///
/// Absolute paths are used verbatim; relative ones are placed under the
/// current working directory when it is known.
#[must_use]
pub fn resource_uri(path: &Path, ambient: &dyn Ambient) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match ambient.current_dir() {
            Some(cwd) if !cwd.as_os_str().is_empty() => cwd.join(path),
            _ => path.to_path_buf(),
        }
    };
    format!("{FILE_SCHEME}{}", absolute.display())
}

/// A BAM resource with its `.pbi` attached
fn bam_resource(meta_type: &str, path: &Path, ambient: &dyn Ambient) -> ExternalResource {
    let uri = resource_uri(path, ambient);
    let mut resource = ExternalResource::new(meta_type, uri.clone());
    resource.file_indices.push(FileIndex {
        meta_type: PBI_META_TYPE.to_string(),
        resource_id: format!("{uri}{PBI_SUFFIX}"),
    });
    resource
}

/// Apply the conversion to a loaded input dataset
///
/// # Errors
///
/// Returns `SynthesisError::UnexpectedType` if the input is not an
/// `HdfSubreadSet`, or `SynthesisError::Index` if the new BAM's index cannot
/// be read.
pub fn synthesize(
    mut dataset: DataSet,
    request: &SynthesisRequest<'_>,
    ambient: &dyn Ambient,
) -> Result<DataSet, SynthesisError> {
    if dataset.kind != DataSetKind::HdfSubreadSet {
        return Err(SynthesisError::UnexpectedType {
            expected: DataSetKind::HdfSubreadSet,
            found: dataset.kind,
        });
    }

    let profile = request.profile;
    let now = ambient.now();
    dataset.kind = profile.dataset_kind;
    dataset.meta_type = profile.dataset_meta_type.to_string();
    dataset.created_at = iso8601(now);
    dataset.time_stamped_name = format!("{}{}", profile.name_prefix, dataset_timestamp(now));

    let before = dataset.external_resources.len();
    dataset
        .external_resources
        .retain(|r| !contains_ignore_case(&r.meta_type, LEGACY_RESOURCE_MARKER));
    debug!(
        removed = before - dataset.external_resources.len(),
        "Removed legacy resources"
    );

    let mut primary = bam_resource(profile.bam_file_type, request.output_bam, ambient);
    if let (Some(scraps), Some(meta_type)) = (request.scraps_bam, profile.scraps_file_type) {
        primary
            .external_resources
            .push(bam_resource(meta_type, scraps, ambient));
    }
    dataset.external_resources.push(primary);

    let pbi_path = index_path(request.output_bam);
    let index = PbiIndex::from_path(&pbi_path).map_err(|source| SynthesisError::Index {
        path: pbi_path.display().to_string(),
        source,
    })?;
    dataset.metadata.total_length = index.total_length().to_string();
    dataset.metadata.num_records = index.num_reads().to_string();

    Ok(dataset)
}

/// Load the input dataset, convert it and save it to the destination
///
/// # Errors
///
/// Returns `SynthesisError` if any step fails.
pub fn write_output_dataset(
    request: &SynthesisRequest<'_>,
    ambient: &dyn Ambient,
) -> Result<PathBuf, SynthesisError> {
    let dataset = DataSet::load_from_file(request.input)?;
    let dataset = synthesize(dataset, request, ambient)?;
    dataset.save(request.destination)?;

    info!(
        path = %request.destination.display(),
        records = %dataset.metadata.num_records,
        "Wrote output dataset"
    );
    Ok(request.destination.to_path_buf())
}
