//! Run settings built from the raw command-line options.
//!
//! Problems found while building settings do not stop the build: they are
//! collected into [`Settings::errors`] and reported together.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::bam::frames::FrameEncoding;
use crate::core::inputs::{movie_name_from_path, resolve_inputs, InputSource, PartitionRef};
use crate::core::profile::ModeProfile;
use crate::core::types::{Feature, FeatureSet, Mode, Platform};
use crate::legacy::LegacyFormat;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing input files")]
    MissingInputFiles,

    #[error("multiple modes selected")]
    MultipleModes,

    #[error("unknown pulse feature: {0}")]
    UnknownFeature(String),

    #[error("could not read input dataset {path}: {reason}")]
    ManifestUnreadable { path: String, reason: String },

    #[error("could not read file of filenames {path}: {reason}")]
    FofnUnreadable { path: String, reason: String },
}

/// A value together with the configuration errors found producing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub errors: Vec<ConfigError>,
}

impl<T> Resolved<T> {
    #[must_use]
    pub fn ok(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(value: T, errors: Vec<ConfigError>) -> Self {
        Self { value, errors }
    }

    /// Transform the value, keeping the errors
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            errors: self.errors,
        }
    }
}

/// Options as given on the command line, before any validation
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub inputs: Vec<String>,
    pub fofn: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
    pub output: Option<String>,
    pub output_dataset: Option<PathBuf>,
    pub subread: bool,
    pub hqregion: bool,
    pub polymerase: bool,
    pub ccs: bool,
    pub sequel_platform: bool,
    pub internal: bool,
    pub lossless_frames: bool,
    pub allow_unsupported_chem: bool,
    pub pulse_features: Option<String>,
    pub command_line: String,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: Mode,
    pub features: FeatureSet,
    pub platform: Platform,
    pub internal: bool,
    pub allow_unsupported_chemistry: bool,
    pub frames: FrameEncoding,
    pub output_prefix: String,
    pub output_dataset: Option<PathBuf>,
    pub partitions: Vec<PartitionRef>,
    pub dataset: Option<PathBuf>,
    pub fofn: Option<PathBuf>,
    pub command_line: String,
    pub errors: Vec<ConfigError>,
}

/// Pick the mode from the mode flags.
///
/// More than one flag is an error; the mode then falls back to subreads.
#[must_use]
pub fn resolve_mode(subread: bool, hqregion: bool, polymerase: bool, ccs: bool) -> Resolved<Mode> {
    let selected: Vec<Mode> = [
        (subread, Mode::Subread),
        (hqregion, Mode::HqRegion),
        (polymerase, Mode::Polymerase),
        (ccs, Mode::Consensus),
    ]
    .into_iter()
    .filter_map(|(set, mode)| set.then_some(mode))
    .collect();

    match selected.as_slice() {
        [] => Resolved::ok(Mode::Subread),
        [mode] => Resolved::ok(*mode),
        _ => Resolved::with_errors(Mode::Subread, vec![ConfigError::MultipleModes]),
    }
}

/// Parse a comma-separated feature list.
///
/// Without a list every feature is enabled. With one, only the listed
/// features are; each unknown name is reported and the known ones still
/// apply. Consensus output never carries pulse widths.
#[must_use]
pub fn resolve_features(list: Option<&str>, mode: Mode) -> Resolved<FeatureSet> {
    let mut errors = Vec::new();
    let mut features = match list {
        None => FeatureSet::all(),
        Some(list) => {
            let mut features = FeatureSet::empty();
            for token in list.split(',').filter(|t| !t.is_empty()) {
                match token.parse::<Feature>() {
                    Ok(feature) => features.insert(feature),
                    Err(unknown) => errors.push(ConfigError::UnknownFeature(unknown)),
                }
            }
            features
        }
    };

    if mode == Mode::Consensus {
        features.remove(Feature::PulseWidth);
    }

    Resolved::with_errors(features, errors)
}

impl Settings {
    /// Build settings from the raw options, collecting every problem found
    #[must_use]
    pub fn from_options(opts: &RawOptions, format: &dyn LegacyFormat) -> Self {
        let mut errors = Vec::new();

        let mode = resolve_mode(opts.subread, opts.hqregion, opts.polymerase, opts.ccs);
        errors.extend(mode.errors);
        let mode = mode.value;

        let features = resolve_features(opts.pulse_features.as_deref(), mode);
        errors.extend(features.errors);

        let source = if let Some(dataset) = &opts.dataset {
            InputSource::DataSet(dataset)
        } else if let Some(fofn) = &opts.fofn {
            InputSource::Fofn(fofn)
        } else {
            InputSource::Explicit(&opts.inputs)
        };
        let partitions = resolve_inputs(source, format);
        errors.extend(partitions.errors);
        let partitions = partitions.value;

        let output_prefix = opts.output.clone().unwrap_or_else(|| {
            partitions
                .first()
                .map(|p| movie_name_from_path(&p.path))
                .unwrap_or_default()
        });

        let settings = Self {
            mode,
            features: features.value,
            platform: if opts.sequel_platform {
                Platform::Sequel
            } else {
                Platform::Rs
            },
            internal: opts.internal,
            allow_unsupported_chemistry: opts.allow_unsupported_chem,
            frames: if opts.lossless_frames {
                FrameEncoding::Lossless
            } else {
                FrameEncoding::CodecV1
            },
            output_prefix,
            output_dataset: opts.output_dataset.clone(),
            partitions,
            dataset: opts.dataset.clone(),
            fofn: opts.fofn.clone(),
            command_line: opts.command_line.clone(),
            errors,
        };

        debug!(
            mode = %settings.mode,
            features = ?settings.features,
            partitions = settings.partitions.len(),
            errors = settings.errors.len(),
            "Resolved settings"
        );
        settings
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn profile(&self) -> &'static ModeProfile {
        ModeProfile::for_mode(self.mode)
    }

    /// Path of the primary BAM
    #[must_use]
    pub fn output_bam(&self) -> PathBuf {
        PathBuf::from(self.profile().output_filename(&self.output_prefix))
    }

    /// Path of the scraps BAM, for modes that write one
    #[must_use]
    pub fn scraps_bam(&self) -> Option<PathBuf> {
        self.profile()
            .scraps_filename(&self.output_prefix)
            .map(PathBuf::from)
    }

    /// Where the output dataset goes: the explicit path, else next to the BAMs
    #[must_use]
    pub fn output_dataset_path(&self) -> PathBuf {
        self.output_dataset.clone().unwrap_or_else(|| {
            PathBuf::from(self.profile().dataset_filename(&self.output_prefix))
        })
    }

    /// Paths of the partitions, in conversion order
    pub fn partition_paths(&self) -> impl Iterator<Item = &Path> {
        self.partitions.iter().map(|p| p.path.as_path())
    }
}
