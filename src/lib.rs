//! # bax2bam
//!
//! A library for converting legacy PacBio HDF5 read files to BAM.
//!
//! Older PacBio instruments wrote each movie as a set of `.bax.h5`
//! partitions, optionally tied together by a `.bas.h5` container. Current
//! tooling expects unaligned BAM files with a PacBio index (`.pbi`) and a
//! dataset describing them. `bax2bam` reads the partitions of one movie and
//! writes:
//!
//! - **subreads** split at adapters, with adapters and low-quality flanks
//!   written to a scraps BAM;
//! - **HQ regions**, one per ZMW, with low-quality flanks as scraps;
//! - **polymerase reads**, the whole read per ZMW;
//! - **consensus reads** (CCS).
//!
//! Per-base quality and pulse channels are copied as BAM tags, and when the
//! inputs come from an `HdfSubreadSet` dataset the matching output dataset is
//! generated.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bax2bam::core::settings::{RawOptions, Settings};
//! use bax2bam::legacy::NoBackend;
//! use bax2bam::runner::run;
//! use bax2bam::utils::ambient::SystemAmbient;
//!
//! let opts = RawOptions {
//!     inputs: vec!["m1.1.bax.h5".to_string()],
//!     hqregion: true,
//!     ..RawOptions::default()
//! };
//! let settings = Settings::from_options(&opts, &NoBackend);
//! let report = run(&settings, &NoBackend, &SystemAmbient);
//! for error in &report.errors {
//!     eprintln!("ERROR: {error}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Modes, features, input resolution and run settings
//! - [`legacy`]: Seam to the HDF5 reader and the legacy read model
//! - [`convert`]: Projection of legacy reads into BAM records
//! - [`bam`]: BAM and `.pbi` output
//! - [`dataset`]: Dataset manifests and output dataset synthesis
//! - [`runner`]: A complete conversion run
//! - [`cli`]: Command-line interface implementation

pub mod bam;
pub mod cli;
pub mod convert;
pub mod core;
pub mod dataset;
pub mod legacy;
pub mod runner;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::settings::{ConfigError, RawOptions, Settings};
pub use crate::core::types::*;
pub use convert::{ConvertError, Converter, ReadProjection};
pub use dataset::DataSet;
pub use legacy::{LegacyFormat, LegacyRead, PartitionReader};
pub use runner::{run, RunReport};
