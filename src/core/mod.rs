//! Run configuration.
//!
//! - [`types`]: modes, platforms and pulse features
//! - [`profile`]: per-mode filenames and dataset constants
//! - [`inputs`]: resolution of the legacy input files
//! - [`settings`]: validated [`Settings`](settings::Settings) built from raw options
//!
//! | Mode       | Primary BAM       | Scraps BAM     | Dataset                  |
//! |------------|-------------------|----------------|--------------------------|
//! | subread    | `.subreads.bam`   | `.scraps.bam`  | `.subreadset.json`       |
//! | hqregion   | `.hqregions.bam`  | `.lowqual.bam` | `.subreadset.json`       |
//! | polymerase | `.polymerase.bam` | `.scraps.bam`  | `.subreadset.json`       |
//! | ccs        | `.ccs.bam`        |                | `.consensusreadset.json` |

pub mod inputs;
pub mod profile;
pub mod settings;
pub mod types;
