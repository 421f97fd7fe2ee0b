//! Command-line interface for bax2bam.
//!
//! ## Usage
//!
//! ```text
//! # Subreads and scraps from the partitions of one movie
//! bax2bam m1.1.bax.h5 m1.2.bax.h5 m1.3.bax.h5
//!
//! # Every partition listed by a container, HQ regions only
//! bax2bam --hqregion m1.bas.h5 -o out/m1
//!
//! # From a dataset, also writing the matching SubreadSet
//! bax2bam --dataset m1.hdfsubreadset.json
//!
//! # Consensus reads with a reduced set of pulse features
//! bax2bam --ccs --pulse-features DeletionQV,InsertionQV m1.1.ccs.h5
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::core::settings::{RawOptions, Settings};
use crate::legacy::LegacyFormat;
use crate::runner::{run, RunReport};
use crate::utils::ambient::Ambient;

#[derive(Parser, Debug)]
#[command(name = "bax2bam")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Convert legacy PacBio .bax.h5/.bas.h5 files to BAM")]
#[command(
    long_about = "bax2bam converts the reads of legacy PacBio HDF5 partitions (.bax.h5) into unaligned BAM files with a PacBio index (.pbi).\n\nInputs can be given as partitions or containers (.bas.h5), as a file of filenames, or as an HdfSubreadSet dataset. When a dataset is given, a matching output dataset is written next to the BAMs."
)]
pub struct Cli {
    /// Input files (.bax.h5 partitions or .bas.h5 containers)
    pub inputs: Vec<String>,

    /// File of filenames listing the input files
    #[arg(long)]
    pub fofn: Option<PathBuf>,

    /// Input HdfSubreadSet dataset
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Output prefix (default: movie name of the first input)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output dataset path (default: <prefix>.subreadset.json or <prefix>.consensusreadset.json)
    #[arg(long)]
    pub output_dataset: Option<PathBuf>,

    /// Write subreads and scraps (default)
    #[arg(long, help_heading = "Modes")]
    pub subread: bool,

    /// Write HQ regions and low-quality flanks
    #[arg(long, help_heading = "Modes")]
    pub hqregion: bool,

    /// Write full polymerase reads
    #[arg(long, help_heading = "Modes")]
    pub polymerase: bool,

    /// Write circular consensus reads
    #[arg(long, help_heading = "Modes")]
    pub ccs: bool,

    /// Label the output as coming from a Sequel instrument
    #[arg(long)]
    pub sequel_platform: bool,

    /// Keep reads from non-sequencing ZMWs in the scraps file
    #[arg(long)]
    pub internal: bool,

    /// Store IPD and pulse width as raw frame counts
    #[arg(long)]
    pub lossless_frames: bool,

    /// Convert files whose chemistry is not recognized
    #[arg(long)]
    pub allow_unsupported_chem: bool,

    /// Comma-separated pulse features to include (DeletionQV, DeletionTag,
    /// InsertionQV, IPD, MergeQV, PulseWidth, SubstitutionQV, SubstitutionTag)
    #[arg(long, value_name = "LIST")]
    pub pulse_features: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Raw options for settings resolution, recording `command_line` for the
    /// BAM header
    #[must_use]
    pub fn to_options(&self, command_line: String) -> RawOptions {
        RawOptions {
            inputs: self.inputs.clone(),
            fofn: self.fofn.clone(),
            dataset: self.dataset.clone(),
            output: self.output.clone(),
            output_dataset: self.output_dataset.clone(),
            subread: self.subread,
            hqregion: self.hqregion,
            polymerase: self.polymerase,
            ccs: self.ccs,
            sequel_platform: self.sequel_platform,
            internal: self.internal,
            lossless_frames: self.lossless_frames,
            allow_unsupported_chem: self.allow_unsupported_chem,
            pulse_features: self.pulse_features.clone(),
            command_line,
        }
    }
}

/// Resolve settings from the parsed command line and run the conversion
#[must_use]
pub fn execute(
    cli: &Cli,
    command_line: String,
    format: &dyn LegacyFormat,
    ambient: &dyn Ambient,
) -> RunReport {
    let settings = Settings::from_options(&cli.to_options(command_line), format);
    run(&settings, format, ambient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "bax2bam",
            "--ccs",
            "--pulse-features",
            "DeletionQV,IPD",
            "-o",
            "out",
            "a.1.bax.h5",
            "b.1.bax.h5",
        ])
        .unwrap();

        let opts = cli.to_options("bax2bam --ccs".to_string());
        assert!(opts.ccs);
        assert!(!opts.subread);
        assert_eq!(opts.pulse_features.as_deref(), Some("DeletionQV,IPD"));
        assert_eq!(opts.output.as_deref(), Some("out"));
        assert_eq!(opts.inputs, vec!["a.1.bax.h5", "b.1.bax.h5"]);
        assert_eq!(opts.command_line, "bax2bam --ccs");
    }

    #[test]
    fn test_inputs_are_optional() {
        let cli = Cli::try_parse_from(["bax2bam", "--fofn", "list.fofn"]).unwrap();
        assert!(cli.inputs.is_empty());
        assert_eq!(cli.fofn, Some(PathBuf::from("list.fofn")));
    }
}
