use crate::core::types::Mode;
use crate::dataset::DataSetKind;

/// Per-mode naming and manifest constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeProfile {
    pub mode: Mode,

    /// Dataset type of the output manifest
    pub dataset_kind: DataSetKind,

    /// `metaType` of the output manifest
    pub dataset_meta_type: &'static str,

    /// Prefix of the generated `timeStampedName`
    pub name_prefix: &'static str,

    /// External resource type of the primary BAM
    pub bam_file_type: &'static str,

    /// External resource type of the scraps BAM, if the mode produces one
    pub scraps_file_type: Option<&'static str>,

    /// Suffix appended to the output prefix for the manifest
    pub dataset_suffix: &'static str,

    /// Suffix appended to the output prefix for the primary BAM
    pub output_suffix: &'static str,

    /// Suffix appended to the output prefix for the scraps BAM
    pub scraps_suffix: Option<&'static str>,

    /// `READTYPE` written into the primary read group
    pub read_type: &'static str,

    /// `READTYPE` written into the scraps read group
    pub scraps_read_type: &'static str,
}

const SUBREAD_SET: &str = "PacBio.DataSet.SubreadSet";
const SUBREAD_SET_PREFIX: &str = "pacbio_dataset_subreadset-";
const SUBREAD_SET_SUFFIX: &str = ".subreadset.json";

static SUBREAD: ModeProfile = ModeProfile {
    mode: Mode::Subread,
    dataset_kind: DataSetKind::SubreadSet,
    dataset_meta_type: SUBREAD_SET,
    name_prefix: SUBREAD_SET_PREFIX,
    bam_file_type: "PacBio.SubreadFile.SubreadBamFile",
    scraps_file_type: Some("PacBio.SubreadFile.ScrapsBamFile"),
    dataset_suffix: SUBREAD_SET_SUFFIX,
    output_suffix: ".subreads.bam",
    scraps_suffix: Some(".scraps.bam"),
    read_type: "SUBREAD",
    scraps_read_type: "SCRAP",
};

static HQ_REGION: ModeProfile = ModeProfile {
    mode: Mode::HqRegion,
    dataset_kind: DataSetKind::SubreadSet,
    dataset_meta_type: SUBREAD_SET,
    name_prefix: SUBREAD_SET_PREFIX,
    bam_file_type: "PacBio.SubreadFile.HqRegionBamFile",
    scraps_file_type: Some("PacBio.SubreadFile.HqScrapsBamFile"),
    dataset_suffix: SUBREAD_SET_SUFFIX,
    output_suffix: ".hqregions.bam",
    scraps_suffix: Some(".lowqual.bam"),
    read_type: "HQREGION",
    scraps_read_type: "SCRAP",
};

static POLYMERASE: ModeProfile = ModeProfile {
    mode: Mode::Polymerase,
    dataset_kind: DataSetKind::SubreadSet,
    dataset_meta_type: SUBREAD_SET,
    name_prefix: SUBREAD_SET_PREFIX,
    bam_file_type: "PacBio.SubreadFile.PolymeraseBamFile",
    scraps_file_type: Some("PacBio.SubreadFile.PolymeraseScrapsBamFile"),
    dataset_suffix: SUBREAD_SET_SUFFIX,
    output_suffix: ".polymerase.bam",
    scraps_suffix: Some(".scraps.bam"),
    read_type: "POLYMERASE",
    scraps_read_type: "SCRAP",
};

static CONSENSUS: ModeProfile = ModeProfile {
    mode: Mode::Consensus,
    dataset_kind: DataSetKind::ConsensusReadSet,
    dataset_meta_type: "PacBio.DataSet.ConsensusReadSet",
    name_prefix: "pacbio_dataset_consensusreadset-",
    bam_file_type: "PacBio.ConsensusReadFile.ConsensusReadBamFile",
    scraps_file_type: None,
    dataset_suffix: ".consensusreadset.json",
    output_suffix: ".ccs.bam",
    scraps_suffix: None,
    read_type: "CCS",
    scraps_read_type: "UNKNOWN",
};

impl ModeProfile {
    #[must_use]
    pub fn for_mode(mode: Mode) -> &'static ModeProfile {
        match mode {
            Mode::Subread => &SUBREAD,
            Mode::HqRegion => &HQ_REGION,
            Mode::Polymerase => &POLYMERASE,
            Mode::Consensus => &CONSENSUS,
        }
    }

    /// Primary BAM filename for an output prefix
    #[must_use]
    pub fn output_filename(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.output_suffix)
    }

    /// Scraps BAM filename for an output prefix
    #[must_use]
    pub fn scraps_filename(&self, prefix: &str) -> Option<String> {
        self.scraps_suffix.map(|suffix| format!("{prefix}{suffix}"))
    }

    /// Default manifest filename for an output prefix
    #[must_use]
    pub fn dataset_filename(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.dataset_suffix)
    }
}
