use crate::bam::record::TagValue;
use crate::convert::common::{feature_tags, make_record, ProjectionContext};
use crate::convert::{Projection, ReadProjection};
use crate::core::profile::ModeProfile;
use crate::core::types::{Feature, FeatureSet, Mode};
use crate::legacy::{LegacyRead, ReadSource};

/// Channels a consensus read does not carry
const UNSUPPORTED: [Feature; 5] = [
    Feature::MergeQV,
    Feature::DeletionTag,
    Feature::SubstitutionTag,
    Feature::Ipd,
    Feature::PulseWidth,
];

/// Circular consensus reads, one per ZMW, named `movie/hole/ccs`
#[derive(Debug, Clone, Copy)]
pub struct CcsProjection {
    features: FeatureSet,
}

impl CcsProjection {
    /// Channels unavailable for consensus reads are dropped from `features`
    #[must_use]
    pub fn new(mut features: FeatureSet) -> Self {
        for feature in UNSUPPORTED {
            features.remove(feature);
        }
        Self { features }
    }
}

impl ReadProjection for CcsProjection {
    fn profile(&self) -> &'static ModeProfile {
        ModeProfile::for_mode(Mode::Consensus)
    }

    fn features(&self) -> FeatureSet {
        self.features
    }

    fn read_source(&self) -> ReadSource {
        ReadSource::Consensus
    }

    fn project(&self, read: &LegacyRead, ctx: &ProjectionContext<'_>) -> Projection {
        let name = format!("{}/{}/ccs", ctx.movie_name, read.hole_number);
        let mut record = make_record(read, name, ctx.read_group_id, 0, read.len(), 0);
        record.tags = feature_tags(read, self.features, ctx.frames, 0, read.len());
        record.tags.push((
            *b"np",
            TagValue::Int(i32::try_from(read.num_passes).unwrap_or(i32::MAX)),
        ));

        Projection {
            primary: vec![record],
            scraps: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::common::test_support::{read, CTX};

    #[test]
    fn test_unsupported_features_cleared() {
        let projection = CcsProjection::new(FeatureSet::all());
        let kept: Vec<Feature> = projection.features().iter().collect();
        assert_eq!(
            kept,
            vec![
                Feature::DeletionQV,
                Feature::InsertionQV,
                Feature::SubstitutionQV
            ]
        );
    }

    #[test]
    fn test_consensus_record() {
        let mut r = read(12, Vec::new());
        r.num_passes = 7;
        let projection = CcsProjection::new(FeatureSet::all()).project(&r, &CTX);

        assert!(projection.scraps.is_empty());
        let record = &projection.primary[0];
        assert_eq!(record.name, "movie/42/ccs");
        assert_eq!(record.query_start, 0);
        assert_eq!(record.query_end, 12);
        assert_eq!(record.tag(*b"np"), Some(&TagValue::Int(7)));
        assert_eq!(record.tag(*b"ip"), None);
        assert_eq!(record.tag(*b"mq"), None);
        assert!(record.tag(*b"dq").is_some());
    }

    #[test]
    fn test_reads_consensus_calls() {
        assert_eq!(
            CcsProjection::new(FeatureSet::all()).read_source(),
            ReadSource::Consensus
        );
    }
}
