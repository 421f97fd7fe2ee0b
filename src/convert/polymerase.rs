use crate::convert::common::{interval_record, ProjectionContext};
use crate::convert::{Projection, ReadProjection};
use crate::core::profile::ModeProfile;
use crate::core::types::{FeatureSet, Mode};
use crate::legacy::{LegacyRead, Region, RegionKind};

/// The whole polymerase read as a single record
#[derive(Debug, Clone, Copy)]
pub struct PolymeraseProjection {
    features: FeatureSet,
}

impl PolymeraseProjection {
    #[must_use]
    pub fn new(features: FeatureSet) -> Self {
        Self { features }
    }
}

impl ReadProjection for PolymeraseProjection {
    fn profile(&self) -> &'static ModeProfile {
        ModeProfile::for_mode(Mode::Polymerase)
    }

    fn features(&self) -> FeatureSet {
        self.features
    }

    fn project(&self, read: &LegacyRead, ctx: &ProjectionContext<'_>) -> Projection {
        let whole = Region::new(RegionKind::HqRegion, 0, read.len());
        Projection {
            primary: vec![interval_record(read, ctx, self.features, whole, 0)],
            scraps: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bam::record::TagValue;
    use crate::convert::common::test_support::{names, read, CTX};

    #[test]
    fn test_whole_read() {
        let r = read(
            64,
            vec![
                Region::new(RegionKind::HqRegion, 10, 20),
                Region::new(RegionKind::Adapter, 30, 40),
            ],
        );
        let projection = PolymeraseProjection::new(FeatureSet::all()).project(&r, &CTX);
        assert_eq!(names(&projection.primary), vec!["movie/42/0_64"]);
        assert!(projection.scraps.is_empty());

        let record = &projection.primary[0];
        assert_eq!(record.bases, r.bases);
        assert_eq!(record.context_flags, 0);
        assert_eq!(record.read_quality, r.read_score);
        assert_eq!(record.tags.len(), 8);
        assert_eq!(
            record.tag(*b"iq"),
            Some(&TagValue::Text(",".repeat(64)))
        );
    }
}
