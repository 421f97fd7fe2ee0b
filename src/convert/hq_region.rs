use crate::convert::common::{
    adapters, context_flags, flank_scraps, interval_record, whole_read_scrap, ProjectionContext,
};
use crate::convert::{Projection, ReadProjection};
use crate::core::profile::ModeProfile;
use crate::core::types::{FeatureSet, Mode};
use crate::legacy::LegacyRead;

/// One record per ZMW covering its HQ region; the flanks become low-quality scraps
#[derive(Debug, Clone, Copy)]
pub struct HqRegionProjection {
    features: FeatureSet,
}

impl HqRegionProjection {
    #[must_use]
    pub fn new(features: FeatureSet) -> Self {
        Self { features }
    }
}

impl ReadProjection for HqRegionProjection {
    fn profile(&self) -> &'static ModeProfile {
        ModeProfile::for_mode(Mode::HqRegion)
    }

    fn features(&self) -> FeatureSet {
        self.features
    }

    fn project(&self, read: &LegacyRead, ctx: &ProjectionContext<'_>) -> Projection {
        let Some(hq) = read.hq_region() else {
            return Projection::scraps_only(vec![whole_read_scrap(read, ctx, self.features)]);
        };

        let flags = context_flags(&adapters(read), hq.start, hq.end);
        Projection {
            primary: vec![interval_record(read, ctx, self.features, hq, flags)],
            scraps: flank_scraps(read, ctx, self.features, hq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::common::test_support::{names, read, CTX};
    use crate::legacy::{Region, RegionKind};

    #[test]
    fn test_hq_region_and_flanks() {
        let r = read(
            100,
            vec![
                Region::new(RegionKind::HqRegion, 10, 90),
                Region::new(RegionKind::Adapter, 40, 50),
            ],
        );
        let projection = HqRegionProjection::new(FeatureSet::all()).project(&r, &CTX);
        assert_eq!(names(&projection.primary), vec!["movie/42/10_90"]);
        assert_eq!(projection.primary[0].bases.len(), 80);
        assert_eq!(names(&projection.scraps), vec!["movie/42/0_10", "movie/42/90_100"]);
        assert!(projection
            .scraps
            .iter()
            .all(|s| s.read_group_id == CTX.scraps_read_group_id));
    }

    #[test]
    fn test_full_length_hq_has_no_scraps() {
        let r = read(50, vec![Region::new(RegionKind::HqRegion, 0, 50)]);
        let projection = HqRegionProjection::new(FeatureSet::all()).project(&r, &CTX);
        assert_eq!(projection.primary.len(), 1);
        assert!(projection.scraps.is_empty());
    }

    #[test]
    fn test_missing_hq_region() {
        let r = read(50, Vec::new());
        let projection = HqRegionProjection::new(FeatureSet::all()).project(&r, &CTX);
        assert!(projection.primary.is_empty());
        assert_eq!(names(&projection.scraps), vec!["movie/42/0_50"]);
    }
}
