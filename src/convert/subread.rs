use crate::convert::common::{
    adapters, context_flags, flank_scraps, interval_record, scrap_record, whole_read_scrap,
    ProjectionContext, SCRAP_ADAPTER,
};
use crate::convert::{Projection, ReadProjection};
use crate::core::profile::ModeProfile;
use crate::core::types::{FeatureSet, Mode};
use crate::legacy::{LegacyRead, RegionKind};

/// Splits the HQ region of a polymerase read into subreads at its adapters
#[derive(Debug, Clone, Copy)]
pub struct SubreadProjection {
    features: FeatureSet,
}

impl SubreadProjection {
    #[must_use]
    pub fn new(features: FeatureSet) -> Self {
        Self { features }
    }
}

impl ReadProjection for SubreadProjection {
    fn profile(&self) -> &'static ModeProfile {
        ModeProfile::for_mode(Mode::Subread)
    }

    fn features(&self) -> FeatureSet {
        self.features
    }

    fn project(&self, read: &LegacyRead, ctx: &ProjectionContext<'_>) -> Projection {
        let Some(hq) = read.hq_region() else {
            return Projection::scraps_only(vec![whole_read_scrap(read, ctx, self.features)]);
        };

        let adapters = adapters(read);
        let primary = read
            .regions_within(RegionKind::Insert, hq.start, hq.end)
            .into_iter()
            .map(|insert| {
                let flags = context_flags(&adapters, insert.start, insert.end);
                interval_record(read, ctx, self.features, insert, flags)
            })
            .collect();

        let mut scraps: Vec<_> = read
            .regions_within(RegionKind::Adapter, hq.start, hq.end)
            .into_iter()
            .map(|adapter| scrap_record(read, ctx, self.features, adapter, SCRAP_ADAPTER, 0))
            .collect();
        scraps.extend(flank_scraps(read, ctx, self.features, hq));
        scraps.sort_by_key(|r| r.query_start);

        Projection { primary, scraps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bam::record::{TagValue, ADAPTER_AFTER, ADAPTER_BEFORE};
    use crate::convert::common::test_support::{names, read, CTX};
    use crate::legacy::Region;

    fn region(kind: RegionKind, start: usize, end: usize) -> Region {
        Region::new(kind, start, end)
    }

    #[test]
    fn test_subreads_split_at_adapters() {
        let r = read(
            100,
            vec![
                region(RegionKind::HqRegion, 5, 95),
                region(RegionKind::Insert, 0, 40),
                region(RegionKind::Adapter, 40, 50),
                region(RegionKind::Insert, 50, 100),
            ],
        );
        let projection = SubreadProjection::new(FeatureSet::all()).project(&r, &CTX);

        assert_eq!(names(&projection.primary), vec!["movie/42/5_40", "movie/42/50_95"]);
        assert_eq!(projection.primary[0].context_flags, ADAPTER_AFTER);
        assert_eq!(projection.primary[1].context_flags, ADAPTER_BEFORE);
        assert_eq!(projection.primary[0].read_group_id, "aaaaaaaa");
        assert_eq!(projection.primary[1].query_start, 50);
        assert_eq!(projection.primary[1].query_end, 95);

        assert_eq!(
            names(&projection.scraps),
            vec!["movie/42/0_5", "movie/42/40_50", "movie/42/95_100"]
        );
        let types: Vec<_> = projection.scraps.iter().map(|s| s.tag(*b"sc").cloned()).collect();
        assert_eq!(
            types,
            vec![
                Some(TagValue::Char(b'L')),
                Some(TagValue::Char(b'A')),
                Some(TagValue::Char(b'L')),
            ]
        );
    }

    #[test]
    fn test_no_hq_region_is_one_scrap() {
        let r = read(30, vec![region(RegionKind::Insert, 0, 30)]);
        let projection = SubreadProjection::new(FeatureSet::all()).project(&r, &CTX);
        assert!(projection.primary.is_empty());
        assert_eq!(names(&projection.scraps), vec!["movie/42/0_30"]);
    }

    #[test]
    fn test_empty_hq_region_is_one_scrap() {
        let r = read(
            30,
            vec![
                region(RegionKind::HqRegion, 0, 0),
                region(RegionKind::Insert, 0, 30),
            ],
        );
        let projection = SubreadProjection::new(FeatureSet::all()).project(&r, &CTX);
        assert!(projection.primary.is_empty());
        assert_eq!(projection.scraps.len(), 1);
    }

    #[test]
    fn test_feature_tags_follow_settings() {
        let r = read(
            20,
            vec![
                region(RegionKind::HqRegion, 0, 20),
                region(RegionKind::Insert, 0, 20),
            ],
        );
        let projection = SubreadProjection::new(FeatureSet::empty()).project(&r, &CTX);
        assert_eq!(projection.primary.len(), 1);
        assert!(projection.primary[0].tags.is_empty());
        assert!(projection.scraps.is_empty());
    }
}
