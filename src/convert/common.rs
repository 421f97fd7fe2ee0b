//! Building blocks shared by every projection: record naming, standard
//! tags and per-base feature tags.

use crate::bam::frames::{encode_all, FrameEncoding};
use crate::bam::record::{OutputRecord, TagValue, ADAPTER_AFTER, ADAPTER_BEFORE};
use crate::core::types::{Feature, FeatureSet};
use crate::legacy::{LegacyRead, Region, RegionKind};

/// Scrap region type: adapter
pub const SCRAP_ADAPTER: u8 = b'A';
/// Scrap region type: low-quality sequence outside the HQ region
pub const SCRAP_LOW_QUALITY: u8 = b'L';

const PHRED_OFFSET: u8 = 33;
const MAX_PHRED: u8 = 93;

/// Per-movie values every projected record needs
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub movie_name: &'a str,
    pub read_group_id: &'a str,
    pub scraps_read_group_id: &'a str,
    pub frames: FrameEncoding,
}

/// `movie/hole/start_end`
#[must_use]
pub fn interval_name(movie_name: &str, hole_number: u32, start: usize, end: usize) -> String {
    format!("{movie_name}/{hole_number}/{start}_{end}")
}

/// Context flags for a record spanning `[start, end)`, from the adapters
/// that touch it
#[must_use]
pub fn context_flags(adapters: &[Region], start: usize, end: usize) -> u8 {
    let mut flags = 0;
    if adapters.iter().any(|a| a.end == start) {
        flags |= ADAPTER_BEFORE;
    }
    if adapters.iter().any(|a| a.start == end) {
        flags |= ADAPTER_AFTER;
    }
    flags
}

/// Adapters of the read, sorted by start
#[must_use]
pub fn adapters(read: &LegacyRead) -> Vec<Region> {
    read.regions_within(RegionKind::Adapter, 0, read.len())
}

/// Quality values as Phred+33 text
fn qv_tag(values: &[u8]) -> TagValue {
    TagValue::Text(
        values
            .iter()
            .map(|&q| char::from(q.min(MAX_PHRED) + PHRED_OFFSET))
            .collect(),
    )
}

fn base_tag(values: &[u8]) -> TagValue {
    TagValue::Text(String::from_utf8_lossy(values).into_owned())
}

/// `[start, end)` of a per-base channel, if the read has it
fn channel<T>(values: &Option<Vec<T>>, start: usize, end: usize) -> Option<&[T]> {
    values.as_deref().and_then(|v| v.get(start..end))
}

fn frame_tag(values: &[u16], frames: FrameEncoding) -> TagValue {
    match frames {
        FrameEncoding::CodecV1 => TagValue::UInt8Array(encode_all(values)),
        FrameEncoding::Lossless => TagValue::UInt16Array(values.to_vec()),
    }
}

/// Feature tags for `[start, end)`; channels missing from the read are skipped
#[must_use]
pub fn feature_tags(
    read: &LegacyRead,
    features: FeatureSet,
    frames: FrameEncoding,
    start: usize,
    end: usize,
) -> Vec<([u8; 2], TagValue)> {
    features
        .iter()
        .filter_map(|feature| {
            let value = match feature {
                Feature::DeletionQV => channel(&read.deletion_qv, start, end).map(qv_tag),
                Feature::InsertionQV => channel(&read.insertion_qv, start, end).map(qv_tag),
                Feature::MergeQV => channel(&read.merge_qv, start, end).map(qv_tag),
                Feature::SubstitutionQV => channel(&read.substitution_qv, start, end).map(qv_tag),
                Feature::DeletionTag => channel(&read.deletion_tag, start, end).map(base_tag),
                Feature::SubstitutionTag => {
                    channel(&read.substitution_tag, start, end).map(base_tag)
                }
                Feature::Ipd => channel(&read.ipd, start, end).map(|v| frame_tag(v, frames)),
                Feature::PulseWidth => {
                    channel(&read.pulse_width, start, end).map(|v| frame_tag(v, frames))
                }
            };
            value.map(|v| (feature.tag(), v))
        })
        .collect()
}

/// Project `[start, end)` of a read into an output record
#[must_use]
pub fn make_record(
    read: &LegacyRead,
    name: String,
    read_group_id: &str,
    start: usize,
    end: usize,
    context_flags: u8,
) -> OutputRecord {
    OutputRecord {
        name,
        bases: read.bases[start..end].to_vec(),
        qualities: read
            .qualities
            .as_deref()
            .and_then(|q| q.get(start..end))
            .map(<[u8]>::to_vec),
        read_group_id: read_group_id.to_string(),
        hole_number: read.hole_number,
        query_start: to_i32(start),
        query_end: to_i32(end),
        read_quality: read.read_score,
        context_flags,
        tags: Vec::new(),
    }
}

/// A primary record named `movie/hole/start_end` carrying feature tags
#[must_use]
pub fn interval_record(
    read: &LegacyRead,
    ctx: &ProjectionContext<'_>,
    features: FeatureSet,
    region: Region,
    context_flags: u8,
) -> OutputRecord {
    let name = interval_name(ctx.movie_name, read.hole_number, region.start, region.end);
    let mut record = make_record(
        read,
        name,
        ctx.read_group_id,
        region.start,
        region.end,
        context_flags,
    );
    record.tags = feature_tags(read, features, ctx.frames, region.start, region.end);
    record
}

/// A scraps record for `region`, tagged with the scrap region type and the
/// ZMW type of the hole
#[must_use]
pub fn scrap_record(
    read: &LegacyRead,
    ctx: &ProjectionContext<'_>,
    features: FeatureSet,
    region: Region,
    scrap_type: u8,
    context_flags: u8,
) -> OutputRecord {
    let name = interval_name(ctx.movie_name, read.hole_number, region.start, region.end);
    let mut record = make_record(
        read,
        name,
        ctx.scraps_read_group_id,
        region.start,
        region.end,
        context_flags,
    );
    record.tags = feature_tags(read, features, ctx.frames, region.start, region.end);
    record.tags.push((*b"sc", TagValue::Char(scrap_type)));
    record.tags.push((*b"sz", TagValue::Char(read.hole_status.zmw_type())));
    record
}

/// Low-quality scraps for the parts of the read outside `[hq_start, hq_end)`
#[must_use]
pub fn flank_scraps(
    read: &LegacyRead,
    ctx: &ProjectionContext<'_>,
    features: FeatureSet,
    hq: Region,
) -> Vec<OutputRecord> {
    [
        Region::new(RegionKind::HqRegion, 0, hq.start),
        Region::new(RegionKind::HqRegion, hq.end, read.len()),
    ]
    .into_iter()
    .filter(|r| !r.is_empty())
    .map(|r| scrap_record(read, ctx, features, r, SCRAP_LOW_QUALITY, 0))
    .collect()
}

/// The whole read as a single low-quality scrap
#[must_use]
pub fn whole_read_scrap(
    read: &LegacyRead,
    ctx: &ProjectionContext<'_>,
    features: FeatureSet,
) -> OutputRecord {
    let region = Region::new(RegionKind::HqRegion, 0, read.len());
    scrap_record(read, ctx, features, region, SCRAP_LOW_QUALITY, 0)
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}


#[cfg(test)]
mod tests {
    use super::test_support::{read, CTX};
    use super::*;

    #[test]
    fn test_feature_tags_slice_and_encode() {
        let mut r = read(10, Vec::new());
        r.deletion_qv = Some((0..10).collect());
        let tags = feature_tags(&r, FeatureSet::all(), FrameEncoding::CodecV1, 2, 5);

        let dq = tags.iter().find(|(t, _)| t == b"dq").map(|(_, v)| v);
        assert_eq!(dq, Some(&TagValue::Text("#$%".to_string())));

        let ip = tags.iter().find(|(t, _)| t == b"ip").map(|(_, v)| v);
        assert_eq!(ip, Some(&TagValue::UInt8Array(encode_all(&[100, 100, 100]))));

        let dt = tags.iter().find(|(t, _)| t == b"dt").map(|(_, v)| v);
        assert_eq!(dt, Some(&TagValue::Text("NNN".to_string())));
    }

    #[test]
    fn test_feature_tags_lossless() {
        let r = read(4, Vec::new());
        let tags = feature_tags(&r, FeatureSet::all(), FrameEncoding::Lossless, 0, 4);
        let pw = tags.iter().find(|(t, _)| t == b"pw").map(|(_, v)| v);
        assert_eq!(pw, Some(&TagValue::UInt16Array(vec![5; 4])));
    }

    #[test]
    fn test_missing_channels_and_disabled_features_skipped() {
        let mut r = read(4, Vec::new());
        r.merge_qv = None;
        let features: FeatureSet = [Feature::MergeQV, Feature::InsertionQV].into_iter().collect();
        let tags = feature_tags(&r, features, FrameEncoding::CodecV1, 0, 4);
        let keys: Vec<[u8; 2]> = tags.iter().map(|(t, _)| *t).collect();
        assert_eq!(keys, vec![*b"iq"]);
    }

    #[test]
    fn test_context_flags() {
        let adapters = vec![
            Region::new(RegionKind::Adapter, 10, 20),
            Region::new(RegionKind::Adapter, 50, 60),
        ];
        assert_eq!(context_flags(&adapters, 20, 50), ADAPTER_BEFORE | ADAPTER_AFTER);
        assert_eq!(context_flags(&adapters, 0, 10), ADAPTER_AFTER);
        assert_eq!(context_flags(&adapters, 60, 90), ADAPTER_BEFORE);
        assert_eq!(context_flags(&adapters, 25, 45), 0);
    }

    #[test]
    fn test_scrap_record_tags() {
        let r = read(30, Vec::new());
        let region = Region::new(RegionKind::Adapter, 10, 20);
        let scrap = scrap_record(&r, &CTX, FeatureSet::empty(), region, SCRAP_ADAPTER, 0);
        assert_eq!(scrap.name, "movie/42/10_20");
        assert_eq!(scrap.read_group_id, "bbbbbbbb");
        assert_eq!(scrap.bases.len(), 10);
        assert_eq!(scrap.tag(*b"sc"), Some(&TagValue::Char(b'A')));
        assert_eq!(scrap.tag(*b"sz"), Some(&TagValue::Char(b'N')));
    }

    #[test]
    fn test_flank_scraps() {
        let r = read(100, Vec::new());
        let hq = Region::new(RegionKind::HqRegion, 0, 80);
        let scraps = flank_scraps(&r, &CTX, FeatureSet::empty(), hq);
        assert_eq!(scraps.len(), 1);
        assert_eq!(scraps[0].name, "movie/42/80_100");
        assert_eq!(scraps[0].tag(*b"sc"), Some(&TagValue::Char(b'L')));
    }
}
