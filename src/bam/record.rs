use crate::bam::writer::WriteError;

/// Context flag: an adapter precedes the record on the polymerase read
pub const ADAPTER_BEFORE: u8 = 0x01;
/// Context flag: an adapter follows the record on the polymerase read
pub const ADAPTER_AFTER: u8 = 0x02;

/// Value of an auxiliary tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Int(i32),
    Float(f32),
    Char(u8),
    Text(String),
    UInt8Array(Vec<u8>),
    UInt16Array(Vec<u16>),
}

/// A fully projected output record, ready to be handed to a [`RecordSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub name: String,
    pub bases: Vec<u8>,
    /// Phred scores (not ASCII-offset)
    pub qualities: Option<Vec<u8>>,
    pub read_group_id: String,
    pub hole_number: u32,
    pub query_start: i32,
    pub query_end: i32,
    pub read_quality: f32,
    pub context_flags: u8,
    /// Additional tags, written after the standard PacBio ones
    pub tags: Vec<([u8; 2], TagValue)>,
}

impl OutputRecord {
    #[must_use]
    pub fn tag(&self, tag: [u8; 2]) -> Option<&TagValue> {
        self.tags.iter().find(|(t, _)| *t == tag).map(|(_, v)| v)
    }
}

/// Destination for output records
pub trait RecordSink {
    /// Write one record
    ///
    /// # Errors
    ///
    /// Returns `WriteError` if the record cannot be encoded or written.
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), WriteError>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, record: &OutputRecord) -> Result<(), WriteError> {
        (**self).write_record(record)
    }
}

/// Read group identifier for a movie and read type.
///
/// The first eight hex digits of `md5("<movie>//<READTYPE>")`.
///
/// ```
/// use bax2bam::bam::record::make_read_group_id;
///
/// let id = make_read_group_id("m140905_042212_sidney_c100564852550000001823085912221377_s1_X0", "SUBREAD");
/// assert_eq!(id.len(), 8);
/// ```
#[must_use]
pub fn make_read_group_id(movie_name: &str, read_type: &str) -> String {
    let digest = md5::compute(format!("{movie_name}//{read_type}").as_bytes());
    let hex = format!("{digest:x}");
    hex[..8].to_string()
}

/// Numeric form of a read group id, as stored in the side-index
#[must_use]
#[allow(clippy::cast_possible_wrap)] // reinterpretation of the 32-bit hash is intended
pub fn read_group_number(read_group_id: &str) -> i32 {
    u32::from_str_radix(read_group_id, 16).unwrap_or(0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_group_id_is_stable_and_type_specific() {
        let a = make_read_group_id("movie", "SUBREAD");
        let b = make_read_group_id("movie", "SUBREAD");
        let c = make_read_group_id("movie", "SCRAP");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_read_group_number() {
        assert_eq!(read_group_number("00000010"), 16);
        assert_eq!(read_group_number("ffffffff"), -1);
        assert_eq!(read_group_number("not hex"), 0);
    }

    #[test]
    fn test_tag_lookup() {
        let record = OutputRecord {
            name: "m/1/0_4".to_string(),
            bases: b"ACGT".to_vec(),
            qualities: None,
            read_group_id: "abcd1234".to_string(),
            hole_number: 1,
            query_start: 0,
            query_end: 4,
            read_quality: 0.8,
            context_flags: 0,
            tags: vec![(*b"np", TagValue::Int(3))],
        };
        assert_eq!(record.tag(*b"np"), Some(&TagValue::Int(3)));
        assert_eq!(record.tag(*b"dq"), None);
    }
}
