//! PacBio BAM output: record model, timing codec, BAM sink and `.pbi`
//! side-index.

pub mod frames;
pub mod pbi;
pub mod record;
pub mod writer;

pub use record::{OutputRecord, RecordSink, TagValue};
pub use writer::{BamSink, ReadGroupInfo, WriteError};
