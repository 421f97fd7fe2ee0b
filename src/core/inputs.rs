//! Resolution of the legacy input files.
//!
//! Inputs come from exactly one of a dataset manifest, a file-of-filenames
//! (FOFN) or the positional command-line arguments. Any `.bas.h5` container
//! among them is then replaced by the `.bax.h5` partitions it lists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::settings::{ConfigError, Resolved};
use crate::dataset::{dataset_dir, DataSet};
use crate::legacy::LegacyFormat;
use crate::utils::text::{contains_ignore_case, ends_with_ignore_case, strip_suffix_ignore_case};

/// Resource ids containing this marker are legacy partitions
pub const PARTITION_MARKER: &str = ".bax.h5";

/// Filename suffix of a top-level container
pub const CONTAINER_SUFFIX: &str = ".bas.h5";

/// Where the input filenames come from
#[derive(Debug, Clone, Copy)]
pub enum InputSource<'a> {
    DataSet(&'a Path),
    Fofn(&'a Path),
    Explicit(&'a [String]),
}

/// Whether a legacy file holds reads itself or only lists partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Partition,
    Container,
}

/// One legacy file to convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRef {
    pub path: PathBuf,
    pub kind: PartitionKind,
}

impl PartitionRef {
    /// Classify a filename by its suffix
    #[must_use]
    pub fn classify(path: &str) -> Self {
        let kind = if ends_with_ignore_case(path, CONTAINER_SUFFIX) {
            PartitionKind::Container
        } else {
            PartitionKind::Partition
        };
        Self {
            path: PathBuf::from(path),
            kind,
        }
    }
}

/// Partition filenames listed in a dataset manifest.
///
/// A dataset that cannot be read yields no files and a deferred error.
#[must_use]
pub fn filenames_from_dataset(path: &Path) -> Resolved<Vec<String>> {
    match DataSet::load_from_file(path) {
        Ok(dataset) => {
            let files = dataset
                .resolved_resource_ids(&dataset_dir(path))
                .into_iter()
                .inspect(|id| debug!(resource = %id, "Dataset resource"))
                .filter(|id| contains_ignore_case(id, PARTITION_MARKER))
                .collect();
            Resolved::ok(files)
        }
        Err(e) => Resolved::with_errors(
            Vec::new(),
            vec![ConfigError::ManifestUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }],
        ),
    }
}

/// Whitespace-separated filenames, in order
#[must_use]
pub fn parse_fofn(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Filenames listed in a FOFN.
///
/// A FOFN that cannot be read yields no files and a deferred error.
#[must_use]
pub fn filenames_from_fofn(path: &Path) -> Resolved<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Resolved::ok(parse_fofn(&text)),
        Err(e) => Resolved::with_errors(
            Vec::new(),
            vec![ConfigError::FofnUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }],
        ),
    }
}

/// Replace containers by their partitions, dropping repeated paths.
///
/// A container that cannot be opened is kept as-is so that the failure
/// surfaces when it is converted.
#[must_use]
pub fn expand_containers(filenames: Vec<String>, format: &dyn LegacyFormat) -> Vec<PartitionRef> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(filenames.len());

    for filename in filenames {
        let reference = PartitionRef::classify(&filename);
        let expanded = match reference.kind {
            PartitionKind::Partition => vec![reference],
            PartitionKind::Container => match format.container_parts(&reference.path) {
                Ok(parts) => {
                    debug!(container = %filename, parts = parts.len(), "Expanded container");
                    parts.iter().map(|p| PartitionRef::classify(p)).collect()
                }
                Err(e) => {
                    warn!(container = %filename, error = %e, "Could not expand container, using it directly");
                    vec![reference]
                }
            },
        };

        for reference in expanded {
            if seen.insert(reference.path.clone()) {
                resolved.push(reference);
            }
        }
    }

    resolved
}

/// Resolve the final list of legacy files to convert
#[must_use]
pub fn resolve_inputs(source: InputSource<'_>, format: &dyn LegacyFormat) -> Resolved<Vec<PartitionRef>> {
    let filenames = match source {
        InputSource::DataSet(path) => filenames_from_dataset(path),
        InputSource::Fofn(path) => filenames_from_fofn(path),
        InputSource::Explicit(args) => Resolved::ok(args.to_vec()),
    };

    let mut resolved = filenames.map(|names| expand_containers(names, format));
    if resolved.value.is_empty() {
        resolved.errors.push(ConfigError::MissingInputFiles);
    }
    resolved
}

/// Movie name implied by a legacy filename.
///
/// ```
/// use bax2bam::core::inputs::movie_name_from_path;
/// use std::path::Path;
///
/// assert_eq!(movie_name_from_path(Path::new("/data/m1_s1_p0.2.bax.h5")), "m1_s1_p0");
/// assert_eq!(movie_name_from_path(Path::new("m1_s1_p0.bas.h5")), "m1_s1_p0");
/// ```
#[must_use]
pub fn movie_name_from_path(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();

    if let Some(stem) = strip_suffix_ignore_case(&filename, PARTITION_MARKER) {
        // Partitions are numbered: <movie>.<n>.bax.h5
        return match stem.rsplit_once('.') {
            Some((movie, part)) if part.chars().all(|c| c.is_ascii_digit()) => movie.to_string(),
            _ => stem.to_string(),
        };
    }
    if let Some(stem) = strip_suffix_ignore_case(&filename, CONTAINER_SUFFIX) {
        return stem.to_string();
    }
    filename
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::{LegacyError, NoBackend, PartitionReader, ReadSource};
    use std::collections::HashMap;

    /// Expands known containers from a table
    struct ContainerTable(HashMap<String, Vec<String>>);

    impl LegacyFormat for ContainerTable {
        fn open_partition(
            &self,
            path: &Path,
            _source: ReadSource,
        ) -> Result<Box<dyn PartitionReader>, LegacyError> {
            Err(LegacyError::BackendUnavailable(path.display().to_string()))
        }

        fn container_parts(&self, path: &Path) -> Result<Vec<String>, LegacyError> {
            self.0
                .get(&path.display().to_string())
                .cloned()
                .ok_or_else(|| LegacyError::Open {
                    path: path.display().to_string(),
                    reason: "not found".to_string(),
                })
        }
    }

    fn table() -> ContainerTable {
        let mut map = HashMap::new();
        map.insert(
            "m1.bas.h5".to_string(),
            vec!["A.1.bax.h5".to_string(), "B.2.bax.h5".to_string()],
        );
        ContainerTable(map)
    }

    fn paths(refs: &[PartitionRef]) -> Vec<String> {
        refs.iter().map(|r| r.path.display().to_string()).collect()
    }

    #[test]
    fn test_parse_fofn() {
        let text = "  a.bax.h5\n\n b.bax.h5\t c.bas.h5  \r\n";
        assert_eq!(parse_fofn(text), vec!["a.bax.h5", "b.bax.h5", "c.bas.h5"]);
        assert!(parse_fofn(" \n\t ").is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            PartitionRef::classify("x/M1.BAS.H5").kind,
            PartitionKind::Container
        );
        assert_eq!(
            PartitionRef::classify("x/m1.1.bax.h5").kind,
            PartitionKind::Partition
        );
    }

    #[test]
    fn test_container_expands_in_order() {
        let resolved = expand_containers(vec!["m1.bas.h5".to_string()], &table());
        assert_eq!(paths(&resolved), vec!["A.1.bax.h5", "B.2.bax.h5"]);
        assert!(resolved.iter().all(|r| r.kind == PartitionKind::Partition));
    }

    #[test]
    fn test_duplicates_dropped() {
        let names = vec![
            "m1.bas.h5".to_string(),
            "A.1.bax.h5".to_string(),
            "m1.bas.h5".to_string(),
        ];
        let resolved = expand_containers(names, &table());
        assert_eq!(paths(&resolved), vec!["A.1.bax.h5", "B.2.bax.h5"]);
    }

    #[test]
    fn test_unopenable_container_kept() {
        let resolved = expand_containers(vec!["other.bas.h5".to_string()], &NoBackend);
        assert_eq!(paths(&resolved), vec!["other.bas.h5"]);
        assert_eq!(resolved[0].kind, PartitionKind::Container);
    }

    #[test]
    fn test_explicit_inputs() {
        let args = vec!["b.1.bax.h5".to_string(), "a.1.bax.h5".to_string()];
        let resolved = resolve_inputs(InputSource::Explicit(&args), &NoBackend);
        assert!(resolved.errors.is_empty());
        assert_eq!(paths(&resolved.value), vec!["b.1.bax.h5", "a.1.bax.h5"]);
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        let resolved = resolve_inputs(InputSource::Explicit(&[]), &NoBackend);
        assert!(resolved.value.is_empty());
        assert!(resolved
            .errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingInputFiles)));
    }

    #[test]
    fn test_container_with_no_parts_is_missing_inputs() {
        let mut map = HashMap::new();
        map.insert("empty.bas.h5".to_string(), Vec::new());
        let args = vec!["empty.bas.h5".to_string()];
        let resolved = resolve_inputs(InputSource::Explicit(&args), &ContainerTable(map));
        assert_eq!(resolved.errors.len(), 1);
        assert!(matches!(resolved.errors[0], ConfigError::MissingInputFiles));
    }

    #[test]
    fn test_fofn_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let fofn = dir.path().join("inputs.fofn");
        std::fs::write(&fofn, "m1.bas.h5\nC.3.bax.h5\n").unwrap();

        let resolved = resolve_inputs(InputSource::Fofn(&fofn), &table());
        assert!(resolved.errors.is_empty());
        assert_eq!(
            paths(&resolved.value),
            vec!["A.1.bax.h5", "B.2.bax.h5", "C.3.bax.h5"]
        );
    }

    #[test]
    fn test_missing_fofn() {
        let resolved = resolve_inputs(InputSource::Fofn(Path::new("/no/such.fofn")), &NoBackend);
        assert_eq!(resolved.errors.len(), 2);
        assert!(matches!(resolved.errors[0], ConfigError::FofnUnreadable { .. }));
        assert!(matches!(resolved.errors[1], ConfigError::MissingInputFiles));
    }

    #[test]
    fn test_dataset_inputs_keep_only_bax() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.hdfsubreadset.json");
        std::fs::write(
            &path,
            r#"{
                "type": "HdfSubreadSet",
                "metaType": "PacBio.DataSet.HdfSubreadSet",
                "externalResources": [
                    {"metaType": "PacBio.SubreadFile.BaxFile", "resourceId": "m1.1.BAX.H5"},
                    {"metaType": "PacBio.SubreadFile.MetadataFile", "resourceId": "m1.metadata.xml"},
                    {"metaType": "PacBio.SubreadFile.BaxFile", "resourceId": "file:///abs/m1.2.bax.h5"}
                ]
            }"#,
        )
        .unwrap();

        let resolved = filenames_from_dataset(&path);
        assert!(resolved.errors.is_empty());
        assert_eq!(
            resolved.value,
            vec![
                dir.path().join("m1.1.BAX.H5").display().to_string(),
                "/abs/m1.2.bax.h5".to_string(),
            ]
        );
    }

    #[test]
    fn test_unreadable_dataset_is_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let resolved = filenames_from_dataset(&path);
        assert!(resolved.value.is_empty());
        assert!(matches!(
            resolved.errors[..],
            [ConfigError::ManifestUnreadable { .. }]
        ));
    }

    #[test]
    fn test_movie_name_without_part_number() {
        assert_eq!(movie_name_from_path(Path::new("movie.bax.h5")), "movie");
        assert_eq!(movie_name_from_path(Path::new("m.v2.bax.h5")), "m.v2");
        assert_eq!(movie_name_from_path(Path::new("reads.h5")), "reads.h5");
    }
}
