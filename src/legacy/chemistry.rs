//! Chemistry triples and the table of combinations the output format can
//! describe.

/// Binding kit, sequencing kit and basecaller version recorded by the
/// instrument
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chemistry {
    pub binding_kit: String,
    pub sequencing_kit: String,
    pub basecaller_version: String,
}

/// (binding kit, sequencing kit, basecaller major.minor, chemistry name)
const SUPPORTED: &[(&str, &str, &str, &str)] = &[
    ("100236500", "001558034", "2.1", "C2"),
    ("100236500", "001558034", "2.3", "C2"),
    ("100254800", "001558034", "2.1", "P4-C2"),
    ("100254800", "001558034", "2.3", "P4-C2"),
    ("100256000", "100254200", "2.1", "P5-C3"),
    ("100256000", "100254200", "2.3", "P5-C3"),
    ("100356300", "100356200", "2.1", "P6-C4"),
    ("100356300", "100356200", "2.3", "P6-C4"),
    ("100372700", "100356200", "2.1", "P6-C4"),
    ("100372700", "100356200", "2.3", "P6-C4"),
    ("100356300", "100612400", "2.1", "P6-C4"),
    ("100356300", "100612400", "2.3", "P6-C4"),
    ("100372700", "100612400", "2.1", "P6-C4"),
    ("100372700", "100612400", "2.3", "P6-C4"),
    ("100-619-300", "100-620-000", "3.0", "S/P1-C1"),
    ("100-619-300", "100-620-000", "3.1", "S/P1-C1"),
];

impl Chemistry {
    pub fn new(
        binding_kit: impl Into<String>,
        sequencing_kit: impl Into<String>,
        basecaller_version: impl Into<String>,
    ) -> Self {
        Self {
            binding_kit: binding_kit.into(),
            sequencing_kit: sequencing_kit.into(),
            basecaller_version: basecaller_version.into(),
        }
    }

    /// `major.minor` part of the basecaller version
    #[must_use]
    pub fn basecaller_major_minor(&self) -> &str {
        let mut dots = self.basecaller_version.match_indices('.').map(|(i, _)| i);
        match (dots.next(), dots.next()) {
            (Some(_), Some(second)) => &self.basecaller_version[..second],
            _ => &self.basecaller_version,
        }
    }

    /// Name of the chemistry, if the triple is a known combination
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        let version = self.basecaller_major_minor();
        SUPPORTED
            .iter()
            .find(|(binding, sequencing, basecaller, _)| {
                *binding == self.binding_kit
                    && *sequencing == self.sequencing_kit
                    && *basecaller == version
            })
            .map(|(_, _, _, name)| *name)
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.name().is_some()
    }
}

impl std::fmt::Display for Chemistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "binding kit {}, sequencing kit {}, basecaller {}",
            self.binding_kit, self.sequencing_kit, self.basecaller_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_minor() {
        assert_eq!(
            Chemistry::new("a", "b", "2.3.0.1.142990").basecaller_major_minor(),
            "2.3"
        );
        assert_eq!(Chemistry::new("a", "b", "3.0").basecaller_major_minor(), "3.0");
        assert_eq!(Chemistry::new("a", "b", "3").basecaller_major_minor(), "3");
    }

    #[test]
    fn test_known_chemistry() {
        let chem = Chemistry::new("100356300", "100356200", "2.3.0.3.154799");
        assert_eq!(chem.name(), Some("P6-C4"));
        assert!(chem.is_supported());
    }

    #[test]
    fn test_unknown_chemistry() {
        let chem = Chemistry::new("999", "100356200", "2.3.0");
        assert!(!chem.is_supported());
        assert!(Chemistry::default().name().is_none());
    }
}
