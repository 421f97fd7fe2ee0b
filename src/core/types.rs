use std::fmt;
use std::str::FromStr;

/// Output shape of a conversion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Subreads split at adapters within the HQ region
    #[default]
    Subread,
    /// One record per ZMW covering the HQ region
    HqRegion,
    /// The full polymerase read
    Polymerase,
    /// Circular consensus reads
    Consensus,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Subread,
        Mode::HqRegion,
        Mode::Polymerase,
        Mode::Consensus,
    ];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subread => write!(f, "subread"),
            Self::HqRegion => write!(f, "hqregion"),
            Self::Polymerase => write!(f, "polymerase"),
            Self::Consensus => write!(f, "ccs"),
        }
    }
}

/// Instrument generation that produced the legacy files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Rs,
    Sequel,
}

impl Platform {
    /// Value of the `PM` read group tag
    #[must_use]
    pub fn model(self) -> &'static str {
        match self {
            Self::Rs => "RS",
            Self::Sequel => "SEQUEL",
        }
    }
}

/// Optional per-base annotation channel copied into output records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    DeletionQV,
    DeletionTag,
    InsertionQV,
    Ipd,
    MergeQV,
    PulseWidth,
    SubstitutionQV,
    SubstitutionTag,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::DeletionQV,
        Feature::DeletionTag,
        Feature::InsertionQV,
        Feature::Ipd,
        Feature::MergeQV,
        Feature::PulseWidth,
        Feature::SubstitutionQV,
        Feature::SubstitutionTag,
    ];

    /// Name accepted on the command line
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DeletionQV => "DeletionQV",
            Self::DeletionTag => "DeletionTag",
            Self::InsertionQV => "InsertionQV",
            Self::Ipd => "IPD",
            Self::MergeQV => "MergeQV",
            Self::PulseWidth => "PulseWidth",
            Self::SubstitutionQV => "SubstitutionQV",
            Self::SubstitutionTag => "SubstitutionTag",
        }
    }

    /// Two-letter BAM tag the channel is stored under
    #[must_use]
    pub fn tag(self) -> [u8; 2] {
        match self {
            Self::DeletionQV => *b"dq",
            Self::DeletionTag => *b"dt",
            Self::InsertionQV => *b"iq",
            Self::Ipd => *b"ip",
            Self::MergeQV => *b"mq",
            Self::PulseWidth => *b"pw",
            Self::SubstitutionQV => *b"sq",
            Self::SubstitutionTag => *b"st",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::DeletionQV => 1 << 0,
            Self::DeletionTag => 1 << 1,
            Self::InsertionQV => 1 << 2,
            Self::Ipd => 1 << 3,
            Self::MergeQV => 1 << 4,
            Self::PulseWidth => 1 << 5,
            Self::SubstitutionQV => 1 << 6,
            Self::SubstitutionTag => 1 << 7,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Set of enabled [`Feature`]s
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureSet(u8);

impl FeatureSet {
    #[must_use]
    pub const fn all() -> Self {
        Self(u8::MAX)
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    pub fn insert(&mut self, feature: Feature) {
        self.0 |= feature.bit();
    }

    pub fn remove(&mut self, feature: Feature) {
        self.0 &= !feature.bit();
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled features in canonical order
    pub fn iter(self) -> impl Iterator<Item = Feature> {
        Feature::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = Self::empty();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>().unwrap(), feature);
        }
        assert_eq!("Bogus".parse::<Feature>(), Err("Bogus".to_string()));
        // Names are case sensitive
        assert!("ipd".parse::<Feature>().is_err());
    }

    #[test]
    fn test_feature_set_bits_are_independent() {
        let mut set = FeatureSet::empty();
        set.insert(Feature::Ipd);
        set.insert(Feature::DeletionQV);
        assert!(set.contains(Feature::Ipd));
        assert!(set.contains(Feature::DeletionQV));
        assert_eq!(set.iter().count(), 2);

        set.remove(Feature::Ipd);
        assert!(!set.contains(Feature::Ipd));
        assert!(set.contains(Feature::DeletionQV));
    }

    #[test]
    fn test_default_is_all() {
        let set = FeatureSet::default();
        assert!(Feature::ALL.iter().all(|f| set.contains(*f)));
        assert!(FeatureSet::empty().is_empty());
    }
}
