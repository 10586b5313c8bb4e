/// Document sensitivity levels and small sets of them.
///
/// The four levels form a fixed total order of restrictiveness:
///
/// | Level          | Rank |
/// |----------------|------|
/// | `public`       | 0    |
/// | `internal`     | 1    |
/// | `confidential` | 2    |
/// | `restricted`   | 3    |
///
/// The order is the derive order of [`Classification`], so `<` between two
/// levels reads as "less restrictive than".
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sensitivity level of a document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Anyone in the organisation may read it.
    Public,
    /// Default for new uploads; owner, shares and privileged tiers.
    #[default]
    Internal,
    /// Sensitive; same audience as `internal` in the current policy.
    Confidential,
    /// Most sensitive; closed to the `partial` tier.
    Restricted,
}

impl Classification {
    /// All levels, least restrictive first.
    pub const ALL: [Classification; 4] = [
        Classification::Public,
        Classification::Internal,
        Classification::Confidential,
        Classification::Restricted,
    ];

    /// Returns the `snake_case` wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::Confidential => "confidential",
            Classification::Restricted => "restricted",
        }
    }

    /// Returns the display label (`"Confidential"`).
    pub fn label(self) -> &'static str {
        match self {
            Classification::Public => "Public",
            Classification::Internal => "Internal",
            Classification::Confidential => "Confidential",
            Classification::Restricted => "Restricted",
        }
    }

    /// Returns the level's rank in the restrictiveness order.
    pub fn rank(self) -> u8 {
        self as u8
    }

    fn bit(self) -> u8 {
        1 << self.rank()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no classification level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown classification {0:?} (expected public, internal, confidential or restricted)")]
pub struct ParseClassificationError(pub String);

impl FromStr for Classification {
    type Err = ParseClassificationError;

    /// Parses the wire name, ignoring ASCII case (`"RESTRICTED"` is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Classification::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseClassificationError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// ClassificationSet
// ---------------------------------------------------------------------------

/// A set of classification levels, stored as a 4-bit mask.
///
/// Serialises as the ascending list of member levels.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Classification>", into = "Vec<Classification>")]
pub struct ClassificationSet(u8);

impl ClassificationSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The set of all four levels.
    pub const fn all() -> Self {
        Self(0b1111)
    }

    /// The singleton set `{level}`.
    pub fn only(level: Classification) -> Self {
        Self(level.bit())
    }

    /// Every level no more restrictive than `level` (inclusive).
    pub fn at_most(level: Classification) -> Self {
        Classification::ALL
            .iter()
            .copied()
            .filter(|&c| c <= level)
            .collect()
    }

    /// Every level except `level`.
    pub fn all_except(level: Classification) -> Self {
        Self(Self::all().0 & !level.bit())
    }

    /// Returns `true` if `level` is a member.
    pub fn contains(self, level: Classification) -> bool {
        self.0 & level.bit() != 0
    }

    /// Adds `level` to the set.
    pub fn insert(&mut self, level: Classification) {
        self.0 |= level.bit();
    }

    /// Set union.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection.
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Every level not in `self`.
    #[must_use]
    pub fn complement(self) -> Self {
        Self(Self::all().0 & !self.0)
    }

    /// Returns `true` if no level is a member.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if all four levels are members.
    pub fn is_all(self) -> bool {
        self.0 == Self::all().0
    }

    /// Number of member levels.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates member levels, least restrictive first.
    pub fn iter(self) -> impl Iterator<Item = Classification> {
        Classification::ALL
            .into_iter()
            .filter(move |&c| self.contains(c))
    }
}

impl FromIterator<Classification> for ClassificationSet {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        let mut set = Self::empty();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl From<Vec<Classification>> for ClassificationSet {
    fn from(levels: Vec<Classification>) -> Self {
        levels.into_iter().collect()
    }
}

impl From<ClassificationSet> for Vec<Classification> {
    fn from(set: ClassificationSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for ClassificationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ClassificationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(c.as_str())?;
        }
        f.write_str(")")
    }
}
