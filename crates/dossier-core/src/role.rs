/// Organisational roles and the tier each one maps to.
///
/// The role set is closed: every role the organisation defines is a
/// [`Role`] variant, and the wire form is the upper-snake name used in
/// snapshot files and configuration (`ADVISER`, `BSCS_1A_REPRESENTATIVE`).
///
/// Tier membership is configuration data held in a [`RoleTiers`] table. The
/// table is total by construction (one slot per role), so an unmapped role
/// cannot exist at runtime; only the *overrides* read from configuration can
/// be malformed, and those are rejected when the table is built.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Access tier derived from a user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Unrestricted: every non-archived document.
    Full,
    /// Broad but bounded: everything below `Restricted`.
    Partial,
    /// Default tier: own, shared and public documents only.
    Regular,
}

impl Tier {
    /// All tiers, most privileged first.
    pub const ALL: [Tier; 3] = [Tier::Full, Tier::Partial, Tier::Regular];

    /// Returns the `snake_case` name of the tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Full => "full",
            Tier::Partial => "partial",
            Tier::Regular => "regular",
        }
    }

    /// Returns `true` for [`Tier::Full`] and [`Tier::Partial`].
    pub fn is_privileged(self) -> bool {
        match self {
            Tier::Full | Tier::Partial => true,
            Tier::Regular => false,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier {0:?} (expected full, partial or regular)")]
pub struct ParseTierError(pub String);

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Tier::Full),
            "partial" => Ok(Tier::Partial),
            "regular" => Ok(Tier::Regular),
            _ => Err(ParseTierError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A role from the organisation's closed role set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Faculty adviser.
    Adviser,
    /// President of the organisation.
    President,
    /// Vice president.
    VicePresident,
    /// Secretary.
    Secretary,
    /// Assistant secretary.
    AssistantSecretary,
    /// Treasurer.
    Treasurer,
    /// Assistant treasurer.
    AssistantTreasurer,
    /// Internal auditor (an officer role, not a privileged tier).
    Auditor,
    /// Business manager.
    BusinessManager,
    /// Public information officer.
    Pio,
    /// Athletic manager (male).
    AthleticManagerMale,
    /// Athletic manager (female).
    AthleticManagerFemale,
    /// BSCS 1A class representative.
    Bscs1aRepresentative,
    /// BSCS 1B class representative.
    Bscs1bRepresentative,
    /// BSCS 2A class representative.
    Bscs2aRepresentative,
    /// BSCS 2B class representative.
    Bscs2bRepresentative,
    /// BSCS 3A class representative.
    Bscs3aRepresentative,
    /// BSCS 3B class representative.
    Bscs3bRepresentative,
    /// BSCS 4A class representative.
    Bscs4aRepresentative,
    /// BSCS 4B class representative.
    Bscs4bRepresentative,
}

impl Role {
    /// Number of roles in the closed set.
    pub const COUNT: usize = 20;

    /// Every role, in declaration order.
    pub const ALL: [Role; Role::COUNT] = [
        Role::Adviser,
        Role::President,
        Role::VicePresident,
        Role::Secretary,
        Role::AssistantSecretary,
        Role::Treasurer,
        Role::AssistantTreasurer,
        Role::Auditor,
        Role::BusinessManager,
        Role::Pio,
        Role::AthleticManagerMale,
        Role::AthleticManagerFemale,
        Role::Bscs1aRepresentative,
        Role::Bscs1bRepresentative,
        Role::Bscs2aRepresentative,
        Role::Bscs2bRepresentative,
        Role::Bscs3aRepresentative,
        Role::Bscs3bRepresentative,
        Role::Bscs4aRepresentative,
        Role::Bscs4bRepresentative,
    ];

    /// Returns the upper-snake wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Adviser => "ADVISER",
            Role::President => "PRESIDENT",
            Role::VicePresident => "VICE_PRESIDENT",
            Role::Secretary => "SECRETARY",
            Role::AssistantSecretary => "ASSISTANT_SECRETARY",
            Role::Treasurer => "TREASURER",
            Role::AssistantTreasurer => "ASSISTANT_TREASURER",
            Role::Auditor => "AUDITOR",
            Role::BusinessManager => "BUSINESS_MANAGER",
            Role::Pio => "PIO",
            Role::AthleticManagerMale => "ATHLETIC_MANAGER_MALE",
            Role::AthleticManagerFemale => "ATHLETIC_MANAGER_FEMALE",
            Role::Bscs1aRepresentative => "BSCS_1A_REPRESENTATIVE",
            Role::Bscs1bRepresentative => "BSCS_1B_REPRESENTATIVE",
            Role::Bscs2aRepresentative => "BSCS_2A_REPRESENTATIVE",
            Role::Bscs2bRepresentative => "BSCS_2B_REPRESENTATIVE",
            Role::Bscs3aRepresentative => "BSCS_3A_REPRESENTATIVE",
            Role::Bscs3bRepresentative => "BSCS_3B_REPRESENTATIVE",
            Role::Bscs4aRepresentative => "BSCS_4A_REPRESENTATIVE",
            Role::Bscs4bRepresentative => "BSCS_4B_REPRESENTATIVE",
        }
    }

    /// Returns the human-readable label shown in listings.
    pub fn label(self) -> &'static str {
        match self {
            Role::Adviser => "Adviser",
            Role::President => "President",
            Role::VicePresident => "Vice President",
            Role::Secretary => "Secretary",
            Role::AssistantSecretary => "Assistant Secretary",
            Role::Treasurer => "Treasurer",
            Role::AssistantTreasurer => "Assistant Treasurer",
            Role::Auditor => "Auditor",
            Role::BusinessManager => "Business Manager",
            Role::Pio => "PIO",
            Role::AthleticManagerMale => "Athletic Manager (Male)",
            Role::AthleticManagerFemale => "Athletic Manager (Female)",
            Role::Bscs1aRepresentative => "BSCS 1A Representative",
            Role::Bscs1bRepresentative => "BSCS 1B Representative",
            Role::Bscs2aRepresentative => "BSCS 2A Representative",
            Role::Bscs2bRepresentative => "BSCS 2B Representative",
            Role::Bscs3aRepresentative => "BSCS 3A Representative",
            Role::Bscs3bRepresentative => "BSCS 3B Representative",
            Role::Bscs4aRepresentative => "BSCS 4A Representative",
            Role::Bscs4bRepresentative => "BSCS 4B Representative",
        }
    }

    /// Position of the role in [`Role::ALL`]; used as the table slot.
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string names no role in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Parses the wire name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRoleError(s.to_owned()))
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RoleTiers
// ---------------------------------------------------------------------------

/// Total `Role → Tier` table.
///
/// Built once (from the defaults, optionally overridden by configuration) and
/// then only read. Lookups are a single array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTiers {
    tiers: [Tier; Role::COUNT],
}

impl Default for RoleTiers {
    /// The organisation's standing table: the adviser is `Full`, the
    /// president is `Partial`, every other officer is `Regular`.
    fn default() -> Self {
        let mut tiers = [Tier::Regular; Role::COUNT];
        tiers[Role::Adviser.index()] = Tier::Full;
        tiers[Role::President.index()] = Tier::Partial;
        Self { tiers }
    }
}

impl RoleTiers {
    /// Returns the tier for a role, or [`Tier::Regular`] when no role is
    /// assigned.
    pub fn tier_of(&self, role: Option<Role>) -> Tier {
        match role {
            Some(r) => self.tiers[r.index()],
            None => Tier::Regular,
        }
    }

    /// Returns a copy of the table with `role` mapped to `tier`.
    #[must_use]
    pub fn with(mut self, role: Role, tier: Tier) -> Self {
        self.tiers[role.index()] = tier;
        self
    }

    /// Iterates `(role, tier)` pairs in [`Role::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, Tier)> + '_ {
        Role::ALL.iter().map(|&r| (r, self.tiers[r.index()]))
    }

    /// Returns every role mapped to `tier`.
    pub fn roles_in(&self, tier: Tier) -> Vec<Role> {
        self.iter()
            .filter(|&(_, t)| t == tier)
            .map(|(r, _)| r)
            .collect()
    }
}

/// Returns the tier of `role` under the default [`RoleTiers`] table.
///
/// `None` (no role assigned) is [`Tier::Regular`].
pub fn tier_of(role: Option<Role>) -> Tier {
    RoleTiers::default().tier_of(role)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
