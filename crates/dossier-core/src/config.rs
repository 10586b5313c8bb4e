//! Policy configuration loaded at startup.
//!
//! The configuration file is a small JSON object. Every field is optional:
//!
//! ```json
//! {
//!   "role_tiers": { "PRESIDENT": "full", "SECRETARY": "partial" },
//!   "recent_window_days": 14,
//!   "activity_report_limit": 500
//! }
//! ```
//!
//! Validation is fail-fast. An unknown role or tier name, an unknown field,
//! a zero window/limit or a window longer than [`MAX_RECENT_WINDOW_DAYS`] is a
//! [`ConfigError`]; nothing is silently mapped to a default tier.
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::role::{Role, RoleTiers, Tier};

/// Default look-back window for the dashboard's "recent uploads" count.
pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 7;

/// Longest accepted dashboard window, roughly a century.
pub const MAX_RECENT_WINDOW_DAYS: u32 = 36_500;

/// Default maximum number of entries returned by the activity report.
pub const DEFAULT_ACTIVITY_REPORT_LIMIT: usize = 1000;

/// Errors raised while loading or validating a [`PolicyConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not valid JSON or had the wrong shape.
    #[error("invalid policy config: {0}")]
    Json(#[from] serde_json::Error),

    /// A `role_tiers` key names no known role.
    #[error("policy config maps unknown role {0:?}")]
    UnknownRole(String),

    /// A `role_tiers` value names no known tier.
    #[error("policy config maps role {role} to unknown tier {tier:?}")]
    UnknownTier {
        /// The role being mapped.
        role: Role,
        /// The rejected tier name.
        tier: String,
    },

    /// A numeric setting that must be positive was zero.
    #[error("policy config field `{0}` must be greater than zero")]
    ZeroValue(&'static str),

    /// The dashboard window exceeds [`MAX_RECENT_WINDOW_DAYS`].
    #[error("policy config field `recent_window_days` must be at most {max}, got {days}")]
    WindowTooLarge {
        /// The rejected value.
        days: u32,
        /// The accepted maximum.
        max: u32,
    },
}

/// Parsed policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Role → tier overrides on top of the built-in table.
    pub role_tiers: BTreeMap<String, String>,
    /// Dashboard "recent uploads" window, in days.
    pub recent_window_days: u32,
    /// Cap on activity report rows.
    pub activity_report_limit: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            role_tiers: BTreeMap::new(),
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
            activity_report_limit: DEFAULT_ACTIVITY_REPORT_LIMIT,
        }
    }
}

impl PolicyConfig {
    /// Parses and validates a configuration document.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: PolicyConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field, including the role/tier names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_window_days == 0 {
            return Err(ConfigError::ZeroValue("recent_window_days"));
        }
        if self.recent_window_days > MAX_RECENT_WINDOW_DAYS {
            return Err(ConfigError::WindowTooLarge {
                days: self.recent_window_days,
                max: MAX_RECENT_WINDOW_DAYS,
            });
        }
        if self.activity_report_limit == 0 {
            return Err(ConfigError::ZeroValue("activity_report_limit"));
        }
        self.build_role_tiers().map(|_| ())
    }

    /// Applies the overrides to the default [`RoleTiers`] table.
    pub fn build_role_tiers(&self) -> Result<RoleTiers, ConfigError> {
        let mut table = RoleTiers::default();
        for (role_name, tier_name) in &self.role_tiers {
            let role: Role = role_name
                .parse()
                .map_err(|_| ConfigError::UnknownRole(role_name.clone()))?;
            let tier: Tier = tier_name.parse().map_err(|_| ConfigError::UnknownTier {
                role,
                tier: tier_name.clone(),
            })?;
            tracing::debug!(%role, %tier, "role tier override");
            table = table.with(role, tier);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = PolicyConfig::from_json("{}").expect("parses");
        assert_eq!(config, PolicyConfig::default());
        assert_eq!(
            config.build_role_tiers().expect("builds"),
            RoleTiers::default()
        );
    }

    #[test]
    fn override_changes_one_role() {
        let config =
            PolicyConfig::from_json(r#"{"role_tiers": {"SECRETARY": "partial"}}"#).expect("parses");
        let tiers = config.build_role_tiers().expect("builds");
        assert_eq!(tiers.tier_of(Some(Role::Secretary)), Tier::Partial);
        assert_eq!(tiers.tier_of(Some(Role::Adviser)), Tier::Full);
        assert_eq!(tiers.tier_of(None), Tier::Regular);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = PolicyConfig::from_json(r#"{"role_tiers": {"JANITOR": "full"}}"#)
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::UnknownRole(ref r) if r == "JANITOR"));
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let err = PolicyConfig::from_json(r#"{"role_tiers": {"PRESIDENT": "super"}}"#)
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::UnknownTier { role: Role::President, .. }
        ));
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = PolicyConfig::from_json(r#"{"recent_window_days": 0}"#).expect_err("must fail");
        assert!(matches!(err, ConfigError::ZeroValue("recent_window_days")));
    }

    #[test]
    fn oversized_window_is_rejected() {
        let err = PolicyConfig::from_json(r#"{"recent_window_days": 4294967295}"#)
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::WindowTooLarge { days: u32::MAX, max: MAX_RECENT_WINDOW_DAYS }
        ));

        let config = PolicyConfig::from_json(r#"{"recent_window_days": 36500}"#).expect("at cap");
        assert_eq!(config.recent_window_days, MAX_RECENT_WINDOW_DAYS);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = PolicyConfig::from_json(r#"{"recent_days": 3}"#).expect_err("must fail");
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
