//! Priority tiers for injected style units.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::ParsePriorityError;

/// Coarse cascade bucket for a style unit.
///
/// Units of a lower tier always precede units of a higher tier in the
/// document head, so a higher tier wins equal-specificity conflicts
/// without selector tricks.
///
/// | Tier | Rank | Typical source |
/// |------|------|----------------|
/// | `Base` | 0 | resets, normalizers |
/// | `Normal` | 1 | component styles |
/// | `High` | 2 | theme overrides |
/// | `Override` | 3 | application-level escapes |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Base,
    #[default]
    #[serde(alias = "component")]
    Normal,
    #[serde(alias = "theme")]
    High,
    Override,
}

impl Priority {
    /// All tiers, lowest first.
    pub const ALL: [Priority; 4] = [
        Priority::Base,
        Priority::Normal,
        Priority::High,
        Priority::Override,
    ];

    /// Numeric ordering key.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Base => 0,
            Priority::Normal => 1,
            Priority::High => 2,
            Priority::Override => 3,
        }
    }

    /// Returns the attribute value written on style units.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Base => "base",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Override => "override",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Priority::Base),
            "normal" | "component" => Ok(Priority::Normal),
            "high" | "theme" => Ok(Priority::High),
            "override" => Ok(Priority::Override),
            _ => Err(ParsePriorityError {
                value: s.to_string(),
            }),
        }
    }
}
