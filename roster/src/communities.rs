use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of eligibility cohorts. Wire form is lowercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Community {
    Aeon,
    Sproto,
    Spx,
    Mog,
    Milady,
    Hpos,
}

impl Community {
    pub const ALL: [Community; 6] = [
        Community::Aeon,
        Community::Sproto,
        Community::Spx,
        Community::Mog,
        Community::Milady,
        Community::Hpos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Community::Aeon => "aeon",
            Community::Sproto => "sproto",
            Community::Spx => "spx",
            Community::Mog => "mog",
            Community::Milady => "milady",
            Community::Hpos => "hpos",
        }
    }
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown community: {0}")]
pub struct UnknownCommunity(pub String);

impl FromStr for Community {
    type Err = UnknownCommunity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();

        Community::ALL
            .into_iter()
            .find(|community| community.as_str() == lowered)
            .ok_or(UnknownCommunity(lowered))
    }
}

#[cfg(test)]
mod tests {
    use super::{Community, UnknownCommunity};

    #[test]
    fn test_parse_known() {
        assert_eq!("aeon".parse(), Ok(Community::Aeon));
        assert_eq!("hpos".parse(), Ok(Community::Hpos));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("MOG".parse(), Ok(Community::Mog));
        assert_eq!("  Milady ".parse(), Ok(Community::Milady));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "doge".parse::<Community>(),
            Err(UnknownCommunity("doge".to_string()))
        );
        assert!("".parse::<Community>().is_err());
    }

    #[test]
    fn test_wire_form_round_trip() {
        for community in Community::ALL {
            assert_eq!(community.as_str().parse(), Ok(community));
        }
    }
}
