use std::fmt;

/// The closed set of sports this service knows how to poll and serve.
/// Canonical spelling is lower-case; conversion from arbitrary strings
/// is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sport {
    Baseball,
    Football,
    Soccer,
}

/// Every member of the closed set, in a fixed order. Used by the poller
/// pool to launch one worker per sport and by bootstrap to seed rows.
pub const SUPPORTED_SPORTS: [Sport; 3] = [Sport::Baseball, Sport::Football, Sport::Soccer];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unsupported sport type: {0}")]
pub struct UnsupportedSportError(pub String);

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Baseball => "baseball",
            Sport::Football => "football",
            Sport::Soccer => "soccer",
        }
    }

    /// Upper-case spelling, as used in the lines-provider's JSON response key.
    pub fn as_upper_str(&self) -> &'static str {
        match self {
            Sport::Baseball => "BASEBALL",
            Sport::Football => "FOOTBALL",
            Sport::Soccer => "SOCCER",
        }
    }

    pub fn parse(value: &str) -> Result<Self, UnsupportedSportError> {
        match value.to_lowercase().as_str() {
            "baseball" => Ok(Sport::Baseball),
            "football" => Ok(Sport::Football),
            "soccer" => Ok(Sport::Soccer),
            other => Err(UnsupportedSportError(other.to_string())),
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sport {
    type Err = UnsupportedSportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::parse(s)
    }
}

/// Parses a list of raw sport names, silently dropping unknown entries.
/// This is the policy the stream session's receive loop and the
/// subscribe-request ingress path both rely on (spec: "unknown entries
/// dropped silently").
pub fn parse_sports_lenient<I, S>(values: I) -> Vec<Sport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .filter_map(|s| Sport::parse(s.as_ref()).ok())
        .collect()
}
