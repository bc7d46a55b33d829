use std::fmt;
use std::str::FromStr;

/// Wall-clock instant attached to lifecycle events.
///
/// Stored in UTC; the durable document keeps full RFC 3339 precision.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Unique identifier of a player as assigned by the host platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PlayerId(pub u64);

impl PlayerId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for PlayerId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
