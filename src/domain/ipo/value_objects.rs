use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an IPO stands in its offering lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpoStatus {
    /// Announced, subscription not yet open
    Upcoming,
    /// Subscription window is open
    Ongoing,
    /// Shares are trading on the exchange
    Listed,
}

impl IpoStatus {
    pub const ALL: [IpoStatus; 3] = [IpoStatus::Upcoming, IpoStatus::Ongoing, IpoStatus::Listed];

    pub fn as_str(&self) -> &'static str {
        match self {
            IpoStatus::Upcoming => "upcoming",
            IpoStatus::Ongoing => "ongoing",
            IpoStatus::Listed => "listed",
        }
    }
}

impl FromStr for IpoStatus {
    type Err = String;

    /// Parses a status, ignoring case and surrounding whitespace
    ///
    /// # Example
    /// ```
    /// use ipo_listings_api::domain::ipo::IpoStatus;
    ///
    /// assert_eq!("Listed".parse::<IpoStatus>(), Ok(IpoStatus::Listed));
    /// assert!("pending".parse::<IpoStatus>().is_err());
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        IpoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("\"{}\" is not a valid choice.", value))
    }
}

impl fmt::Display for IpoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
