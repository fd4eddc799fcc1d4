//! Enumeration types shared by the catalog records.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The workload a datacenter style is optimised for.
///
/// Stored documents carry this as a lowercase string. Anything outside the
/// closed set is read as [`Focus::Server`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    /// Compute-heavy layouts.
    Processing,
    /// Storage-heavy layouts.
    Storage,
    /// Network-heavy layouts.
    Network,
    /// Balanced general-purpose layouts.
    #[default]
    Server,
}

impl Focus {
    /// All focus values in declaration order.
    pub const ALL: [Self; 4] = [Self::Processing, Self::Storage, Self::Network, Self::Server];

    /// The lowercase name used in stored documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Server => "server",
        }
    }

    /// Parse a stored focus value, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for values outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|focus| focus.as_str().eq_ignore_ascii_case(value))
    }

    /// Parse a stored focus value, falling back to [`Focus::Server`].
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl core::fmt::Display for Focus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
