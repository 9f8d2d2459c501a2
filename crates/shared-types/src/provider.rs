//! Identity provider selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which provider produced the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Redirect-based delegation from Internet Identity.
    InternetIdentity,
    /// Redirect-based delegation from NFID (email/social login).
    Nfid,
    /// Browser-extension wallet with an injected capability.
    Plug,
}

impl ProviderKind {
    /// All interactive providers.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::InternetIdentity,
        ProviderKind::Nfid,
        ProviderKind::Plug,
    ];

    /// Stable key used in persisted state and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::InternetIdentity => "internet-identity",
            ProviderKind::Nfid => "nfid",
            ProviderKind::Plug => "plug",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internet-identity" | "ii" => Ok(ProviderKind::InternetIdentity),
            "nfid" => Ok(ProviderKind::Nfid),
            "plug" => Ok(ProviderKind::Plug),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}
