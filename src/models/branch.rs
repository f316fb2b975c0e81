use crate::error::InstallError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Release channel of the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Upstream yuzu mainline builds
    Mainline,
    /// yuzu Early Access builds
    #[serde(rename = "ea")]
    EarlyAccess,
    /// The Eden community fork
    Eden,
}

impl Branch {
    /// The only branch that can be installed from the release feed.
    pub const INSTALLABLE: Branch = Branch::Eden;

    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Mainline => "mainline",
            Branch::EarlyAccess => "ea",
            Branch::Eden => "eden",
        }
    }

    /// Name shown to the user for an emulator of this branch.
    pub fn emulator_name(&self) -> &'static str {
        match self {
            Branch::Eden => "eden",
            Branch::Mainline | Branch::EarlyAccess => "yuzu",
        }
    }

    /// Parse a branch that must also be installable.
    pub fn installable(value: &str) -> Result<Branch, InstallError> {
        match value.parse::<Branch>() {
            Ok(branch) if branch == Self::INSTALLABLE => Ok(branch),
            _ => Err(InstallError::UnsupportedBranch(value.to_string())),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Branch {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainline" => Ok(Branch::Mainline),
            "ea" => Ok(Branch::EarlyAccess),
            "eden" => Ok(Branch::Eden),
            other => Err(InstallError::UnsupportedBranch(other.to_string())),
        }
    }
}
